#![no_main]

use libfuzzer_sys::fuzz_target;
use optmix_core::EventSpec;

fuzz_target!(|data: &[u8]| {
    let Ok(spec) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(parsed) = EventSpec::parse("fuzz", spec) {
        assert!(!parsed.tokens().is_empty());
        for token in parsed.tokens() {
            assert!(!token.option.is_empty());
            assert!(token.event_name().ends_with(token.option.as_str()));
        }
        assert_eq!(
            parsed.is_debounced(),
            parsed.tokens().iter().any(|t| t.debounce.is_some())
        );
    }
});
