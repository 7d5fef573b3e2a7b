//! Fuzz target for URL validation.
//!
//! The check must never panic and must not depend on a trailing fragment.

#![no_main]

use formcheck_validation::{Url, is_url};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = std::str::from_utf8(data) else {
        return;
    };

    let valid = is_url(value);
    assert_eq!(Url.validate(value).is_ok(), valid);

    // A fragment is dropped before parsing
    if !value.contains('#') && value.len() >= 4 {
        let with_fragment = format!("{value}#frag");
        assert_eq!(is_url(&with_fragment), valid);
    }
});
