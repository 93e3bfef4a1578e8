#![no_main]

use belegpruefer::core::DateNormalizer;
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let Some(reference) = NaiveDate::from_ymd_opt(2025, 1, 1) else {
            return;
        };
        let normalizer = DateNormalizer::new(reference);
        // Errors are fine, panics are bugs. Accepted dates must be stable.
        if let Ok(date) = normalizer.normalize(s) {
            let canonical = date.format("%Y-%m-%d").to_string();
            assert_eq!(normalizer.normalize(&canonical), Ok(date));
        }
    }
});
