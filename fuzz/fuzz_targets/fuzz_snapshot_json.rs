#![no_main]

use belegpruefer::Engine;
use belegpruefer::store::load_snapshot_json;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Any decodable snapshot must validate, summarize and dedup without panicking.
        if let Ok(records) = load_snapshot_json(s) {
            let engine = Engine::default();
            let issues = engine.validate_all(&records);
            for year in engine.available_years(&records) {
                let _ = engine.summarize_with(&records, year, &issues);
            }
            let resolver = engine.resolver();
            let _ = resolver.resolve_all(&resolver.find_duplicates(&records));
        }
    }
});
