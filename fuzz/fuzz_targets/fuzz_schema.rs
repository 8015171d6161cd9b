#![no_main]

use level_vault::schema::{Level, LevelCollectionDto};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary plaintext: parse, then build every record. Dimensions are
    // capped so a huge declared grid does not exhaust the fuzzer's memory.
    if let Ok(collection) = LevelCollectionDto::from_json_slice(data) {
        for record in &collection.levels {
            if let Ok(level) = Level::from_dto_bounded(record, Some(256)) {
                assert_eq!(level.grid.len(), level.columns() * level.rows());
            }
        }
    }
});
