//! Fuzz target for label schema parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the labels.json parser,
//! checking for panics, crashes, or hangs.

#![no_main]

use imlabel::schema::from_schema_slice;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(schema) = from_schema_slice(data) {
        for label in schema.labels() {
            let _ = schema.display_name(label);
        }
    }
});
