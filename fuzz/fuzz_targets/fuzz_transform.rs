#![no_main]

use libfuzzer_sys::fuzz_target;
use xsd2_core::{transform, SchemaIr, TransformOptions};

// Accepts arbitrary bytes, attempts to parse them as an IR, and runs the
// pipeline with every option on. Goal: errors, never panics.
fuzz_target!(|data: &[u8]| {
    if let Ok(schema) = serde_json::from_slice::<SchemaIr>(data) {
        let options = TransformOptions {
            preserve_order: true,
            exclude_imported_types_by_xml_identity: data.len() % 2 == 0,
            ..TransformOptions::all()
        };
        let _ = transform(schema, &options);
    }
});
