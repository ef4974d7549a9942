#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use payload_rules::{Document, RuleTable, Validator};

#[derive(Debug, Arbitrary)]
struct Input {
    rules: Vec<(String, String)>,
    payload: String,
}

fuzz_target!(|input: Input| {
    let mut table = RuleTable::new();
    for (path, tokens) in &input.rules {
        let _ = table.add_rule(path, tokens, None);
    }

    let Ok(doc) = Document::from_json(&input.payload) else {
        return;
    };
    let Ok(validator) = Validator::new(&doc, &table) else {
        return;
    };

    let first = validator.validate();
    assert_eq!(first, validator.validate(), "validation must be idempotent");
});
