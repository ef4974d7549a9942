#![no_main]

use libfuzzer_sys::fuzz_target;
use payload_rules::rules::RuleTable;
use payload_rules::serialize::rules_to_yaml;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // Any table that loads must survive a serialize → reload cycle.
    if let Ok(table) = RuleTable::from_yaml(input)
        && let Ok(yaml) = rules_to_yaml(&table)
    {
        let reloaded = RuleTable::from_yaml(&yaml).expect("serialized rules must reload");
        assert_eq!(table.len(), reloaded.len());
    }
});
