use super::common::conformance_dir;
use payload_rules::rules::RuleTable;
use payload_rules::serialize::rules_to_yaml;

#[derive(Debug, serde::Deserialize)]
struct TestCase {
    name: String,
    id: String,
    rules: String,
}

/// `(literal, tokens, pattern)` per rule, in declaration order.
fn snapshot(table: &RuleTable) -> Vec<(String, String, Option<String>)> {
    table
        .iter()
        .map(|r| {
            (
                r.literal().to_string(),
                r.token_string(),
                r.pattern_str().map(str::to_string),
            )
        })
        .collect()
}

#[test]
fn roundtrip_conformance_suite() {
    let suite_path = conformance_dir().join("roundtrip/suite.yaml");
    if !suite_path.exists() {
        eprintln!("Skipping roundtrip tests: {:?} not found", suite_path);
        return;
    }

    let content = std::fs::read_to_string(&suite_path).unwrap();
    let cases: Vec<TestCase> = serde_saphyr::from_str(&content).unwrap();

    let mut passed = 0;
    let mut failed = 0;

    for case in &cases {
        // Step 1: load
        let first = match RuleTable::from_yaml(&case.rules) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("  FAIL [{}] {}: initial load error: {}", case.id, case.name, e);
                failed += 1;
                continue;
            }
        };

        // Step 2: serialize
        let yaml = match rules_to_yaml(&first) {
            Ok(y) => y,
            Err(e) => {
                eprintln!("  FAIL [{}] {}: serialize error: {}", case.id, case.name, e);
                failed += 1;
                continue;
            }
        };

        // Step 3: reload and compare
        match RuleTable::from_yaml(&yaml) {
            Ok(second) if snapshot(&first) == snapshot(&second) => passed += 1,
            Ok(second) => {
                eprintln!(
                    "  FAIL [{}] {}: tables differ\n    before: {:?}\n    after:  {:?}",
                    case.id,
                    case.name,
                    snapshot(&first),
                    snapshot(&second)
                );
                failed += 1;
            }
            Err(e) => {
                eprintln!(
                    "  FAIL [{}] {}: reload error: {}\n{}",
                    case.id, case.name, e, yaml
                );
                failed += 1;
            }
        }
    }

    eprintln!(
        "\nRoundtrip conformance: {} passed, {} failed out of {} total",
        passed,
        failed,
        cases.len()
    );
    assert_eq!(failed, 0, "{} roundtrip conformance cases failed", failed);
}

#[test]
fn validation_errors_serialize_by_field() {
    let mut rules = RuleTable::new();
    rules.add_rule("categoryId", "required,string,max=5", None).unwrap();
    rules.add_rule("name", "required", None).unwrap();

    let err = match payload_rules::check(r#"{"categoryId": "123456"}"#, &rules) {
        Err(payload_rules::CheckError::Validation(errors)) => errors,
        other => panic!("unexpected result: {:?}", other),
    };
    let json = payload_rules::serialize::errors_to_json(&err).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(
        value,
        serde_json::json!({
            "categoryId": [
                {"field": "categoryId", "rule": "max", "value": "123456", "accepted": "5"}
            ],
            "name": [
                {"field": "name", "rule": "required", "value": null, "accepted": ""}
            ]
        })
    );
}
