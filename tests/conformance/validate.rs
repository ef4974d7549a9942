use super::common::{conformance_dir, values_structurally_equal};
use payload_rules::error::{CheckError, RuleErrorKind};
use payload_rules::rules::RuleTable;
use serde_json::Value;

/// A single validation test case from the suite.
#[derive(Debug, serde::Deserialize)]
struct TestCase {
    name: String,
    id: String,
    rules: String,
    input: String,
    expected: Expected,
}

#[derive(Debug, serde::Deserialize)]
struct Expected {
    #[serde(default)]
    valid: Option<bool>,
    #[serde(default)]
    errors: Option<Vec<ExpectedError>>,
    #[serde(default)]
    decode_error: bool,
    #[serde(default)]
    rule_error: Option<RuleErrorKind>,
}

#[derive(Debug, serde::Deserialize)]
struct ExpectedError {
    field: String,
    rule: String,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    accepted: Option<String>,
}

/// Run one case, returning a failure description if it does not match.
fn run_case(case: &TestCase) -> Result<(), String> {
    let rules = match RuleTable::from_yaml(&case.rules) {
        Ok(rules) => rules,
        Err(e) => {
            return match &case.expected.rule_error {
                Some(kind) if *kind == e.kind => Ok(()),
                _ => Err(format!("rule file rejected: {}", e)),
            };
        }
    };

    let result = payload_rules::check(&case.input, &rules);

    if case.expected.decode_error {
        return match result {
            Err(CheckError::Decode(_)) => Ok(()),
            other => Err(format!("expected decode error, got {:?}", other)),
        };
    }
    if let Some(kind) = &case.expected.rule_error {
        return match result {
            Err(CheckError::Rule(e)) if e.kind == *kind => Ok(()),
            other => Err(format!("expected {:?} rule error, got {:?}", kind, other)),
        };
    }
    if case.expected.valid == Some(true) {
        return match result {
            Ok(()) => Ok(()),
            Err(e) => Err(format!("expected valid, got {}", e)),
        };
    }

    let Some(expected) = &case.expected.errors else {
        return Err("case declares no expectation".to_string());
    };
    let errors = match result {
        Err(CheckError::Validation(errors)) => errors,
        other => return Err(format!("expected validation errors, got {:?}", other)),
    };

    if errors.len() != expected.len() {
        return Err(format!(
            "expected {} failing fields, got {}: {}",
            expected.len(),
            errors.len(),
            errors
        ));
    }
    for want in expected {
        let Some(got) = errors.get(&want.field).and_then(|e| e.first()) else {
            return Err(format!("no error at '{}': {}", want.field, errors));
        };
        if got.rule != want.rule {
            return Err(format!(
                "'{}': expected rule {}, got {}",
                want.field, want.rule, got.rule
            ));
        }
        if let Some(value) = &want.value {
            let matches = got
                .value
                .as_ref()
                .is_some_and(|v| values_structurally_equal(v, value));
            if !matches {
                return Err(format!(
                    "'{}': expected value {}, got {:?}",
                    want.field, value, got.value
                ));
            }
        }
        if let Some(accepted) = &want.accepted
            && got.accepted != *accepted
        {
            return Err(format!(
                "'{}': expected accepted {:?}, got {:?}",
                want.field, accepted, got.accepted
            ));
        }
    }
    Ok(())
}

#[test]
fn validate_conformance_suite() {
    let suite_path = conformance_dir().join("validate/suite.yaml");
    assert!(
        suite_path.exists(),
        "Conformance fixture not found: {:?}",
        suite_path
    );

    let content = std::fs::read_to_string(&suite_path).unwrap();
    let cases: Vec<TestCase> = serde_saphyr::from_str(&content).unwrap();

    let mut passed = 0;
    let mut failed = 0;

    for case in &cases {
        match run_case(case) {
            Ok(()) => passed += 1,
            Err(reason) => {
                eprintln!("  FAIL [{}] {}: {}", case.id, case.name, reason);
                failed += 1;
            }
        }
    }

    eprintln!(
        "\nValidation conformance: {} passed, {} failed out of {} total",
        passed,
        failed,
        cases.len()
    );

    assert!(passed > 0, "No validation conformance cases were tested");
    assert_eq!(failed, 0, "{} validation conformance cases failed", failed);
}
