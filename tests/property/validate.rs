use payload_rules::document::Document;
use payload_rules::rules::RuleTable;
use payload_rules::validate::Validator;
use proptest::prelude::*;
use serde_json::{Value, json};

fn arb_json(depth: u32) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|i| json!(i)),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(|f| json!(f)),
        "[a-zA-Z0-9 ]{0,10}".prop_map(Value::String),
    ];

    leaf.prop_recursive(depth, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::vec(("(id|name|tags|meta)", inner), 1..4).prop_map(|pairs| {
                let map: serde_json::Map<String, Value> = pairs.into_iter().collect();
                Value::Object(map)
            }),
        ]
    })
}

fn rules() -> RuleTable {
    let mut rules = RuleTable::new();
    rules.add_rule("id", "required,integer,min=1", None).unwrap();
    rules.add_rule("name", "omitempty,string,max=8", Some("^[a-z]+$")).unwrap();
    rules.add_rule("tags[]", "required,string", None).unwrap();
    rules.add_rule("meta", "required", None).unwrap();
    rules.add_rule("meta.tags[].name", "required,alphanum", None).unwrap();
    rules.add_rule("meta.id", "omitempty,boolean,max=0", None).unwrap();
    rules
}

/// `a[0].b[]` → `a.b`: the path with every bracket group removed.
fn strip_brackets(path: &str) -> String {
    let mut out = String::new();
    let mut depth = 0;
    for c in path.chars() {
        match c {
            '[' => depth += 1,
            ']' => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

proptest! {
    #[test]
    fn validation_is_idempotent(input in arb_json(3)) {
        let doc = Document::from_value(input);
        let rules = rules();
        let validator = Validator::new(&doc, &rules).unwrap();
        prop_assert_eq!(validator.validate(), validator.validate());
    }

    #[test]
    fn every_error_names_a_declared_rule(input in arb_json(3)) {
        let doc = Document::from_value(input);
        let rules = rules();
        if let Err(errors) = Validator::new(&doc, &rules).unwrap().validate() {
            for (field, entries) in errors.iter() {
                prop_assert_eq!(entries.len(), 1);
                prop_assert_eq!(entries[0].field.as_str(), field);
                let shape = strip_brackets(field);
                let governed = rules.iter().any(|r| strip_brackets(r.literal()) == shape);
                prop_assert!(governed, "no rule governs {}", field);
            }
        }
    }

    #[test]
    fn booleans_never_fail_size_bounds(flag in any::<bool>()) {
        let doc = Document::from_value(json!({"meta": {"id": flag, "tags": []}}));
        let rules = rules();
        let errors = Validator::new(&doc, &rules).unwrap().validate().unwrap_err();
        prop_assert!(!errors.contains("meta.id"));
    }
}
