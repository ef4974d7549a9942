use payload_rules::document::Document;
use payload_rules::resolve::resolve;
use payload_rules::rules::RuleTable;
use proptest::prelude::*;
use serde_json::{Value, json};

/// Strategy for arbitrary JSON values nested up to `depth` levels.
fn arb_json(depth: u32) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|i| json!(i)),
        "[a-z]{0,8}".prop_map(Value::String),
    ];

    leaf.prop_recursive(depth, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-c]", inner), 1..4).prop_map(|pairs| {
                let map: serde_json::Map<String, Value> = pairs.into_iter().collect();
                Value::Object(map)
            }),
        ]
    })
}

fn table(path: &str, tokens: &str) -> RuleTable {
    let mut table = RuleTable::new();
    table.add_rule(path, tokens, None).unwrap();
    table
}

proptest! {
    #[test]
    fn plain_path_resolves_once_per_array_element(input in arb_json(3)) {
        let doc = Document::from_value(input.clone());
        let rules = table("a.b", "omitempty");
        let fields = resolve(&doc, &rules);
        let expected: Vec<String> = match input.get("a") {
            Some(Value::Array(items)) => (0..items.len()).map(|i| format!("a[{}].b", i)).collect(),
            Some(Value::Object(_)) => vec!["a.b".to_string()],
            _ => vec![],
        };
        let got: Vec<String> = fields.into_iter().map(|f| f.path).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn placeholders_are_always_absent(input in arb_json(3)) {
        let doc = Document::from_value(input);
        let mut rules = RuleTable::new();
        rules.add_rule("a", "required", None).unwrap();
        rules.add_rule("a[]", "required", None).unwrap();
        rules.add_rule("a.b.c", "required", None).unwrap();
        for field in resolve(&doc, &rules).iter().filter(|f| f.placeholder) {
            prop_assert!(field.value.is_null(), "placeholder at {} carries a value", field.path);
        }
    }

    #[test]
    fn terminal_wildcard_emits_one_field_per_item(items in prop::collection::vec(arb_json(1), 1..10)) {
        let count = items.len();
        let doc = Document::from_value(json!({"list": items}));
        let rules = table("list[]", "required");
        let fields = resolve(&doc, &rules);
        prop_assert_eq!(fields.len(), count);
        for (i, field) in fields.iter().enumerate() {
            prop_assert_eq!(&field.path, &format!("list[{}]", i));
            prop_assert!(!field.placeholder);
        }
    }

    #[test]
    fn fan_out_visits_every_element(ids in prop::collection::vec(any::<i64>(), 0..10)) {
        let items: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
        let doc = Document::from_value(json!({"items": items}));
        let rules = table("items[].id", "required");
        let fields = resolve(&doc, &rules);
        prop_assert_eq!(fields.len(), ids.len());
        for (field, id) in fields.iter().zip(&ids) {
            prop_assert_eq!(field.value.to_value(), json!(id));
        }
    }

    #[test]
    fn optional_rules_never_emit_placeholders(input in arb_json(3)) {
        let doc = Document::from_value(input);
        let rules = table("a[].b.c[]", "omitempty");
        prop_assert!(resolve(&doc, &rules).iter().all(|f| !f.placeholder));
    }
}
