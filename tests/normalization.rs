use oppsql::error::OppsqlError;
use oppsql::grouping::{normalize, normalize_grouping, normalize_variables, FilterSpec, GroupingSpec, VariableSpec};
use oppsql::value::Scalar;
use serde_json::json;

fn from_json(value: serde_json::Value) -> Result<GroupingSpec, OppsqlError> {
    GroupingSpec::try_from(value)
}

#[test]
fn name_list_and_empty_filter_are_equivalent() {
    let expected = normalize_grouping(GroupingSpec::from("nCars")).expect("name");
    let from_list = normalize_grouping(GroupingSpec::from(vec!["nCars"])).expect("list");
    let from_map = normalize_grouping(from_json(json!({"nCars": []})).expect("map")).expect("map");
    let from_null = normalize_grouping(from_json(json!({"nCars": null})).expect("null")).expect("null");
    assert_eq!(expected, from_list);
    assert_eq!(expected, from_map);
    assert_eq!(expected, from_null);
    assert_eq!(expected.len(), 1);
    assert!(!expected.get("nCars").unwrap().is_constrained());
}

#[test]
fn json_shapes_match_their_native_counterparts() {
    let native = normalize_grouping(GroupingSpec::filtered([
        ("nCars", FilterSpec::many([200, 100])),
        ("speed", FilterSpec::one(13.9)),
        ("warmup", FilterSpec::one(true)),
        ("config", FilterSpec::one("General")),
    ]))
    .expect("native");
    let parsed = normalize_grouping(
        from_json(json!({"nCars": [200, 100], "speed": 13.9, "warmup": true, "config": "General"})).expect("json"),
    )
    .expect("json");
    assert_eq!(native, parsed);
}

#[test]
fn single_value_and_single_element_list_are_both_singular() {
    let grouping = normalize_grouping(GroupingSpec::filtered([
        ("nCars", FilterSpec::one(320)),
        ("speed", FilterSpec::many([13.9])),
        ("repetition", FilterSpec::Unconstrained),
    ]))
    .expect("grouping");
    assert!(grouping.get("nCars").unwrap().is_singular());
    assert!(grouping.get("speed").unwrap().is_singular());
    assert!(!grouping.get("repetition").unwrap().is_singular());
    assert_eq!(grouping.get("nCars").unwrap().filter(), &[Scalar::Int(320)]);
}

#[test]
fn malformed_filters_are_rejected() {
    for filter in [json!({"a": 1}), json!([[1, 2]]), json!([null]), json!([{"a": 1}])] {
        let result = from_json(json!({ "nCars": filter }));
        assert!(
            matches!(result, Err(OppsqlError::InvalidSpecification(_))),
            "filter {filter} should be rejected"
        );
    }
}

#[test]
fn malformed_grouping_and_variables_are_rejected() {
    assert!(matches!(from_json(json!(5)), Err(OppsqlError::InvalidSpecification(_))));
    assert!(matches!(from_json(json!(["nCars", 1])), Err(OppsqlError::InvalidSpecification(_))));
    assert!(matches!(VariableSpec::try_from(json!(1.5)), Err(OppsqlError::InvalidSpecification(_))));
    assert!(matches!(VariableSpec::try_from(json!(["a", null])), Err(OppsqlError::InvalidSpecification(_))));
    assert!(matches!(
        normalize_variables(VariableSpec::from(Vec::<String>::new())),
        Err(OppsqlError::InvalidSpecification(_))
    ));
}

#[test]
fn variables_keep_their_order() {
    let (grouping, variables) = normalize(GroupingSpec::from("nCars"), VariableSpec::from(vec!["speed", "collisions"]))
        .expect("normalize");
    assert_eq!(grouping.names().collect::<Vec<_>>(), vec!["nCars"]);
    assert_eq!(variables.names(), &["speed".to_string(), "collisions".to_string()]);
    assert_eq!(variables.single(), None);
    let (_, single) = normalize(GroupingSpec::from("nCars"), "collisions".into()).expect("normalize");
    assert_eq!(single.single(), Some("collisions"));
}
