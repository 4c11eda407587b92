use super::*;
use serde_json::json;

#[test]
fn null_params_mean_no_fields() {
    let p = object("tint", &serde_json::Value::Null).unwrap();
    assert!(p.is_none());
    assert_eq!(number("tint", p, "opacity").unwrap(), None);
    assert_eq!(array::<4>("tint", p, "rgba").unwrap(), None);
    assert_eq!(string("lut", p, "path").unwrap(), None);
}

#[test]
fn non_object_params_are_rejected() {
    let err = object("motion", &json!([1, 2])).unwrap_err();
    assert!(err.to_string().contains("motion params must be an object"));
}

#[test]
fn reads_numbers_arrays_and_strings() {
    let v = json!({"opacity": 0.5, "rgba": [1, 0.5, 0.25, 1], "path": "a.cube"});
    let p = object("x", &v).unwrap();
    assert_eq!(number("x", p, "opacity").unwrap(), Some(0.5));
    assert_eq!(array::<4>("x", p, "rgba").unwrap(), Some([1.0, 0.5, 0.25, 1.0]));
    assert_eq!(string("x", p, "path").unwrap(), Some("a.cube"));
}

#[test]
fn wrong_shapes_are_validation_errors() {
    let v = json!({"opacity": "high", "rgba": [1, 2], "path": "  ", "pos": [1, "a"]});
    let p = object("x", &v).unwrap();
    assert!(number("x", p, "opacity").is_err());
    assert!(array::<4>("x", p, "rgba").is_err());
    assert!(string("x", p, "path").is_err());
    assert!(array::<2>("x", p, "pos").is_err());
}
