use std::{collections::HashMap, fmt::Debug};
use test_case::test_case;
use weft_codec::{value::Number, Bind, Config, Error, Registry, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

fn registry() -> Registry {
    Registry::new(Config::default()).unwrap()
}

fn check<T: Bind + PartialEq + Debug>(value: T, expected: &str) {
    init_tracing();
    let registry = registry();
    let json = registry.serialize(&value).unwrap();
    assert_eq!(json, expected);
    let decoded: T = registry.deserialize(&json).unwrap();
    assert_eq!(decoded, value);
}

#[test_case(true, "true" ; "true")]
#[test_case(false, "false" ; "false")]
fn test_bool(value: bool, expected: &str) {
    check(value, expected);
}

#[test_case(0, "0" ; "zero")]
#[test_case(i32::MIN, "-2147483648" ; "min")]
#[test_case(i32::MAX, "2147483647" ; "max")]
fn test_int(value: i32, expected: &str) {
    check(value, expected);
}

#[test_case(i64::MIN, "-9223372036854775808" ; "min")]
#[test_case(1 << 40, "1099511627776" ; "wide")]
fn test_long(value: i64, expected: &str) {
    check(value, expected);
}

#[test_case(0.5, "0.5" ; "half")]
#[test_case(-1.0e-7, "-1e-7" ; "small")]
#[test_case(2.0, "2.0" ; "integral")]
fn test_double(value: f64, expected: &str) {
    check(value, expected);
}

#[test_case("", r#""""# ; "empty")]
#[test_case("tab\tquote\"", r#""tab\tquote\"""# ; "escapes")]
#[test_case("ünïcødé ✓", r#""ünïcødé ✓""# ; "unicode")]
fn test_string(value: &str, expected: &str) {
    check(value.to_string(), expected);
}

#[test]
fn test_nested_containers() {
    check(vec![vec![1, 2], vec![], vec![3]], "[[1,2],[],[3]]");
    check(
        vec![Some(1.5), None].into_boxed_slice(),
        "[1.5,null]",
    );
    check(
        HashMap::from([("k".to_string(), vec![Some("v".to_string()), None])]),
        r#"{"k":["v",null]}"#,
    );
}

#[test]
fn test_deep_nesting() {
    let inner = HashMap::from([("leaf".to_string(), vec![Some(true)])]);
    let value = vec![HashMap::from([("branch".to_string(), inner)])];
    check(value, r#"[{"branch":{"leaf":[true]}}]"#);
}

#[test]
fn test_lenient_reads() {
    init_tracing();
    let registry = registry();
    // Numbers written as strings
    assert_eq!(registry.deserialize::<i32>(r#""42""#).unwrap(), 42);
    assert_eq!(registry.deserialize::<f64>(r#""2.5""#).unwrap(), 2.5);
    // Integers widen
    assert_eq!(registry.deserialize::<f64>("3").unwrap(), 3.0);
    // Blank nullable scalars read as null, blank strings do not
    assert_eq!(registry.deserialize::<Option<i64>>(r#""""#).unwrap(), None);
    assert_eq!(
        registry.deserialize::<Option<String>>(r#""""#).unwrap(),
        Some(String::new())
    );
}

#[test_case("1", Some(Number::Int(1)) ; "int")]
#[test_case("4294967296", Some(Number::Long(4_294_967_296)) ; "long")]
#[test_case("0.25", Some(Number::Double(0.25)) ; "double")]
#[test_case(r#""7""#, Some(Number::Int(7)) ; "quoted")]
#[test_case(r#""""#, None ; "blank")]
#[test_case("null", None ; "null")]
fn test_number(text: &str, expected: Option<Number>) {
    init_tracing();
    let decoded: Option<Number> = registry().deserialize(text).unwrap();
    assert_eq!(decoded, expected);
}

#[test_case(r#""""# ; "blank")]
#[test_case("null" ; "null")]
fn test_number_requires_value(text: &str) {
    init_tracing();
    assert!(matches!(
        registry().deserialize::<Number>(text),
        Err(Error::NumberFormat { .. })
    ));
}

#[test_case("18446744073709551615", Value::Double(u64::MAX as f64) ; "beyond i64")]
#[test_case("9223372036854775807", Value::Long(i64::MAX) ; "i64 max")]
fn test_untyped_wide_integers(text: &str, expected: Value) {
    init_tracing();
    assert_eq!(registry().deserialize::<Value>(text).unwrap(), expected);
}

#[test]
fn test_untyped_document() {
    init_tracing();
    let registry = registry();
    let text = r#"{"name":"weft","tags":["a","b"],"size":3,"ratio":0.5,"nested":{"ok":true},"none":null}"#;
    let value: Value = registry.deserialize(text).unwrap();
    let Value::Map(fields) = &value else {
        panic!("expected a map, found {value:?}");
    };
    assert_eq!(fields["name"], Value::Text("weft".into()));
    assert_eq!(fields["size"], Value::Long(3));
    assert_eq!(fields["ratio"], Value::Double(0.5));
    assert_eq!(fields["none"], Value::Null);
    assert_eq!(
        fields["tags"],
        Value::List(vec![Value::Text("a".into()), Value::Text("b".into())])
    );

    let json = registry.serialize(&value).unwrap();
    let again: Value = registry.deserialize(&json).unwrap();
    assert_eq!(again, value);
}

#[test_case("[1,2" ; "truncated")]
#[test_case("{\"a\":}" ; "missing value")]
#[test_case("" ; "empty")]
fn test_malformed_text(text: &str) {
    init_tracing();
    assert!(matches!(
        registry().deserialize::<Value>(text),
        Err(Error::MalformedStream(_))
    ));
}

#[test]
fn test_shape_mismatch() {
    init_tracing();
    let registry = registry();
    assert!(registry.deserialize::<Vec<i32>>(r#"{"a":1}"#).is_err());
    assert!(registry.deserialize::<HashMap<String, i32>>("[1]").is_err());
    assert!(matches!(
        registry.deserialize::<Vec<i32>>(r#"[1,"x"]"#),
        Err(Error::NumberFormat { .. })
    ));
    assert!(matches!(
        registry.deserialize::<bool>(r#""yes""#),
        Err(Error::InvalidBool(_))
    ));
}

#[test]
fn test_non_finite_double() {
    init_tracing();
    assert!(registry().serialize(&f64::INFINITY).is_err());
}
