use fjson::{from_str, to_string, Described, NamingConvention, Reader, TypeDescription, TypeDescriptionBuilder, Value};
use quickcheck_macros::quickcheck;

#[derive(Debug, Clone, PartialEq)]
struct Message {
    message: String,
}

impl Described for Message {
    fn describe(convention: NamingConvention) -> TypeDescription<Message> {
        TypeDescriptionBuilder::new(convention)
            .member(
                "message",
                |m: &Message| Value::from(m.message.as_str()),
                |m: &mut Message, v| {
                    if let Value::String(s) = v {
                        m.message = s;
                    }
                },
            )
            .default_constructor(|| Message { message: String::new() })
            .build()
    }
}

#[test]
fn scenario_one_hello_world() {
    let _ = tracing_subscriber::fmt().try_init();
    let m: Message = from_str(r#"{ "message": "Hello, World!" }"#).unwrap();
    assert_eq!(m.message, "Hello, World!");
    assert_eq!(to_string(&m).unwrap(), r#"{"message":"Hello, World!"}"#);
}

#[derive(Debug, Clone, PartialEq)]
struct Nullable3 {
    first: Option<i64>,
    second: Option<bool>,
    third: String,
}

impl Described for Nullable3 {
    fn describe(convention: NamingConvention) -> TypeDescription<Nullable3> {
        TypeDescriptionBuilder::new(convention)
            .member(
                "first",
                |v: &Nullable3| v.first.map(Value::from).unwrap_or(Value::Null),
                |v: &mut Nullable3, val| {
                    v.first = match val {
                        Value::Number(n) => Some(n.as_f64() as i64),
                        _ => None,
                    }
                },
            )
            .nullable()
            .member(
                "second",
                |v: &Nullable3| v.second.map(Value::from).unwrap_or(Value::Null),
                |v: &mut Nullable3, val| {
                    v.second = match val {
                        Value::Bool(b) => Some(b),
                        _ => None,
                    }
                },
            )
            .nullable()
            .member(
                "third",
                |v: &Nullable3| Value::from(v.third.as_str()),
                |v: &mut Nullable3, val| {
                    if let Value::String(s) = val {
                        v.third = s;
                    }
                },
            )
            .default_constructor(|| Nullable3 { first: None, second: None, third: String::new() })
            .build()
    }
}

#[test]
fn scenario_two_all_null_members() {
    let v: Nullable3 = from_str(r#"{"First":null,"Second":null,"Third":null}"#).unwrap();
    assert_eq!(v.first, None);
    assert_eq!(v.second, None);
    assert_eq!(v.third, "");
}

#[test]
fn scenario_three_nested_object_and_array_round_trip() {
    let v: Value = {
        let mut r = Reader::<u8>::new(br#"{"a":1,"b":[2,3,4],"c":{"d":true}}"#).unwrap();
        fjson::value::read_value(&mut r).unwrap()
    };
    let Value::Object(map) = &v else { panic!("expected object") };
    assert_eq!(map.get("a").unwrap().as_str(), None);
    assert_eq!(map["b"].as_array().unwrap().len(), 3);

    let mut w = fjson::Writer::<u8>::new();
    fjson::value::write_value(&mut w, &v, Default::default()).unwrap();
    assert_eq!(w.finalize_string(), r#"{"a":1,"b":[2,3,4],"c":{"d":true}}"#);
}

#[test]
fn scenario_four_depth_exceeded_past_default_ceiling() {
    let json = "[".repeat(65) + &"]".repeat(65);
    let mut r = Reader::<u8>::new(json.as_bytes()).unwrap();
    let err = fjson::value::read_value(&mut r).unwrap_err();
    assert!(matches!(err.kind, fjson::error::ParserErrorKind::DepthExceeded { .. }));
}

#[test]
fn scenario_five_escape_payload_is_exact() {
    let mut w = fjson::Writer::<u8>::new();
    fjson::codec::escape::write_escaped_string(&mut w, "a\"b\\c\u{1}", Default::default());
    let s = w.finalize_string();
    assert_eq!(s, "\"a\\\"b\\\\c\\u0001\"");
}

#[test]
fn integers_round_trip_at_i64_min() {
    let mut w = fjson::Writer::<u8>::new();
    fjson::codec::number::Number::Signed(i64::MIN).write(&mut w).unwrap();
    assert_eq!(w.finalize_string(), "-9223372036854775808");
}

#[test]
fn negative_zero_serializes_as_zero() {
    let mut w = fjson::Writer::<u8>::new();
    fjson::codec::number::Number::Float(-0.0).write(&mut w).unwrap();
    assert_eq!(w.finalize_string(), "0.0");
}

#[test]
fn leading_zero_rejected_inside_a_container() {
    let mut r = Reader::<u8>::new(b"[01]").unwrap();
    assert!(fjson::value::read_value(&mut r).is_err());
}

#[test]
fn bare_dot_rejected() {
    let mut r = Reader::<u8>::new(b".5").unwrap();
    assert!(fjson::value::read_value(&mut r).is_err());
}

#[quickcheck]
fn quickcheck_object_roundtrips_through_value(keys: Vec<String>, vals: Vec<i64>) -> bool {
    let n = keys.len().min(vals.len());
    let mut map = indexmap::IndexMap::new();
    for i in 0..n {
        let key = keys[i].replace('"', "").replace('\\', "");
        if key.is_empty() {
            continue;
        }
        map.insert(key, Value::from(vals[i]));
    }
    let v = Value::Object(map);
    let mut w = fjson::Writer::<u8>::new();
    if fjson::value::write_value(&mut w, &v, Default::default()).is_err() {
        return true;
    }
    let bytes = w.finalize();
    let mut r = Reader::<u8>::new(&bytes).unwrap();
    let back = fjson::value::read_value(&mut r).unwrap();
    back == v
}

#[quickcheck]
fn quickcheck_string_escape_roundtrips(s: String) -> bool {
    let mut w = fjson::Writer::<u8>::new();
    fjson::codec::escape::write_escaped_string(&mut w, &s, Default::default());
    let bytes = w.finalize();
    let mut r = Reader::<u8>::new(&bytes).unwrap();
    r.read_value_token().ok().map(|ev| matches!(ev, fjson::reader::Event::Str(text) if text.as_str() == s)).unwrap_or(false)
}
