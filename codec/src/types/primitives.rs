//! Codecs for scalar types.
//!
//! Every scalar codec is stateless and shared process-wide: resolving `i32` from any
//! registry yields the same instance.
//!
//! # Text in place of numbers
//!
//! JSON producers often quote numbers and booleans. Non-nullable scalars accept such text
//! and parse it with Rust's grammar for the type, but reject the empty string. Nullable
//! scalars (`Option<bool>`, `Option<i32>`, `Option<i64>`, `Option<f64>`) additionally read
//! the empty string as null.
//!
//! # Generic numbers
//!
//! [Number] keeps the narrowest representation of what was read: a token with a
//! fractional separator becomes a double, anything else the first of `i32` and `i64`
//! that holds it. Like the other scalars it rejects null and the empty string, which only
//! read as null through `Option<Number>`.

use super::{nullable::NullableCodec, unexpected};
use crate::{
    codec::{Codec, Context, Factory, Resolution, SharedCodec},
    descriptor::TypeDescriptor,
    registry::Registry,
    stream::{Scalar, TokenReader, TokenWriter, ValueType},
    value::{Number, Value},
    Error,
};
use paste::paste;
use std::sync::{Arc, LazyLock};

macro_rules! impl_scalar {
    ($type:ty, $name:ident, $read_method:ident, $variant:ident, [$($accept:ident),+]) => {
        paste! {
            #[doc = concat!("Codec for `", stringify!($type), "`.")]
            pub struct [<$name Codec>];

            impl Codec for [<$name Codec>] {
                fn read(
                    &self,
                    _: &TypeDescriptor,
                    reader: &mut dyn TokenReader,
                    _: &mut Context<'_>,
                ) -> Result<Value, Error> {
                    reader.$read_method().map(Value::$variant)
                }

                fn write(
                    &self,
                    value: &Value,
                    ty: &TypeDescriptor,
                    writer: &mut dyn TokenWriter,
                    _: &mut Context<'_>,
                ) -> Result<(), Error> {
                    match value {
                        $(Value::$accept(v) => writer.write_value(Scalar::from(*v)),)+
                        other => Err(unexpected(ty, other)),
                    }
                }
            }

            static [<$name:upper>]: LazyLock<SharedCodec> =
                LazyLock::new(|| Arc::new([<$name Codec>]));

            static [<NULLABLE_ $name:upper>]: LazyLock<SharedCodec> =
                LazyLock::new(|| Arc::new(NullableCodec::blank_as_null([<$name:upper>].clone())));
        }
    };
}

impl_scalar!(bool, Bool, value_as_boolean, Bool, [Bool]);
impl_scalar!(i32, Int, value_as_int, Int, [Int]);
impl_scalar!(i64, Long, value_as_long, Long, [Long, Int]);
impl_scalar!(f64, Double, value_as_double, Double, [Double, Int]);

/// Codec for `String`.
pub struct StringCodec;

impl Codec for StringCodec {
    fn read(
        &self,
        _: &TypeDescriptor,
        reader: &mut dyn TokenReader,
        _: &mut Context<'_>,
    ) -> Result<Value, Error> {
        reader.value_as_string().map(Value::Text)
    }

    fn write(
        &self,
        value: &Value,
        ty: &TypeDescriptor,
        writer: &mut dyn TokenWriter,
        _: &mut Context<'_>,
    ) -> Result<(), Error> {
        match value {
            Value::Text(text) => writer.write_value(Scalar::Text(text)),
            other => Err(unexpected(ty, other)),
        }
    }
}

static STRING: LazyLock<SharedCodec> = LazyLock::new(|| Arc::new(StringCodec));

/// Parses integer text into the narrowest of `i32` and `i64`.
fn narrowest(text: &str, kind: ValueType) -> Result<Value, Error> {
    if let Ok(int) = text.parse::<i32>() {
        return Ok(Value::Int(int));
    }
    text.parse::<i64>()
        .map(Value::Long)
        .map_err(|_| Error::NumberFormat {
            text: text.to_string(),
            kind,
        })
}

/// Codec for [Number].
pub struct NumberCodec;

impl Codec for NumberCodec {
    fn read(
        &self,
        _: &TypeDescriptor,
        reader: &mut dyn TokenReader,
        _: &mut Context<'_>,
    ) -> Result<Value, Error> {
        match reader.value_type()? {
            ValueType::Double => reader.value_as_double().map(Value::Double),
            kind @ ValueType::Integer => narrowest(&reader.value_as_string()?, kind),
            kind @ ValueType::String => {
                let text = reader.value_as_string()?;
                if !text.contains('.') {
                    return narrowest(&text, kind);
                }
                text.parse()
                    .map(Value::Double)
                    .map_err(|_| Error::NumberFormat { text, kind })
            }
            kind => Err(Error::NumberFormat {
                text: reader.value_as_string().unwrap_or_default(),
                kind,
            }),
        }
    }

    fn write(
        &self,
        value: &Value,
        ty: &TypeDescriptor,
        writer: &mut dyn TokenWriter,
        _: &mut Context<'_>,
    ) -> Result<(), Error> {
        match value {
            Value::Int(v) => writer.write_value(Scalar::from(*v)),
            Value::Long(v) => writer.write_value(Scalar::from(*v)),
            Value::Double(v) => writer.write_value(Scalar::from(*v)),
            other => Err(unexpected(ty, other)),
        }
    }
}

static NUMBER: LazyLock<SharedCodec> = LazyLock::new(|| Arc::new(NumberCodec));

static NULLABLE_NUMBER: LazyLock<SharedCodec> =
    LazyLock::new(|| Arc::new(NullableCodec::blank_as_null(NUMBER.clone())));

fn primitive(ty: &TypeDescriptor) -> Option<&'static LazyLock<SharedCodec>> {
    if !ty.args().is_empty() {
        return None;
    }
    let codec = if ty.is::<bool>() {
        &BOOL
    } else if ty.is::<i32>() {
        &INT
    } else if ty.is::<i64>() {
        &LONG
    } else if ty.is::<f64>() {
        &DOUBLE
    } else if ty.is::<String>() {
        &STRING
    } else if ty.is::<Number>() {
        &NUMBER
    } else {
        return None;
    };
    Some(codec)
}

fn nullable(ty: &TypeDescriptor) -> Option<&'static LazyLock<SharedCodec>> {
    if !ty.is_nullable() {
        return None;
    }
    let inner = ty.element_type();
    if !inner.args().is_empty() {
        return None;
    }
    let codec = if inner.is::<bool>() {
        &NULLABLE_BOOL
    } else if inner.is::<i32>() {
        &NULLABLE_INT
    } else if inner.is::<i64>() {
        &NULLABLE_LONG
    } else if inner.is::<f64>() {
        &NULLABLE_DOUBLE
    } else if inner.is::<Number>() {
        &NULLABLE_NUMBER
    } else {
        return None;
    };
    Some(codec)
}

/// Claims the scalar types and their nullable counterparts.
pub struct ScalarFactory;

impl Factory for ScalarFactory {
    fn create(&self, ty: &TypeDescriptor, _: &Registry) -> Result<Resolution, Error> {
        Ok(match primitive(ty).or_else(|| nullable(ty)) {
            Some(codec) => Resolution::Claimed((**codec).clone()),
            None => Resolution::Declined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bind::Bind, stream::JsonReader, Config};
    use test_case::test_case;

    fn read<T: Bind>(json: &str) -> Result<Value, Error> {
        let registry = Registry::new(Config::default()).unwrap();
        let mut reader = JsonReader::new(json).unwrap();
        registry.read(&T::descriptor(), &mut reader)
    }

    #[test]
    fn test_singletons() {
        let a = Registry::new(Config::default()).unwrap();
        let b = Registry::new(Config::default()).unwrap();
        let ty = TypeDescriptor::of::<i32>();
        assert!(Arc::ptr_eq(&a.resolve(&ty).unwrap(), &b.resolve(&ty).unwrap()));

        let ty = <Option<f64>>::descriptor();
        assert!(Arc::ptr_eq(&a.resolve(&ty).unwrap(), &b.resolve(&ty).unwrap()));
    }

    #[test_case(r#""""# ; "empty string")]
    #[test_case("null" ; "null token")]
    fn test_nullable_blank(json: &str) {
        assert_eq!(read::<Option<i32>>(json).unwrap(), Value::Null);
        assert_eq!(read::<Option<i64>>(json).unwrap(), Value::Null);
        assert_eq!(read::<Option<f64>>(json).unwrap(), Value::Null);
        assert_eq!(read::<Option<bool>>(json).unwrap(), Value::Null);
    }

    #[test]
    fn test_quoted_scalars() {
        assert_eq!(read::<i32>(r#""42""#).unwrap(), Value::Int(42));
        assert_eq!(read::<i64>(r#""-7""#).unwrap(), Value::Long(-7));
        assert_eq!(read::<f64>(r#""2.5""#).unwrap(), Value::Double(2.5));
        assert_eq!(read::<bool>(r#""true""#).unwrap(), Value::Bool(true));
        assert_eq!(read::<Option<i32>>(r#""42""#).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_non_nullable_rejects_blank() {
        assert!(matches!(
            read::<i32>(r#""""#),
            Err(Error::NumberFormat { kind: ValueType::String, .. })
        ));
        assert!(matches!(read::<bool>(r#""""#), Err(Error::InvalidBool(_))));
    }

    #[test]
    fn test_int_overflow() {
        assert!(matches!(
            read::<i32>("4294967296"),
            Err(Error::NumberFormat { kind: ValueType::Integer, .. })
        ));
        assert_eq!(read::<i64>("4294967296").unwrap(), Value::Long(4294967296));
    }

    #[test_case(r#""3.14""#, Value::Double(314.0 / 100.0) ; "quoted fraction")]
    #[test_case(r#""42""#, Value::Int(42) ; "quoted integer")]
    #[test_case(r#""4294967296""#, Value::Long(4294967296) ; "quoted long")]
    #[test_case("42", Value::Int(42) ; "integer")]
    #[test_case("-4294967296", Value::Long(-4294967296) ; "long")]
    #[test_case("0.5", Value::Double(0.5) ; "double")]
    fn test_number(json: &str, expected: Value) {
        assert_eq!(read::<Number>(json).unwrap(), expected);
    }

    #[test_case(r#""""#, Value::Null ; "empty string")]
    #[test_case("null", Value::Null ; "null token")]
    #[test_case(r#""7""#, Value::Int(7) ; "quoted integer")]
    #[test_case("0.5", Value::Double(0.5) ; "double")]
    fn test_nullable_number(json: &str, expected: Value) {
        assert_eq!(read::<Option<Number>>(json).unwrap(), expected);
    }

    #[test_case(r#""""#, ValueType::String ; "empty string")]
    #[test_case("null", ValueType::Null ; "null token")]
    #[test_case(r#""abc""#, ValueType::String ; "text")]
    #[test_case(r#""1.2.3""#, ValueType::String ; "two separators")]
    #[test_case("true", ValueType::Boolean ; "boolean")]
    #[test_case("[1]", ValueType::Array ; "array")]
    fn test_number_format(json: &str, expected: ValueType) {
        match read::<Number>(json) {
            Err(Error::NumberFormat { kind, .. }) => assert_eq!(kind, expected),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_write_mismatch() {
        let registry = Registry::new(Config::default()).unwrap();
        let mut writer = crate::stream::JsonWriter::new();
        assert!(matches!(
            registry.write(&Value::Text("x".into()), &i32::descriptor(), &mut writer),
            Err(Error::UnexpectedValue { found: "text", .. })
        ));
    }
}
