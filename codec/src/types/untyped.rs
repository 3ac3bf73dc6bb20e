//! Codec for the universal base type.

use crate::{
    codec::{Codec, Context, Factory, Resolution, SharedCodec},
    descriptor::TypeDescriptor,
    registry::Registry,
    stream::{TokenReader, TokenWriter},
    value::Value,
    Error,
};
use std::sync::{Arc, LazyLock};

/// Dispatches on what is actually there.
///
/// Reads pick a codec from the kind of the current token (integers bind to `i64`, objects
/// to string-keyed mappings of untyped values). Writes pick a codec from the runtime type
/// of the value.
pub struct UntypedCodec;

impl Codec for UntypedCodec {
    fn read(
        &self,
        _: &TypeDescriptor,
        reader: &mut dyn TokenReader,
        ctx: &mut Context<'_>,
    ) -> Result<Value, Error> {
        let kind = reader.value_type()?;
        match kind.descriptor() {
            Some(ty) => ctx.read(&ty, reader),
            None => Ok(Value::Null),
        }
    }

    fn write(
        &self,
        value: &Value,
        _: &TypeDescriptor,
        writer: &mut dyn TokenWriter,
        ctx: &mut Context<'_>,
    ) -> Result<(), Error> {
        if value.is_null() {
            return writer.write_null();
        }
        let runtime = value.runtime_type();
        if runtime.is_any() {
            return Err(Error::UnsupportedOperation(
                "cannot write a value of the universal base type".into(),
            ));
        }
        ctx.write(value, &runtime, writer)
    }
}

static UNTYPED: LazyLock<SharedCodec> = LazyLock::new(|| Arc::new(UntypedCodec));

/// Claims the universal base type.
pub struct UntypedFactory;

impl Factory for UntypedFactory {
    fn create(&self, ty: &TypeDescriptor, _: &Registry) -> Result<Resolution, Error> {
        if !ty.is_any() {
            return Ok(Resolution::Declined);
        }
        Ok(Resolution::Claimed(UNTYPED.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{stream::JsonWriter, value::Custom, Config};
    use std::collections::HashMap;

    #[test]
    fn test_read_by_token_kind() {
        let registry = Registry::new(Config::default()).unwrap();
        let value: Value = registry
            .deserialize(r#"{"a":[1,2.5,"x",true,null],"b":{}}"#)
            .unwrap();
        let expected = Value::Map(HashMap::from([
            (
                "a".to_string(),
                Value::List(vec![
                    Value::Long(1),
                    Value::Double(2.5),
                    Value::Text("x".into()),
                    Value::Bool(true),
                    Value::Null,
                ]),
            ),
            ("b".to_string(), Value::Map(HashMap::new())),
        ]));
        assert_eq!(value, expected);
    }

    #[test]
    fn test_write_bare_object() {
        let registry = Registry::new(Config::default()).unwrap();
        let mut writer = JsonWriter::new();
        assert!(matches!(
            registry.write(
                &Value::Custom(Custom::bare()),
                &TypeDescriptor::any(),
                &mut writer
            ),
            Err(Error::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_write_unknown_runtime_type() {
        struct Opaque;
        let registry = Registry::new(Config::default()).unwrap();
        let value = Value::Custom(Custom::new(TypeDescriptor::of::<Opaque>(), 7u8));
        let mut writer = JsonWriter::new();
        assert!(matches!(
            registry.write(&value, &TypeDescriptor::any(), &mut writer),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_null_root() {
        let registry = Registry::new(Config::default()).unwrap();
        assert_eq!(registry.deserialize::<Value>("null").unwrap(), Value::Null);
        assert_eq!(registry.serialize(&Value::Null).unwrap(), "null");
    }
}
