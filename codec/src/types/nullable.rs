//! Codec for values that may be absent.

use crate::{
    codec::{Codec, Context, Factory, Resolution, SharedCodec},
    descriptor::TypeDescriptor,
    registry::Registry,
    stream::{TokenReader, TokenWriter, ValueType},
    value::Value,
    Error,
};
use std::sync::Arc;

/// Wraps the codec of the inner type, mapping the null marker to [Value::Null].
pub struct NullableCodec {
    inner: SharedCodec,
    blank_as_null: bool,
}

impl NullableCodec {
    pub fn new(inner: SharedCodec) -> Self {
        Self {
            inner,
            blank_as_null: false,
        }
    }

    /// Like [NullableCodec::new], but an empty string token also reads as null.
    pub fn blank_as_null(inner: SharedCodec) -> Self {
        Self {
            inner,
            blank_as_null: true,
        }
    }
}

impl Codec for NullableCodec {
    fn read(
        &self,
        ty: &TypeDescriptor,
        reader: &mut dyn TokenReader,
        ctx: &mut Context<'_>,
    ) -> Result<Value, Error> {
        match reader.value_type()? {
            ValueType::Null => return Ok(Value::Null),
            ValueType::String if self.blank_as_null && reader.value_as_string()?.is_empty() => {
                return Ok(Value::Null)
            }
            _ => {}
        }
        self.inner.read(&ty.element_type(), reader, ctx)
    }

    fn write(
        &self,
        value: &Value,
        ty: &TypeDescriptor,
        writer: &mut dyn TokenWriter,
        ctx: &mut Context<'_>,
    ) -> Result<(), Error> {
        match value {
            Value::Null => writer.write_null(),
            value => self.inner.write(value, &ty.element_type(), writer, ctx),
        }
    }
}

/// Claims nullable types not already handled as nullable scalars.
pub struct NullableFactory;

impl Factory for NullableFactory {
    fn create(&self, ty: &TypeDescriptor, registry: &Registry) -> Result<Resolution, Error> {
        if !ty.is_nullable() {
            return Ok(Resolution::Declined);
        }
        let inner = registry.resolve(&ty.element_type())?;
        Ok(Resolution::Claimed(Arc::new(NullableCodec::new(inner))))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Config, Registry};

    #[test]
    fn test_nullable_text() {
        let registry = Registry::new(Config::default()).unwrap();
        let value: Option<String> = registry.deserialize("null").unwrap();
        assert_eq!(value, None);

        // Blank text is a value for strings
        let value: Option<String> = registry.deserialize(r#""""#).unwrap();
        assert_eq!(value, Some(String::new()));

        assert_eq!(registry.serialize(&None::<String>).unwrap(), "null");
        assert_eq!(registry.serialize(&Some("a".to_string())).unwrap(), r#""a""#);
    }

    #[test]
    fn test_nullable_sequence() {
        let registry = Registry::new(Config::default()).unwrap();
        let value: Option<Vec<i32>> = registry.deserialize("[1,2]").unwrap();
        assert_eq!(value, Some(vec![1, 2]));
        let value: Option<Vec<i32>> = registry.deserialize("null").unwrap();
        assert_eq!(value, None);
    }
}
