//! Codec for string-keyed mappings.

use super::unexpected;
use crate::{
    codec::{Codec, Context, Factory, Resolution, Segment, SharedCodec},
    descriptor::TypeDescriptor,
    registry::Registry,
    stream::{TokenReader, TokenWriter},
    value::Value,
    Error,
};
use std::{collections::HashMap, sync::Arc};

/// Reads and writes a JSON object field by field.
///
/// Writes are polymorphic: a value whose runtime type differs from the declared value type
/// is written with the codec of its runtime type. This is what lets a
/// `HashMap<String, Value>` hold numbers, text and nested maps side by side.
pub struct MapCodec {
    value_type: TypeDescriptor,
    value: SharedCodec,
}

impl MapCodec {
    pub fn new(value_type: TypeDescriptor, value: SharedCodec) -> Self {
        Self { value_type, value }
    }

    fn write_value(
        &self,
        value: &Value,
        writer: &mut dyn TokenWriter,
        ctx: &mut Context<'_>,
    ) -> Result<(), Error> {
        if value.is_null() {
            return writer.write_null();
        }
        let runtime = value.runtime_type();
        if runtime == self.value_type {
            return self.value.write(value, &self.value_type, writer, ctx);
        }
        ctx.resolve(&runtime)?.write(value, &runtime, writer, ctx)
    }
}

impl Codec for MapCodec {
    fn read(
        &self,
        _: &TypeDescriptor,
        reader: &mut dyn TokenReader,
        ctx: &mut Context<'_>,
    ) -> Result<Value, Error> {
        reader.begin_object()?;
        let mut entries = HashMap::new();
        while reader.has_next() {
            reader.next()?;
            let key = reader.name()?.to_string();
            ctx.enter(Segment::Key(key.clone()));
            let value = self.value.read(&self.value_type, reader, ctx)?;
            ctx.leave();
            entries.insert(key, value);
        }
        reader.end_object()?;
        Ok(Value::Map(entries))
    }

    fn write(
        &self,
        value: &Value,
        ty: &TypeDescriptor,
        writer: &mut dyn TokenWriter,
        ctx: &mut Context<'_>,
    ) -> Result<(), Error> {
        let Value::Map(entries) = value else {
            return Err(unexpected(ty, value));
        };
        writer.begin_object()?;
        for (key, value) in entries {
            writer.write_name(key)?;
            ctx.enter(Segment::Key(key.clone()));
            self.write_value(value, writer, ctx)?;
            ctx.leave();
        }
        writer.end_object()
    }
}

/// Claims mappings.
pub struct MapFactory;

impl Factory for MapFactory {
    fn create(&self, ty: &TypeDescriptor, registry: &Registry) -> Result<Resolution, Error> {
        if !ty.is_mapping() {
            return Ok(Resolution::Declined);
        }
        let value_type = ty.value_type();
        let value = registry.resolve(&value_type)?;
        Ok(Resolution::Claimed(Arc::new(MapCodec::new(value_type, value))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{stream::JsonWriter, Config};

    #[test]
    fn test_typed_values() {
        let registry = Registry::new(Config::default()).unwrap();
        let map = HashMap::from([("a".to_string(), 1i32), ("b".to_string(), 2)]);
        let json = registry.serialize(&map).unwrap();
        let decoded: HashMap<String, i32> = registry.deserialize(&json).unwrap();
        assert_eq!(decoded, map);
    }

    #[test]
    fn test_polymorphic_values() {
        let registry = Registry::new(Config::default()).unwrap();
        let map = Value::Map(HashMap::from([(
            "mixed".to_string(),
            Value::List(vec![
                Value::Int(1),
                Value::Text("two".into()),
                Value::Bool(true),
                Value::Double(0.5),
            ]),
        )]));
        let mut writer = JsonWriter::new();
        registry
            .write(&map, &TypeDescriptor::mapping(TypeDescriptor::any()), &mut writer)
            .unwrap();
        assert_eq!(writer.finish().unwrap(), r#"{"mixed":[1,"two",true,0.5]}"#);
    }

    #[test]
    fn test_runtime_type_override() {
        // Declared as i64 but holding an i32: written with the i32 codec
        let registry = Registry::new(Config::default()).unwrap();
        let map = Value::Map(HashMap::from([("n".to_string(), Value::Int(3))]));
        let mut writer = JsonWriter::new();
        registry
            .write(
                &map,
                &TypeDescriptor::mapping(TypeDescriptor::of::<i64>()),
                &mut writer,
            )
            .unwrap();
        assert_eq!(writer.finish().unwrap(), r#"{"n":3}"#);
    }

    #[test]
    fn test_null_values() {
        let registry = Registry::new(Config::default()).unwrap();
        let map = HashMap::from([("gone".to_string(), None::<String>)]);
        assert_eq!(registry.serialize(&map).unwrap(), r#"{"gone":null}"#);
        let decoded: HashMap<String, Option<String>> =
            registry.deserialize(r#"{"gone":null}"#).unwrap();
        assert_eq!(decoded, map);
    }

    #[test]
    fn test_not_a_map() {
        let registry = Registry::new(Config::default()).unwrap();
        assert!(matches!(
            registry.deserialize::<HashMap<String, i32>>("[1]"),
            Err(Error::MalformedStream(_))
        ));
    }
}
