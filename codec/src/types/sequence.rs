//! Codec for growable sequences and fixed-size arrays.
//!
//! Both shapes carry their element type as the single type argument, so one codec serves
//! both: sequences read into [Value::List], arrays into [Value::Array].

use super::unexpected;
use crate::{
    codec::{Codec, Context, Factory, Resolution, Segment, SharedCodec},
    descriptor::{Array, TypeDescriptor},
    registry::Registry,
    stream::{TokenReader, TokenWriter},
    value::Value,
    Error,
};
use std::sync::Arc;

/// Initial capacity of the buffer an array is read into.
pub const SEED_CAPACITY: usize = 10;

/// Capacity of the array buffer once `old` slots are full.
pub fn next_capacity(old: usize) -> usize {
    old.saturating_mul(2).saturating_add(1)
}

/// Reads and writes a JSON array element by element.
pub struct SequenceCodec {
    element_type: TypeDescriptor,
    element: SharedCodec,
    fixed: bool,
}

impl SequenceCodec {
    pub fn new(element_type: TypeDescriptor, element: SharedCodec, fixed: bool) -> Self {
        Self {
            element_type,
            element,
            fixed,
        }
    }

    fn read_elements(
        &self,
        reader: &mut dyn TokenReader,
        ctx: &mut Context<'_>,
        items: &mut Vec<Value>,
    ) -> Result<(), Error> {
        while reader.has_next() {
            reader.next()?;
            if self.fixed && items.len() == items.capacity() {
                items.reserve_exact(next_capacity(items.capacity()) - items.len());
            }
            ctx.enter(Segment::Index(items.len()));
            items.push(self.element.read(&self.element_type, reader, ctx)?);
            ctx.leave();
        }
        Ok(())
    }
}

impl Codec for SequenceCodec {
    fn read(
        &self,
        _: &TypeDescriptor,
        reader: &mut dyn TokenReader,
        ctx: &mut Context<'_>,
    ) -> Result<Value, Error> {
        reader.begin_array()?;
        let mut items = if self.fixed {
            Vec::with_capacity(SEED_CAPACITY)
        } else {
            Vec::new()
        };
        self.read_elements(reader, ctx, &mut items)?;
        reader.end_array()?;

        if self.fixed {
            // Trim to the exact element count
            return Ok(Value::Array(items.into_boxed_slice()));
        }
        Ok(Value::List(items))
    }

    fn write(
        &self,
        value: &Value,
        ty: &TypeDescriptor,
        writer: &mut dyn TokenWriter,
        ctx: &mut Context<'_>,
    ) -> Result<(), Error> {
        let items = match value {
            Value::List(items) => items.as_slice(),
            Value::Array(items) => &items[..],
            other => return Err(unexpected(ty, other)),
        };
        writer.begin_array()?;
        for (index, item) in items.iter().enumerate() {
            if item.is_null() {
                writer.write_null()?;
                continue;
            }
            ctx.enter(Segment::Index(index));
            self.element.write(item, &self.element_type, writer, ctx)?;
            ctx.leave();
        }
        writer.end_array()
    }
}

/// Claims sequences and arrays.
pub struct SequenceFactory;

impl Factory for SequenceFactory {
    fn create(&self, ty: &TypeDescriptor, registry: &Registry) -> Result<Resolution, Error> {
        if !ty.is_container() {
            return Ok(Resolution::Declined);
        }
        let element_type = ty.element_type();
        let element = registry.resolve(&element_type)?;
        Ok(Resolution::Claimed(Arc::new(SequenceCodec::new(
            element_type,
            element,
            ty.is::<Array>(),
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bind, Config};

    #[test]
    fn test_next_capacity() {
        assert_eq!(next_capacity(SEED_CAPACITY), 21);
        assert_eq!(next_capacity(21), 43);
        assert_eq!(next_capacity(usize::MAX), usize::MAX);
    }

    #[test]
    fn test_array_growth() {
        let registry = Registry::new(Config::default()).unwrap();
        for n in [0usize, 1, SEED_CAPACITY, SEED_CAPACITY + 1, 1000] {
            let original: Box<[i64]> = (0..n as i64).collect();
            let json = registry.serialize(&original).unwrap();
            let decoded: Box<[i64]> = registry.deserialize(&json).unwrap();
            assert_eq!(decoded, original);
        }
    }

    #[test]
    fn test_shapes() {
        let registry = Registry::new(Config::default()).unwrap();
        let mut reader = crate::stream::JsonReader::new("[1,2,3]").unwrap();
        let list = registry.read(&<Vec<i32>>::descriptor(), &mut reader).unwrap();
        assert!(matches!(list, Value::List(ref items) if items.len() == 3));

        let mut reader = crate::stream::JsonReader::new("[1,2,3]").unwrap();
        let array = registry.read(&<Box<[i32]>>::descriptor(), &mut reader).unwrap();
        assert!(matches!(array, Value::Array(ref items) if items.len() == 3));
    }

    #[test]
    fn test_empty() {
        let registry = Registry::new(Config::default()).unwrap();
        assert_eq!(registry.serialize(&Vec::<bool>::new()).unwrap(), "[]");
        let decoded: Vec<bool> = registry.deserialize("[]").unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_element_failure() {
        let registry = Registry::new(Config::default()).unwrap();
        assert!(matches!(
            registry.deserialize::<Vec<i32>>(r#"[1,"x"]"#),
            Err(Error::NumberFormat { .. })
        ));
    }

    #[test]
    fn test_null_elements() {
        let registry = Registry::new(Config::default()).unwrap();
        let values = vec![Some(1), None, Some(3)];
        let json = registry.serialize(&values).unwrap();
        assert_eq!(json, "[1,null,3]");
        let decoded: Vec<Option<i32>> = registry.deserialize(&json).unwrap();
        assert_eq!(decoded, values);
    }
}
