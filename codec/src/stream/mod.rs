//! Cursor-based token streams consumed and produced by codecs.
//!
//! A [TokenReader] exposes one "current" value at a time. Containers are entered with
//! `begin_array`/`begin_object`, walked with `has_next`/`next`, and left with
//! `end_array`/`end_object`, after which the container itself is current again.
//!
//! A [TokenWriter] is the mirror image: codecs emit container markers, field names and
//! scalar values in document order.

use crate::{descriptor::TypeDescriptor, Error};
use std::fmt;

mod json;
pub use json::{JsonReader, JsonWriter};

/// Intrinsic kind of the current token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Integer,
    Double,
    Boolean,
    Array,
    Object,
    Null,
}

impl ValueType {
    /// The type a value of this kind binds to when no type was declared.
    ///
    /// Returns `None` for [ValueType::Null], which has no runtime type.
    pub fn descriptor(&self) -> Option<TypeDescriptor> {
        let ty = match self {
            Self::String => TypeDescriptor::of::<String>(),
            Self::Integer => TypeDescriptor::of::<i64>(),
            Self::Double => TypeDescriptor::of::<f64>(),
            Self::Boolean => TypeDescriptor::of::<bool>(),
            Self::Array => TypeDescriptor::sequence(TypeDescriptor::any()),
            Self::Object => TypeDescriptor::mapping(TypeDescriptor::any()),
            Self::Null => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "STRING",
            Self::Integer => "INTEGER",
            Self::Double => "DOUBLE",
            Self::Boolean => "BOOLEAN",
            Self::Array => "ARRAY",
            Self::Object => "OBJECT",
            Self::Null => "NULL",
        };
        f.write_str(name)
    }
}

/// A scalar value handed to [TokenWriter::write_value].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar<'a> {
    Bool(bool),
    Integer(i64),
    Double(f64),
    Text(&'a str),
}

impl From<bool> for Scalar<'_> {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Scalar<'_> {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<i64> for Scalar<'_> {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Scalar<'_> {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl<'a> From<&'a str> for Scalar<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

/// Source of tokens.
pub trait TokenReader {
    /// Enters the current array.
    fn begin_array(&mut self) -> Result<(), Error>;

    /// Leaves the innermost array, skipping any unread elements.
    fn end_array(&mut self) -> Result<(), Error>;

    /// Enters the current object.
    fn begin_object(&mut self) -> Result<(), Error>;

    /// Leaves the innermost object, skipping any unread fields.
    fn end_object(&mut self) -> Result<(), Error>;

    /// Returns true if the innermost container has more elements or fields.
    fn has_next(&self) -> bool;

    /// Advances to the next element (or field) and returns its kind.
    fn next(&mut self) -> Result<ValueType, Error>;

    /// Name of the current field. Only valid inside an object.
    fn name(&self) -> Result<&str, Error>;

    /// Kind of the current value.
    fn value_type(&self) -> Result<ValueType, Error>;

    /// Text of the current scalar. Numbers and booleans yield their literal form.
    fn value_as_string(&self) -> Result<String, Error>;

    fn value_as_int(&self) -> Result<i32, Error>;

    fn value_as_long(&self) -> Result<i64, Error>;

    fn value_as_double(&self) -> Result<f64, Error>;

    fn value_as_boolean(&self) -> Result<bool, Error>;
}

/// Sink of tokens.
pub trait TokenWriter {
    fn begin_array(&mut self) -> Result<(), Error>;

    fn end_array(&mut self) -> Result<(), Error>;

    fn begin_object(&mut self) -> Result<(), Error>;

    fn end_object(&mut self) -> Result<(), Error>;

    /// Writes the name of the next field. Only valid inside an object.
    fn write_name(&mut self, name: &str) -> Result<(), Error>;

    fn write_value(&mut self, value: Scalar<'_>) -> Result<(), Error>;

    fn write_null(&mut self) -> Result<(), Error>;
}
