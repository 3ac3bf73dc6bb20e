//! Built-in codecs and the factories that register them.

pub mod map;
pub mod nullable;
pub mod primitives;
pub mod sequence;
pub mod temporal;
pub mod untyped;

use crate::{descriptor::TypeDescriptor, value::Value, Error};

/// Error for a value whose shape does not match the declared type.
pub(crate) fn unexpected(expected: &TypeDescriptor, value: &Value) -> Error {
    Error::UnexpectedValue {
        expected: expected.clone(),
        found: value.kind(),
    }
}
