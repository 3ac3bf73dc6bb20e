//! Error types for codec operations

use crate::{descriptor::TypeDescriptor, stream::ValueType, types::temporal::Format};
use thiserror::Error;

/// Error type for codec operations
///
/// Every variant is terminal for the read or write that produced it: nothing is
/// retried and no partial value is returned.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no codec for type {0}")]
    UnsupportedType(TypeDescriptor),
    #[error("cannot convert {text:?} ({kind}) to a number")]
    NumberFormat { text: String, kind: ValueType },
    #[error("invalid bool: {0:?}")]
    InvalidBool(String),
    #[error(
        "malformed temporal value {text:?} under {}",
        .format.as_ref().map_or_else(|| "ISO".to_string(), ToString::to_string)
    )]
    MalformedTemporalValue {
        text: String,
        format: Option<Format>,
    },
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("malformed stream: {0}")]
    MalformedStream(String),
    #[error("unexpected value for {expected}: found {found}")]
    UnexpectedValue {
        expected: TypeDescriptor,
        found: &'static str,
    },
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("cannot bind a temporal format to {0}")]
    InvalidBinding(TypeDescriptor),
}
