//! In-memory values produced and consumed by codecs.

use crate::descriptor::TypeDescriptor;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::{any::Any, collections::HashMap, fmt, sync::Arc};

/// A decoded value.
///
/// The declared [TypeDescriptor] decides which variants a codec produces: a
/// `Sequence<i32>` reads into a [Value::List] of [Value::Int], a nullable integer may also
/// read into [Value::Null], and so on.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Text(String),
    List(Vec<Value>),
    Array(Box<[Value]>),
    Map(HashMap<String, Value>),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Instant(DateTime<Utc>),
    Custom(Custom),
}

impl Value {
    /// The type of this value as observed at runtime.
    ///
    /// Containers and mappings do not remember what they were declared to hold, so their
    /// element (or value) type is the universal base type. [Value::Null] has no runtime
    /// type of its own and reports the universal base type.
    pub fn runtime_type(&self) -> TypeDescriptor {
        match self {
            Self::Null => TypeDescriptor::any(),
            Self::Bool(_) => TypeDescriptor::of::<bool>(),
            Self::Int(_) => TypeDescriptor::of::<i32>(),
            Self::Long(_) => TypeDescriptor::of::<i64>(),
            Self::Double(_) => TypeDescriptor::of::<f64>(),
            Self::Text(_) => TypeDescriptor::of::<String>(),
            Self::List(_) => TypeDescriptor::sequence(TypeDescriptor::any()),
            Self::Array(_) => TypeDescriptor::array(TypeDescriptor::any()),
            Self::Map(_) => TypeDescriptor::mapping(TypeDescriptor::any()),
            Self::DateTime(_) => TypeDescriptor::of::<NaiveDateTime>(),
            Self::Date(_) => TypeDescriptor::of::<NaiveDate>(),
            Self::Time(_) => TypeDescriptor::of::<NaiveTime>(),
            Self::Instant(_) => TypeDescriptor::of::<DateTime<Utc>>(),
            Self::Custom(custom) => custom.descriptor().clone(),
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Double(_) => "double",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::DateTime(_) => "date-time",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::Instant(_) => "instant",
            Self::Custom(_) => "custom",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// A value of a type the built-in codecs know nothing about.
///
/// User factories produce and consume these. Two custom values are equal when they share
/// a descriptor and point to the same payload.
#[derive(Clone)]
pub struct Custom {
    descriptor: TypeDescriptor,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Custom {
    pub fn new<T: Any + Send + Sync>(descriptor: TypeDescriptor, payload: T) -> Self {
        Self {
            descriptor,
            payload: Arc::new(payload),
        }
    }

    /// A bare instance of the universal base type, which carries nothing to encode.
    pub fn bare() -> Self {
        Self::new(TypeDescriptor::any(), ())
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Returns the payload if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }
}

impl PartialEq for Custom {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor && Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl fmt::Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Any numeric value, held in the narrowest representation that fits it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i32),
    Long(i64),
    Double(f64),
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        match number {
            Number::Int(i) => Self::Int(i),
            Number::Long(l) => Self::Long(l),
            Number::Double(d) => Self::Double(d),
        }
    }
}
