//! Typed bridge between Rust values and [Value].
//!
//! [Bind::descriptor] is the call-site type token used to resolve a codec; `to_value` and
//! `from_value` move data across the boundary without deciding its wire shape, which is
//! the resolved codec's job.

use crate::{
    descriptor::TypeDescriptor,
    value::{Number, Value},
    Error,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::collections::HashMap;

/// Types that can be bound to a token stream.
pub trait Bind: Sized {
    /// Describes `Self` for codec resolution.
    fn descriptor() -> TypeDescriptor;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, Error>;
}

fn unexpected<T: Bind>(value: &Value) -> Error {
    Error::UnexpectedValue {
        expected: T::descriptor(),
        found: value.kind(),
    }
}

macro_rules! impl_bind {
    ($type:ty, $to:ident, [$($variant:ident),+]) => {
        impl Bind for $type {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::of::<$type>()
            }

            fn to_value(&self) -> Value {
                Value::$to(self.clone())
            }

            fn from_value(value: Value) -> Result<Self, Error> {
                match value {
                    $(Value::$variant(v) => Ok(v.into()),)+
                    other => Err(unexpected::<Self>(&other)),
                }
            }
        }
    };
}

impl_bind!(bool, Bool, [Bool]);
impl_bind!(i32, Int, [Int]);
impl_bind!(i64, Long, [Long, Int]);
impl_bind!(f64, Double, [Double, Int]);
impl_bind!(String, Text, [Text]);
impl_bind!(NaiveDateTime, DateTime, [DateTime]);
impl_bind!(NaiveDate, Date, [Date]);
impl_bind!(NaiveTime, Time, [Time]);
impl_bind!(DateTime<Utc>, Instant, [Instant]);

impl Bind for Number {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Number>()
    }

    fn to_value(&self) -> Value {
        (*self).into()
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Int(i) => Ok(Self::Int(i)),
            Value::Long(l) => Ok(Self::Long(l)),
            Value::Double(d) => Ok(Self::Double(d)),
            other => Err(unexpected::<Self>(&other)),
        }
    }
}

impl Bind for Value {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::any()
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        Ok(value)
    }
}

impl<T: Bind> Bind for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::nullable(T::descriptor())
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Bind> Bind for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::sequence(T::descriptor())
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Bind::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            Value::Array(items) => items.into_vec().into_iter().map(T::from_value).collect(),
            other => Err(unexpected::<Self>(&other)),
        }
    }
}

impl<T: Bind> Bind for Box<[T]> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::array(T::descriptor())
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(Bind::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Array(items) => items.into_vec().into_iter().map(T::from_value).collect(),
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(unexpected::<Self>(&other)),
        }
    }
}

impl<V: Bind> Bind for HashMap<String, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::mapping(V::descriptor())
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(key, value)| Ok((key, V::from_value(value)?)))
                .collect(),
            other => Err(unexpected::<Self>(&other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptors() {
        assert_eq!(
            <Vec<Option<i32>>>::descriptor(),
            TypeDescriptor::sequence(TypeDescriptor::nullable(TypeDescriptor::of::<i32>()))
        );
        assert_eq!(
            <HashMap<String, Box<[f64]>>>::descriptor(),
            TypeDescriptor::mapping(TypeDescriptor::array(TypeDescriptor::of::<f64>()))
        );
        assert!(Value::descriptor().is_any());
    }

    #[test]
    fn test_widening() {
        assert_eq!(i64::from_value(Value::Int(7)).unwrap(), 7);
        assert_eq!(f64::from_value(Value::Int(7)).unwrap(), 7.0);
        assert!(matches!(
            i32::from_value(Value::Long(7)),
            Err(Error::UnexpectedValue { found: "long", .. })
        ));
    }

    #[test]
    fn test_nested_conversion() {
        let original: HashMap<String, Vec<Option<i32>>> =
            HashMap::from([("a".to_string(), vec![Some(1), None])]);
        let value = original.to_value();
        let restored = <HashMap<String, Vec<Option<i32>>>>::from_value(value).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_null_into_non_nullable() {
        assert!(matches!(
            String::from_value(Value::Null),
            Err(Error::UnexpectedValue { found: "null", .. })
        ));
    }
}
