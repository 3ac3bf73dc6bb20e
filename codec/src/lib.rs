//! Bind typed values to JSON token streams.
//!
//! # Overview
//!
//! A [Registry] maps each requested type to the [Codec] responsible for it by walking an
//! ordered chain of [Factory]s. The first factory to claim a type wins and its codec is
//! memoized for the lifetime of the registry. Composite codecs (sequences, arrays,
//! mappings, nullable values) resolve the codecs of their element or value types through
//! the same registry, so user factories placed at the front of the chain take effect at
//! any depth.
//!
//! Types are identified by a [TypeDescriptor]: a raw type plus its type arguments, compared
//! structurally. The [Bind] trait provides the descriptor of a Rust type and converts its
//! values to and from the dynamic [Value] that codecs read and write.
//!
//! # Supported Types
//!
//! Natively supports:
//! - Scalars: `bool`, `i32`, `i64`, `f64`, `String` and [value::Number]
//! - Containers: `Vec<T>`, `Box<[T]>`, `HashMap<String, V>` and `Option<T>`
//! - Temporal types: `NaiveDateTime`, `NaiveDate`, `NaiveTime` and `DateTime<Utc>`, each
//!   under a configurable [types::temporal::Format]
//! - [Value] itself, bound by what the token stream holds
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use std::collections::HashMap;
//! use weft_codec::{types::temporal::{Binding, Format}, Config, Registry};
//!
//! let cfg = Config::default().with_temporal::<NaiveDate>(Binding::new(Format::Array));
//! let registry = Registry::new(cfg).unwrap();
//!
//! let dates = HashMap::from([(
//!     "launch".to_string(),
//!     vec![NaiveDate::from_ymd_opt(2011, 11, 10).unwrap()],
//! )]);
//! let json = registry.serialize(&dates).unwrap();
//! assert_eq!(json, r#"{"launch":[[2011,11,10]]}"#);
//!
//! let decoded: HashMap<String, Vec<NaiveDate>> = registry.deserialize(&json).unwrap();
//! assert_eq!(decoded, dates);
//! ```
//!
//! # Custom Types
//!
//! Types the built-in factories know nothing about are handled by a user [Factory] whose
//! codec produces and consumes [value::Custom] values:
//!
//! ```
//! use weft_codec::{
//!     codec::SharedCodec,
//!     stream::{Scalar, TokenReader, TokenWriter},
//!     value::Custom,
//!     Codec, Context, Error, Factory, Registry, Resolution, TypeDescriptor, Value,
//! };
//! use std::sync::Arc;
//!
//! struct Celsius(f64);
//!
//! struct CelsiusCodec;
//!
//! impl Codec for CelsiusCodec {
//!     fn read(
//!         &self,
//!         ty: &TypeDescriptor,
//!         reader: &mut dyn TokenReader,
//!         _: &mut Context<'_>,
//!     ) -> Result<Value, Error> {
//!         let degrees = reader.value_as_double()?;
//!         Ok(Value::Custom(Custom::new(ty.clone(), Celsius(degrees))))
//!     }
//!
//!     fn write(
//!         &self,
//!         value: &Value,
//!         ty: &TypeDescriptor,
//!         writer: &mut dyn TokenWriter,
//!         _: &mut Context<'_>,
//!     ) -> Result<(), Error> {
//!         match value {
//!             Value::Custom(custom) => match custom.downcast_ref::<Celsius>() {
//!                 Some(Celsius(degrees)) => writer.write_value(Scalar::Double(*degrees)),
//!                 None => Err(Error::UnsupportedType(ty.clone())),
//!             },
//!             _ => Err(Error::UnsupportedType(ty.clone())),
//!         }
//!     }
//! }
//!
//! struct CelsiusFactory;
//!
//! impl Factory for CelsiusFactory {
//!     fn create(&self, ty: &TypeDescriptor, _: &Registry) -> Result<Resolution, Error> {
//!         if !ty.is::<Celsius>() {
//!             return Ok(Resolution::Declined);
//!         }
//!         let codec: SharedCodec = Arc::new(CelsiusCodec);
//!         Ok(Resolution::Claimed(codec))
//!     }
//! }
//!
//! let registry = Registry::new(weft_codec::Config::default().with_factory(CelsiusFactory)).unwrap();
//! assert!(registry.resolve(&TypeDescriptor::of::<Celsius>()).is_ok());
//! ```

pub mod bind;
pub mod codec;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod stream;
pub mod types;
pub mod value;

// Re-export main types and traits
pub use bind::Bind;
pub use codec::{Codec, Context, Factory, Resolution};
pub use config::Config;
pub use descriptor::TypeDescriptor;
pub use error::Error;
pub use registry::Registry;
pub use value::Value;
