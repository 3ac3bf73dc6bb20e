//! Core codec traits and the per-call context.

use crate::{
    descriptor::TypeDescriptor,
    registry::Registry,
    stream::{TokenReader, TokenWriter},
    value::Value,
    Error,
};
use std::{fmt, sync::Arc};

/// Reads and writes values of one shape.
///
/// Codecs are shared between threads and between concurrent calls, so any state they keep
/// must be immutable or internally synchronized.
pub trait Codec: Send + Sync {
    /// Reads the current value of `reader` as a `ty`.
    fn read(
        &self,
        ty: &TypeDescriptor,
        reader: &mut dyn TokenReader,
        ctx: &mut Context<'_>,
    ) -> Result<Value, Error>;

    /// Writes `value`, declared as a `ty`, to `writer`.
    fn write(
        &self,
        value: &Value,
        ty: &TypeDescriptor,
        writer: &mut dyn TokenWriter,
        ctx: &mut Context<'_>,
    ) -> Result<(), Error>;
}

/// A codec shared by reference.
pub type SharedCodec = Arc<dyn Codec>;

/// Outcome of asking a [Factory] for a codec.
pub enum Resolution {
    /// The factory handles the type.
    Claimed(SharedCodec),
    /// The factory does not handle the type; the next one should be tried.
    Declined,
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claimed(_) => f.write_str("Claimed"),
            Self::Declined => f.write_str("Declined"),
        }
    }
}

/// Produces codecs for the types it recognizes.
///
/// Returning [Resolution::Declined] is not an error: it hands the type to the next factory
/// in the chain. An `Err` means the factory recognized the type but could not build a
/// codec for it (for example because a nested type is unsupported) and aborts resolution.
pub trait Factory: Send + Sync {
    fn create(&self, ty: &TypeDescriptor, registry: &Registry) -> Result<Resolution, Error>;

    /// Name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A step into a nested value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Index(usize),
    Key(String),
}

/// State scoped to one top-level read or write.
///
/// Gives codecs access to the [Registry] for nested types and tracks where in the document
/// the call currently is. A context is never shared between calls.
pub struct Context<'r> {
    registry: &'r Registry,
    path: Vec<Segment>,
}

impl<'r> Context<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            path: Vec::new(),
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Resolves the codec for `ty` through the registry.
    pub fn resolve(&self, ty: &TypeDescriptor) -> Result<SharedCodec, Error> {
        self.registry.resolve(ty)
    }

    /// Resolves the codec for `ty` and reads the current value with it.
    pub fn read(
        &mut self,
        ty: &TypeDescriptor,
        reader: &mut dyn TokenReader,
    ) -> Result<Value, Error> {
        let codec = self.resolve(ty)?;
        codec.read(ty, reader, self)
    }

    /// Resolves the codec for `ty` and writes `value` with it.
    pub fn write(
        &mut self,
        value: &Value,
        ty: &TypeDescriptor,
        writer: &mut dyn TokenWriter,
    ) -> Result<(), Error> {
        let codec = self.resolve(ty)?;
        codec.write(value, ty, writer, self)
    }

    /// Descends into a nested value.
    ///
    /// Pair with [Context::leave] once the nested value was handled. When a nested call
    /// fails the segment is left in place, so the path points at the failing value.
    pub fn enter(&mut self, segment: Segment) {
        self.path.push(segment);
    }

    pub fn leave(&mut self) {
        self.path.pop();
    }

    /// Current location, e.g. `$.items[3]`.
    pub fn path(&self) -> String {
        let mut out = String::from("$");
        for segment in &self.path {
            match segment {
                Segment::Index(i) => out.push_str(&format!("[{i}]")),
                Segment::Key(key) => {
                    out.push('.');
                    out.push_str(key);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    #[test]
    fn test_path() {
        let registry = Registry::new(Config::default()).unwrap();
        let mut ctx = Context::new(&registry);
        assert_eq!(ctx.path(), "$");
        ctx.enter(Segment::Key("items".into()));
        ctx.enter(Segment::Index(3));
        assert_eq!(ctx.path(), "$.items[3]");
        ctx.leave();
        ctx.leave();
        assert_eq!(ctx.path(), "$");
    }
}
