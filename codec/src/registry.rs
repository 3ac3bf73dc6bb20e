//! The resolution chain: an ordered list of [Factory]s plus a memo of resolved codecs.

use crate::{
    bind::Bind,
    codec::{Context, Factory, Resolution, SharedCodec},
    descriptor::TypeDescriptor,
    stream::{JsonReader, JsonWriter, TokenReader, TokenWriter},
    types::{
        map::MapFactory, nullable::NullableFactory, primitives::ScalarFactory,
        sequence::SequenceFactory, temporal::TemporalFactory, untyped::UntypedFactory,
    },
    value::Value,
    Config, Error,
};
use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{Arc, PoisonError, RwLock},
};
use tracing::{debug, trace};

/// Maps types to codecs.
///
/// The factory chain is fixed at construction. User factories from [Config::factories] come
/// first, followed by the built-in factories in this order: scalars, temporal types,
/// nullable wrappers, sequences and arrays, mappings, and the universal base type.
///
/// Resolved codecs are memoized: once a codec is cached for a type, every caller observes
/// that same instance for the lifetime of the registry. Two threads resolving the same
/// uncached type may both run the chain, but only the first result is kept.
pub struct Registry {
    factories: Vec<Arc<dyn Factory>>,
    cache: RwLock<HashMap<TypeDescriptor, SharedCodec>>,
}

impl Registry {
    /// Builds a registry from `cfg`.
    ///
    /// Fails with [Error::InvalidBinding] if a temporal format is bound to a type that is
    /// not temporal.
    pub fn new(cfg: Config) -> Result<Self, Error> {
        let temporal = TemporalFactory::new(cfg.temporal)?;
        let mut factories = cfg.factories;
        factories.push(Arc::new(ScalarFactory));
        factories.push(Arc::new(temporal));
        factories.push(Arc::new(NullableFactory));
        factories.push(Arc::new(SequenceFactory));
        factories.push(Arc::new(MapFactory));
        factories.push(Arc::new(UntypedFactory));
        Ok(Self {
            factories,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Returns the codec for `ty`.
    ///
    /// Fails with [Error::UnsupportedType] if every factory declines.
    pub fn resolve(&self, ty: &TypeDescriptor) -> Result<SharedCodec, Error> {
        if let Some(codec) = self.lookup(ty) {
            trace!(%ty, "codec cache hit");
            return Ok(codec);
        }

        // Factories may resolve nested types, so the cache is not locked while they run
        for (index, factory) in self.factories.iter().enumerate() {
            match factory.create(ty, self)? {
                Resolution::Declined => continue,
                Resolution::Claimed(codec) => {
                    debug!(%ty, index, factory = factory.name(), "resolved codec");
                    return Ok(self.insert(ty, codec));
                }
            }
        }
        Err(Error::UnsupportedType(ty.clone()))
    }

    /// Number of memoized codecs.
    pub fn cached(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn lookup(&self, ty: &TypeDescriptor) -> Option<SharedCodec> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(ty)
            .cloned()
    }

    fn insert(&self, ty: &TypeDescriptor, codec: SharedCodec) -> SharedCodec {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        match cache.entry(ty.clone()) {
            Entry::Occupied(entry) => {
                debug!(%ty, "codec resolved concurrently: keeping cached instance");
                entry.get().clone()
            }
            Entry::Vacant(entry) => entry.insert(codec).clone(),
        }
    }

    /// Reads the current value of `reader` as a `ty`.
    pub fn read(
        &self,
        ty: &TypeDescriptor,
        reader: &mut dyn TokenReader,
    ) -> Result<Value, Error> {
        let mut ctx = Context::new(self);
        ctx.read(ty, reader).inspect_err(|err| {
            debug!(path = %ctx.path(), %ty, %err, "read failed");
        })
    }

    /// Writes `value`, declared as a `ty`, to `writer`.
    pub fn write(
        &self,
        value: &Value,
        ty: &TypeDescriptor,
        writer: &mut dyn TokenWriter,
    ) -> Result<(), Error> {
        let mut ctx = Context::new(self);
        ctx.write(value, ty, writer).inspect_err(|err| {
            debug!(path = %ctx.path(), %ty, %err, "write failed");
        })
    }

    /// Encodes `value` as JSON text.
    pub fn serialize<T: Bind>(&self, value: &T) -> Result<String, Error> {
        let mut writer = JsonWriter::new();
        self.write(&value.to_value(), &T::descriptor(), &mut writer)?;
        writer.finish()
    }

    /// Decodes a `T` from JSON text.
    pub fn deserialize<T: Bind>(&self, text: &str) -> Result<T, Error> {
        let mut reader = JsonReader::new(text)?;
        let value = self.read(&T::descriptor(), &mut reader)?;
        T::from_value(value)
    }
}
