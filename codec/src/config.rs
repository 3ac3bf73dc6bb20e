//! Configuration for [crate::Registry].

use crate::{bind::Bind, codec::Factory, descriptor::TypeDescriptor, types::temporal::Binding};
use std::{collections::HashMap, sync::Arc};

/// Configuration for a [crate::Registry].
///
/// # Examples
///
/// ```
/// use chrono::NaiveDateTime;
/// use weft_codec::{types::temporal::{Binding, Format}, Config, Registry};
///
/// let cfg = Config::default().with_temporal::<NaiveDateTime>(Binding::new(Format::Millis));
/// let registry = Registry::new(cfg).unwrap();
/// ```
#[derive(Clone, Default)]
pub struct Config {
    /// Factories consulted before the built-in ones, in order.
    ///
    /// Placing a factory here overrides the built-in handling of every type it claims.
    pub factories: Vec<Arc<dyn Factory>>,

    /// Temporal format bound to each declared temporal type.
    ///
    /// Temporal types without a binding use the ISO textual profile.
    pub temporal: HashMap<TypeDescriptor, Binding>,
}

impl Config {
    /// Appends a user factory.
    pub fn with_factory(mut self, factory: impl Factory + 'static) -> Self {
        self.factories.push(Arc::new(factory));
        self
    }

    /// Binds a temporal format to `T`.
    pub fn with_temporal<T: Bind>(mut self, binding: Binding) -> Self {
        self.temporal.insert(T::descriptor(), binding);
        self
    }
}
