//! Normalized, hashable descriptions of value types.
//!
//! A [TypeDescriptor] pairs a [RawType] (the "class" of a value) with an ordered list of
//! type arguments. Growable sequences and fixed-size arrays share the same shape (raw type
//! plus a single element argument) and mappings always carry the key type in position 0 and
//! the value type in position 1, so composite codecs can be written once per shape.
//!
//! Descriptors compare structurally, which makes them suitable as resolution cache keys.

use std::{
    any::TypeId,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// The universal base type: any value at all.
pub enum Any {}

/// Raw type of growable sequences (`Vec<T>`).
pub enum Sequence {}

/// Raw type of fixed-size arrays (`Box<[T]>`).
pub enum Array {}

/// Raw type of string-keyed mappings (`HashMap<String, V>`).
pub enum Mapping {}

/// Raw type of values that may be absent (`Option<T>`).
pub enum Nullable {}

/// The erased "class" of a value.
///
/// Equality and hashing only consider the underlying [TypeId]; the name is kept for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct RawType {
    id: TypeId,
    name: &'static str,
}

impl RawType {
    /// Returns the raw type of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns true if this is the raw type of `T`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Fully qualified name of the type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name without its module path.
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for RawType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RawType {}

impl Hash for RawType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for RawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[derive(PartialEq, Eq, Hash)]
struct Inner {
    raw: RawType,
    args: Vec<TypeDescriptor>,
}

/// Immutable description of a (possibly parameterized) value type.
///
/// Cloning is cheap: the descriptor is reference counted.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor(Arc<Inner>);

impl TypeDescriptor {
    /// Creates a descriptor from a raw type and its type arguments.
    pub fn new(raw: RawType, args: Vec<TypeDescriptor>) -> Self {
        Self(Arc::new(Inner { raw, args }))
    }

    /// Creates a descriptor for a non-parameterized type.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(RawType::of::<T>(), Vec::new())
    }

    /// The universal base type.
    pub fn any() -> Self {
        Self::of::<Any>()
    }

    /// A growable sequence of `element`.
    pub fn sequence(element: TypeDescriptor) -> Self {
        Self::new(RawType::of::<Sequence>(), vec![element])
    }

    /// A fixed-size array of `element`.
    pub fn array(element: TypeDescriptor) -> Self {
        Self::new(RawType::of::<Array>(), vec![element])
    }

    /// A mapping from text keys to `value`.
    pub fn mapping(value: TypeDescriptor) -> Self {
        Self::new(RawType::of::<Mapping>(), vec![Self::of::<String>(), value])
    }

    /// A value of type `inner` that may be absent.
    pub fn nullable(inner: TypeDescriptor) -> Self {
        Self::new(RawType::of::<Nullable>(), vec![inner])
    }

    pub fn raw(&self) -> RawType {
        self.0.raw
    }

    pub fn args(&self) -> &[TypeDescriptor] {
        &self.0.args
    }

    /// Returns the type argument at `index`, if declared.
    pub fn arg(&self, index: usize) -> Option<&TypeDescriptor> {
        self.0.args.get(index)
    }

    /// Returns true if the raw type is `T`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.0.raw.is::<T>()
    }

    /// Returns true if this describes exactly the universal base type.
    pub fn is_any(&self) -> bool {
        self.is::<Any>() && self.0.args.is_empty()
    }

    /// Returns true for both growable sequences and fixed-size arrays.
    pub fn is_container(&self) -> bool {
        self.is::<Sequence>() || self.is::<Array>()
    }

    pub fn is_mapping(&self) -> bool {
        self.is::<Mapping>()
    }

    pub fn is_nullable(&self) -> bool {
        self.is::<Nullable>()
    }

    /// Element type of a container: the first type argument if present, else the
    /// universal base type.
    pub fn element_type(&self) -> TypeDescriptor {
        self.arg(0).cloned().unwrap_or_else(Self::any)
    }

    /// Value type of a mapping: the type argument at position 1 if present, else the
    /// universal base type. Keys are always text.
    pub fn value_type(&self) -> TypeDescriptor {
        self.arg(1).cloned().unwrap_or_else(Self::any)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.raw.short_name())?;
        if self.0.args.is_empty() {
            return Ok(());
        }
        f.write_str("<")?;
        for (i, arg) in self.0.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(">")
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_structural_equality() {
        let a = TypeDescriptor::sequence(TypeDescriptor::mapping(TypeDescriptor::of::<i32>()));
        let b = TypeDescriptor::sequence(TypeDescriptor::mapping(TypeDescriptor::of::<i32>()));
        let c = TypeDescriptor::sequence(TypeDescriptor::mapping(TypeDescriptor::of::<i64>()));
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&b));
        assert!(!set.contains(&c));
    }

    #[test]
    fn test_container_shapes() {
        let list = TypeDescriptor::sequence(TypeDescriptor::of::<i32>());
        let array = TypeDescriptor::array(TypeDescriptor::of::<i32>());
        assert!(list.is_container());
        assert!(array.is_container());
        assert_ne!(list, array);
        assert_eq!(list.element_type(), array.element_type());
        assert_eq!(list.args().len(), array.args().len());
    }

    #[test]
    fn test_missing_arguments_default_to_any() {
        let raw_list = TypeDescriptor::of::<Sequence>();
        assert!(raw_list.element_type().is_any());

        let raw_map = TypeDescriptor::of::<Mapping>();
        assert!(raw_map.value_type().is_any());
    }

    #[test]
    fn test_mapping_value_position() {
        let map = TypeDescriptor::mapping(TypeDescriptor::of::<bool>());
        assert_eq!(map.arg(0), Some(&TypeDescriptor::of::<String>()));
        assert_eq!(map.value_type(), TypeDescriptor::of::<bool>());
    }

    #[test]
    fn test_display() {
        let ty = TypeDescriptor::mapping(TypeDescriptor::sequence(TypeDescriptor::of::<i64>()));
        assert_eq!(ty.to_string(), "Mapping<String, Sequence<i64>>");
        assert_eq!(TypeDescriptor::any().to_string(), "Any");
    }
}
