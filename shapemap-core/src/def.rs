use core::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::{CollectionVTable, CollectionValue, ScalarType, Shape, Value};

/// The semantic definition of a shape: is it a scalar, an array, a list, a map?
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Def {
    /// Scalar, not composed of other things.
    ///
    /// e.g. `i64`, `String`
    Scalar(ScalarType),

    /// Untyped "any value" slot. Every shape is assignable to it.
    Dynamic,

    /// Key/value entry, the element type of every keyed collection.
    Pair(PairDef),

    /// Array of homogeneous values with a fixed rank.
    ///
    /// e.g. `i64[]`, `i64[,]`
    Array(ArrayDef),

    /// Enumerable-only sequence: can be iterated, offers no add contract.
    Sequence(SequenceDef),

    /// Ordered list of homogeneous values, variable size.
    List(ListDef),

    /// Unique set of homogeneous values, insertion ordered.
    Set(SetDef),

    /// Keyed collection, insertion ordered, unique keys.
    Map(MapDef),

    /// Read-only view over a list.
    ReadOnlyList(ReadOnlyListDef),

    /// Read-only view over a map.
    ReadOnlyMap(ReadOnlyMapDef),

    /// The legacy string multimap: string keys, string values, duplicate
    /// keys allowed. Copyable through its copy constructor.
    LegacyMultiMap,

    /// User-defined collection that only promises the operations in its vtable.
    Custom(CustomDef),
}

/// Fields for key/value pair shapes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairDef {
    /// shape of the key
    pub k: Arc<Shape>,
    /// shape of the value
    pub v: Arc<Shape>,
}

/// Fields for array shapes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayDef {
    /// shape of the items
    pub t: Arc<Shape>,
    /// number of dimensions, at least 1
    pub rank: usize,
}

/// Fields for enumerable-only sequence shapes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceDef {
    /// shape of the items
    pub t: Arc<Shape>,
}

/// Fields for list shapes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListDef {
    /// shape of the items
    pub t: Arc<Shape>,
}

/// Fields for set shapes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SetDef {
    /// shape of the items
    pub t: Arc<Shape>,
}

/// Fields for map shapes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapDef {
    /// shape of the keys
    pub k: Arc<Shape>,
    /// shape of the values
    pub v: Arc<Shape>,
}

/// Fields for read-only list wrappers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReadOnlyListDef {
    /// shape of the items
    pub t: Arc<Shape>,
    /// constructor accepting the populated backing list, if the wrapper has one
    pub ctor: Option<WrapperCtor>,
}

/// Fields for read-only map wrappers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReadOnlyMapDef {
    /// shape of the keys
    pub k: Arc<Shape>,
    /// shape of the values
    pub v: Arc<Shape>,
    /// constructor accepting the populated backing map, if the wrapper has one
    pub ctor: Option<WrapperCtor>,
}

/// Fields for user-defined collections
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomDef {
    /// Element type of the typed add contract, if there is one.
    pub element: Option<Arc<Shape>>,
    /// Whether the collection accepts untyped values when `element` is `None`.
    pub untyped: bool,
    /// Operations the collection supports.
    pub vtable: VTableRef,
}

impl CustomDef {
    /// A collection with a typed add contract.
    pub fn typed(element: Arc<Shape>, vtable: &'static CollectionVTable) -> Self {
        Self {
            element: Some(element),
            untyped: false,
            vtable: VTableRef(vtable),
        }
    }

    /// A collection that only offers the untyped "add any value" contract.
    pub fn untyped(vtable: &'static CollectionVTable) -> Self {
        Self {
            element: None,
            untyped: true,
            vtable: VTableRef(vtable),
        }
    }
}

/// A reference to a static [`CollectionVTable`], compared by address.
#[derive(Clone, Copy)]
pub struct VTableRef(pub &'static CollectionVTable);

impl PartialEq for VTableRef {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.0, other.0)
    }
}

impl Eq for VTableRef {}

impl Hash for VTableRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::ptr::hash(self.0, state)
    }
}

impl core::fmt::Debug for VTableRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "VTableRef({:p})", self.0)
    }
}

/// Builds the read-only value from the wrapper's shape and a populated backing collection.
pub type WrapFn = fn(wrapper: &Arc<Shape>, backing: CollectionValue) -> Value;

/// The single accepting constructor of a read-only wrapper, compared by address.
#[derive(Clone, Copy)]
pub struct WrapperCtor(pub WrapFn);

impl PartialEq for WrapperCtor {
    fn eq(&self, other: &Self) -> bool {
        self.0 as usize == other.0 as usize
    }
}

impl Eq for WrapperCtor {}

impl Hash for WrapperCtor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.0 as usize).hash(state)
    }
}

impl core::fmt::Debug for WrapperCtor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "WrapperCtor({:#x})", self.0 as usize)
    }
}

/// The constructor of the builtin read-only wrappers: takes over the
/// backing collection's items and marks the result read-only.
pub fn wrap_read_only(wrapper: &Arc<Shape>, backing: CollectionValue) -> Value {
    Value::Collection(CollectionValue::with_items(wrapper.clone(), backing.into_items()).into_read_only())
}
