use std::borrow::Cow;
use std::sync::Arc;

use crate::{
    ArrayDef, CollectionVTable, CustomDef, Def, LIST_VTABLE, ListDef, MAP_VTABLE,
    MULTI_MAP_VTABLE, MapDef, PairDef, READ_ONLY_VTABLE, ReadOnlyListDef, ReadOnlyMapDef,
    SET_VTABLE, ScalarType, SequenceDef, SetDef, Value, WrapperCtor, wrap_read_only,
};

bitflags::bitflags! {
    /// Flags describing how a shape may be used.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShapeFlags: u8 {
        /// The shape is an open contract (an interface), not a concrete type.
        /// Values of it are built through a concrete shape.
        const INTERFACE = 1 << 0;
    }
}

/// Description of a type, owned so it can be built at runtime.
///
/// Equality and hashing are structural, which is what makes a
/// [`TypePair`](crate::TypePair) usable as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    /// Name of the type without its type parameters, e.g. `Vec`
    pub type_identifier: Cow<'static, str>,

    /// What kind of thing the type is
    pub def: Def,

    /// Flags
    pub flags: ShapeFlags,
}

impl Shape {
    /// A concrete shape with no flags.
    pub fn new(type_identifier: impl Into<Cow<'static, str>>, def: Def) -> Self {
        Self {
            type_identifier: type_identifier.into(),
            def,
            flags: ShapeFlags::empty(),
        }
    }

    /// Returns this shape with `flags` added.
    pub fn with_flags(mut self, flags: ShapeFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Scalar shape.
    pub fn scalar(scalar: ScalarType) -> Arc<Shape> {
        Arc::new(Shape::new(scalar.type_identifier(), Def::Scalar(scalar)))
    }

    /// `bool`
    pub fn bool() -> Arc<Shape> {
        Self::scalar(ScalarType::Bool)
    }

    /// `i64`
    pub fn i64() -> Arc<Shape> {
        Self::scalar(ScalarType::I64)
    }

    /// `f64`
    pub fn f64() -> Arc<Shape> {
        Self::scalar(ScalarType::F64)
    }

    /// `String`
    pub fn string() -> Arc<Shape> {
        Self::scalar(ScalarType::String)
    }

    /// The untyped "any value" shape.
    pub fn dynamic() -> Arc<Shape> {
        Arc::new(Shape::new("Dynamic", Def::Dynamic))
    }

    /// Key/value entry `(K, V)`.
    pub fn pair(k: Arc<Shape>, v: Arc<Shape>) -> Arc<Shape> {
        Arc::new(Shape::new("Pair", Def::Pair(PairDef { k, v })))
    }

    /// Array of `t` with `rank` dimensions.
    pub fn array(t: Arc<Shape>, rank: usize) -> Arc<Shape> {
        Arc::new(Shape::new("Array", Def::Array(ArrayDef { t, rank })))
    }

    /// `dyn Iterable<T>`: an enumerable-only interface.
    pub fn sequence(t: Arc<Shape>) -> Arc<Shape> {
        Arc::new(
            Shape::new("Iterable", Def::Sequence(SequenceDef { t }))
                .with_flags(ShapeFlags::INTERFACE),
        )
    }

    /// `Vec<T>`
    pub fn list(t: Arc<Shape>) -> Arc<Shape> {
        Arc::new(Shape::new("Vec", Def::List(ListDef { t })))
    }

    /// `dyn Collection<T>`: the minimal add/clear/iterate interface.
    pub fn collection(t: Arc<Shape>) -> Arc<Shape> {
        Arc::new(Shape::new("Collection", Def::List(ListDef { t })).with_flags(ShapeFlags::INTERFACE))
    }

    /// `Set<T>`
    pub fn set(t: Arc<Shape>) -> Arc<Shape> {
        Arc::new(Shape::new("Set", Def::Set(SetDef { t })))
    }

    /// `Map<K, V>`
    pub fn map(k: Arc<Shape>, v: Arc<Shape>) -> Arc<Shape> {
        Arc::new(Shape::new("Map", Def::Map(MapDef { k, v })))
    }

    /// `dyn Map<K, V>`
    pub fn map_interface(k: Arc<Shape>, v: Arc<Shape>) -> Arc<Shape> {
        Arc::new(Shape::new("Map", Def::Map(MapDef { k, v })).with_flags(ShapeFlags::INTERFACE))
    }

    /// `ReadOnlyList<T>`
    pub fn read_only_list(t: Arc<Shape>) -> Arc<Shape> {
        Arc::new(Shape::new(
            "ReadOnlyList",
            Def::ReadOnlyList(ReadOnlyListDef {
                t,
                ctor: Some(WrapperCtor(wrap_read_only)),
            }),
        ))
    }

    /// `ReadOnlyMap<K, V>`
    pub fn read_only_map(k: Arc<Shape>, v: Arc<Shape>) -> Arc<Shape> {
        Arc::new(Shape::new(
            "ReadOnlyMap",
            Def::ReadOnlyMap(ReadOnlyMapDef {
                k,
                v,
                ctor: Some(WrapperCtor(wrap_read_only)),
            }),
        ))
    }

    /// `dyn ReadOnlyMap<K, V>`
    pub fn read_only_map_interface(k: Arc<Shape>, v: Arc<Shape>) -> Arc<Shape> {
        Arc::new(
            Shape::new("ReadOnlyMap", Def::ReadOnlyMap(ReadOnlyMapDef { k, v, ctor: None }))
                .with_flags(ShapeFlags::INTERFACE),
        )
    }

    /// The legacy string multimap.
    pub fn legacy_multi_map() -> Arc<Shape> {
        Arc::new(Shape::new("StringMultiMap", Def::LegacyMultiMap))
    }

    /// A user-defined collection.
    pub fn custom(type_identifier: impl Into<Cow<'static, str>>, def: CustomDef) -> Arc<Shape> {
        Arc::new(Shape::new(type_identifier, Def::Custom(def)))
    }

    /// Whether this shape is an open contract rather than a concrete type.
    pub fn is_interface(&self) -> bool {
        self.flags.contains(ShapeFlags::INTERFACE)
    }

    /// Whether values of this shape can be enumerated as a collection.
    pub fn is_collection(&self) -> bool {
        match &self.def {
            Def::Scalar(_) | Def::Dynamic | Def::Pair(_) => false,
            Def::Array(_)
            | Def::Sequence(_)
            | Def::List(_)
            | Def::Set(_)
            | Def::Map(_)
            | Def::ReadOnlyList(_)
            | Def::ReadOnlyMap(_)
            | Def::LegacyMultiMap
            | Def::Custom(_) => true,
        }
    }

    /// Whether the shape exposes a typed, countable collection contract
    /// (its size is known without enumerating it, and it can copy itself
    /// into a slice).
    pub fn is_countable(&self) -> bool {
        match &self.def {
            Def::List(_)
            | Def::Set(_)
            | Def::Map(_)
            | Def::ReadOnlyList(_)
            | Def::ReadOnlyMap(_)
            | Def::LegacyMultiMap => true,
            Def::Custom(custom) => custom.element.is_some(),
            _ => false,
        }
    }

    /// The rank of an array shape.
    pub fn array_rank(&self) -> Option<usize> {
        match &self.def {
            Def::Array(array) => Some(array.rank),
            _ => None,
        }
    }

    /// Shape of the items produced when enumerating a value of this shape.
    ///
    /// Keyed collections enumerate `(K, V)` pairs, untyped custom
    /// collections enumerate [`Shape::dynamic`] values.
    pub fn element_type(&self) -> Option<Arc<Shape>> {
        match &self.def {
            Def::Array(ArrayDef { t, .. })
            | Def::Sequence(SequenceDef { t })
            | Def::List(ListDef { t })
            | Def::Set(SetDef { t })
            | Def::ReadOnlyList(ReadOnlyListDef { t, .. }) => Some(t.clone()),
            Def::Map(MapDef { k, v }) | Def::ReadOnlyMap(ReadOnlyMapDef { k, v, .. }) => {
                Some(Shape::pair(k.clone(), v.clone()))
            }
            Def::LegacyMultiMap => Some(Shape::pair(Shape::string(), Shape::string())),
            Def::Custom(custom) => match (&custom.element, custom.untyped) {
                (Some(element), _) => Some(element.clone()),
                (None, true) => Some(Shape::dynamic()),
                (None, false) => None,
            },
            Def::Scalar(_) | Def::Dynamic | Def::Pair(_) => None,
        }
    }

    /// Whether a value of shape `other` can be stored in a slot of this
    /// shape without adaptation.
    pub fn accepts(&self, other: &Shape) -> bool {
        matches!(self.def, Def::Dynamic) || self == other
    }

    /// Collection operations of this shape, if it has any.
    pub fn vtable(&self) -> Option<&'static CollectionVTable> {
        match &self.def {
            Def::List(_) => Some(&LIST_VTABLE),
            Def::Set(_) => Some(&SET_VTABLE),
            Def::Map(_) => Some(&MAP_VTABLE),
            Def::LegacyMultiMap => Some(&MULTI_MAP_VTABLE),
            Def::ReadOnlyList(_) | Def::ReadOnlyMap(_) => Some(&READ_ONLY_VTABLE),
            Def::Custom(custom) => Some(custom.vtable.0),
            Def::Scalar(_) | Def::Dynamic | Def::Pair(_) | Def::Array(_) | Def::Sequence(_) => {
                None
            }
        }
    }

    /// The value a freshly allocated slot of this shape holds.
    pub fn default_value(&self) -> Value {
        match &self.def {
            Def::Scalar(scalar) => scalar.default_value(),
            _ => Value::Null,
        }
    }
}

impl core::fmt::Display for Shape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_interface() {
            write!(f, "dyn ")?;
        }
        match &self.def {
            Def::Scalar(_) | Def::Dynamic | Def::LegacyMultiMap => {
                write!(f, "{}", self.type_identifier)
            }
            Def::Pair(PairDef { k, v }) => write!(f, "({k}, {v})"),
            Def::Array(ArrayDef { t, rank }) => {
                write!(f, "{t}[{}]", ",".repeat(rank.saturating_sub(1)))
            }
            Def::Sequence(SequenceDef { t })
            | Def::List(ListDef { t })
            | Def::Set(SetDef { t })
            | Def::ReadOnlyList(ReadOnlyListDef { t, .. }) => {
                write!(f, "{}<{t}>", self.type_identifier)
            }
            Def::Map(MapDef { k, v }) | Def::ReadOnlyMap(ReadOnlyMapDef { k, v, .. }) => {
                write!(f, "{}<{k}, {v}>", self.type_identifier)
            }
            Def::Custom(CustomDef {
                element: Some(t), ..
            }) => write!(f, "{}<{t}>", self.type_identifier),
            Def::Custom(_) => write!(f, "{}", self.type_identifier),
        }
    }
}
