use std::sync::Arc;

use crate::{Shape, ValueError};

/// A dynamically typed value that plans read from and write to.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    /// A `bool`
    Bool(bool),
    /// An `i64`
    Int(i64),
    /// An `f64`
    Float(f64),
    /// A `String`
    String(String),
    /// A key/value entry
    Pair(Box<(Value, Value)>),
    /// An array of any rank
    Array(ArrayValue),
    /// Any non-array collection
    Collection(CollectionValue),
}

impl Value {
    /// Builds a key/value entry.
    pub fn pair(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Value::Pair(Box::new((key.into(), value.into())))
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Pair(_) => "pair",
            Value::Array(_) => "array",
            Value::Collection(_) => "collection",
        }
    }

    /// The key and value of a pair.
    pub fn as_pair(&self) -> Option<(&Value, &Value)> {
        match self {
            Value::Pair(entry) => Some((&entry.0, &entry.1)),
            _ => None,
        }
    }

    /// The array, if this is one.
    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// The collection, if this is one.
    pub fn as_collection(&self) -> Option<&CollectionValue> {
        match self {
            Value::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Items in enumeration order, for arrays (row-major) and collections.
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::Array(array) => Some(array.items()),
            Value::Collection(collection) => Some(collection.items()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<ArrayValue> for Value {
    fn from(value: ArrayValue) -> Self {
        Value::Array(value)
    }
}

impl From<CollectionValue> for Value {
    fn from(value: CollectionValue) -> Self {
        Value::Collection(value)
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Pair(entry) => write!(f, "{} => {}", entry.0, entry.1),
            Value::Array(array) => write!(f, "{array}"),
            Value::Collection(collection) => write!(f, "{collection}"),
        }
    }
}

fn write_items(f: &mut core::fmt::Formatter<'_>, items: &[Value]) -> core::fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "]")
}

/// An array of any rank. Items are stored row-major: the last dimension
/// varies fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    element: Arc<Shape>,
    dims: Vec<usize>,
    items: Vec<Value>,
}

impl ArrayValue {
    /// Allocates an array with the given extents, every slot holding the
    /// element shape's default value.
    pub fn new(element: Arc<Shape>, dims: Vec<usize>) -> Self {
        let len = dims.iter().product();
        let items = vec![element.default_value(); len];
        Self {
            element,
            dims,
            items,
        }
    }

    /// A rank-1 array holding `items`.
    pub fn from_items(element: Arc<Shape>, items: Vec<Value>) -> Self {
        Self {
            element,
            dims: vec![items.len()],
            items,
        }
    }

    /// Shape of the items.
    pub fn element(&self) -> &Arc<Shape> {
        &self.element
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Extents of every dimension.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Extent of dimension `dim`.
    pub fn extent(&self, dim: usize) -> usize {
        self.dims.get(dim).copied().unwrap_or(0)
    }

    /// Total number of slots.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the array has no slot at all.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All slots in row-major order.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// All slots in row-major order, mutably.
    pub fn items_mut(&mut self) -> &mut [Value] {
        &mut self.items
    }

    /// Consumes the array, returning its slots in row-major order.
    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    fn offset(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.dims.len() {
            return None;
        }
        let mut offset = 0;
        for (&index, &extent) in indices.iter().zip(&self.dims) {
            if index >= extent {
                return None;
            }
            offset = offset * extent + index;
        }
        Some(offset)
    }

    /// The slot at `indices`.
    pub fn get(&self, indices: &[usize]) -> Option<&Value> {
        self.offset(indices).map(|offset| &self.items[offset])
    }

    /// Stores `value` at `indices`.
    pub fn set(&mut self, indices: &[usize], value: Value) -> Result<(), ValueError> {
        let Some(offset) = self.offset(indices) else {
            return Err(ValueError::OutOfBounds {
                indices: indices.to_vec(),
                dims: self.dims.clone(),
            });
        };
        self.items[offset] = value;
        Ok(())
    }

    /// Copies every slot into `destination`, starting at its first slot.
    pub fn copy_to(&self, destination: &mut [Value]) -> Result<(), ValueError> {
        copy_into(&self.items, destination)
    }

    fn fmt_dims(
        f: &mut core::fmt::Formatter<'_>,
        dims: &[usize],
        items: &[Value],
    ) -> core::fmt::Result {
        let stride: usize = dims[1..].iter().product();
        if dims.len() == 1 || stride == 0 {
            return write_items(f, items);
        }
        write!(f, "[")?;
        for (i, row) in items.chunks(stride).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            Self::fmt_dims(f, &dims[1..], row)?;
        }
        write!(f, "]")
    }
}

impl core::fmt::Display for ArrayValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.dims.is_empty() {
            return write!(f, "[]");
        }
        Self::fmt_dims(f, &self.dims, &self.items)
    }
}

fn copy_into(items: &[Value], destination: &mut [Value]) -> Result<(), ValueError> {
    if destination.len() < items.len() {
        return Err(ValueError::OutOfBounds {
            indices: vec![items.len() - 1],
            dims: vec![destination.len()],
        });
    }
    destination[..items.len()].clone_from_slice(items);
    Ok(())
}

/// A non-array collection. It remembers its own shape, and every mutation
/// goes through that shape's [`CollectionVTable`](crate::CollectionVTable).
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionValue {
    shape: Arc<Shape>,
    items: Vec<Value>,
    read_only: bool,
}

impl CollectionValue {
    /// An empty, writable collection of `shape`.
    pub fn new(shape: Arc<Shape>) -> Self {
        Self::with_items(shape, Vec::new())
    }

    /// A writable collection of `shape` holding `items` as-is, without
    /// going through the shape's add operation.
    pub fn with_items(shape: Arc<Shape>, items: Vec<Value>) -> Self {
        Self {
            shape,
            items,
            read_only: false,
        }
    }

    /// Freezes the collection: the builtin vtables refuse to mutate it afterwards.
    pub fn into_read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// The shape this value was built as.
    pub fn shape(&self) -> &Arc<Shape> {
        &self.shape
    }

    /// Items in enumeration order.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Raw access to the items, for vtable implementations.
    pub fn items_mut(&mut self) -> &mut Vec<Value> {
        &mut self.items
    }

    /// Consumes the collection, returning its items.
    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether [`CollectionValue::into_read_only`] was called.
    pub fn is_flagged_read_only(&self) -> bool {
        self.read_only
    }

    /// Whether the collection refuses mutation, as reported by its vtable.
    pub fn is_read_only(&self) -> bool {
        match self.shape.vtable() {
            Some(vtable) => (vtable.is_read_only)(self),
            None => true,
        }
    }

    /// Adds `item` through the shape's add operation.
    pub fn add(&mut self, item: Value) -> Result<(), ValueError> {
        let add = self
            .shape
            .vtable()
            .and_then(|vtable| vtable.add)
            .ok_or_else(|| self.unsupported("add"))?;
        add(self, item)
    }

    /// Removes every item through the shape's clear operation.
    pub fn clear(&mut self) -> Result<(), ValueError> {
        let clear = self
            .shape
            .vtable()
            .and_then(|vtable| vtable.clear)
            .ok_or_else(|| self.unsupported("clear"))?;
        clear(self)
    }

    /// Copies every item into `destination`, starting at its first slot.
    pub fn copy_to(&self, destination: &mut [Value]) -> Result<(), ValueError> {
        copy_into(&self.items, destination)
    }

    fn unsupported(&self, operation: &'static str) -> ValueError {
        ValueError::Unsupported {
            type_name: self.shape.to_string(),
            operation,
        }
    }
}

impl core::fmt::Display for CollectionValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write_items(f, &self.items)
    }
}
