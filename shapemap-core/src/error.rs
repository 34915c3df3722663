/// Errors raised by value-level collection and array operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The collection refuses mutation.
    #[error("{type_name} is read-only")]
    ReadOnly {
        /// rendered shape of the collection
        type_name: String,
    },

    /// The collection's vtable does not offer the operation.
    #[error("{type_name} does not support `{operation}`")]
    Unsupported {
        /// rendered shape of the collection
        type_name: String,
        /// the missing operation
        operation: &'static str,
    },

    /// A keyed collection already holds the key.
    #[error("duplicate key {key} in {type_name}")]
    DuplicateKey {
        /// rendered shape of the collection
        type_name: String,
        /// rendered key
        key: String,
    },

    /// The operation was handed the wrong kind of value.
    #[error("expected a {expected}, got a {actual}")]
    WrongKind {
        /// what the operation needs
        expected: &'static str,
        /// what it got
        actual: &'static str,
    },

    /// An array index lies outside the array's extents.
    #[error("index {indices:?} is out of bounds for an array of extents {dims:?}")]
    OutOfBounds {
        /// the offending index
        indices: Vec<usize>,
        /// extents of the array
        dims: Vec<usize>,
    },
}
