use std::sync::Arc;

use shapemap_core::{Shape, TypePair, ValueError};

/// Errors raised while building a plan, before any element is mapped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// One side of the pair is not collection-like.
    #[error("{pair} is not a collection mapping")]
    NotACollection {
        /// the rejected pair
        pair: TypePair,
    },

    /// The shape exposes no element type to map into.
    #[error("{shape} exposes no element type")]
    NoElementType {
        /// the offending shape
        shape: Arc<Shape>,
    },

    /// The destination offers no add operation.
    #[error("{shape} has no add operation")]
    NoAddOperation {
        /// the offending shape
        shape: Arc<Shape>,
    },

    /// The destination offers no clear operation.
    #[error("{shape} has no clear operation")]
    NoClearOperation {
        /// the offending shape
        shape: Arc<Shape>,
    },

    /// A read-only wrapper without a constructor accepting the populated collection.
    #[error("{shape} has no constructor accepting a populated collection")]
    NoWrapperConstructor {
        /// the offending wrapper shape
        shape: Arc<Shape>,
    },

    /// A multidimensional destination whose source is not an array of the same rank.
    #[error("cannot fill a rank {rank} array from {from}")]
    RankMismatch {
        /// shape of the source
        from: Arc<Shape>,
        /// rank of the destination
        rank: usize,
    },
}

/// Errors raised while executing a plan.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The source produced more elements than the destination array can hold.
    #[error("not enough room in destination array of extents {dims:?}")]
    Capacity {
        /// extents of the destination array
        dims: Vec<usize>,
    },

    /// A nested plan could not be built.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// A collection or array operation failed.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// The object factory cannot build a value of this shape.
    #[error("cannot construct a value of {shape}")]
    Construct {
        /// the requested shape
        shape: Arc<Shape>,
    },

    /// A value of the wrong kind was handed to a plan.
    #[error("expected a {expected} for {shape}, got a {actual}")]
    UnexpectedValue {
        /// the shape the value was supposed to have
        shape: Arc<Shape>,
        /// the kind of value the plan needs
        expected: &'static str,
        /// the kind of value it got
        actual: &'static str,
    },

    /// A multidimensional plan received an array of another rank.
    #[error("expected a rank {expected} array for {shape}, got rank {actual}")]
    ArrayRank {
        /// the source shape of the plan
        shape: Arc<Shape>,
        /// the rank the plan was built for
        expected: usize,
        /// the rank of the array it got
        actual: usize,
    },

    /// No conversion is known for an element pair.
    #[error("no mapping configured for {pair}")]
    Unmapped {
        /// the element pair
        pair: TypePair,
    },

    /// The member must reuse its destination value, and there is none.
    #[error("{pair} must reuse the destination value, but none was supplied")]
    MissingDestination {
        /// the collection pair
        pair: TypePair,
    },

    /// Raised by user-supplied type maps.
    #[error("{message}")]
    Custom {
        /// what went wrong
        message: String,
    },
}

impl MapError {
    /// An error carrying a free-form message.
    pub fn custom(message: impl Into<String>) -> Self {
        MapError::Custom {
            message: message.into(),
        }
    }
}
