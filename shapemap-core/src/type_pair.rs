use std::sync::Arc;

use crate::Shape;

/// A `(source, destination)` pair of shapes: identifies a mapping case and
/// keys the compiled plans.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypePair {
    /// shape of the value being read
    pub source: Arc<Shape>,
    /// shape of the value being produced
    pub destination: Arc<Shape>,
}

impl TypePair {
    /// Pairs `source` with `destination`.
    pub fn new(source: Arc<Shape>, destination: Arc<Shape>) -> Self {
        Self {
            source,
            destination,
        }
    }
}

impl core::fmt::Display for TypePair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}
