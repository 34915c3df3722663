use hashbrown::HashMap;
use shapemap_core::{TypePair, Value};

use crate::{ElementMapper, MapError};

/// State carried through one top-level mapping call.
///
/// Plans reach the element mapper through it, and context checks keep their
/// per-pair depth bookkeeping in it.
pub struct ResolutionContext<'m> {
    mapper: &'m dyn ElementMapper,
    type_depth: HashMap<TypePair, usize>,
}

impl<'m> ResolutionContext<'m> {
    /// A fresh context resolving elements through `mapper`.
    pub fn new(mapper: &'m dyn ElementMapper) -> Self {
        Self {
            mapper,
            type_depth: HashMap::new(),
        }
    }

    /// Maps one element; errors from the element mapper are returned as-is.
    pub fn map(&mut self, pair: &TypePair, source: &Value) -> Result<Value, MapError> {
        let mapper = self.mapper;
        mapper.map_element(pair, source, self)
    }

    /// How many times `pair` is currently being mapped on the call stack.
    pub fn type_depth(&self, pair: &TypePair) -> usize {
        self.type_depth.get(pair).copied().unwrap_or(0)
    }

    /// Records entering a mapping of `pair`.
    pub fn increment_type_depth(&mut self, pair: &TypePair) {
        *self.type_depth.entry(pair.clone()).or_insert(0) += 1;
    }

    /// Records leaving a mapping of `pair`.
    pub fn decrement_type_depth(&mut self, pair: &TypePair) {
        if let Some(depth) = self.type_depth.get_mut(pair) {
            *depth = depth.saturating_sub(1);
            if *depth == 0 {
                self.type_depth.remove(pair);
            }
        }
    }
}

impl core::fmt::Debug for ResolutionContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("type_depth", &self.type_depth)
            .finish_non_exhaustive()
    }
}
