//! The services a plan relies on, and their default implementations.

use std::sync::Arc;

use shapemap_core::{ArrayValue, CollectionValue, Def, Shape, TypePair, Value};

use crate::{MapError, MaxDepth, Plan, ResolutionContext};

/// Maps a single element. Plans call it once per source element.
pub trait ElementMapper {
    /// Maps `source` according to `pair`.
    fn map_element(
        &self,
        pair: &TypePair,
        source: &Value,
        ctx: &mut ResolutionContext<'_>,
    ) -> Result<Value, MapError>;
}

/// What a configured element mapping asks of the plan around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeMapInfo {
    /// identical source objects map to the same destination object
    pub preserve_references: bool,
    /// recursion limit of the mapped type
    pub max_depth: Option<usize>,
}

impl TypeMapInfo {
    /// Whether plans populating elements of this mapping need context bookkeeping.
    pub fn requires_context_check(&self) -> bool {
        self.preserve_references || self.max_depth.is_some()
    }
}

/// Answers whether a custom mapping is configured for an element pair.
pub trait TypeMaps {
    /// The configured mapping for `pair`, if any.
    fn find_type_map(&self, pair: &TypePair) -> Option<TypeMapInfo>;
}

/// Builds fresh destination values.
pub trait ObjectFactory: Send + Sync {
    /// An empty value of `shape`.
    fn construct(&self, shape: &Arc<Shape>) -> Result<Value, MapError>;
}

/// Decides whether a configured recursion limit is exceeded.
pub trait DepthGuard: Send + Sync {
    /// Whether population should be skipped.
    fn exceeded(&self, limit: &MaxDepth, ctx: &ResolutionContext<'_>) -> bool;
}

/// Wraps plans whose elements need cycle or depth bookkeeping.
pub trait ContextCheck: Send + Sync {
    /// Returns a plan doing the bookkeeping for `element` around `plan`.
    fn wrap(&self, plan: Plan, element: &TypePair) -> Plan;
}

/// Builds empty collections, zero-length arrays and scalar defaults.
///
/// Interfaces resolve to a concrete implementation: lists and iterables to
/// `Vec`, sets to `Set`, maps to `Map`. Read-only wrappers have no empty
/// constructor and are refused, as are custom interfaces.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultObjectFactory;

impl ObjectFactory for DefaultObjectFactory {
    fn construct(&self, shape: &Arc<Shape>) -> Result<Value, MapError> {
        let refuse = || MapError::Construct {
            shape: shape.clone(),
        };
        let concrete = match &shape.def {
            Def::Scalar(_) | Def::Dynamic | Def::Pair(_) => return Ok(shape.default_value()),
            Def::Array(array) => {
                let dims = vec![0; array.rank.max(1)];
                return Ok(Value::Array(ArrayValue::new(array.t.clone(), dims)));
            }
            Def::ReadOnlyList(_) | Def::ReadOnlyMap(_) => return Err(refuse()),
            Def::Sequence(sequence) if shape.is_interface() => Shape::list(sequence.t.clone()),
            Def::List(list) if shape.is_interface() => Shape::list(list.t.clone()),
            Def::Set(set) if shape.is_interface() => Shape::set(set.t.clone()),
            Def::Map(map) if shape.is_interface() => Shape::map(map.k.clone(), map.v.clone()),
            Def::Sequence(_) => return Err(refuse()),
            _ if shape.is_interface() => return Err(refuse()),
            _ => shape.clone(),
        };
        Ok(Value::Collection(CollectionValue::new(concrete)))
    }
}

/// Compares the owning mapping's current depth with its limit.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeDepthGuard;

impl DepthGuard for TypeDepthGuard {
    fn exceeded(&self, limit: &MaxDepth, ctx: &ResolutionContext<'_>) -> bool {
        ctx.type_depth(&limit.owner) > limit.limit
    }
}

/// Counts how deep the element pair is nested while the wrapped plan runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeDepthTracking;

impl ContextCheck for TypeDepthTracking {
    fn wrap(&self, plan: Plan, element: &TypePair) -> Plan {
        let element = element.clone();
        let pair = plan.pair().clone();
        let kind = plan.kind();
        Plan::new(pair, kind, move |source, destination, ctx| {
            ctx.increment_type_depth(&element);
            let result = plan.execute(source, destination, ctx);
            ctx.decrement_type_depth(&element);
            result
        })
    }
}
