//! Executable mapping plans and the builders that produce them.

use std::sync::Arc;

use shapemap_core::{CollectionValue, Shape, TypePair, Value};
use tracing::debug;

use crate::{
    CollectionKind, ContextCheck, DefaultObjectFactory, DepthGuard, MapError, ObjectFactory,
    PlanError, ResolutionContext, TypeDepthGuard, TypeDepthTracking, TypeMaps, classify,
};

mod array;
mod collection;
mod passthrough;
mod read_only;

/// The operation a [`Plan`] runs: `(source, existing destination, context) -> destination`.
pub type PlanFn = dyn Fn(&Value, Option<Value>, &mut ResolutionContext<'_>) -> Result<Value, MapError>
    + Send
    + Sync;

/// A compiled mapping for one collection pair.
///
/// Every decision that depends only on the shapes is taken when the plan
/// is built; running it only branches on the values. Plans are immutable
/// and cheap to clone, and may run on several threads at once.
#[derive(Clone)]
pub struct Plan {
    pair: TypePair,
    kind: CollectionKind,
    exec: Arc<PlanFn>,
}

impl Plan {
    /// Wraps `exec` as the plan for `pair`.
    pub fn new<F>(pair: TypePair, kind: CollectionKind, exec: F) -> Self
    where
        F: Fn(&Value, Option<Value>, &mut ResolutionContext<'_>) -> Result<Value, MapError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            pair,
            kind,
            exec: Arc::new(exec),
        }
    }

    /// The pair this plan maps.
    pub fn pair(&self) -> &TypePair {
        &self.pair
    }

    /// The mapping case the plan was built for.
    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Maps `source`, reusing `destination` where the plan allows it.
    pub fn execute(
        &self,
        source: &Value,
        destination: Option<Value>,
        ctx: &mut ResolutionContext<'_>,
    ) -> Result<Value, MapError> {
        (self.exec)(source, destination, ctx)
    }

    /// Whether both handles point at the same compiled plan.
    pub fn ptr_eq(a: &Plan, b: &Plan) -> bool {
        Arc::ptr_eq(&a.exec, &b.exec)
    }
}

impl core::fmt::Debug for Plan {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Plan")
            .field("pair", &self.pair)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// How the collection is reached when it is a member of an enclosing object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MemberMap {
    /// Always populate the existing destination, never replace it.
    pub use_destination_value: bool,
    /// The member can be assigned, so a read-only existing value gets replaced.
    pub can_be_set: bool,
    /// Recursion limit of the enclosing mapping.
    pub max_depth: Option<MaxDepth>,
}

impl MemberMap {
    /// An assignable member.
    pub fn settable() -> Self {
        Self {
            can_be_set: true,
            ..Self::default()
        }
    }

    /// A member whose existing value must be populated in place.
    pub fn in_place() -> Self {
        Self {
            use_destination_value: true,
            ..Self::default()
        }
    }

    /// Limits how deep `owner` may recurse before this member is left empty.
    pub fn with_max_depth(mut self, owner: TypePair, limit: usize) -> Self {
        self.max_depth = Some(MaxDepth { owner, limit });
        self
    }
}

/// A recursion limit configured on the mapping that owns a member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaxDepth {
    /// the owning mapping
    pub owner: TypePair,
    /// deepest allowed nesting of `owner`
    pub limit: usize,
}

/// Collaborators consulted while building a plan.
#[derive(Clone)]
pub struct PlanEnv<'a> {
    /// configured element mappings
    pub type_maps: &'a dyn TypeMaps,
    /// builds fresh destinations
    pub factory: Arc<dyn ObjectFactory>,
    /// decides when a recursion limit is hit
    pub depth_guard: Arc<dyn DepthGuard>,
    /// wraps plans whose elements need bookkeeping
    pub context_check: Arc<dyn ContextCheck>,
}

impl<'a> PlanEnv<'a> {
    /// An environment using the default collaborators.
    pub fn new(type_maps: &'a dyn TypeMaps) -> Self {
        Self {
            type_maps,
            factory: Arc::new(DefaultObjectFactory),
            depth_guard: Arc::new(TypeDepthGuard),
            context_check: Arc::new(TypeDepthTracking),
        }
    }
}

/// Builds the plan mapping `pair`, reached as `member` of an enclosing
/// object, or at the root when `member` is `None`.
pub fn build_plan(
    pair: &TypePair,
    member: Option<&MemberMap>,
    env: &PlanEnv<'_>,
) -> Result<Plan, PlanError> {
    let classification = classify(pair)?;
    debug!(%pair, kind = ?classification.kind, nested = member.is_some(), "building collection plan");

    match classification.kind {
        CollectionKind::Array1D | CollectionKind::ArrayND { .. } => {
            array::build(pair, &classification, env)
        }
        CollectionKind::ReadOnlyListWrapper | CollectionKind::ReadOnlyDictionaryWrapper => {
            read_only::build(pair, &classification, member, env)
        }
        CollectionKind::LegacyAssociativePassthrough => Ok(passthrough::build(pair)),
        CollectionKind::ListLike
        | CollectionKind::DictionaryLike
        | CollectionKind::UntypedFallback => collection::build(pair, &classification, member, env),
    }
}

/// The items of a source value. A null source has none.
fn source_items<'v>(shape: &Arc<Shape>, source: &'v Value) -> Result<&'v [Value], MapError> {
    match source {
        Value::Null => Ok(&[]),
        other => other.elements().ok_or_else(|| MapError::UnexpectedValue {
            shape: shape.clone(),
            expected: "collection",
            actual: other.kind_name(),
        }),
    }
}

fn into_collection(shape: &Arc<Shape>, value: Value) -> Result<CollectionValue, MapError> {
    match value {
        Value::Collection(collection) => Ok(collection),
        other => Err(MapError::UnexpectedValue {
            shape: shape.clone(),
            expected: "collection",
            actual: other.kind_name(),
        }),
    }
}
