//! The mapping engine: configured element mappings, built-in conversions,
//! and the plan cache.

use std::sync::Arc;

use hashbrown::HashMap;
use shapemap_core::{Def, ScalarType, TypePair, Value};
use tracing::debug;

use crate::{
    ContextCheck, DefaultObjectFactory, DepthGuard, ElementMapper, MapError, MemberMap,
    ObjectFactory, Plan, PlanCache, PlanEnv, PlanError, PlanKey, ResolutionContext,
    TypeDepthGuard, TypeDepthTracking, TypeMapInfo, TypeMaps, build_plan, is_match,
};

/// A user-supplied element conversion.
pub type ConvertFn =
    dyn Fn(&Value, &mut ResolutionContext<'_>) -> Result<Value, MapError> + Send + Sync;

/// A custom mapping for one element pair.
#[derive(Clone)]
pub struct TypeMap {
    convert: Arc<ConvertFn>,
    info: TypeMapInfo,
}

impl TypeMap {
    /// Maps elements through `convert`.
    pub fn new<F>(convert: F) -> Self
    where
        F: Fn(&Value, &mut ResolutionContext<'_>) -> Result<Value, MapError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            convert: Arc::new(convert),
            info: TypeMapInfo::default(),
        }
    }

    /// Identical source objects should map to the same destination object.
    pub fn preserve_references(mut self) -> Self {
        self.info.preserve_references = true;
        self
    }

    /// Limits how deep this mapping may nest.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.info.max_depth = Some(depth);
        self
    }

    /// What this mapping asks of the plans around it.
    pub fn info(&self) -> TypeMapInfo {
        self.info
    }
}

impl core::fmt::Debug for TypeMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeMap")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Everything a [`Mapper`] is configured with.
///
/// ```
/// use shapemap::{Mapper, MapperConfig, Shape, TypeMap, TypePair, Value};
///
/// let config = MapperConfig::new().type_map(
///     TypePair::new(Shape::i64(), Shape::string()),
///     TypeMap::new(|value, _ctx| match value {
///         Value::Int(n) => Ok(Value::String(format!("#{n}"))),
///         _ => Ok(Value::Null),
///     }),
/// );
/// let mapper = Mapper::new(config);
/// let pair = TypePair::new(Shape::list(Shape::i64()), Shape::list(Shape::string()));
/// let source = Value::Collection(shapemap::CollectionValue::with_items(
///     Shape::list(Shape::i64()),
///     vec![Value::Int(1), Value::Int(2)],
/// ));
/// let mapped = mapper.map(&pair, &source, None).unwrap();
/// assert_eq!(mapped.to_string(), r##"["#1", "#2"]"##);
/// ```
#[derive(Clone)]
pub struct MapperConfig {
    type_maps: HashMap<TypePair, TypeMap>,
    factory: Arc<dyn ObjectFactory>,
    depth_guard: Arc<dyn DepthGuard>,
    context_check: Arc<dyn ContextCheck>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            type_maps: HashMap::new(),
            factory: Arc::new(DefaultObjectFactory),
            depth_guard: Arc::new(TypeDepthGuard),
            context_check: Arc::new(TypeDepthTracking),
        }
    }
}

impl MapperConfig {
    /// No type maps, default collaborators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a custom mapping for `pair`, replacing any previous one.
    pub fn type_map(mut self, pair: TypePair, map: TypeMap) -> Self {
        self.type_maps.insert(pair, map);
        self
    }

    /// Replaces the object factory.
    pub fn object_factory(mut self, factory: impl ObjectFactory + 'static) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    /// Replaces the depth guard.
    pub fn depth_guard(mut self, guard: impl DepthGuard + 'static) -> Self {
        self.depth_guard = Arc::new(guard);
        self
    }

    /// Replaces the context check.
    pub fn context_check(mut self, check: impl ContextCheck + 'static) -> Self {
        self.context_check = Arc::new(check);
        self
    }
}

impl core::fmt::Debug for MapperConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MapperConfig")
            .field("type_maps", &self.type_maps)
            .finish_non_exhaustive()
    }
}

/// Maps collections according to a frozen [`MapperConfig`].
///
/// Plans are built on first use and kept for the lifetime of the mapper.
/// A mapper can be shared between threads.
#[derive(Debug)]
pub struct Mapper {
    config: MapperConfig,
    plans: PlanCache,
}

impl Mapper {
    /// Freezes `config`.
    pub fn new(config: MapperConfig) -> Self {
        Self {
            config,
            plans: PlanCache::new(),
        }
    }

    /// A fresh context for one top-level mapping call.
    pub fn context(&self) -> ResolutionContext<'_> {
        ResolutionContext::new(self)
    }

    /// Collaborators handed to the plan builders.
    pub fn env(&self) -> PlanEnv<'_> {
        PlanEnv {
            type_maps: self,
            factory: self.config.factory.clone(),
            depth_guard: self.config.depth_guard.clone(),
            context_check: self.config.context_check.clone(),
        }
    }

    /// The plan mapping `pair` at the root.
    pub fn plan(&self, pair: &TypePair) -> Result<Plan, PlanError> {
        self.plans.get_or_build(&PlanKey::root(pair.clone()), || {
            build_plan(pair, None, &self.env())
        })
    }

    /// The plan mapping `pair` when reached as `member`.
    pub fn member_plan(&self, pair: &TypePair, member: &MemberMap) -> Result<Plan, PlanError> {
        self.plans
            .get_or_build(&PlanKey::member(pair.clone(), member.clone()), || {
                build_plan(pair, Some(member), &self.env())
            })
    }

    /// Maps a root collection.
    pub fn map(
        &self,
        pair: &TypePair,
        source: &Value,
        destination: Option<Value>,
    ) -> Result<Value, MapError> {
        let plan = self.plan(pair)?;
        plan.execute(source, destination, &mut self.context())
    }

    /// Maps a collection reached as `member` of an enclosing object.
    pub fn map_member(
        &self,
        pair: &TypePair,
        member: &MemberMap,
        source: &Value,
        destination: Option<Value>,
    ) -> Result<Value, MapError> {
        let plan = self.member_plan(pair, member)?;
        plan.execute(source, destination, &mut self.context())
    }

    /// Number of plans built so far.
    pub fn cached_plans(&self) -> usize {
        self.plans.len()
    }

    fn convert(
        &self,
        pair: &TypePair,
        source: &Value,
        ctx: &mut ResolutionContext<'_>,
    ) -> Result<Value, MapError> {
        let unmapped = || MapError::Unmapped { pair: pair.clone() };
        let (from, to) = (&pair.source, &pair.destination);

        if source.is_null() {
            return Ok(to.default_value());
        }
        if matches!(to.def, Def::Dynamic) || from == to {
            return Ok(source.clone());
        }

        match (&to.def, source) {
            (Def::Scalar(scalar), value) if matches!(from.def, Def::Dynamic) => {
                if fits(*scalar, value) {
                    Ok(value.clone())
                } else {
                    Err(unmapped())
                }
            }
            (Def::Scalar(ScalarType::F64), Value::Int(n)) => Ok(Value::Float(*n as f64)),
            (Def::Scalar(ScalarType::String), Value::Bool(b)) => Ok(Value::String(b.to_string())),
            (Def::Scalar(ScalarType::String), Value::Int(n)) => Ok(Value::String(n.to_string())),
            (Def::Scalar(ScalarType::String), Value::Float(x)) => Ok(Value::String(x.to_string())),
            (Def::Pair(to_pair), Value::Pair(entry)) => {
                let Def::Pair(from_pair) = &from.def else {
                    return Err(unmapped());
                };
                let keys = TypePair::new(from_pair.k.clone(), to_pair.k.clone());
                let values = TypePair::new(from_pair.v.clone(), to_pair.v.clone());
                let key = ctx.map(&keys, &entry.0)?;
                let value = ctx.map(&values, &entry.1)?;
                Ok(Value::pair(key, value))
            }
            _ => Err(unmapped()),
        }
    }
}

fn fits(scalar: ScalarType, value: &Value) -> bool {
    matches!(
        (scalar, value),
        (ScalarType::Bool, Value::Bool(_))
            | (ScalarType::I64, Value::Int(_))
            | (ScalarType::F64, Value::Float(_))
            | (ScalarType::String, Value::String(_))
    )
}

impl TypeMaps for Mapper {
    fn find_type_map(&self, pair: &TypePair) -> Option<TypeMapInfo> {
        self.config.type_maps.get(pair).map(TypeMap::info)
    }
}

impl ElementMapper for Mapper {
    fn map_element(
        &self,
        pair: &TypePair,
        source: &Value,
        ctx: &mut ResolutionContext<'_>,
    ) -> Result<Value, MapError> {
        if let Some(map) = self.config.type_maps.get(pair) {
            return (map.convert)(source, ctx);
        }
        if is_match(pair) {
            debug!(%pair, "mapping nested collection");
            let plan = self.plan(pair)?;
            return plan.execute(source, None, ctx);
        }
        self.convert(pair, source, ctx)
    }
}
