//! Compiled plans, shared between every mapping call of a [`Mapper`](crate::Mapper).
//!
//! Plans are keyed by the type pair and, for members, by the member
//! directives, since those change what gets compiled.

use hashbrown::HashMap;
use parking_lot::RwLock;
use shapemap_core::TypePair;
use tracing::trace;

use crate::{MemberMap, Plan, PlanError};

/// Cache key: the pair, plus the member directives when reached as a member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanKey {
    /// the mapped pair
    pub pair: TypePair,
    /// `None` for root mappings
    pub member: Option<MemberMap>,
}

impl PlanKey {
    /// Key of a root mapping.
    pub fn root(pair: TypePair) -> Self {
        Self { pair, member: None }
    }

    /// Key of a mapping reached as `member`.
    pub fn member(pair: TypePair, member: MemberMap) -> Self {
        Self {
            pair,
            member: Some(member),
        }
    }
}

/// Plans built so far. Read-mostly once warm.
#[derive(Default)]
pub struct PlanCache {
    plans: RwLock<HashMap<PlanKey, Plan>>,
}

impl PlanCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached plan for `key`, building it with `build` on a miss.
    ///
    /// `build` runs outside the lock, so two threads missing on the same key
    /// may both build. The first plan inserted wins and both callers get it.
    /// Build errors are returned and nothing is cached.
    pub fn get_or_build(
        &self,
        key: &PlanKey,
        build: impl FnOnce() -> Result<Plan, PlanError>,
    ) -> Result<Plan, PlanError> {
        // Fast path: check read lock first
        if let Some(plan) = self.plans.read().get(key) {
            trace!(pair = %key.pair, "plan cache hit");
            return Ok(plan.clone());
        }

        let built = build()?;
        let mut plans = self.plans.write();
        Ok(plans.entry(key.clone()).or_insert(built).clone())
    }

    /// The cached plan for `key`, if any.
    pub fn get(&self, key: &PlanKey) -> Option<Plan> {
        self.plans.read().get(key).cloned()
    }

    /// Number of cached plans.
    pub fn len(&self) -> usize {
        self.plans.read().len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.plans.read().is_empty()
    }

    /// Forgets every plan.
    pub fn clear(&self) {
        self.plans.write().clear();
    }
}

impl core::fmt::Debug for PlanCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PlanCache")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use shapemap_core::Shape;

    use super::*;
    use crate::CollectionKind;

    fn dummy(pair: &TypePair) -> Plan {
        Plan::new(pair.clone(), CollectionKind::ListLike, |_, _, _| {
            Ok(shapemap_core::Value::Null)
        })
    }

    #[test]
    fn builds_once_per_key() {
        let cache = PlanCache::new();
        let pair = TypePair::new(Shape::list(Shape::i64()), Shape::set(Shape::i64()));
        let key = PlanKey::root(pair.clone());

        let first = cache.get_or_build(&key, || Ok(dummy(&pair))).unwrap();
        let second = cache
            .get_or_build(&key, || panic!("cached plans are not rebuilt"))
            .unwrap();
        assert!(Plan::ptr_eq(&first, &second));

        let member = PlanKey::member(pair.clone(), MemberMap::settable());
        cache.get_or_build(&member, || Ok(dummy(&pair))).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = PlanCache::new();
        let pair = TypePair::new(Shape::i64(), Shape::i64());
        let key = PlanKey::root(pair.clone());
        let err = cache
            .get_or_build(&key, || Err(PlanError::NotACollection { pair: pair.clone() }))
            .unwrap_err();
        assert!(matches!(err, PlanError::NotACollection { .. }));
        assert!(cache.is_empty());
    }
}
