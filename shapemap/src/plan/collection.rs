//! Collections populated through their add and clear operations.

use std::sync::Arc;

use shapemap_core::{Shape, TypePair, Value};
use tracing::trace;

use super::{MemberMap, Plan, PlanEnv, into_collection, source_items};
use crate::{Classification, MapError, PlanError, classify::source_element};

/// Where the populated collection comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Destination {
    /// Always the supplied value.
    InPlace,
    /// The supplied value, unless it refuses mutation.
    ReuseWritable,
    /// The supplied value whenever there is one.
    Reuse,
}

impl Destination {
    fn for_member(member: Option<&MemberMap>) -> Self {
        match member {
            Some(member) if member.use_destination_value => Destination::InPlace,
            Some(member) if member.can_be_set => Destination::ReuseWritable,
            _ => Destination::Reuse,
        }
    }
}

pub(super) fn build(
    pair: &TypePair,
    classification: &Classification,
    member: Option<&MemberMap>,
    env: &PlanEnv<'_>,
) -> Result<Plan, PlanError> {
    check_operations(&pair.destination)?;

    let element = TypePair::new(source_element(pair)?, classification.element.clone());
    let destination = Destination::for_member(member);
    let depth = member
        .and_then(|member| member.max_depth.clone())
        .map(|limit| (limit, env.depth_guard.clone()));
    let context_checked = member.is_some()
        && env
            .type_maps
            .find_type_map(&element)
            .is_some_and(|info| info.requires_context_check());
    trace!(%pair, ?destination, depth_limited = depth.is_some(), context_checked, "collection plan");

    let factory = env.factory.clone();
    let plan_pair = pair.clone();
    let element_pair = element.clone();
    let plan = Plan::new(pair.clone(), classification.kind, move |source, existing, ctx| {
        let existing = existing.filter(|value| !value.is_null());
        let mut target = match (destination, existing) {
            (Destination::InPlace, None) => {
                return Err(MapError::MissingDestination {
                    pair: plan_pair.clone(),
                });
            }
            (Destination::ReuseWritable, Some(Value::Collection(collection)))
                if !collection.is_read_only() =>
            {
                collection
            }
            (Destination::ReuseWritable, Some(Value::Collection(_))) | (_, None) => into_collection(
                &plan_pair.destination,
                factory.construct(&plan_pair.destination)?,
            )?,
            (_, Some(value)) => into_collection(&plan_pair.destination, value)?,
        };

        target.clear()?;
        if let Some((limit, guard)) = &depth
            && guard.exceeded(limit, ctx)
        {
            return Ok(Value::Collection(target));
        }
        for item in source_items(&plan_pair.source, source)? {
            let mapped = ctx.map(&element_pair, item)?;
            target.add(mapped)?;
        }
        Ok(Value::Collection(target))
    });

    if context_checked {
        return Ok(env.context_check.wrap(plan, &element));
    }
    Ok(plan)
}

/// A concrete destination must be able to add and clear. Interfaces are
/// checked against the value actually supplied or constructed at runtime.
fn check_operations(destination: &Arc<Shape>) -> Result<(), PlanError> {
    if destination.is_interface() {
        return Ok(());
    }
    let Some(vtable) = destination.vtable() else {
        return Err(PlanError::NoAddOperation {
            shape: destination.clone(),
        });
    };
    if vtable.add.is_none() {
        return Err(PlanError::NoAddOperation {
            shape: destination.clone(),
        });
    }
    if vtable.clear.is_none() {
        return Err(PlanError::NoClearOperation {
            shape: destination.clone(),
        });
    }
    Ok(())
}
