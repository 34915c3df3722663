//! Read-only wrappers: populate a mutable backing collection, then wrap it.

use shapemap_core::{Def, ReadOnlyListDef, ReadOnlyMapDef, Shape, TypePair};
use tracing::trace;

use super::{MemberMap, Plan, PlanEnv, collection, into_collection};
use crate::{Classification, PlanError, classify};

pub(super) fn build(
    pair: &TypePair,
    classification: &Classification,
    member: Option<&MemberMap>,
    env: &PlanEnv<'_>,
) -> Result<Plan, PlanError> {
    let destination = &pair.destination;
    let (backing_shape, wrapper) = match &destination.def {
        Def::ReadOnlyList(list) => {
            let wrapper = if destination.is_interface() {
                Shape::read_only_list(list.t.clone())
            } else {
                destination.clone()
            };
            (Shape::list(list.t.clone()), wrapper)
        }
        Def::ReadOnlyMap(map) => {
            let wrapper = if destination.is_interface() {
                Shape::read_only_map(map.k.clone(), map.v.clone())
            } else {
                destination.clone()
            };
            (Shape::map(map.k.clone(), map.v.clone()), wrapper)
        }
        _ => return Err(PlanError::NotACollection { pair: pair.clone() }),
    };

    let ctor = match &wrapper.def {
        Def::ReadOnlyList(ReadOnlyListDef { ctor, .. })
        | Def::ReadOnlyMap(ReadOnlyMapDef { ctor, .. }) => *ctor,
        _ => None,
    }
    .ok_or_else(|| PlanError::NoWrapperConstructor {
        shape: wrapper.clone(),
    })?;

    // The backing collection is always built fresh, never taken from the caller.
    let backing_pair = TypePair::new(pair.source.clone(), backing_shape.clone());
    let backing_member = member.map(|member| MemberMap {
        use_destination_value: false,
        ..member.clone()
    });
    let populate = collection::build(
        &backing_pair,
        &classify(&backing_pair)?,
        backing_member.as_ref(),
        env,
    )?;
    trace!(%pair, %wrapper, "read-only wrapper over {backing_shape}");

    Ok(Plan::new(
        pair.clone(),
        classification.kind,
        move |source, _existing, ctx| {
            let populated = populate.execute(source, None, ctx)?;
            let backing = into_collection(&backing_shape, populated)?;
            Ok((ctor.0)(&wrapper, backing))
        },
    ))
}
