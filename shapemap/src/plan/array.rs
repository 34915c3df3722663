//! Arrays: allocated at the source length, then filled.

use std::sync::Arc;

use shapemap_core::{ArrayValue, Shape, TypePair, Value};
use tracing::trace;

use super::{Plan, PlanEnv, source_items};
use crate::{
    Classification, CollectionKind, MapError, MultidimensionalFiller, PlanError,
    classify::source_element,
};

pub(super) fn build(
    pair: &TypePair,
    classification: &Classification,
    env: &PlanEnv<'_>,
) -> Result<Plan, PlanError> {
    let element = TypePair::new(source_element(pair)?, classification.element.clone());
    if let CollectionKind::ArrayND { rank } = classification.kind {
        return multidimensional(pair, rank, element);
    }

    if env.type_maps.find_type_map(&element).is_none() {
        let source_rank = pair.source.array_rank();
        if source_rank == Some(1) && element.destination.accepts(&element.source) {
            trace!(%pair, "array to array bulk copy");
            return Ok(bulk_copy(pair, element.destination));
        }
        if source_rank.is_none() && pair.source.is_countable() && element.source == element.destination
        {
            trace!(%pair, "sized collection bulk copy");
            return Ok(bulk_copy(pair, element.destination));
        }
    }
    Ok(per_element(pair, element))
}

/// Allocates at the source length and lets the source copy itself in.
fn bulk_copy(pair: &TypePair, element: Arc<Shape>) -> Plan {
    let source_shape = pair.source.clone();
    Plan::new(pair.clone(), CollectionKind::Array1D, move |source, _existing, _ctx| {
        let len = source_items(&source_shape, source)?.len();
        let mut destination = ArrayValue::new(element.clone(), vec![len]);
        match source {
            Value::Array(array) => array.copy_to(destination.items_mut())?,
            Value::Collection(collection) => collection.copy_to(destination.items_mut())?,
            _ => {}
        }
        Ok(Value::Array(destination))
    })
}

/// Maps every element into its slot, in source order.
///
/// Every source value knows its length, so sizing the array never needs a
/// separate counting pass.
fn per_element(pair: &TypePair, element: TypePair) -> Plan {
    let source_shape = pair.source.clone();
    Plan::new(pair.clone(), CollectionKind::Array1D, move |source, _existing, ctx| {
        let items = source_items(&source_shape, source)?;
        let mut destination = ArrayValue::new(element.destination.clone(), vec![items.len()]);
        for (index, item) in items.iter().enumerate() {
            let mapped = ctx.map(&element, item)?;
            destination.set(&[index], mapped)?;
        }
        Ok(Value::Array(destination))
    })
}

/// Copies the source's extents and fills row-major through the filler.
fn multidimensional(pair: &TypePair, rank: usize, element: TypePair) -> Result<Plan, PlanError> {
    if pair.source.array_rank() != Some(rank) {
        return Err(PlanError::RankMismatch {
            from: pair.source.clone(),
            rank,
        });
    }

    let source_shape = pair.source.clone();
    Ok(Plan::new(
        pair.clone(),
        CollectionKind::ArrayND { rank },
        move |source, _existing, ctx| {
            let (dims, items) = match source {
                Value::Null => (vec![0; rank], &[][..]),
                Value::Array(array) if array.rank() == rank => (array.dims().to_vec(), array.items()),
                Value::Array(array) => {
                    return Err(MapError::ArrayRank {
                        shape: source_shape.clone(),
                        expected: rank,
                        actual: array.rank(),
                    });
                }
                other => {
                    return Err(MapError::UnexpectedValue {
                        shape: source_shape.clone(),
                        expected: "array",
                        actual: other.kind_name(),
                    });
                }
            };
            let mut destination = ArrayValue::new(element.destination.clone(), dims);
            let mut filler = MultidimensionalFiller::new(&mut destination);
            for item in items {
                filler.accept_next(ctx.map(&element, item)?)?;
            }
            Ok(Value::Array(destination))
        },
    ))
}
