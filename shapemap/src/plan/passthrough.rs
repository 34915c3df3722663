use shapemap_core::{CollectionValue, TypePair, Value};

use super::Plan;
use crate::{CollectionKind, MapError};

/// The legacy multimap is copied wholesale, entries are not mapped.
pub(super) fn build(pair: &TypePair) -> Plan {
    let shape = pair.destination.clone();
    Plan::new(
        pair.clone(),
        CollectionKind::LegacyAssociativePassthrough,
        move |source, _existing, _ctx| match source {
            Value::Null => Ok(Value::Collection(CollectionValue::new(shape.clone()))),
            Value::Collection(collection) => Ok(Value::Collection(CollectionValue::with_items(
                shape.clone(),
                collection.items().to_vec(),
            ))),
            other => Err(MapError::UnexpectedValue {
                shape: shape.clone(),
                expected: "collection",
                actual: other.kind_name(),
            }),
        },
    )
}
