//! Sorts a [`TypePair`] into the closed set of collection mapping cases.

use std::sync::Arc;

use shapemap_core::{Def, Shape, TypePair};

use crate::PlanError;

/// How a destination collection gets built and filled.
///
/// Every collection-to-collection pair falls in exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Rank-1 array
    Array1D,
    /// Array with more than one dimension
    ArrayND {
        /// number of dimensions
        rank: usize,
    },
    /// Collection with a typed add operation
    ListLike,
    /// Collection with a typed add operation taking key/value pairs
    DictionaryLike,
    /// Read-only view over a list, built from a populated list
    ReadOnlyListWrapper,
    /// Read-only view over a map, built from a populated map
    ReadOnlyDictionaryWrapper,
    /// Legacy string multimap copied onto itself
    LegacyAssociativePassthrough,
    /// Collection that only accepts untyped values
    UntypedFallback,
}

/// Result of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// which builder handles the pair
    pub kind: CollectionKind,
    /// shape of the destination's elements
    pub element: Arc<Shape>,
}

/// Whether both sides of the pair are collection-like.
pub fn is_match(pair: &TypePair) -> bool {
    pair.source.is_collection() && pair.destination.is_collection()
}

/// Picks the mapping case for `pair`. The first matching rule wins:
/// arrays, read-only list wrappers, read-only map wrappers, the legacy
/// multimap onto itself, then the generic add/clear path.
pub fn classify(pair: &TypePair) -> Result<Classification, PlanError> {
    if !is_match(pair) {
        return Err(PlanError::NotACollection { pair: pair.clone() });
    }

    let destination = &pair.destination;
    let (kind, element) = match &destination.def {
        Def::Array(array) => {
            let kind = if array.rank <= 1 {
                CollectionKind::Array1D
            } else {
                CollectionKind::ArrayND { rank: array.rank }
            };
            (kind, array.t.clone())
        }
        Def::ReadOnlyList(list) => (CollectionKind::ReadOnlyListWrapper, list.t.clone()),
        Def::ReadOnlyMap(map) => (
            CollectionKind::ReadOnlyDictionaryWrapper,
            Shape::pair(map.k.clone(), map.v.clone()),
        ),
        Def::LegacyMultiMap if pair.source == pair.destination => (
            CollectionKind::LegacyAssociativePassthrough,
            Shape::pair(Shape::string(), Shape::string()),
        ),
        _ => return classify_generic(pair),
    };
    Ok(Classification { kind, element })
}

fn classify_generic(pair: &TypePair) -> Result<Classification, PlanError> {
    let destination = &pair.destination;
    let typed = |element: Arc<Shape>| {
        let kind = match element.def {
            Def::Pair(_) => CollectionKind::DictionaryLike,
            _ => CollectionKind::ListLike,
        };
        Classification { kind, element }
    };

    match &destination.def {
        Def::Sequence(sequence) if destination.is_interface() => Ok(typed(sequence.t.clone())),
        Def::Sequence(_) => Err(PlanError::NoAddOperation {
            shape: destination.clone(),
        }),
        Def::List(list) => Ok(typed(list.t.clone())),
        Def::Set(set) => Ok(typed(set.t.clone())),
        Def::Map(map) => Ok(typed(Shape::pair(map.k.clone(), map.v.clone()))),
        Def::LegacyMultiMap => Ok(typed(Shape::pair(Shape::string(), Shape::string()))),
        Def::Custom(custom) => match (&custom.element, custom.untyped) {
            (Some(element), _) => Ok(typed(element.clone())),
            (None, true) => Ok(Classification {
                kind: CollectionKind::UntypedFallback,
                element: Shape::dynamic(),
            }),
            (None, false) => Err(PlanError::NoElementType {
                shape: destination.clone(),
            }),
        },
        Def::Array(_)
        | Def::ReadOnlyList(_)
        | Def::ReadOnlyMap(_)
        | Def::Scalar(_)
        | Def::Dynamic
        | Def::Pair(_) => Err(PlanError::NotACollection { pair: pair.clone() }),
    }
}

/// The (source element, destination element) pair of a collection pair.
pub fn associated_types(pair: &TypePair) -> Result<TypePair, PlanError> {
    let destination = classify(pair)?.element;
    let source = source_element(pair)?;
    Ok(TypePair::new(source, destination))
}

pub(crate) fn source_element(pair: &TypePair) -> Result<Arc<Shape>, PlanError> {
    pair.source
        .element_type()
        .ok_or_else(|| PlanError::NoElementType {
            shape: pair.source.clone(),
        })
}
