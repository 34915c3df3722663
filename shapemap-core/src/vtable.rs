use crate::{CollectionValue, Value, ValueError};

/// Add one item to the collection.
pub type AddFn = fn(collection: &mut CollectionValue, item: Value) -> Result<(), ValueError>;

/// Remove every item from the collection.
pub type ClearFn = fn(collection: &mut CollectionValue) -> Result<(), ValueError>;

/// Whether the collection refuses mutation.
pub type IsReadOnlyFn = fn(collection: &CollectionValue) -> bool;

/// Operations a collection shape supports.
///
/// Builtin shapes share the statics below. User-defined collections declare
/// their own static vtable; leaving `add` or `clear` empty makes the type
/// unusable as a mapping destination, which is reported when the plan is built.
#[derive(Debug)]
pub struct CollectionVTable {
    /// adds an item
    pub add: Option<AddFn>,
    /// removes every item
    pub clear: Option<ClearFn>,
    /// reports whether the value refuses mutation
    pub is_read_only: IsReadOnlyFn,
}

/// Vtable of `Vec<T>` and of list-shaped interfaces.
pub static LIST_VTABLE: CollectionVTable = CollectionVTable {
    add: Some(push_item),
    clear: Some(clear_items),
    is_read_only: flagged_read_only,
};

/// Vtable of `Set<T>`: adding an item that is already present is a no-op.
pub static SET_VTABLE: CollectionVTable = CollectionVTable {
    add: Some(insert_unique),
    clear: Some(clear_items),
    is_read_only: flagged_read_only,
};

/// Vtable of `Map<K, V>`: items are pairs, keys must be unique.
pub static MAP_VTABLE: CollectionVTable = CollectionVTable {
    add: Some(insert_entry),
    clear: Some(clear_items),
    is_read_only: flagged_read_only,
};

/// Vtable of the legacy string multimap: items are pairs, keys may repeat.
pub static MULTI_MAP_VTABLE: CollectionVTable = CollectionVTable {
    add: Some(append_entry),
    clear: Some(clear_items),
    is_read_only: flagged_read_only,
};

/// Vtable of the read-only wrappers: every mutation fails.
pub static READ_ONLY_VTABLE: CollectionVTable = CollectionVTable {
    add: Some(reject_add),
    clear: Some(reject_clear),
    is_read_only: always_read_only,
};

fn ensure_writable(collection: &CollectionValue) -> Result<(), ValueError> {
    if collection.is_flagged_read_only() {
        return Err(ValueError::ReadOnly {
            type_name: collection.shape().to_string(),
        });
    }
    Ok(())
}

/// Appends the item at the end.
pub fn push_item(collection: &mut CollectionValue, item: Value) -> Result<(), ValueError> {
    ensure_writable(collection)?;
    collection.items_mut().push(item);
    Ok(())
}

/// Removes every item.
pub fn clear_items(collection: &mut CollectionValue) -> Result<(), ValueError> {
    ensure_writable(collection)?;
    collection.items_mut().clear();
    Ok(())
}

/// Read-only when the value was frozen with [`CollectionValue::into_read_only`].
pub fn flagged_read_only(collection: &CollectionValue) -> bool {
    collection.is_flagged_read_only()
}

/// Never read-only.
pub fn never_read_only(_collection: &CollectionValue) -> bool {
    false
}

fn always_read_only(_collection: &CollectionValue) -> bool {
    true
}

fn insert_unique(collection: &mut CollectionValue, item: Value) -> Result<(), ValueError> {
    ensure_writable(collection)?;
    if !collection.items().contains(&item) {
        collection.items_mut().push(item);
    }
    Ok(())
}

fn insert_entry(collection: &mut CollectionValue, item: Value) -> Result<(), ValueError> {
    ensure_writable(collection)?;
    let Some((key, _)) = item.as_pair() else {
        return Err(ValueError::WrongKind {
            expected: "pair",
            actual: item.kind_name(),
        });
    };
    let taken = collection
        .items()
        .iter()
        .any(|existing| matches!(existing.as_pair(), Some((k, _)) if k == key));
    if taken {
        return Err(ValueError::DuplicateKey {
            type_name: collection.shape().to_string(),
            key: key.to_string(),
        });
    }
    collection.items_mut().push(item);
    Ok(())
}

fn append_entry(collection: &mut CollectionValue, item: Value) -> Result<(), ValueError> {
    ensure_writable(collection)?;
    if item.as_pair().is_none() {
        return Err(ValueError::WrongKind {
            expected: "pair",
            actual: item.kind_name(),
        });
    }
    collection.items_mut().push(item);
    Ok(())
}

fn reject_add(collection: &mut CollectionValue, _item: Value) -> Result<(), ValueError> {
    Err(ValueError::ReadOnly {
        type_name: collection.shape().to_string(),
    })
}

fn reject_clear(collection: &mut CollectionValue) -> Result<(), ValueError> {
    Err(ValueError::ReadOnly {
        type_name: collection.shape().to_string(),
    })
}
