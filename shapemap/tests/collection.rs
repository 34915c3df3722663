use std::sync::Arc;

use shapemap::{
    CollectionKind, CollectionVTable, CollectionValue, CustomDef, Def, LIST_VTABLE, MapError,
    Mapper, MapperConfig, MemberMap, PlanError, SequenceDef, Shape, TypeMap, TypePair, Value,
    ValueError, clear_items, flagged_read_only, never_read_only, push_item,
};
use shapemap_testhelpers::{IPanic, setup};

fn collection(shape: Arc<Shape>, items: impl IntoIterator<Item = Value>) -> Value {
    Value::Collection(CollectionValue::with_items(shape, items.into_iter().collect()))
}

fn ints(items: &[i64]) -> Value {
    collection(Shape::list(Shape::i64()), items.iter().copied().map(Value::Int))
}

fn items(value: &Value) -> &[Value] {
    value.elements().expect("a collection")
}

fn mapper() -> Mapper {
    Mapper::new(MapperConfig::new())
}

#[test]
fn maps_each_element_in_order() -> Result<(), IPanic> {
    setup();
    let pair = TypePair::new(Shape::list(Shape::i64()), Shape::list(Shape::f64()));
    let mapped = mapper().map(&pair, &ints(&[3, 1, 2]), None)?;
    assert_eq!(mapped.as_collection().unwrap().shape(), &pair.destination);
    insta::assert_snapshot!(mapped, @"[3, 1, 2]");
    assert_eq!(items(&mapped)[0], Value::Float(3.0));
    Ok(())
}

#[test]
fn mapping_twice_into_the_same_destination_is_idempotent() -> Result<(), IPanic> {
    setup();
    let mapper = mapper();
    let pair = TypePair::new(Shape::list(Shape::i64()), Shape::list(Shape::string()));
    let source = ints(&[1, 2, 3]);

    let once = mapper.map(&pair, &source, None)?;
    let twice = mapper.map(&pair, &source, Some(once.clone()))?;
    assert_eq!(once, twice);
    insta::assert_snapshot!(twice, @r#"["1", "2", "3"]"#);
    Ok(())
}

#[test]
fn absent_destinations_are_constructed() -> Result<(), IPanic> {
    setup();
    let mapper = mapper();
    let source = ints(&[1, 2, 2]);
    let destinations = [
        (Shape::list(Shape::i64()), "Vec<i64>"),
        (Shape::set(Shape::i64()), "Set<i64>"),
        (Shape::collection(Shape::i64()), "Vec<i64>"),
        (Shape::sequence(Shape::i64()), "Vec<i64>"),
    ];
    for (destination, built) in destinations {
        let pair = TypePair::new(Shape::list(Shape::i64()), destination);
        for existing in [None, Some(Value::Null)] {
            let mapped = mapper.map(&pair, &source, existing)?;
            assert_eq!(mapped.as_collection().unwrap().shape().to_string(), built);
        }
    }

    let pair = TypePair::new(
        Shape::list(Shape::pair(Shape::string(), Shape::i64())),
        Shape::map_interface(Shape::string(), Shape::i64()),
    );
    let entries = collection(
        Shape::list(Shape::pair(Shape::string(), Shape::i64())),
        [Value::pair("a", 1_i64), Value::pair("b", 2_i64)],
    );
    let mapped = mapper.map_member(&pair, &MemberMap::settable(), &entries, None)?;
    insta::assert_snapshot!(mapped.as_collection().unwrap().shape(), @"Map<String, i64>");
    insta::assert_snapshot!(mapped, @r#"["a" => 1, "b" => 2]"#);
    Ok(())
}

#[test]
fn existing_destination_is_cleared_and_reused() -> Result<(), IPanic> {
    setup();
    let pair = TypePair::new(Shape::list(Shape::i64()), Shape::collection(Shape::i64()));
    // the interface-typed slot holds a set, which keeps its set semantics
    let existing = collection(Shape::set(Shape::i64()), [Value::Int(9)]);
    let mapped = mapper().map(&pair, &ints(&[1, 2, 2, 3]), Some(existing))?;
    assert_eq!(mapped.as_collection().unwrap().shape(), &Shape::set(Shape::i64()));
    insta::assert_snapshot!(mapped, @"[1, 2, 3]");
    Ok(())
}

#[test]
fn settable_members_replace_read_only_destinations() -> Result<(), IPanic> {
    setup();
    let mapper = mapper();
    let pair = TypePair::new(Shape::list(Shape::i64()), Shape::list(Shape::i64()));
    let frozen = || {
        Value::Collection(
            CollectionValue::with_items(Shape::list(Shape::i64()), vec![Value::Int(9)])
                .into_read_only(),
        )
    };

    let mapped = mapper.map_member(&pair, &MemberMap::settable(), &ints(&[1]), Some(frozen()))?;
    assert!(!mapped.as_collection().unwrap().is_read_only());
    insta::assert_snapshot!(mapped, @"[1]");

    // a member that cannot be assigned has to live with what it was given
    let err = mapper
        .map_member(&pair, &MemberMap::default(), &ints(&[1]), Some(frozen()))
        .unwrap_err();
    assert!(matches!(err, MapError::Value(ValueError::ReadOnly { .. })));
    Ok(())
}

#[test]
fn settable_members_reject_destinations_that_are_not_collections() {
    setup();
    let mapper = mapper();
    let pair = TypePair::new(Shape::list(Shape::i64()), Shape::list(Shape::i64()));
    for member in [MemberMap::default(), MemberMap::settable(), MemberMap::in_place()] {
        let err = mapper
            .map_member(&pair, &member, &ints(&[1]), Some(Value::Int(3)))
            .unwrap_err();
        assert_eq!(err.to_string(), "expected a collection for Vec<i64>, got a int");
    }
}

static LOG_VTABLE: CollectionVTable = CollectionVTable {
    add: Some(push_item),
    clear: Some(clear_items),
    is_read_only: never_read_only,
};

#[test]
fn read_only_is_decided_by_the_destination_vtable() -> Result<(), IPanic> {
    setup();
    let log = Shape::custom("Log", CustomDef::typed(Shape::i64(), &LOG_VTABLE));
    let frozen = CollectionValue::with_items(log.clone(), vec![]).into_read_only();
    assert!(!frozen.is_read_only());

    let pair = TypePair::new(Shape::list(Shape::i64()), log.clone());
    let existing = collection(log.clone(), [Value::Int(9)]);
    let mapped = mapper().map_member(&pair, &MemberMap::settable(), &ints(&[1, 2]), Some(existing))?;
    insta::assert_snapshot!(mapped.as_collection().unwrap().shape(), @"Log<i64>");
    insta::assert_snapshot!(mapped, @"[1, 2]");
    Ok(())
}

#[test]
fn in_place_members_need_a_destination() -> Result<(), IPanic> {
    setup();
    let mapper = mapper();
    let pair = TypePair::new(Shape::list(Shape::i64()), Shape::set(Shape::i64()));

    let existing = collection(Shape::set(Shape::i64()), [Value::Int(7)]);
    let mapped = mapper.map_member(&pair, &MemberMap::in_place(), &ints(&[4, 4]), Some(existing))?;
    insta::assert_snapshot!(mapped, @"[4]");

    let err = mapper
        .map_member(&pair, &MemberMap::in_place(), &ints(&[4]), None)
        .unwrap_err();
    insta::assert_snapshot!(err, @"Vec<i64> -> Set<i64> must reuse the destination value, but none was supplied");
    Ok(())
}

#[test]
fn dictionaries_map_keys_and_values() -> Result<(), IPanic> {
    setup();
    let mapper = mapper();
    let source_shape = Shape::map(Shape::string(), Shape::i64());
    let pair = TypePair::new(source_shape.clone(), Shape::map(Shape::string(), Shape::f64()));
    let source = collection(source_shape, [Value::pair("x", 1_i64), Value::pair("y", 2_i64)]);
    let mapped = mapper.map(&pair, &source, None)?;
    assert_eq!(items(&mapped), &[Value::pair("x", 1.0), Value::pair("y", 2.0)]);

    let entries = Shape::list(Shape::pair(Shape::string(), Shape::i64()));
    let pair = TypePair::new(entries.clone(), Shape::map(Shape::string(), Shape::i64()));
    let source = collection(entries, [Value::pair("x", 1_i64), Value::pair("x", 2_i64)]);
    let err = mapper.map(&pair, &source, None).unwrap_err();
    insta::assert_snapshot!(err, @r#"duplicate key "x" in Map<String, i64>"#);
    Ok(())
}

#[test]
fn untyped_collections_take_any_value() -> Result<(), IPanic> {
    setup();
    let bag = Shape::custom("Bag", CustomDef::untyped(&LIST_VTABLE));
    let pair = TypePair::new(Shape::list(Shape::i64()), bag.clone());
    let mapper = mapper();
    assert_eq!(mapper.plan(&pair)?.kind(), CollectionKind::UntypedFallback);

    let mapped = mapper.map(&pair, &ints(&[1, 2]), None)?;
    assert_eq!(mapped.as_collection().unwrap().shape(), &bag);
    insta::assert_snapshot!(mapped, @"[1, 2]");

    // and enumerate as untyped values
    let back = TypePair::new(bag, Shape::list(Shape::i64()));
    let mapped = mapper.map(&back, &mapped, None)?;
    assert_eq!(items(&mapped), &[Value::Int(1), Value::Int(2)]);
    Ok(())
}

static NO_CLEAR_VTABLE: CollectionVTable = CollectionVTable {
    add: Some(push_item),
    clear: None,
    is_read_only: flagged_read_only,
};

static NO_ADD_VTABLE: CollectionVTable = CollectionVTable {
    add: None,
    clear: Some(clear_items),
    is_read_only: flagged_read_only,
};

#[test]
fn malformed_destinations_fail_when_the_plan_is_built() {
    setup();
    let mapper = mapper();
    let source = Shape::list(Shape::i64());
    let build = |destination: Arc<Shape>| {
        mapper
            .plan(&TypePair::new(source.clone(), destination))
            .unwrap_err()
    };

    let err = build(Shape::custom("AppendOnly", CustomDef::typed(Shape::i64(), &NO_CLEAR_VTABLE)));
    insta::assert_snapshot!(err, @"AppendOnly<i64> has no clear operation");

    let err = build(Shape::custom("Drain", CustomDef::typed(Shape::i64(), &NO_ADD_VTABLE)));
    assert!(matches!(err, PlanError::NoAddOperation { .. }));

    let stream = Arc::new(Shape::new("Stream", Def::Sequence(SequenceDef { t: Shape::i64() })));
    assert!(matches!(build(stream), PlanError::NoAddOperation { .. }));

    let err = build(Shape::i64());
    insta::assert_snapshot!(err, @"Vec<i64> -> i64 is not a collection mapping");
    assert_eq!(mapper.cached_plans(), 0);
}

#[test]
fn depth_limit_leaves_the_destination_empty() -> Result<(), IPanic> {
    setup();
    let mapper = mapper();
    let pair = TypePair::new(Shape::list(Shape::i64()), Shape::list(Shape::i64()));
    let owner = TypePair::new(Shape::string(), Shape::string());
    let member = MemberMap::settable().with_max_depth(owner.clone(), 1);
    let plan = mapper.member_plan(&pair, &member)?;
    let existing = || Some(ints(&[9, 9]));

    let mut ctx = mapper.context();
    ctx.increment_type_depth(&owner);
    let mapped = plan.execute(&ints(&[1, 2]), existing(), &mut ctx)?;
    insta::assert_snapshot!(mapped, @"[1, 2]");

    ctx.increment_type_depth(&owner);
    let mapped = plan.execute(&ints(&[1, 2]), existing(), &mut ctx)?;
    assert_eq!(mapped, collection(Shape::list(Shape::i64()), []));

    let mapped = plan.execute(&ints(&[1, 2]), None, &mut ctx)?;
    assert_eq!(mapped, collection(Shape::list(Shape::i64()), []));
    Ok(())
}

#[test]
fn context_bookkeeping_only_wraps_member_mappings() -> Result<(), IPanic> {
    setup();
    let elements = TypePair::new(Shape::i64(), Shape::i64());
    let tracked = elements.clone();
    let config = MapperConfig::new().type_map(
        elements,
        TypeMap::new(move |_, ctx| Ok(Value::Int(ctx.type_depth(&tracked) as i64))).max_depth(4),
    );
    let mapper = Mapper::new(config);
    let pair = TypePair::new(Shape::list(Shape::i64()), Shape::list(Shape::i64()));

    let root = mapper.map(&pair, &ints(&[5, 5]), None)?;
    insta::assert_snapshot!(root, @"[0, 0]");

    let member = mapper.map_member(&pair, &MemberMap::settable(), &ints(&[5, 5]), None)?;
    insta::assert_snapshot!(member, @"[1, 1]");
    Ok(())
}

#[test]
fn element_errors_propagate_unchanged() {
    setup();
    let elements = TypePair::new(Shape::i64(), Shape::string());
    let config = MapperConfig::new().type_map(
        elements,
        TypeMap::new(|value, _| match value {
            Value::Int(2) => Err(MapError::custom("two is not allowed")),
            other => Ok(Value::String(other.to_string())),
        }),
    );
    let pair = TypePair::new(Shape::list(Shape::i64()), Shape::list(Shape::string()));
    let err = Mapper::new(config)
        .map(&pair, &ints(&[1, 2, 3]), None)
        .unwrap_err();
    assert!(matches!(err, MapError::Custom { ref message } if message == "two is not allowed"));
}

#[test]
fn null_sources_map_as_empty() -> Result<(), IPanic> {
    setup();
    let pair = TypePair::new(Shape::list(Shape::i64()), Shape::set(Shape::i64()));
    let existing = collection(Shape::set(Shape::i64()), [Value::Int(1)]);
    let mapped = mapper().map(&pair, &Value::Null, Some(existing))?;
    assert_eq!(mapped, collection(Shape::set(Shape::i64()), []));

    let err = mapper().map(&pair, &Value::Int(3), None).unwrap_err();
    insta::assert_snapshot!(err, @"expected a collection for Vec<i64>, got a int");
    Ok(())
}

#[test]
fn legacy_multimap_is_copied_not_mapped() -> Result<(), IPanic> {
    setup();
    let legacy = Shape::legacy_multi_map();
    let pair = TypePair::new(legacy.clone(), legacy.clone());
    let source = collection(
        legacy.clone(),
        [Value::pair("accept", "json"), Value::pair("accept", "xml")],
    );
    let mapper = mapper();
    assert_eq!(mapper.plan(&pair)?.kind(), CollectionKind::LegacyAssociativePassthrough);

    let Value::Collection(mut copy) = mapper.map(&pair, &source, None)? else {
        panic!("expected a collection");
    };
    assert_eq!(copy.items(), items(&source));
    copy.add(Value::pair("accept", "text"))?;
    assert_eq!(copy.len(), 3);
    assert_eq!(items(&source).len(), 2);
    Ok(())
}
