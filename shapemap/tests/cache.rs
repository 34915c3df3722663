use std::thread;

use shapemap::{
    CollectionValue, Mapper, MapperConfig, MemberMap, Plan, PlanCache, PlanKey, Shape, TypePair,
    Value, build_plan,
};
use shapemap_testhelpers::{IPanic, setup};

#[test]
fn root_and_member_plans_are_cached_separately() -> Result<(), IPanic> {
    setup();
    let mapper = Mapper::new(MapperConfig::new());
    let pair = TypePair::new(Shape::list(Shape::i64()), Shape::list(Shape::f64()));

    let root = mapper.plan(&pair)?;
    assert!(Plan::ptr_eq(&root, &mapper.plan(&pair)?));
    let member = mapper.member_plan(&pair, &MemberMap::settable())?;
    assert!(!Plan::ptr_eq(&root, &member));
    assert!(Plan::ptr_eq(&member, &mapper.member_plan(&pair, &MemberMap::settable())?));
    mapper.member_plan(&pair, &MemberMap::in_place())?;
    assert_eq!(mapper.cached_plans(), 3);
    Ok(())
}

#[test]
fn concurrent_builds_converge_on_one_plan() -> Result<(), IPanic> {
    setup();
    let mapper = Mapper::new(MapperConfig::new());
    let pair = TypePair::new(
        Shape::list(Shape::list(Shape::i64())),
        Shape::array(Shape::set(Shape::i64()), 1),
    );
    let source = Value::Collection(CollectionValue::with_items(
        pair.source.clone(),
        vec![Value::Collection(CollectionValue::with_items(
            Shape::list(Shape::i64()),
            vec![Value::Int(2), Value::Int(2), Value::Int(1)],
        ))],
    ));

    let results = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let plan = mapper.plan(&pair)?;
                    let mapped = mapper.map(&pair, &source, None)?;
                    Ok::<_, shapemap::MapError>((plan, mapped))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("mapping thread panicked"))
            .collect::<Result<Vec<_>, _>>()
    })?;

    let (first, mapped) = &results[0];
    for (plan, other) in &results {
        assert!(Plan::ptr_eq(first, plan));
        assert_eq!(mapped, other);
    }
    insta::assert_snapshot!(mapped, @"[[2, 1]]");
    assert_eq!(mapper.cached_plans(), 2);
    Ok(())
}

#[test]
fn first_inserted_plan_wins() -> Result<(), IPanic> {
    setup();
    let mapper = Mapper::new(MapperConfig::new());
    let env = mapper.env();
    let cache = PlanCache::new();
    let pair = TypePair::new(Shape::set(Shape::string()), Shape::list(Shape::string()));
    let key = PlanKey::root(pair.clone());

    // two builders racing on the same key: both built, one kept
    let first = build_plan(&pair, None, &env)?;
    let second = build_plan(&pair, None, &env)?;
    let kept = cache.get_or_build(&key, || Ok(first.clone()))?;
    let raced = cache.get_or_build(&key, || Ok(second.clone()))?;
    assert!(Plan::ptr_eq(&kept, &first));
    assert!(Plan::ptr_eq(&raced, &first));
    assert!(cache.get(&key).is_some_and(|plan| Plan::ptr_eq(&plan, &first)));
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
    Ok(())
}
