/// Property-based tests for resolution building blocks
///
/// These tests check the descriptor cache against a simple FIFO model and
/// canonicalization against arbitrary alias and binding graphs, including
/// graphs with loops.

use ferrous_autowire::{
    Canonicalization, Container, DiError, Key, ReflectionCache, Resolver, StructuralDescriptor,
    TypeCatalog, TypeIntrospector, TypeRegistry,
};
use proptest::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

const NODES: usize = 6;

fn node(i: usize) -> Key {
    Key::new(format!("n{i}"))
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put(usize),
    Get(usize),
}

fn cache_op() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (0..10usize).prop_map(CacheOp::Put),
        (0..10usize).prop_map(CacheOp::Get),
    ]
}

fn descriptors() -> Vec<Arc<StructuralDescriptor>> {
    let catalog = TypeCatalog::new();
    (0..10)
        .map(|i| {
            let key = catalog.register_as::<()>(node(i)).construct_with(|| ());
            let reflected = catalog.reflect(&key).unwrap();
            Arc::new(StructuralDescriptor::from_reflected(reflected))
        })
        .collect()
}

proptest! {
    #[test]
    fn cache_matches_fifo_model(
        capacity in 0..5usize,
        ops in proptest::collection::vec(cache_op(), 0..60),
    ) {
        let descriptors = descriptors();
        let mut cache = ReflectionCache::new(capacity);
        let mut model: VecDeque<usize> = VecDeque::new();

        for op in ops {
            match op {
                CacheOp::Put(i) => {
                    let evicted = cache.put(node(i), descriptors[i].clone());
                    let expected = if model.contains(&i) {
                        None
                    } else {
                        model.push_back(i);
                        if model.len() > capacity { model.pop_front().map(node) } else { None }
                    };
                    prop_assert_eq!(evicted, expected);
                }
                CacheOp::Get(i) => {
                    let hit = cache.get(&node(i));
                    prop_assert_eq!(hit.is_some(), model.contains(&i));
                    if let Some(descriptor) = hit {
                        prop_assert_eq!(descriptor.key(), &node(i));
                    }
                }
            }
            prop_assert!(cache.len() <= capacity);
            prop_assert_eq!(cache.len(), model.len());
        }
    }
}

fn edges() -> impl Strategy<Value = Vec<(usize, usize)>> {
    proptest::collection::vec((0..NODES, 0..NODES), 0..NODES)
}

fn registry(aliases: &[(usize, usize)], bindings: &[(usize, usize)]) -> TypeRegistry {
    let registry = TypeRegistry::new();
    for (alias, target) in aliases {
        registry.alias(node(*target), node(*alias));
    }
    for (abstract_key, concrete) in bindings {
        registry.bind(node(*abstract_key), node(*concrete));
    }
    registry
}

/// Aliases to exhaustion, then mappings to exhaustion. `None` when either
/// phase revisits one of its own keys.
fn two_phase(registry: &TypeRegistry, start: &Key) -> Option<Key> {
    let mut current = start.clone();

    let mut seen = HashSet::from([current.clone()]);
    while let Some(next) = registry.alias_target(&current) {
        if !seen.insert(next.clone()) {
            return None;
        }
        current = next;
    }

    let mut seen = HashSet::from([current.clone()]);
    while let Some(next) = registry.binding(&current) {
        if !seen.insert(next.clone()) {
            return None;
        }
        current = next;
    }
    Some(current)
}

proptest! {
    #[test]
    fn interleaved_canonicalization_terminates_or_reports_cycle(
        aliases in edges(),
        bindings in edges(),
        start in 0..NODES,
    ) {
        let registry = registry(&aliases, &bindings);
        let key = node(start);

        match registry.redirections(&key, Canonicalization::Interleaved) {
            Ok(path) => {
                prop_assert_eq!(&path[0], &key);
                let distinct: HashSet<&Key> = path.iter().collect();
                prop_assert_eq!(distinct.len(), path.len());

                // Aliases take precedence at every hop
                for hop in path.windows(2) {
                    let expected = registry
                        .alias_target(&hop[0])
                        .or_else(|| registry.binding(&hop[0]));
                    prop_assert_eq!(expected.as_ref(), Some(&hop[1]));
                }

                let last = path.last().unwrap();
                prop_assert!(registry.alias_target(last).is_none());
                prop_assert!(registry.binding(last).is_none());
                prop_assert_eq!(
                    registry.canonicalize(&key, Canonicalization::Interleaved).unwrap(),
                    last.clone()
                );
            }
            Err(DiError::AliasCycle { key: origin, chain }) => {
                prop_assert_eq!(origin, key.clone());
                prop_assert_eq!(&chain[0], &key);
                let repeated = chain.last().unwrap();
                prop_assert!(chain[..chain.len() - 1].contains(repeated));
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn aliases_then_mappings_matches_two_phase_model(
        aliases in edges(),
        bindings in edges(),
        start in 0..NODES,
    ) {
        let registry = registry(&aliases, &bindings);
        let key = node(start);
        let expected = two_phase(&registry, &key);

        match (registry.canonicalize(&key, Canonicalization::AliasesThenMappings), expected) {
            (Ok(concrete), Some(model)) => {
                prop_assert_eq!(&concrete, &model);
                prop_assert!(registry.binding(&concrete).is_none());
            }
            (Err(DiError::AliasCycle { key: origin, .. }), None) => prop_assert_eq!(origin, key),
            (got, model) => prop_assert!(false, "got {:?}, model {:?}", got, model),
        }
    }

    #[test]
    fn alias_chain_shares_singleton(len in 1..8usize) {
        struct Shared;

        let catalog = TypeCatalog::new();
        catalog.register::<Shared>().singleton().construct_with(|| Shared);
        let container = Container::new(Arc::new(catalog));

        let mut target = Key::of::<Shared>();
        for i in 0..len {
            let alias = Key::new(format!("shared.{i}"));
            container.alias(target, alias.clone());
            target = alias;
        }

        let by_alias = container.get_named::<Shared>(&target).unwrap();
        let direct = container.get_required::<Shared>();
        prop_assert!(Arc::ptr_eq(&by_alias, &direct));
    }
}
