#![no_main]

use ferrous_autowire::{Canonicalization, DiError, Key, TypeRegistry};
use libfuzzer_sys::fuzz_target;

const NODES: u8 = 16;

fn node(byte: u8) -> Key {
    Key::new(format!("n{}", byte % NODES))
}

fuzz_target!(|data: &[u8]| {
    let registry = TypeRegistry::new();

    // Each triple is (kind, from, to); the trailing byte picks the start
    for chunk in data.chunks_exact(3) {
        match chunk[0] % 4 {
            0 => registry.alias(node(chunk[2]), node(chunk[1])),
            1 => registry.bind(node(chunk[1]), node(chunk[2])),
            2 => {
                registry.unalias(&node(chunk[1]));
            }
            _ => {
                registry.unbind(&node(chunk[1]));
            }
        }
    }

    let start = node(data.last().copied().unwrap_or(0));
    for order in [Canonicalization::Interleaved, Canonicalization::AliasesThenMappings] {
        match registry.redirections(&start, order) {
            Ok(path) => {
                assert_eq!(path.first(), Some(&start));
                // Each phase visits a key at most once
                assert!(path.len() <= 2 * usize::from(NODES) + 1);
                let concrete = registry.canonicalize(&start, order).unwrap();
                assert_eq!(path.last(), Some(&concrete));
            }
            Err(DiError::AliasCycle { chain, .. }) => {
                let repeated = chain.last().unwrap();
                assert!(chain[..chain.len() - 1].contains(repeated));
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
});
