#![no_main]

use ferrous_autowire::{Container, ContainerConfig, DiError, Key, TypeCatalog};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

const TYPES: usize = 8;

fn type_key(i: usize) -> Key {
    Key::new(format!("T{}", i % TYPES))
}

fuzz_target!(|data: &[u8]| {
    if data.len() < TYPES {
        return;
    }

    // One byte per type: low bits give the dependency count, the rest
    // choose the targets. Cycles are expected and must be reported.
    let catalog = TypeCatalog::new();
    for (i, spec) in data[..TYPES].iter().enumerate() {
        let deps = usize::from(spec % 3);
        let mut builder = catalog.register_as::<usize>(type_key(i));
        if spec & 0x80 != 0 {
            builder = builder.singleton();
        }
        for d in 0..deps {
            let target = usize::from(spec >> 2) + d;
            builder = builder.param_key(&format!("dep{d}"), type_key(target));
        }
        builder.construct(move |_| Ok(i));
    }

    let config = ContainerConfig::default().with_max_depth(TYPES * 2);
    let Ok(container) = Container::with_config(Arc::new(catalog), config) else {
        return;
    };

    for byte in &data[TYPES..] {
        let key = type_key(usize::from(*byte));
        match container.resolve(&key) {
            Ok(instance) => assert!(instance.downcast::<usize>().is_ok()),
            Err(DiError::CircularDependency { path, .. }) => assert!(path.len() >= 2),
            Err(DiError::DepthExceeded(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
        assert_eq!(container.construction_depth(), 0);
    }
});
