//! Construction stack and cycle detection.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};
use crate::key::Key;

// Keys mid-construction on this thread, tagged with the owning container.
thread_local! {
    static CONSTRUCTION_TLS: RefCell<Vec<(u64, Key)>> = const { RefCell::new(Vec::new()) };
}

/// RAII entry on the thread-local construction stack.
///
/// Entering fails instead of pushing when the key is already being
/// constructed by the same container on this thread. Dropping the guard pops
/// the entry, so every exit path of a resolution unwinds the stack.
pub(crate) struct ConstructionGuard {
    container: u64,
    key: Key,
}

impl ConstructionGuard {
    pub(crate) fn enter(
        container: u64,
        concrete: &Key,
        requested: &Key,
        max_depth: usize,
    ) -> DiResult<Self> {
        CONSTRUCTION_TLS.with(|tls| {
            let mut stack = tls.borrow_mut();

            // Cycle check before pushing
            if stack.iter().any(|(id, k)| *id == container && k == concrete) {
                let mut path: Vec<Key> = stack
                    .iter()
                    .filter(|(id, _)| *id == container)
                    .map(|(_, k)| k.clone())
                    .collect();
                path.push(concrete.clone());
                tracing::warn!(
                    requested = %requested,
                    path = ?path,
                    "circular dependency detected"
                );
                return Err(DiError::CircularDependency {
                    requested: requested.clone(),
                    path,
                });
            }

            let depth = stack.iter().filter(|(id, _)| *id == container).count();
            if depth >= max_depth {
                return Err(DiError::DepthExceeded(max_depth));
            }

            stack.push((container, concrete.clone()));
            Ok(())
        })?;

        Ok(Self {
            container,
            key: concrete.clone(),
        })
    }
}

impl Drop for ConstructionGuard {
    fn drop(&mut self) {
        CONSTRUCTION_TLS.with(|tls| {
            let mut stack = tls.borrow_mut();
            // Guards drop in LIFO order, but search from the top anyway.
            if let Some(pos) = stack
                .iter()
                .rposition(|(id, k)| *id == self.container && *k == self.key)
            {
                stack.remove(pos);
            }
        });
    }
}

/// Number of keys `container` is constructing on the current thread.
pub(crate) fn depth(container: u64) -> usize {
    CONSTRUCTION_TLS.with(|tls| {
        tls.borrow()
            .iter()
            .filter(|(id, _)| *id == container)
            .count()
    })
}
