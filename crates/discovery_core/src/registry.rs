//! Side table tying rendered markers to their place payloads.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::domain::{MarkerId, TouristLocation};

use crate::collaborators::MapSurface;

#[derive(Default)]
struct RegistryState {
    tags: HashMap<MarkerId, TouristLocation>,
    order: Vec<MarkerId>,
    generation: u64,
}

/// Owns the current marker set. Each successful search replaces the whole
/// set; there is no incremental diffing. The generation counter lets late
/// async completions detect that the set they rendered against is gone.
pub struct MarkerRegistry {
    map: Arc<dyn MapSurface>,
    inner: Mutex<RegistryState>,
}

impl MarkerRegistry {
    pub fn new(map: Arc<dyn MapSurface>) -> Self {
        Self {
            map,
            inner: Mutex::new(RegistryState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // A poisoned lock means a panicked toolkit callback; the table itself
        // is still consistent, so keep serving it.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes every rendered marker, then adds exactly one marker per input
    /// location and tags it. Returns the new marker count. The interior lock
    /// keeps concurrent calls from interleaving their add/remove phases.
    pub fn replace_all(&self, locations: &[TouristLocation]) -> usize {
        let mut state = self.lock();
        for marker in state.order.drain(..) {
            self.map.remove_marker(marker);
        }
        state.tags.clear();
        state.generation += 1;

        for location in locations {
            let marker = self.map.add_marker(location.position, &location.name);
            state.order.push(marker);
            state.tags.insert(marker, location.clone());
        }
        state.order.len()
    }

    pub fn tag(&self, marker: MarkerId) -> Option<TouristLocation> {
        self.lock().tags.get(&marker).cloned()
    }

    pub fn contains(&self, marker: MarkerId) -> bool {
        self.lock().tags.contains_key(&marker)
    }

    pub fn markers(&self) -> Vec<MarkerId> {
        self.lock().order.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().order.is_empty()
    }

    /// Bumped on every `replace_all`, including the empty one.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
