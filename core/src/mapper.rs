use crate::Idx;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Inner {
    forward: HashMap<u32, Idx>,
    next: Idx,
    changed: bool,
}

/// Key -> dense index table for one entity type (movies or users).
///
/// Loaded once from a persisted table and grown as new keys show up. An index
/// is never handed out twice: new keys get `max(loaded) + 1` onwards.
#[derive(Debug, Default)]
pub struct IdMapper {
    inner: RwLock<Inner>,
}

impl IdMapper {
    pub fn new() -> Self { Self::default() }

    pub fn from_map(forward: HashMap<u32, Idx>) -> Self {
        let next = forward.values().max().map_or(0, |m| m + 1);
        Self { inner: RwLock::new(Inner { forward, next, changed: false }) }
    }

    pub fn get(&self, key: u32) -> Option<Idx> {
        self.inner.read().forward.get(&key).copied()
    }

    /// Returns the index for `key`, assigning the next free one under the write
    /// lock if the key is new. Concurrent callers racing on the same new key
    /// all observe the single index assigned by whoever took the lock first.
    pub fn get_or_create(&self, key: u32) -> Idx {
        if let Some(idx) = self.get(key) {
            return idx;
        }
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        if let Some(&idx) = inner.forward.get(&key) {
            return idx;
        }
        let idx = inner.next;
        inner.next += 1;
        inner.forward.insert(key, idx);
        inner.changed = true;
        idx
    }

    pub fn has_changed(&self) -> bool { self.inner.read().changed }

    pub fn snapshot(&self) -> HashMap<u32, Idx> { self.inner.read().forward.clone() }

    pub fn len(&self) -> usize { self.inner.read().forward.len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}
