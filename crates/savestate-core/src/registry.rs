//! Ordered participant registry.
//!
//! Registration order is the fan-out order for every lifecycle operation.
//! Participants are shared handles so the consumer keeps access to its own
//! object after handing it to the manager; identity is the allocation, not
//! the value.

use std::sync::{Arc, Mutex, PoisonError};

use crate::traits::Participant;

/// A participant as stored in the registry.
pub type DynParticipant<D> = dyn Participant<D> + Send;

/// Shared handle to a registered participant.
pub type SharedParticipant<D> = Arc<Mutex<DynParticipant<D>>>;

fn same_participant<D>(a: &SharedParticipant<D>, b: &SharedParticipant<D>) -> bool {
    // Compare data pointers only; vtable pointers are not guaranteed unique.
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Participants in registration order.
pub struct Registry<D> {
    entries: Vec<SharedParticipant<D>>,
}

impl<D> Registry<D> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a participant.
    ///
    /// Returns `false` without modifying the registry if the same handle is
    /// already registered.
    pub fn register(&mut self, participant: SharedParticipant<D>) -> bool {
        if self.contains(&participant) {
            return false;
        }
        self.entries.push(participant);
        true
    }

    /// Remove a participant by identity. Returns whether it was present.
    pub fn deregister(&mut self, participant: &SharedParticipant<D>) -> bool {
        match self
            .entries
            .iter()
            .position(|p| same_participant(p, participant))
        {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, participant: &SharedParticipant<D>) -> bool {
        self.entries.iter().any(|p| same_participant(p, participant))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Call `f` on every participant, one at a time, in registration order.
    ///
    /// A participant whose lock was poisoned by an earlier panic is still
    /// visited; the fan-out never skips an entry.
    pub fn for_each(&self, mut f: impl FnMut(&mut DynParticipant<D>)) {
        for entry in &self.entries {
            let mut guard = entry.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut *guard);
        }
    }
}

impl<D> Default for Registry<D> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        id: u32,
    }

    impl Participant<Vec<u32>> for Counter {
        fn create(&mut self, data: &mut Vec<u32>) {
            data.push(self.id);
        }
        fn load(&mut self, _data: &Vec<u32>) {}
        fn save(&mut self, data: &mut Vec<u32>) {
            data.push(self.id);
        }
        fn clear(&mut self, _data: &Vec<u32>) {}
    }

    fn counter(id: u32) -> SharedParticipant<Vec<u32>> {
        Arc::new(Mutex::new(Counter { id }))
    }

    #[test]
    fn new_registry_is_empty() {
        let registry: Registry<Vec<u32>> = Registry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn for_each_follows_registration_order() {
        let mut registry = Registry::new();
        registry.register(counter(3));
        registry.register(counter(1));
        registry.register(counter(2));

        let mut data = Vec::new();
        registry.for_each(|p| p.create(&mut data));

        assert_eq!(data, vec![3, 1, 2]);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = Registry::new();
        let a = counter(1);

        assert!(registry.register(a.clone()));
        assert!(!registry.register(a.clone()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn equal_values_are_distinct_participants() {
        let mut registry = Registry::new();
        assert!(registry.register(counter(1)));
        assert!(registry.register(counter(1)));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn deregister_removes_by_identity() {
        let mut registry = Registry::new();
        let a = counter(1);
        let b = counter(2);
        registry.register(a.clone());
        registry.register(b.clone());

        assert!(registry.deregister(&a));
        assert!(!registry.contains(&a));
        assert!(registry.contains(&b));

        let mut data = Vec::new();
        registry.for_each(|p| p.save(&mut data));
        assert_eq!(data, vec![2]);
    }

    #[test]
    fn deregister_missing_is_noop() {
        let mut registry = Registry::new();
        registry.register(counter(1));

        assert!(!registry.deregister(&counter(1)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn clear_empties_registry() {
        let mut registry = Registry::new();
        registry.register(counter(1));
        registry.register(counter(2));

        registry.clear();

        let mut visited = 0;
        registry.for_each(|_| visited += 1);
        assert_eq!(visited, 0);
    }

    #[test]
    fn poisoned_participant_is_still_visited() {
        let mut registry = Registry::new();
        let a = counter(7);
        registry.register(a.clone());

        let poisoner = a.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(a.is_poisoned());

        let mut data = Vec::new();
        registry.for_each(|p| p.create(&mut data));
        assert_eq!(data, vec![7]);
    }
}
