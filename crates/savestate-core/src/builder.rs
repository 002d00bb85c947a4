//! PersistenceManagerBuilder - one-shot wiring of a manager at startup.
//!
//! The application's composition root builds a single
//! [`PersistenceManager`] and passes it to everything that needs
//! persistence, instead of reaching for global state:
//!
//! ```text
//!   factory ─┐
//!   backend ─┼──▶ PersistenceManagerBuilder ──build()──▶ PersistenceManager
//!   players ─┤
//!   observers┘
//! ```

use crate::error::PersistenceError;
use crate::event_bus::LifecycleEvent;
use crate::manager::{BoxedBackend, Factory, PersistenceManager};
use crate::registry::SharedParticipant;
use crate::traits::{GameData, StorageBackend};

/// Configuration for building a PersistenceManager.
pub struct PersistenceManagerBuilder<D> {
    factory: Option<Factory<D>>,
    backend: Option<BoxedBackend<D>>,
    participants: Vec<SharedParticipant<D>>,
    observers: Vec<Box<dyn FnMut(LifecycleEvent) + Send>>,
}

impl<D: GameData> PersistenceManagerBuilder<D> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            factory: None,
            backend: None,
            participants: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Set the function that builds a fresh aggregate for `new_game`.
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> D + Send + 'static,
    {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Bind a storage backend at build time (equivalent to calling `init`).
    pub fn backend<B>(mut self, backend: B) -> Self
    where
        B: StorageBackend<D> + Send + 'static,
    {
        self.backend = Some(Box::new(backend));
        self
    }

    /// Register a participant. Participants keep the order they are added in.
    pub fn participant(mut self, participant: SharedParticipant<D>) -> Self {
        self.participants.push(participant);
        self
    }

    /// Subscribe a lifecycle observer.
    pub fn observer<F>(mut self, observer: F) -> Self
    where
        F: FnMut(LifecycleEvent) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
        self
    }

    /// Build the PersistenceManager.
    ///
    /// Fails with `AlreadyRegistered` if the same participant was added twice.
    pub fn build(self) -> Result<PersistenceManager<D>, PersistenceError>
    where
        D: Default,
    {
        let factory: Factory<D> = match self.factory {
            Some(factory) => factory,
            None => Box::new(D::default),
        };
        Self::assemble(factory, self.backend, self.participants, self.observers)
    }

    /// Build with the configured factory, for aggregates without `Default`.
    ///
    /// Returns `None` if no factory was set.
    pub fn build_with_factory(self) -> Option<Result<PersistenceManager<D>, PersistenceError>> {
        let factory = self.factory?;
        Some(Self::assemble(
            factory,
            self.backend,
            self.participants,
            self.observers,
        ))
    }

    fn assemble(
        factory: Factory<D>,
        backend: Option<BoxedBackend<D>>,
        participants: Vec<SharedParticipant<D>>,
        observers: Vec<Box<dyn FnMut(LifecycleEvent) + Send>>,
    ) -> Result<PersistenceManager<D>, PersistenceError> {
        let mut manager = PersistenceManager::new(factory);
        if let Some(backend) = backend {
            manager.init_boxed(backend);
        }
        for participant in participants {
            manager.register(participant)?;
        }
        for observer in observers {
            manager.subscribe(observer);
        }
        Ok(manager)
    }
}

impl<D: GameData> Default for PersistenceManagerBuilder<D> {
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
    use crate::backend::MemoryBackend;
    use crate::manager::LifecycleState;
    use crate::traits::Participant;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Tally {
        count: u32,
    }

    impl GameData for Tally {
        fn is_valid(&self) -> bool {
            true
        }
    }

    struct Bump;

    impl Participant<Tally> for Bump {
        fn create(&mut self, data: &mut Tally) {
            data.count += 1;
        }
        fn load(&mut self, _data: &Tally) {}
        fn save(&mut self, _data: &mut Tally) {}
        fn clear(&mut self, _data: &Tally) {}
    }

    #[test]
    fn build_without_backend_is_uninitialized() {
        let manager = PersistenceManager::<Tally>::builder().build().unwrap();
        assert_eq!(manager.state(), LifecycleState::Uninitialized);
        assert_eq!(manager.participant_count(), 0);
    }

    #[test]
    fn build_with_backend_is_ready() {
        let manager = PersistenceManager::<Tally>::builder()
            .backend(MemoryBackend::new())
            .build()
            .unwrap();
        assert_eq!(manager.state(), LifecycleState::NoGame);
    }

    #[test]
    fn build_uses_custom_factory() {
        let mut manager = PersistenceManager::<Tally>::builder()
            .factory(|| Tally { count: 10 })
            .backend(MemoryBackend::new())
            .participant(Arc::new(Mutex::new(Bump)))
            .build()
            .unwrap();

        manager.new_game().unwrap();
        assert_eq!(manager.game_data(), Some(&Tally { count: 11 }));
    }

    #[test]
    fn build_registers_participants_in_order() {
        let mut manager = PersistenceManager::<Tally>::builder()
            .backend(MemoryBackend::new())
            .participant(Arc::new(Mutex::new(Bump)))
            .participant(Arc::new(Mutex::new(Bump)))
            .build()
            .unwrap();

        assert_eq!(manager.participant_count(), 2);
        manager.new_game().unwrap();
        assert_eq!(manager.game_data(), Some(&Tally { count: 2 }));
    }

    #[test]
    fn build_rejects_duplicate_participant() {
        let bump: SharedParticipant<Tally> = Arc::new(Mutex::new(Bump));
        let result = PersistenceManager::<Tally>::builder()
            .participant(bump.clone())
            .participant(bump)
            .build();
        assert!(matches!(result, Err(PersistenceError::AlreadyRegistered)));
    }

    #[test]
    fn build_subscribes_observers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut manager = PersistenceManager::<Tally>::builder()
            .backend(MemoryBackend::new())
            .observer(move |event| sink.lock().unwrap().push(event))
            .build()
            .unwrap();

        assert_eq!(manager.subscriber_count(), 1);
        manager.new_game().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![LifecycleEvent::Created]);
    }

    #[test]
    fn build_with_factory_requires_factory() {
        let missing = PersistenceManager::<Tally>::builder().build_with_factory();
        assert!(missing.is_none());

        let present = PersistenceManager::<Tally>::builder()
            .factory(Tally::default)
            .build_with_factory();
        assert!(matches!(present, Some(Ok(_))));
    }
}
