//! PersistenceManager - coordinates the save/load lifecycle.
//!
//! # Lifecycle
//!
//! ```text
//!  Uninitialized ──init──▶ NoGame ──new_game / load_game──▶ Active
//!                                                           │  ▲
//!                                                           └──┘
//!                                     save_game / delete_game / new_game / load_game
//! ```
//!
//! Every lifecycle operation checks that a backend is bound before doing
//! anything else. `save_game` and `delete_game` additionally require an
//! active game. Participants are always visited in registration order.
//!
//! # Event Ordering
//!
//! | Operation                 | Calls, in order                                      |
//! |---------------------------|------------------------------------------------------|
//! | `new_game`                | create×N, `Created`                                  |
//! | `load_game` (absent)      | create×N, `Created`, load×N, `Loaded`                |
//! | `load_game` (stored)      | load×N, `Loaded`                                     |
//! | `save_game`               | save×N, backend save, `Saved`                        |
//! | `delete_game`             | clear×N, save×N, backend save, `Saved`, `Reset`      |

use std::sync::{Arc, Mutex};

use crate::builder::PersistenceManagerBuilder;
use crate::error::{Operation, PersistenceError};
use crate::event_bus::{EventBus, LifecycleEvent, SubscriptionId};
use crate::registry::{Registry, SharedParticipant};
use crate::traits::{GameData, Participant, StorageBackend};

/// Boxed storage backend bound by [`PersistenceManager::init`].
pub type BoxedBackend<D> = Box<dyn StorageBackend<D> + Send>;

/// Builds a fresh, default aggregate for `new_game`.
pub type Factory<D> = Box<dyn Fn() -> D + Send>;

/// Where the manager is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No backend bound yet.
    Uninitialized,
    /// Backend bound, no aggregate.
    NoGame,
    /// An aggregate is live.
    Active,
}

/// Owns the live aggregate, the participant registry, the backend binding,
/// and the lifecycle observers.
///
/// Built once by the application and passed to whatever needs persistence.
/// All operations are synchronous; wrap the manager in a `Mutex` to share it
/// across threads so each lifecycle operation runs under a single lock.
pub struct PersistenceManager<D> {
    factory: Factory<D>,
    backend: Option<BoxedBackend<D>>,
    game_data: Option<D>,
    registry: Registry<D>,
    events: EventBus,
}

impl<D: GameData> PersistenceManager<D> {
    /// Create a manager that builds fresh aggregates with `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> D + Send + 'static,
    {
        Self {
            factory: Box::new(factory),
            backend: None,
            game_data: None,
            registry: Registry::new(),
            events: EventBus::new(),
        }
    }

    /// Create a manager with a builder.
    pub fn builder() -> PersistenceManagerBuilder<D> {
        PersistenceManagerBuilder::new()
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    /// Bind the storage backend, replacing any previous one.
    ///
    /// Does not touch the registry or the live aggregate.
    pub fn init<B>(&mut self, backend: B)
    where
        B: StorageBackend<D> + Send + 'static,
    {
        self.init_boxed(Box::new(backend));
    }

    /// Bind an already boxed backend.
    pub fn init_boxed(&mut self, backend: BoxedBackend<D>) {
        if self.backend.is_some() {
            log::info!("Replacing storage backend");
        } else {
            log::info!("Storage backend initialized");
        }
        self.backend = Some(backend);
    }

    /// Append a participant to the fan-out order.
    ///
    /// Registering the same handle twice is rejected so a participant is
    /// never visited twice in one fan-out.
    pub fn register(&mut self, participant: SharedParticipant<D>) -> Result<(), PersistenceError> {
        if !self.registry.register(participant) {
            log::warn!("Rejected duplicate participant registration");
            return Err(PersistenceError::AlreadyRegistered);
        }
        log::debug!("Registered participant #{}", self.registry.len());
        Ok(())
    }

    /// Wrap a participant and register it, returning the shared handle.
    pub fn register_new<P>(&mut self, participant: P) -> Result<Arc<Mutex<P>>, PersistenceError>
    where
        P: Participant<D> + Send + 'static,
    {
        let handle = Arc::new(Mutex::new(participant));
        self.register(handle.clone())?;
        Ok(handle)
    }

    /// Remove a participant by identity. Returns whether it was registered.
    pub fn deregister(&mut self, participant: &SharedParticipant<D>) -> bool {
        self.registry.deregister(participant)
    }

    /// Remove every participant.
    pub fn deregister_all(&mut self) {
        log::debug!("Deregistering {} participant(s)", self.registry.len());
        self.registry.clear();
    }

    /// Add a lifecycle observer. Observers are called in subscription order.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(LifecycleEvent) + Send + 'static,
    {
        self.events.subscribe(observer)
    }

    /// Remove a lifecycle observer. Returns whether it was subscribed.
    pub fn unsubscribe(&mut self, id: &SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn state(&self) -> LifecycleState {
        match (&self.backend, &self.game_data) {
            (None, _) => LifecycleState::Uninitialized,
            (Some(_), None) => LifecycleState::NoGame,
            (Some(_), Some(_)) => LifecycleState::Active,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    pub fn has_game(&self) -> bool {
        self.game_data.is_some()
    }

    /// The live aggregate, if a game is active.
    pub fn game_data(&self) -> Option<&D> {
        self.game_data.as_ref()
    }

    /// Mutable access to the live aggregate, if a game is active.
    pub fn game_data_mut(&mut self) -> Option<&mut D> {
        self.game_data.as_mut()
    }

    pub fn participant_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_registered(&self, participant: &SharedParticipant<D>) -> bool {
        self.registry.contains(participant)
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }

    // ------------------------------------------------------------------------
    // Lifecycle operations
    // ------------------------------------------------------------------------

    /// Build a fresh aggregate and let every participant populate it.
    ///
    /// No validation is applied to the result.
    pub fn new_game(&mut self) -> Result<(), PersistenceError> {
        self.require_backend(Operation::NewGame)?;

        self.game_data = Some(self.build_fresh());

        log::info!("New game created");
        self.events.emit(LifecycleEvent::Created);
        Ok(())
    }

    /// Replace the aggregate with the persisted one and hand it to every
    /// participant.
    ///
    /// When the backend has nothing stored, a new game is created first
    /// (emitting `Created`) and then loaded as usual. Stored data that fails
    /// validation is rejected before any participant sees it, and the
    /// previous aggregate is kept.
    pub fn load_game(&mut self) -> Result<(), PersistenceError> {
        let stored = self.require_backend(Operation::LoadGame)?.load()?;

        let created = stored.is_none();
        let data = match stored {
            Some(data) => {
                if !data.is_valid() {
                    log::warn!("Stored game data failed validation");
                    return Err(PersistenceError::CorruptedData {
                        operation: Operation::LoadGame,
                    });
                }
                data
            }
            None => {
                log::info!("No saved game found, starting a new game");
                self.build_fresh()
            }
        };

        let data = self.game_data.insert(data);
        if created {
            log::info!("New game created");
            self.events.emit(LifecycleEvent::Created);
        }

        log::debug!(
            "Loading game data into {} participant(s)",
            self.registry.len()
        );
        self.registry.for_each(|p| p.load(data));

        log::info!("Game loaded");
        self.events.emit(LifecycleEvent::Loaded);
        Ok(())
    }

    /// Collect every participant's fragment into the aggregate, validate it,
    /// and write it to the backend.
    ///
    /// Nothing reaches the backend if validation fails.
    pub fn save_game(&mut self) -> Result<(), PersistenceError> {
        self.save_with(Operation::SaveGame)
    }

    /// Clear every participant, then save the cleared aggregate.
    ///
    /// Emits `Saved` (from the save) followed by `Reset`.
    pub fn delete_game(&mut self) -> Result<(), PersistenceError> {
        self.require_backend(Operation::DeleteGame)?;
        let Some(data) = self.game_data.as_ref() else {
            log::warn!("Cannot delete game: no active game");
            return Err(PersistenceError::NoActiveGame);
        };

        log::debug!(
            "Clearing game data in {} participant(s)",
            self.registry.len()
        );
        self.registry.for_each(|p| p.clear(data));
        self.save_with(Operation::DeleteGame)?;

        log::info!("Game reset");
        self.events.emit(LifecycleEvent::Reset);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn require_backend(
        &mut self,
        operation: Operation,
    ) -> Result<&mut BoxedBackend<D>, PersistenceError> {
        match self.backend.as_mut() {
            Some(backend) => Ok(backend),
            None => {
                log::warn!("Cannot {operation}: storage backend not initialized");
                Err(PersistenceError::Uninitialized)
            }
        }
    }

    /// Factory call plus create fan-out. Does not touch the active aggregate.
    fn build_fresh(&self) -> D {
        let mut data = (self.factory)();
        log::debug!(
            "Creating game data across {} participant(s)",
            self.registry.len()
        );
        self.registry.for_each(|p| p.create(&mut data));
        data
    }

    /// Save fan-out, validation, and backend write. `operation` names the
    /// public call for error reporting.
    fn save_with(&mut self, operation: Operation) -> Result<(), PersistenceError> {
        let Self {
            backend,
            game_data,
            registry,
            events,
            ..
        } = self;

        let Some(backend) = backend.as_mut() else {
            log::warn!("Cannot {operation}: storage backend not initialized");
            return Err(PersistenceError::Uninitialized);
        };
        let Some(data) = game_data.as_mut() else {
            log::warn!("Cannot {operation}: no active game");
            return Err(PersistenceError::NoActiveGame);
        };

        log::debug!("Saving game data from {} participant(s)", registry.len());
        registry.for_each(|p| p.save(data));

        if !data.is_valid() {
            log::warn!("Game data failed validation, not saving");
            return Err(PersistenceError::CorruptedData { operation });
        }

        backend.save(data)?;

        log::info!("Game saved");
        events.emit(LifecycleEvent::Saved);
        Ok(())
    }
}

impl<D: GameData + Default> PersistenceManager<D> {
    /// Create a manager whose fresh aggregates are `D::default()`.
    pub fn with_default() -> Self {
        Self::new(D::default)
    }
}

// ============================================================================
// TESTS
// ============================================================================
