//! # savestate-core
//!
//! Save/load lifecycle for application state split across many
//! independent participants, with storage delegated to a pluggable backend.
//!
//! ## Key Concepts
//!
//! - **GameData**: the single aggregate holding all persistable state
//! - **Participant**: an object owning one fragment of the aggregate
//! - **StorageBackend**: reads and writes the aggregate (JSON file, memory, ...)
//! - **PersistenceManager**: fans lifecycle operations out to participants in
//!   registration order, validates the aggregate, and notifies observers
//!
//! ## Usage
//!
//! ```rust
//! use savestate_core::{GameData, MemoryBackend, Participant, PersistenceManager};
//!
//! #[derive(Clone, Default)]
//! struct World {
//!     gold: u32,
//! }
//!
//! impl GameData for World {
//!     fn is_valid(&self) -> bool {
//!         self.gold <= 1_000_000
//!     }
//! }
//!
//! struct Wallet {
//!     gold: u32,
//! }
//!
//! impl Participant<World> for Wallet {
//!     fn create(&mut self, world: &mut World) {
//!         world.gold = 100;
//!     }
//!     fn load(&mut self, world: &World) {
//!         self.gold = world.gold;
//!     }
//!     fn save(&mut self, world: &mut World) {
//!         world.gold = self.gold;
//!     }
//!     fn clear(&mut self, _world: &World) {
//!         self.gold = 0;
//!     }
//! }
//!
//! let mut manager = PersistenceManager::<World>::with_default();
//! manager.init(MemoryBackend::new());
//! let wallet = manager.register_new(Wallet { gold: 0 })?;
//!
//! manager.load_game()?;
//! assert_eq!(wallet.lock().unwrap().gold, 100);
//!
//! wallet.lock().unwrap().gold += 5;
//! manager.save_game()?;
//! assert_eq!(manager.game_data().map(|w| w.gold), Some(105));
//! # Ok::<(), savestate_core::PersistenceError>(())
//! ```

pub mod backend;
pub mod builder;
pub mod error;
pub mod event_bus;
pub mod manager;
pub mod paths;
pub mod registry;
pub mod traits;

// Re-export commonly used types
pub use backend::{JsonFileBackend, MemoryBackend};
pub use builder::PersistenceManagerBuilder;
pub use error::{BackendError, Operation, PersistenceError};
pub use event_bus::{EventBus, LifecycleEvent, SubscriptionId};
pub use manager::{LifecycleState, PersistenceManager};
pub use registry::SharedParticipant;
pub use traits::{GameData, Participant, StorageBackend};
