//! Wiring of the demo game to a save file, one lifecycle action per command.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use savestate_core::{JsonFileBackend, PersistenceError, PersistenceManager};
use thiserror::Error;

use crate::game::{Inventory, PlayerStats, QuestData};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot resolve save path: {0}")]
    Path(String),

    #[error("No player in this save; run `savestate new` first")]
    NoPlayer,
}

fn lock<T>(handle: &Arc<Mutex<T>>) -> MutexGuard<'_, T> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A manager bound to one save file plus handles to its participants.
pub struct Session {
    manager: PersistenceManager<QuestData>,
    player: Arc<Mutex<PlayerStats>>,
    inventory: Arc<Mutex<Inventory>>,
}

impl Session {
    /// Bind to `path`. New games are created for `player_name`.
    pub fn open(path: &Path, player_name: &str) -> Result<Self, CliError> {
        let player = Arc::new(Mutex::new(PlayerStats::new(player_name)));
        let inventory = Arc::new(Mutex::new(Inventory::default()));

        let manager = PersistenceManager::<QuestData>::builder()
            .backend(JsonFileBackend::new(path))
            .participant(player.clone())
            .participant(inventory.clone())
            .observer(|event| log::info!("Lifecycle event: {event}"))
            .build()?;

        log::debug!("Opened session for {}", path.display());
        Ok(Self {
            manager,
            player,
            inventory,
        })
    }

    /// Start over and write the fresh game to disk.
    pub fn new_game(&mut self) -> Result<(), CliError> {
        self.manager.new_game()?;
        self.manager.save_game()?;
        Ok(())
    }

    /// The current save as pretty JSON. A missing save shows a fresh game.
    pub fn show(&mut self) -> Result<String, CliError> {
        self.manager.load_game()?;
        let json = serde_json::to_string_pretty(&self.manager.game_data())?;
        Ok(json)
    }

    /// Load, award gold and items, save.
    pub fn play(&mut self, gold: u64, items: &[String]) -> Result<(), CliError> {
        self.manager.load_game()?;

        if !lock(&self.player).add_gold(gold) {
            return Err(CliError::NoPlayer);
        }
        {
            let mut inventory = lock(&self.inventory);
            for item in items {
                inventory.add(item.clone());
            }
        }

        self.manager.save_game()?;

        let player = lock(&self.player);
        if let Some(record) = player.record() {
            log::info!(
                "{} has {} gold and {} item(s)",
                record.name,
                record.gold,
                lock(&self.inventory).items().len()
            );
        }
        Ok(())
    }

    /// Load, then clear every participant and save the empty game.
    pub fn delete(&mut self) -> Result<(), CliError> {
        self.manager.load_game()?;
        self.manager.delete_game()?;
        Ok(())
    }
}
