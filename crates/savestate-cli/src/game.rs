//! Demo game state driven by the savestate lifecycle.
//!
//! ```text
//! QuestData
//! ├── player      ← PlayerStats
//! └── inventory   ← Inventory
//! ```

use savestate_core::{GameData, Participant};
use serde::{Deserialize, Serialize};

/// Gold a new player starts with.
pub const STARTING_GOLD: u64 = 50;

/// Upper bound on gold; anything above this is treated as corruption.
pub const MAX_GOLD: u64 = 1_000_000;

/// Inventory capacity.
pub const MAX_ITEMS: usize = 64;

/// Items every new game starts with.
pub const STARTING_ITEMS: [&str; 1] = ["torch"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub name: String,
    pub level: u32,
    pub gold: u64,
}

/// Everything written to the save file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestData {
    #[serde(default)]
    pub player: Option<PlayerRecord>,
    #[serde(default)]
    pub inventory: Vec<String>,
}

impl GameData for QuestData {
    fn is_valid(&self) -> bool {
        let player_ok = self
            .player
            .as_ref()
            .map_or(true, |p| !p.name.trim().is_empty() && p.level > 0 && p.gold <= MAX_GOLD);
        let inventory_ok = self.inventory.len() <= MAX_ITEMS
            && self.inventory.iter().all(|item| !item.trim().is_empty());
        player_ok && inventory_ok
    }
}

/// Owns `QuestData::player`.
pub struct PlayerStats {
    name: String,
    record: Option<PlayerRecord>,
}

impl PlayerStats {
    /// `name` is used when a new game is created.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record: None,
        }
    }

    pub fn record(&self) -> Option<&PlayerRecord> {
        self.record.as_ref()
    }

    /// Add gold to the current player. Returns false if there is no player.
    pub fn add_gold(&mut self, amount: u64) -> bool {
        match self.record.as_mut() {
            Some(record) => {
                record.gold = record.gold.saturating_add(amount);
                true
            }
            None => false,
        }
    }
}

impl Participant<QuestData> for PlayerStats {
    fn create(&mut self, data: &mut QuestData) {
        self.record = Some(PlayerRecord {
            name: self.name.clone(),
            level: 1,
            gold: STARTING_GOLD,
        });
        data.player = self.record.clone();
    }

    fn load(&mut self, data: &QuestData) {
        self.record = data.player.clone();
    }

    fn save(&mut self, data: &mut QuestData) {
        data.player = self.record.clone();
    }

    fn clear(&mut self, _data: &QuestData) {
        self.record = None;
    }
}

/// Owns `QuestData::inventory`.
#[derive(Default)]
pub struct Inventory {
    items: Vec<String>,
}

impl Inventory {
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn add(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }
}

impl Participant<QuestData> for Inventory {
    fn create(&mut self, data: &mut QuestData) {
        self.items = STARTING_ITEMS.iter().map(|item| item.to_string()).collect();
        data.inventory = self.items.clone();
    }

    fn load(&mut self, data: &QuestData) {
        self.items = data.inventory.clone();
    }

    fn save(&mut self, data: &mut QuestData) {
        data.inventory = self.items.clone();
    }

    fn clear(&mut self, _data: &QuestData) {
        self.items.clear();
    }
}
