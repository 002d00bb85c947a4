//! JSON save file backend.
//!
//! # File Structure
//!
//! The aggregate is saved to a single file chosen by the caller:
//! ```text
//! {
//!   "savedAt": "2026-02-04T10:15:30.123Z",
//!   "data": { ...aggregate... }
//! }
//! ```
//!
//! # Design Notes
//!
//! - **Atomic writes**: Write to `<file>.tmp`, then rename over the save file
//! - **Absence is not an error**: a missing file loads as `None`
//! - **Corruption is**: a file that exists but does not decode is a JSON error

use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::traits::StorageBackend;

/// On-disk layout of a save file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveFile<T> {
    saved_at: DateTime<Utc>,
    data: T,
}

/// Just the header of a save file, for metadata reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveHeader {
    saved_at: DateTime<Utc>,
}

/// Stores the aggregate as pretty-printed JSON in one file.
pub struct JsonFileBackend<D> {
    path: PathBuf,
    _data: PhantomData<fn() -> D>,
}

impl<D> JsonFileBackend<D> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _data: PhantomData,
        }
    }

    /// The save file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a save file exists.
    ///
    /// Errors when the filesystem cannot answer, e.g. a permission failure.
    pub fn exists(&self) -> Result<bool, BackendError> {
        Ok(self.path.try_exists()?)
    }

    /// Delete the save file.
    ///
    /// `Ok(())` if deleted or didn't exist, `Err` on I/O error.
    pub fn remove(&self) -> Result<(), BackendError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::info!("Removed save file {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// When the save file was last written, or `None` if there is no file.
    pub fn last_saved_at(&self) -> Result<Option<DateTime<Utc>>, BackendError> {
        let Some(contents) = self.read_contents()? else {
            return Ok(None);
        };
        let header: SaveHeader = serde_json::from_str(&contents)?;
        Ok(Some(header.saved_at))
    }

    /// File contents, or `None` only when the file is not there.
    fn read_contents(&self) -> Result<Option<String>, BackendError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        PathBuf::from(temp)
    }
}

impl<D> StorageBackend<D> for JsonFileBackend<D>
where
    D: Serialize + DeserializeOwned,
{
    fn load(&mut self) -> Result<Option<D>, BackendError> {
        let Some(contents) = self.read_contents()? else {
            log::debug!("No save file at {}", self.path.display());
            return Ok(None);
        };

        let file: SaveFile<D> = serde_json::from_str(&contents)?;
        log::info!(
            "Loaded save file {} (saved at {})",
            self.path.display(),
            file.saved_at
        );

        Ok(Some(file.data))
    }

    /// Write the aggregate.
    ///
    /// # Atomic Write Strategy
    ///
    /// 1. Write to `<file>.tmp`
    /// 2. Rename to `<file>`
    ///
    /// An interrupted write leaves the previous save file intact.
    fn save(&mut self, data: &D) -> Result<(), BackendError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let file = SaveFile {
            saved_at: Utc::now(),
            data,
        };
        let json = serde_json::to_string_pretty(&file)?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, json)?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        log::info!("Wrote save file {}", self.path.display());
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
