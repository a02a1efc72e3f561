//! Persistence over an injected string key/value store.
//!
//! [`BlobStore`] is the platform seam (browser local storage, a file, a
//! map in tests). [`Persistence`] layers typed records on top of it and never
//! lets a storage failure interrupt play: failed writes and unreadable
//! records are logged and the in-memory state stays authoritative.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;
use thiserror::Error;

use crate::constants::{
    STORAGE_DAILY_TASKS, STORAGE_GAME_STATE, STORAGE_LAST_SEEN_VERSION, STORAGE_PLAYER_STATS,
    STORAGE_SLAYER_MASTERS,
};
use crate::daily::DailyChallengeState;
use crate::slayer::SlayerRoster;
use crate::state::{PlayerStats, ProgressionState};

/// Trait for abstracting blob storage.
/// Platform-specific implementations should provide this.
pub trait BlobStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Remove `key` if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the removal.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl BlobStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend failed for `{key}`: {message}")]
    Backend { key: &'static str, message: String },
    #[error("record `{key}` is not valid JSON: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("saved state is inconsistent: {0}")]
    Inconsistent(&'static str),
}

/// One entry of the saved-stats directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlayer {
    /// Lower-cased player name.
    pub player_name: String,
    pub stats: PlayerStats,
    /// Unix milliseconds of the snapshot.
    pub timestamp: i64,
}

/// Typed records over a [`BlobStore`].
#[derive(Debug, Clone)]
pub struct Persistence<S: BlobStore> {
    store: S,
}

impl<S: BlobStore> Persistence<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    fn read<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, StorageError> {
        let raw = self.store.get(key).map_err(|err| StorageError::Backend {
            key,
            message: err.to_string(),
        })?;
        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(|source| StorageError::Corrupt { key, source })
    }

    fn write<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.store
            .set(key, &json)
            .map_err(|err| StorageError::Backend {
                key,
                message: err.to_string(),
            })
    }

    fn load_or_log<T: DeserializeOwned>(&self, key: &'static str) -> Option<T> {
        self.read(key).unwrap_or_else(|err| {
            log::error!("{err}; ignoring stored record");
            None
        })
    }

    fn save_or_log<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) {
        if let Err(err) = self.write(key, value) {
            log::error!("{err}; keeping in-memory state");
        }
    }

    /// Saved run, or `None` when it is missing, unreadable or inconsistent.
    #[must_use]
    pub fn load_progress(&self) -> Option<ProgressionState> {
        self.try_load_progress().unwrap_or_else(|err| {
            log::error!("{err}; ignoring stored record");
            None
        })
    }

    /// Strict variant of [`Self::load_progress`] that reports failures.
    ///
    /// # Errors
    ///
    /// Returns `Backend` if the store cannot be read, `Corrupt` if the
    /// record does not parse and `Inconsistent` if its tile sets contradict
    /// each other.
    pub fn try_load_progress(&self) -> Result<Option<ProgressionState>, StorageError> {
        let state: Option<ProgressionState> = self.read(STORAGE_GAME_STATE)?;
        if let Some(state) = &state {
            check_consistent(state)?;
        }
        Ok(state)
    }

    pub fn save_progress(&self, state: &ProgressionState) {
        self.save_or_log(STORAGE_GAME_STATE, state);
    }

    #[must_use]
    pub fn load_slayer(&self) -> Option<SlayerRoster> {
        self.load_or_log(STORAGE_SLAYER_MASTERS)
    }

    pub fn save_slayer(&self, roster: &SlayerRoster) {
        self.save_or_log(STORAGE_SLAYER_MASTERS, roster);
    }

    #[must_use]
    pub fn load_daily(&self) -> Option<DailyChallengeState> {
        self.load_or_log(STORAGE_DAILY_TASKS)
    }

    pub fn save_daily(&self, daily: &DailyChallengeState) {
        self.save_or_log(STORAGE_DAILY_TASKS, daily);
    }

    /// True when a saved run exists for `player_name` (case-insensitive).
    #[must_use]
    pub fn has_existing_game(&self, player_name: &str) -> bool {
        self.load_progress()
            .is_some_and(|state| state.belongs_to(player_name))
    }

    #[must_use]
    pub fn last_seen_version(&self) -> Option<String> {
        self.load_or_log(STORAGE_LAST_SEEN_VERSION)
    }

    /// True when `current` differs from the last version the player saw.
    #[must_use]
    pub fn should_show_changelog(&self, current: &str) -> bool {
        self.last_seen_version()
            .is_none_or(|seen| seen != current)
    }

    pub fn mark_version_seen(&self, current: &str) {
        self.save_or_log(STORAGE_LAST_SEEN_VERSION, current);
    }

    #[must_use]
    pub fn saved_players(&self) -> Vec<SavedPlayer> {
        self.load_or_log(STORAGE_PLAYER_STATS).unwrap_or_default()
    }

    /// Last stats snapshot recorded for `player_name`.
    #[must_use]
    pub fn saved_stats(&self, player_name: &str) -> Option<SavedPlayer> {
        let wanted = player_name.trim().to_lowercase();
        self.saved_players()
            .into_iter()
            .find(|saved| saved.player_name == wanted)
    }

    /// Insert or replace the snapshot for `player_name`.
    pub fn remember_stats(&self, player_name: &str, stats: &PlayerStats, timestamp: i64) {
        let entry = SavedPlayer {
            player_name: player_name.trim().to_lowercase(),
            stats: *stats,
            timestamp,
        };
        let mut players = self.saved_players();
        match players
            .iter_mut()
            .find(|saved| saved.player_name == entry.player_name)
        {
            Some(existing) => *existing = entry,
            None => players.push(entry),
        }
        self.save_or_log(STORAGE_PLAYER_STATS, &players);
    }

    /// Drop the run, roster and daily flags. Saved stats and the version
    /// marker survive a reset.
    pub fn reset(&self) {
        for key in [STORAGE_GAME_STATE, STORAGE_SLAYER_MASTERS, STORAGE_DAILY_TASKS] {
            if let Err(err) = self.store.remove(key) {
                log::error!("failed to remove `{key}`: {err}");
            }
        }
    }
}

/// Pretty-printed JSON export of a run.
///
/// # Errors
///
/// Returns an error if the state cannot be encoded.
pub fn export_progress(state: &ProgressionState) -> Result<String, StorageError> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Parse an exported run, rejecting payloads whose tile sets contradict each
/// other.
///
/// # Errors
///
/// Returns `Corrupt` for malformed JSON and `Inconsistent` when completed
/// tiles are not all unlocked or the origin is not visible.
pub fn import_progress(json: &str) -> Result<ProgressionState, StorageError> {
    let state: ProgressionState =
        serde_json::from_str(json).map_err(|source| StorageError::Corrupt {
            key: STORAGE_GAME_STATE,
            source,
        })?;
    check_consistent(&state)?;
    Ok(state)
}

fn check_consistent(state: &ProgressionState) -> Result<(), StorageError> {
    if !state.completed_tiles.is_subset(&state.unlocked_tiles) {
        return Err(StorageError::Inconsistent(
            "completed tiles must all be unlocked",
        ));
    }
    if !state.visible_tiles.contains(crate::position::Position::ORIGIN) {
        return Err(StorageError::Inconsistent("origin tile must be visible"));
    }
    Ok(())
}
