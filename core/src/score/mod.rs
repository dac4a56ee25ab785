use chrono::prelude::*;
use core::cmp::Reverse;
use serde::{Deserialize, Serialize};

use crate::*;
pub use backend::*;

mod backend;

/// A finished run in a difficulty's score list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// 0 for entries stored without one
    #[serde(default)]
    id: u64,
    #[serde(rename = "name")]
    player_name: String,
    score: u32,
    timestamp: DateTime<Utc>,
}

impl ScoreEntry {
    /// New entry timestamped now
    pub fn new(id: u64, player_name: impl Into<String>, score: u32) -> Self {
        Self::with_timestamp(id, player_name, score, Utc::now())
    }

    pub fn with_timestamp(
        id: u64,
        player_name: impl Into<String>,
        score: u32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            player_name: player_name.into(),
            score,
            timestamp,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Append-only score lists, one per difficulty.
///
/// Storage failures never reach the caller. Unreadable lists count as empty when loading, and a score that cannot
/// be appended safely is logged and dropped. Stored entries are never lost: a list that fails to read is left alone,
/// and a corrupt one is copied aside before being replaced.
#[derive(Clone, Debug, Default)]
pub struct ScoreStore<B> {
    backend: B,
}

impl<B: ScoreBackend> ScoreStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Entries in insertion order
    pub fn load_scores(&self, difficulty: Difficulty) -> Vec<ScoreEntry> {
        let key = difficulty.scores_key();
        let document = match self.backend.read(&key) {
            Ok(Some(document)) => document,
            Ok(None) => return Vec::new(),
            Err(err) => {
                log::warn!("Could not read {}, treating as empty: {}", key, err);
                return Vec::new();
            }
        };
        serde_json::from_str(&document).unwrap_or_else(|err| {
            log::warn!("Discarding corrupt score list {}: {}", key, err);
            Vec::new()
        })
    }

    pub fn record_score(&mut self, difficulty: Difficulty, entry: ScoreEntry) {
        let key = difficulty.scores_key();
        let mut entries: Vec<ScoreEntry> = match self.backend.read(&key) {
            Ok(None) => Vec::new(),
            Ok(Some(document)) => match serde_json::from_str(&document) {
                Ok(entries) => entries,
                Err(err) => {
                    let backup_key = Self::corrupt_key(&key);
                    log::warn!(
                        "Replacing corrupt score list {}, keeping it as {}: {}",
                        key,
                        backup_key,
                        err
                    );
                    if let Err(err) = self.backend.write(&backup_key, &document) {
                        log::error!(
                            "Could not back up {}, score {} dropped: {}",
                            key,
                            entry.score,
                            err
                        );
                        return;
                    }
                    Vec::new()
                }
            },
            Err(err) => {
                log::error!(
                    "Could not read {}, score {} dropped: {}",
                    key,
                    entry.score,
                    err
                );
                return;
            }
        };
        log::debug!(
            "Recording score {} for {:?} on {}",
            entry.score,
            entry.player_name,
            difficulty
        );
        entries.push(entry);

        if let Err(err) = self.write_json(&key, &entries) {
            log::error!("Could not save {} scores: {}", difficulty, err);
            return;
        }
        let high_score = Self::max_score(&entries);
        if let Err(err) = self.write_json(&difficulty.high_score_key(), &high_score) {
            log::warn!("Could not cache {} high score: {}", difficulty, err);
        }
    }

    /// Best score of a difficulty, always recomputed from the stored entries
    pub fn high_score(&self, difficulty: Difficulty) -> u32 {
        Self::max_score(&self.load_scores(difficulty))
    }

    /// The derived value written next to the list, not to be trusted over [`ScoreStore::high_score`]
    pub fn cached_high_score(&self, difficulty: Difficulty) -> Option<u32> {
        let document = self.backend.read(&difficulty.high_score_key()).ok()??;
        serde_json::from_str(&document).ok()
    }

    /// Entries by descending score, ties keep insertion order
    pub fn ranked_scores(&self, difficulty: Difficulty) -> Vec<ScoreEntry> {
        let mut entries = self.load_scores(difficulty);
        entries.sort_by_key(|entry| Reverse(entry.score));
        entries
    }

    pub fn is_high_score(&self, difficulty: Difficulty, score: u32) -> bool {
        score > self.high_score(difficulty)
    }

    /// Where a list that failed to parse is kept before being replaced
    fn corrupt_key(key: &str) -> String {
        format!("{}_corrupt", key)
    }

    fn max_score(entries: &[ScoreEntry]) -> u32 {
        entries.iter().map(ScoreEntry::score).max().unwrap_or(0)
    }

    fn write_json<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
    ) -> core::result::Result<(), StoreError> {
        let document = serde_json::to_string(value)?;
        self.backend.write(key, &document)
    }
}
