use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use common::{RankedScoreList, ScoreRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Everything persisted across launches: the last-used display name and the
/// last-known high-score list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CachedData {
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub high_scores: RankedScoreList,
}

/// JSON-file key-value store standing in for the browser's local storage.
/// Reads tolerate a missing or corrupt file (fresh defaults).
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: PathBuf) -> Self {
        LocalStore { path }
    }

    pub fn load(&self) -> CachedData {
        match fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                debug!("ignoring corrupt cache file {:?}: {}", self.path, e);
                CachedData::default()
            }),
            Err(_) => CachedData::default(),
        }
    }

    pub fn save(&self, data: &CachedData) -> Result<()> {
        let text = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write cache file {:?}", self.path))
    }

    pub fn player_name(&self) -> Option<String> {
        self.load().player_name
    }

    pub fn save_player_name(&self, name: &str) -> Result<()> {
        let mut data = self.load();
        data.player_name = Some(name.to_string());
        self.save(&data)
    }

    pub fn high_scores(&self) -> RankedScoreList {
        self.load().high_scores
    }

    /// Overwrites the cached list with the remote's authoritative copy.
    pub fn save_high_scores(&self, scores: &RankedScoreList) -> Result<()> {
        let mut data = self.load();
        data.high_scores = scores.clone();
        self.save(&data)
    }

    /// Local fallback merge: ranked insert into the cached list, capped at 10.
    pub fn merge_score(&self, record: ScoreRecord) -> Result<RankedScoreList> {
        let mut data = self.load();
        data.high_scores.insert_ranked(record);
        self.save(&data)?;
        Ok(data.high_scores)
    }
}
