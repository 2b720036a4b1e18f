use serde::{Deserialize, Serialize};

/// Maximum number of entries kept on a leaderboard, remote or cached.
pub const MAX_HIGH_SCORES: usize = 10;

/// One recorded round result. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub score: u32,
    pub date: String,
}

impl ScoreRecord {
    pub fn new(name: impl Into<String>, score: u32, date: impl Into<String>) -> Self {
        ScoreRecord {
            name: name.into(),
            score,
            date: date.into(),
        }
    }
}

/// Bounded leaderboard, descending by score. Ties rank the earlier insertion
/// higher. Serializes as a bare JSON array so it matches the remote body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedScoreList {
    entries: Vec<ScoreRecord>,
}

impl RankedScoreList {
    pub fn new() -> Self {
        RankedScoreList {
            entries: Vec::new(),
        }
    }

    pub fn from_entries(entries: Vec<ScoreRecord>) -> Self {
        RankedScoreList { entries }
    }

    pub fn entries(&self) -> &[ScoreRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts a record at its rank: immediately before the first existing
    /// entry it strictly outscores, else appended. Trailing entries beyond the
    /// capacity are discarded.
    pub fn insert_ranked(&mut self, record: ScoreRecord) {
        let position = self
            .entries
            .iter()
            .position(|prev| record.score > prev.score);
        match position {
            Some(i) => self.entries.insert(i, record),
            None => self.entries.push(record),
        }
        self.entries.truncate(MAX_HIGH_SCORES);
    }
}
