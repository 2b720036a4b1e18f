use async_trait::async_trait;
use common::{RankedScoreList, ScoreRecord, MAX_HIGH_SCORES};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Scores outside this open interval are kept in the store but never ranked.
const MIN_RANKED_SCORE: u32 = 1;
const MAX_RANKED_SCORE: u32 = 999;

#[derive(Debug, Error)]
pub enum ScoreStoreError {
    #[error("score store unavailable: {0}")]
    Unavailable(String),
}

/// Backing store for submitted scores. The HTTP handlers only see this trait;
/// the reference deployment uses the in-memory implementation below.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn add_score(&self, record: ScoreRecord) -> Result<(), ScoreStoreError>;

    /// The authoritative ranked top-10: descending by score, ties ranked by
    /// insertion order, implausible scores filtered out.
    async fn high_scores(&self) -> Result<RankedScoreList, ScoreStoreError>;
}

#[derive(Default)]
pub struct MemoryScoreStore {
    records: RwLock<Vec<ScoreRecord>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreStore for MemoryScoreStore {
    async fn add_score(&self, record: ScoreRecord) -> Result<(), ScoreStoreError> {
        debug!("storing score {} for {}", record.score, record.name);
        self.records.write().await.push(record);
        Ok(())
    }

    async fn high_scores(&self) -> Result<RankedScoreList, ScoreStoreError> {
        let records = self.records.read().await;
        let mut ranked: Vec<ScoreRecord> = records
            .iter()
            .filter(|r| (MIN_RANKED_SCORE..=MAX_RANKED_SCORE).contains(&r.score))
            .cloned()
            .collect();
        // Stable sort keeps earlier submissions ahead on ties.
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(MAX_HIGH_SCORES);
        Ok(RankedScoreList::from_entries(ranked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, score: u32) -> ScoreRecord {
        ScoreRecord::new(name, score, "2026-01-01")
    }

    #[tokio::test]
    async fn high_scores_are_descending_and_capped() {
        let store = MemoryScoreStore::new();
        for score in 1..=15 {
            store.add_score(record("p", score)).await.unwrap();
        }
        let scores = store.high_scores().await.unwrap();
        let values: Vec<u32> = scores.entries().iter().map(|r| r.score).collect();
        assert_eq!(values, vec![15, 14, 13, 12, 11, 10, 9, 8, 7, 6]);
    }

    #[tokio::test]
    async fn implausible_scores_are_filtered() {
        let store = MemoryScoreStore::new();
        store.add_score(record("zero", 0)).await.unwrap();
        store.add_score(record("huge", 1000)).await.unwrap();
        store.add_score(record("ok", 5)).await.unwrap();
        let scores = store.high_scores().await.unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores.entries()[0].name, "ok");
    }

    #[tokio::test]
    async fn ties_preserve_submission_order() {
        let store = MemoryScoreStore::new();
        store.add_score(record("first", 7)).await.unwrap();
        store.add_score(record("second", 7)).await.unwrap();
        let scores = store.high_scores().await.unwrap();
        assert_eq!(scores.entries()[0].name, "first");
        assert_eq!(scores.entries()[1].name, "second");
    }
}
