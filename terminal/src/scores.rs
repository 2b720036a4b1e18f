use async_trait::async_trait;
use common::{RankedScoreList, ScoreRecord, ScoreReconciler};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::storage::LocalStore;

/// Date stamp attached to new score records.
pub fn utc_date_stamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Two-tier score path: the remote store is authoritative when reachable, the
/// local cache is the fallback. Policy: overwrite-on-remote-success,
/// merge-on-remote-failure. Cloneable so the leaderboard view can share it
/// with the session controller.
#[derive(Debug, Clone)]
pub struct ScoreApi {
    http: Client,
    base_url: Url,
    store: LocalStore,
}

impl ScoreApi {
    pub fn new(base_url: Url, store: LocalStore) -> Self {
        ScoreApi {
            http: Client::new(),
            base_url,
            store,
        }
    }

    async fn submit_remote(&self, record: &ScoreRecord) -> anyhow::Result<RankedScoreList> {
        let url = self.base_url.join("/api/score")?;
        let scores = self
            .http
            .post(url)
            .json(record)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(scores)
    }

    /// The leaderboard: fetched from the remote and cached, or the last-cached
    /// list when the remote is unreachable. Never an error to the player.
    pub async fn leaderboard(&self) -> RankedScoreList {
        let fetched: anyhow::Result<RankedScoreList> = async {
            let url = self.base_url.join("/api/scores")?;
            Ok(self
                .http
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?)
        }
        .await;

        match fetched {
            Ok(scores) => {
                if let Err(e) = self.store.save_high_scores(&scores) {
                    debug!("failed to cache high scores: {}", e);
                }
                scores
            }
            Err(e) => {
                debug!("leaderboard fetch failed, using cache: {}", e);
                self.store.high_scores()
            }
        }
    }
}

#[async_trait]
impl ScoreReconciler for ScoreApi {
    async fn submit(&mut self, record: ScoreRecord) {
        match self.submit_remote(&record).await {
            Ok(scores) => {
                // Trust the remote: its ranked list replaces the cache.
                if let Err(e) = self.store.save_high_scores(&scores) {
                    debug!("failed to cache high scores: {}", e);
                }
            }
            Err(e) => {
                // Track the score locally until the backend comes back.
                debug!("score submission failed, merging locally: {}", e);
                if let Err(e) = self.store.merge_score(record) {
                    debug!("local score merge failed: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_store(name: &str) -> LocalStore {
        let mut path = std::env::temp_dir();
        path.push(format!("echotiles_api_test_{}_{}.json", name, std::process::id()));
        let _ = fs::remove_file(&path);
        LocalStore::new(path)
    }

    fn unreachable_api(store: LocalStore) -> ScoreApi {
        // Port 1 refuses connections immediately.
        ScoreApi::new(Url::parse("http://127.0.0.1:1").unwrap(), store)
    }

    #[tokio::test]
    async fn failed_submission_merges_into_the_cache() {
        let store = temp_store("submit");
        store
            .save_high_scores(&RankedScoreList::from_entries(vec![
                ScoreRecord::new("a", 10, "d"),
                ScoreRecord::new("b", 8, "d"),
                ScoreRecord::new("c", 5, "d"),
            ]))
            .unwrap();

        let mut api = unreachable_api(store.clone());
        api.submit(ScoreRecord::new("me", 7, "d")).await;

        let scores: Vec<u32> = store
            .high_scores()
            .entries()
            .iter()
            .map(|r| r.score)
            .collect();
        assert_eq!(scores, vec![10, 8, 7, 5]);
    }

    #[tokio::test]
    async fn failed_submission_into_full_cache_is_discarded() {
        let store = temp_store("full");
        let full = RankedScoreList::from_entries(
            (0..10)
                .map(|i| ScoreRecord::new("p", 20 - i, "d"))
                .collect(),
        );
        store.save_high_scores(&full).unwrap();

        let mut api = unreachable_api(store.clone());
        api.submit(ScoreRecord::new("me", 3, "d")).await;

        assert_eq!(store.high_scores(), full);
    }

    #[tokio::test]
    async fn leaderboard_falls_back_to_the_cache() {
        let store = temp_store("leaderboard");
        let cached =
            RankedScoreList::from_entries(vec![ScoreRecord::new("cached", 9, "d")]);
        store.save_high_scores(&cached).unwrap();

        let api = unreachable_api(store);
        assert_eq!(api.leaderboard().await, cached);
    }
}
