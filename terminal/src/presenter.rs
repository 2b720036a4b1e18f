use async_trait::async_trait;
use common::{TileId, TilePresenter, MUTED};
use tokio::time::{sleep, Duration};

use crate::ui::{lock_ui, SharedUi};

/// Fixed activation duration, standing in for the reference sound length.
pub const PRESS_MS: u64 = 300;
/// Duration of the mistake cue.
pub const FAILURE_CUE_MS: u64 = 400;

/// Renders tile activations into the shared UI state, holding each one for
/// its fixed duration. All session timing flows through here.
pub struct TerminalPresenter {
    ui: SharedUi,
}

impl TerminalPresenter {
    pub fn new(ui: SharedUi) -> Self {
        TerminalPresenter { ui }
    }
}

#[async_trait]
impl TilePresenter for TerminalPresenter {
    async fn press(&mut self, tile: TileId, volume: f32) {
        lock_ui(&self.ui).active_tile = Some((tile, volume <= MUTED));
        sleep(Duration::from_millis(PRESS_MS)).await;
        lock_ui(&self.ui).active_tile = None;
    }

    async fn delay(&mut self, ms: u64) {
        sleep(Duration::from_millis(ms)).await;
    }

    async fn failure_cue(&mut self) {
        lock_ui(&self.ui).failure_flash = true;
        sleep(Duration::from_millis(FAILURE_CUE_MS)).await;
        lock_ui(&self.ui).failure_flash = false;
    }

    fn show_score(&mut self, score: Option<u32>) {
        lock_ui(&self.ui).set_score(score);
    }
}
