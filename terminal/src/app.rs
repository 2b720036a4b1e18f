use common::TileId;
use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;
use tracing::debug;

use crate::scores::ScoreApi;
use crate::ui::{lock_ui, SharedUi, UiState, View};

#[derive(Debug)]
pub enum AppCommand {
    Quit,
}

/// Key handling and view switching. Game logic lives in the session task;
/// the app only feeds it tile activations through a channel.
pub struct App {
    pub ui: SharedUi,
    input_tx: mpsc::Sender<TileId>,
    score_api: ScoreApi,
}

impl App {
    pub fn new(ui: SharedUi, input_tx: mpsc::Sender<TileId>, score_api: ScoreApi) -> Self {
        App {
            ui,
            input_tx,
            score_api,
        }
    }

    pub fn ui_snapshot(&self) -> UiState {
        lock_ui(&self.ui).clone()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<AppCommand> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(AppCommand::Quit),
            KeyCode::Char('l') => self.toggle_leaderboard(),
            KeyCode::Char(c @ '1'..='4') => {
                let tile = TileId(c as u8 - b'1');
                // A full channel means the session is mid-playback; the input
                // is dropped, not queued.
                if self.input_tx.try_send(tile).is_err() {
                    debug!("dropping tile input during playback");
                }
            }
            _ => {}
        }
        None
    }

    fn toggle_leaderboard(&mut self) {
        let show = {
            let mut ui = lock_ui(&self.ui);
            ui.view = match ui.view {
                View::Play => View::Leaderboard,
                View::Leaderboard => View::Play,
            };
            ui.view == View::Leaderboard
        };
        if show {
            self.refresh_leaderboard();
        }
    }

    fn refresh_leaderboard(&self) {
        let api = self.score_api.clone();
        let ui = self.ui.clone();
        tokio::spawn(async move {
            let scores = api.leaderboard().await;
            lock_ui(&ui).leaderboard = scores;
        });
    }
}
