use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use crate::protocol::RelayEnvelope;
use crate::rng::PseudoRandom;
use crate::score::ScoreRecord;
use crate::sequence::SequenceEngine;
use crate::tile::{TileId, TilePalette};

/// Delay before the first element of a playback pass, in milliseconds.
pub const PRE_ROLL_MS: u64 = 500;
/// Gap between playback elements, in milliseconds.
pub const GAP_MS: u64 = 100;
/// Hold after the failure animation before returning to idle, in milliseconds.
pub const FAILURE_HOLD_MS: u64 = 500;

pub const FULL_VOLUME: f32 = 1.0;
pub const MUTED: f32 = 0.0;

/// Lifecycle of one client's session. Exactly one instance per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Demonstrating,
    AwaitingPlayerInput,
    RoundFailed,
}

/// Renders tile activations and timed delays. Implementations own all timing:
/// `press` runs the full fixed-duration activation before returning, and
/// `delay` suspends the current logical step. The controller relies on both as
/// strict sequencing points.
#[async_trait]
pub trait TilePresenter: Send {
    async fn press(&mut self, tile: TileId, volume: f32);
    async fn delay(&mut self, ms: u64);
    /// Plays the mistake cue to completion.
    async fn failure_cue(&mut self);
    /// Updates the displayed score; `None` renders the placeholder.
    fn show_score(&mut self, score: Option<u32>);
}

/// Accepts a finished round's record. Never surfaces errors to the session:
/// remote failures fall back to the local cache inside the implementation.
#[async_trait]
pub trait ScoreReconciler: Send {
    async fn submit(&mut self, record: ScoreRecord);
}

/// Outbound half of the relay channel. Fire-and-forget: a closed channel
/// swallows the event and the session degrades to single-player.
#[async_trait]
pub trait EventChannel: Send {
    async fn broadcast(&mut self, envelope: RelayEnvelope);
}

/// Orchestrates the play/mistake/reset lifecycle: drives the sequence engine,
/// validates player input, and invokes the reconciler and relay at the round
/// boundaries.
pub struct SessionController<P, R, E> {
    palette: TilePalette,
    engine: SequenceEngine,
    state: SessionState,
    rng: PseudoRandom,
    player_name: String,
    date_stamp: fn() -> String,
    presenter: P,
    reconciler: R,
    relay: E,
}

impl<P, R, E> SessionController<P, R, E>
where
    P: TilePresenter,
    R: ScoreReconciler,
    E: EventChannel,
{
    pub fn new(
        palette: TilePalette,
        seed: u64,
        player_name: impl Into<String>,
        date_stamp: fn() -> String,
        presenter: P,
        reconciler: R,
        relay: E,
    ) -> Self {
        SessionController {
            palette,
            engine: SequenceEngine::new(),
            state: SessionState::Idle,
            rng: PseudoRandom::new(seed),
            player_name: player_name.into(),
            date_stamp,
            presenter,
            reconciler,
            relay,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn engine(&self) -> &SequenceEngine {
        &self.engine
    }

    pub fn palette(&self) -> &TilePalette {
        &self.palette
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn reconciler(&self) -> &R {
        &self.reconciler
    }

    pub fn relay(&self) -> &E {
        &self.relay
    }

    /// Handles one player-initiated tile activation.
    ///
    /// Idle starts a fresh round; input during Demonstrating is dropped
    /// without queueing; in AwaitingPlayerInput the activation is validated
    /// against the expected sequence element.
    pub async fn press_tile(&mut self, tile: TileId) -> Result<()> {
        match self.state {
            SessionState::Idle => self.start_round().await,
            SessionState::Demonstrating | SessionState::RoundFailed => Ok(()),
            SessionState::AwaitingPlayerInput => self.validate_input(tile).await,
        }
    }

    async fn validate_input(&mut self, tile: TileId) -> Result<()> {
        if self.palette.get(tile).is_none() {
            return Ok(());
        }

        // Feedback for the activated tile, independent of correctness.
        self.presenter.press(tile, FULL_VOLUME).await;

        if self.engine.expected() == Some(tile) {
            if self.engine.advance() {
                // Round complete: grow, update the score, replay.
                self.engine.rewind();
                self.engine.append_random(&mut self.rng, self.palette.len());
                self.presenter.show_score(self.engine.round_score());
                self.play_sequence().await;
            }
            Ok(())
        } else {
            self.fail_round().await
        }
    }

    async fn start_round(&mut self) -> Result<()> {
        debug!("session: starting round for {}", self.player_name);
        self.state = SessionState::Demonstrating;
        self.engine.reset();
        self.presenter.show_score(None);
        self.dance(2).await;
        self.engine.append_random(&mut self.rng, self.palette.len());
        self.presenter.show_score(self.engine.round_score());
        self.play_sequence().await;

        // Let other players know a new game has started.
        self.relay
            .broadcast(RelayEnvelope::session_started(self.player_name.clone()))
            .await;

        self.state = SessionState::AwaitingPlayerInput;
        Ok(())
    }

    async fn fail_round(&mut self) -> Result<()> {
        self.state = SessionState::RoundFailed;

        // A round with an empty sequence has no score and is never recorded.
        if let Some(score) = self.engine.round_score() {
            debug!("session: {} failed at score {}", self.player_name, score);
            let record = ScoreRecord::new(self.player_name.clone(), score, (self.date_stamp)());
            self.reconciler.submit(record.clone()).await;
            let envelope = RelayEnvelope::session_ended(self.player_name.clone(), &record)?;
            self.relay.broadcast(envelope).await;
        }

        self.presenter.failure_cue().await;
        self.dance(1).await;
        self.presenter.delay(FAILURE_HOLD_MS).await;
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Sequential, non-interruptible demonstration of the full sequence.
    async fn play_sequence(&mut self) {
        self.presenter.delay(PRE_ROLL_MS).await;
        for tile in self.engine.sequence().to_vec() {
            self.presenter.press(tile, FULL_VOLUME).await;
            self.presenter.delay(GAP_MS).await;
        }
    }

    /// Flashes every tile in palette order, muted. Two laps at round start,
    /// one on failure.
    async fn dance(&mut self, laps: u32) {
        for _ in 0..laps {
            for id in self.palette.iter().map(|t| t.id).collect::<Vec<_>>() {
                self.presenter.press(id, MUTED).await;
            }
        }
    }
}
