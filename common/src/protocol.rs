use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::score::ScoreRecord;

/// Wire name for the session-start event.
pub const GAME_START_EVENT: &str = "gameStart";
/// Wire name for the session-end event.
pub const GAME_END_EVENT: &str = "gameEnd";

/// One frame on the relay channel, exactly as it travels on the wire:
/// `{"from": "...", "type": "...", "value": {...}}`.
///
/// The relay server forwards these verbatim without decoding; only peers
/// interpret them, and defensively: unknown `type` values decode to `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayEnvelope {
    pub from: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub value: Value,
}

/// A decoded peer event, the only kinds this client understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    SessionStarted { from: String },
    SessionEnded { from: String, record: ScoreRecord },
}

impl RelayEnvelope {
    pub fn session_started(from: impl Into<String>) -> Self {
        RelayEnvelope {
            from: from.into(),
            event_type: GAME_START_EVENT.to_string(),
            value: Value::Object(Default::default()),
        }
    }

    pub fn session_ended(from: impl Into<String>, record: &ScoreRecord) -> anyhow::Result<Self> {
        Ok(RelayEnvelope {
            from: from.into(),
            event_type: GAME_END_EVENT.to_string(),
            value: serde_json::to_value(record)?,
        })
    }

    /// Decodes into a typed event. Unknown kinds and malformed payloads are
    /// discarded (`None`), never treated as errors.
    pub fn decode(&self) -> Option<PeerEvent> {
        match self.event_type.as_str() {
            GAME_START_EVENT => Some(PeerEvent::SessionStarted {
                from: self.from.clone(),
            }),
            GAME_END_EVENT => {
                let record: ScoreRecord = serde_json::from_value(self.value.clone()).ok()?;
                Some(PeerEvent::SessionEnded {
                    from: self.from.clone(),
                    record,
                })
            }
            _ => None,
        }
    }
}

impl PeerEvent {
    /// The one-line notice rendered into the rolling event log.
    pub fn notice(&self) -> String {
        match self {
            PeerEvent::SessionStarted { from } => format!("{} started a new game", from),
            PeerEvent::SessionEnded { from, record } => {
                format!("{} scored {}", from, record.score)
            }
        }
    }
}
