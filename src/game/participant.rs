//! Participants (seats) in a game

use serde::{Deserialize, Serialize};

use crate::core::types::ParticipantId;

/// Who drives a seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    Human,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub kind: ParticipantKind,
    /// Set once the participant owns no cities; never cleared
    #[serde(default)]
    pub eliminated: bool,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>, kind: ParticipantKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            eliminated: false,
        }
    }

    pub fn human(id: ParticipantId, name: impl Into<String>) -> Self {
        Self::new(id, name, ParticipantKind::Human)
    }

    pub fn ai(id: ParticipantId, name: impl Into<String>) -> Self {
        Self::new(id, name, ParticipantKind::Ai)
    }

    pub fn is_ai(&self) -> bool {
        self.kind == ParticipantKind::Ai
    }
}
