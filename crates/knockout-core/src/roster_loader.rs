//! Roster loading from external registration records (JSON).
//!
//! The registration flow lives outside the engine; this loader turns its
//! exported records into a validated [`Roster`]. Gated behind the
//! `data-loader` feature so the core stays dependency-light for embedders
//! that construct rosters programmatically.

use crate::id::ParticipantId;
use crate::participant::{Participant, Roster, RosterError};
use serde::{Deserialize, Serialize};

/// Errors that can occur while loading a roster.
#[derive(Debug, thiserror::Error)]
pub enum RosterLoadError {
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid roster: {0}")]
    Invalid(#[from] RosterError),
}

/// One registration record as exported by the registration flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub seed: Option<u32>,
}

/// Parse a JSON array of registration records into a roster, preserving
/// arrival order.
pub fn roster_from_json(data: &str) -> Result<Roster, RosterLoadError> {
    let records: Vec<RegistrationRecord> = serde_json::from_str(data)?;
    let participants = records
        .into_iter()
        .map(|r| Participant {
            id: ParticipantId(r.id),
            name: r.name,
            seed: r.seed,
        })
        .collect();
    Ok(Roster::new(participants)?)
}

// ===========================================================================
// Tests
// ===========================================================================
