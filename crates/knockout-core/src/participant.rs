//! Participants and the ordered tournament roster.
//!
//! A [`Roster`] is built once from the external registration flow and is
//! immutable for the life of the bracket. It validates id and seed
//! uniqueness up front and yields participants in seeding order: explicit
//! seeds ascending (1 = strongest), then unseeded entries in arrival order.

use crate::id::ParticipantId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// A tournament entrant. Created at registration, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique id within the tournament.
    pub id: ParticipantId,
    /// Display name.
    pub name: String,
    /// Pre-tournament rank, 1 = strongest. `None` means unseeded;
    /// unseeded participants rank below all seeded ones, in arrival order.
    pub seed: Option<u32>,
}

impl Participant {
    /// Create a participant with an explicit seed.
    pub fn seeded(id: ParticipantId, name: impl Into<String>, seed: u32) -> Self {
        Self {
            id,
            name: name.into(),
            seed: Some(seed),
        }
    }

    /// Create an unseeded participant.
    pub fn unseeded(id: ParticipantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Roster errors
// ---------------------------------------------------------------------------

/// Invalid roster input, surfaced to the caller for correction.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("duplicate participant id: {0:?}")]
    DuplicateId(ParticipantId),
    #[error("duplicate seed {seed} for {a:?} and {b:?}")]
    DuplicateSeed {
        seed: u32,
        a: ParticipantId,
        b: ParticipantId,
    },
    #[error("seed 0 for {0:?}; seeds are 1-based")]
    ZeroSeed(ParticipantId),
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// The ordered participant list for one tournament.
///
/// Stored in arrival order; [`Roster::seeding_order`] returns the order the
/// builder pairs by. Frozen once built: the bracket references participants
/// by id only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    /// Build a roster, validating id and seed uniqueness.
    pub fn new(participants: Vec<Participant>) -> Result<Self, RosterError> {
        for (i, p) in participants.iter().enumerate() {
            if p.seed == Some(0) {
                return Err(RosterError::ZeroSeed(p.id));
            }
            for q in &participants[..i] {
                if q.id == p.id {
                    return Err(RosterError::DuplicateId(p.id));
                }
                if let (Some(s), Some(t)) = (q.seed, p.seed)
                    && s == t
                {
                    return Err(RosterError::DuplicateSeed {
                        seed: s,
                        a: q.id,
                        b: p.id,
                    });
                }
            }
        }
        Ok(Self { participants })
    }

    /// Number of participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Participants in arrival order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Look up a participant by id.
    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Whether the roster contains the given id.
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.get(id).is_some()
    }

    /// Ids in seeding order: explicit seeds ascending, then unseeded
    /// participants in arrival order.
    pub fn seeding_order(&self) -> Vec<ParticipantId> {
        let mut seeded: Vec<&Participant> = self
            .participants
            .iter()
            .filter(|p| p.seed.is_some())
            .collect();
        seeded.sort_by_key(|p| p.seed);

        let unseeded = self.participants.iter().filter(|p| p.seed.is_none());

        seeded
            .into_iter()
            .chain(unseeded)
            .map(|p| p.id)
            .collect()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
