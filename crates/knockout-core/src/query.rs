//! Read-only snapshot types for external consumers.
//!
//! All types are owned copies with no references into tournament storage,
//! serializable as structured records for any transport. Consumers that
//! used to reach into shared bracket state subscribe to these instead.

use crate::bracket::{Format, MatchStatus, Round, Slot};
use crate::id::{MatchId, ParticipantId};
use crate::participant::Participant;
use crate::tournament::Phase;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Match snapshot
// ---------------------------------------------------------------------------

/// An owned view of one match, with its status pre-derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub id: MatchId,
    pub round: Round,
    pub position: u32,
    pub slots: [Slot; 2],
    pub winner: Option<ParticipantId>,
    pub status: MatchStatus,
}

// ---------------------------------------------------------------------------
// Bracket snapshot
// ---------------------------------------------------------------------------

/// An owned view of the whole tournament: roster, bracket, and outcome.
/// Matches are ordered by round, then position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSnapshot {
    pub format: Format,
    pub bracket_size: u32,
    pub phase: Phase,
    pub champion: Option<ParticipantId>,
    pub participants: Vec<Participant>,
    pub matches: Vec<MatchSnapshot>,
}

impl BracketSnapshot {
    /// Matches belonging to one round, in position order.
    pub fn round(&self, round: Round) -> Vec<&MatchSnapshot> {
        self.matches.iter().filter(|m| m.round == round).collect()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::roster;
    use crate::tournament::Tournament;

    // -----------------------------------------------------------------------
    // Test 1: round_filter
    // -----------------------------------------------------------------------
    #[test]
    fn round_filter() {
        let t = Tournament::new(roster(8), Format::Single).unwrap();
        let snap = t.snapshot();
        assert_eq!(snap.round(Round::Winners(1)).len(), 4);
        assert_eq!(snap.round(Round::Winners(3)).len(), 1);
        assert_eq!(snap.round(Round::GrandFinal).len(), 0);
    }

    // -----------------------------------------------------------------------
    // Test 2: snapshot_serializes_as_json
    // -----------------------------------------------------------------------
    #[test]
    fn snapshot_serializes_as_json() {
        let t = Tournament::new(roster(5), Format::Double).unwrap();
        let snap = t.snapshot();

        let json = serde_json::to_string(&snap).unwrap();
        let back: BracketSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, back);
    }
}
