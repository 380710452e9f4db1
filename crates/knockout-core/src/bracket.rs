//! Core bracket data types: formats, rounds, slots, and matches.
//!
//! Rounds are a tagged variant rather than sentinel integers, so losers
//! rounds, the grand final, and the bracket reset order and group naturally
//! without magic numbers. Match status is always derived from slot and
//! winner state, never stored.

use crate::id::ParticipantId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

/// Elimination format. Chosen at tournament creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    /// One loss eliminates.
    Single,
    /// Two losses eliminate; losers drop into a second ladder.
    Double,
}

impl Format {
    /// Losses after which a participant is eliminated.
    pub fn max_losses(self) -> u32 {
        match self {
            Format::Single => 1,
            Format::Double => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Round
// ---------------------------------------------------------------------------

/// A bracket round. Inner numbers are 1-based within their ladder.
///
/// The derived ordering groups winners rounds first, then losers rounds,
/// then the grand final and the reset, each ascending by round number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Round {
    /// Winners-bracket round `n`.
    Winners(u32),
    /// Losers-bracket round `n` (double elimination only).
    Losers(u32),
    /// Winners champion vs losers champion.
    GrandFinal,
    /// Second grand final, played only if the losers champion wins the first.
    BracketReset,
}

impl std::fmt::Display for Round {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Round::Winners(n) => write!(f, "winners round {n}"),
            Round::Losers(n) => write!(f, "losers round {n}"),
            Round::GrandFinal => write!(f, "grand final"),
            Round::BracketReset => write!(f, "bracket reset"),
        }
    }
}

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// One side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    /// Awaiting an advancing participant.
    Empty,
    /// No opponent will ever arrive; the other side advances by walkover.
    Bye,
    /// Occupied.
    Taken(ParticipantId),
}

impl Slot {
    /// The occupying participant, if any.
    pub fn participant(self) -> Option<ParticipantId> {
        match self {
            Slot::Taken(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_bye(self) -> bool {
        matches!(self, Slot::Bye)
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Slot::Empty)
    }
}

// ---------------------------------------------------------------------------
// Match status
// ---------------------------------------------------------------------------

/// Derived match state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    /// Fewer than two sides resolved; waiting on earlier matches.
    Pending,
    /// Two participants present, no winner recorded.
    Ready,
    /// Winner recorded, or resolved as a bye chain.
    Complete,
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// A single match in the bracket.
///
/// Topology (round and position) is fixed at construction; only slot
/// contents and the winner mutate afterwards, exclusively through applied
/// mutation batches. Slot 0 of the grand final holds the winners-side
/// champion, slot 1 the losers-side champion; the reset keeps that layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// The round this match belongs to.
    pub round: Round,
    /// 1-based position, unique within the round.
    pub position: u32,
    /// The two sides.
    pub slots: [Slot; 2],
    /// Recorded winner. `None` until decided; stays `None` for a match
    /// whose slots are both byes.
    pub winner: Option<ParticipantId>,
}

impl Match {
    /// Create a match with both slots empty.
    pub fn new(round: Round, position: u32) -> Self {
        Self::with_slots(round, position, Slot::Empty, Slot::Empty)
    }

    /// Create a match with explicit initial slots.
    pub fn with_slots(round: Round, position: u32, a: Slot, b: Slot) -> Self {
        Self {
            round,
            position,
            slots: [a, b],
            winner: None,
        }
    }

    /// Derived status. A double-bye match counts as complete: no
    /// participant will ever arrive, and its bye propagates onward.
    pub fn status(&self) -> MatchStatus {
        if self.winner.is_some() {
            return MatchStatus::Complete;
        }
        match self.slots {
            [Slot::Taken(_), Slot::Taken(_)] => MatchStatus::Ready,
            [Slot::Bye, Slot::Bye] => MatchStatus::Complete,
            _ => MatchStatus::Pending,
        }
    }

    /// The losing participant, derived from the winner and the slots.
    /// `None` for undecided matches and walkovers.
    pub fn loser(&self) -> Option<ParticipantId> {
        let w = self.winner?;
        self.slots
            .iter()
            .find_map(|s| s.participant().filter(|&p| p != w))
    }

    /// Whether the given participant occupies a slot.
    pub fn contains(&self, p: ParticipantId) -> bool {
        self.slot_of(p).is_some()
    }

    /// Index of the slot the participant occupies.
    pub fn slot_of(&self, p: ParticipantId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.participant() == Some(p))
    }

    /// Whether both slots held real participants when the match completed.
    /// Walkovers and bye chains are not decisive.
    pub fn is_decisive(&self) -> bool {
        self.winner.is_some()
            && matches!(self.slots, [Slot::Taken(_), Slot::Taken(_)])
    }
}

// ===========================================================================
// Tests
// ===========================================================================
