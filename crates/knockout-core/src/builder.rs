//! Pure construction of the initial match topology for a format and
//! participant count.
//!
//! The builder emits matches only; it holds no state and performs no
//! mutation. Losers-bracket round sizes are derived at construction time by
//! simulating the entrant flow (survivors alternating with winners-bracket
//! drop-ins), never read from a per-size table. [`round_match_counts`] is
//! the single source of that formula; the validator checks against the same
//! function rather than a duplicate.

use crate::bracket::{Format, Match, Round, Slot};
use crate::participant::{Roster, RosterError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Invalid construction input, surfaced to the caller for correction.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("a bracket needs at least 2 participants, got {0}")]
    TooFewParticipants(usize),
    #[error(transparent)]
    Roster(#[from] RosterError),
}

// ---------------------------------------------------------------------------
// Round plan
// ---------------------------------------------------------------------------

/// Match counts per round for a given participant count and format.
///
/// Derived, never tabulated: the winners ladder halves from `B / 2` down to
/// the final; the losers ladder is produced by walking the winners rounds
/// and interleaving consolidation rounds wherever more than one survivor
/// remains.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoundPlan {
    /// Participant count `N`.
    pub entrants: u32,
    /// Bracket size `B`: the next power of two at or above `N`.
    pub bracket_size: u32,
    /// Match count per winners round; index 0 is round 1, last entry is 1.
    pub winners: Vec<u32>,
    /// Match count per losers round; empty for single elimination and for
    /// the two-entrant double bracket, where the winners final loser drops
    /// straight into the grand final.
    pub losers: Vec<u32>,
    /// Whether a grand final (and conditional reset) exists.
    pub has_grand_final: bool,
}

impl RoundPlan {
    /// Number of bye slots in winners round 1.
    pub fn byes(&self) -> u32 {
        self.bracket_size - self.entrants
    }

    /// Match count for a round, if the round exists in this plan.
    pub fn matches_in(&self, round: Round) -> Option<u32> {
        match round {
            Round::Winners(n) => self.winners.get(n.checked_sub(1)? as usize).copied(),
            Round::Losers(n) => self.losers.get(n.checked_sub(1)? as usize).copied(),
            Round::GrandFinal | Round::BracketReset => {
                self.has_grand_final.then_some(1)
            }
        }
    }

    /// Every round in this plan, in bracket order.
    pub fn rounds(&self) -> Vec<Round> {
        let mut out: Vec<Round> = (1..=self.winners.len() as u32).map(Round::Winners).collect();
        out.extend((1..=self.losers.len() as u32).map(Round::Losers));
        if self.has_grand_final {
            out.push(Round::GrandFinal);
            out.push(Round::BracketReset);
        }
        out
    }
}

/// Derive the per-round match counts for `n` participants in `format`.
pub fn round_match_counts(n: u32, format: Format) -> Result<RoundPlan, ConfigurationError> {
    if n < 2 {
        return Err(ConfigurationError::TooFewParticipants(n as usize));
    }
    let b = n.next_power_of_two();
    let winners_rounds = b.trailing_zeros();

    let winners: Vec<u32> = (1..=winners_rounds).map(|r| b >> r).collect();

    let mut losers = Vec::new();
    if format == Format::Double && b >= 4 {
        // Winners round 1 drops B/2 entrants (byes included as walkover
        // slots); they pair among themselves.
        let mut survivors = b / 2;
        losers.push(survivors / 2);
        survivors /= 2;

        // Each later winners round r drops B >> r losers, which always
        // equals the current survivor count; they meet in a drop-in round.
        // A consolidation round follows whenever more than one survivor
        // remains to be thinned before the next drop-in.
        for r in 2..=winners_rounds {
            debug_assert_eq!(survivors, b >> r);
            losers.push(survivors);
            if survivors > 1 {
                losers.push(survivors / 2);
                survivors /= 2;
            }
        }
    }

    Ok(RoundPlan {
        entrants: n,
        bracket_size: b,
        winners,
        losers,
        has_grand_final: format == Format::Double,
    })
}

// ---------------------------------------------------------------------------
// Topology construction
// ---------------------------------------------------------------------------

/// Build the single-elimination topology for a roster.
///
/// Round 1 holds `B / 2` matches laid out from the seeding order: the top
/// `B - N` seeds each pair against a bye at the leading positions, and the
/// remaining participants fill the rest adjacently by seed. Later rounds
/// are empty; slots fill only by advancement or bye auto-resolution.
pub fn build_single(roster: &Roster) -> Result<Vec<Match>, ConfigurationError> {
    let plan = round_match_counts(roster.len() as u32, Format::Single)?;
    Ok(layout(roster, &plan))
}

/// Build the double-elimination topology: the same winners bracket, the
/// recursively derived losers bracket, a grand final, and a reset match
/// that stays empty unless the losers champion forces it.
pub fn build_double(roster: &Roster) -> Result<Vec<Match>, ConfigurationError> {
    let plan = round_match_counts(roster.len() as u32, Format::Double)?;
    Ok(layout(roster, &plan))
}

fn layout(roster: &Roster, plan: &RoundPlan) -> Vec<Match> {
    let byes = plan.byes();
    let order = roster.seeding_order();

    // Entry list of length B: top seeds interleaved with their byes, then
    // the remaining participants adjacently by seed.
    let mut entries: Vec<Slot> = Vec::with_capacity(plan.bracket_size as usize);
    for (i, &p) in order.iter().enumerate() {
        entries.push(Slot::Taken(p));
        if (i as u32) < byes {
            entries.push(Slot::Bye);
        }
    }
    debug_assert_eq!(entries.len() as u32, plan.bracket_size);

    let mut matches = Vec::new();
    for (i, pair) in entries.chunks_exact(2).enumerate() {
        matches.push(Match::with_slots(
            Round::Winners(1),
            i as u32 + 1,
            pair[0],
            pair[1],
        ));
    }
    for (idx, &count) in plan.winners.iter().enumerate().skip(1) {
        let round = Round::Winners(idx as u32 + 1);
        matches.extend((1..=count).map(|p| Match::new(round, p)));
    }
    for (idx, &count) in plan.losers.iter().enumerate() {
        let round = Round::Losers(idx as u32 + 1);
        matches.extend((1..=count).map(|p| Match::new(round, p)));
    }
    if plan.has_grand_final {
        matches.push(Match::new(Round::GrandFinal, 1));
        matches.push(Match::new(Round::BracketReset, 1));
    }
    matches
}

// ===========================================================================
// Tests
// ===========================================================================
