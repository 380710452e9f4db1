//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so the same
//! helpers serve `#[cfg(test)]` modules, `tests/`, downstream scenario
//! suites, and benches (via the `test-utils` feature).

use crate::bracket::Round;
use crate::id::{MatchId, ParticipantId};
use crate::participant::{Participant, Roster};
use crate::rng::SimRng;
use crate::tournament::{ReportOutcome, Tournament};

// ===========================================================================
// Roster constructors
// ===========================================================================

/// A roster of `n` participants with ids and seeds `1..=n`.
pub fn roster(n: u32) -> Roster {
    Roster::new(
        (1..=n)
            .map(|i| Participant::seeded(ParticipantId(i), format!("Player {i}"), i))
            .collect(),
    )
    .unwrap()
}

/// A roster from display names, unseeded, ids by arrival order.
pub fn named_roster(names: &[&str]) -> Roster {
    Roster::new(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Participant::unseeded(ParticipantId(i as u32 + 1), *name))
            .collect(),
    )
    .unwrap()
}

// ===========================================================================
// Reporting helpers
// ===========================================================================

/// Report a result, panicking on any error. Test shorthand.
pub fn report(t: &mut Tournament, target: MatchId, winner: ParticipantId) -> ReportOutcome {
    t.report_result(target, winner).unwrap()
}

// ===========================================================================
// Simulation driver
// ===========================================================================

/// Play a tournament to completion with random winners and return the
/// champion. Panics if the bracket stalls (ready matches exhausted with no
/// champion) -- that is exactly the class of structural bug this exists to
/// catch.
pub fn simulate_random(t: &mut Tournament, rng: &mut SimRng) -> ParticipantId {
    // Generous bound: every pass decides at least one match.
    let max_passes = t.all_matches().count() + 2;

    for _ in 0..max_passes {
        if let Some(champion) = t.champion() {
            return champion;
        }
        let ready = t.ready_matches();
        assert!(!ready.is_empty(), "bracket stalled with no champion");
        for id in ready {
            if t.champion().is_some() {
                break;
            }
            // Ready matches always hold two participants.
            let m = t.get_match(id).unwrap();
            let winner = m.slots[rng.pick_slot()].participant().unwrap();
            report(t, id, winner);
        }
    }
    t.champion().expect("simulation did not converge")
}

// ===========================================================================
// Counting helpers
// ===========================================================================

/// How many grand-final matches (first final plus reset) were contested.
pub fn grand_finals_played(t: &Tournament) -> usize {
    t.all_matches()
        .filter(|(_, m)| {
            matches!(m.round, Round::GrandFinal | Round::BracketReset) && m.is_decisive()
        })
        .count()
}
