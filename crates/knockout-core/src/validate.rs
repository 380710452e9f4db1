//! Structural validation for brackets at any point in their life.
//!
//! The same checks serve two roles: a mandatory gate during construction
//! (a bracket with violations is never exposed) and a standing health check
//! operators can run against a live tournament. Round counts are checked
//! against the builder's own formula, not a second copy of it.

use std::collections::{BTreeMap, HashSet};

use crate::bracket::{Round, Slot};
use crate::builder::round_match_counts;
use crate::id::ParticipantId;
use crate::tournament::Tournament;

// ---------------------------------------------------------------------------
// Violation types
// ---------------------------------------------------------------------------

/// What kind of invariant a violation breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ViolationCode {
    /// A round's match count differs from the derived formula.
    RoundCountMismatch,
    /// Two matches share a position within one round.
    DuplicatePosition,
    /// A participant is missing from round 1 or appears more than once.
    ParticipantMisplaced,
    /// A round-1 match has two empty slots.
    EmptyOpeningMatch,
    /// Round-1 bye slots differ from bracket size minus entrants.
    ByeCountMismatch,
    /// A participant has more losses than the format allows.
    ExcessLosses,
    /// Grand final or reset match count is wrong for the format.
    FinalsCountMismatch,
    /// A recorded winner does not occupy a slot of its match.
    WinnerNotInMatch,
}

/// One violated invariant, with enough context to locate it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Violation {
    pub code: ViolationCode,
    /// The round the violation was found in, when it is round-scoped.
    pub round: Option<Round>,
    pub message: String,
}

impl Violation {
    fn new(code: ViolationCode, round: Option<Round>, message: impl Into<String>) -> Self {
        Self {
            code,
            round,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check every structural invariant. Returns all violations found; an empty
/// list means the bracket is sound.
pub fn validate(tournament: &Tournament) -> Vec<Violation> {
    let mut violations = Vec::new();

    check_round_counts(tournament, &mut violations);
    check_positions(tournament, &mut violations);
    check_opening_round(tournament, &mut violations);
    check_losses(tournament, &mut violations);
    check_winners(tournament, &mut violations);

    violations
}

fn check_round_counts(t: &Tournament, out: &mut Vec<Violation>) {
    let Ok(plan) = round_match_counts(t.roster().len() as u32, t.format()) else {
        out.push(Violation::new(
            ViolationCode::RoundCountMismatch,
            None,
            format!("no valid plan for {} entrants", t.roster().len()),
        ));
        return;
    };

    let mut actual: BTreeMap<Round, u32> = BTreeMap::new();
    for (_, m) in t.all_matches() {
        *actual.entry(m.round).or_insert(0) += 1;
    }

    for round in plan.rounds() {
        let expected = plan.matches_in(round).unwrap_or(0);
        let found = actual.remove(&round).unwrap_or(0);
        if found != expected {
            let code = match round {
                Round::GrandFinal | Round::BracketReset => ViolationCode::FinalsCountMismatch,
                _ => ViolationCode::RoundCountMismatch,
            };
            out.push(Violation::new(
                code,
                Some(round),
                format!("{round}: expected {expected} matches, found {found}"),
            ));
        }
    }
    // Anything left over belongs to no planned round.
    for (round, found) in actual {
        let code = match round {
            Round::GrandFinal | Round::BracketReset => ViolationCode::FinalsCountMismatch,
            _ => ViolationCode::RoundCountMismatch,
        };
        out.push(Violation::new(
            code,
            Some(round),
            format!("{round}: {found} matches outside the round plan"),
        ));
    }
}

fn check_positions(t: &Tournament, out: &mut Vec<Violation>) {
    let mut seen: HashSet<(Round, u32)> = HashSet::new();
    for (_, m) in t.all_matches() {
        if !seen.insert((m.round, m.position)) {
            out.push(Violation::new(
                ViolationCode::DuplicatePosition,
                Some(m.round),
                format!("{}: duplicate position {}", m.round, m.position),
            ));
        }
    }
}

fn check_opening_round(t: &Tournament, out: &mut Vec<Violation>) {
    let mut appearances: BTreeMap<ParticipantId, u32> = BTreeMap::new();
    let mut byes = 0u32;

    for id in t.match_ids_in(Round::Winners(1)) {
        let Some(m) = t.get_match(id) else { continue };
        if m.slots.iter().all(|s| s.is_empty()) {
            out.push(Violation::new(
                ViolationCode::EmptyOpeningMatch,
                Some(Round::Winners(1)),
                format!("round-1 position {} has two empty slots", m.position),
            ));
        }
        for slot in m.slots {
            match slot {
                Slot::Taken(p) => *appearances.entry(p).or_insert(0) += 1,
                Slot::Bye => byes += 1,
                Slot::Empty => {}
            }
        }
    }

    for p in t.roster().participants() {
        match appearances.get(&p.id).copied().unwrap_or(0) {
            1 => {}
            n => out.push(Violation::new(
                ViolationCode::ParticipantMisplaced,
                Some(Round::Winners(1)),
                format!("{:?} appears {n} times in round 1", p.id),
            )),
        }
    }
    for (p, n) in &appearances {
        if t.roster().get(*p).is_none() {
            out.push(Violation::new(
                ViolationCode::ParticipantMisplaced,
                Some(Round::Winners(1)),
                format!("{p:?} occupies {n} round-1 slots but is not on the roster"),
            ));
        }
    }

    let expected_byes = t.plan().byes();
    if byes != expected_byes {
        out.push(Violation::new(
            ViolationCode::ByeCountMismatch,
            Some(Round::Winners(1)),
            format!("expected {expected_byes} bye slots in round 1, found {byes}"),
        ));
    }
}

fn check_losses(t: &Tournament, out: &mut Vec<Violation>) {
    // Recount from match state rather than trusting any cached tally.
    let mut losses: BTreeMap<ParticipantId, u32> = BTreeMap::new();
    for (_, m) in t.all_matches() {
        if let Some(loser) = m.loser() {
            *losses.entry(loser).or_insert(0) += 1;
        }
    }

    let max = t.format().max_losses();
    for (p, n) in losses {
        if n > max {
            out.push(Violation::new(
                ViolationCode::ExcessLosses,
                None,
                format!("{p:?} has {n} losses; format allows {max}"),
            ));
        }
    }
}

fn check_winners(t: &Tournament, out: &mut Vec<Violation>) {
    for (_, m) in t.all_matches() {
        if let Some(w) = m.winner
            && !m.contains(w)
        {
            out.push(Violation::new(
                ViolationCode::WinnerNotInMatch,
                Some(m.round),
                format!("{} position {}: winner {w:?} not in either slot", m.round, m.position),
            ));
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::Format;
    use crate::id::ParticipantId;
    use crate::test_utils::roster;
    use crate::tournament::Tournament;

    fn active(n: u32, format: Format) -> Tournament {
        Tournament::new(roster(n), format).unwrap()
    }

    // -----------------------------------------------------------------------
    // Test 1: fresh_brackets_are_clean
    // -----------------------------------------------------------------------
    #[test]
    fn fresh_brackets_are_clean() {
        for n in [2u32, 3, 5, 8, 16, 24] {
            for format in [Format::Single, Format::Double] {
                let t = active(n, format);
                assert_eq!(validate(&t), vec![], "n = {n}, {format:?}");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Test 2: duplicate_position_detected
    // -----------------------------------------------------------------------
    #[test]
    fn duplicate_position_detected() {
        let mut t = active(8, Format::Single);
        t.corrupt_position_for_test(Round::Winners(1), 2, 1);

        let violations = validate(&t);
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::DuplicatePosition));
    }

    // -----------------------------------------------------------------------
    // Test 3: excess_losses_detected
    // -----------------------------------------------------------------------
    #[test]
    fn excess_losses_detected() {
        let mut t = active(8, Format::Single);
        // Force the same participant to lose two different matches.
        t.corrupt_winner_for_test(Round::Winners(1), 1, ParticipantId(1));
        t.corrupt_slots_for_test(
            Round::Winners(2),
            1,
            Slot::Taken(ParticipantId(2)),
            Slot::Taken(ParticipantId(3)),
        );
        t.corrupt_winner_for_test(Round::Winners(2), 1, ParticipantId(3));

        let violations = validate(&t);
        assert!(
            violations
                .iter()
                .any(|v| v.code == ViolationCode::ExcessLosses),
            "{violations:?}"
        );
    }

    // -----------------------------------------------------------------------
    // Test 4: winner_outside_match_detected
    // -----------------------------------------------------------------------
    #[test]
    fn winner_outside_match_detected() {
        let mut t = active(8, Format::Single);
        t.corrupt_winner_for_test(Round::Winners(1), 1, ParticipantId(99));

        let violations = validate(&t);
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::WinnerNotInMatch));
    }

    // -----------------------------------------------------------------------
    // Test 5: empty_opening_match_detected
    // -----------------------------------------------------------------------
    #[test]
    fn empty_opening_match_detected() {
        let mut t = active(8, Format::Single);
        t.corrupt_slots_for_test(Round::Winners(1), 3, Slot::Empty, Slot::Empty);

        let violations = validate(&t);
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::EmptyOpeningMatch));
        // Removing two participants from round 1 also misplaces them.
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::ParticipantMisplaced));
    }

    // -----------------------------------------------------------------------
    // Test 6: bye_count_mismatch_detected
    // -----------------------------------------------------------------------
    #[test]
    fn bye_count_mismatch_detected() {
        let mut t = active(5, Format::Single);
        t.corrupt_slots_for_test(
            Round::Winners(1),
            1,
            Slot::Taken(ParticipantId(1)),
            Slot::Taken(ParticipantId(1)),
        );

        let violations = validate(&t);
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::ByeCountMismatch));
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::ParticipantMisplaced));
    }
}
