//! Property-based tests for bracket construction and advancement.
//!
//! Uses proptest to sweep participant counts and random result sequences,
//! then verify the structural invariants hold: the validator stays clean,
//! decisive-match counts match the format's arithmetic, and loss
//! accounting is exact. The losers-bracket construction rule is exercised
//! against arbitrary sizes here precisely because it is derived, not
//! tabulated.

use knockout_core::bracket::{Format, MatchStatus, Round, Slot};
use knockout_core::rng::SimRng;
use knockout_core::test_utils::*;
use knockout_core::tournament::Tournament;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_format() -> impl Strategy<Value = Format> {
    prop_oneof![Just(Format::Single), Just(Format::Double)]
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Construction for any size and format passes the validator.
    #[test]
    fn fresh_brackets_validate_clean(n in 2u32..=64, format in arb_format()) {
        let t = Tournament::new(roster(n), format).unwrap();
        prop_assert_eq!(t.validation_report(), vec![]);
    }

    /// Bye slots in round 1 equal bracket size minus entrants, and every
    /// bye pairs with one of the strongest seeds.
    #[test]
    fn byes_match_bracket_arithmetic(n in 2u32..=64, format in arb_format()) {
        let t = Tournament::new(roster(n), format).unwrap();
        let expected_byes = t.bracket_size() - n;

        let mut byes = 0u32;
        let mut walkover_seeds = Vec::new();
        for id in t.match_ids_in(Round::Winners(1)) {
            let m = t.get_match(id).unwrap();
            if m.slots.iter().any(|s| s.is_bye()) {
                byes += 1;
                if let Some(p) = m.slots.iter().find_map(|s| s.participant()) {
                    walkover_seeds.push(p.0);
                }
            }
        }

        prop_assert_eq!(byes, expected_byes);
        walkover_seeds.sort();
        let top_seeds: Vec<u32> = (1..=expected_byes).collect();
        prop_assert_eq!(walkover_seeds, top_seeds);
    }

    /// Identical ordered input produces an identical bracket.
    #[test]
    fn construction_is_deterministic(n in 2u32..=64, format in arb_format()) {
        let a = Tournament::new(roster(n), format).unwrap();
        let b = Tournament::new(roster(n), format).unwrap();
        prop_assert_eq!(a.snapshot(), b.snapshot());
    }

    /// A fully simulated single-elimination tournament plays exactly
    /// `n - 1` decisive matches, crowns exactly one champion, and never
    /// trips the validator.
    #[test]
    fn single_plays_n_minus_one(n in 2u32..=64, seed in any::<u64>()) {
        let mut t = Tournament::new(roster(n), Format::Single).unwrap();
        let mut rng = SimRng::new(seed);
        let champion = simulate_random(&mut t, &mut rng);

        prop_assert_eq!(t.decisive_matches_played(), (n - 1) as usize);
        prop_assert_eq!(t.champion(), Some(champion));
        prop_assert_eq!(t.losses(champion), 0);
        prop_assert_eq!(t.validation_report(), vec![]);
    }

    /// A fully simulated double-elimination tournament: every non-champion
    /// is eliminated with exactly two losses, the champion has at most
    /// one, the reset is played iff the losers champion won the first
    /// grand final, and the decisive count follows.
    #[test]
    fn double_loss_accounting_is_exact(n in 2u32..=48, seed in any::<u64>()) {
        let mut t = Tournament::new(roster(n), Format::Double).unwrap();
        let mut rng = SimRng::new(seed);
        let champion = simulate_random(&mut t, &mut rng);

        for p in t.roster().participants() {
            if p.id == champion {
                prop_assert!(t.losses(p.id) <= 1, "champion with {} losses", t.losses(p.id));
            } else {
                prop_assert_eq!(t.losses(p.id), 2, "{:?} eliminated with wrong loss count", p.id);
            }
        }

        // The reset is forced exactly when the losers-side slot won the
        // first grand final.
        let gf = t.match_ids_in(Round::GrandFinal)[0];
        let gf = t.get_match(gf).unwrap();
        let losers_side_won = gf.winner == gf.slots[1].participant();
        let finals = grand_finals_played(&t);
        prop_assert_eq!(finals, if losers_side_won { 2 } else { 1 });

        let expected = 2 * n as usize - 2 + (finals - 1);
        prop_assert_eq!(t.decisive_matches_played(), expected);
        prop_assert_eq!(t.validation_report(), vec![]);
    }

    /// The validator stays clean mid-flight, not just at the endpoints.
    #[test]
    fn validator_clean_throughout(n in 2u32..=24, seed in any::<u64>(), format in arb_format()) {
        let mut t = Tournament::new(roster(n), format).unwrap();
        let mut rng = SimRng::new(seed);

        while t.champion().is_none() {
            let ready = t.ready_matches();
            prop_assert!(!ready.is_empty(), "stalled bracket");
            let pick = ready[(rng.next_u64() % ready.len() as u64) as usize];
            let m = t.get_match(pick).unwrap();
            let winner = m.slots[rng.pick_slot()].participant().unwrap();
            t.report_result(pick, winner).unwrap();

            prop_assert_eq!(t.validation_report(), vec![]);
        }
    }

    /// Every match a simulation leaves behind is complete or a pending
    /// reset; nothing is stranded half-filled.
    #[test]
    fn no_stranded_matches_after_completion(n in 2u32..=32, seed in any::<u64>(), format in arb_format()) {
        let mut t = Tournament::new(roster(n), format).unwrap();
        let mut rng = SimRng::new(seed);
        simulate_random(&mut t, &mut rng);

        for (_, m) in t.all_matches() {
            match m.status() {
                MatchStatus::Complete => {}
                MatchStatus::Pending if m.round == Round::BracketReset => {
                    // The reset stays unplayed when the winners champion
                    // takes the first grand final.
                    prop_assert_eq!(m.slots, [Slot::Empty, Slot::Empty]);
                }
                status => {
                    prop_assert!(
                        false,
                        "{} position {} stranded as {:?}",
                        m.round,
                        m.position,
                        status
                    );
                }
            }
        }
    }
}
