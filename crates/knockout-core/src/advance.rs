//! The advancement engine: turns a reported result into a mutation batch.
//!
//! Everything here computes against a read snapshot of the tournament and
//! returns mutations; nothing writes. The batch carries the full cascade of
//! one result -- the winner's destination fill, the loser's drop into the
//! losers bracket, and any bye walkovers those fills resolve -- so the
//! tournament can commit it atomically.
//!
//! Destination routing is a pure function of the round plan. Survivors of a
//! losers round move to the next losers round: into the survivor slot when
//! the next round is a drop-in (same match count), pairing adjacently when
//! it is a consolidation (half count). The loser of winners round `r >= 2`
//! drops into losers round `2r - 2`, position preserved.

use std::collections::HashMap;

use crate::bracket::{Format, Match, MatchStatus, Round, Slot};
use crate::builder::RoundPlan;
use crate::id::{MatchId, ParticipantId};
use crate::mutation::{Mutation, MutationBatch};
use crate::tournament::{Phase, Tournament};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Caller errors when reporting a result.
#[derive(Debug, thiserror::Error)]
pub enum ResultError {
    #[error("no such match: {0:?}")]
    UnknownMatch(MatchId),
    #[error("match is not ready for a result (status {status:?})")]
    NotReady { target: MatchId, status: MatchStatus },
    #[error("participant {participant:?} is not in match {target:?}")]
    InvalidParticipant {
        target: MatchId,
        participant: ParticipantId,
    },
    #[error(
        "match already decided for {recorded:?}; conflicting result for {submitted:?} rejected"
    )]
    Conflict {
        target: MatchId,
        recorded: ParticipantId,
        submitted: ParticipantId,
    },
    #[error("tournament no longer accepts results")]
    TournamentOver,
    #[error("destination slot contention on {target:?} persisted after {attempts} attempts")]
    Concurrency { target: MatchId, attempts: u32 },
}

// ---------------------------------------------------------------------------
// Destination routing
// ---------------------------------------------------------------------------

/// Where an advancing participant lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Destination {
    pub round: Round,
    pub position: u32,
    pub slot: usize,
}

fn pair_up(position: u32) -> (u32, usize) {
    (position.div_ceil(2), ((position - 1) % 2) as usize)
}

/// Destination of a match winner. `None` means the match is terminal for
/// its ladder: the single-elimination final (champion) or the grand
/// final/reset, which are routed specially.
pub(crate) fn winner_destination(
    plan: &RoundPlan,
    format: Format,
    round: Round,
    position: u32,
) -> Option<Destination> {
    let winners_rounds = plan.winners.len() as u32;
    match round {
        Round::Winners(r) if r < winners_rounds => {
            let (position, slot) = pair_up(position);
            Some(Destination {
                round: Round::Winners(r + 1),
                position,
                slot,
            })
        }
        Round::Winners(_) => match format {
            Format::Single => None,
            Format::Double => Some(Destination {
                round: Round::GrandFinal,
                position: 1,
                slot: 0,
            }),
        },
        Round::Losers(q) => {
            let losers_rounds = plan.losers.len() as u32;
            if q < losers_rounds {
                let here = plan.losers[(q - 1) as usize];
                let next = plan.losers[q as usize];
                if next == here {
                    // Drop-in round next: survivors keep their position and
                    // wait in slot 0 for the incoming winners-bracket loser.
                    Some(Destination {
                        round: Round::Losers(q + 1),
                        position,
                        slot: 0,
                    })
                } else {
                    let (position, slot) = pair_up(position);
                    Some(Destination {
                        round: Round::Losers(q + 1),
                        position,
                        slot,
                    })
                }
            } else {
                Some(Destination {
                    round: Round::GrandFinal,
                    position: 1,
                    slot: 1,
                })
            }
        }
        Round::GrandFinal | Round::BracketReset => None,
    }
}

/// Destination of a match loser. `None` means the loss eliminates (or the
/// format is single elimination).
pub(crate) fn loser_destination(
    plan: &RoundPlan,
    format: Format,
    round: Round,
    position: u32,
) -> Option<Destination> {
    if format == Format::Single {
        return None;
    }
    match round {
        Round::Winners(1) if plan.losers.is_empty() => {
            // Two-entrant bracket: the winners final loser is the losers
            // champion by default and goes straight to the grand final.
            Some(Destination {
                round: Round::GrandFinal,
                position: 1,
                slot: 1,
            })
        }
        Round::Winners(1) => {
            let (position, slot) = pair_up(position);
            Some(Destination {
                round: Round::Losers(1),
                position,
                slot,
            })
        }
        Round::Winners(r) => Some(Destination {
            round: Round::Losers(2 * r - 2),
            position,
            slot: 1,
        }),
        // A losers-bracket loss is a second loss; grand final and reset
        // losses are routed by the grand-final rules.
        Round::Losers(_) | Round::GrandFinal | Round::BracketReset => None,
    }
}

// ---------------------------------------------------------------------------
// Result recording
// ---------------------------------------------------------------------------

/// Compute the mutation batch for a reported result.
///
/// Resubmitting the recorded winner returns an empty batch (no-op success,
/// tolerating at-least-once delivery); a different winner is rejected with
/// [`ResultError::Conflict`] and no state change.
pub fn record_result(
    tournament: &Tournament,
    target: MatchId,
    winner: ParticipantId,
) -> Result<MutationBatch, ResultError> {
    if tournament.phase() != Phase::Active {
        return Err(ResultError::TournamentOver);
    }
    let m = tournament
        .get_match(target)
        .ok_or(ResultError::UnknownMatch(target))?;

    match m.status() {
        MatchStatus::Complete => {
            if m.winner == Some(winner) {
                return Ok(MutationBatch::empty());
            }
            match (m.winner, m.contains(winner)) {
                (Some(recorded), true) => Err(ResultError::Conflict {
                    target,
                    recorded,
                    submitted: winner,
                }),
                _ => Err(ResultError::InvalidParticipant {
                    target,
                    participant: winner,
                }),
            }
        }
        MatchStatus::Pending => Err(ResultError::NotReady {
            target,
            status: MatchStatus::Pending,
        }),
        MatchStatus::Ready => {
            if !m.contains(winner) {
                return Err(ResultError::InvalidParticipant {
                    target,
                    participant: winner,
                });
            }
            let mut builder = BatchBuilder::new(tournament);
            builder.decide(target, winner);
            Ok(builder.finish())
        }
    }
}

/// Compute the build-time bye cascade: resolve every round-1 walkover and
/// chase the resulting fills (and any double-bye losers matches they
/// create) until the bracket settles. Applied once during construction.
pub(crate) fn initial_bye_batch(tournament: &Tournament) -> MutationBatch {
    let mut builder = BatchBuilder::new(tournament);
    for id in tournament.match_ids_in(Round::Winners(1)) {
        builder.auto_resolve(id);
    }
    builder.finish()
}

// ---------------------------------------------------------------------------
// BatchBuilder
// ---------------------------------------------------------------------------

/// Accumulates one result's cascade against a copy-on-write overlay, so
/// later steps observe earlier pending writes without touching the
/// tournament.
struct BatchBuilder<'a> {
    tournament: &'a Tournament,
    overlay: HashMap<MatchId, Match>,
    batch: MutationBatch,
}

impl<'a> BatchBuilder<'a> {
    fn new(tournament: &'a Tournament) -> Self {
        Self {
            tournament,
            overlay: HashMap::new(),
            batch: MutationBatch::empty(),
        }
    }

    fn finish(self) -> MutationBatch {
        self.batch
    }

    /// Current view of a match: pending writes first, then committed state.
    fn current(&self, id: MatchId) -> Option<Match> {
        self.overlay
            .get(&id)
            .cloned()
            .or_else(|| self.tournament.get_match(id).cloned())
    }

    /// Record a winner and route both sides onward.
    fn decide(&mut self, id: MatchId, winner: ParticipantId) {
        let Some(mut m) = self.current(id) else { return };
        m.winner = Some(winner);
        self.overlay.insert(id, m);
        self.batch.push(Mutation::SetWinner {
            target: id,
            winner: Some(winner),
        });
        self.route(id);
    }

    /// Route a resolved match's winner (participant or propagating bye) and
    /// loser to their destinations.
    fn route(&mut self, id: MatchId) {
        let Some(m) = self.current(id) else { return };
        let plan = self.tournament.plan();
        let format = self.tournament.format();

        match m.round {
            Round::GrandFinal => self.route_grand_final(&m),
            Round::BracketReset => {
                if let Some(champion) = m.winner {
                    self.batch.push(Mutation::Crown { champion });
                }
            }
            _ => {
                let winner_value = match m.winner {
                    Some(p) => Slot::Taken(p),
                    // Double bye: nobody advances, the bye does.
                    None => Slot::Bye,
                };
                match winner_destination(plan, format, m.round, m.position) {
                    Some(dest) => self.fill(dest, winner_value),
                    None => {
                        // Single-elimination final.
                        if let Some(champion) = m.winner {
                            self.batch.push(Mutation::Crown { champion });
                        }
                    }
                }
                if let Some(dest) = loser_destination(plan, format, m.round, m.position) {
                    let loser_value = match m.loser() {
                        Some(p) => Slot::Taken(p),
                        // A walkover has no loser; the bye drops instead.
                        None => Slot::Bye,
                    };
                    self.fill(dest, loser_value);
                }
            }
        }
    }

    /// Grand final: a win from the winners-side slot ends the tournament;
    /// a win from the losers-side slot forces the bracket reset.
    fn route_grand_final(&mut self, m: &Match) {
        let Some(winner) = m.winner else { return };
        if m.slot_of(winner) == Some(0) {
            self.batch.push(Mutation::Crown { champion: winner });
            return;
        }
        let Some(loser) = m.loser() else { return };
        self.fill(
            Destination {
                round: Round::BracketReset,
                position: 1,
                slot: 0,
            },
            Slot::Taken(loser),
        );
        self.fill(
            Destination {
                round: Round::BracketReset,
                position: 1,
                slot: 1,
            },
            Slot::Taken(winner),
        );
    }

    /// Write a slot value into a destination match, then resolve any
    /// walkover this creates.
    fn fill(&mut self, dest: Destination, value: Slot) {
        let Some(id) = self.tournament.match_id_at(dest.round, dest.position) else {
            debug_assert!(false, "validated topology lacks {} position {}", dest.round, dest.position);
            return;
        };
        let Some(mut m) = self.current(id) else { return };
        let expected = m.slots[dest.slot];
        m.slots[dest.slot] = value;
        self.overlay.insert(id, m);
        self.batch.push(Mutation::FillSlot {
            target: id,
            slot: dest.slot,
            value,
            expected,
        });
        self.auto_resolve(id);
    }

    /// Resolve a walkover or a double bye without external input,
    /// cascading onward.
    fn auto_resolve(&mut self, id: MatchId) {
        let Some(m) = self.current(id) else { return };
        if m.winner.is_some() {
            return;
        }
        match m.slots {
            [Slot::Taken(p), Slot::Bye] | [Slot::Bye, Slot::Taken(p)] => {
                self.decide(id, p);
            }
            [Slot::Bye, Slot::Bye] => {
                self.batch.push(Mutation::SetWinner {
                    target: id,
                    winner: None,
                });
                self.route(id);
            }
            _ => {}
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
