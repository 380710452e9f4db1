//! The tournament aggregate: owns the authoritative match collection,
//! applies mutation batches atomically, and answers queries.
//!
//! One `Tournament` value per tournament; `&mut` access serializes all
//! writes. Construction is gated: the builder's output must validate with
//! zero violations (after build-time bye resolution) or no value is ever
//! returned. After that the topology is frozen -- only slot contents and
//! winners change, and only through [`Tournament::apply`].

use std::collections::{BTreeMap, HashMap};

use slotmap::SlotMap;

use crate::advance::{self, ResultError};
use crate::bracket::{Format, Match, MatchStatus, Round};
use crate::builder::{self, ConfigurationError, RoundPlan};
use crate::event::{Event, EventLog};
use crate::id::{MatchId, ParticipantId};
use crate::mutation::{Mutation, MutationBatch};
use crate::participant::Roster;
use crate::query::{BracketSnapshot, MatchSnapshot};
use crate::validate::{self, Violation};

/// Apply-time retries before a destination-slot race is surfaced.
const MAX_REPORT_ATTEMPTS: u32 = 3;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// The builder's own output failed validation. Never recoverable: the
/// tournament is not created and the defective bracket is never exposed.
#[derive(Debug, thiserror::Error)]
pub enum StructuralError {
    #[error("bracket failed validation with {} violation(s)", .0.len())]
    Invalid(Vec<Violation>),
    #[error("build-time bye resolution failed: {0}")]
    ByeResolution(ApplyError),
}

/// Why tournament creation failed.
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

/// Why a mutation batch was refused. The batch is all-or-nothing: any
/// refusal means no state changed.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("no such match: {0:?}")]
    UnknownMatch(MatchId),
    #[error("slot {slot} of {target:?} changed since the batch was computed")]
    StaleSlot { target: MatchId, slot: usize },
    #[error("match {target:?} already has a winner")]
    WinnerAlreadySet { target: MatchId },
    #[error("winner is not in a slot of {target:?}")]
    WinnerNotPresent { target: MatchId },
    #[error("champion already resolved")]
    ChampionAlreadySet,
    #[error("tournament no longer accepts mutations")]
    NotActive,
}

// ---------------------------------------------------------------------------
// Phase and outcomes
// ---------------------------------------------------------------------------

/// Tournament lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    /// Accepting results.
    Active,
    /// Champion resolved.
    Completed,
    /// Aborted by an operator: no new results, recorded ones preserved.
    Aborted,
}

/// What a successful `report_result` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOutcome {
    /// False when the call was an idempotent resubmission.
    pub newly_decided: bool,
    /// Mutations committed, including the bye cascade.
    pub mutations_applied: usize,
    /// The champion, if this result resolved one.
    pub champion: Option<ParticipantId>,
}

// ---------------------------------------------------------------------------
// Tournament
// ---------------------------------------------------------------------------

/// A running tournament: roster, bracket, results, and event log.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Tournament {
    format: Format,
    roster: Roster,
    plan: RoundPlan,
    matches: SlotMap<MatchId, Match>,
    /// Match ids per round, ordered by position. Frozen at construction.
    rounds: BTreeMap<Round, Vec<MatchId>>,
    losses: BTreeMap<ParticipantId, u32>,
    champion: Option<ParticipantId>,
    phase: Phase,
    events: EventLog,
}

impl Tournament {
    /// Create a tournament: build the topology, resolve round-1 byes, and
    /// gate on the validator. Pure and deterministic for identical ordered
    /// input.
    pub fn new(roster: Roster, format: Format) -> Result<Self, CreateError> {
        let built = match format {
            Format::Single => builder::build_single(&roster)?,
            Format::Double => builder::build_double(&roster)?,
        };
        let plan = builder::round_match_counts(roster.len() as u32, format)?;

        let mut matches: SlotMap<MatchId, Match> = SlotMap::with_key();
        let mut rounds: BTreeMap<Round, Vec<MatchId>> = BTreeMap::new();
        for m in built {
            let round = m.round;
            let id = matches.insert(m);
            rounds.entry(round).or_default().push(id);
        }

        let mut tournament = Self {
            format,
            roster,
            plan,
            matches,
            rounds,
            losses: BTreeMap::new(),
            champion: None,
            phase: Phase::Active,
            events: EventLog::new(),
        };

        let byes = advance::initial_bye_batch(&tournament);
        if !byes.is_empty() {
            tournament
                .apply(byes)
                .map_err(StructuralError::ByeResolution)?;
        }

        let report = validate::validate(&tournament);
        if !report.is_empty() {
            return Err(StructuralError::Invalid(report).into());
        }
        Ok(tournament)
    }

    // -- Reporting ----------------------------------------------------------

    /// Report a match result. Computes the advancement batch, applies it
    /// atomically, and retries a bounded number of times if a destination
    /// slot changed underneath the computation.
    pub fn report_result(
        &mut self,
        target: MatchId,
        winner: ParticipantId,
    ) -> Result<ReportOutcome, ResultError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let batch = advance::record_result(self, target, winner)?;
            if batch.is_empty() {
                return Ok(ReportOutcome {
                    newly_decided: false,
                    mutations_applied: 0,
                    champion: self.champion,
                });
            }
            match self.apply(batch) {
                Ok(applied) => {
                    return Ok(ReportOutcome {
                        newly_decided: true,
                        mutations_applied: applied,
                        champion: self.champion,
                    });
                }
                Err(ApplyError::NotActive) => return Err(ResultError::TournamentOver),
                Err(ApplyError::UnknownMatch(id)) => {
                    return Err(ResultError::UnknownMatch(id));
                }
                Err(_) if attempts < MAX_REPORT_ATTEMPTS => continue,
                Err(_) => {
                    return Err(ResultError::Concurrency { target, attempts });
                }
            }
        }
    }

    // -- Batch application --------------------------------------------------

    /// Apply a mutation batch all-or-nothing.
    ///
    /// A first pass verifies every mutation against an overlay of the
    /// current state (so in-batch cascades see their own writes); only if
    /// the whole batch verifies is anything committed. Events are emitted
    /// on commit.
    pub fn apply(&mut self, batch: MutationBatch) -> Result<usize, ApplyError> {
        if self.phase != Phase::Active {
            return Err(ApplyError::NotActive);
        }

        // Verify pass.
        let mut overlay: HashMap<MatchId, Match> = HashMap::new();
        let mut crowned = self.champion.is_some();
        for mutation in batch.mutations() {
            match mutation {
                Mutation::SetWinner { target, winner } => {
                    let mut m = self.overlay_match(&overlay, *target)?;
                    if let Some(w) = winner {
                        if m.winner.is_some() {
                            return Err(ApplyError::WinnerAlreadySet { target: *target });
                        }
                        if !m.contains(*w) {
                            return Err(ApplyError::WinnerNotPresent { target: *target });
                        }
                        m.winner = Some(*w);
                    }
                    overlay.insert(*target, m);
                }
                Mutation::FillSlot {
                    target,
                    slot,
                    value,
                    expected,
                } => {
                    let mut m = self.overlay_match(&overlay, *target)?;
                    if *slot >= 2 || m.slots[*slot] != *expected {
                        return Err(ApplyError::StaleSlot {
                            target: *target,
                            slot: *slot,
                        });
                    }
                    m.slots[*slot] = *value;
                    overlay.insert(*target, m);
                }
                Mutation::Crown { .. } => {
                    if crowned {
                        return Err(ApplyError::ChampionAlreadySet);
                    }
                    crowned = true;
                }
            }
        }

        // Commit pass.
        let applied = batch.len();
        for mutation in batch {
            self.commit(mutation);
        }
        Ok(applied)
    }

    fn overlay_match(
        &self,
        overlay: &HashMap<MatchId, Match>,
        target: MatchId,
    ) -> Result<Match, ApplyError> {
        overlay
            .get(&target)
            .or_else(|| self.matches.get(target))
            .cloned()
            .ok_or(ApplyError::UnknownMatch(target))
    }

    /// Write one verified mutation and emit its events.
    fn commit(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::SetWinner { target, winner } => {
                let Some(m) = self.matches.get_mut(target) else { return };
                m.winner = winner;
                let Some(w) = winner else { return };
                let (round, position) = (m.round, m.position);
                let walkover = !m.is_decisive();
                let loser = m.loser();
                self.events.push(Event::MatchDecided {
                    target,
                    round,
                    position,
                    winner: w,
                    walkover,
                });
                if let Some(loser) = loser {
                    let count = self.losses.entry(loser).or_insert(0);
                    *count += 1;
                    if *count >= self.format.max_losses() {
                        self.events
                            .push(Event::ParticipantEliminated { participant: loser });
                    }
                }
            }
            Mutation::FillSlot {
                target,
                slot,
                value,
                ..
            } => {
                let Some(m) = self.matches.get_mut(target) else { return };
                m.slots[slot] = value;
                if m.status() == MatchStatus::Ready {
                    let (round, position) = (m.round, m.position);
                    self.events.push(match round {
                        Round::BracketReset => Event::BracketResetScheduled,
                        _ => Event::MatchReady {
                            target,
                            round,
                            position,
                        },
                    });
                }
            }
            Mutation::Crown { champion } => {
                self.champion = Some(champion);
                self.phase = Phase::Completed;
                self.events.push(Event::ChampionCrowned { champion });
            }
        }
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Stop accepting results. Recorded results and the event log are
    /// preserved for audit.
    pub fn abort(&mut self) {
        if self.phase == Phase::Active {
            self.phase = Phase::Aborted;
        }
    }

    // -- Queries ------------------------------------------------------------

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The derived round plan this bracket was built from.
    pub fn plan(&self) -> &RoundPlan {
        &self.plan
    }

    pub fn bracket_size(&self) -> u32 {
        self.plan.bracket_size
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The champion, `None` until decided.
    pub fn champion(&self) -> Option<ParticipantId> {
        self.champion
    }

    pub fn get_match(&self, id: MatchId) -> Option<&Match> {
        self.matches.get(id)
    }

    /// All matches, in storage order.
    pub fn all_matches(&self) -> impl Iterator<Item = (MatchId, &Match)> {
        self.matches.iter()
    }

    /// Match ids for a round, ordered by position.
    pub fn match_ids_in(&self, round: Round) -> Vec<MatchId> {
        self.rounds.get(&round).cloned().unwrap_or_default()
    }

    /// Locate a match by round and 1-based position.
    pub fn match_id_at(&self, round: Round, position: u32) -> Option<MatchId> {
        self.rounds
            .get(&round)?
            .get(position.checked_sub(1)? as usize)
            .copied()
    }

    /// Matches currently awaiting a result, bracket order.
    pub fn ready_matches(&self) -> Vec<MatchId> {
        self.rounds
            .values()
            .flatten()
            .copied()
            .filter(|&id| {
                self.matches
                    .get(id)
                    .is_some_and(|m| m.status() == MatchStatus::Ready)
            })
            .collect()
    }

    /// Recorded losses for a participant.
    pub fn losses(&self, p: ParticipantId) -> u32 {
        self.losses.get(&p).copied().unwrap_or(0)
    }

    /// Completed matches that were contested by two participants.
    /// Walkovers and bye chains do not count.
    pub fn decisive_matches_played(&self) -> usize {
        self.matches.values().filter(|m| m.is_decisive()).count()
    }

    /// Run the standing structural health check.
    pub fn validation_report(&self) -> Vec<Violation> {
        validate::validate(self)
    }

    /// Owned, serializable view of the whole bracket, round-ordered.
    pub fn snapshot(&self) -> BracketSnapshot {
        let matches = self
            .rounds
            .values()
            .flatten()
            .filter_map(|&id| {
                self.matches.get(id).map(|m| MatchSnapshot {
                    id,
                    round: m.round,
                    position: m.position,
                    slots: m.slots,
                    winner: m.winner,
                    status: m.status(),
                })
            })
            .collect();
        BracketSnapshot {
            format: self.format,
            bracket_size: self.plan.bracket_size,
            phase: self.phase,
            champion: self.champion,
            participants: self.roster.participants().to_vec(),
            matches,
        }
    }

    // -- Events -------------------------------------------------------------

    /// Buffered events since the last drain.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Drain buffered events, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    // -- Test-only corruption hooks -----------------------------------------

    /// Overwrite a match position, bypassing batch application. Exists so
    /// validator tests can damage a bracket deliberately.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn corrupt_position_for_test(&mut self, round: Round, from: u32, to: u32) {
        if let Some(id) = self.match_id_at(round, from)
            && let Some(m) = self.matches.get_mut(id)
        {
            m.position = to;
        }
    }

    /// Overwrite a match winner, bypassing batch application.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn corrupt_winner_for_test(&mut self, round: Round, position: u32, winner: ParticipantId) {
        if let Some(id) = self.match_id_at(round, position)
            && let Some(m) = self.matches.get_mut(id)
        {
            m.winner = Some(winner);
        }
    }

    /// Overwrite both slots of a match, bypassing batch application.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn corrupt_slots_for_test(
        &mut self,
        round: Round,
        position: u32,
        a: crate::bracket::Slot,
        b: crate::bracket::Slot,
    ) {
        if let Some(id) = self.match_id_at(round, position)
            && let Some(m) = self.matches.get_mut(id)
        {
            m.slots = [a, b];
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
