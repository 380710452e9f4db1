//! Knockout Core -- the elimination-bracket engine for tournament software.
//!
//! This crate constructs single- and double-elimination bracket topologies,
//! advances winners (and losers) match by match, and validates that the
//! structure obeys its format's rules at every point in its life.
//!
//! # Pipeline
//!
//! 1. **Build** -- [`builder`] derives the match topology for a roster,
//!    including the losers bracket by a recursive survivor-flow rule (never
//!    a per-size table).
//! 2. **Gate** -- [`validate`] certifies the fresh bracket; a bracket with
//!    violations is never exposed.
//! 3. **Hold** -- [`tournament::Tournament`] owns the authoritative match
//!    collection; the topology is frozen, only slots and winners mutate.
//! 4. **Advance** -- [`advance`] turns each reported result into a
//!    [`mutation::MutationBatch`] (winner routing, losers-bracket drops,
//!    bye walkovers) that the tournament applies atomically.
//! 5. **Check** -- [`validate`] doubles as a standing health check, and
//!    [`query`] snapshots feed external consumers.
//!
//! # Mutation Batch Pattern
//!
//! State changes are computed against a read snapshot and applied
//! all-or-nothing, never piecemeal:
//!
//! ```rust,ignore
//! let batch = advance::record_result(&tournament, match_id, winner)?;
//! tournament.apply(batch)?;
//! ```
//!
//! Every slot fill carries the value the engine observed, so two results
//! racing for one destination match cannot silently overwrite each other;
//! [`tournament::Tournament::report_result`] wraps the compute/apply loop
//! with bounded retry.
//!
//! # Key Types
//!
//! - [`tournament::Tournament`] -- one authoritative value per tournament.
//! - [`bracket::Round`] -- tagged round variant: winners, losers, grand
//!   final, bracket reset; no sentinel numbering.
//! - [`bracket::Match`] / [`bracket::Slot`] -- slots are empty, bye, or
//!   taken; match status is always derived.
//! - [`builder::RoundPlan`] -- per-round match counts, derived at build
//!   time and shared with the validator.
//! - [`validate::Violation`] -- one broken invariant with location context.
//! - [`serialize`] -- versioned binary snapshots via bitcode.

pub mod advance;
pub mod bracket;
pub mod builder;
pub mod event;
pub mod id;
pub mod mutation;
pub mod participant;
pub mod query;
pub mod rng;
#[cfg(feature = "data-loader")]
pub mod roster_loader;
pub mod serialize;
pub mod tournament;
pub mod validate;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
