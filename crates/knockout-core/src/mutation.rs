//! Mutation batches: the only way bracket state changes after construction.
//!
//! The advancement engine computes a batch against a read snapshot; the
//! tournament applies it all-or-nothing. Every slot fill carries the slot
//! value the engine read, so a batch computed against stale state is
//! detected at apply time instead of silently overwriting a sibling
//! result's advancement.

use crate::bracket::Slot;
use crate::id::{MatchId, ParticipantId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Mutation
// ---------------------------------------------------------------------------

/// A single state change within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    /// Record a match winner. `None` marks a double-bye match resolved.
    SetWinner {
        target: MatchId,
        winner: Option<ParticipantId>,
    },
    /// Write a slot value into a destination match. `expected` is the value
    /// the engine observed; apply refuses the whole batch if it no longer
    /// matches.
    FillSlot {
        target: MatchId,
        slot: usize,
        value: Slot,
        expected: Slot,
    },
    /// Resolve the tournament champion and complete the tournament.
    Crown { champion: ParticipantId },
}

// ---------------------------------------------------------------------------
// MutationBatch
// ---------------------------------------------------------------------------

/// An ordered set of mutations applied atomically.
///
/// Batches preserve computation order: a winner is always recorded before
/// the fills it cascades into, so event emission during apply reads
/// naturally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationBatch {
    mutations: Vec<Mutation>,
}

impl MutationBatch {
    /// An empty batch; applying it is a no-op success.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Mutations in application order.
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }
}

impl IntoIterator for MutationBatch {
    type Item = Mutation;
    type IntoIter = std::vec::IntoIter<Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.mutations.into_iter()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn match_id() -> MatchId {
        let mut sm = SlotMap::<MatchId, ()>::with_key();
        sm.insert(())
    }

    // -----------------------------------------------------------------------
    // Test 1: empty_batch
    // -----------------------------------------------------------------------
    #[test]
    fn empty_batch() {
        let batch = MutationBatch::empty();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }

    // -----------------------------------------------------------------------
    // Test 2: push_preserves_order
    // -----------------------------------------------------------------------
    #[test]
    fn push_preserves_order() {
        let target = match_id();
        let dest = match_id();
        let mut batch = MutationBatch::empty();
        batch.push(Mutation::SetWinner {
            target,
            winner: Some(ParticipantId(1)),
        });
        batch.push(Mutation::FillSlot {
            target: dest,
            slot: 0,
            value: Slot::Taken(ParticipantId(1)),
            expected: Slot::Empty,
        });

        assert_eq!(batch.len(), 2);
        assert!(matches!(batch.mutations()[0], Mutation::SetWinner { .. }));
        assert!(matches!(batch.mutations()[1], Mutation::FillSlot { .. }));
    }

    // -----------------------------------------------------------------------
    // Test 3: fill_records_expected_value
    // -----------------------------------------------------------------------
    #[test]
    fn fill_records_expected_value() {
        let target = match_id();
        let mutation = Mutation::FillSlot {
            target,
            slot: 1,
            value: Slot::Taken(ParticipantId(9)),
            expected: Slot::Bye,
        };
        match mutation {
            Mutation::FillSlot { expected, .. } => assert_eq!(expected, Slot::Bye),
            _ => unreachable!(),
        }
    }
}
