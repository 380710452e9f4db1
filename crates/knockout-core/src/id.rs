use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a match in a tournament's bracket.
    pub struct MatchId;
}

/// Identifies a participant within one tournament. Cheap to copy and compare.
///
/// Assigned by the external registration flow; the engine only requires that
/// ids are unique within a roster.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ParticipantId(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_id_equality() {
        let a = ParticipantId(0);
        let b = ParticipantId(0);
        let c = ParticipantId(1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn participant_id_ordering() {
        assert!(ParticipantId(1) < ParticipantId(2));
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ParticipantId(0), "Ada");
        map.insert(ParticipantId(1), "Grace");
        assert_eq!(map[&ParticipantId(0)], "Ada");
    }
}
