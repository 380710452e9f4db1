//! Deterministic PRNG for bracket simulation.
//!
//! Uses the SplitMix64 algorithm: fast, 8 bytes of state, excellent
//! statistical properties, and trivially serializable. Simulations drive
//! whole tournaments with random winners to hunt structural bugs; a seeded
//! generator makes every failure reproducible.

/// SplitMix64 pseudo-random number generator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// A fair coin flip, from the high bit of the next output.
    pub fn coin(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }

    /// Pick which side of a match wins: slot index 0 or 1.
    pub fn pick_slot(&mut self) -> usize {
        usize::from(self.coin())
    }

    /// Get the internal state (for hashing/serialization).
    pub fn state(&self) -> u64 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let mut a = SimRng::new(42);
        let mut b = SimRng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_differ() {
        let mut a = SimRng::new(1);
        let mut b = SimRng::new(2);
        // Extremely unlikely to match.
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn coin_roughly_balanced() {
        let mut rng = SimRng::new(12345);
        let trials = 10_000;
        let heads = (0..trials).filter(|_| rng.coin()).count();
        // Expect ~5000 with a very generous tolerance.
        assert!((4000..=6000).contains(&heads), "expected ~5000, got {heads}");
    }

    #[test]
    fn pick_slot_in_range() {
        let mut rng = SimRng::new(7);
        for _ in 0..100 {
            assert!(rng.pick_slot() < 2);
        }
    }

    #[test]
    fn serialization_round_trip() {
        let mut rng = SimRng::new(42);
        // Advance state.
        for _ in 0..50 {
            rng.next_u64();
        }

        let json = serde_json::to_string(&rng).unwrap();
        let restored: SimRng = serde_json::from_str(&json).unwrap();
        assert_eq!(rng, restored);

        // Continue sequence -- should match.
        let mut rng2 = restored;
        for _ in 0..10 {
            assert_eq!(rng.next_u64(), rng2.next_u64());
        }
    }
}
