//! Seedable Xorshift64 PRNG.
//!
//! Every random choice an effect makes (spawn positions, tones, flicker,
//! sparkle flashes) draws from one of these, so a scene replayed with the
//! same seed produces the same frames.

use serde::{Deserialize, Serialize};

/// Xorshift64 with shifts (13, 7, 17). Same seed, same sequence.
///
/// A seed of 0 is replaced with a non-zero constant because zero is a fixed
/// point of the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform f64 in [0, 1) from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform f32 in [0, 1) from the upper 24 bits.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform f32 in [min, max).
    pub fn next_range(&mut self, min: f32, max: f32) -> f32 {
        let v = min + self.next_f32() * (max - min);
        // f32 rounding can land exactly on `max`.
        if v >= max {
            min
        } else {
            v
        }
    }

    /// Uniform usize in [0, max). Panics if `max` is 0.
    pub fn next_usize(&mut self, max: usize) -> usize {
        (self.next_u64() as usize) % max
    }

    /// Returns true with probability `p` (clamped to [0, 1]).
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_usize(i + 1);
            items.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_u64_matches_golden_value_for_seed_42() {
        // Changing this breaks every saved scene.
        let mut rng = Xorshift64::new(42);
        assert_eq!(rng.next_u64(), 45_454_805_674);
    }

    #[test]
    fn seed_zero_uses_fallback() {
        let mut zero = Xorshift64::new(0);
        let mut fallback = Xorshift64::new(Xorshift64::FALLBACK_SEED);
        assert_ne!(zero.next_u64(), 0);
        assert_eq!(zero.next_u64(), {
            fallback.next_u64();
            fallback.next_u64()
        });
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Xorshift64::new(2500);
        let mut b = Xorshift64::new(2500);
        for i in 0..500 {
            assert_eq!(a.next_u64(), b.next_u64(), "diverged at {i}");
        }
    }

    #[test]
    fn chance_extremes_are_deterministic() {
        let mut rng = Xorshift64::new(7);
        for _ in 0..1000 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn chance_two_percent_is_roughly_two_percent() {
        let mut rng = Xorshift64::new(99);
        let hits = (0..100_000).filter(|_| rng.chance(0.02)).count();
        assert!((1_500..2_500).contains(&hits), "got {hits} hits");
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = Xorshift64::new(11);
        let mut items: Vec<usize> = (0..64).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..64).collect::<Vec<_>>());
        assert_ne!(items, sorted, "64 items should not shuffle to identity");
    }

    #[test]
    fn serialized_state_resumes_the_sequence() {
        let mut rng = Xorshift64::new(42);
        for _ in 0..10 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: Xorshift64 = serde_json::from_str(&json).unwrap();
        assert_eq!(rng.next_u64(), restored.next_u64());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn next_f32_in_unit_interval(seed: u64) {
                let mut rng = Xorshift64::new(seed);
                for _ in 0..200 {
                    let v = rng.next_f32();
                    prop_assert!((0.0..1.0).contains(&v), "next_f32() = {v}");
                }
            }

            #[test]
            fn next_range_in_bounds(
                seed: u64,
                min in -5_000.0_f32..5_000.0,
                span in 0.001_f32..5_000.0,
            ) {
                let max = min + span;
                prop_assume!(max > min);
                let mut rng = Xorshift64::new(seed);
                for _ in 0..200 {
                    let v = rng.next_range(min, max);
                    prop_assert!(v >= min && v < max, "next_range({min}, {max}) = {v}");
                }
            }

            #[test]
            fn next_usize_below_max(seed: u64, max in 1_usize..10_000) {
                let mut rng = Xorshift64::new(seed);
                for _ in 0..200 {
                    prop_assert!(rng.next_usize(max) < max);
                }
            }
        }
    }
}
