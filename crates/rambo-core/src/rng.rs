//! Deterministic PRNG used for power-on randomization of PPU memories.
//!
//! Real 2C02 OAM, CIRAM and palette RAM come up holding garbage. Emulating that
//! must stay reproducible, so the garbage is drawn from a seeded SplitMix64
//! stream instead of an OS entropy source. Not cryptographically secure.

/// A small PRNG based on SplitMix64. Any seed is valid, including 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    #[inline]
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Advances the generator and returns the next pseudo-random `u64`.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Fills `buf` with pseudo-random bytes, eight at a time.
    pub fn fill_bytes(&mut self, buf: &mut [u8]) {
        let mut chunks = buf.chunks_exact_mut(8);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&self.next_u64().to_le_bytes());
        }
        let tail = chunks.into_remainder();
        if !tail.is_empty() {
            let bytes = self.next_u64().to_le_bytes();
            tail.copy_from_slice(&bytes[..tail.len()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SplitMix64;

    #[test]
    fn same_seed_fills_identically() {
        let mut a = [0u8; 37];
        let mut b = [0u8; 37];
        SplitMix64::new(7).fill_bytes(&mut a);
        SplitMix64::new(7).fill_bytes(&mut b);
        assert_eq!(a, b);
        assert!(a.iter().any(|&byte| byte != 0));
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SplitMix64::new(1);
        let mut b = SplitMix64::new(2);
        assert_ne!(a.next_u64(), b.next_u64());
    }
}
