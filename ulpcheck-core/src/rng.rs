//! Sample Generation
//!
//! `WyRand` is a 64-bit counter-based generator (wyhash64 mixing). It is fast
//! enough that drawing inputs never shows up next to MPFR in a profile, and
//! its whole state is one `u64`, so every worker slot gets its own copy.

use rand::rngs::OsRng;
use rand::{Error, RngCore, SeedableRng};

const INCREMENT: u64 = 0x60be_e2be_e120_fc15;
const MIX_A: u64 = 0xa3b1_9535_4a39_b70d;
const MIX_B: u64 = 0x1b03_7387_12fa_d5c9;

/// wyhash64 generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WyRand {
    state: u64,
}

impl WyRand {
    /// Generator starting from `seed`
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Current state
    pub fn state(&self) -> u64 {
        self.state
    }

    #[inline]
    fn step(&mut self) -> u64 {
        self.state = self.state.wrapping_add(INCREMENT);
        let t = u128::from(self.state) * u128::from(MIX_A);
        let m1 = ((t >> 64) ^ t) as u64;
        let t = u128::from(m1) * u128::from(MIX_B);
        ((t >> 64) ^ t) as u64
    }
}

impl RngCore for WyRand {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for WyRand {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}

/// Per-slot seeds for one run.
///
/// The bank is fixed when the run starts; `reseed` hands out fresh
/// generators in the same starting state before every rounding mode, so each
/// mode sees the same input sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedBank {
    seeds: Vec<u64>,
}

impl SeedBank {
    /// Seeds derived deterministically from one master seed
    pub fn from_seed(seed: u64, slots: usize) -> Self {
        let mut mixer = WyRand::new(seed);
        Self {
            seeds: (0..slots.max(1)).map(|_| mixer.next_u64()).collect(),
        }
    }

    /// Seeds drawn from the operating system
    pub fn from_entropy(slots: usize) -> Self {
        Self {
            seeds: (0..slots.max(1)).map(|_| OsRng.next_u64()).collect(),
        }
    }

    /// Number of slots
    pub fn slots(&self) -> usize {
        self.seeds.len()
    }

    /// Raw seeds, one per slot
    pub fn seeds(&self) -> &[u64] {
        &self.seeds
    }

    /// Fresh generators, one per slot
    pub fn reseed(&self) -> Vec<WyRand> {
        self.seeds.iter().map(|&s| WyRand::new(s)).collect()
    }
}
