//! Seeded random generators
//!
//! Randomness is always owned by the caller and passed down explicitly, so
//! concurrent calls never share generator state and a fixed seed reproduces
//! output exactly.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Generator type used for humanization and noise
pub type MorseRng = Pcg32;

/// Create a generator from a 32-bit seed.
///
/// Seed `0` requests a non-deterministic generator seeded from system
/// entropy. Any other value is expanded to 64 bits by duplicating it into
/// both halves, as PCG32 state initialisation expects.
pub fn seeded(seed: u32) -> MorseRng {
    if seed == 0 {
        return Pcg32::from_entropy();
    }
    let seed64 = (seed as u64) | ((seed as u64) << 32);
    Pcg32::seed_from_u64(seed64)
}

/// Uniform sample in `[-1, 1)`
pub fn bipolar<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(-1.0..1.0)
}
