//! Seed derivation for independent random streams.
//!
//! Sharded Monte Carlo needs one RNG per shard, and the streams must not be
//! correlated. Seeding shard `i` with `seed + i` would hand `StdRng` nearly
//! identical seeds; mixing through a SplitMix64 finalizer spreads them over
//! the whole `u64` range.

/// Seed for stream `stream` derived from a base `seed`.
///
/// Deterministic and platform independent: same inputs, same output.
#[must_use]
pub fn derive_seed(seed: u64, stream: u64) -> u64 {
    splitmix64(seed ^ splitmix64(stream.wrapping_add(0x5348_4152))) // "SHAR"
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
