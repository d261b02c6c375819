//! Seeded pseudo-random source shared by every generator.
//!
//! A plain linear congruential generator with glibc's classic constants.
//! Every helper consumes a fixed number of draws so that a given seed
//! reproduces the same fixture byte-for-byte.

/// Modulus: 2^31
const MODULUS: u64 = 1 << 31;
/// Multiplier (glibc `rand()`)
const MULTIPLIER: u64 = 1_103_515_245;
/// Increment (glibc `rand()`)
const INCREMENT: u64 = 12_345;

/// Deterministic float stream in `[0, 1)`.
///
/// One instance is owned by one generation call. Two instances created
/// from the same seed yield identical sequences forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    /// Create a generator; the seed is reduced modulo 2^31.
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed % MODULUS,
        }
    }

    /// Current register value (after the most recent draw)
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Advance the register and return `state / 2^31`.
    pub fn next_f64(&mut self) -> f64 {
        // a * state < 2^62, no overflow in u64
        self.state = (MULTIPLIER * self.state + INCREMENT) % MODULUS;
        self.state as f64 / MODULUS as f64
    }

    /// Uniform integer in `[min, max]` (inclusive). One draw.
    ///
    /// The span is taken in `i128`, so the full `i64` range is accepted.
    pub fn int_range(&mut self, min: i64, max: i64) -> i64 {
        let span = (max as i128 - min as i128 + 1) as f64;
        let offset = (self.next_f64() * span).floor() as i128;
        // float rounding of very wide spans can land one past `max`
        (min as i128 + offset).min(max as i128) as i64
    }

    /// Uniform float in `[min, max)` rounded to `decimals` places. One draw.
    pub fn float_range(&mut self, min: f64, max: f64, decimals: u32) -> f64 {
        let value = self.next_f64() * (max - min) + min;
        round_to(value, decimals)
    }

    /// Uniform pick from a list. One draw, none when the list is empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = (self.next_f64() * items.len() as f64).floor() as usize;
        items.get(idx.min(items.len() - 1))
    }

    /// `1` when a draw exceeds one half, else `0`. One draw.
    pub fn binary(&mut self) -> i64 {
        if self.next_f64() > 0.5 {
            1
        } else {
            0
        }
    }

    /// Index in `[0, len)`; `len` must be non-zero. One draw.
    pub(crate) fn index(&mut self, len: usize) -> usize {
        let idx = (self.next_f64() * len as f64).floor() as usize;
        idx.min(len.saturating_sub(1))
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
