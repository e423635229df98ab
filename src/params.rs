//! Sizing math relating bit count `m`, hash count `k`, expected items `n`
//! and target false-positive rate `p`.
//!
//! Rounding: `m` is rounded up, `k` to the nearest integer (ties away from
//! zero), never below 1. The realized rate at `n` items therefore differs
//! slightly from `p`, by under 10% relative for practical inputs.

use crate::error::{Error, Result};
use std::f64::consts::LN_2;
use tracing::debug;

/// Largest supported bit count, the range of the 32-bit hash.
pub const MAX_SIZE: usize = u32::MAX as usize;

/// Largest supported number of hash positions per item.
pub const MAX_HASH_COUNT: u32 = u32::MAX;

const LN_2_2: f64 = LN_2 * LN_2;

/// Validated filter dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterParams {
    size: usize,
    hash_count: u32,
}

impl FilterParams {
    /// Explicit dimensions. Both must be positive and `size` at most [`MAX_SIZE`].
    pub fn new(size: usize, hash_count: u32) -> Result<Self> {
        if size == 0 {
            return Err(Error::invalid_argument("size must be positive"));
        }
        if size > MAX_SIZE {
            return Err(Error::invalid_argument(format!(
                "size {} exceeds the maximum of {} bits",
                size, MAX_SIZE
            )));
        }
        if hash_count == 0 {
            return Err(Error::invalid_argument("hash_count must be positive"));
        }
        Ok(Self { size, hash_count })
    }

    // for dimensions already checked by `new`
    pub(crate) fn validated(size: usize, hash_count: u32) -> Self {
        debug_assert!(size > 0 && size <= MAX_SIZE && hash_count > 0);
        Self { size, hash_count }
    }

    /// Optimal dimensions for `expected_count` items at `target_fp_rate`.
    pub fn for_capacity(expected_count: usize, target_fp_rate: f64) -> Result<Self> {
        let size = optimal_size(expected_count, target_fp_rate)?;
        let hash_count = optimal_hash_count(size, expected_count)?;
        debug!(
            expected_count,
            target_fp_rate,
            size,
            hash_count,
            "derived bloom filter parameters"
        );
        Self::new(size, hash_count)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }

    /// Theoretical false-positive rate after `inserted_count` distinct inserts.
    pub fn false_positive_rate(&self, inserted_count: usize) -> f64 {
        false_positive_rate(self.size, self.hash_count, inserted_count)
    }
}

fn check_capacity(expected_count: usize, target_fp_rate: f64) -> Result<()> {
    if expected_count == 0 {
        return Err(Error::invalid_argument("expected_count must be positive"));
    }
    // also rejects NaN
    if !(target_fp_rate > 0.0 && target_fp_rate < 1.0) {
        return Err(Error::invalid_argument(format!(
            "target_fp_rate must be in (0, 1), got {}",
            target_fp_rate
        )));
    }
    Ok(())
}

/// `m = ceil(-n * ln(p) / ln(2)^2)`
pub fn optimal_size(expected_count: usize, target_fp_rate: f64) -> Result<usize> {
    check_capacity(expected_count, target_fp_rate)?;
    let m = ((expected_count as f64) * -target_fp_rate.ln() / LN_2_2).ceil();
    if !m.is_finite() || m > MAX_SIZE as f64 {
        return Err(Error::invalid_argument(format!(
            "{} items at rate {} need more than {} bits",
            expected_count, target_fp_rate, MAX_SIZE
        )));
    }
    Ok((m as usize).max(1))
}

/// `k = round(m / n * ln(2))`, at least 1.
pub fn optimal_hash_count(size: usize, expected_count: usize) -> Result<u32> {
    if size == 0 || expected_count == 0 {
        return Err(Error::invalid_argument("size and expected_count must be positive"));
    }
    let k = (size as f64 / expected_count as f64 * LN_2).round();
    Ok(k.max(1.0).min(f64::from(MAX_HASH_COUNT)) as u32)
}

/// `(1 - e^(-k * n / m))^k`
pub fn false_positive_rate(size: usize, hash_count: u32, inserted_count: usize) -> f64 {
    let (m, k, n) = (size as f64, f64::from(hash_count), inserted_count as f64);
    (1.0 - (-k * n / m).exp()).powf(k)
}
