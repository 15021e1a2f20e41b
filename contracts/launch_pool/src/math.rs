//! Fixed-point entitlement arithmetic.
//!
//! Every offering amount the pool reports or pays goes through
//! [`entitlement`], so purchase events, claims and deposit coverage agree to
//! the last unit.

use crate::Error;

/// Fixed-point scale of `PoolParams::rate` (seven decimals).
pub const RATE_SCALE: i128 = 10_000_000;

/// Offering units owed for `amount` payment units at `rate`.
///
/// Truncates toward zero.
pub fn entitlement(amount: i128, rate: i128) -> Result<i128, Error> {
    amount
        .checked_mul(rate)
        .map(|scaled| scaled / RATE_SCALE)
        .ok_or(Error::Overflow)
}

/// Checked addition that reports [`Error::Overflow`].
pub fn add(a: i128, b: i128) -> Result<i128, Error> {
    a.checked_add(b).ok_or(Error::Overflow)
}
