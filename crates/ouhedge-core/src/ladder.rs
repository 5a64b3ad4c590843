//! Exchange tick ladder and odds quantization.
//!
//! The exchange only accepts prices on a fixed ladder of increments that
//! coarsens as odds rise. Every derived price (hedge odds in particular)
//! must be quantized before it is sent out; a non-tick price would be
//! rejected upstream.

use crate::decimal::Odds;
use crate::error::{CoreError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Lowest price the exchange accepts.
pub const MIN_ODDS: Decimal = dec!(1.01);

/// Highest price the exchange accepts.
pub const MAX_ODDS: Decimal = dec!(1000);

/// Price bands with their tick increments.
///
/// Each entry is `(upper_bound, increment)`; a band covers
/// `(previous_upper, upper_bound]`, so exact boundaries such as `2.0`
/// belong to the lower (finer-grained) band.
const BANDS: [(Decimal, Decimal); 10] = [
    (dec!(2), dec!(0.01)),
    (dec!(3), dec!(0.02)),
    (dec!(4), dec!(0.05)),
    (dec!(6), dec!(0.1)),
    (dec!(10), dec!(0.2)),
    (dec!(20), dec!(0.5)),
    (dec!(30), dec!(1)),
    (dec!(50), dec!(2)),
    (dec!(100), dec!(5)),
    (dec!(1000), dec!(10)),
];

/// Quantizer mapping real-valued prices to the nearest valid tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickLadder;

impl TickLadder {
    /// Snap `odds` to the nearest tick of its price band.
    ///
    /// Rounds half-up to the nearest multiple of the band increment, with
    /// two-decimal final precision. Values in `(1.0, 1.01)` clamp to the
    /// ladder floor; anything at or below `1.0`, or above `1000`, is
    /// rejected.
    pub fn quantize(&self, odds: Odds) -> Result<Odds> {
        let raw = odds.inner();
        if raw <= Decimal::ONE || raw > MAX_ODDS {
            return Err(CoreError::OddsOutOfRange(raw));
        }
        let value = if raw < MIN_ODDS { MIN_ODDS } else { raw };

        for (upper, increment) in BANDS {
            if value <= upper {
                let ticks = (value / increment)
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
                return Ok(Odds::new((ticks * increment).round_dp(2)));
            }
        }
        // value <= MAX_ODDS, so the last band always matched
        unreachable!("odds {value} not covered by any band");
    }
}
