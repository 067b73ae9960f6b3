// Value types shared across the engine. Everything here is an owned,
// immutable snapshot constructed fresh per call; the engine never holds a
// reference back into a live cache.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Raw 32-byte mint identifier of a pool token.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MintAddress(pub [u8; 32]);

/// One discretized tick slot, as stored in a tick-array page.
///
/// `liquidity_borrowed` tracks liquidity currently lent out against this tick
/// and is carried for utilization display only; swap math never reads it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickData {
    pub initialized: bool,
    pub liquidity_net: i128,
    pub liquidity_gross: u128,
    pub liquidity_borrowed: u128,
    pub fee_growth_outside_a: u128,
    pub fee_growth_outside_b: u128,
}

/// An immutable page of contiguous tick slots starting at `start_tick_index`.
///
/// Slot `i` corresponds to tick `start_tick_index + i * tick_spacing`. The
/// page length must equal the configured tick-array size; this is validated
/// when a sequence is built.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickArrayData {
    pub start_tick_index: i32,
    pub ticks: Vec<TickData>,
}

impl TickArrayData {
    pub fn new(start_tick_index: i32, ticks: Vec<TickData>) -> Self {
        Self {
            start_tick_index,
            ticks,
        }
    }

    /// Page of fully uninitialized slots, useful for tests and for callers
    /// backfilling gaps in fetched state.
    pub fn uninitialized(start_tick_index: i32, size: usize) -> Self {
        Self {
            start_tick_index,
            ticks: vec![TickData::default(); size],
        }
    }
}

/// Snapshot of the pool fields the engine prices against.
///
/// `sqrt_price` is Q64.64 and must equal the sqrt price of
/// `tick_current_index` up to rounding; the owning caller is responsible for
/// freshness.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolState {
    pub tick_current_index: i32,
    pub sqrt_price: u128,
    pub liquidity: u128,
    pub tick_spacing: u16,
    /// Fee rate in parts per million (out of 1_000_000).
    pub fee_rate: u32,
    pub token_mint_a: MintAddress,
    pub token_mint_b: MintAddress,
}

/// Where a position's tick range sits relative to the pool's current tick.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    /// `tick_upper_index <= tick_current_index`
    BelowRange,
    InRange,
    /// `tick_lower_index > tick_current_index`
    AboveRange,
}

/// Classify a tick range against the current tick.
#[inline]
pub fn position_status(tick_current_index: i32, tick_lower_index: i32, tick_upper_index: i32) -> PositionStatus {
    if tick_upper_index <= tick_current_index {
        PositionStatus::BelowRange
    } else if tick_lower_index > tick_current_index {
        PositionStatus::AboveRange
    } else {
        PositionStatus::InRange
    }
}

/// Result of one swap simulation.
///
/// `amount_in` is gross (fee-inclusive); `amount_out` is what the trader
/// receives. `tick_arrays_touched` lists the start indices of every page the
/// walk visited, in travel order, for the caller's accounts list.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SwapQuote {
    pub amount_in: u64,
    pub amount_out: u64,
    pub next_tick_index: i32,
    pub next_sqrt_price: u128,
    pub total_fee_amount: u64,
    pub tick_arrays_touched: Vec<i32>,
}

/// Result of sizing a position increase from a fixed input deposit.
///
/// The `token_est_*` fields are re-derived from the granted liquidity and are
/// authoritative; `token_max_*` add the caller's slippage headroom.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IncreaseLiquidityQuote {
    pub liquidity_amount: u128,
    pub token_est_a: u64,
    pub token_est_b: u64,
    pub token_max_a: u64,
    pub token_max_b: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_below_range() {
        // range entirely at or under the current tick
        assert_eq!(position_status(100, 50, 80), PositionStatus::BelowRange);
        assert_eq!(position_status(100, 50, 100), PositionStatus::BelowRange);
    }

    #[test]
    fn classification_above_range() {
        assert_eq!(position_status(100, 120, 150), PositionStatus::AboveRange);
        assert_eq!(position_status(100, 101, 150), PositionStatus::AboveRange);
    }

    #[test]
    fn classification_in_range() {
        assert_eq!(position_status(100, 80, 120), PositionStatus::InRange);
        assert_eq!(position_status(100, 100, 101), PositionStatus::InRange);
    }
}
