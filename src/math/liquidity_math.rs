// Liquidity <-> token-amount math, Q64.64.
// -----------------------------------------
// Every formula here widens into U256 before multiplying and narrows back at
// the very end, so intermediate products never silently wrap. Rounding
// direction always favors the pool: token amounts owed to the pool round up,
// token amounts paid out round down, and sqrt-price movement rounds toward
// the direction that yields the trader less.

use primitive_types::U256;

use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::models::{position_status, PositionStatus};

const Q64_RESOLUTION: u32 = 64;
const BPS_DENOMINATOR: u64 = 10_000;

#[inline]
fn div_round_up(n: U256, d: U256) -> Result<U256, CoreError> {
    if d.is_zero() {
        return Err(CoreError::ArithmeticOverflow);
    }
    let q = n / d;
    if (n % d).is_zero() {
        Ok(q)
    } else {
        Ok(q + U256::one())
    }
}

#[inline]
fn to_u64(v: U256) -> Result<u64, CoreError> {
    if v > U256::from(u64::MAX) {
        return Err(CoreError::ArithmeticOverflow);
    }
    Ok(v.as_u64())
}

#[inline]
fn to_u128(v: U256) -> Result<u128, CoreError> {
    if v > U256::from(u128::MAX) {
        return Err(CoreError::LiquidityOverflow);
    }
    Ok(v.as_u128())
}

#[inline]
fn order_sqrt_prices(sqrt_price_1: u128, sqrt_price_2: u128) -> (u128, u128) {
    if sqrt_price_1 < sqrt_price_2 {
        (sqrt_price_1, sqrt_price_2)
    } else {
        (sqrt_price_2, sqrt_price_1)
    }
}

// ------------------------------ token deltas ------------------------------

/// Token A owed for `liquidity` over a sqrt-price interval:
/// `L * (sqrt_upper - sqrt_lower) / (sqrt_upper * sqrt_lower)`, in Q64.64.
pub fn try_get_amount_delta_a(
    sqrt_price_1: u128,
    sqrt_price_2: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64, CoreError> {
    let (lower, upper) = order_sqrt_prices(sqrt_price_1, sqrt_price_2);
    let diff = U256::from(upper - lower);

    let numerator = (U256::from(liquidity) * diff) << Q64_RESOLUTION;
    let denominator = U256::from(lower) * U256::from(upper);

    let quotient = if round_up {
        div_round_up(numerator, denominator)?
    } else {
        numerator / denominator
    };
    to_u64(quotient)
}

/// Token B owed for `liquidity` over a sqrt-price interval:
/// `L * (sqrt_upper - sqrt_lower)`, shifted back out of Q64.64.
pub fn try_get_amount_delta_b(
    sqrt_price_1: u128,
    sqrt_price_2: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64, CoreError> {
    let (lower, upper) = order_sqrt_prices(sqrt_price_1, sqrt_price_2);
    let product = U256::from(liquidity) * U256::from(upper - lower);

    let low_bits_set = !(product & U256::from(u64::MAX)).is_zero();
    let mut quotient = product >> Q64_RESOLUTION;
    if round_up && low_bits_set {
        quotient += U256::one();
    }
    to_u64(quotient)
}

/// Liquidity granted by a token A deposit over a sqrt-price interval.
/// Deposit sizing passes `round_up = false` so the grant never exceeds what
/// the deposit funds.
pub fn try_get_liquidity_from_a(
    amount_a: u64,
    sqrt_price_1: u128,
    sqrt_price_2: u128,
    round_up: bool,
) -> Result<u128, CoreError> {
    let (lower, upper) = order_sqrt_prices(sqrt_price_1, sqrt_price_2);
    if lower == upper {
        return Err(CoreError::ArithmeticOverflow);
    }
    let price_product = (U256::from(lower) * U256::from(upper)) >> Q64_RESOLUTION;
    let numerator = U256::from(amount_a) * price_product;
    let denominator = U256::from(upper - lower);
    let quotient = if round_up {
        div_round_up(numerator, denominator)?
    } else {
        numerator / denominator
    };
    to_u128(quotient)
}

/// Liquidity granted by a token B deposit over a sqrt-price interval.
pub fn try_get_liquidity_from_b(
    amount_b: u64,
    sqrt_price_1: u128,
    sqrt_price_2: u128,
    round_up: bool,
) -> Result<u128, CoreError> {
    let (lower, upper) = order_sqrt_prices(sqrt_price_1, sqrt_price_2);
    if lower == upper {
        return Err(CoreError::ArithmeticOverflow);
    }
    let numerator = U256::from(amount_b) << Q64_RESOLUTION;
    let denominator = U256::from(upper - lower);
    let quotient = if round_up {
        div_round_up(numerator, denominator)?
    } else {
        numerator / denominator
    };
    to_u128(quotient)
}

// --------------------------- position valuation ---------------------------

/// Token amounts represented by `liquidity` over `[tick_lower, tick_upper)`
/// given the pool's current position relative to the range.
///
/// Below range the value is entirely token A, above range entirely token B,
/// and in range it splits at the current sqrt price. `round_up` selects
/// deposit semantics (amounts owed to the pool); pass `false` for withdrawal
/// estimates, which must never promise more than the pool holds.
pub fn try_get_token_amounts_from_liquidity(
    liquidity: u128,
    current_sqrt_price: u128,
    lower_sqrt_price: u128,
    upper_sqrt_price: u128,
    tick_current_index: i32,
    tick_lower_index: i32,
    tick_upper_index: i32,
    round_up: bool,
) -> Result<(u64, u64), CoreError> {
    match position_status(tick_current_index, tick_lower_index, tick_upper_index) {
        PositionStatus::BelowRange => {
            let amount_a =
                try_get_amount_delta_a(lower_sqrt_price, upper_sqrt_price, liquidity, round_up)?;
            Ok((amount_a, 0))
        }
        PositionStatus::AboveRange => {
            let amount_b =
                try_get_amount_delta_b(lower_sqrt_price, upper_sqrt_price, liquidity, round_up)?;
            Ok((0, amount_b))
        }
        PositionStatus::InRange => {
            let amount_a =
                try_get_amount_delta_a(lower_sqrt_price, current_sqrt_price, liquidity, round_up)?;
            let amount_b =
                try_get_amount_delta_b(current_sqrt_price, upper_sqrt_price, liquidity, round_up)?;
            Ok((amount_a, amount_b))
        }
    }
}

// --------------------------- sqrt price movement ---------------------------

/// Next sqrt price after trading `amount` of token A against `liquidity`.
///
/// `(L * p << 64) / (L << 64 -/+ amount * p)`, rounded up. Token A in pushes
/// the price down (`+` in the denominator); token A out pulls it up.
pub fn try_get_next_sqrt_price_from_a(
    current_sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    specified_input: bool,
) -> Result<u128, CoreError> {
    if amount == 0 {
        return Ok(current_sqrt_price);
    }
    let p = U256::from(current_sqrt_price);
    let numerator = (U256::from(liquidity) * p) << Q64_RESOLUTION;
    let liquidity_shifted = U256::from(liquidity) << Q64_RESOLUTION;
    let product = U256::from(amount) * p;

    let denominator = if specified_input {
        liquidity_shifted + product
    } else {
        if liquidity_shifted <= product {
            return Err(CoreError::SqrtPriceOutOfBounds);
        }
        liquidity_shifted - product
    };

    let quotient = div_round_up(numerator, denominator)?;
    to_u128(quotient).map_err(|_| CoreError::SqrtPriceOutOfBounds)
}

/// Next sqrt price after trading `amount` of token B against `liquidity`.
///
/// `p +/- (amount << 64) / L`. Token B in pushes the price up (delta rounds
/// down); token B out pulls it down (delta rounds up).
pub fn try_get_next_sqrt_price_from_b(
    current_sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    specified_input: bool,
) -> Result<u128, CoreError> {
    if amount == 0 {
        return Ok(current_sqrt_price);
    }
    if liquidity == 0 {
        return Err(CoreError::ArithmeticOverflow);
    }
    let numerator = U256::from(amount) << Q64_RESOLUTION;
    let liquidity = U256::from(liquidity);

    if specified_input {
        let delta = numerator / liquidity;
        to_u128(U256::from(current_sqrt_price) + delta)
            .map_err(|_| CoreError::SqrtPriceOutOfBounds)
    } else {
        let delta = to_u128(div_round_up(numerator, liquidity)?)
            .map_err(|_| CoreError::SqrtPriceOutOfBounds)?;
        current_sqrt_price
            .checked_sub(delta)
            .ok_or(CoreError::SqrtPriceOutOfBounds)
    }
}

// --------------------------------- fees ---------------------------------

/// Net amount left to trade after deducting the swap fee from a gross input.
/// Rounds the fee up (net down).
pub fn try_apply_swap_fee(config: &EngineConfig, amount: u64, fee_rate: u32) -> Result<u64, CoreError> {
    let denominator = config.fee_rate_denominator as u128;
    if fee_rate as u128 >= denominator {
        return Err(CoreError::ArithmeticOverflow);
    }
    let net = (amount as u128 * (denominator - fee_rate as u128)) / denominator;
    Ok(net as u64)
}

/// Gross input required so that the net after fees equals `amount`.
/// Rounds up; the trader pays at least enough to cover the fee.
pub fn try_reverse_apply_swap_fee(
    config: &EngineConfig,
    amount: u64,
    fee_rate: u32,
) -> Result<u64, CoreError> {
    let denominator = config.fee_rate_denominator as u128;
    let net_denominator = denominator - fee_rate as u128;
    if net_denominator == 0 {
        return Err(CoreError::ArithmeticOverflow);
    }
    let numerator = amount as u128 * denominator;
    let mut gross = numerator / net_denominator;
    if numerator % net_denominator != 0 {
        gross += 1;
    }
    if gross > u64::MAX as u128 {
        return Err(CoreError::ArithmeticOverflow);
    }
    Ok(gross as u64)
}

// ------------------------------- slippage -------------------------------

/// Widen or tighten a token estimate by a tolerance in basis points.
///
/// The maximum bound rounds up and the minimum bound rounds down, so the
/// interval always contains the estimate.
pub fn adjust_for_slippage(amount: u64, tolerance_bps: u16, adjust_up: bool) -> Result<u64, CoreError> {
    let amount = amount as u128;
    let bps = tolerance_bps as u128;
    let denominator = BPS_DENOMINATOR as u128;
    if adjust_up {
        let numerator = amount * (denominator + bps);
        let mut bound = numerator / denominator;
        if numerator % denominator != 0 {
            bound += 1;
        }
        if bound > u64::MAX as u128 {
            return Err(CoreError::ArithmeticOverflow);
        }
        Ok(bound as u64)
    } else {
        if bps >= denominator {
            return Ok(0);
        }
        Ok((amount * (denominator - bps) / denominator) as u64)
    }
}

// --------------------------------- tests ---------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::tick_index_to_sqrt_price;

    fn cfg() -> EngineConfig {
        EngineConfig::clad()
    }

    #[test]
    fn amount_delta_a_rounding() {
        let lower = tick_index_to_sqrt_price(-100).unwrap();
        let upper = tick_index_to_sqrt_price(100).unwrap();
        let down = try_get_amount_delta_a(lower, upper, 1_000_000_000, false).unwrap();
        let up = try_get_amount_delta_a(lower, upper, 1_000_000_000, true).unwrap();
        assert!(up == down || up == down + 1);
        assert!(down > 0);
    }

    #[test]
    fn amount_delta_b_rounding() {
        let lower = tick_index_to_sqrt_price(-100).unwrap();
        let upper = tick_index_to_sqrt_price(100).unwrap();
        let down = try_get_amount_delta_b(lower, upper, 1_000_000_000, false).unwrap();
        let up = try_get_amount_delta_b(lower, upper, 1_000_000_000, true).unwrap();
        assert!(up == down || up == down + 1);
        assert!(down > 0);
    }

    #[test]
    fn zero_liquidity_yields_zero_deltas() {
        let lower = tick_index_to_sqrt_price(-10).unwrap();
        let upper = tick_index_to_sqrt_price(10).unwrap();
        assert_eq!(try_get_amount_delta_a(lower, upper, 0, true).unwrap(), 0);
        assert_eq!(try_get_amount_delta_b(lower, upper, 0, true).unwrap(), 0);
    }

    #[test]
    fn liquidity_grant_is_conservative_for_a() {
        let lower = tick_index_to_sqrt_price(-1000).unwrap();
        let upper = tick_index_to_sqrt_price(1000).unwrap();
        let amount_a = 5_000_000u64;
        let liquidity = try_get_liquidity_from_a(amount_a, lower, upper, false).unwrap();
        // Redeeming the grant (rounding owed amounts up) never needs more
        // tokens than were deposited.
        let owed = try_get_amount_delta_a(lower, upper, liquidity, true).unwrap();
        assert!(owed <= amount_a);
        assert!(owed + 2 >= amount_a, "grant too lossy: {owed} vs {amount_a}");
    }

    #[test]
    fn liquidity_grant_is_conservative_for_b() {
        let lower = tick_index_to_sqrt_price(-1000).unwrap();
        let upper = tick_index_to_sqrt_price(1000).unwrap();
        let amount_b = 5_000_000u64;
        let liquidity = try_get_liquidity_from_b(amount_b, lower, upper, false).unwrap();
        let owed = try_get_amount_delta_b(lower, upper, liquidity, true).unwrap();
        assert!(owed <= amount_b);
        assert!(owed + 2 >= amount_b);
    }

    #[test]
    fn liquidity_grant_rounding_differs_by_at_most_one() {
        let lower = tick_index_to_sqrt_price(-1000).unwrap();
        let upper = tick_index_to_sqrt_price(1000).unwrap();
        for amount in [1u64, 999, 5_000_000] {
            let a_down = try_get_liquidity_from_a(amount, lower, upper, false).unwrap();
            let a_up = try_get_liquidity_from_a(amount, lower, upper, true).unwrap();
            assert!(a_up == a_down || a_up == a_down + 1);

            let b_down = try_get_liquidity_from_b(amount, lower, upper, false).unwrap();
            let b_up = try_get_liquidity_from_b(amount, lower, upper, true).unwrap();
            assert!(b_up == b_down || b_up == b_down + 1);
        }
    }

    #[test]
    fn degenerate_interval_is_rejected() {
        let p = tick_index_to_sqrt_price(0).unwrap();
        assert!(try_get_liquidity_from_a(1, p, p, false).is_err());
        assert!(try_get_liquidity_from_b(1, p, p, false).is_err());
    }

    #[test]
    fn token_split_by_position_status() {
        let lower = tick_index_to_sqrt_price(-100).unwrap();
        let upper = tick_index_to_sqrt_price(100).unwrap();
        let liquidity = 1_000_000_000u128;

        // range below the current tick: valued entirely in token A
        let cur = tick_index_to_sqrt_price(200).unwrap();
        let (a, b) =
            try_get_token_amounts_from_liquidity(liquidity, cur, lower, upper, 200, -100, 100, false)
                .unwrap();
        assert!(a > 0);
        assert_eq!(b, 0);

        // range above the current tick: valued entirely in token B
        let cur = tick_index_to_sqrt_price(-200).unwrap();
        let (a, b) =
            try_get_token_amounts_from_liquidity(liquidity, cur, lower, upper, -200, -100, 100, false)
                .unwrap();
        assert_eq!(a, 0);
        assert!(b > 0);

        // in range: both sides
        let cur = tick_index_to_sqrt_price(0).unwrap();
        let (a, b) =
            try_get_token_amounts_from_liquidity(liquidity, cur, lower, upper, 0, -100, 100, false)
                .unwrap();
        assert!(a > 0 && b > 0);
    }

    #[test]
    fn a_input_moves_price_down() {
        let p = tick_index_to_sqrt_price(0).unwrap();
        let next = try_get_next_sqrt_price_from_a(p, 1_000_000_000, 1_000, true).unwrap();
        assert!(next < p);
    }

    #[test]
    fn a_output_moves_price_up() {
        let p = tick_index_to_sqrt_price(0).unwrap();
        let next = try_get_next_sqrt_price_from_a(p, 1_000_000_000, 1_000, false).unwrap();
        assert!(next > p);
    }

    #[test]
    fn b_input_moves_price_up() {
        let p = tick_index_to_sqrt_price(0).unwrap();
        let next = try_get_next_sqrt_price_from_b(p, 1_000_000_000, 1_000, true).unwrap();
        assert!(next > p);
    }

    #[test]
    fn b_output_moves_price_down() {
        let p = tick_index_to_sqrt_price(0).unwrap();
        let next = try_get_next_sqrt_price_from_b(p, 1_000_000_000, 1_000, false).unwrap();
        assert!(next < p);
    }

    #[test]
    fn zero_amount_leaves_price_unchanged() {
        let p = tick_index_to_sqrt_price(123).unwrap();
        assert_eq!(try_get_next_sqrt_price_from_a(p, 1_000, 0, true).unwrap(), p);
        assert_eq!(try_get_next_sqrt_price_from_b(p, 1_000, 0, false).unwrap(), p);
    }

    #[test]
    fn b_output_exceeding_price_range_is_rejected() {
        let p = crate::config::MIN_SQRT_PRICE + 1;
        assert_eq!(
            try_get_next_sqrt_price_from_b(p, 1, u64::MAX, false),
            Err(CoreError::SqrtPriceOutOfBounds)
        );
    }

    #[test]
    fn swap_fee_round_trip() {
        let config = cfg();
        // 0.3% fee
        let net = try_apply_swap_fee(&config, 1_000_000, 3000).unwrap();
        assert_eq!(net, 997_000);
        let gross = try_reverse_apply_swap_fee(&config, net, 3000).unwrap();
        assert_eq!(gross, 1_000_000);
    }

    #[test]
    fn reverse_fee_rounds_up() {
        let config = cfg();
        let gross = try_reverse_apply_swap_fee(&config, 997, 3000).unwrap();
        // 997 / 0.997 = 1000 exactly; 998 / 0.997 rounds up
        assert_eq!(gross, 1000);
        assert_eq!(try_reverse_apply_swap_fee(&config, 998, 3000).unwrap(), 1002);
    }

    #[test]
    fn slippage_bounds_bracket_the_estimate() {
        let max = adjust_for_slippage(1_000_000, 100, true).unwrap();
        let min = adjust_for_slippage(1_000_000, 100, false).unwrap();
        assert_eq!(max, 1_010_000);
        assert_eq!(min, 990_000);
        // rounding directions
        assert_eq!(adjust_for_slippage(999, 1, true).unwrap(), 1000);
        assert_eq!(adjust_for_slippage(999, 1, false).unwrap(), 998);
    }
}
