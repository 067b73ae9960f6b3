// Swap simulation: walk the tick-indexed curve segment by segment.
// ----------------------------------------------------------------
// Each step trades against constant liquidity up to the nearer of the next
// initialized tick and the caller's sqrt-price limit, deducts the input-side
// fee before the curve formula, then crosses the tick (applying its
// liquidity_net) and continues. Running out of supplied tick arrays ends the
// swap normally with whatever was filled; only structurally broken input is
// an error.

use log::debug;

use crate::config::EngineConfig;
use crate::engine::tick_array::TickArraySequence;
use crate::error::CoreError;
use crate::math::liquidity_math::{
    try_apply_swap_fee, try_get_amount_delta_a, try_get_amount_delta_b,
    try_get_next_sqrt_price_from_a, try_get_next_sqrt_price_from_b, try_reverse_apply_swap_fee,
};
use crate::math::tick_math::{sqrt_price_to_tick_index, tick_index_to_sqrt_price};
use crate::models::{MintAddress, PoolState, SwapQuote, TickArrayData};

/// One constant-liquidity segment of the walk. `amount_in` is net of fees;
/// `fee_amount` is the input-side fee charged on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct SwapStep {
    amount_in: u64,
    amount_out: u64,
    next_sqrt_price: u128,
    fee_amount: u64,
}

/// Simulate a swap against a pool snapshot and its tick-array pages.
///
/// `token_amount` is the fixed side: gross input when
/// `amount_specified_is_input`, desired output otherwise. A
/// `sqrt_price_limit` of zero selects the travel direction's extreme bound.
/// The quote's `amount_in` is gross (fee-inclusive).
pub fn simulate_swap(
    config: &EngineConfig,
    pool: &PoolState,
    sequence: &TickArraySequence,
    token_amount: u64,
    sqrt_price_limit: u128,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> Result<SwapQuote, CoreError> {
    let sqrt_price_limit = if sqrt_price_limit == 0 {
        if a_to_b {
            config.min_sqrt_price
        } else {
            config.max_sqrt_price
        }
    } else {
        sqrt_price_limit
    };
    if !(config.min_sqrt_price..=config.max_sqrt_price).contains(&sqrt_price_limit) {
        return Err(CoreError::SqrtPriceOutOfBounds);
    }
    if (a_to_b && sqrt_price_limit >= pool.sqrt_price)
        || (!a_to_b && sqrt_price_limit <= pool.sqrt_price)
    {
        return Err(CoreError::InvalidSqrtPriceLimitDirection);
    }
    if token_amount == 0 {
        return Err(CoreError::ZeroTradableAmount);
    }
    if !sequence.is_valid_tick_array_0(pool.tick_current_index) {
        return Err(CoreError::InvalidTickArraySequence);
    }

    let mut amount_remaining = token_amount;
    let mut amount_in_total: u64 = 0;
    let mut amount_out_total: u64 = 0;
    let mut fee_total: u64 = 0;
    let mut current_sqrt_price = pool.sqrt_price;
    let mut current_tick = pool.tick_current_index;
    let mut current_liquidity = pool.liquidity;

    while amount_remaining > 0 && current_sqrt_price != sqrt_price_limit {
        let next_initialized = sequence.next_initialized_tick_index(current_tick)?;

        // Target for this segment: the next initialized tick, or the edge of
        // the supplied pages when none remains, clamped to the limit.
        let (target_tick, crossing) = match next_initialized {
            Some((tick, data)) => (tick, Some(data)),
            None => (sequence.last_covered_tick_index(), None),
        };
        let target_tick_sqrt_price = tick_index_to_sqrt_price(target_tick)?;
        let target_sqrt_price = if crossing.is_none() && target_tick_sqrt_price == current_sqrt_price
        {
            // The pages' edge sits exactly at the current price (a swap
            // starting on a page boundary). The walk still owes one bounded
            // step toward the limit before it stops.
            sqrt_price_limit
        } else if a_to_b {
            target_tick_sqrt_price.max(sqrt_price_limit)
        } else {
            target_tick_sqrt_price.min(sqrt_price_limit)
        };

        let step = if target_sqrt_price == current_sqrt_price {
            SwapStep {
                next_sqrt_price: current_sqrt_price,
                ..Default::default()
            }
        } else {
            compute_swap_step(
                config,
                amount_remaining,
                pool.fee_rate,
                current_liquidity,
                current_sqrt_price,
                target_sqrt_price,
                a_to_b,
                amount_specified_is_input,
            )?
        };

        let gross_in = step
            .amount_in
            .checked_add(step.fee_amount)
            .ok_or(CoreError::ArithmeticOverflow)?;
        amount_in_total = amount_in_total
            .checked_add(gross_in)
            .ok_or(CoreError::ArithmeticOverflow)?;
        amount_out_total = amount_out_total
            .checked_add(step.amount_out)
            .ok_or(CoreError::ArithmeticOverflow)?;
        fee_total = fee_total
            .checked_add(step.fee_amount)
            .ok_or(CoreError::ArithmeticOverflow)?;
        if amount_specified_is_input {
            amount_remaining = amount_remaining
                .checked_sub(gross_in)
                .ok_or(CoreError::ArithmeticOverflow)?;
        } else {
            amount_remaining = amount_remaining
                .checked_sub(step.amount_out)
                .ok_or(CoreError::ArithmeticOverflow)?;
        }

        current_sqrt_price = step.next_sqrt_price;

        match crossing {
            Some(data) if current_sqrt_price == target_tick_sqrt_price => {
                // Crossing downward leaves the tick's range, so its net
                // contribution is removed; upward enters it.
                let net = if a_to_b {
                    data.liquidity_net.checked_neg().ok_or(CoreError::LiquidityOverflow)?
                } else {
                    data.liquidity_net
                };
                current_liquidity = if net >= 0 {
                    current_liquidity
                        .checked_add(net as u128)
                        .ok_or(CoreError::LiquidityOverflow)?
                } else {
                    current_liquidity
                        .checked_sub(net.unsigned_abs())
                        .ok_or(CoreError::LiquidityOverflow)?
                };
                current_tick = if a_to_b { target_tick - 1 } else { target_tick };
                debug!(
                    "crossed tick {target_tick}, liquidity now {current_liquidity}"
                );
            }
            Some(_) => {
                // Stopped short of the tick (limit or amount exhausted).
                current_tick = sqrt_price_to_tick_index(current_sqrt_price)?;
            }
            None => {
                // Final bounded step to the edge of the supplied pages.
                current_tick = sqrt_price_to_tick_index(current_sqrt_price)?;
                break;
            }
        }
    }

    let tick_arrays_touched = sequence.touched_arrays(
        pool.tick_current_index,
        current_tick,
        config.max_swap_tick_arrays,
    )?;

    debug!(
        "swap simulated: in={amount_in_total} out={amount_out_total} fee={fee_total} \
         sqrt_price {}->{current_sqrt_price}",
        pool.sqrt_price
    );

    Ok(SwapQuote {
        amount_in: amount_in_total,
        amount_out: amount_out_total,
        next_tick_index: current_tick,
        next_sqrt_price: current_sqrt_price,
        total_fee_amount: fee_total,
        tick_arrays_touched,
    })
}

/// Quote a swap of a fixed gross input, failing if the resulting output is
/// below `other_amount_threshold`.
pub fn swap_quote_by_input_token(
    config: &EngineConfig,
    pool: &PoolState,
    tick_arrays: Vec<TickArrayData>,
    input_token_mint: MintAddress,
    token_in: u64,
    other_amount_threshold: u64,
) -> Result<SwapQuote, CoreError> {
    let a_to_b = input_token_direction(pool, input_token_mint)?;
    let sequence = TickArraySequence::new(config, tick_arrays, pool.tick_spacing, a_to_b)?;
    let quote = simulate_swap(config, pool, &sequence, token_in, 0, true, a_to_b)?;
    if quote.amount_out < other_amount_threshold {
        return Err(CoreError::SlippageToleranceExceeded);
    }
    Ok(quote)
}

/// Quote a swap for a fixed desired output, failing if the required gross
/// input exceeds `other_amount_threshold`.
pub fn swap_quote_by_output_token(
    config: &EngineConfig,
    pool: &PoolState,
    tick_arrays: Vec<TickArrayData>,
    output_token_mint: MintAddress,
    token_out: u64,
    other_amount_threshold: u64,
) -> Result<SwapQuote, CoreError> {
    // Receiving token B means the price travels a-to-b and vice versa.
    let a_to_b = !input_token_direction(pool, output_token_mint)?;
    let sequence = TickArraySequence::new(config, tick_arrays, pool.tick_spacing, a_to_b)?;
    let quote = simulate_swap(config, pool, &sequence, token_out, 0, false, a_to_b)?;
    if quote.amount_in > other_amount_threshold {
        return Err(CoreError::SlippageToleranceExceeded);
    }
    Ok(quote)
}

fn input_token_direction(pool: &PoolState, mint: MintAddress) -> Result<bool, CoreError> {
    if mint == pool.token_mint_a {
        Ok(true)
    } else if mint == pool.token_mint_b {
        Ok(false)
    } else {
        Err(CoreError::InvalidInputTokenMint)
    }
}

/// Trade against constant liquidity from `current_sqrt_price` toward
/// `target_sqrt_price`, bounded by `amount_remaining`.
#[allow(clippy::too_many_arguments)]
fn compute_swap_step(
    config: &EngineConfig,
    amount_remaining: u64,
    fee_rate: u32,
    liquidity: u128,
    current_sqrt_price: u128,
    target_sqrt_price: u128,
    a_to_b: bool,
    specified_input: bool,
) -> Result<SwapStep, CoreError> {
    // Fixed-side amount for the full segment. Overflowing u64 here only
    // means "more than any trade could consume"; the partial branch below
    // handles it.
    let initial_fixed_delta = get_amount_fixed_delta(
        current_sqrt_price,
        target_sqrt_price,
        liquidity,
        a_to_b,
        specified_input,
    );

    let amount_calculated = if specified_input {
        try_apply_swap_fee(config, amount_remaining, fee_rate)?
    } else {
        amount_remaining
    };

    let full_step = match initial_fixed_delta {
        Ok(fixed) => fixed <= amount_calculated,
        Err(CoreError::ArithmeticOverflow) => false,
        Err(e) => return Err(e),
    };

    let next_sqrt_price = if full_step {
        target_sqrt_price
    } else {
        get_next_sqrt_price(
            current_sqrt_price,
            liquidity,
            amount_calculated,
            a_to_b,
            specified_input,
        )?
    };

    let is_max_swap = next_sqrt_price == target_sqrt_price;

    let amount_unfixed = get_amount_unfixed_delta(
        current_sqrt_price,
        next_sqrt_price,
        liquidity,
        a_to_b,
        specified_input,
    )?;

    // Exact fixed-side amount for the movement actually taken.
    let amount_fixed = match initial_fixed_delta {
        Ok(fixed) if is_max_swap => fixed,
        _ => get_amount_fixed_delta(
            current_sqrt_price,
            next_sqrt_price,
            liquidity,
            a_to_b,
            specified_input,
        )?,
    };

    let (amount_in, mut amount_out) = if specified_input {
        (amount_fixed, amount_unfixed)
    } else {
        (amount_unfixed, amount_fixed)
    };

    // Rounding may owe the trader a hair more than requested; never pay it.
    if !specified_input && amount_out > amount_remaining {
        amount_out = amount_remaining;
    }

    let fee_amount = if specified_input && !is_max_swap {
        // Partial step consumes the entire remaining gross amount.
        amount_remaining - amount_in
    } else {
        let gross = try_reverse_apply_swap_fee(config, amount_in, fee_rate)?;
        gross - amount_in
    };

    Ok(SwapStep {
        amount_in,
        amount_out,
        next_sqrt_price,
        fee_amount,
    })
}

fn get_amount_fixed_delta(
    current_sqrt_price: u128,
    target_sqrt_price: u128,
    liquidity: u128,
    a_to_b: bool,
    specified_input: bool,
) -> Result<u64, CoreError> {
    if a_to_b == specified_input {
        try_get_amount_delta_a(current_sqrt_price, target_sqrt_price, liquidity, specified_input)
    } else {
        try_get_amount_delta_b(current_sqrt_price, target_sqrt_price, liquidity, specified_input)
    }
}

fn get_amount_unfixed_delta(
    current_sqrt_price: u128,
    target_sqrt_price: u128,
    liquidity: u128,
    a_to_b: bool,
    specified_input: bool,
) -> Result<u64, CoreError> {
    if a_to_b == specified_input {
        try_get_amount_delta_b(current_sqrt_price, target_sqrt_price, liquidity, !specified_input)
    } else {
        try_get_amount_delta_a(current_sqrt_price, target_sqrt_price, liquidity, !specified_input)
    }
}

fn get_next_sqrt_price(
    current_sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    a_to_b: bool,
    specified_input: bool,
) -> Result<u128, CoreError> {
    if a_to_b == specified_input {
        try_get_next_sqrt_price_from_a(current_sqrt_price, liquidity, amount, specified_input)
    } else {
        try_get_next_sqrt_price_from_b(current_sqrt_price, liquidity, amount, specified_input)
    }
}
