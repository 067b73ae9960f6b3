// Position-increase quoting: size a deposit of one token into a tick range.

use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::math::liquidity_math::{
    adjust_for_slippage, try_get_liquidity_from_a, try_get_liquidity_from_b,
    try_get_token_amounts_from_liquidity,
};
use crate::math::tick_math::{is_tick_initializable, tick_index_to_sqrt_price};
use crate::models::{position_status, IncreaseLiquidityQuote, MintAddress, PoolState, PositionStatus};

/// Quote the liquidity granted by depositing `input_token_amount` of one
/// pool token into `[tick_lower_index, tick_upper_index)`.
///
/// The granted liquidity rounds down; the re-derived token estimates round
/// up (they are owed to the pool) and are authoritative over the raw input.
/// When the range's current valuation has no use for the input token, the
/// quote is all zeros rather than an error.
pub fn increase_liquidity_quote_by_input_token(
    config: &EngineConfig,
    pool: &PoolState,
    input_token_mint: MintAddress,
    input_token_amount: u64,
    tick_lower_index: i32,
    tick_upper_index: i32,
    slippage_tolerance_bps: u16,
) -> Result<IncreaseLiquidityQuote, CoreError> {
    let in_bounds = |tick: i32| (config.min_tick_index..=config.max_tick_index).contains(&tick);
    if tick_lower_index >= tick_upper_index
        || !in_bounds(tick_lower_index)
        || !in_bounds(tick_upper_index)
        || !is_tick_initializable(tick_lower_index, pool.tick_spacing)
        || !is_tick_initializable(tick_upper_index, pool.tick_spacing)
    {
        return Err(CoreError::InvalidTickIndex);
    }
    let input_is_a = if input_token_mint == pool.token_mint_a {
        true
    } else if input_token_mint == pool.token_mint_b {
        false
    } else {
        return Err(CoreError::InvalidInputTokenMint);
    };

    let lower_sqrt_price = tick_index_to_sqrt_price(tick_lower_index)?;
    let upper_sqrt_price = tick_index_to_sqrt_price(tick_upper_index)?;

    let status = position_status(pool.tick_current_index, tick_lower_index, tick_upper_index);
    let liquidity = match status {
        // Range valued entirely in token A; a token B deposit buys nothing.
        PositionStatus::BelowRange => {
            if input_is_a {
                try_get_liquidity_from_a(input_token_amount, lower_sqrt_price, upper_sqrt_price, false)?
            } else {
                return Ok(IncreaseLiquidityQuote::default());
            }
        }
        // Range valued entirely in token B.
        PositionStatus::AboveRange => {
            if input_is_a {
                return Ok(IncreaseLiquidityQuote::default());
            } else {
                try_get_liquidity_from_b(input_token_amount, lower_sqrt_price, upper_sqrt_price, false)?
            }
        }
        // Both sides active; the input token sizes its own sub-interval and
        // the other side follows from the granted liquidity.
        PositionStatus::InRange => {
            if input_is_a {
                try_get_liquidity_from_a(input_token_amount, lower_sqrt_price, pool.sqrt_price, false)?
            } else {
                try_get_liquidity_from_b(input_token_amount, pool.sqrt_price, upper_sqrt_price, false)?
            }
        }
    };

    let (token_est_a, token_est_b) = try_get_token_amounts_from_liquidity(
        liquidity,
        pool.sqrt_price,
        lower_sqrt_price,
        upper_sqrt_price,
        pool.tick_current_index,
        tick_lower_index,
        tick_upper_index,
        true,
    )?;

    Ok(IncreaseLiquidityQuote {
        liquidity_amount: liquidity,
        token_est_a,
        token_est_b,
        token_max_a: adjust_for_slippage(token_est_a, slippage_tolerance_bps, true)?,
        token_max_b: adjust_for_slippage(token_est_b, slippage_tolerance_bps, true)?,
    })
}
