// Tick index <-> sqrt price conversions, Q64.64.
// ------------------------------------------------
// All price arithmetic in the engine operates on sqrt-price, never on price
// directly, so the hot path costs one multiplication instead of a square
// root. The integer path below is fully deterministic: 1.0001^tick is built
// from precomputed binary-exponentiation tables, not from pow(). Only the
// display-oriented helpers at the bottom are allowed to use floating point.

use primitive_types::U256;

use crate::config::{MAX_SQRT_PRICE, MAX_TICK_INDEX, MIN_SQRT_PRICE, MIN_TICK_INDEX};
use crate::error::CoreError;

const LOG_B_2_X32: i128 = 59543866431248i128;
const BIT_PRECISION: u32 = 14;
const LOG_B_P_ERR_MARGIN_LOWER_X64: i128 = 184467440737095516i128; // 0.01
const LOG_B_P_ERR_MARGIN_UPPER_X64: i128 = 15793534762490258745i128; // 2^-precision / log_2_b + 0.01

/// Derive the Q64.64 sqrt price for a tick index.
///
/// Monotonically increasing in `tick_index` and exactly invertible by
/// [`sqrt_price_to_tick_index`] at every tick boundary.
pub fn tick_index_to_sqrt_price(tick_index: i32) -> Result<u128, CoreError> {
    if !is_tick_index_in_bounds(tick_index) {
        return Err(CoreError::TickOutOfBounds);
    }
    if tick_index >= 0 {
        Ok(get_sqrt_price_positive_tick(tick_index))
    } else {
        Ok(get_sqrt_price_negative_tick(tick_index))
    }
}

/// Derive the greatest tick index whose sqrt price is `<=` the given value.
///
/// Uses a log2 bit approximation with a low/high estimate pair; the high
/// estimate is verified against the exact forward conversion so on-grid
/// inputs round-trip exactly.
pub fn sqrt_price_to_tick_index(sqrt_price: u128) -> Result<i32, CoreError> {
    if !(MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&sqrt_price) {
        return Err(CoreError::PriceOutOfBounds);
    }

    // Integer portion of log2(sqrt_price) from the most significant bit.
    let msb: u32 = 128 - sqrt_price.leading_zeros() - 1;
    let log2p_integer_x32 = (msb as i128 - 64) << 32;

    // Fractional portion: iterate from bit 63 (0.5 in Q64.64), appending a
    // bit whenever the squared remainder exceeds two.
    let mut bit: i128 = 0x8000_0000_0000_0000i128;
    let mut precision = 0;
    let mut log2p_fraction_x64 = 0;

    let mut r = if msb >= 64 {
        sqrt_price >> (msb - 63)
    } else {
        sqrt_price << (63 - msb)
    };

    while bit > 0 && precision < BIT_PRECISION {
        r *= r;
        let is_r_more_than_two = r >> 127_u32;
        r >>= 63 + is_r_more_than_two;
        log2p_fraction_x64 += bit * is_r_more_than_two as i128;
        bit >>= 1;
        precision += 1;
    }

    let log2p_fraction_x32 = log2p_fraction_x64 >> 32;
    let log2p_x32 = log2p_integer_x32 + log2p_fraction_x32;

    // Change of base from 2 to 1.0001.
    let logbp_x64 = log2p_x32 * LOG_B_2_X32;

    let tick_low = ((logbp_x64 - LOG_B_P_ERR_MARGIN_LOWER_X64) >> 64) as i32;
    let tick_high = ((logbp_x64 + LOG_B_P_ERR_MARGIN_UPPER_X64) >> 64) as i32;

    if tick_low == tick_high {
        return Ok(tick_low);
    }

    let actual_tick_high_sqrt_price = tick_index_to_sqrt_price(tick_high)?;
    if actual_tick_high_sqrt_price <= sqrt_price {
        Ok(tick_high)
    } else {
        Ok(tick_low)
    }
}

/// Human-readable price for a tick: `1.0001^tick * 10^(decimals_a - decimals_b)`.
///
/// Display-only; floating point is acceptable here and nowhere else.
pub fn tick_index_to_price(tick_index: i32, decimals_a: u8, decimals_b: u8) -> f64 {
    let raw = 1.0001_f64.powi(tick_index);
    raw * 10f64.powi(decimals_a as i32 - decimals_b as i32)
}

/// Nearest usable tick for a human-readable price.
///
/// Decimals are required explicitly at every call site; the result is rounded
/// to the nearest `tick_spacing` multiple and clamped to the usable range.
pub fn price_to_nearest_tick(
    price: f64,
    tick_spacing: u16,
    decimals_a: u8,
    decimals_b: u8,
) -> Result<i32, CoreError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(CoreError::PriceOutOfBounds);
    }
    let raw = price / 10f64.powi(decimals_a as i32 - decimals_b as i32);
    let tick = raw.ln() / 1.0001_f64.ln();

    let spacing = tick_spacing as f64;
    let snapped = (tick / spacing).round() * spacing;
    let snapped = snapped.clamp(MIN_TICK_INDEX as f64, MAX_TICK_INDEX as f64) as i32;

    // Clamping can land off-grid at the extremes; pull back onto the grid.
    Ok((snapped / tick_spacing as i32) * tick_spacing as i32)
}

/// First tick index of the tick-array page containing `tick_index`.
pub fn tick_array_start_tick_index(tick_index: i32, tick_spacing: u16, tick_array_size: usize) -> i32 {
    let span = tick_spacing as i32 * tick_array_size as i32;
    let real_index = tick_index.div_euclid(span);
    real_index * span
}

/// A tick is usable only at multiples of the pool's tick spacing.
#[inline]
pub fn is_tick_initializable(tick_index: i32, tick_spacing: u16) -> bool {
    tick_index % tick_spacing as i32 == 0
}

#[inline]
pub fn is_tick_index_in_bounds(tick_index: i32) -> bool {
    (MIN_TICK_INDEX..=MAX_TICK_INDEX).contains(&tick_index)
}

// --------------------------- exponentiation tables ---------------------------

#[inline]
fn mul_shift_96(n0: u128, n1: u128) -> u128 {
    let mul = U256::from(n0) * U256::from(n1);
    (mul >> 96).as_u128()
}

// Positive ticks accumulate in Q64.96 and collapse to Q64.64 at the end;
// the table holds sqrt(1.0001)^(2^k) in Q64.96.
fn get_sqrt_price_positive_tick(tick: i32) -> u128 {
    let mut ratio: u128 = if tick & 1 != 0 {
        79232123823359799118286999567
    } else {
        79228162514264337593543950336
    };

    if tick & 2 != 0 {
        ratio = mul_shift_96(ratio, 79236085330515764027303304731);
    }
    if tick & 4 != 0 {
        ratio = mul_shift_96(ratio, 79244008939048815603706035061);
    }
    if tick & 8 != 0 {
        ratio = mul_shift_96(ratio, 79259858533276714757314932305);
    }
    if tick & 16 != 0 {
        ratio = mul_shift_96(ratio, 79291567232598584799939703904);
    }
    if tick & 32 != 0 {
        ratio = mul_shift_96(ratio, 79355022692464371645785046466);
    }
    if tick & 64 != 0 {
        ratio = mul_shift_96(ratio, 79482085999252804386437311141);
    }
    if tick & 128 != 0 {
        ratio = mul_shift_96(ratio, 79736823300114093921829183326);
    }
    if tick & 256 != 0 {
        ratio = mul_shift_96(ratio, 80248749790819932309965073892);
    }
    if tick & 512 != 0 {
        ratio = mul_shift_96(ratio, 81282483887344747381513967011);
    }
    if tick & 1024 != 0 {
        ratio = mul_shift_96(ratio, 83390072131320151908154831281);
    }
    if tick & 2048 != 0 {
        ratio = mul_shift_96(ratio, 87770609709833776024991924138);
    }
    if tick & 4096 != 0 {
        ratio = mul_shift_96(ratio, 97234110755111693312479820773);
    }
    if tick & 8192 != 0 {
        ratio = mul_shift_96(ratio, 119332217159966728226237229890);
    }
    if tick & 16384 != 0 {
        ratio = mul_shift_96(ratio, 179736315981702064433883588727);
    }
    if tick & 32768 != 0 {
        ratio = mul_shift_96(ratio, 407748233172238350107850275304);
    }
    if tick & 65536 != 0 {
        ratio = mul_shift_96(ratio, 2098478828474011932436660412517);
    }
    if tick & 131072 != 0 {
        ratio = mul_shift_96(ratio, 55581415166113811149459800483533);
    }
    if tick & 262144 != 0 {
        ratio = mul_shift_96(ratio, 38992368544603139932233054999993551);
    }

    ratio >> 32
}

// Negative ticks accumulate directly in Q64.64; the table holds
// sqrt(1.0001)^-(2^k) in Q64.64.
fn get_sqrt_price_negative_tick(tick: i32) -> u128 {
    let abs_tick = tick.abs();

    let mut ratio: u128 = if abs_tick & 1 != 0 {
        18445821805675392311
    } else {
        18446744073709551616
    };

    if abs_tick & 2 != 0 {
        ratio = (ratio * 18444899583751176498) >> 64;
    }
    if abs_tick & 4 != 0 {
        ratio = (ratio * 18443055278223354162) >> 64;
    }
    if abs_tick & 8 != 0 {
        ratio = (ratio * 18439367220385604838) >> 64;
    }
    if abs_tick & 16 != 0 {
        ratio = (ratio * 18431993317065449817) >> 64;
    }
    if abs_tick & 32 != 0 {
        ratio = (ratio * 18417254355718160513) >> 64;
    }
    if abs_tick & 64 != 0 {
        ratio = (ratio * 18387811781193591352) >> 64;
    }
    if abs_tick & 128 != 0 {
        ratio = (ratio * 18329067761203520168) >> 64;
    }
    if abs_tick & 256 != 0 {
        ratio = (ratio * 18212142134806087854) >> 64;
    }
    if abs_tick & 512 != 0 {
        ratio = (ratio * 17980523815641551639) >> 64;
    }
    if abs_tick & 1024 != 0 {
        ratio = (ratio * 17526086738831147013) >> 64;
    }
    if abs_tick & 2048 != 0 {
        ratio = (ratio * 16651378430235024244) >> 64;
    }
    if abs_tick & 4096 != 0 {
        ratio = (ratio * 15030750278693429944) >> 64;
    }
    if abs_tick & 8192 != 0 {
        ratio = (ratio * 12247334978882834399) >> 64;
    }
    if abs_tick & 16384 != 0 {
        ratio = (ratio * 8131365268884726200) >> 64;
    }
    if abs_tick & 32768 != 0 {
        ratio = (ratio * 3584323654723342297) >> 64;
    }
    if abs_tick & 65536 != 0 {
        ratio = (ratio * 696457651847595233) >> 64;
    }
    if abs_tick & 131072 != 0 {
        ratio = (ratio * 26294789957452057) >> 64;
    }
    if abs_tick & 262144 != 0 {
        ratio = (ratio * 37481735321082) >> 64;
    }

    ratio
}

// ---------------------------------- tests ------------------------------------
