// Property tests for the fixed-point kernels.

use proptest::prelude::*;

use clad_quote::config::{MAX_TICK_INDEX, MIN_TICK_INDEX};
use clad_quote::math::liquidity_math::{
    adjust_for_slippage, try_apply_swap_fee, try_get_amount_delta_a, try_get_amount_delta_b,
    try_get_next_sqrt_price_from_a, try_get_next_sqrt_price_from_b, try_reverse_apply_swap_fee,
};
use clad_quote::math::tick_math::{sqrt_price_to_tick_index, tick_index_to_sqrt_price};
use clad_quote::EngineConfig;

proptest! {
    #[test]
    fn tick_round_trips_through_sqrt_price(tick in MIN_TICK_INDEX..=MAX_TICK_INDEX) {
        let sqrt_price = tick_index_to_sqrt_price(tick).unwrap();
        prop_assert_eq!(sqrt_price_to_tick_index(sqrt_price).unwrap(), tick);
    }

    #[test]
    fn sqrt_price_is_strictly_monotone(
        t1 in MIN_TICK_INDEX..MAX_TICK_INDEX,
        step in 1i32..1000,
    ) {
        let t2 = (t1 + step).min(MAX_TICK_INDEX);
        let p1 = tick_index_to_sqrt_price(t1).unwrap();
        let p2 = tick_index_to_sqrt_price(t2).unwrap();
        prop_assert!(p1 < p2);
    }

    #[test]
    fn inverse_conversion_floors(
        tick in MIN_TICK_INDEX..MAX_TICK_INDEX,
        bump in 1u128..1_000_000,
    ) {
        // any price strictly between two tick boundaries maps to the lower tick
        let p = tick_index_to_sqrt_price(tick).unwrap();
        let p_next = tick_index_to_sqrt_price(tick + 1).unwrap();
        let between = p + bump % (p_next - p);
        prop_assert_eq!(sqrt_price_to_tick_index(between).unwrap(), tick);
    }

    #[test]
    fn delta_rounding_differs_by_at_most_one(
        t1 in -50_000i32..50_000,
        width in 1i32..1000,
        liquidity in 1u128..=u64::MAX as u128,
    ) {
        let t2 = t1 + width;
        let lower = tick_index_to_sqrt_price(t1).unwrap();
        let upper = tick_index_to_sqrt_price(t2).unwrap();

        let a_down = try_get_amount_delta_a(lower, upper, liquidity, false).unwrap();
        let a_up = try_get_amount_delta_a(lower, upper, liquidity, true).unwrap();
        prop_assert!(a_up == a_down || a_up == a_down + 1);

        let b_down = try_get_amount_delta_b(lower, upper, liquidity, false).unwrap();
        let b_up = try_get_amount_delta_b(lower, upper, liquidity, true).unwrap();
        prop_assert!(b_up == b_down || b_up == b_down + 1);
    }

    #[test]
    fn fee_application_is_conservative(
        amount in 0u64..=u64::MAX / 2,
        fee_rate in 0u32..100_000,
    ) {
        let config = EngineConfig::clad();
        let net = try_apply_swap_fee(&config, amount, fee_rate).unwrap();
        prop_assert!(net <= amount);

        // reversing the net never reconstructs more than the original gross,
        // and re-applying the fee to the reversed gross covers the net
        let gross = try_reverse_apply_swap_fee(&config, net, fee_rate).unwrap();
        prop_assert!(gross <= amount);
        prop_assert!(try_apply_swap_fee(&config, gross, fee_rate).unwrap() >= net);
    }

    #[test]
    fn slippage_bounds_bracket_the_amount(
        amount in 0u64..=u64::MAX / 2,
        bps in 0u16..10_000,
    ) {
        let max = adjust_for_slippage(amount, bps, true).unwrap();
        let min = adjust_for_slippage(amount, bps, false).unwrap();
        prop_assert!(min <= amount);
        prop_assert!(max >= amount);
    }

    #[test]
    fn price_moves_against_the_input_token(
        tick in -100_000i32..100_000,
        liquidity in 1_000_000u128..=u64::MAX as u128,
        amount in 1u64..=1_000_000_000,
    ) {
        let p = tick_index_to_sqrt_price(tick).unwrap();
        // token A in: price down; token B in: price up
        let down = try_get_next_sqrt_price_from_a(p, liquidity, amount, true).unwrap();
        prop_assert!(down <= p);
        let up = try_get_next_sqrt_price_from_b(p, liquidity, amount, true).unwrap();
        prop_assert!(up > p);
    }

    #[test]
    fn larger_inputs_move_the_price_further(
        tick in -100_000i32..100_000,
        liquidity in 1_000_000_000u128..=u64::MAX as u128,
        amount in 1u64..=1_000_000_000,
    ) {
        let p = tick_index_to_sqrt_price(tick).unwrap();
        let near = try_get_next_sqrt_price_from_b(p, liquidity, amount, true).unwrap();
        let far = try_get_next_sqrt_price_from_b(p, liquidity, amount.saturating_mul(2), true).unwrap();
        prop_assert!(far >= near);
    }
}
