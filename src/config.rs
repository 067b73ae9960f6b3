/// The minimum usable tick index. Must match the on-chain program bit-for-bit.
pub const MIN_TICK_INDEX: i32 = -443636;

/// The maximum usable tick index. Must match the on-chain program bit-for-bit.
pub const MAX_TICK_INDEX: i32 = 443636;

/// sqrt price at `MIN_TICK_INDEX`, Q64.64.
pub const MIN_SQRT_PRICE: u128 = 4295048016;

/// sqrt price at `MAX_TICK_INDEX`, Q64.64.
pub const MAX_SQRT_PRICE: u128 = 79226673515401279992447579055;

/// Number of tick slots in one tick-array page.
pub const TICK_ARRAY_SIZE: usize = 88;

/// Maximum number of tick-array pages a single swap may touch.
pub const MAX_SWAP_TICK_ARRAYS: usize = 3;

/// Fee rates are expressed in parts per million of this value.
pub const FEE_RATE_DENOMINATOR: u32 = 1_000_000;

/// Protocol constants threaded explicitly through every engine entry point.
///
/// The defaults reproduce the compiled values of the CLAD program; a mismatch
/// with the on-chain program is a silent correctness bug, not something the
/// engine can detect at runtime. The tick-math exponentiation tables embed
/// their constants at compile time and are not configuration-driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub tick_array_size: usize,
    pub max_swap_tick_arrays: usize,
    pub fee_rate_denominator: u32,
    pub min_tick_index: i32,
    pub max_tick_index: i32,
    pub min_sqrt_price: u128,
    pub max_sqrt_price: u128,
}

impl EngineConfig {
    pub const fn clad() -> Self {
        Self {
            tick_array_size: TICK_ARRAY_SIZE,
            max_swap_tick_arrays: MAX_SWAP_TICK_ARRAYS,
            fee_rate_denominator: FEE_RATE_DENOMINATOR,
            min_tick_index: MIN_TICK_INDEX,
            max_tick_index: MAX_TICK_INDEX,
            min_sqrt_price: MIN_SQRT_PRICE,
            max_sqrt_price: MAX_SQRT_PRICE,
        }
    }

    /// Number of ticks covered by one page at the given spacing.
    #[inline]
    pub fn ticks_per_array(&self, tick_spacing: u16) -> i32 {
        self.tick_array_size as i32 * tick_spacing as i32
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::clad()
    }
}
