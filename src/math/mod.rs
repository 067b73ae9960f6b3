// Fixed-point math for the concentrated-liquidity curve.

pub mod liquidity_math;
pub mod tick_math;
