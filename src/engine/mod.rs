// Simulation drivers built on the math kernels.

pub mod liquidity_quote;
pub mod swap;
pub mod tick_array;
