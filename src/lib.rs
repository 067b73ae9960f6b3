// lib.rs - Library exports for integration tests

pub mod config;
pub mod engine;
pub mod error;
pub mod math;
pub mod models;

pub use config::EngineConfig;
pub use error::CoreError;
pub use models::{
    IncreaseLiquidityQuote, MintAddress, PoolState, PositionStatus, SwapQuote, TickArrayData,
    TickData,
};
