use thiserror::Error;

/// Failure modes of the quoting engine. Every error is a plain return value;
/// nothing is retried internally and nothing panics on the non-test path.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    // -------- input validation --------
    #[error("tick index outside the supported range")]
    TickOutOfBounds,
    #[error("sqrt price outside the supported range")]
    PriceOutOfBounds,
    #[error("tick index is out of bounds or not aligned to the tick spacing")]
    InvalidTickIndex,
    #[error("tradable amount must be non-zero")]
    ZeroTradableAmount,
    #[error("sqrt price limit is on the wrong side of the current price")]
    InvalidSqrtPriceLimitDirection,
    #[error("sqrt price limit outside the supported range")]
    SqrtPriceOutOfBounds,
    #[error("input token mint does not belong to the pool")]
    InvalidInputTokenMint,

    // -------- structural: the supplied tick-array snapshot set is unusable --------
    #[error("tick arrays are not contiguous in the travel direction")]
    InvalidTickArraySequence,
    #[error("tick index falls outside the supplied tick arrays")]
    TickArrayIndexOutOfBounds,
    #[error("swap touched more tick arrays than the allowed maximum")]
    TickArraySequenceInvalidIndex,

    // -------- arithmetic domain --------
    #[error("fixed-point arithmetic overflow")]
    ArithmeticOverflow,
    #[error("liquidity amount exceeds the 128-bit domain")]
    LiquidityOverflow,

    // -------- result thresholds --------
    #[error("quote violates the caller-specified amount threshold")]
    SlippageToleranceExceeded,
}
