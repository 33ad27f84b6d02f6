use anchor_lang::prelude::*;

#[error_code]
pub enum AuctionError {
    #[msg("operation not allowed in the auction's current phase")]
    WrongPhase,

    #[msg("order is invalid: zero amount, worse than the seller's floor, or below the minimum bid")]
    InvalidOrder,

    #[msg("an order with this key already exists in the book")]
    DuplicateOrder,

    #[msg("hint is not a valid predecessor for this key")]
    BadHint,

    #[msg("caller does not own this order")]
    NotOwner,

    #[msg("arithmetic overflow or narrowing failure")]
    OverflowOrNarrowing,

    #[msg("precompute walk hit the end of the book or crossed the clearing point")]
    PrecomputeTooFar,

    #[msg("candidate clearing price rejected")]
    PriceRejected,

    #[msg("order has already been claimed or removed")]
    AlreadyClaimed,

    #[msg("caller is not authorized to change fee parameters")]
    UnauthorizedFeeChange,

    #[msg("fee numerator exceeds the maximum of 15 (1.5%)")]
    FeeTooHigh,
}
