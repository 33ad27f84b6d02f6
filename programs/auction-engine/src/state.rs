//! Persisted account layouts for global config, per-auction state, and the
//! order book (§3, §4.4). `UserDirectory`/`UserRecord` live in
//! `user_directory.rs`.

use anchor_lang::prelude::*;

use crate::order_codec::OrderKey;
use crate::order_set::OrderedOrderSet;

/// Singleton. Controls the global fee policy and hands out auction ids.
#[account]
pub struct GlobalConfig {
    pub auction_counter: u64,
    pub fee_numerator: u16,
    pub fee_denominator: u16,
    pub fee_receiver_user_id: u64,
    pub authority: Pubkey,
    pub bump: u8,
}

impl GlobalConfig {
    pub const SPACE: usize = 8 + // discriminator
        8 + // auction_counter
        2 + // fee_numerator
        2 + // fee_denominator
        8 + // fee_receiver_user_id
        32 + // authority
        1;   // bump

    pub const SEED_PREFIX: &'static [u8] = b"global_config";
    pub const MAX_FEE_NUMERATOR: u16 = 15;
    pub const FEE_DENOMINATOR: u16 = 1000;
}

/// Per-auction account. Tracks the offer, the escrow vaults, the phase
/// timestamps, and the incremental/final clearing result.
#[account]
pub struct AuctionState {
    pub auction_id: u64,
    pub seller: Pubkey,

    pub offered_mint: Pubkey,
    pub bidding_mint: Pubkey,
    pub offered_vault: Pubkey,
    pub bidding_vault: Pubkey,

    pub order_cancellation_end: i64,
    pub auction_end: i64,

    /// Encodes `(seller_user_id, min_buy, offered_amount)`. Zeroed by
    /// `settle_seller` once settlement has paid the seller out.
    pub initial_order: OrderKey,
    pub min_bid_sell_amount: u128,
    pub min_funding_threshold: u128,

    /// Walk position and running sum for the incremental precompute phase.
    pub interim_order: OrderKey,
    pub interim_sum_bid: u128,

    /// Set once `verify_price` accepts a candidate; `OrderKey::QUEUE_START`
    /// means "not yet cleared".
    pub clearing_order: OrderKey,
    pub volume_clearing_price_order: u128,

    pub fee_numerator: u16,
    pub fee_denominator: u16,
    pub funding_threshold_not_reached: bool,

    pub bump: u8,
    pub offered_vault_bump: u8,
    pub bidding_vault_bump: u8,
}

impl AuctionState {
    pub const SPACE: usize = 8 + // discriminator
        8 +  // auction_id
        32 + // seller
        32 + // offered_mint
        32 + // bidding_mint
        32 + // offered_vault
        32 + // bidding_vault
        8 +  // order_cancellation_end
        8 +  // auction_end
        OrderKey::SIZE + // initial_order
        16 + // min_bid_sell_amount
        16 + // min_funding_threshold
        OrderKey::SIZE + // interim_order
        16 + // interim_sum_bid
        OrderKey::SIZE + // clearing_order
        16 + // volume_clearing_price_order
        2 +  // fee_numerator
        2 +  // fee_denominator
        1 +  // funding_threshold_not_reached
        1 +  // bump
        1 +  // offered_vault_bump
        1;   // bidding_vault_bump

    pub const SEED_PREFIX: &'static [u8] = b"auction";

    pub fn is_cleared(&self) -> bool {
        self.clearing_order != OrderKey::QUEUE_START
    }

    pub fn cancellation_open(&self, now: i64) -> bool {
        now < self.auction_end && now < self.order_cancellation_end
    }

    pub fn placement_open(&self, now: i64) -> bool {
        now < self.auction_end
    }

    pub fn solution_open(&self, now: i64) -> bool {
        self.auction_end != 0 && now > self.auction_end && !self.is_cleared()
    }
}

/// The order book for one auction. Wraps [`OrderedOrderSet`] so it can own
/// its own PDA, sized up front for a fixed maximum number of live orders.
#[account]
pub struct OrderBookAccount {
    pub auction: Pubkey,
    pub orders: OrderedOrderSet,
    pub bump: u8,
}

impl OrderBookAccount {
    pub const SEED_PREFIX: &'static [u8] = b"order_book";

    /// Space for a book sized to hold up to `capacity` live orders plus
    /// headroom for tombstones left behind by cancellations.
    pub fn space_for_capacity(capacity: usize) -> usize {
        8 + // discriminator
        32 + // auction
        crate::order_set::space_for_capacity(capacity) +
        1 // bump
    }
}
