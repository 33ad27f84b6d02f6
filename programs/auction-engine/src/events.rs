use anchor_lang::prelude::*;

use crate::order_codec::OrderKey;

#[event]
pub struct NewAuction {
    pub auction_id: u64,
    pub auction: Pubkey,
    pub seller: Pubkey,
    pub offered_mint: Pubkey,
    pub bidding_mint: Pubkey,
    pub offered_amount: u128,
    pub min_buy: u128,
    pub order_cancellation_end: i64,
    pub auction_end: i64,
}

#[event]
pub struct NewSellOrder {
    pub auction_id: u64,
    pub user_id: u64,
    pub buy_amount: u128,
    pub sell_amount: u128,
}

#[event]
pub struct CancellationSellOrder {
    pub auction_id: u64,
    pub user_id: u64,
    pub buy_amount: u128,
    pub sell_amount: u128,
}

#[event]
pub struct NewUser {
    pub user_id: u64,
    pub address: Pubkey,
}

#[event]
pub struct UserRegistration {
    pub user_id: u64,
    pub address: Pubkey,
}

#[event]
pub struct AuctionCleared {
    pub auction_id: u64,
    pub num: u128,
    pub den: u128,
}

#[event]
pub struct ClaimedFromOrder {
    pub auction_id: u64,
    pub user_id: u64,
    pub buy_amount: u128,
    pub sell_amount: u128,
}

/// Decomposes a key into the fields every order-related event carries, or
/// `(0, 0, 0)` for a sentinel (only reached by defensive callers).
pub fn order_event_fields(key: OrderKey) -> (u64, u128, u128) {
    match key.decode() {
        Some((user_id, buy, sell)) => (user_id, buy.get(), sell.get()),
        None => (0, 0, 0),
    }
}
