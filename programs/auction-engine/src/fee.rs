//! Global fee parameters and the fee payout computed at settlement (§4.5).

use anchor_lang::prelude::*;
use primitive_types::U256;

use crate::errors::AuctionError;
use crate::order_codec::Amount96;
use crate::state::{AuctionState, GlobalConfig};

/// Validates and applies a new fee numerator/receiver. Caller must already
/// be checked against `global.authority` by the instruction's account
/// constraints; `receiver_user_id` is resolved via `UserDirectory` by the
/// caller before this runs.
pub fn set_fee(global: &mut GlobalConfig, numerator: u16, receiver_user_id: u64) -> Result<()> {
    require!(
        numerator <= GlobalConfig::MAX_FEE_NUMERATOR,
        AuctionError::FeeTooHigh
    );
    global.fee_numerator = numerator;
    global.fee_receiver_user_id = receiver_user_id;
    Ok(())
}

/// Amounts owed to the fee receiver and clawed back from the seller's
/// share, derived from the auction's (already-committed) clearing outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FeePayout {
    pub receiver_amount: Amount96,
    pub seller_refund: Amount96,
}

/// Computes the fee split for a cleared, funded auction. Returns the
/// all-zero payout if there is nothing to collect (`fee_numerator == 0`),
/// matching the "no-op push" convention in `ledger.rs`. Must only be
/// called after `verify_price` and before `settle_seller`, since it reads
/// `initial_order`/`clearing_order` before the former is zeroed.
pub fn claim_fees(auction: &AuctionState) -> Result<FeePayout> {
    if auction.funding_threshold_not_reached || auction.fee_numerator == 0 {
        return Ok(FeePayout::default());
    }

    let (_, seller_buy, offered_sell) = auction
        .initial_order
        .decode()
        .ok_or(AuctionError::AlreadyClaimed)?;
    let s = offered_sell.get();

    let fee_base = U256::from(s) * U256::from(auction.fee_numerator)
        / U256::from(GlobalConfig::FEE_DENOMINATOR);

    let (_, num, den) = auction
        .clearing_order
        .decode()
        .ok_or(AuctionError::WrongPhase)?;
    let is_case_2 = U256::from(num.get()) * U256::from(seller_buy.get())
        == U256::from(den.get()) * U256::from(s);

    if is_case_2 {
        let sold = s
            .checked_sub(auction.volume_clearing_price_order)
            .ok_or(AuctionError::OverflowOrNarrowing)?;
        let unsold = auction.volume_clearing_price_order;
        let receiver_u256 = fee_base * U256::from(sold) / U256::from(s);
        let refund_u256 = fee_base * U256::from(unsold) / U256::from(s);
        Ok(FeePayout {
            receiver_amount: Amount96::from_u256(receiver_u256)?,
            seller_refund: Amount96::from_u256(refund_u256)?,
        })
    } else {
        Ok(FeePayout {
            receiver_amount: Amount96::from_u256(fee_base)?,
            seller_refund: Amount96::new(0)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order_codec::OrderKey;

    fn amt(v: u128) -> Amount96 {
        Amount96::new(v).unwrap()
    }

    fn key(user: u64, buy: u128, sell: u128) -> OrderKey {
        OrderKey::encode(user, amt(buy), amt(sell))
    }

    fn auction_with(
        seller_buy: u128,
        offered: u128,
        clearing_num: u128,
        clearing_den: u128,
        volume: u128,
        fee_numerator: u16,
    ) -> AuctionState {
        AuctionState {
            auction_id: 0,
            seller: Pubkey::default(),
            offered_mint: Pubkey::default(),
            bidding_mint: Pubkey::default(),
            offered_vault: Pubkey::default(),
            bidding_vault: Pubkey::default(),
            order_cancellation_end: 0,
            auction_end: 0,
            initial_order: key(1, seller_buy, offered),
            min_bid_sell_amount: 1,
            min_funding_threshold: 0,
            interim_order: OrderKey::QUEUE_START,
            interim_sum_bid: 0,
            clearing_order: OrderKey::encode(9, amt(clearing_num), amt(clearing_den)),
            volume_clearing_price_order: volume,
            fee_numerator,
            fee_denominator: GlobalConfig::FEE_DENOMINATOR,
            funding_threshold_not_reached: false,
            bump: 0,
            offered_vault_bump: 0,
            bidding_vault_bump: 0,
        }
    }

    #[test]
    fn zero_numerator_collects_nothing() {
        let auction = auction_with(1, 1, 1000, 1000, 1000, 0);
        let payout = claim_fees(&auction).unwrap();
        assert_eq!(payout.receiver_amount.get(), 0);
        assert_eq!(payout.seller_refund.get(), 0);
    }

    /// S5: Case 2 (seller partial) splits the fee between receiver and
    /// seller in proportion to sold vs. unsold offered asset.
    #[test]
    fn s5_fee_split_on_case_2() {
        // seller floor == clearing price exactly -> Case 2 per detection rule
        let auction = auction_with(1000, 1000, 1, 1, 300, 15);
        let payout = claim_fees(&auction).unwrap();
        // fee_base = 1000 * 15 / 1000 = 15; sold = 700, unsold = 300
        // receiver = 15 * 700 / 1000 = 10 (truncated)
        // refund   = 15 * 300 / 1000 = 4 (truncated independently; 1 atom
        // of fee_base is neither paid out nor refunded)
        assert_eq!(payout.receiver_amount.get(), 10);
        assert_eq!(payout.seller_refund.get(), 4);
    }

    #[test]
    fn full_fee_on_non_case_2() {
        // num*seller_buy != den*s -> not Case 2, full fee to receiver
        let auction = auction_with(100, 1000, 2, 1, 1000, 15);
        let payout = claim_fees(&auction).unwrap();
        assert_eq!(payout.receiver_amount.get(), 15);
        assert_eq!(payout.seller_refund.get(), 0);
    }

    #[test]
    fn set_fee_rejects_above_max() {
        let mut global = GlobalConfig {
            auction_counter: 0,
            fee_numerator: 0,
            fee_denominator: GlobalConfig::FEE_DENOMINATOR,
            fee_receiver_user_id: 0,
            authority: Pubkey::default(),
            bump: 0,
        };
        assert!(set_fee(&mut global, 16, 1).is_err());
        assert!(set_fee(&mut global, 15, 1).is_ok());
        assert_eq!(global.fee_numerator, 15);
    }
}
