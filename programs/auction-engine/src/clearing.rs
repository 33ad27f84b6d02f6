//! The two-phase uniform-price solver and settlement accounting (§4.4).
//! Every function here is pure with respect to token movement — it only
//! reads and writes `AuctionState`/`OrderedOrderSet` fields. Callers in
//! `lib.rs` drive the actual SPL Token CPIs from the amounts returned here,
//! the same split the teacher keeps between `matching::validate_price_match`
//! (pure, unit-tested) and the `#[program]` handlers that invoke it.

use anchor_lang::prelude::*;
use primitive_types::U256;

use crate::errors::AuctionError;
use crate::order_codec::{smaller_than, Amount96, OrderKey};
use crate::order_set::OrderedOrderSet;
use crate::state::AuctionState;

/// Advances the interim walk by `steps` positions, accumulating
/// `sell_amount` into `interim_sum_bid`. Fails if the walk runs off the end
/// of the book or overshoots the point where demand no longer exceeds what
/// the seller's supply could satisfy at the last visited order's price.
pub fn precompute_sum(auction: &mut AuctionState, book: &OrderedOrderSet, steps: u32) -> Result<()> {
    require!(!auction.is_cleared(), AuctionError::WrongPhase);

    let (_, _, offered_sell) = auction
        .initial_order
        .decode()
        .ok_or(AuctionError::WrongPhase)?;

    let mut cursor = auction.interim_order;
    let mut sum = auction.interim_sum_bid;
    let mut last = None;

    for _ in 0..steps {
        let next = book.next(cursor).ok_or(AuctionError::PrecomputeTooFar)?;
        require!(next != OrderKey::QUEUE_END, AuctionError::PrecomputeTooFar);
        let sell = next.sell_amount().ok_or(AuctionError::PrecomputeTooFar)?;
        sum = sum
            .checked_add(sell.get())
            .ok_or(AuctionError::OverflowOrNarrowing)?;
        cursor = next;
        last = Some(next);
    }

    if let Some(last_visited) = last {
        let (_, buy_i, sell_i) = last_visited
            .decode()
            .ok_or(AuctionError::PrecomputeTooFar)?;
        let lhs = U256::from(sum) * U256::from(buy_i.get());
        let rhs = U256::from(offered_sell.get()) * U256::from(sell_i.get());
        require!(lhs < rhs, AuctionError::PrecomputeTooFar);
    }

    auction.interim_order = cursor;
    auction.interim_sum_bid = sum;
    Ok(())
}

/// Resumes the interim walk against a candidate clearing key and, on
/// success, commits `clearing_order` / `volume_clearing_price_order` /
/// `funding_threshold_not_reached` into `auction`. Does not move any
/// tokens — `lib.rs` drives fee collection and `settle_seller` afterward.
pub fn verify_price(auction: &mut AuctionState, book: &OrderedOrderSet, candidate: OrderKey) -> Result<()> {
    require!(!auction.is_cleared(), AuctionError::WrongPhase);
    require!(!candidate.is_sentinel(), AuctionError::PriceRejected);

    let (seller_user_id, seller_buy, offered_sell) = auction
        .initial_order
        .decode()
        .ok_or(AuctionError::WrongPhase)?;
    let s = offered_sell.get();
    let s_u256 = U256::from(s);

    let (_, num, den) = candidate.decode().ok_or(AuctionError::PriceRejected)?;
    require!(!den.is_zero(), AuctionError::PriceRejected);

    let mut cursor = auction.interim_order;
    let mut sum_bid = auction.interim_sum_bid;
    let mut stopped_on_candidate = false;
    loop {
        let next = book.next(cursor).ok_or(AuctionError::PriceRejected)?;
        if next == candidate {
            stopped_on_candidate = true;
            break;
        }
        if next == OrderKey::QUEUE_END || !smaller_than(next, candidate) {
            break;
        }
        let sell = next.sell_amount().ok_or(AuctionError::PriceRejected)?;
        sum_bid = sum_bid
            .checked_add(sell.get())
            .ok_or(AuctionError::OverflowOrNarrowing)?;
        cursor = next;
    }

    let sum_buy_u256 = U256::from(sum_bid) * U256::from(num.get()) / U256::from(den.get());

    let (final_sum_buy, clearing_order, volume) = if stopped_on_candidate {
        // Case 1: `p` is an existing bid; it becomes the partial fill.
        require!(sum_buy_u256 <= s_u256, AuctionError::PriceRejected);
        let clearing_order_buy = s_u256 - sum_buy_u256;
        let v_u256 = clearing_order_buy * U256::from(den.get()) / U256::from(num.get());
        let v = Amount96::from_u256(v_u256)?;
        let p_sell = candidate.sell_amount().ok_or(AuctionError::PriceRejected)?;
        require!(v.get() <= p_sell.get(), AuctionError::PriceRejected);
        let final_sum_buy = sum_buy_u256 + v_u256;
        (final_sum_buy, candidate, v.get())
    } else if sum_buy_u256 < s_u256 {
        // Case 2: candidate is synthetic and demand falls short of supply;
        // it must equal the seller's own floor price exactly.
        let lhs = U256::from(num.get()) * U256::from(seller_buy.get());
        let rhs = s_u256 * U256::from(den.get());
        require!(lhs == rhs, AuctionError::PriceRejected);
        let clearing_order = OrderKey::encode(seller_user_id, num, den);
        let v = Amount96::from_u256(sum_buy_u256)?;
        (sum_buy_u256, clearing_order, v.get())
    } else if sum_buy_u256 == s_u256 {
        // Case 3: candidate is synthetic and demand exactly matches supply.
        let lhs = U256::from(num.get()) * U256::from(seller_buy.get());
        let rhs = s_u256 * U256::from(den.get());
        require!(lhs <= rhs, AuctionError::PriceRejected);
        (s_u256, candidate, s)
    } else {
        return Err(AuctionError::PriceRejected.into());
    };

    auction.interim_order = cursor;
    auction.interim_sum_bid = sum_bid;
    auction.clearing_order = clearing_order;
    auction.volume_clearing_price_order = volume;
    auction.funding_threshold_not_reached = final_sum_buy < U256::from(auction.min_funding_threshold);

    Ok(())
}

/// Amounts owed to the seller once the auction has cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SellerPayout {
    pub offered_amount: Amount96,
    pub bidding_amount: Amount96,
}

/// Reads the seller's payout from the clearing outcome and zeroes
/// `initial_order` so this can only run once. Must run after
/// [`verify_price`] and after fee collection has been applied by the
/// caller (fee amounts are carved out of the seller's offered-asset share
/// before this is invoked in the Case-2 branch — see `fee.rs`).
pub fn settle_seller(auction: &mut AuctionState) -> Result<SellerPayout> {
    require!(auction.is_cleared(), AuctionError::WrongPhase);
    let (_, seller_buy, s) = auction
        .initial_order
        .decode()
        .ok_or(AuctionError::AlreadyClaimed)?;
    auction.initial_order = OrderKey::QUEUE_START;

    if auction.funding_threshold_not_reached {
        return Ok(SellerPayout {
            offered_amount: s,
            bidding_amount: Amount96::new(0)?,
        });
    }

    let (_, num, den) = auction
        .clearing_order
        .decode()
        .ok_or(AuctionError::WrongPhase)?;
    let is_case_2 = U256::from(num.get()) * U256::from(seller_buy.get())
        == U256::from(den.get()) * U256::from(s.get());

    if is_case_2 {
        let offered_remaining = s
            .get()
            .checked_sub(auction.volume_clearing_price_order)
            .ok_or(AuctionError::OverflowOrNarrowing)?;
        let bidding_u256 =
            U256::from(auction.volume_clearing_price_order) * U256::from(den.get()) / U256::from(num.get());
        Ok(SellerPayout {
            offered_amount: Amount96::new(offered_remaining)?,
            bidding_amount: Amount96::from_u256(bidding_u256)?,
        })
    } else {
        let bidding_u256 = U256::from(s.get()) * U256::from(den.get()) / U256::from(num.get());
        Ok(SellerPayout {
            offered_amount: Amount96::new(0)?,
            bidding_amount: Amount96::from_u256(bidding_u256)?,
        })
    }
}

/// Amounts owed to a single bidder claiming a single order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticipantPayout {
    pub offered_amount: Amount96,
    pub bidding_amount: Amount96,
}

/// Settles and hard-removes a single order owned by `caller_user_id`.
pub fn claim_participant(
    auction: &AuctionState,
    book: &mut OrderedOrderSet,
    order: OrderKey,
    caller_user_id: u64,
) -> Result<ParticipantPayout> {
    require!(auction.is_cleared(), AuctionError::WrongPhase);
    let (user_id, _, sell_amount) = order.decode().ok_or(AuctionError::AlreadyClaimed)?;
    require!(user_id == caller_user_id, AuctionError::NotOwner);
    require!(book.remove(order), AuctionError::AlreadyClaimed);

    if auction.funding_threshold_not_reached {
        return Ok(ParticipantPayout {
            offered_amount: Amount96::new(0)?,
            bidding_amount: sell_amount,
        });
    }

    let (_, num, den) = auction
        .clearing_order
        .decode()
        .ok_or(AuctionError::WrongPhase)?;

    if order == auction.clearing_order {
        let offered_u256 =
            U256::from(auction.volume_clearing_price_order) * U256::from(num.get()) / U256::from(den.get());
        let refund = sell_amount
            .get()
            .checked_sub(auction.volume_clearing_price_order)
            .ok_or(AuctionError::OverflowOrNarrowing)?;
        Ok(ParticipantPayout {
            offered_amount: Amount96::from_u256(offered_u256)?,
            bidding_amount: Amount96::new(refund)?,
        })
    } else if smaller_than(order, auction.clearing_order) {
        let offered_u256 = U256::from(sell_amount.get()) * U256::from(num.get()) / U256::from(den.get());
        Ok(ParticipantPayout {
            offered_amount: Amount96::from_u256(offered_u256)?,
            bidding_amount: Amount96::new(0)?,
        })
    } else {
        Ok(ParticipantPayout {
            offered_amount: Amount96::new(0)?,
            bidding_amount: sell_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(v: u128) -> Amount96 {
        Amount96::new(v).unwrap()
    }

    fn key(user: u64, buy: u128, sell: u128) -> OrderKey {
        OrderKey::encode(user, amt(buy), amt(sell))
    }

    fn fresh_auction(seller: u64, min_buy: u128, offered: u128, threshold: u128) -> AuctionState {
        AuctionState {
            auction_id: 0,
            seller: Pubkey::default(),
            offered_mint: Pubkey::default(),
            bidding_mint: Pubkey::default(),
            offered_vault: Pubkey::default(),
            bidding_vault: Pubkey::default(),
            order_cancellation_end: 0,
            auction_end: 0,
            initial_order: key(seller, min_buy, offered),
            min_bid_sell_amount: 1,
            min_funding_threshold: threshold,
            interim_order: OrderKey::QUEUE_START,
            interim_sum_bid: 0,
            clearing_order: OrderKey::QUEUE_START,
            volume_clearing_price_order: 0,
            fee_numerator: 0,
            fee_denominator: 1000,
            funding_threshold_not_reached: false,
            bump: 0,
            offered_vault_bump: 0,
            bidding_vault_bump: 0,
        }
    }

    /// S1: two bids strictly above the candidate price, whose combined
    /// sell_amount exactly covers the supply — Case 3, nothing partial.
    #[test]
    fn s1_case_3_no_partial() {
        let mut auction = fresh_auction(1, 100, 1000, 0);
        let mut book = OrderedOrderSet::new();
        let b1 = key(2, 700, 600); // price 1.1667, sell 600
        let b2 = key(3, 500, 400); // price 1.25, sell 400
        assert!(book.insert(b1, OrderKey::QUEUE_START));
        assert!(book.insert(b2, OrderKey::QUEUE_START));

        // candidate priced at exactly 1.0, worse than both real bids, kept
        // at a small sell_amount so total-order tie-breaks never apply.
        let candidate = OrderKey::encode(9, amt(1), amt(1));
        verify_price(&mut auction, &book, candidate).unwrap();

        assert_eq!(auction.clearing_order, candidate);
        assert_eq!(auction.volume_clearing_price_order, 1000);
        assert!(!auction.funding_threshold_not_reached);
    }

    /// S2: candidate is an existing bid in the book, which becomes the
    /// partial fill (Case 1).
    #[test]
    fn s2_case_1_partial_existing_bid() {
        let mut auction = fresh_auction(1, 100, 1000, 0);
        let mut book = OrderedOrderSet::new();
        let b1 = key(2, 700, 700); // price 1.0, fully filled
        let b2 = key(3, 300, 300); // price 1.0, the partial
        assert!(book.insert(b1, OrderKey::QUEUE_START));
        assert!(book.insert(b2, b1));

        verify_price(&mut auction, &book, b2).unwrap();

        assert_eq!(auction.clearing_order, b2);
        // sum_buy through b1 alone = 700; remaining S - sum_buy = 300 at
        // price 1.0 needs volume 300, which is exactly b2's sell_amount.
        assert_eq!(auction.volume_clearing_price_order, 300);
    }

    /// S3: demand falls short of supply at every real bid; the seller's
    /// own floor order is the partial fill (Case 2).
    #[test]
    fn s3_case_2_seller_partial() {
        let mut auction = fresh_auction(1, 1000, 1000, 0); // floor price 1.0
        let mut book = OrderedOrderSet::new();
        let b1 = key(2, 600, 300); // price 2.0, strictly better than floor
        assert!(book.insert(b1, OrderKey::QUEUE_START));

        // candidate at seller's floor exactly: num/den = 1000/1000 reduced.
        let candidate = OrderKey::encode(9, amt(1), amt(1));
        verify_price(&mut auction, &book, candidate).unwrap();

        assert_eq!(auction.clearing_order.user_id(), Some(1));
        assert_eq!(auction.volume_clearing_price_order, 300);

        let payout = settle_seller(&mut auction).unwrap();
        assert_eq!(payout.offered_amount.get(), 1000 - 300);
        assert_eq!(payout.bidding_amount.get(), 300);
    }

    /// S4: the cleared sum falls below the funding threshold, so the
    /// seller is refunded in full and no participant pays bidding asset.
    #[test]
    fn s4_funding_threshold_not_reached() {
        let mut auction = fresh_auction(1, 1000, 1000, 500); // threshold 500
        let mut book = OrderedOrderSet::new();
        let b1 = key(2, 600, 300); // price 2.0, sell 300 only
        assert!(book.insert(b1, OrderKey::QUEUE_START));

        let candidate = OrderKey::encode(9, amt(1), amt(1));
        verify_price(&mut auction, &book, candidate).unwrap();
        assert!(auction.funding_threshold_not_reached);

        let payout = settle_seller(&mut auction).unwrap();
        assert_eq!(payout.offered_amount.get(), 1000);
        assert_eq!(payout.bidding_amount.get(), 0);

        let participant = claim_participant(&auction, &mut book, b1, 2).unwrap();
        assert_eq!(participant.offered_amount.get(), 0);
        assert_eq!(participant.bidding_amount.get(), 300);
    }

    /// Once cleared, a second `verify_price` call is rejected outright
    /// (property 5, verify idempotence).
    #[test]
    fn verify_price_rejects_once_cleared() {
        let mut auction = fresh_auction(1, 1000, 1000, 0);
        let mut book = OrderedOrderSet::new();
        let b1 = key(2, 300, 300);
        assert!(book.insert(b1, OrderKey::QUEUE_START));
        let candidate = OrderKey::encode(9, amt(1000), amt(1000));
        verify_price(&mut auction, &book, candidate).unwrap();

        assert!(verify_price(&mut auction, &book, candidate).is_err());
    }

    /// Claiming the same order twice fails with `AlreadyClaimed`.
    #[test]
    fn claim_participant_is_single_use() {
        let mut auction = fresh_auction(1, 100, 1000, 0);
        let mut book = OrderedOrderSet::new();
        let b1 = key(2, 700, 700);
        let b2 = key(3, 300, 300);
        assert!(book.insert(b1, OrderKey::QUEUE_START));
        assert!(book.insert(b2, b1));
        verify_price(&mut auction, &book, b2).unwrap();

        assert!(claim_participant(&auction, &mut book, b1, 2).is_ok());
        assert!(claim_participant(&auction, &mut book, b1, 2).is_err());
    }

    /// A claim submitted by anyone but the order's own user is rejected.
    #[test]
    fn claim_participant_enforces_ownership() {
        let mut auction = fresh_auction(1, 100, 1000, 0);
        let mut book = OrderedOrderSet::new();
        let b1 = key(2, 700, 700);
        let b2 = key(3, 300, 300);
        assert!(book.insert(b1, OrderKey::QUEUE_START));
        assert!(book.insert(b2, b1));
        verify_price(&mut auction, &book, b2).unwrap();

        assert!(claim_participant(&auction, &mut book, b1, 3).is_err());
    }
}
