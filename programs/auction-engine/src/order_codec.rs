//! Packs `(user_id, buy_amount, sell_amount)` into a single 256-bit order
//! key and defines the total order used throughout the book (§4.1).

use anchor_lang::prelude::*;
use primitive_types::U256;
use std::convert::TryFrom;

use crate::errors::AuctionError;

/// A 96-bit unsigned amount, stored in a `u128` so ordinary arithmetic
/// stays in native registers; construction enforces the 96-bit bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Amount96(u128);

impl Amount96 {
    pub const MAX: u128 = (1u128 << 96) - 1;

    pub fn new(value: u128) -> Result<Self> {
        require!(value <= Self::MAX, AuctionError::OverflowOrNarrowing);
        Ok(Self(value))
    }

    pub fn get(self) -> u128 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn as_u256(self) -> U256 {
        U256::from(self.0)
    }

    /// Narrow a `U256` to an `Amount96`, failing on overflow.
    pub fn from_u256(value: U256) -> Result<Self> {
        require!(value <= U256::from(Self::MAX), AuctionError::OverflowOrNarrowing);
        Ok(Self(value.as_u128()))
    }
}

impl TryFrom<u128> for Amount96 {
    type Error = anchor_lang::error::Error;

    fn try_from(value: u128) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A 256-bit order key: `user_id` in the high 64 bits, `buy_amount` in the
/// middle 96 bits, `sell_amount` in the low 96 bits. Wraps `U256` so it can
/// round-trip through Anchor/Borsh as a fixed 32-byte big-endian buffer,
/// the same way upstream order-book math wraps foreign big-integer types
/// that don't natively derive the traits we need.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OrderKey(pub U256);

impl OrderKey {
    /// All-zero sentinel: the head of every book.
    pub const QUEUE_START: OrderKey = OrderKey(U256::zero());
    /// Sentinel valued `1`: the tail of every book.
    pub const QUEUE_END: OrderKey = OrderKey(U256([1, 0, 0, 0]));

    pub fn encode(user_id: u64, buy_amount: Amount96, sell_amount: Amount96) -> Self {
        let mut value = U256::from(user_id);
        value = value << 192;
        value |= buy_amount.as_u256() << 96;
        value |= sell_amount.as_u256();
        OrderKey(value)
    }

    /// Decodes the three fields back out, or `None` for either sentinel.
    pub fn decode(self) -> Option<(u64, Amount96, Amount96)> {
        if self == Self::QUEUE_START || self == Self::QUEUE_END {
            return None;
        }
        let mask96 = (U256::from(1u64) << 96) - U256::from(1u64);
        let sell_amount = self.0 & mask96;
        let buy_amount = (self.0 >> 96) & mask96;
        let user_id = (self.0 >> 192).as_u64();
        Some((
            user_id,
            Amount96(buy_amount.as_u128()),
            Amount96(sell_amount.as_u128()),
        ))
    }

    pub fn is_sentinel(self) -> bool {
        self == Self::QUEUE_START || self == Self::QUEUE_END
    }

    pub fn user_id(self) -> Option<u64> {
        self.decode().map(|(u, _, _)| u)
    }

    pub fn sell_amount(self) -> Option<Amount96> {
        self.decode().map(|(_, _, s)| s)
    }

    pub fn buy_amount(self) -> Option<Amount96> {
        self.decode().map(|(_, b, _)| b)
    }
}

/// Strict total order on order keys: better limit price first, ties broken
/// by larger `sell_amount`, then ascending `user_id`. `QUEUE_START` sorts
/// below and `QUEUE_END` sorts above every real key.
pub fn smaller_than(a: OrderKey, b: OrderKey) -> bool {
    if a == b {
        return false;
    }
    if a == OrderKey::QUEUE_START {
        return true;
    }
    if b == OrderKey::QUEUE_START {
        return false;
    }
    if b == OrderKey::QUEUE_END {
        return a != OrderKey::QUEUE_END;
    }
    if a == OrderKey::QUEUE_END {
        return false;
    }

    let (user_a, buy_a, sell_a) = a.decode().expect("a is a real key");
    let (user_b, buy_b, sell_b) = b.decode().expect("b is a real key");

    // a.buy/a.sell > b.buy/b.sell  <=>  a.buy * b.sell > b.buy * a.sell
    let lhs = buy_a.as_u256() * sell_b.as_u256();
    let rhs = buy_b.as_u256() * sell_a.as_u256();

    if lhs != rhs {
        return lhs > rhs;
    }
    if sell_a != sell_b {
        return sell_a > sell_b;
    }
    user_a < user_b
}

impl AnchorSerialize for OrderKey {
    fn serialize<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut buf = [0u8; 32];
        self.0.to_big_endian(&mut buf);
        writer.write_all(&buf)
    }
}

impl AnchorDeserialize for OrderKey {
    fn deserialize_reader<R: std::io::Read>(reader: &mut R) -> std::io::Result<Self> {
        let mut buf = [0u8; 32];
        reader.read_exact(&mut buf)?;
        Ok(OrderKey(U256::from_big_endian(&buf)))
    }
}

impl OrderKey {
    pub const SIZE: usize = 32;
}
