//! Per-auction intrusive `next`-map order book (§4.2).

use anchor_lang::prelude::*;
use std::collections::HashMap;

use crate::order_codec::{smaller_than, OrderKey};

/// A map `key -> next_key` forming a singly-linked list in ascending total
/// order. The head is always reachable at `QUEUE_START`; the tail is
/// `QUEUE_END`. Tombstones (entries unlinked by [`remove_keep_history`])
/// stay in `next` so they remain usable as insertion hints.
#[derive(Clone, Debug)]
pub struct OrderedOrderSet {
    next: HashMap<OrderKey, OrderKey>,
}

impl Default for OrderedOrderSet {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderedOrderSet {
    pub fn new() -> Self {
        let mut next = HashMap::new();
        next.insert(OrderKey::QUEUE_START, OrderKey::QUEUE_END);
        Self { next }
    }

    pub fn is_empty(&self) -> bool {
        self.next.get(&OrderKey::QUEUE_START) == Some(&OrderKey::QUEUE_END)
    }

    /// Reachable from the head — tombstones return `false` here even
    /// though they remain present in the underlying map.
    pub fn contains(&self, key: OrderKey) -> bool {
        if key.is_sentinel() {
            return false;
        }
        let mut cursor = OrderKey::QUEUE_START;
        while let Some(&next) = self.next.get(&cursor) {
            if next == key {
                return true;
            }
            if next == OrderKey::QUEUE_END || !smaller_than(next, key) {
                return false;
            }
            cursor = next;
        }
        false
    }

    /// Lookup without traversal. `None` if `key` was never known to the
    /// set (neither reachable nor a tombstone).
    pub fn next(&self, key: OrderKey) -> Option<OrderKey> {
        self.next.get(&key).copied()
    }

    /// Inserts `key` after `hint`, walking forward while the hint's
    /// current successor still sorts before `key`. Returns `false` (no
    /// mutation) for sentinels, zero sell amounts, duplicates, or a hint
    /// that is strictly past the correct insertion point.
    pub fn insert(&mut self, key: OrderKey, hint: OrderKey) -> bool {
        if key.is_sentinel() {
            return false;
        }
        let Some(sell_amount) = key.sell_amount() else {
            return false;
        };
        if sell_amount.is_zero() {
            return false;
        }
        if self.contains(key) {
            return false;
        }

        // `hint` must at least be known to the map (live or tombstoned);
        // anything else is a garbage hint.
        if hint != OrderKey::QUEUE_START && !self.next.contains_key(&hint) {
            return false;
        }

        // A tombstoned hint no longer sits on the reachable chain, so
        // splicing at it directly would hang the new key off a dead
        // branch. Fall back to the head in that case: correctness over
        // the O(1) fast path, the cost lands only on reuse of a stale
        // hint rather than on every insert.
        let mut predecessor = if hint == OrderKey::QUEUE_START || self.contains(hint) {
            hint
        } else {
            OrderKey::QUEUE_START
        };

        if !smaller_than(predecessor, key) {
            return false;
        }
        let Some(mut successor) = self.next.get(&predecessor).copied() else {
            return false;
        };
        while smaller_than(successor, key) {
            predecessor = successor;
            let Some(next_successor) = self.next.get(&predecessor).copied() else {
                return false;
            };
            successor = next_successor;
        }
        if successor == key {
            // key already reachable through this path.
            return false;
        }

        self.next.insert(predecessor, key);
        self.next.insert(key, successor);
        true
    }

    /// Fully unlinks `key`: the predecessor's successor becomes `key`'s
    /// old successor, and `key` is dropped from the map entirely. Used
    /// during claim, where the key can never again serve as a hint.
    pub fn remove(&mut self, key: OrderKey) -> bool {
        let Some(successor) = self.next.get(&key).copied() else {
            return false;
        };
        let Some(predecessor) = self.find_predecessor(key) else {
            return false;
        };
        self.next.insert(predecessor, successor);
        self.next.remove(&key);
        true
    }

    /// Unlinks `key` from the reachable chain but keeps `next[key]` so the
    /// tombstone can still be offered as a hint for a later insertion.
    pub fn remove_keep_history(&mut self, key: OrderKey) -> bool {
        let Some(successor) = self.next.get(&key).copied() else {
            return false;
        };
        let Some(predecessor) = self.find_predecessor(key) else {
            return false;
        };
        self.next.insert(predecessor, successor);
        true
    }

    fn find_predecessor(&self, key: OrderKey) -> Option<OrderKey> {
        let mut cursor = OrderKey::QUEUE_START;
        loop {
            let successor = *self.next.get(&cursor)?;
            if successor == key {
                return Some(cursor);
            }
            if successor == OrderKey::QUEUE_END {
                return None;
            }
            cursor = successor;
        }
    }

    /// Iterates the reachable chain from `QUEUE_START` (exclusive) to
    /// `QUEUE_END` (exclusive), in ascending total order.
    pub fn iter_from(&self, start: OrderKey) -> impl Iterator<Item = OrderKey> + '_ {
        let mut cursor = start;
        std::iter::from_fn(move || {
            let next = *self.next.get(&cursor)?;
            if next == OrderKey::QUEUE_END {
                return None;
            }
            cursor = next;
            Some(next)
        })
    }

    fn entries_sorted(&self) -> Vec<(OrderKey, OrderKey)> {
        let mut entries: Vec<_> = self.next.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(k, _)| k.0);
        entries
    }
}

impl AnchorSerialize for OrderedOrderSet {
    fn serialize<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let entries = self.entries_sorted();
        (entries.len() as u32).serialize(writer)?;
        for (key, next) in entries {
            key.serialize(writer)?;
            next.serialize(writer)?;
        }
        Ok(())
    }
}

impl AnchorDeserialize for OrderedOrderSet {
    fn deserialize_reader<R: std::io::Read>(reader: &mut R) -> std::io::Result<Self> {
        let len = u32::deserialize_reader(reader)?;
        let mut next = HashMap::with_capacity(len as usize);
        for _ in 0..len {
            let key = OrderKey::deserialize_reader(reader)?;
            let value = OrderKey::deserialize_reader(reader)?;
            next.insert(key, value);
        }
        Ok(Self { next })
    }
}

/// On-chain space for a book holding up to `capacity` entries, including the
/// permanent `QUEUE_START` entry. Mirrors the explicit `SPACE` constants the
/// rest of this program uses for every account.
pub fn space_for_capacity(capacity: usize) -> usize {
    4 + (capacity + 1) * (OrderKey::SIZE * 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order_codec::Amount96;

    fn amt(v: u128) -> Amount96 {
        Amount96::new(v).unwrap()
    }

    fn key(user: u64, buy: u128, sell: u128) -> OrderKey {
        OrderKey::encode(user, amt(buy), amt(sell))
    }

    #[test]
    fn starts_empty() {
        let set = OrderedOrderSet::new();
        assert!(set.is_empty());
        assert_eq!(set.next(OrderKey::QUEUE_START), Some(OrderKey::QUEUE_END));
    }

    #[test]
    fn insert_maintains_order_invariant() {
        let mut set = OrderedOrderSet::new();
        let k1 = key(1, 400, 800); // price 0.5
        let k2 = key(2, 600, 600); // price 1.0, better
        let k3 = key(3, 100, 1000); // price 0.1, worse

        assert!(set.insert(k1, OrderKey::QUEUE_START));
        assert!(set.insert(k2, OrderKey::QUEUE_START));
        assert!(set.insert(k3, OrderKey::QUEUE_START));

        let order: Vec<_> = set.iter_from(OrderKey::QUEUE_START).collect();
        assert_eq!(order, vec![k2, k1, k3]);

        let mut cursor = OrderKey::QUEUE_START;
        for k in &order {
            let next = set.next(cursor).unwrap();
            assert_eq!(next, *k);
            assert!(smaller_than(cursor, next));
            cursor = next;
        }
    }

    #[test]
    fn stale_hint_still_succeeds_via_forward_walk() {
        let mut set = OrderedOrderSet::new();
        let k1 = key(1, 600, 600);
        let k2 = key(2, 500, 600);
        let k3 = key(3, 400, 600);
        assert!(set.insert(k1, OrderKey::QUEUE_START));
        // k2 belongs after k1; hint QUEUE_START is stale but still works.
        assert!(set.insert(k2, OrderKey::QUEUE_START));
        assert!(set.insert(k3, OrderKey::QUEUE_START));
        assert_eq!(
            set.iter_from(OrderKey::QUEUE_START).collect::<Vec<_>>(),
            vec![k1, k2, k3]
        );
    }

    #[test]
    fn too_late_hint_fails() {
        let mut set = OrderedOrderSet::new();
        let best = key(1, 600, 600); // price 1.0
        let worst = key(2, 100, 600); // price 0.166, the tail
        assert!(set.insert(best, OrderKey::QUEUE_START));
        assert!(set.insert(worst, OrderKey::QUEUE_START));

        // belongs between `best` and `worst`, but the hint (the tail)
        // already sorts after it.
        let between = key(3, 400, 600); // price 0.666
        assert!(!set.insert(between, worst));
    }

    #[test]
    fn duplicate_insert_fails() {
        let mut set = OrderedOrderSet::new();
        let k1 = key(1, 600, 600);
        assert!(set.insert(k1, OrderKey::QUEUE_START));
        assert!(!set.insert(k1, OrderKey::QUEUE_START));
    }

    #[test]
    fn zero_sell_amount_rejected() {
        let mut set = OrderedOrderSet::new();
        let bad = OrderKey::encode(1, amt(100), amt(0));
        assert!(!set.insert(bad, OrderKey::QUEUE_START));
    }

    #[test]
    fn remove_keep_history_leaves_tombstone_as_valid_hint() {
        let mut set = OrderedOrderSet::new();
        let k1 = key(1, 600, 600);
        let k2 = key(2, 500, 600);
        assert!(set.insert(k1, OrderKey::QUEUE_START));
        assert!(set.insert(k2, OrderKey::QUEUE_START));

        assert!(set.remove_keep_history(k1));
        assert!(!set.contains(k1));
        assert!(set.contains(k2));

        // k1 is now a tombstone: next(k1) is still defined...
        assert_eq!(set.next(k1), Some(k2));
        // ...and can be reused as an insertion hint.
        let k3 = key(3, 550, 600);
        assert!(set.insert(k3, k1));
        assert_eq!(
            set.iter_from(OrderKey::QUEUE_START).collect::<Vec<_>>(),
            vec![k3, k2]
        );
    }

    #[test]
    fn remove_drops_the_key_entirely() {
        let mut set = OrderedOrderSet::new();
        let k1 = key(1, 600, 600);
        assert!(set.insert(k1, OrderKey::QUEUE_START));
        assert!(set.remove(k1));
        assert_eq!(set.next(k1), None);
        assert!(set.is_empty());
        assert!(!set.remove(k1));
    }

    #[test]
    fn hint_tolerance_queue_start_always_works_if_any_hint_does() {
        let mut a = OrderedOrderSet::new();
        let mut b = OrderedOrderSet::new();
        let k1 = key(1, 600, 600);
        let k2 = key(2, 500, 600);
        assert!(a.insert(k1, OrderKey::QUEUE_START));
        assert!(b.insert(k1, OrderKey::QUEUE_START));

        // In `a`, use a correct non-start hint; in `b`, always use
        // QUEUE_START. Both must succeed.
        assert!(a.insert(k2, k1));
        assert!(b.insert(k2, OrderKey::QUEUE_START));
        assert_eq!(
            a.iter_from(OrderKey::QUEUE_START).collect::<Vec<_>>(),
            b.iter_from(OrderKey::QUEUE_START).collect::<Vec<_>>()
        );
    }
}
