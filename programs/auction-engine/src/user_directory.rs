//! Bidirectional `user_id <-> address` directory (§4.3). Ids are allocated
//! monotonically from a global counter and are never reused or revoked.

use anchor_lang::prelude::*;

use crate::errors::AuctionError;
use crate::events::{NewUser, UserRegistration};

/// Global singleton: `addresses[id]` is the address registered for `id`.
/// The vector's length is always `num_users`.
#[account]
pub struct UserDirectory {
    pub num_users: u64,
    pub addresses: Vec<Pubkey>,
    pub bump: u8,
}

impl UserDirectory {
    pub const SEED_PREFIX: &'static [u8] = b"user_directory";

    /// Space for a directory holding up to `capacity` registered addresses.
    pub fn space_for_capacity(capacity: usize) -> usize {
        8 + // discriminator
        8 + // num_users
        4 + capacity * 32 + // addresses Vec<Pubkey>
        1 // bump
    }

    /// Looks up the address registered for `user_id`. Callers must only
    /// pass ids previously returned by [`get_or_register`], at which point
    /// this is guaranteed to succeed.
    pub fn resolve(&self, user_id: u64) -> Option<Pubkey> {
        self.addresses.get(user_id as usize).copied()
    }
}

/// Per-address PDA recording the one `user_id` assigned to that address.
/// Never closed once created — ids are permanent.
#[account]
pub struct UserRecord {
    pub address: Pubkey,
    pub user_id: u64,
    pub bump: u8,
}

impl UserRecord {
    pub const SPACE: usize = 8 + // discriminator
        32 + // address
        8 +  // user_id
        1;   // bump

    pub const SEED_PREFIX: &'static [u8] = b"user_record";
}

/// Returns the caller's `user_id`, registering a fresh one the first time
/// `record`'s PDA is created for `address` (Anchor's `init_if_needed`
/// leaves a brand-new account's fields at their default, so `address ==
/// Pubkey::default()` is how a never-before-seen record is recognized).
pub fn get_or_register(
    directory: &mut Account<UserDirectory>,
    record: &mut Account<UserRecord>,
    address: Pubkey,
    record_bump: u8,
) -> Result<u64> {
    if record.address == address {
        return Ok(record.user_id);
    }
    require!(record.address == Pubkey::default(), AuctionError::NotOwner);

    let user_id = directory.num_users;
    require!(
        user_id.checked_add(1).is_some(),
        AuctionError::OverflowOrNarrowing
    );

    record.address = address;
    record.user_id = user_id;
    record.bump = record_bump;

    directory.addresses.push(address);
    directory.num_users = user_id + 1;

    emit!(NewUser { user_id, address });
    emit!(UserRegistration { user_id, address });

    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_roundtrips_registered_addresses() {
        let addr = Pubkey::new_unique();
        let directory = UserDirectory {
            num_users: 1,
            addresses: vec![addr],
            bump: 0,
        };
        assert_eq!(directory.resolve(0), Some(addr));
        assert_eq!(directory.resolve(1), None);
    }

    #[test]
    fn space_for_capacity_accounts_for_vec_len_prefix() {
        assert_eq!(UserDirectory::space_for_capacity(0), 8 + 8 + 4 + 1);
        assert_eq!(UserDirectory::space_for_capacity(10), 8 + 8 + 4 + 320 + 1);
    }
}
