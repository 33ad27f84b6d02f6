//! Thin SPL Token CPI wrapper used for every deposit/payout (§4.7). Builds
//! the `Transfer` instruction by hand and calls it through
//! `invoke`/`invoke_signed`, the same raw-instruction pattern the teacher's
//! `spl_transfer` helper uses rather than pulling in the `anchor-spl` crate.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::{invoke, invoke_signed};
use std::convert::TryFrom;

use crate::errors::AuctionError;
use crate::order_codec::Amount96;

/// SPL Token program id.
pub mod spl_token {
    use anchor_lang::declare_id;
    declare_id!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
}

fn transfer_ix(
    from: &AccountInfo,
    to: &AccountInfo,
    authority: &AccountInfo,
    amount: u64,
) -> anchor_lang::solana_program::instruction::Instruction {
    anchor_lang::solana_program::instruction::Instruction {
        program_id: spl_token::ID,
        accounts: vec![
            anchor_lang::solana_program::instruction::AccountMeta::new(*from.key, false),
            anchor_lang::solana_program::instruction::AccountMeta::new(*to.key, false),
            anchor_lang::solana_program::instruction::AccountMeta::new_readonly(*authority.key, true),
        ],
        data: {
            let mut data = vec![3u8]; // SPL Token Transfer discriminator
            data.extend_from_slice(&amount.to_le_bytes());
            data
        },
    }
}

fn narrow_to_token_amount(amount: Amount96) -> Result<u64> {
    u64::try_from(amount.get()).map_err(|_| AuctionError::OverflowOrNarrowing.into())
}

/// Pulls `amount` from `from_ata` into `vault`, signed directly by the
/// order owner. Used by `initiate_auction` (seller deposit) and
/// `place_orders` (bidder deposit).
pub fn pull<'info>(
    from_ata: AccountInfo<'info>,
    vault: AccountInfo<'info>,
    owner_signer: AccountInfo<'info>,
    token_program: AccountInfo<'info>,
    amount: Amount96,
) -> Result<()> {
    let amount = narrow_to_token_amount(amount)?;
    if amount == 0 {
        return Ok(());
    }
    let ix = transfer_ix(&from_ata, &vault, &owner_signer, amount);
    invoke(&ix, &[from_ata, vault, owner_signer, token_program]).map_err(Into::into)
}

/// Pushes `amount` from `vault` to `to_ata`, signed by the auction PDA.
/// A zero amount is a no-op, matching the upstream convention that a
/// dust-free settlement leg skips the CPI entirely. Used by
/// `cancel_orders`, `claim_participant`, and seller/fee settlement.
pub fn push<'info>(
    vault: AccountInfo<'info>,
    to_ata: AccountInfo<'info>,
    auction_authority: AccountInfo<'info>,
    token_program: AccountInfo<'info>,
    amount: Amount96,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    let amount = narrow_to_token_amount(amount)?;
    if amount == 0 {
        return Ok(());
    }
    let ix = transfer_ix(&vault, &to_ata, &auction_authority, amount);
    invoke_signed(
        &ix,
        &[vault, to_ata, auction_authority, token_program],
        signer_seeds,
    )
    .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrows_amounts_within_u64_range() {
        assert_eq!(narrow_to_token_amount(Amount96::new(1_000).unwrap()).unwrap(), 1_000);
    }

    #[test]
    fn rejects_amounts_above_u64_max() {
        let too_big = Amount96::new(u64::MAX as u128 + 1).unwrap();
        assert!(narrow_to_token_amount(too_big).is_err());
    }
}
