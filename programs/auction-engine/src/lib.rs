use anchor_lang::prelude::*;

pub mod clearing;
pub mod errors;
pub mod events;
pub mod fee;
pub mod ledger;
pub mod order_codec;
pub mod order_set;
pub mod state;
pub mod user_directory;

use errors::AuctionError;
use events::*;
use ledger::spl_token;
use order_codec::{Amount96, OrderKey};
use state::{AuctionState, GlobalConfig, OrderBookAccount};
use user_directory::{get_or_register, UserDirectory, UserRecord};

declare_id!("AUCTeng11111111111111111111111111111111111");

/// Order data supplied to `place_orders`; the key is assembled from the
/// caller's own `user_id` at validation time, same as the teacher builds
/// `OrderLeaf`s from raw instruction arguments before hashing them.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy)]
pub struct PlaceOrderArgs {
    pub buy_amount: u128,
    pub sell_amount: u128,
    pub hint: OrderKey,
}

#[program]
pub mod auction_engine {
    use super::*;

    /// Bootstraps the singleton fee/authority and user-directory accounts.
    /// Not part of the clearing algorithm itself — the ambient bootstrap
    /// every account-based program needs once at genesis, mirroring the
    /// teacher's `create_order_book` as the program's entry point.
    pub fn initialize_global(ctx: Context<InitializeGlobal>) -> Result<()> {
        let global = &mut ctx.accounts.global_config;
        global.auction_counter = 0;
        global.fee_numerator = 0;
        global.fee_denominator = GlobalConfig::FEE_DENOMINATOR;
        global.fee_receiver_user_id = 0;
        global.authority = ctx.accounts.authority.key();
        global.bump = ctx.bumps.global_config;

        let directory = &mut ctx.accounts.user_directory;
        directory.num_users = 0;
        directory.addresses = Vec::new();
        directory.bump = ctx.bumps.user_directory;

        msg!("global config initialized, authority {}", global.authority);
        Ok(())
    }

    /// Resolves the caller's `user_id`, registering one on first call.
    pub fn register_user(ctx: Context<RegisterUser>) -> Result<u64> {
        let user_id = get_or_register(
            &mut ctx.accounts.user_directory,
            &mut ctx.accounts.user_record,
            ctx.accounts.caller.key(),
            ctx.bumps.user_record,
        )?;
        msg!("register_user: caller {} -> id {}", ctx.accounts.caller.key(), user_id);
        Ok(user_id)
    }

    /// Opens a new auction: escrows `offered_amount` from the seller and
    /// records the floor price, cancellation deadline, and auction end.
    pub fn initiate_auction(
        ctx: Context<InitiateAuction>,
        offered_amount: u128,
        min_buy: u128,
        min_bid_sell_amount: u128,
        min_funding_threshold: u128,
        order_cancellation_end: i64,
        auction_end: i64,
        book_capacity: u32,
    ) -> Result<()> {
        require!(offered_amount > 0, AuctionError::InvalidOrder);
        require!(min_buy > 0, AuctionError::InvalidOrder);
        require!(min_bid_sell_amount > 0, AuctionError::InvalidOrder);

        let global = &mut ctx.accounts.global_config;
        let auction_id = global.auction_counter;
        global.auction_counter = global
            .auction_counter
            .checked_add(1)
            .ok_or(AuctionError::OverflowOrNarrowing)?;

        let seller_user_id = ctx.accounts.seller_record.user_id;
        let auction = &mut ctx.accounts.auction;
        auction.auction_id = auction_id;
        auction.seller = ctx.accounts.seller.key();
        auction.offered_mint = ctx.accounts.offered_mint.key();
        auction.bidding_mint = ctx.accounts.bidding_mint.key();
        auction.offered_vault = ctx.accounts.offered_vault.key();
        auction.bidding_vault = ctx.accounts.bidding_vault.key();
        auction.order_cancellation_end = order_cancellation_end;
        auction.auction_end = auction_end;
        auction.initial_order = OrderKey::encode(
            seller_user_id,
            Amount96::new(min_buy)?,
            Amount96::new(offered_amount)?,
        );
        auction.min_bid_sell_amount = min_bid_sell_amount;
        auction.min_funding_threshold = min_funding_threshold;
        auction.interim_order = OrderKey::QUEUE_START;
        auction.interim_sum_bid = 0;
        auction.clearing_order = OrderKey::QUEUE_START;
        auction.volume_clearing_price_order = 0;
        auction.fee_numerator = global.fee_numerator;
        auction.fee_denominator = global.fee_denominator;
        auction.funding_threshold_not_reached = false;
        auction.bump = ctx.bumps.auction;
        auction.offered_vault_bump = ctx.bumps.offered_vault;
        auction.bidding_vault_bump = ctx.bumps.bidding_vault;

        ctx.accounts.order_book.auction = auction.key();
        ctx.accounts.order_book.orders = order_set::OrderedOrderSet::new();
        ctx.accounts.order_book.bump = ctx.bumps.order_book;

        ledger::pull(
            ctx.accounts.seller_offered_ata.to_account_info(),
            ctx.accounts.offered_vault.to_account_info(),
            ctx.accounts.seller.to_account_info(),
            ctx.accounts.token_program.to_account_info(),
            Amount96::new(offered_amount)?,
        )?;

        emit!(NewAuction {
            auction_id,
            auction: auction.key(),
            seller: auction.seller,
            offered_mint: auction.offered_mint,
            bidding_mint: auction.bidding_mint,
            offered_amount,
            min_buy,
            order_cancellation_end,
            auction_end,
        });
        msg!("initiate_auction: auction {} opened by {}", auction_id, auction.seller);
        Ok(())
    }

    /// Places a batch of bids. Input validation failures abort the whole
    /// batch; a stale/too-early hint on one order is tolerated and that
    /// single order is skipped, per the batch's soft-failure contract.
    pub fn place_orders(ctx: Context<PlaceOrders>, orders: Vec<PlaceOrderArgs>) -> Result<()> {
        let auction = &ctx.accounts.auction;
        let clock = Clock::get()?;
        require!(auction.placement_open(clock.unix_timestamp), AuctionError::WrongPhase);

        let (_, seller_buy, seller_sell) = auction
            .initial_order
            .decode()
            .ok_or(AuctionError::WrongPhase)?;
        let bidder_user_id = ctx.accounts.bidder_record.user_id;

        let mut total_pulled: u128 = 0;
        for order in &orders {
            require!(order.sell_amount > auction.min_bid_sell_amount, AuctionError::InvalidOrder);
            let buy = Amount96::new(order.buy_amount)?;
            let sell = Amount96::new(order.sell_amount)?;

            // limit price strictly better than the seller's floor:
            // min_buy_i * seller_sell < seller_buy * sell_amount_i
            let lhs = primitive_types::U256::from(buy.get()) * primitive_types::U256::from(seller_sell.get());
            let rhs = primitive_types::U256::from(seller_buy.get()) * primitive_types::U256::from(sell.get());
            require!(lhs < rhs, AuctionError::InvalidOrder);

            let key = OrderKey::encode(bidder_user_id, buy, sell);
            if !ctx.accounts.order_book.orders.insert(key, order.hint) {
                continue;
            }
            total_pulled = total_pulled
                .checked_add(sell.get())
                .ok_or(AuctionError::OverflowOrNarrowing)?;

            emit!(NewSellOrder {
                auction_id: auction.auction_id,
                user_id: bidder_user_id,
                buy_amount: buy.get(),
                sell_amount: sell.get(),
            });
        }

        ledger::pull(
            ctx.accounts.bidder_ata.to_account_info(),
            ctx.accounts.bidding_vault.to_account_info(),
            ctx.accounts.bidder.to_account_info(),
            ctx.accounts.token_program.to_account_info(),
            Amount96::new(total_pulled)?,
        )?;

        msg!("place_orders: auction {} batch of {} orders", auction.auction_id, orders.len());
        Ok(())
    }

    /// Cancels a batch of the caller's own orders, refunding their
    /// bidding-asset deposit. Orders already removed are skipped.
    pub fn cancel_orders(ctx: Context<CancelOrders>, orders: Vec<OrderKey>) -> Result<()> {
        let auction = &ctx.accounts.auction;
        let clock = Clock::get()?;
        require!(auction.cancellation_open(clock.unix_timestamp), AuctionError::WrongPhase);

        let bidder_user_id = ctx.accounts.bidder_record.user_id;
        let mut total_refund: u128 = 0;

        for &key in &orders {
            let (user_id, buy_amount, sell_amount) = match key.decode() {
                Some(fields) => fields,
                None => continue,
            };
            require!(user_id == bidder_user_id, AuctionError::NotOwner);
            if !ctx.accounts.order_book.orders.remove_keep_history(key) {
                continue;
            }
            total_refund = total_refund
                .checked_add(sell_amount.get())
                .ok_or(AuctionError::OverflowOrNarrowing)?;

            emit!(CancellationSellOrder {
                auction_id: auction.auction_id,
                user_id: bidder_user_id,
                buy_amount: buy_amount.get(),
                sell_amount: sell_amount.get(),
            });
        }

        let seeds: &[&[u8]] = &[
            AuctionState::SEED_PREFIX,
            &auction.auction_id.to_le_bytes(),
            &[auction.bump],
        ];
        ledger::push(
            ctx.accounts.bidding_vault.to_account_info(),
            ctx.accounts.bidder_ata.to_account_info(),
            ctx.accounts.auction.to_account_info(),
            ctx.accounts.token_program.to_account_info(),
            Amount96::new(total_refund)?,
            &[seeds],
        )?;

        msg!("cancel_orders: auction {} batch of {} orders", auction.auction_id, orders.len());
        Ok(())
    }

    /// Advances the incremental demand-sum walk by `steps` positions.
    pub fn precompute_sum(ctx: Context<Solve>, steps: u32) -> Result<()> {
        let clock = Clock::get()?;
        let auction = &mut ctx.accounts.auction;
        require!(auction.solution_open(clock.unix_timestamp), AuctionError::WrongPhase);
        clearing::precompute_sum(auction, &ctx.accounts.order_book.orders, steps)?;
        msg!("precompute_sum: auction {} advanced {} steps", auction.auction_id, steps);
        Ok(())
    }

    /// Verifies a candidate clearing price and, on success, collects the
    /// fee and settles the seller in the same transaction.
    pub fn verify_price(ctx: Context<Solve>, candidate: OrderKey) -> Result<()> {
        let clock = Clock::get()?;
        require!(
            ctx.accounts.auction.solution_open(clock.unix_timestamp),
            AuctionError::WrongPhase
        );

        if let Err(e) =
            clearing::verify_price(&mut ctx.accounts.auction, &ctx.accounts.order_book.orders, candidate)
        {
            let (num, den) = candidate.decode().map(|(_, n, d)| (n.get(), d.get())).unwrap_or((0, 0));
            msg!(
                "auction {}: rejected candidate price {}/{}: {:?}",
                ctx.accounts.auction.auction_id,
                num,
                den,
                e
            );
            return Err(e);
        }

        let fee_payout = fee::claim_fees(&ctx.accounts.auction)?;
        let seller_payout = clearing::settle_seller(&mut ctx.accounts.auction)?;

        let auction_id = ctx.accounts.auction.auction_id;
        let bump = ctx.accounts.auction.bump;
        let seeds: &[&[u8]] = &[
            AuctionState::SEED_PREFIX,
            &auction_id.to_le_bytes(),
            &[bump],
        ];

        if fee_payout.receiver_amount.get() > 0 {
            ledger::push(
                ctx.accounts.offered_vault.to_account_info(),
                ctx.accounts.fee_receiver_ata.to_account_info(),
                ctx.accounts.auction.to_account_info(),
                ctx.accounts.token_program.to_account_info(),
                fee_payout.receiver_amount,
                &[seeds],
            )?;
        }

        ledger::push(
            ctx.accounts.offered_vault.to_account_info(),
            ctx.accounts.seller_offered_ata.to_account_info(),
            ctx.accounts.auction.to_account_info(),
            ctx.accounts.token_program.to_account_info(),
            seller_payout.offered_amount,
            &[seeds],
        )?;
        if fee_payout.seller_refund.get() > 0 {
            ledger::push(
                ctx.accounts.offered_vault.to_account_info(),
                ctx.accounts.seller_offered_ata.to_account_info(),
                ctx.accounts.auction.to_account_info(),
                ctx.accounts.token_program.to_account_info(),
                fee_payout.seller_refund,
                &[seeds],
            )?;
        }
        ledger::push(
            ctx.accounts.bidding_vault.to_account_info(),
            ctx.accounts.seller_bidding_ata.to_account_info(),
            ctx.accounts.auction.to_account_info(),
            ctx.accounts.token_program.to_account_info(),
            seller_payout.bidding_amount,
            &[seeds],
        )?;

        let (_, num, den) = ctx
            .accounts
            .auction
            .clearing_order
            .decode()
            .unwrap_or((0, Amount96::new(0)?, Amount96::new(0)?));
        emit!(AuctionCleared {
            auction_id,
            num: num.get(),
            den: den.get(),
        });
        msg!("auction {}: cleared at {}/{}", auction_id, num.get(), den.get());
        Ok(())
    }

    /// Claims a batch of the caller's own orders against the final
    /// clearing outcome, paying out through the vaults.
    pub fn claim_participant(ctx: Context<ClaimParticipant>, orders: Vec<OrderKey>) -> Result<()> {
        let auction = &ctx.accounts.auction;
        require!(auction.is_cleared(), AuctionError::WrongPhase);

        let caller_user_id = ctx.accounts.caller_record.user_id;
        let mut total_offered: u128 = 0;
        let mut total_bidding: u128 = 0;

        for &order in &orders {
            let payout = clearing::claim_participant(
                auction,
                &mut ctx.accounts.order_book.orders,
                order,
                caller_user_id,
            )?;
            total_offered = total_offered
                .checked_add(payout.offered_amount.get())
                .ok_or(AuctionError::OverflowOrNarrowing)?;
            total_bidding = total_bidding
                .checked_add(payout.bidding_amount.get())
                .ok_or(AuctionError::OverflowOrNarrowing)?;

            let (_, buy_amount, sell_amount) = order.decode().ok_or(AuctionError::AlreadyClaimed)?;
            emit!(ClaimedFromOrder {
                auction_id: auction.auction_id,
                user_id: caller_user_id,
                buy_amount: buy_amount.get(),
                sell_amount: sell_amount.get(),
            });
        }

        let seeds: &[&[u8]] = &[
            AuctionState::SEED_PREFIX,
            &auction.auction_id.to_le_bytes(),
            &[auction.bump],
        ];
        ledger::push(
            ctx.accounts.offered_vault.to_account_info(),
            ctx.accounts.caller_offered_ata.to_account_info(),
            ctx.accounts.auction.to_account_info(),
            ctx.accounts.token_program.to_account_info(),
            Amount96::new(total_offered)?,
            &[seeds],
        )?;
        ledger::push(
            ctx.accounts.bidding_vault.to_account_info(),
            ctx.accounts.caller_bidding_ata.to_account_info(),
            ctx.accounts.auction.to_account_info(),
            ctx.accounts.token_program.to_account_info(),
            Amount96::new(total_bidding)?,
            &[seeds],
        )?;

        msg!("claim_participant: auction {} batch of {} orders", auction.auction_id, orders.len());
        Ok(())
    }

    /// Updates the global fee numerator and receiver. Authority-gated.
    pub fn set_fee(ctx: Context<SetFee>, numerator: u16) -> Result<()> {
        require!(
            ctx.accounts.authority.key() == ctx.accounts.global_config.authority,
            AuctionError::UnauthorizedFeeChange
        );
        let receiver_user_id = get_or_register(
            &mut ctx.accounts.user_directory,
            &mut ctx.accounts.receiver_record,
            ctx.accounts.receiver.key(),
            ctx.bumps.receiver_record,
        )?;
        fee::set_fee(&mut ctx.accounts.global_config, numerator, receiver_user_id)?;
        msg!("set_fee: numerator {} receiver id {}", numerator, receiver_user_id);
        Ok(())
    }
}

// =============================================================================
// Account Contexts
// =============================================================================

#[derive(Accounts)]
pub struct InitializeGlobal<'info> {
    #[account(
        init,
        payer = authority,
        space = GlobalConfig::SPACE,
        seeds = [GlobalConfig::SEED_PREFIX],
        bump
    )]
    pub global_config: Account<'info, GlobalConfig>,

    #[account(
        init,
        payer = authority,
        space = UserDirectory::space_for_capacity(0),
        seeds = [UserDirectory::SEED_PREFIX],
        bump
    )]
    pub user_directory: Account<'info, UserDirectory>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct RegisterUser<'info> {
    #[account(
        mut,
        seeds = [UserDirectory::SEED_PREFIX],
        bump = user_directory.bump,
        realloc = UserDirectory::space_for_capacity(user_directory.addresses.len() + 1),
        realloc::payer = caller,
        realloc::zero = false,
    )]
    pub user_directory: Account<'info, UserDirectory>,

    #[account(
        init_if_needed,
        payer = caller,
        space = UserRecord::SPACE,
        seeds = [UserRecord::SEED_PREFIX, caller.key().as_ref()],
        bump
    )]
    pub user_record: Account<'info, UserRecord>,

    #[account(mut)]
    pub caller: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(
    offered_amount: u128,
    min_buy: u128,
    min_bid_sell_amount: u128,
    min_funding_threshold: u128,
    order_cancellation_end: i64,
    auction_end: i64,
    book_capacity: u32
)]
pub struct InitiateAuction<'info> {
    #[account(mut, seeds = [GlobalConfig::SEED_PREFIX], bump = global_config.bump)]
    pub global_config: Account<'info, GlobalConfig>,

    #[account(
        seeds = [UserRecord::SEED_PREFIX, seller.key().as_ref()],
        bump = seller_record.bump,
        constraint = seller_record.address == seller.key() @ AuctionError::NotOwner
    )]
    pub seller_record: Account<'info, UserRecord>,

    #[account(
        init,
        payer = seller,
        space = AuctionState::SPACE,
        seeds = [AuctionState::SEED_PREFIX, &global_config.auction_counter.to_le_bytes()],
        bump
    )]
    pub auction: Account<'info, AuctionState>,

    #[account(
        init,
        payer = seller,
        space = OrderBookAccount::space_for_capacity(book_capacity as usize),
        seeds = [OrderBookAccount::SEED_PREFIX, auction.key().as_ref()],
        bump
    )]
    pub order_book: Account<'info, OrderBookAccount>,

    /// CHECK: escrow for the offered asset, owned by the auction PDA.
    #[account(mut, seeds = [b"offered_vault", auction.key().as_ref()], bump)]
    pub offered_vault: AccountInfo<'info>,

    /// CHECK: escrow for the bidding asset, owned by the auction PDA.
    #[account(mut, seeds = [b"bidding_vault", auction.key().as_ref()], bump)]
    pub bidding_vault: AccountInfo<'info>,

    /// CHECK: offered asset mint.
    pub offered_mint: AccountInfo<'info>,
    /// CHECK: bidding asset mint.
    pub bidding_mint: AccountInfo<'info>,

    /// CHECK: seller's token account for the offered mint; debited by the CPI.
    #[account(mut)]
    pub seller_offered_ata: AccountInfo<'info>,

    #[account(mut)]
    pub seller: Signer<'info>,

    /// CHECK: pinned to the SPL Token program id.
    #[account(address = spl_token::ID)]
    pub token_program: AccountInfo<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct PlaceOrders<'info> {
    #[account(
        mut,
        seeds = [AuctionState::SEED_PREFIX, &auction.auction_id.to_le_bytes()],
        bump = auction.bump
    )]
    pub auction: Account<'info, AuctionState>,

    #[account(
        mut,
        seeds = [OrderBookAccount::SEED_PREFIX, auction.key().as_ref()],
        bump = order_book.bump
    )]
    pub order_book: Account<'info, OrderBookAccount>,

    #[account(
        seeds = [UserRecord::SEED_PREFIX, bidder.key().as_ref()],
        bump = bidder_record.bump,
        constraint = bidder_record.address == bidder.key() @ AuctionError::NotOwner
    )]
    pub bidder_record: Account<'info, UserRecord>,

    /// CHECK: validated against `auction.bidding_vault` by the CPI itself.
    #[account(mut, address = auction.bidding_vault)]
    pub bidding_vault: AccountInfo<'info>,

    /// CHECK: bidder's token account for the bidding mint; debited by the CPI.
    #[account(mut)]
    pub bidder_ata: AccountInfo<'info>,

    #[account(mut)]
    pub bidder: Signer<'info>,

    /// CHECK: pinned to the SPL Token program id.
    #[account(address = spl_token::ID)]
    pub token_program: AccountInfo<'info>,
}

#[derive(Accounts)]
pub struct CancelOrders<'info> {
    #[account(
        seeds = [AuctionState::SEED_PREFIX, &auction.auction_id.to_le_bytes()],
        bump = auction.bump
    )]
    pub auction: Account<'info, AuctionState>,

    #[account(
        mut,
        seeds = [OrderBookAccount::SEED_PREFIX, auction.key().as_ref()],
        bump = order_book.bump
    )]
    pub order_book: Account<'info, OrderBookAccount>,

    #[account(
        seeds = [UserRecord::SEED_PREFIX, bidder.key().as_ref()],
        bump = bidder_record.bump,
        constraint = bidder_record.address == bidder.key() @ AuctionError::NotOwner
    )]
    pub bidder_record: Account<'info, UserRecord>,

    /// CHECK: validated against `auction.bidding_vault` by the CPI itself.
    #[account(mut, address = auction.bidding_vault)]
    pub bidding_vault: AccountInfo<'info>,

    /// CHECK: bidder's token account for the bidding mint; credited by the CPI.
    #[account(mut)]
    pub bidder_ata: AccountInfo<'info>,

    #[account(mut)]
    pub bidder: Signer<'info>,

    /// CHECK: pinned to the SPL Token program id.
    #[account(address = spl_token::ID)]
    pub token_program: AccountInfo<'info>,
}

#[derive(Accounts)]
pub struct Solve<'info> {
    #[account(
        mut,
        seeds = [AuctionState::SEED_PREFIX, &auction.auction_id.to_le_bytes()],
        bump = auction.bump
    )]
    pub auction: Account<'info, AuctionState>,

    #[account(
        seeds = [OrderBookAccount::SEED_PREFIX, auction.key().as_ref()],
        bump = order_book.bump
    )]
    pub order_book: Account<'info, OrderBookAccount>,

    /// CHECK: validated against `auction.offered_vault` by the CPI itself.
    #[account(mut, address = auction.offered_vault)]
    pub offered_vault: AccountInfo<'info>,

    /// CHECK: validated against `auction.bidding_vault` by the CPI itself.
    #[account(mut, address = auction.bidding_vault)]
    pub bidding_vault: AccountInfo<'info>,

    /// CHECK: fee receiver's token account for the offered mint.
    #[account(mut)]
    pub fee_receiver_ata: AccountInfo<'info>,

    /// CHECK: seller's token account for the offered mint.
    #[account(mut)]
    pub seller_offered_ata: AccountInfo<'info>,

    /// CHECK: seller's token account for the bidding mint.
    #[account(mut)]
    pub seller_bidding_ata: AccountInfo<'info>,

    /// CHECK: pinned to the SPL Token program id.
    #[account(address = spl_token::ID)]
    pub token_program: AccountInfo<'info>,

    pub caller: Signer<'info>,
}

#[derive(Accounts)]
pub struct ClaimParticipant<'info> {
    #[account(
        seeds = [AuctionState::SEED_PREFIX, &auction.auction_id.to_le_bytes()],
        bump = auction.bump
    )]
    pub auction: Account<'info, AuctionState>,

    #[account(
        mut,
        seeds = [OrderBookAccount::SEED_PREFIX, auction.key().as_ref()],
        bump = order_book.bump
    )]
    pub order_book: Account<'info, OrderBookAccount>,

    #[account(
        seeds = [UserRecord::SEED_PREFIX, caller.key().as_ref()],
        bump = caller_record.bump,
        constraint = caller_record.address == caller.key() @ AuctionError::NotOwner
    )]
    pub caller_record: Account<'info, UserRecord>,

    /// CHECK: validated against `auction.offered_vault` by the CPI itself.
    #[account(mut, address = auction.offered_vault)]
    pub offered_vault: AccountInfo<'info>,

    /// CHECK: validated against `auction.bidding_vault` by the CPI itself.
    #[account(mut, address = auction.bidding_vault)]
    pub bidding_vault: AccountInfo<'info>,

    /// CHECK: caller's token account for the offered mint.
    #[account(mut)]
    pub caller_offered_ata: AccountInfo<'info>,

    /// CHECK: caller's token account for the bidding mint.
    #[account(mut)]
    pub caller_bidding_ata: AccountInfo<'info>,

    pub caller: Signer<'info>,

    /// CHECK: pinned to the SPL Token program id.
    #[account(address = spl_token::ID)]
    pub token_program: AccountInfo<'info>,
}

#[derive(Accounts)]
pub struct SetFee<'info> {
    #[account(mut, seeds = [GlobalConfig::SEED_PREFIX], bump = global_config.bump)]
    pub global_config: Account<'info, GlobalConfig>,

    #[account(
        mut,
        seeds = [UserDirectory::SEED_PREFIX],
        bump = user_directory.bump,
        realloc = UserDirectory::space_for_capacity(user_directory.addresses.len() + 1),
        realloc::payer = authority,
        realloc::zero = false,
    )]
    pub user_directory: Account<'info, UserDirectory>,

    #[account(
        init_if_needed,
        payer = authority,
        space = UserRecord::SPACE,
        seeds = [UserRecord::SEED_PREFIX, receiver.key().as_ref()],
        bump
    )]
    pub receiver_record: Account<'info, UserRecord>,

    /// CHECK: the fee receiver's address; need not sign.
    pub receiver: AccountInfo<'info>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}
