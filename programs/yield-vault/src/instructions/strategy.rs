use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::{
    adapters::{OpportunityAdapter, VenueRouter},
    constants::{ROLE_AUTHORITY_SEED, STRATEGY_SEED, USER_ROLE_SEED, VENUE_SEED},
    error::VaultError,
    events::{
        OpportunityRegistered, OpportunityRemoved, OpportunityUpdated, Rebalanced,
        StrategyInitialized, YieldReported,
    },
    instructions::set_borsh_return_data,
    state::{
        OpportunityParams, RebalanceOutcome, Role, RoleAuthority, StrategyState, UserRole, Vault,
        VenuePosition,
    },
};

#[derive(Accounts)]
pub struct InitializeStrategy<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    pub vault: Account<'info, Vault>,

    #[account(
        seeds = [ROLE_AUTHORITY_SEED, vault.key().as_ref()],
        bump = role_authority.bump,
        has_one = vault @ VaultError::AccountMismatch,
    )]
    pub role_authority: Account<'info, RoleAuthority>,

    #[account(
        seeds = [USER_ROLE_SEED, vault.key().as_ref(), admin.key().as_ref()],
        bump = admin_role.bump,
    )]
    pub admin_role: Account<'info, UserRole>,

    #[account(
        init,
        payer = admin,
        space = StrategyState::LEN,
        seeds = [STRATEGY_SEED, vault.key().as_ref()],
        bump
    )]
    pub strategy: Box<Account<'info, StrategyState>>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct RegisterOpportunity<'info> {
    #[account(mut)]
    pub manager: Signer<'info>,

    pub vault: Account<'info, Vault>,

    #[account(
        seeds = [ROLE_AUTHORITY_SEED, vault.key().as_ref()],
        bump = role_authority.bump,
        has_one = vault @ VaultError::AccountMismatch,
    )]
    pub role_authority: Account<'info, RoleAuthority>,

    #[account(
        seeds = [USER_ROLE_SEED, vault.key().as_ref(), manager.key().as_ref()],
        bump = manager_role.bump,
    )]
    pub manager_role: Account<'info, UserRole>,

    #[account(
        mut,
        seeds = [STRATEGY_SEED, vault.key().as_ref()],
        bump = strategy.bump,
    )]
    pub strategy: Box<Account<'info, StrategyState>>,

    /// Ledger position for the opportunity being registered
    #[account(
        init,
        payer = manager,
        space = VenuePosition::LEN,
        seeds = [VENUE_SEED, vault.key().as_ref(), &[strategy.next_opportunity_id]],
        bump
    )]
    pub venue: Account<'info, VenuePosition>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct ManageStrategy<'info> {
    pub manager: Signer<'info>,

    pub vault: Account<'info, Vault>,

    #[account(
        seeds = [ROLE_AUTHORITY_SEED, vault.key().as_ref()],
        bump = role_authority.bump,
        has_one = vault @ VaultError::AccountMismatch,
    )]
    pub role_authority: Account<'info, RoleAuthority>,

    #[account(
        seeds = [USER_ROLE_SEED, vault.key().as_ref(), manager.key().as_ref()],
        bump = manager_role.bump,
    )]
    pub manager_role: Account<'info, UserRole>,

    #[account(
        mut,
        seeds = [STRATEGY_SEED, vault.key().as_ref()],
        bump = strategy.bump,
    )]
    pub strategy: Box<Account<'info, StrategyState>>,
}

#[derive(Accounts)]
pub struct Rebalance<'info> {
    pub manager: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, Vault>,

    #[account(
        seeds = [ROLE_AUTHORITY_SEED, vault.key().as_ref()],
        bump = role_authority.bump,
        has_one = vault @ VaultError::AccountMismatch,
    )]
    pub role_authority: Account<'info, RoleAuthority>,

    #[account(
        seeds = [USER_ROLE_SEED, vault.key().as_ref(), manager.key().as_ref()],
        bump = manager_role.bump,
    )]
    pub manager_role: Account<'info, UserRole>,

    #[account(
        mut,
        seeds = [STRATEGY_SEED, vault.key().as_ref()],
        bump = strategy.bump,
    )]
    pub strategy: Box<Account<'info, StrategyState>>,

    /// Venue currently holding capital; omitted while idle
    #[account(
        mut,
        constraint = from_venue.vault == vault.key() @ VaultError::AccountMismatch,
    )]
    pub from_venue: Option<Account<'info, VenuePosition>>,

    /// Venue expected to receive capital; may be omitted when a hold is expected
    #[account(
        mut,
        constraint = to_venue.vault == vault.key() @ VaultError::AccountMismatch,
    )]
    pub to_venue: Option<Account<'info, VenuePosition>>,
}

#[derive(Accounts)]
pub struct ReportYield<'info> {
    pub keeper: Signer<'info>,

    pub vault: Account<'info, Vault>,

    #[account(
        seeds = [ROLE_AUTHORITY_SEED, vault.key().as_ref()],
        bump = role_authority.bump,
        has_one = vault @ VaultError::AccountMismatch,
    )]
    pub role_authority: Account<'info, RoleAuthority>,

    #[account(
        seeds = [USER_ROLE_SEED, vault.key().as_ref(), keeper.key().as_ref()],
        bump = keeper_role.bump,
    )]
    pub keeper_role: Account<'info, UserRole>,

    #[account(
        seeds = [STRATEGY_SEED, vault.key().as_ref()],
        bump = strategy.bump,
    )]
    pub strategy: Box<Account<'info, StrategyState>>,

    #[account(
        mut,
        seeds = [VENUE_SEED, vault.key().as_ref(), &[venue.opportunity_id]],
        bump = venue.bump,
    )]
    pub venue: Account<'info, VenuePosition>,

    #[account(
        constraint = asset_mint.key() == vault.asset_mint,
    )]
    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        constraint = keeper_asset_account.mint == vault.asset_mint,
        constraint = keeper_asset_account.owner == keeper.key(),
    )]
    pub keeper_asset_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        constraint = asset_vault.key() == vault.asset_vault,
    )]
    pub asset_vault: InterfaceAccount<'info, TokenAccount>,

    pub asset_token_program: Interface<'info, TokenInterface>,
}

/// Routes a rebalance onto the venue accounts passed with the instruction
struct AccountRouter<'a, 'info> {
    from: Option<&'a mut Account<'info, VenuePosition>>,
    to: Option<&'a mut Account<'info, VenuePosition>>,
}

impl VenueRouter for AccountRouter<'_, '_> {
    fn route(
        &mut self,
        from: Option<u8>,
        to: u8,
    ) -> Option<(Option<&mut dyn OpportunityAdapter>, &mut dyn OpportunityAdapter)> {
        let target = self.to.as_deref_mut().filter(|venue| venue.opportunity_id == to)?;
        let target: &mut dyn OpportunityAdapter = &mut **target;

        let source = match from {
            Some(id) => {
                let venue = self
                    .from
                    .as_deref_mut()
                    .filter(|venue| venue.opportunity_id == id)?;
                let venue: &mut dyn OpportunityAdapter = &mut **venue;
                Some(venue)
            }
            None => None,
        };

        Some((source, target))
    }
}

pub fn initialize_strategy(
    ctx: Context<InitializeStrategy>,
    rebalance_threshold: u16,
    rebalance_cooldown: i64,
) -> Result<()> {
    ctx.accounts
        .role_authority
        .require_role(&ctx.accounts.admin_role, Role::Admin)?;
    require!(rebalance_cooldown >= 0, VaultError::InvalidParameters);

    let vault_key = ctx.accounts.vault.key();
    ctx.accounts.strategy.set_inner(StrategyState::new(
        vault_key,
        rebalance_threshold,
        rebalance_cooldown,
        ctx.bumps.strategy,
    ));

    emit!(StrategyInitialized {
        vault: vault_key,
        rebalance_threshold,
        rebalance_cooldown,
    });

    Ok(())
}

/// Append an opportunity to the catalog and open its venue position
pub fn register_opportunity(
    ctx: Context<RegisterOpportunity>,
    params: OpportunityParams,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault_key = ctx.accounts.vault.key();

    let opportunity_id = ctx.accounts.strategy.register_opportunity(
        &ctx.accounts.role_authority,
        &ctx.accounts.manager_role,
        &params,
        now,
    )?;
    ctx.accounts.venue.set_inner(VenuePosition::new(
        vault_key,
        opportunity_id,
        ctx.bumps.venue,
    ));

    let score = ctx
        .accounts
        .strategy
        .opportunity(opportunity_id)
        .map(|opportunity| opportunity.score)
        .ok_or(VaultError::OpportunityNotFound)?;

    emit!(OpportunityRegistered {
        vault: vault_key,
        opportunity_id,
        score,
    });

    Ok(())
}

pub fn update_opportunity(
    ctx: Context<ManageStrategy>,
    opportunity_id: u8,
    params: OpportunityParams,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let score = ctx.accounts.strategy.update_opportunity(
        &ctx.accounts.role_authority,
        &ctx.accounts.manager_role,
        opportunity_id,
        &params,
        now,
    )?;

    emit!(OpportunityUpdated {
        vault: ctx.accounts.vault.key(),
        opportunity_id,
        score,
    });

    Ok(())
}

pub fn remove_opportunity(ctx: Context<ManageStrategy>, opportunity_id: u8) -> Result<()> {
    ctx.accounts.strategy.remove_opportunity(
        &ctx.accounts.role_authority,
        &ctx.accounts.manager_role,
        opportunity_id,
    )?;

    emit!(OpportunityRemoved {
        vault: ctx.accounts.vault.key(),
        opportunity_id,
    });

    Ok(())
}

/// Refresh cached scores and return the ranking as Borsh-encoded return data
pub fn evaluate(ctx: Context<ManageStrategy>) -> Result<()> {
    let ranking = ctx
        .accounts
        .strategy
        .evaluate(&ctx.accounts.role_authority, &ctx.accounts.manager_role)?;

    set_borsh_return_data(&ranking)
}

/// Move deployed capital to the best opportunity when it clears the threshold
pub fn rebalance(ctx: Context<Rebalance>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let accounts = &mut *ctx.accounts;
    let vault_key = accounts.vault.key();

    let mut router = AccountRouter {
        from: accounts.from_venue.as_mut(),
        to: accounts.to_venue.as_mut(),
    };
    let outcome = accounts.strategy.rebalance(
        &accounts.role_authority,
        &accounts.manager_role,
        &mut accounts.vault,
        &mut router,
        now,
    )?;

    match outcome {
        RebalanceOutcome::Moved(plan) => {
            for venue in [router.from, router.to].into_iter().flatten() {
                venue.last_updated = now;
            }

            emit!(Rebalanced {
                vault: vault_key,
                from: plan.from,
                to: plan.to,
                amount: plan.amount,
                previous_score: plan.current_score,
                new_score: plan.best_score,
                yield_collected: plan.yield_collected,
            });

            msg!(
                "Rebalanced {} into opportunity {} (score {} -> {})",
                plan.amount,
                plan.to,
                plan.current_score,
                plan.best_score
            );
        }
        RebalanceOutcome::Held {
            current_score,
            best_score,
        } => {
            msg!(
                "Holding allocation (score {}, best {})",
                current_score,
                best_score
            );
        }
    }

    set_borsh_return_data(&outcome)
}

/// Move realized venue yield into custody and credit it for the next harvest
pub fn report_yield(ctx: Context<ReportYield>, amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    ctx.accounts.strategy.report_yield(
        &ctx.accounts.role_authority,
        &ctx.accounts.keeper_role,
        &mut ctx.accounts.venue,
        amount,
        now,
    )?;

    transfer_checked(
        CpiContext::new(
            ctx.accounts.asset_token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.keeper_asset_account.to_account_info(),
                to: ctx.accounts.asset_vault.to_account_info(),
                mint: ctx.accounts.asset_mint.to_account_info(),
                authority: ctx.accounts.keeper.to_account_info(),
            },
        ),
        amount,
        ctx.accounts.asset_mint.decimals,
    )?;

    emit!(YieldReported {
        vault: ctx.accounts.vault.key(),
        opportunity_id: ctx.accounts.venue.opportunity_id,
        amount,
    });

    Ok(())
}
