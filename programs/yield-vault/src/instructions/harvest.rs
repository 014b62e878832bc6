use anchor_lang::prelude::*;

use crate::{
    constants::{ROLE_AUTHORITY_SEED, STRATEGY_SEED, USER_ROLE_SEED},
    error::VaultError,
    events::Harvested,
    state::{RoleAuthority, StrategyState, UserRole, Vault, VenuePosition},
};

#[derive(Accounts)]
pub struct Harvest<'info> {
    pub admin: Signer<'info>,

    #[account(mut)]
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
        seeds = [STRATEGY_SEED, vault.key().as_ref()],
        bump = strategy.bump,
    )]
    pub strategy: Box<Account<'info, StrategyState>>,

    #[account(
        mut,
        constraint = venue.vault == vault.key() @ VaultError::AccountMismatch,
        constraint = strategy.current_opportunity_id == Some(venue.opportunity_id)
            @ VaultError::NoActiveOpportunity,
    )]
    pub venue: Account<'info, VenuePosition>,
}

/// Collect reported yield from the active venue, net of the performance fee
pub fn handler(ctx: Context<Harvest>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let accounts = &mut *ctx.accounts;

    let receipt = accounts.vault.harvest(
        &accounts.role_authority,
        &accounts.admin_role,
        &accounts.strategy,
        &mut *accounts.venue,
    )?;
    accounts.venue.last_updated = now;

    emit!(Harvested {
        vault: accounts.vault.key(),
        opportunity_id: accounts.venue.opportunity_id,
        gross: receipt.gross,
        fee: receipt.fee,
        net: receipt.net,
    });

    msg!(
        "Harvested {} ({} fee), share price now {}",
        receipt.gross,
        receipt.fee,
        accounts.vault.share_price()?
    );

    Ok(())
}
