use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::{
    constants::{STRATEGY_SEED, USER_POSITION_SEED, VAULT_SEED},
    error::VaultError,
    events::Withdrawn,
    state::{Recall, StrategyState, UserPosition, Vault, VenuePosition},
};

#[derive(Accounts)]
pub struct Withdraw<'info> {
    pub user: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [USER_POSITION_SEED, vault.key().as_ref(), user.key().as_ref()],
        bump = user_position.bump,
    )]
    pub user_position: Account<'info, UserPosition>,

    /// Required only when recalling from the active venue
    #[account(
        mut,
        seeds = [STRATEGY_SEED, vault.key().as_ref()],
        bump = strategy.bump,
    )]
    pub strategy: Option<Box<Account<'info, StrategyState>>>,

    /// Position of the opportunity currently holding capital
    #[account(
        mut,
        constraint = venue.vault == vault.key() @ VaultError::AccountMismatch,
    )]
    pub venue: Option<Account<'info, VenuePosition>>,

    #[account(
        constraint = asset_mint.key() == vault.asset_mint,
    )]
    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        constraint = user_asset_account.mint == vault.asset_mint,
    )]
    pub user_asset_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        constraint = asset_vault.key() == vault.asset_vault,
    )]
    pub asset_vault: InterfaceAccount<'info, TokenAccount>,

    pub asset_token_program: Interface<'info, TokenInterface>,
}

/// Redeem shares against the idle reserve (floor rounding - protects vault)
pub fn handler(ctx: Context<Withdraw>, shares: u64, min_assets_out: u64) -> Result<()> {
    redeem(ctx, shares, min_assets_out, false)
}

/// Redeem shares, recalling any shortfall from the active venue
pub fn handler_with_recall(ctx: Context<Withdraw>, shares: u64, min_assets_out: u64) -> Result<()> {
    redeem(ctx, shares, min_assets_out, true)
}

fn redeem(ctx: Context<Withdraw>, shares: u64, min_assets_out: u64, allow_recall: bool) -> Result<()> {
    let accounts = &mut *ctx.accounts;
    let now = Clock::get()?.unix_timestamp;

    let recall = if allow_recall {
        match (accounts.strategy.as_deref_mut(), accounts.venue.as_mut()) {
            (Some(strategy), Some(venue)) => {
                require!(
                    strategy.current_opportunity_id == Some(venue.opportunity_id),
                    VaultError::AccountMismatch
                );
                venue.last_updated = now;
                Some(Recall {
                    strategy: &mut **strategy,
                    adapter: &mut **venue,
                })
            }
            _ => return err!(VaultError::AccountMismatch),
        }
    } else {
        None
    };

    let owner = accounts.user.key();
    let withdrawal = accounts.vault.withdraw(
        &owner,
        &mut accounts.user_position,
        shares,
        recall,
    )?;

    // Slippage check
    require!(
        withdrawal.assets >= min_assets_out,
        VaultError::SlippageExceeded
    );

    // Transfer assets from vault to user
    let asset_mint_key = accounts.vault.asset_mint;
    let vault_id_bytes = accounts.vault.vault_id.to_le_bytes();
    let bump = accounts.vault.bump;
    let signer_seeds: &[&[&[u8]]] = &[&[
        VAULT_SEED,
        asset_mint_key.as_ref(),
        vault_id_bytes.as_ref(),
        &[bump],
    ]];

    transfer_checked(
        CpiContext::new_with_signer(
            accounts.asset_token_program.to_account_info(),
            TransferChecked {
                from: accounts.asset_vault.to_account_info(),
                to: accounts.user_asset_account.to_account_info(),
                mint: accounts.asset_mint.to_account_info(),
                authority: accounts.vault.to_account_info(),
            },
            signer_seeds,
        ),
        withdrawal.assets,
        accounts.asset_mint.decimals,
    )?;

    emit!(Withdrawn {
        vault: accounts.vault.key(),
        owner: accounts.user.key(),
        assets: withdrawal.assets,
        shares: withdrawal.shares,
        recalled: withdrawal.recalled,
    });

    Ok(())
}
