use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::{
    constants::{ROLE_AUTHORITY_SEED, USER_POSITION_SEED, USER_ROLE_SEED},
    error::VaultError,
    events::Deposited,
    state::{RoleAuthority, UserPosition, UserRole, Vault},
};

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, Vault>,

    #[account(
        seeds = [ROLE_AUTHORITY_SEED, vault.key().as_ref()],
        bump = role_authority.bump,
        has_one = vault @ VaultError::AccountMismatch,
    )]
    pub role_authority: Account<'info, RoleAuthority>,

    #[account(
        seeds = [USER_ROLE_SEED, vault.key().as_ref(), user.key().as_ref()],
        bump = user_role.bump,
    )]
    pub user_role: Account<'info, UserRole>,

    #[account(
        init_if_needed,
        payer = user,
        space = UserPosition::LEN,
        seeds = [USER_POSITION_SEED, vault.key().as_ref(), user.key().as_ref()],
        bump
    )]
    pub user_position: Account<'info, UserPosition>,

    #[account(
        constraint = asset_mint.key() == vault.asset_mint,
    )]
    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        constraint = user_asset_account.mint == vault.asset_mint,
        constraint = user_asset_account.owner == user.key(),
    )]
    pub user_asset_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        constraint = asset_vault.key() == vault.asset_vault,
    )]
    pub asset_vault: InterfaceAccount<'info, TokenAccount>,

    pub asset_token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

/// Deposit assets and receive vault shares (floor rounding - favors vault)
pub fn handler(ctx: Context<Deposit>, assets: u64, min_shares_out: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault_key = ctx.accounts.vault.key();
    let user = ctx.accounts.user.key();

    let position = &mut ctx.accounts.user_position;
    position.bind(user, vault_key, ctx.bumps.user_position)?;

    let shares = ctx.accounts.vault.deposit(
        &ctx.accounts.role_authority,
        &ctx.accounts.user_role,
        position,
        assets,
        now,
    )?;

    // Slippage check
    require!(shares >= min_shares_out, VaultError::SlippageExceeded);

    transfer_checked(
        CpiContext::new(
            ctx.accounts.asset_token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.user_asset_account.to_account_info(),
                to: ctx.accounts.asset_vault.to_account_info(),
                mint: ctx.accounts.asset_mint.to_account_info(),
                authority: ctx.accounts.user.to_account_info(),
            },
        ),
        assets,
        ctx.accounts.asset_mint.decimals,
    )?;

    emit!(Deposited {
        vault: vault_key,
        owner: user,
        assets,
        shares,
    });

    Ok(())
}
