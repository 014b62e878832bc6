use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::{
    constants::{ROLE_AUTHORITY_SEED, USER_ROLE_SEED, VAULT_SEED},
    error::VaultError,
    events::{FeesWithdrawn, SettingsUpdated},
    state::{RoleAuthority, SettingsUpdate, UserRole, Vault},
};

#[derive(Accounts)]
pub struct UpdateSettings<'info> {
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
}

#[derive(Accounts)]
pub struct WithdrawFees<'info> {
    pub treasury: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, Vault>,

    #[account(
        seeds = [ROLE_AUTHORITY_SEED, vault.key().as_ref()],
        bump = role_authority.bump,
        has_one = vault @ VaultError::AccountMismatch,
    )]
    pub role_authority: Account<'info, RoleAuthority>,

    #[account(
        seeds = [USER_ROLE_SEED, vault.key().as_ref(), treasury.key().as_ref()],
        bump = treasury_role.bump,
    )]
    pub treasury_role: Account<'info, UserRole>,

    #[account(
        constraint = asset_mint.key() == vault.asset_mint,
    )]
    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        constraint = asset_vault.key() == vault.asset_vault,
    )]
    pub asset_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        constraint = treasury_asset_account.mint == vault.asset_mint,
    )]
    pub treasury_asset_account: InterfaceAccount<'info, TokenAccount>,

    pub asset_token_program: Interface<'info, TokenInterface>,
}

/// Change the deployment allocation and/or performance fee
pub fn update_settings(ctx: Context<UpdateSettings>, update: SettingsUpdate) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    vault.update_settings(&ctx.accounts.role_authority, &ctx.accounts.admin_role, &update)?;

    emit!(SettingsUpdated {
        vault: vault.key(),
        strategy_allocation: vault.strategy_allocation,
        performance_fee_bps: vault.performance_fee_bps,
    });

    Ok(())
}

/// Pay accrued performance fees out of custody
pub fn withdraw_fees(ctx: Context<WithdrawFees>, amount: u64) -> Result<()> {
    ctx.accounts.vault.withdraw_fees(
        &ctx.accounts.role_authority,
        &ctx.accounts.treasury_role,
        amount,
    )?;

    let asset_mint_key = ctx.accounts.vault.asset_mint;
    let vault_id_bytes = ctx.accounts.vault.vault_id.to_le_bytes();
    let bump = ctx.accounts.vault.bump;
    let signer_seeds: &[&[&[u8]]] = &[&[
        VAULT_SEED,
        asset_mint_key.as_ref(),
        vault_id_bytes.as_ref(),
        &[bump],
    ]];

    transfer_checked(
        CpiContext::new_with_signer(
            ctx.accounts.asset_token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.asset_vault.to_account_info(),
                to: ctx.accounts.treasury_asset_account.to_account_info(),
                mint: ctx.accounts.asset_mint.to_account_info(),
                authority: ctx.accounts.vault.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
        ctx.accounts.asset_mint.decimals,
    )?;

    emit!(FeesWithdrawn {
        vault: ctx.accounts.vault.key(),
        treasury: ctx.accounts.treasury.key(),
        amount,
    });

    Ok(())
}
