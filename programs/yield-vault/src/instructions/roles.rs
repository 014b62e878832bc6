use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::set_return_data;

use crate::{
    constants::{ROLE_AUTHORITY_SEED, USER_ROLE_SEED},
    error::VaultError,
    events::{EmergencyPauseSet, RoleAssigned, RoleRevoked},
    state::{Role, RoleAuthority, UserRole, Vault},
};

#[derive(Accounts)]
pub struct AssignRole<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    pub vault: Account<'info, Vault>,

    #[account(
        mut,
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

    /// CHECK: any account can be granted a role; only its address is used
    pub target: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = admin,
        space = UserRole::LEN,
        seeds = [USER_ROLE_SEED, vault.key().as_ref(), target.key().as_ref()],
        bump
    )]
    pub target_role: Account<'info, UserRole>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct RevokeRole<'info> {
    pub admin: Signer<'info>,

    pub vault: Account<'info, Vault>,

    #[account(
        mut,
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
        mut,
        seeds = [USER_ROLE_SEED, vault.key().as_ref(), target_role.account.as_ref()],
        bump = target_role.bump,
    )]
    pub target_role: Account<'info, UserRole>,
}

#[derive(Accounts)]
pub struct SetEmergencyPause<'info> {
    pub super_admin: Signer<'info>,

    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [ROLE_AUTHORITY_SEED, vault.key().as_ref()],
        bump = role_authority.bump,
        has_one = vault @ VaultError::AccountMismatch,
    )]
    pub role_authority: Account<'info, RoleAuthority>,
}

#[derive(Accounts)]
pub struct RoleView<'info> {
    pub vault: Account<'info, Vault>,

    #[account(
        seeds = [ROLE_AUTHORITY_SEED, vault.key().as_ref()],
        bump = role_authority.bump,
        has_one = vault @ VaultError::AccountMismatch,
    )]
    pub role_authority: Account<'info, RoleAuthority>,

    #[account(
        seeds = [USER_ROLE_SEED, vault.key().as_ref(), user_role.account.as_ref()],
        bump = user_role.bump,
    )]
    pub user_role: Account<'info, UserRole>,
}

/// Grant `role` to `target`, creating its role record on first use
pub fn assign_role(ctx: Context<AssignRole>, role: Role) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault_key = ctx.accounts.vault.key();
    let target = ctx.accounts.target.key();

    let target_role = &mut ctx.accounts.target_role;
    target_role.bind(target, vault_key, ctx.bumps.target_role)?;

    let granted = ctx.accounts.role_authority.assign_role(
        &ctx.accounts.admin_role,
        target_role,
        role,
        now,
    )?;

    if granted {
        emit!(RoleAssigned {
            vault: vault_key,
            account: target,
            role,
            assigned_by: ctx.accounts.admin.key(),
        });
    }

    Ok(())
}

/// Clear `role` on the target; a no-op when the bit is not set
pub fn revoke_role(ctx: Context<RevokeRole>, role: Role) -> Result<()> {
    let revoked = ctx.accounts.role_authority.revoke_role(
        &ctx.accounts.admin_role,
        &mut ctx.accounts.target_role,
        role,
    )?;

    if revoked {
        emit!(RoleRevoked {
            vault: ctx.accounts.vault.key(),
            account: ctx.accounts.target_role.account,
            role,
            revoked_by: ctx.accounts.admin.key(),
        });
    }

    Ok(())
}

/// Toggle the global override that disables every role check
pub fn set_emergency_pause(ctx: Context<SetEmergencyPause>, paused: bool) -> Result<()> {
    ctx.accounts
        .role_authority
        .set_emergency_pause(&ctx.accounts.super_admin.key(), paused)?;

    emit!(EmergencyPauseSet {
        vault: ctx.accounts.vault.key(),
        paused,
    });

    msg!("Emergency pause set to {}", paused);

    Ok(())
}

/// Whether the record's account currently holds `role`
pub fn has_role(ctx: Context<RoleView>, role: Role) -> Result<()> {
    let held = ctx
        .accounts
        .role_authority
        .has_role(&ctx.accounts.user_role, role);
    set_return_data(&[held as u8]);
    Ok(())
}
