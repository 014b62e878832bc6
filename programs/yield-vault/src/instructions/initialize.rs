use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{Mint, TokenAccount, TokenInterface},
};

use crate::{
    constants::{ROLE_AUTHORITY_SEED, USER_ROLE_SEED, VAULT_SEED},
    events::VaultInitialized,
    state::{RoleAuthority, UserRole, Vault},
};

#[derive(Accounts)]
#[instruction(vault_id: u64)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        init,
        payer = authority,
        space = Vault::LEN,
        seeds = [VAULT_SEED, asset_mint.key().as_ref(), &vault_id.to_le_bytes()],
        bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        init,
        payer = authority,
        space = RoleAuthority::LEN,
        seeds = [ROLE_AUTHORITY_SEED, vault.key().as_ref()],
        bump
    )]
    pub role_authority: Account<'info, RoleAuthority>,

    #[account(
        init,
        payer = authority,
        space = UserRole::LEN,
        seeds = [USER_ROLE_SEED, vault.key().as_ref(), authority.key().as_ref()],
        bump
    )]
    pub authority_role: Account<'info, UserRole>,

    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(
        init,
        payer = authority,
        associated_token::mint = asset_mint,
        associated_token::authority = vault,
        associated_token::token_program = asset_token_program,
    )]
    pub asset_vault: InterfaceAccount<'info, TokenAccount>,

    pub asset_token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>, vault_id: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault_key = ctx.accounts.vault.key();
    let authority = ctx.accounts.authority.key();

    ctx.accounts.vault.set_inner(Vault::new(
        authority,
        ctx.accounts.asset_mint.key(),
        ctx.accounts.asset_vault.key(),
        vault_id,
        ctx.bumps.vault,
    ));

    let authority_role = &mut ctx.accounts.authority_role;
    authority_role.bind(authority, vault_key, ctx.bumps.authority_role)?;
    ctx.accounts.role_authority.initialize(
        vault_key,
        authority_role,
        ctx.bumps.role_authority,
        now,
    )?;

    emit!(VaultInitialized {
        vault: vault_key,
        authority,
        asset_mint: ctx.accounts.asset_mint.key(),
        vault_id,
    });

    msg!("Vault {} initialized with super admin {}", vault_id, authority);

    Ok(())
}
