use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::set_return_data;

use crate::state::Vault;

#[derive(Accounts)]
pub struct VaultView<'info> {
    pub vault: Account<'info, Vault>,
}

/// Preview how many shares a deposit of `assets` would mint (floor rounding)
pub fn preview_deposit(ctx: Context<VaultView>, assets: u64) -> Result<()> {
    let shares = ctx.accounts.vault.preview_deposit(assets)?;
    set_return_data(&shares.to_le_bytes());
    Ok(())
}

/// Preview how many assets redeeming `shares` would release (floor rounding)
pub fn preview_withdraw(ctx: Context<VaultView>, shares: u64) -> Result<()> {
    let assets = ctx.accounts.vault.preview_withdraw(shares)?;
    set_return_data(&assets.to_le_bytes());
    Ok(())
}

/// Assets per share, scaled by 1e9
pub fn share_price(ctx: Context<VaultView>) -> Result<()> {
    let price = ctx.accounts.vault.share_price()?;
    set_return_data(&price.to_le_bytes());
    Ok(())
}

/// Get total assets managed by the vault
pub fn get_total_assets(ctx: Context<VaultView>) -> Result<()> {
    set_return_data(&ctx.accounts.vault.total_assets.to_le_bytes());
    Ok(())
}

/// Assets withdrawable without recalling from the active venue
pub fn idle_reserve(ctx: Context<VaultView>) -> Result<()> {
    set_return_data(&ctx.accounts.vault.idle_reserve().to_le_bytes());
    Ok(())
}
