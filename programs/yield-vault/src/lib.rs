use anchor_lang::prelude::*;

pub mod adapters;
pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod math;
pub mod pda;
pub mod scoring;
pub mod state;

use instructions::*;
use state::{OpportunityParams, Role, SettingsUpdate};

declare_id!("2nMr2an62tQzRbqBHuVn9oPxgkZfTfr5Sku2dKejU7Lu");

#[program]
pub mod yield_vault {
    use super::*;

    /// Create a vault for `asset_mint` together with its role authority.
    /// The initializer becomes super admin and first Admin.
    pub fn initialize(ctx: Context<Initialize>, vault_id: u64) -> Result<()> {
        instructions::initialize::handler(ctx, vault_id)
    }

    /// Deposit assets and receive shares
    pub fn deposit(ctx: Context<Deposit>, assets: u64, min_shares_out: u64) -> Result<()> {
        instructions::deposit::handler(ctx, assets, min_shares_out)
    }

    /// Redeem shares against the idle reserve
    pub fn withdraw(ctx: Context<Withdraw>, shares: u64, min_assets_out: u64) -> Result<()> {
        instructions::withdraw::handler(ctx, shares, min_assets_out)
    }

    /// Redeem shares, recalling any shortfall from the active venue
    pub fn withdraw_with_recall(
        ctx: Context<Withdraw>,
        shares: u64,
        min_assets_out: u64,
    ) -> Result<()> {
        instructions::withdraw::handler_with_recall(ctx, shares, min_assets_out)
    }

    /// Collect reported yield from the active venue (Admin)
    pub fn harvest(ctx: Context<Harvest>) -> Result<()> {
        instructions::harvest::handler(ctx)
    }

    /// Pay out accrued performance fees (Treasury)
    pub fn withdraw_fees(ctx: Context<WithdrawFees>, amount: u64) -> Result<()> {
        instructions::admin::withdraw_fees(ctx, amount)
    }

    /// Change allocation and fee settings (Admin)
    pub fn update_settings(ctx: Context<UpdateSettings>, update: SettingsUpdate) -> Result<()> {
        instructions::admin::update_settings(ctx, update)
    }

    // ============ Roles ============

    pub fn assign_role(ctx: Context<AssignRole>, role: Role) -> Result<()> {
        instructions::roles::assign_role(ctx, role)
    }

    pub fn revoke_role(ctx: Context<RevokeRole>, role: Role) -> Result<()> {
        instructions::roles::revoke_role(ctx, role)
    }

    /// Super admin only
    pub fn set_emergency_pause(ctx: Context<SetEmergencyPause>, paused: bool) -> Result<()> {
        instructions::roles::set_emergency_pause(ctx, paused)
    }

    // ============ Strategy ============

    pub fn initialize_strategy(
        ctx: Context<InitializeStrategy>,
        rebalance_threshold: u16,
        rebalance_cooldown: i64,
    ) -> Result<()> {
        instructions::strategy::initialize_strategy(ctx, rebalance_threshold, rebalance_cooldown)
    }

    pub fn register_opportunity(
        ctx: Context<RegisterOpportunity>,
        params: OpportunityParams,
    ) -> Result<()> {
        instructions::strategy::register_opportunity(ctx, params)
    }

    pub fn update_opportunity(
        ctx: Context<ManageStrategy>,
        opportunity_id: u8,
        params: OpportunityParams,
    ) -> Result<()> {
        instructions::strategy::update_opportunity(ctx, opportunity_id, params)
    }

    pub fn remove_opportunity(ctx: Context<ManageStrategy>, opportunity_id: u8) -> Result<()> {
        instructions::strategy::remove_opportunity(ctx, opportunity_id)
    }

    /// Rescore the catalog; returns the ranking
    pub fn evaluate(ctx: Context<ManageStrategy>) -> Result<()> {
        instructions::strategy::evaluate(ctx)
    }

    /// Move capital to the best opportunity if it clears the threshold
    pub fn rebalance(ctx: Context<Rebalance>) -> Result<()> {
        instructions::strategy::rebalance(ctx)
    }

    /// Keeper path: bring realized venue yield into custody
    pub fn report_yield(ctx: Context<ReportYield>, amount: u64) -> Result<()> {
        instructions::strategy::report_yield(ctx, amount)
    }

    // ============ View Functions ============

    pub fn preview_deposit(ctx: Context<VaultView>, assets: u64) -> Result<()> {
        instructions::view::preview_deposit(ctx, assets)
    }

    pub fn preview_withdraw(ctx: Context<VaultView>, shares: u64) -> Result<()> {
        instructions::view::preview_withdraw(ctx, shares)
    }

    pub fn share_price(ctx: Context<VaultView>) -> Result<()> {
        instructions::view::share_price(ctx)
    }

    pub fn total_assets(ctx: Context<VaultView>) -> Result<()> {
        instructions::view::get_total_assets(ctx)
    }

    pub fn idle_reserve(ctx: Context<VaultView>) -> Result<()> {
        instructions::view::idle_reserve(ctx)
    }

    pub fn has_role(ctx: Context<RoleView>, role: Role) -> Result<()> {
        instructions::roles::has_role(ctx, role)
    }
}
