use anchor_lang::prelude::*;

use crate::state::Role;

#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub asset_mint: Pubkey,
    pub vault_id: u64,
}

#[event]
pub struct Deposited {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub assets: u64,
    pub shares: u64,
}

#[event]
pub struct Withdrawn {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub assets: u64,
    pub shares: u64,
    pub recalled: u64,
}

#[event]
pub struct Harvested {
    pub vault: Pubkey,
    pub opportunity_id: u8,
    pub gross: u64,
    pub fee: u64,
    pub net: u64,
}

#[event]
pub struct FeesWithdrawn {
    pub vault: Pubkey,
    pub treasury: Pubkey,
    pub amount: u64,
}

#[event]
pub struct SettingsUpdated {
    pub vault: Pubkey,
    pub strategy_allocation: u8,
    pub performance_fee_bps: u16,
}

#[event]
pub struct RoleAssigned {
    pub vault: Pubkey,
    pub account: Pubkey,
    pub role: Role,
    pub assigned_by: Pubkey,
}

#[event]
pub struct RoleRevoked {
    pub vault: Pubkey,
    pub account: Pubkey,
    pub role: Role,
    pub revoked_by: Pubkey,
}

#[event]
pub struct EmergencyPauseSet {
    pub vault: Pubkey,
    pub paused: bool,
}

#[event]
pub struct StrategyInitialized {
    pub vault: Pubkey,
    pub rebalance_threshold: u16,
    pub rebalance_cooldown: i64,
}

#[event]
pub struct OpportunityRegistered {
    pub vault: Pubkey,
    pub opportunity_id: u8,
    pub score: u16,
}

#[event]
pub struct OpportunityUpdated {
    pub vault: Pubkey,
    pub opportunity_id: u8,
    pub score: u16,
}

#[event]
pub struct OpportunityRemoved {
    pub vault: Pubkey,
    pub opportunity_id: u8,
}

#[event]
pub struct Rebalanced {
    pub vault: Pubkey,
    pub from: Option<u8>,
    pub to: u8,
    pub amount: u64,
    pub previous_score: u16,
    pub new_score: u16,
    /// Realized yield collected from the outgoing venue
    pub yield_collected: u64,
}

#[event]
pub struct YieldReported {
    pub vault: Pubkey,
    pub opportunity_id: u8,
    pub amount: u64,
}
