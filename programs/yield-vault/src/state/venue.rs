use anchor_lang::prelude::*;

use crate::{
    adapters::{draw_principal, draw_yield_first, AdapterError, AdapterResult, OpportunityAdapter},
    constants::VENUE_SEED,
    error::VaultError,
};

/// Ledger-side position the vault holds with one opportunity.
///
/// Custody never leaves the vault's token account; this record tracks how
/// much of it is attributed to the venue and the yield a keeper has
/// reported for it.
#[account]
#[derive(Default)]
pub struct VenuePosition {
    pub vault: Pubkey,
    pub opportunity_id: u8,
    /// Capital placed by rebalancing
    pub principal: u64,
    /// Yield reported but not yet harvested
    pub pending_yield: u64,
    pub last_updated: i64,
    /// PDA bump seed
    pub bump: u8,
}

impl VenuePosition {
    pub const LEN: usize = 8 +  // discriminator
        32 + // vault
        1 +  // opportunity_id
        8 +  // principal
        8 +  // pending_yield
        8 +  // last_updated
        1; // bump

    pub const SEED_PREFIX: &'static [u8] = VENUE_SEED;

    pub fn new(vault: Pubkey, opportunity_id: u8, bump: u8) -> Self {
        Self {
            vault,
            opportunity_id,
            bump,
            ..Self::default()
        }
    }

    pub fn balance(&self) -> u64 {
        self.principal.saturating_add(self.pending_yield)
    }

    pub fn credit_yield(&mut self, amount: u64, now: i64) -> Result<()> {
        self.pending_yield = self
            .pending_yield
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        self.last_updated = now;
        Ok(())
    }
}

impl OpportunityAdapter for VenuePosition {
    fn deposit(&mut self, amount: u64) -> AdapterResult<()> {
        if amount == 0 {
            return Err(AdapterError::ZeroAmount);
        }
        self.principal = self
            .principal
            .checked_add(amount)
            .ok_or(AdapterError::Overflow)?;
        Ok(())
    }

    fn withdraw(&mut self, amount: u64) -> AdapterResult<u64> {
        draw_yield_first(&mut self.principal, &mut self.pending_yield, amount)
    }

    fn withdraw_principal(&mut self, amount: u64) -> AdapterResult<u64> {
        draw_principal(&mut self.principal, amount)
    }

    fn accrued_yield(&self) -> u64 {
        self.pending_yield
    }
}
