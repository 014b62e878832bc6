use anchor_lang::prelude::*;

use crate::{
    adapters::{AdapterError, OpportunityAdapter, VenueRouter},
    constants::{MAX_OPPORTUNITIES, MAX_RISK_METRIC, STRATEGY_SEED},
    error::VaultError,
    math::percent_of,
    scoring::{self, RankedOpportunity},
    state::{Role, RoleAuthority, UserRole, Vault, VenuePosition},
};

const MANAGER_ROLES: &[Role] = &[Role::StrategyManager, Role::Admin];

/// Catalog entry for one yield venue
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Opportunity {
    pub id: u8,
    /// Venue label, zero padded
    pub name: [u8; 32],
    /// Annualized yield in hundredths of a percent (850 = 8.50%)
    pub apy_bps_x100: u32,
    pub volatility: u8,
    pub il_risk: u8,
    pub safety: u8,
    /// Cached score, refreshed on register, update and evaluate
    pub score: u16,
    pub last_updated: i64,
}

impl Opportunity {
    pub const SIZE: usize = 1 + // id
        32 + // name
        4 +  // apy_bps_x100
        1 +  // volatility
        1 +  // il_risk
        1 +  // safety
        2 +  // score
        8; // last_updated

    pub fn compute_score(&self) -> u16 {
        scoring::score(self.apy_bps_x100, self.volatility, self.il_risk, self.safety)
    }

    fn apply(&mut self, params: &OpportunityParams, now: i64) {
        self.name = params.name;
        self.apy_bps_x100 = params.apy_bps_x100;
        self.volatility = params.volatility;
        self.il_risk = params.il_risk;
        self.safety = params.safety;
        self.score = self.compute_score();
        self.last_updated = now;
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpportunityParams {
    pub name: [u8; 32],
    pub apy_bps_x100: u32,
    pub volatility: u8,
    pub il_risk: u8,
    pub safety: u8,
}

impl OpportunityParams {
    pub fn validate(&self) -> Result<()> {
        require!(
            self.volatility <= MAX_RISK_METRIC
                && self.il_risk <= MAX_RISK_METRIC
                && self.safety <= MAX_RISK_METRIC,
            VaultError::InvalidParameters
        );
        Ok(())
    }
}

/// A capital move chosen by the engine
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebalancePlan {
    pub from: Option<u8>,
    pub to: u8,
    pub amount: u64,
    pub current_score: u16,
    pub best_score: u16,
    /// Realized yield collected from the outgoing venue on execution
    pub yield_collected: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebalanceOutcome {
    Held { current_score: u16, best_score: u16 },
    Moved(RebalancePlan),
}

#[account]
pub struct StrategyState {
    pub vault: Pubkey,
    /// Live entries at the front of `opportunities`
    pub num_opportunities: u8,
    /// Next id handed out. Ids are never reused, so a strategy registers at
    /// most 255 opportunities over its lifetime (removals included).
    pub next_opportunity_id: u8,
    /// Minimum score improvement before capital moves
    pub rebalance_threshold: u16,
    /// Seconds between rebalances
    pub rebalance_cooldown: i64,
    /// Zero until the first rebalance
    pub last_rebalance_at: i64,
    /// Mirrors the vault's deployed_value
    pub deployed_value: u64,
    /// Opportunity holding capital, None while idle
    pub current_opportunity_id: Option<u8>,
    pub opportunities: [Opportunity; MAX_OPPORTUNITIES],
    /// PDA bump seed
    pub bump: u8,
}

impl StrategyState {
    pub const LEN: usize = 8 +  // discriminator
        32 + // vault
        1 +  // num_opportunities
        1 +  // next_opportunity_id
        2 +  // rebalance_threshold
        8 +  // rebalance_cooldown
        8 +  // last_rebalance_at
        8 +  // deployed_value
        1 + 1 + // current_opportunity_id (Option<u8>)
        Opportunity::SIZE * MAX_OPPORTUNITIES + // opportunities
        1; // bump

    pub const SEED_PREFIX: &'static [u8] = STRATEGY_SEED;

    pub fn new(vault: Pubkey, rebalance_threshold: u16, rebalance_cooldown: i64, bump: u8) -> Self {
        Self {
            vault,
            num_opportunities: 0,
            next_opportunity_id: 0,
            rebalance_threshold,
            rebalance_cooldown,
            last_rebalance_at: 0,
            deployed_value: 0,
            current_opportunity_id: None,
            opportunities: [Opportunity::default(); MAX_OPPORTUNITIES],
            bump,
        }
    }

    /// Registered opportunities in registration order
    pub fn catalog(&self) -> &[Opportunity] {
        &self.opportunities[..self.num_opportunities as usize]
    }

    pub fn opportunity(&self, id: u8) -> Option<&Opportunity> {
        self.catalog().iter().find(|opportunity| opportunity.id == id)
    }

    fn index_of(&self, id: u8) -> Result<usize> {
        self.catalog()
            .iter()
            .position(|opportunity| opportunity.id == id)
            .ok_or_else(|| error!(VaultError::OpportunityNotFound))
    }

    pub fn register_opportunity(
        &mut self,
        roles: &RoleAuthority,
        caller: &UserRole,
        params: &OpportunityParams,
        now: i64,
    ) -> Result<u8> {
        roles.require_any_role(caller, MANAGER_ROLES)?;
        params.validate()?;

        let slot = self.num_opportunities as usize;
        require!(slot < MAX_OPPORTUNITIES, VaultError::CatalogFull);

        let id = self.next_opportunity_id;
        self.next_opportunity_id = id.checked_add(1).ok_or(VaultError::CatalogFull)?;

        let mut opportunity = Opportunity {
            id,
            ..Opportunity::default()
        };
        opportunity.apply(params, now);
        self.opportunities[slot] = opportunity;
        self.num_opportunities += 1;

        Ok(id)
    }

    /// Replace the metrics of `id` in place. Returns the new score.
    pub fn update_opportunity(
        &mut self,
        roles: &RoleAuthority,
        caller: &UserRole,
        id: u8,
        params: &OpportunityParams,
        now: i64,
    ) -> Result<u16> {
        roles.require_any_role(caller, MANAGER_ROLES)?;
        params.validate()?;

        let index = self.index_of(id)?;
        let opportunity = &mut self.opportunities[index];
        opportunity.apply(params, now);
        Ok(opportunity.score)
    }

    /// Drop `id` from the catalog, keeping the remaining entries in order.
    pub fn remove_opportunity(&mut self, roles: &RoleAuthority, caller: &UserRole, id: u8) -> Result<()> {
        roles.require_any_role(caller, MANAGER_ROLES)?;
        require!(
            self.current_opportunity_id != Some(id),
            VaultError::InvalidParameters
        );

        let index = self.index_of(id)?;
        let len = self.num_opportunities as usize;
        self.opportunities.copy_within(index + 1..len, index);
        self.opportunities[len - 1] = Opportunity::default();
        self.num_opportunities -= 1;
        Ok(())
    }

    /// Rank the catalog without touching cached scores.
    pub fn ranking(&self) -> Vec<RankedOpportunity> {
        scoring::rank(self.catalog())
    }

    /// Refresh every cached score and return the ranking. Allocation is
    /// left alone.
    pub fn evaluate(&mut self, roles: &RoleAuthority, caller: &UserRole) -> Result<Vec<RankedOpportunity>> {
        roles.require_any_role(caller, MANAGER_ROLES)?;

        let len = self.num_opportunities as usize;
        for opportunity in self.opportunities[..len].iter_mut() {
            opportunity.score = opportunity.compute_score();
        }
        Ok(self.ranking())
    }

    /// Decide whether capital should move, and how much.
    pub fn plan_rebalance(&self, vault: &Vault, now: i64) -> Result<RebalanceOutcome> {
        if self.last_rebalance_at != 0 {
            require!(
                now.saturating_sub(self.last_rebalance_at) >= self.rebalance_cooldown,
                VaultError::Cooldown
            );
        }

        let current_score = self
            .current_opportunity_id
            .and_then(|id| self.opportunity(id))
            .map(Opportunity::compute_score)
            .unwrap_or(0);

        let best = match self.ranking().first() {
            Some(best) => *best,
            None => {
                return Ok(RebalanceOutcome::Held {
                    current_score,
                    best_score: 0,
                })
            }
        };

        let held = RebalanceOutcome::Held {
            current_score,
            best_score: best.score,
        };
        if self.current_opportunity_id == Some(best.id)
            || !scoring::should_rebalance(current_score, best.score, self.rebalance_threshold)
        {
            return Ok(held);
        }

        let amount = match self.current_opportunity_id {
            Some(_) => vault.deployed_value,
            None => percent_of(vault.total_assets, vault.strategy_allocation)?,
        };
        if self.current_opportunity_id.is_none() && amount == 0 {
            return Ok(held);
        }

        Ok(RebalanceOutcome::Moved(RebalancePlan {
            from: self.current_opportunity_id,
            to: best.id,
            amount,
            current_score,
            best_score: best.score,
            yield_collected: 0,
        }))
    }

    /// Move `plan.amount` of principal from the current venue into the
    /// target. Returns the realized yield collected from the source first.
    ///
    /// The source's pending yield is harvested into the vault before any
    /// principal moves, so nothing is left behind on a venue that no longer
    /// holds the allocation. If the target refuses the deposit the principal
    /// is returned to the source; if the source refuses it back as well, the
    /// capital is recorded as idle. Either way the target's error is
    /// returned and the collected yield stays credited.
    pub fn execute_rebalance(
        &mut self,
        vault: &mut Vault,
        plan: &RebalancePlan,
        mut from: Option<&mut dyn OpportunityAdapter>,
        to: &mut dyn OpportunityAdapter,
        now: i64,
    ) -> Result<u64> {
        require!(
            plan.from == self.current_opportunity_id,
            VaultError::AccountMismatch
        );
        require!(self.opportunity(plan.to).is_some(), VaultError::OpportunityNotFound);
        require!(plan.amount <= vault.total_assets, VaultError::InsufficientLiquidity);
        if plan.from.is_some() {
            require!(from.is_some(), VaultError::AccountMismatch);
        }

        let collected = match from.as_deref_mut().filter(|_| plan.from.is_some()) {
            Some(source) => vault.collect_yield(source)?.gross,
            None => 0,
        };

        if plan.amount > 0 {
            if let Some(source) = from.as_deref_mut().filter(|_| plan.from.is_some()) {
                let released = source.withdraw_principal(plan.amount)?;
                if released != plan.amount {
                    if released > 0 {
                        source.deposit(released)?;
                    }
                    return Err(AdapterError::UnexpectedAmount.into());
                }
            }

            if let Err(deposit_error) = to.deposit(plan.amount) {
                if let Some(source) = from.as_deref_mut().filter(|_| plan.from.is_some()) {
                    if source.deposit(plan.amount).is_err() {
                        self.current_opportunity_id = None;
                        self.deployed_value = 0;
                        vault.deployed_value = 0;
                    }
                }
                return Err(deposit_error.into());
            }
        }

        self.current_opportunity_id = Some(plan.to);
        self.deployed_value = plan.amount;
        vault.deployed_value = plan.amount;
        self.last_rebalance_at = now;
        Ok(collected)
    }

    /// Re-score the catalog and move capital to the best opportunity when
    /// it beats the current one by more than the threshold.
    pub fn rebalance(
        &mut self,
        roles: &RoleAuthority,
        caller: &UserRole,
        vault: &mut Vault,
        venues: &mut dyn VenueRouter,
        now: i64,
    ) -> Result<RebalanceOutcome> {
        roles.require_any_role(caller, MANAGER_ROLES)?;

        let mut outcome = self.plan_rebalance(vault, now)?;
        if let RebalanceOutcome::Moved(plan) = &mut outcome {
            let (from, to) = venues
                .route(plan.from, plan.to)
                .ok_or(VaultError::AccountMismatch)?;
            plan.yield_collected = self.execute_rebalance(vault, plan, from, to, now)?;
        }
        Ok(outcome)
    }

    /// Credit yield realized at a venue so the next harvest can collect it.
    pub fn report_yield(
        &self,
        roles: &RoleAuthority,
        caller: &UserRole,
        venue: &mut VenuePosition,
        amount: u64,
        now: i64,
    ) -> Result<()> {
        roles.require_any_role(caller, MANAGER_ROLES)?;
        require!(amount > 0, VaultError::InvalidAmount);
        require!(
            self.opportunity(venue.opportunity_id).is_some(),
            VaultError::OpportunityNotFound
        );

        venue.credit_yield(amount, now)
    }
}
