use anchor_lang::prelude::*;

use crate::{
    adapters::{AdapterError, OpportunityAdapter},
    constants::{
        DEFAULT_PERFORMANCE_FEE_BPS, DEFAULT_STRATEGY_ALLOCATION, MAX_PERFORMANCE_FEE_BPS,
        MAX_STRATEGY_ALLOCATION, USER_POSITION_SEED, VAULT_SEED,
    },
    error::VaultError,
    math::{assets_for_shares, share_price, shares_for_deposit, split_fee},
    state::{Role, RoleAuthority, StrategyState, UserRole},
};

const DEPOSITOR_ROLES: &[Role] = &[Role::RegularUser, Role::Admin];

#[account]
pub struct Vault {
    /// Initializer, also the super admin of the role authority
    pub authority: Pubkey,
    /// Underlying asset mint
    pub asset_mint: Pubkey,
    /// Token account holding assets
    pub asset_vault: Pubkey,
    /// Unique vault identifier (allows multiple vaults per asset)
    pub vault_id: u64,
    /// Assets under management, excluding uncollected fees
    pub total_assets: u64,
    /// Outstanding shares
    pub total_shares: u64,
    /// Distinct depositors
    pub num_users: u64,
    /// Portion of total_assets allocated to the active opportunity
    pub deployed_value: u64,
    /// Performance fees owed to the treasury
    pub fees_accrued: u64,
    /// Cumulative net yield harvested
    pub total_yield: u64,
    /// Percent of total_assets deployed when leaving an idle state
    pub strategy_allocation: u8,
    /// Fee on harvested yield, in basis points
    pub performance_fee_bps: u16,
    /// PDA bump seed
    pub bump: u8,
    /// Reserved for future upgrades
    pub _reserved: [u8; 32],
}

impl Vault {
    pub const LEN: usize = 8 +   // discriminator
        32 +  // authority
        32 +  // asset_mint
        32 +  // asset_vault
        8 +   // vault_id
        8 +   // total_assets
        8 +   // total_shares
        8 +   // num_users
        8 +   // deployed_value
        8 +   // fees_accrued
        8 +   // total_yield
        1 +   // strategy_allocation
        2 +   // performance_fee_bps
        1 +   // bump
        32; // _reserved

    pub const SEED_PREFIX: &'static [u8] = VAULT_SEED;

    pub fn new(
        authority: Pubkey,
        asset_mint: Pubkey,
        asset_vault: Pubkey,
        vault_id: u64,
        bump: u8,
    ) -> Self {
        Self {
            authority,
            asset_mint,
            asset_vault,
            vault_id,
            total_assets: 0,
            total_shares: 0,
            num_users: 0,
            deployed_value: 0,
            fees_accrued: 0,
            total_yield: 0,
            strategy_allocation: DEFAULT_STRATEGY_ALLOCATION,
            performance_fee_bps: DEFAULT_PERFORMANCE_FEE_BPS,
            bump,
            _reserved: [0u8; 32],
        }
    }

    /// Assets available for withdrawal without touching the active venue
    pub fn idle_reserve(&self) -> u64 {
        self.total_assets.saturating_sub(self.deployed_value)
    }

    pub fn preview_deposit(&self, amount: u64) -> Result<u64> {
        shares_for_deposit(amount, self.total_assets, self.total_shares)
    }

    pub fn preview_withdraw(&self, shares: u64) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(0);
        }
        assets_for_shares(shares, self.total_assets, self.total_shares)
    }

    pub fn share_price(&self) -> Result<u64> {
        share_price(self.total_assets, self.total_shares)
    }

    /// Credit `amount` to `position` and mint shares at the current price.
    /// Returns the shares minted.
    pub fn deposit(
        &mut self,
        roles: &RoleAuthority,
        caller: &UserRole,
        position: &mut UserPosition,
        amount: u64,
        now: i64,
    ) -> Result<u64> {
        roles.require_any_role(caller, DEPOSITOR_ROLES)?;
        require_keys_eq!(position.owner, caller.account, VaultError::AccountMismatch);
        require!(amount > 0, VaultError::InvalidAmount);

        let minted = shares_for_deposit(amount, self.total_assets, self.total_shares)?;
        require!(minted > 0, VaultError::InvalidAmount);

        let total_assets = self
            .total_assets
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        let total_shares = self
            .total_shares
            .checked_add(minted)
            .ok_or(VaultError::MathOverflow)?;
        let position_shares = position
            .shares
            .checked_add(minted)
            .ok_or(VaultError::MathOverflow)?;
        let total_deposited = position
            .total_deposited
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;

        let first_deposit = position.total_deposited == 0;
        if first_deposit {
            self.num_users = self
                .num_users
                .checked_add(1)
                .ok_or(VaultError::MathOverflow)?;
            position.first_deposit_at = now;
        }

        self.total_assets = total_assets;
        self.total_shares = total_shares;
        position.shares = position_shares;
        position.total_deposited = total_deposited;

        Ok(minted)
    }

    /// Burn `shares` from `position` and release the proportional assets.
    /// Not role-gated: revoking a role or pausing never traps a holder's
    /// funds.
    ///
    /// Assets beyond the idle reserve are only available when `recall` is
    /// supplied, in which case the shortfall is pulled back from the active
    /// venue and the deployed figure is lowered on both the vault and the
    /// strategy.
    pub fn withdraw(
        &mut self,
        owner: &Pubkey,
        position: &mut UserPosition,
        shares: u64,
        recall: Option<Recall<'_>>,
    ) -> Result<Withdrawal> {
        require_keys_eq!(position.owner, *owner, VaultError::AccountMismatch);
        require!(
            shares > 0 && shares <= position.shares,
            VaultError::InsufficientShares
        );

        let assets = assets_for_shares(shares, self.total_assets, self.total_shares)?;
        require!(assets > 0, VaultError::InvalidAmount);

        let total_assets = self
            .total_assets
            .checked_sub(assets)
            .ok_or(VaultError::MathOverflow)?;
        let total_shares = self
            .total_shares
            .checked_sub(shares)
            .ok_or(VaultError::MathOverflow)?;

        let idle = self.idle_reserve();
        let recalled = if assets > idle {
            let shortfall = assets - idle;
            let Recall { strategy, adapter } = recall.ok_or(VaultError::InsufficientLiquidity)?;
            require!(
                strategy.current_opportunity_id.is_some(),
                VaultError::NoActiveOpportunity
            );
            require!(
                shortfall <= self.deployed_value,
                VaultError::InsufficientLiquidity
            );

            let released = adapter.withdraw_principal(shortfall)?;
            if released != shortfall {
                if released > 0 {
                    adapter.deposit(released)?;
                }
                return Err(AdapterError::UnexpectedAmount.into());
            }

            self.deployed_value -= shortfall;
            strategy.deployed_value = self.deployed_value;
            shortfall
        } else {
            0
        };

        self.total_assets = total_assets;
        self.total_shares = total_shares;
        position.shares -= shares;

        Ok(Withdrawal {
            assets,
            shares,
            recalled,
        })
    }

    /// Collect realized yield from the active venue into the idle reserve,
    /// splitting off the performance fee.
    pub fn harvest(
        &mut self,
        roles: &RoleAuthority,
        caller: &UserRole,
        strategy: &StrategyState,
        adapter: &mut dyn OpportunityAdapter,
    ) -> Result<HarvestReceipt> {
        roles.require_role(caller, Role::Admin)?;
        require!(
            strategy.current_opportunity_id.is_some(),
            VaultError::NoActiveOpportunity
        );

        require!(adapter.accrued_yield() > 0, VaultError::NoYield);

        self.collect_yield(adapter)
    }

    /// Move a venue's realized yield into the idle reserve.
    ///
    /// With no shares outstanding there is nobody to credit, so the whole
    /// amount goes to `fees_accrued` and `total_assets` stays at zero.
    pub(crate) fn collect_yield(
        &mut self,
        adapter: &mut dyn OpportunityAdapter,
    ) -> Result<HarvestReceipt> {
        let gross = adapter.accrued_yield();
        if gross == 0 {
            return Ok(HarvestReceipt::default());
        }

        let (fee, net) = if self.total_shares == 0 {
            (gross, 0)
        } else {
            split_fee(gross, self.performance_fee_bps)?
        };
        let total_assets = self
            .total_assets
            .checked_add(net)
            .ok_or(VaultError::MathOverflow)?;
        let total_yield = self
            .total_yield
            .checked_add(net)
            .ok_or(VaultError::MathOverflow)?;
        let fees_accrued = self
            .fees_accrued
            .checked_add(fee)
            .ok_or(VaultError::MathOverflow)?;

        let released = adapter.withdraw(gross)?;
        if released != gross {
            if released > 0 {
                adapter.deposit(released)?;
            }
            return Err(AdapterError::UnexpectedAmount.into());
        }

        self.total_assets = total_assets;
        self.total_yield = total_yield;
        self.fees_accrued = fees_accrued;

        Ok(HarvestReceipt { gross, fee, net })
    }

    pub fn withdraw_fees(&mut self, roles: &RoleAuthority, caller: &UserRole, amount: u64) -> Result<()> {
        roles.require_role(caller, Role::Treasury)?;
        require!(amount > 0, VaultError::InvalidAmount);
        require!(amount <= self.fees_accrued, VaultError::InsufficientFees);

        self.fees_accrued -= amount;
        Ok(())
    }

    /// Validate every provided value, then apply them together.
    pub fn update_settings(
        &mut self,
        roles: &RoleAuthority,
        caller: &UserRole,
        update: &SettingsUpdate,
    ) -> Result<()> {
        roles.require_role(caller, Role::Admin)?;

        if let Some(allocation) = update.strategy_allocation {
            require!(
                allocation <= MAX_STRATEGY_ALLOCATION,
                VaultError::InvalidAllocation
            );
        }
        if let Some(fee_bps) = update.performance_fee_bps {
            require!(
                fee_bps <= MAX_PERFORMANCE_FEE_BPS,
                VaultError::InvalidAllocation
            );
        }

        if let Some(allocation) = update.strategy_allocation {
            self.strategy_allocation = allocation;
        }
        if let Some(fee_bps) = update.performance_fee_bps {
            self.performance_fee_bps = fee_bps;
        }
        Ok(())
    }
}

#[account]
#[derive(Default)]
pub struct UserPosition {
    pub owner: Pubkey,
    pub vault: Pubkey,
    pub shares: u64,
    /// Cumulative assets deposited
    pub total_deposited: u64,
    pub first_deposit_at: i64,
    /// PDA bump seed
    pub bump: u8,
}

impl UserPosition {
    pub const LEN: usize = 8 +  // discriminator
        32 + // owner
        32 + // vault
        8 +  // shares
        8 +  // total_deposited
        8 +  // first_deposit_at
        1; // bump

    pub const SEED_PREFIX: &'static [u8] = USER_POSITION_SEED;

    pub fn new(owner: Pubkey, vault: Pubkey, bump: u8) -> Self {
        Self {
            owner,
            vault,
            bump,
            ..Self::default()
        }
    }

    /// Fill in identity fields of a freshly created position.
    pub fn bind(&mut self, owner: Pubkey, vault: Pubkey, bump: u8) -> Result<()> {
        if self.vault == Pubkey::default() {
            self.owner = owner;
            self.vault = vault;
            self.bump = bump;
        }
        require_keys_eq!(self.owner, owner, VaultError::AccountMismatch);
        require_keys_eq!(self.vault, vault, VaultError::AccountMismatch);
        Ok(())
    }
}

/// Optional settings change; `None` leaves a value untouched
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub strategy_allocation: Option<u8>,
    pub performance_fee_bps: Option<u16>,
}

/// Access to the active venue for withdrawals that exceed the idle reserve
pub struct Recall<'a> {
    pub strategy: &'a mut StrategyState,
    pub adapter: &'a mut dyn OpportunityAdapter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Withdrawal {
    pub assets: u64,
    pub shares: u64,
    /// Assets pulled back from the active venue
    pub recalled: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HarvestReceipt {
    pub gross: u64,
    pub fee: u64,
    pub net: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::ScriptedVenue;

    struct Fixture {
        vault: Vault,
        roles: RoleAuthority,
        admin: UserRole,
        vault_key: Pubkey,
    }

    fn setup() -> Fixture {
        let vault_key = Pubkey::new_unique();
        let mut admin = UserRole::new(Pubkey::new_unique(), vault_key, 1);
        let mut roles = RoleAuthority {
            vault: Pubkey::default(),
            super_admin: Pubkey::default(),
            emergency_pause: false,
            admin_count: 0,
            bump: 0,
        };
        roles.initialize(vault_key, &mut admin, 1, 0).unwrap();
        let vault = Vault::new(
            admin.account,
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            0,
            255,
        );
        Fixture {
            vault,
            roles,
            admin,
            vault_key,
        }
    }

    impl Fixture {
        fn member(&mut self, role: Role) -> (UserRole, UserPosition) {
            let mut record = UserRole::new(Pubkey::new_unique(), self.vault_key, 1);
            self.roles
                .assign_role(&self.admin, &mut record, role, 0)
                .unwrap();
            let position = UserPosition::new(record.account, self.vault_key, 1);
            (record, position)
        }

        fn deploy(&mut self, strategy: &mut StrategyState, amount: u64) {
            strategy.current_opportunity_id = Some(0);
            strategy.deployed_value = amount;
            self.vault.deployed_value = amount;
        }
    }

    fn err(e: VaultError) -> anchor_lang::error::Error {
        e.into()
    }

    fn strategy(vault: Pubkey) -> StrategyState {
        StrategyState::new(vault, 5, 0, 1)
    }

    #[test]
    fn test_first_deposit_bootstraps_one_to_one() {
        let mut f = setup();
        let (user, mut position) = f.member(Role::RegularUser);

        let minted = f
            .vault
            .deposit(&f.roles, &user, &mut position, 1_000_000, 42)
            .unwrap();
        assert_eq!(minted, 1_000_000);
        assert_eq!(f.vault.total_assets, 1_000_000);
        assert_eq!(f.vault.total_shares, 1_000_000);
        assert_eq!(f.vault.num_users, 1);
        assert_eq!(position.shares, 1_000_000);
        assert_eq!(position.first_deposit_at, 42);
    }

    #[test]
    fn test_repeat_deposit_counts_user_once() {
        let mut f = setup();
        let (user, mut position) = f.member(Role::RegularUser);
        f.vault.deposit(&f.roles, &user, &mut position, 100, 1).unwrap();
        f.vault.deposit(&f.roles, &user, &mut position, 100, 2).unwrap();
        assert_eq!(f.vault.num_users, 1);
        assert_eq!(position.total_deposited, 200);
        assert_eq!(position.first_deposit_at, 1);
    }

    #[test]
    fn test_deposit_after_yield_does_not_dilute() {
        let mut f = setup();
        let (alice, mut alice_pos) = f.member(Role::RegularUser);
        let (bob, mut bob_pos) = f.member(Role::RegularUser);

        f.vault.deposit(&f.roles, &alice, &mut alice_pos, 1_000, 0).unwrap();
        // yield lifts the price to 1.5
        f.vault.total_assets = 1_500;
        let price_before = f.vault.share_price().unwrap();

        let minted = f.vault.deposit(&f.roles, &bob, &mut bob_pos, 100, 0).unwrap();
        assert_eq!(minted, 66);
        assert_eq!(f.vault.total_shares, 1_066);
        assert!(f.vault.share_price().unwrap() >= price_before);
    }

    #[test]
    fn test_deposit_requires_role_and_amount() {
        let mut f = setup();
        let (treasury, mut position) = f.member(Role::Treasury);
        assert_eq!(
            f.vault
                .deposit(&f.roles, &treasury, &mut position, 100, 0)
                .unwrap_err(),
            err(VaultError::Unauthorized)
        );

        let (user, mut position) = f.member(Role::RegularUser);
        assert_eq!(
            f.vault.deposit(&f.roles, &user, &mut position, 0, 0).unwrap_err(),
            err(VaultError::InvalidAmount)
        );
        assert_eq!(f.vault.total_assets, 0);
    }

    #[test]
    fn test_admin_may_deposit() {
        let mut f = setup();
        let admin = f.admin.clone();
        let mut position = UserPosition::new(admin.account, f.vault_key, 1);
        assert_eq!(
            f.vault.deposit(&f.roles, &admin, &mut position, 10, 0).unwrap(),
            10
        );
    }

    #[test]
    fn test_deposit_minting_zero_shares_fails() {
        let mut f = setup();
        let (user, mut position) = f.member(Role::RegularUser);
        f.vault.deposit(&f.roles, &user, &mut position, 10, 0).unwrap();
        f.vault.total_assets = 1_000;
        // 5 × 10 / 1000 rounds to zero
        assert_eq!(
            f.vault.deposit(&f.roles, &user, &mut position, 5, 0).unwrap_err(),
            err(VaultError::InvalidAmount)
        );
        assert_eq!(f.vault.total_shares, 10);
    }

    #[test]
    fn test_withdraw_all_returns_deposit() {
        let mut f = setup();
        let (user, mut position) = f.member(Role::RegularUser);
        f.vault.deposit(&f.roles, &user, &mut position, 5_000, 0).unwrap();

        let out = f
            .vault
            .withdraw(&user.account, &mut position, 5_000, None)
            .unwrap();
        assert_eq!(
            out,
            Withdrawal {
                assets: 5_000,
                shares: 5_000,
                recalled: 0
            }
        );
        assert_eq!(f.vault.total_assets, 0);
        assert_eq!(f.vault.total_shares, 0);
        assert_eq!(position.shares, 0);
    }

    #[test]
    fn test_withdraw_share_bounds() {
        let mut f = setup();
        let (user, mut position) = f.member(Role::RegularUser);
        f.vault.deposit(&f.roles, &user, &mut position, 100, 0).unwrap();

        assert_eq!(
            f.vault
                .withdraw(&user.account, &mut position, 0, None)
                .unwrap_err(),
            err(VaultError::InsufficientShares)
        );
        assert_eq!(
            f.vault
                .withdraw(&user.account, &mut position, 101, None)
                .unwrap_err(),
            err(VaultError::InsufficientShares)
        );
    }

    #[test]
    fn test_withdraw_beyond_idle_reserve_needs_recall() {
        let mut f = setup();
        let (user, mut position) = f.member(Role::RegularUser);
        f.vault.deposit(&f.roles, &user, &mut position, 1_000, 0).unwrap();
        let mut strategy = strategy(f.vault_key);
        f.deploy(&mut strategy, 600);

        assert_eq!(
            f.vault
                .withdraw(&user.account, &mut position, 500, None)
                .unwrap_err(),
            err(VaultError::InsufficientLiquidity)
        );
        assert_eq!(position.shares, 1_000);

        // within the idle reserve a plain withdrawal works
        let out = f
            .vault
            .withdraw(&user.account, &mut position, 400, None)
            .unwrap();
        assert_eq!(out.assets, 400);
        assert_eq!(f.vault.idle_reserve(), 0);
    }

    #[test]
    fn test_withdraw_with_recall_pulls_shortfall() {
        let mut f = setup();
        let (user, mut position) = f.member(Role::RegularUser);
        f.vault.deposit(&f.roles, &user, &mut position, 1_000, 0).unwrap();
        let mut strategy = strategy(f.vault_key);
        f.deploy(&mut strategy, 600);
        let mut venue = ScriptedVenue::funded(600);

        let out = f
            .vault
            .withdraw(
                &user.account,
                &mut position,
                700,
                Some(Recall {
                    strategy: &mut strategy,
                    adapter: &mut venue,
                }),
            )
            .unwrap();
        assert_eq!(out.recalled, 300);
        assert_eq!(venue.balance(), 300);
        assert_eq!(f.vault.deployed_value, 300);
        assert_eq!(strategy.deployed_value, 300);
        assert_eq!(f.vault.total_assets, 300);
        assert!(f.vault.deployed_value <= f.vault.total_assets);
    }

    #[test]
    fn test_failed_recall_leaves_state_untouched() {
        let mut f = setup();
        let (user, mut position) = f.member(Role::RegularUser);
        f.vault.deposit(&f.roles, &user, &mut position, 1_000, 0).unwrap();
        let mut strategy = strategy(f.vault_key);
        f.deploy(&mut strategy, 600);
        let mut venue = ScriptedVenue {
            fail_withdraw: true,
            ..ScriptedVenue::funded(600)
        };

        let result = f.vault.withdraw(
            &user.account,
            &mut position,
            700,
            Some(Recall {
                strategy: &mut strategy,
                adapter: &mut venue,
            }),
        );
        assert_eq!(
            result.unwrap_err(),
            anchor_lang::error::Error::from(AdapterError::VenueUnavailable)
        );
        assert_eq!(f.vault.total_assets, 1_000);
        assert_eq!(f.vault.deployed_value, 600);
        assert_eq!(position.shares, 1_000);
    }

    #[test]
    fn test_harvest_splits_fee() {
        let mut f = setup();
        let (user, mut position) = f.member(Role::RegularUser);
        f.vault.deposit(&f.roles, &user, &mut position, 10_000, 0).unwrap();
        let mut strategy = strategy(f.vault_key);
        f.deploy(&mut strategy, 5_000);
        let mut venue = ScriptedVenue::funded(5_000);
        venue.pending_yield = 1_000;
        let shares_before = f.vault.total_shares;

        let admin = f.admin.clone();
        let harvest = f
            .vault
            .harvest(&f.roles, &admin, &strategy, &mut venue)
            .unwrap();
        assert_eq!(
            harvest,
            HarvestReceipt {
                gross: 1_000,
                fee: 100,
                net: 900
            }
        );
        assert_eq!(f.vault.total_assets, 10_900);
        assert_eq!(f.vault.total_yield, 900);
        assert_eq!(f.vault.fees_accrued, 100);
        assert_eq!(f.vault.total_shares, shares_before);
        assert_eq!(venue.balance(), 5_000);
    }

    #[test]
    fn test_harvest_guards() {
        let mut f = setup();
        let admin = f.admin.clone();
        let mut strategy = strategy(f.vault_key);
        let mut venue = ScriptedVenue::funded(100);

        assert_eq!(
            f.vault
                .harvest(&f.roles, &admin, &strategy, &mut venue)
                .unwrap_err(),
            err(VaultError::NoActiveOpportunity)
        );

        f.deploy(&mut strategy, 0);
        assert_eq!(
            f.vault
                .harvest(&f.roles, &admin, &strategy, &mut venue)
                .unwrap_err(),
            err(VaultError::NoYield)
        );

        let (user, _) = f.member(Role::RegularUser);
        venue.pending_yield = 10;
        assert_eq!(
            f.vault
                .harvest(&f.roles, &user, &strategy, &mut venue)
                .unwrap_err(),
            err(VaultError::Unauthorized)
        );
    }

    #[test]
    fn test_fee_withdrawal_is_treasury_only() {
        let mut f = setup();
        f.vault.fees_accrued = 100;
        let (treasury, _) = f.member(Role::Treasury);
        let admin = f.admin.clone();

        assert_eq!(
            f.vault.withdraw_fees(&f.roles, &admin, 50).unwrap_err(),
            err(VaultError::Unauthorized)
        );
        assert_eq!(
            f.vault.withdraw_fees(&f.roles, &treasury, 0).unwrap_err(),
            err(VaultError::InvalidAmount)
        );
        assert_eq!(
            f.vault.withdraw_fees(&f.roles, &treasury, 101).unwrap_err(),
            err(VaultError::InsufficientFees)
        );
        assert_eq!(f.vault.fees_accrued, 100);

        f.vault.withdraw_fees(&f.roles, &treasury, 100).unwrap();
        assert_eq!(f.vault.fees_accrued, 0);
    }

    #[test]
    fn test_update_settings_validates_before_applying() {
        let mut f = setup();
        let admin = f.admin.clone();

        let bad = SettingsUpdate {
            strategy_allocation: Some(80),
            performance_fee_bps: Some(MAX_PERFORMANCE_FEE_BPS + 1),
        };
        assert_eq!(
            f.vault.update_settings(&f.roles, &admin, &bad).unwrap_err(),
            err(VaultError::InvalidAllocation)
        );
        assert_eq!(f.vault.strategy_allocation, DEFAULT_STRATEGY_ALLOCATION);

        let over = SettingsUpdate {
            strategy_allocation: Some(101),
            performance_fee_bps: None,
        };
        assert!(f.vault.update_settings(&f.roles, &admin, &over).is_err());

        let good = SettingsUpdate {
            strategy_allocation: Some(80),
            performance_fee_bps: None,
        };
        f.vault.update_settings(&f.roles, &admin, &good).unwrap();
        assert_eq!(f.vault.strategy_allocation, 80);
        assert_eq!(f.vault.performance_fee_bps, DEFAULT_PERFORMANCE_FEE_BPS);
    }

    #[test]
    fn test_pause_blocks_deposits_but_not_withdrawals() {
        let mut f = setup();
        let (user, mut position) = f.member(Role::RegularUser);
        f.vault.deposit(&f.roles, &user, &mut position, 200, 0).unwrap();

        let super_admin = f.roles.super_admin;
        f.roles.set_emergency_pause(&super_admin, true).unwrap();
        assert_eq!(
            f.vault.deposit(&f.roles, &user, &mut position, 100, 0).unwrap_err(),
            err(VaultError::Unauthorized)
        );

        let out = f
            .vault
            .withdraw(&user.account, &mut position, 100, None)
            .unwrap();
        assert_eq!(out.assets, 100);
        assert_eq!(position.shares, 100);
    }

    #[test]
    fn test_revoked_depositor_can_still_withdraw() {
        let mut f = setup();
        let (mut user, mut position) = f.member(Role::RegularUser);
        f.vault.deposit(&f.roles, &user, &mut position, 1_000, 0).unwrap();

        let admin = f.admin.clone();
        assert!(f
            .roles
            .revoke_role(&admin, &mut user, Role::RegularUser)
            .unwrap());
        assert!(user.roles.is_empty());

        let out = f
            .vault
            .withdraw(&user.account, &mut position, 1_000, None)
            .unwrap();
        assert_eq!(out.assets, 1_000);
        assert_eq!(f.vault.total_shares, 0);
    }

    #[test]
    fn test_withdraw_refuses_foreign_position() {
        let mut f = setup();
        let (user, mut position) = f.member(Role::RegularUser);
        f.vault.deposit(&f.roles, &user, &mut position, 100, 0).unwrap();

        let stranger = Pubkey::new_unique();
        assert_eq!(
            f.vault
                .withdraw(&stranger, &mut position, 100, None)
                .unwrap_err(),
            err(VaultError::AccountMismatch)
        );
        assert_eq!(position.shares, 100);
    }

    #[test]
    fn test_recall_leaves_pending_yield_for_harvest() {
        let mut f = setup();
        let (user, mut position) = f.member(Role::RegularUser);
        f.vault.deposit(&f.roles, &user, &mut position, 1_000_000, 0).unwrap();
        let mut strategy = strategy(f.vault_key);
        f.deploy(&mut strategy, 500_000);
        let mut venue = ScriptedVenue::funded(500_000);
        venue.pending_yield = 10_000;

        let out = f
            .vault
            .withdraw(
                &user.account,
                &mut position,
                1_000_000,
                Some(Recall {
                    strategy: &mut strategy,
                    adapter: &mut venue,
                }),
            )
            .unwrap();
        assert_eq!(out.recalled, 500_000);
        assert_eq!(f.vault.deployed_value, 0);
        assert_eq!(venue.principal, 0);
        assert_eq!(venue.pending_yield, 10_000);
    }

    #[test]
    fn test_harvest_without_holders_goes_to_fees() {
        let mut f = setup();
        let (user, mut position) = f.member(Role::RegularUser);
        f.vault.deposit(&f.roles, &user, &mut position, 1_000, 0).unwrap();
        let mut strategy = strategy(f.vault_key);
        f.deploy(&mut strategy, 500);
        let mut venue = ScriptedVenue::funded(500);

        f.vault
            .withdraw(
                &user.account,
                &mut position,
                1_000,
                Some(Recall {
                    strategy: &mut strategy,
                    adapter: &mut venue,
                }),
            )
            .unwrap();
        assert_eq!(strategy.current_opportunity_id, Some(0));

        venue.pending_yield = 5_000;
        let admin = f.admin.clone();
        let receipt = f
            .vault
            .harvest(&f.roles, &admin, &strategy, &mut venue)
            .unwrap();
        assert_eq!(
            receipt,
            HarvestReceipt {
                gross: 5_000,
                fee: 5_000,
                net: 0
            }
        );
        assert_eq!(f.vault.total_shares, 0);
        assert_eq!(f.vault.total_assets, 0);
        assert_eq!(f.vault.fees_accrued, 5_000);

        // the next depositor starts from a clean 1:1 price
        let (late, mut late_pos) = f.member(Role::RegularUser);
        let minted = f.vault.deposit(&f.roles, &late, &mut late_pos, 100, 0).unwrap();
        assert_eq!(minted, 100);
        assert_eq!(f.vault.preview_withdraw(100).unwrap(), 100);
    }

    #[test]
    fn test_previews() {
        let mut f = setup();
        assert_eq!(f.vault.preview_deposit(500).unwrap(), 500);
        assert_eq!(f.vault.preview_withdraw(500).unwrap(), 0);

        f.vault.total_assets = 1_500;
        f.vault.total_shares = 1_000;
        assert_eq!(f.vault.preview_deposit(100).unwrap(), 66);
        assert_eq!(f.vault.preview_withdraw(66).unwrap(), 99);
        assert_eq!(f.vault.share_price().unwrap(), 1_500_000_000);
    }
}
