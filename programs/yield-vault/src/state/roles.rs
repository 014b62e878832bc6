use anchor_lang::prelude::*;

use crate::{
    constants::{ROLE_AUTHORITY_SEED, USER_ROLE_SEED},
    error::VaultError,
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    RegularUser,
    Admin,
    StrategyManager,
    Treasury,
}

impl Role {
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Fixed role bitfield. Bits 4-7 are reserved and never set.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoleSet {
    bits: u8,
}

impl RoleSet {
    pub fn has(&self, role: Role) -> bool {
        self.bits & role.bit() != 0
    }

    /// Returns true when the role was not held before.
    pub fn grant(&mut self, role: Role) -> bool {
        let added = !self.has(role);
        self.bits |= role.bit();
        added
    }

    /// Returns true when the role was held before.
    pub fn revoke(&mut self, role: Role) -> bool {
        let removed = self.has(role);
        self.bits &= !role.bit();
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

#[account]
pub struct RoleAuthority {
    /// Vault this authority gates
    pub vault: Pubkey,
    /// Initializer; the only account that can toggle the emergency pause
    pub super_admin: Pubkey,
    /// While set, every role check fails
    pub emergency_pause: bool,
    /// Number of accounts currently holding Admin
    pub admin_count: u32,
    /// PDA bump seed
    pub bump: u8,
}

impl RoleAuthority {
    pub const LEN: usize = 8 +  // discriminator
        32 + // vault
        32 + // super_admin
        1 +  // emergency_pause
        4 +  // admin_count
        1; // bump

    pub const SEED_PREFIX: &'static [u8] = ROLE_AUTHORITY_SEED;

    /// Set up the authority with `initializer` as super admin and first Admin.
    pub fn initialize(
        &mut self,
        vault: Pubkey,
        initializer: &mut UserRole,
        bump: u8,
        now: i64,
    ) -> Result<()> {
        require_keys_eq!(initializer.vault, vault, VaultError::AccountMismatch);

        self.vault = vault;
        self.super_admin = initializer.account;
        self.emergency_pause = false;
        self.admin_count = 1;
        self.bump = bump;

        initializer.roles.grant(Role::Admin);
        initializer.assigned_at = now;
        initializer.assigned_by = initializer.account;
        Ok(())
    }

    /// False for everyone while the emergency pause is set.
    pub fn has_role(&self, record: &UserRole, role: Role) -> bool {
        !self.emergency_pause && record.vault == self.vault && record.roles.has(role)
    }

    pub fn has_any_role(&self, record: &UserRole, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.has_role(record, *role))
    }

    pub fn require_role(&self, record: &UserRole, role: Role) -> Result<()> {
        require!(self.has_role(record, role), VaultError::Unauthorized);
        Ok(())
    }

    pub fn require_any_role(&self, record: &UserRole, roles: &[Role]) -> Result<()> {
        require!(self.has_any_role(record, roles), VaultError::Unauthorized);
        Ok(())
    }

    /// Grant `role` to `target`. Returns whether the bit was newly set.
    pub fn assign_role(
        &mut self,
        caller: &UserRole,
        target: &mut UserRole,
        role: Role,
        now: i64,
    ) -> Result<bool> {
        self.require_role(caller, Role::Admin)?;
        require_keys_eq!(target.vault, self.vault, VaultError::AccountMismatch);

        let already_held = target.roles.has(role);
        if !already_held && role == Role::Admin {
            self.admin_count = self
                .admin_count
                .checked_add(1)
                .ok_or(VaultError::MathOverflow)?;
        }
        target.roles.grant(role);
        target.assigned_at = now;
        target.assigned_by = caller.account;
        Ok(!already_held)
    }

    /// Clear `role` on `target`. Clearing an unset bit is a no-op that
    /// returns false.
    pub fn revoke_role(&mut self, caller: &UserRole, target: &mut UserRole, role: Role) -> Result<bool> {
        self.require_role(caller, Role::Admin)?;
        require_keys_eq!(target.vault, self.vault, VaultError::AccountMismatch);

        if !target.roles.has(role) {
            return Ok(false);
        }

        if role == Role::Admin {
            require!(
                target.account != self.super_admin && self.admin_count > 1,
                VaultError::LastAdminProtected
            );
            self.admin_count -= 1;
        }
        target.roles.revoke(role);
        Ok(true)
    }

    pub fn set_emergency_pause(&mut self, caller: &Pubkey, paused: bool) -> Result<()> {
        require_keys_eq!(*caller, self.super_admin, VaultError::Unauthorized);
        self.emergency_pause = paused;
        Ok(())
    }
}

/// Role membership of one account within one vault
#[account]
#[derive(Default)]
pub struct UserRole {
    pub account: Pubkey,
    pub vault: Pubkey,
    pub roles: RoleSet,
    /// Timestamp of the last grant
    pub assigned_at: i64,
    pub assigned_by: Pubkey,
    /// PDA bump seed
    pub bump: u8,
}

impl UserRole {
    pub const LEN: usize = 8 +  // discriminator
        32 + // account
        32 + // vault
        1 +  // roles
        8 +  // assigned_at
        32 + // assigned_by
        1; // bump

    pub const SEED_PREFIX: &'static [u8] = USER_ROLE_SEED;

    pub fn new(account: Pubkey, vault: Pubkey, bump: u8) -> Self {
        Self {
            account,
            vault,
            bump,
            ..Self::default()
        }
    }

    /// Fill in identity fields of a freshly created record.
    pub fn bind(&mut self, account: Pubkey, vault: Pubkey, bump: u8) -> Result<()> {
        if self.vault == Pubkey::default() {
            self.account = account;
            self.vault = vault;
            self.bump = bump;
        }
        require_keys_eq!(self.account, account, VaultError::AccountMismatch);
        require_keys_eq!(self.vault, vault, VaultError::AccountMismatch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        authority: RoleAuthority,
        admin: UserRole,
        vault: Pubkey,
    }

    fn setup() -> Fixture {
        let vault = Pubkey::new_unique();
        let mut admin = UserRole::new(Pubkey::new_unique(), vault, 255);
        let mut authority = RoleAuthority {
            vault: Pubkey::default(),
            super_admin: Pubkey::default(),
            emergency_pause: false,
            admin_count: 0,
            bump: 0,
        };
        authority.initialize(vault, &mut admin, 254, 1_000).unwrap();
        Fixture {
            authority,
            admin,
            vault,
        }
    }

    fn err(e: VaultError) -> anchor_lang::error::Error {
        e.into()
    }

    #[test]
    fn test_role_set_operations() {
        let mut roles = RoleSet::default();
        assert!(roles.is_empty());
        assert!(roles.grant(Role::Treasury));
        assert!(!roles.grant(Role::Treasury));
        assert!(roles.has(Role::Treasury));
        assert!(!roles.has(Role::Admin));
        assert!(roles.revoke(Role::Treasury));
        assert!(!roles.revoke(Role::Treasury));
        assert!(roles.is_empty());
    }

    #[test]
    fn test_initialize_grants_admin_to_super_admin() {
        let f = setup();
        assert_eq!(f.authority.super_admin, f.admin.account);
        assert_eq!(f.authority.admin_count, 1);
        assert!(!f.authority.emergency_pause);
        assert!(f.authority.has_role(&f.admin, Role::Admin));
        assert!(!f.authority.has_role(&f.admin, Role::Treasury));
    }

    #[test]
    fn test_assign_regular_user() {
        let mut f = setup();
        let mut user = UserRole::new(Pubkey::new_unique(), f.vault, 1);

        assert!(f
            .authority
            .assign_role(&f.admin, &mut user, Role::RegularUser, 2_000)
            .unwrap());
        assert!(f.authority.has_role(&user, Role::RegularUser));
        assert!(!f.authority.has_role(&user, Role::Admin));
        assert_eq!(user.assigned_at, 2_000);
        assert_eq!(user.assigned_by, f.admin.account);
        assert_eq!(f.authority.admin_count, 1);
    }

    #[test]
    fn test_non_admin_cannot_assign() {
        let mut f = setup();
        let mut user = UserRole::new(Pubkey::new_unique(), f.vault, 1);
        f.authority
            .assign_role(&f.admin, &mut user, Role::StrategyManager, 0)
            .unwrap();

        let mut other = UserRole::new(Pubkey::new_unique(), f.vault, 1);
        assert_eq!(
            f.authority
                .assign_role(&user, &mut other, Role::Admin, 0)
                .unwrap_err(),
            err(VaultError::Unauthorized)
        );
        assert!(other.roles.is_empty());
    }

    #[test]
    fn test_admin_count_tracks_grants_and_revocations() {
        let mut f = setup();
        let mut second = UserRole::new(Pubkey::new_unique(), f.vault, 1);

        f.authority
            .assign_role(&f.admin, &mut second, Role::Admin, 0)
            .unwrap();
        // granting again does not double count
        assert!(!f
            .authority
            .assign_role(&f.admin, &mut second, Role::Admin, 0)
            .unwrap());
        assert_eq!(f.authority.admin_count, 2);

        assert!(f
            .authority
            .revoke_role(&f.admin, &mut second, Role::Admin)
            .unwrap());
        assert_eq!(f.authority.admin_count, 1);
        assert!(!f.authority.has_role(&second, Role::Admin));
    }

    #[test]
    fn test_sole_admin_cannot_be_revoked() {
        let mut f = setup();
        let caller = f.admin.clone();
        assert_eq!(
            f.authority
                .revoke_role(&caller, &mut f.admin, Role::Admin)
                .unwrap_err(),
            err(VaultError::LastAdminProtected)
        );
        assert!(f.authority.has_role(&f.admin, Role::Admin));
        assert_eq!(f.authority.admin_count, 1);
    }

    #[test]
    fn test_super_admin_protected_even_with_other_admins() {
        let mut f = setup();
        let mut second = UserRole::new(Pubkey::new_unique(), f.vault, 1);
        f.authority
            .assign_role(&f.admin, &mut second, Role::Admin, 0)
            .unwrap();

        assert_eq!(
            f.authority
                .revoke_role(&second, &mut f.admin, Role::Admin)
                .unwrap_err(),
            err(VaultError::LastAdminProtected)
        );
        assert_eq!(f.authority.admin_count, 2);
    }

    #[test]
    fn test_revoking_unset_bit_is_noop() {
        let mut f = setup();
        let mut user = UserRole::new(Pubkey::new_unique(), f.vault, 1);
        assert!(!f
            .authority
            .revoke_role(&f.admin, &mut user, Role::Treasury)
            .unwrap());
        assert!(user.roles.is_empty());
    }

    #[test]
    fn test_pause_disables_every_role() {
        let mut f = setup();
        let mut user = UserRole::new(Pubkey::new_unique(), f.vault, 1);
        f.authority
            .assign_role(&f.admin, &mut user, Role::RegularUser, 0)
            .unwrap();

        let super_admin = f.authority.super_admin;
        f.authority.set_emergency_pause(&super_admin, true).unwrap();
        assert!(!f.authority.has_role(&f.admin, Role::Admin));
        assert!(!f.authority.has_role(&user, Role::RegularUser));

        // role management is gated too
        let mut other = UserRole::new(Pubkey::new_unique(), f.vault, 1);
        assert_eq!(
            f.authority
                .assign_role(&f.admin, &mut other, Role::RegularUser, 0)
                .unwrap_err(),
            err(VaultError::Unauthorized)
        );

        f.authority.set_emergency_pause(&super_admin, false).unwrap();
        assert!(f.authority.has_role(&user, Role::RegularUser));
    }

    #[test]
    fn test_only_super_admin_toggles_pause() {
        let mut f = setup();
        let mut second = UserRole::new(Pubkey::new_unique(), f.vault, 1);
        f.authority
            .assign_role(&f.admin, &mut second, Role::Admin, 0)
            .unwrap();

        assert_eq!(
            f.authority
                .set_emergency_pause(&second.account, true)
                .unwrap_err(),
            err(VaultError::Unauthorized)
        );
        assert!(!f.authority.emergency_pause);
    }

    #[test]
    fn test_record_from_another_vault_is_ignored() {
        let f = setup();
        let mut foreign = f.admin.clone();
        foreign.vault = Pubkey::new_unique();
        assert!(!f.authority.has_role(&foreign, Role::Admin));
    }

    #[test]
    fn test_bind_rejects_mismatched_record() {
        let vault = Pubkey::new_unique();
        let account = Pubkey::new_unique();
        let mut record = UserRole::default();
        record.bind(account, vault, 7).unwrap();
        assert_eq!(record.bump, 7);
        // rebinding to the same identity is fine
        record.bind(account, vault, 7).unwrap();
        assert_eq!(
            record.bind(Pubkey::new_unique(), vault, 7).unwrap_err(),
            err(VaultError::AccountMismatch)
        );
    }
}
