#![allow(dead_code)]

use anchor_lang::prelude::Pubkey;
use yield_vault::state::{Role, RoleAuthority, UserPosition, UserRole, Vault};

/// One vault with its role authority and the initializing admin
pub struct Harness {
    pub vault_key: Pubkey,
    pub vault: Vault,
    pub roles: RoleAuthority,
    pub admin: UserRole,
}

impl Harness {
    pub fn new() -> Self {
        let vault_key = Pubkey::new_unique();
        let mut admin = UserRole::new(Pubkey::new_unique(), vault_key, 255);
        let mut roles = RoleAuthority {
            vault: Pubkey::default(),
            super_admin: Pubkey::default(),
            emergency_pause: false,
            admin_count: 0,
            bump: 0,
        };
        roles
            .initialize(vault_key, &mut admin, 254, 0)
            .expect("role authority initializes");

        let vault = Vault::new(
            admin.account,
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            0,
            253,
        );

        Self {
            vault_key,
            vault,
            roles,
            admin,
        }
    }

    /// A fresh account holding `role`, with an empty position
    pub fn member(&mut self, role: Role) -> (UserRole, UserPosition) {
        let mut record = UserRole::new(Pubkey::new_unique(), self.vault_key, 1);
        self.roles
            .assign_role(&self.admin, &mut record, role, 0)
            .expect("admin assigns role");
        let position = UserPosition::new(record.account, self.vault_key, 1);
        (record, position)
    }
}
