//! Derived addresses for every record the program owns.

use anchor_lang::prelude::*;

use crate::constants::{
    ROLE_AUTHORITY_SEED, STRATEGY_SEED, USER_POSITION_SEED, USER_ROLE_SEED, VAULT_SEED, VENUE_SEED,
};

pub fn vault_address(asset_mint: &Pubkey, vault_id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[VAULT_SEED, asset_mint.as_ref(), &vault_id.to_le_bytes()],
        &crate::ID,
    )
}

pub fn role_authority_address(vault: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[ROLE_AUTHORITY_SEED, vault.as_ref()], &crate::ID)
}

pub fn user_role_address(vault: &Pubkey, account: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[USER_ROLE_SEED, vault.as_ref(), account.as_ref()],
        &crate::ID,
    )
}

pub fn user_position_address(vault: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[USER_POSITION_SEED, vault.as_ref(), owner.as_ref()],
        &crate::ID,
    )
}

pub fn strategy_address(vault: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[STRATEGY_SEED, vault.as_ref()], &crate::ID)
}

pub fn venue_address(vault: &Pubkey, opportunity_id: u8) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VENUE_SEED, vault.as_ref(), &[opportunity_id]], &crate::ID)
}
