use trident_fuzz::fuzzing::*;

/// Storage for all account addresses used in fuzz testing.
///
/// Docs: https://ackee.xyz/trident/docs/latest/trident-api-macro/trident-types/fuzz-accounts/
#[derive(Default)]
pub struct AccountAddresses {
    pub vault: AddressStorage,

    pub role_authority: AddressStorage,

    pub strategy: AddressStorage,

    pub venue: AddressStorage,

    pub user: AddressStorage,

    pub user_role: AddressStorage,

    pub user_position: AddressStorage,

    pub asset_mint: AddressStorage,

    pub asset_vault: AddressStorage,

    pub user_asset_account: AddressStorage,

    pub treasury_asset_account: AddressStorage,

    pub token_program: AddressStorage,

    pub associated_token_program: AddressStorage,

    pub system_program: AddressStorage,
}
