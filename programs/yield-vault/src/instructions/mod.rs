pub mod admin;
pub mod deposit;
pub mod harvest;
pub mod initialize;
pub mod roles;
pub mod strategy;
pub mod view;
pub mod withdraw;

#[allow(ambiguous_glob_reexports)]
pub use admin::*;
#[allow(ambiguous_glob_reexports)]
pub use deposit::*;
#[allow(ambiguous_glob_reexports)]
pub use harvest::*;
#[allow(ambiguous_glob_reexports)]
pub use initialize::*;
#[allow(ambiguous_glob_reexports)]
pub use roles::*;
#[allow(ambiguous_glob_reexports)]
pub use strategy::*;
#[allow(ambiguous_glob_reexports)]
pub use view::*;
#[allow(ambiguous_glob_reexports)]
pub use withdraw::*;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::set_return_data;

/// Borsh-encode `value` as the instruction's return data
pub(crate) fn set_borsh_return_data<T: AnchorSerialize>(value: &T) -> Result<()> {
    let mut data = Vec::new();
    value
        .serialize(&mut data)
        .map_err(|_| error!(anchor_lang::error::ErrorCode::AccountDidNotSerialize))?;
    set_return_data(&data);
    Ok(())
}
