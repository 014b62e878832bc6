use anchor_lang::prelude::*;

use crate::{
    constants::{BPS_DENOMINATOR, PERCENT_DENOMINATOR, PRICE_SCALE},
    error::VaultError,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rounding {
    Floor,
    Ceiling,
}

/// Shares minted for a deposit of `assets`.
///
/// An empty vault bootstraps at 1:1. Otherwise the result is
/// `assets × total_shares / total_assets` rounded down, so a deposit can
/// never dilute existing holders.
pub fn shares_for_deposit(assets: u64, total_assets: u64, total_shares: u64) -> Result<u64> {
    if total_shares == 0 {
        return Ok(assets);
    }
    mul_div(assets, total_shares, total_assets, Rounding::Floor)
}

/// Assets redeemable for `shares`: `shares × total_assets / total_shares`
/// rounded down, so the remaining holders keep any residual.
pub fn assets_for_shares(shares: u64, total_assets: u64, total_shares: u64) -> Result<u64> {
    mul_div(shares, total_assets, total_shares, Rounding::Floor)
}

/// Assets per share scaled by `PRICE_SCALE`. An empty vault prices at 1.
pub fn share_price(total_assets: u64, total_shares: u64) -> Result<u64> {
    if total_shares == 0 {
        return Ok(PRICE_SCALE);
    }
    mul_div(total_assets, PRICE_SCALE, total_shares, Rounding::Floor)
}

/// Split `gross` into `(fee, net)`. The fee rounds down.
pub fn split_fee(gross: u64, fee_bps: u16) -> Result<(u64, u64)> {
    let fee = mul_div(gross, fee_bps as u64, BPS_DENOMINATOR, Rounding::Floor)?;
    let net = gross.checked_sub(fee).ok_or(VaultError::MathOverflow)?;
    Ok((fee, net))
}

/// Portion of `total` selected by a whole-number percentage, rounded down.
pub fn percent_of(total: u64, percent: u8) -> Result<u64> {
    mul_div(total, percent as u64, PERCENT_DENOMINATOR, Rounding::Floor)
}

/// Safe multiplication then division with configurable rounding.
///
/// Computes: (value × numerator) / denominator
/// Uses u128 intermediate to prevent overflow.
pub fn mul_div(value: u64, numerator: u64, denominator: u64, rounding: Rounding) -> Result<u64> {
    require!(denominator > 0, VaultError::DivisionByZero);

    let product = (value as u128)
        .checked_mul(numerator as u128)
        .ok_or(VaultError::MathOverflow)?;

    let result = match rounding {
        Rounding::Floor => product / (denominator as u128),
        Rounding::Ceiling => {
            let denom = denominator as u128;
            product
                .checked_add(denom)
                .ok_or(VaultError::MathOverflow)?
                .checked_sub(1)
                .ok_or(VaultError::MathOverflow)?
                / denom
        }
    };

    require!(result <= u64::MAX as u128, VaultError::MathOverflow);
    Ok(result as u64)
}
