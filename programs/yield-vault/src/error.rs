use anchor_lang::prelude::*;

#[error_code]
#[derive(PartialEq, Eq)]
pub enum VaultError {
    #[msg("Unauthorized - caller does not hold the required role")]
    Unauthorized,

    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Opportunity parameters out of range")]
    InvalidParameters,

    #[msg("Allocation settings out of bounds")]
    InvalidAllocation,

    #[msg("Insufficient shares balance")]
    InsufficientShares,

    #[msg("Insufficient idle liquidity in vault")]
    InsufficientLiquidity,

    #[msg("Insufficient accrued fees")]
    InsufficientFees,

    #[msg("Rebalance cooldown not satisfied")]
    Cooldown,

    #[msg("Cannot revoke the last admin or the super admin")]
    LastAdminProtected,

    #[msg("Opportunity catalog is full")]
    CatalogFull,

    #[msg("Slippage tolerance exceeded")]
    SlippageExceeded,

    #[msg("Arithmetic overflow")]
    MathOverflow,

    #[msg("Division by zero")]
    DivisionByZero,

    #[msg("No yield available to harvest")]
    NoYield,

    #[msg("No opportunity currently holds capital")]
    NoActiveOpportunity,

    #[msg("Opportunity not found in catalog")]
    OpportunityNotFound,

    #[msg("Account does not match the expected record")]
    AccountMismatch,
}
