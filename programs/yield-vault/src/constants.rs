pub const VAULT_SEED: &[u8] = b"vault";
pub const USER_POSITION_SEED: &[u8] = b"user_position";
pub const ROLE_AUTHORITY_SEED: &[u8] = b"role_authority";
pub const USER_ROLE_SEED: &[u8] = b"user_role";
pub const STRATEGY_SEED: &[u8] = b"strategy";
pub const VENUE_SEED: &[u8] = b"venue";

/// Catalog capacity of a strategy account
pub const MAX_OPPORTUNITIES: usize = 16;

/// Upper bound for volatility, IL risk and safety metrics
pub const MAX_RISK_METRIC: u8 = 100;

pub const BPS_DENOMINATOR: u64 = 10_000;
pub const PERCENT_DENOMINATOR: u64 = 100;

pub const DEFAULT_STRATEGY_ALLOCATION: u8 = 50;
pub const MAX_STRATEGY_ALLOCATION: u8 = 100;

/// 10% of harvested yield
pub const DEFAULT_PERFORMANCE_FEE_BPS: u16 = 1_000;
pub const MAX_PERFORMANCE_FEE_BPS: u16 = 5_000;

/// One hour between rebalances
pub const DEFAULT_REBALANCE_COOLDOWN: i64 = 3_600;

/// Fixed-point scale used by share price previews
pub const PRICE_SCALE: u64 = 1_000_000_000;
