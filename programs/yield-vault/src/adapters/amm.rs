use super::{AdapterError, AdapterResult, OpportunityAdapter};

const BPS: u128 = 10_000;

/// Liquidity pool model: swap fees accrue to the position, impermanent loss
/// is charged against those fees first and then against principal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AmmVenue {
    pub pool_liquidity: u64,
    pub principal: u64,
    pub fees_earned: u64,
    pub il_loss: u64,
    /// Fee yield per accrual period, in basis points of principal
    pub fee_rate_bps: u16,
}

impl AmmVenue {
    pub fn new(pool_liquidity: u64, fee_rate_bps: u16) -> Self {
        Self {
            pool_liquidity,
            fee_rate_bps,
            ..Self::default()
        }
    }

    /// Credit one period of swap fees. Returns the fees earned.
    pub fn accrue_fees(&mut self) -> u64 {
        let fees = ((self.principal as u128) * (self.fee_rate_bps as u128) / BPS)
            .min(u64::MAX as u128) as u64;
        self.fees_earned = self.fees_earned.saturating_add(fees);
        fees
    }

    /// Charge impermanent loss for a price move: 0.5% of principal per 10
    /// points of volatility.
    pub fn apply_price_move(&mut self, volatility: u8) -> u64 {
        let il = (self.principal as u128) * (volatility as u128) / 100 / 200;
        let il = il as u64;
        self.il_loss = self.il_loss.saturating_add(il);
        il
    }

    /// Principal still recoverable once impermanent loss has used up the fees
    pub fn principal_value(&self) -> u64 {
        let impairment = self.il_loss.saturating_sub(self.fees_earned);
        self.principal.saturating_sub(impairment)
    }

    /// Principal plus fees, less impermanent loss
    pub fn net_value(&self) -> u64 {
        self.principal
            .saturating_add(self.fees_earned)
            .saturating_sub(self.il_loss)
    }
}

impl OpportunityAdapter for AmmVenue {
    fn deposit(&mut self, amount: u64) -> AdapterResult<()> {
        if amount == 0 {
            return Err(AdapterError::ZeroAmount);
        }
        self.principal = self
            .principal
            .checked_add(amount)
            .ok_or(AdapterError::Overflow)?;
        self.pool_liquidity = self
            .pool_liquidity
            .checked_add(amount)
            .ok_or(AdapterError::Overflow)?;
        Ok(())
    }

    fn withdraw(&mut self, amount: u64) -> AdapterResult<u64> {
        if amount == 0 {
            return Err(AdapterError::ZeroAmount);
        }
        if amount > self.net_value() {
            return Err(AdapterError::InsufficientBalance);
        }

        let from_fees = amount.min(self.accrued_yield());
        let from_principal = amount - from_fees;

        self.fees_earned -= from_fees;
        self.principal -= from_principal;
        self.pool_liquidity = self.pool_liquidity.saturating_sub(amount);

        Ok(amount)
    }

    fn withdraw_principal(&mut self, amount: u64) -> AdapterResult<u64> {
        if amount == 0 {
            return Err(AdapterError::ZeroAmount);
        }
        if amount > self.principal_value() {
            return Err(AdapterError::InsufficientBalance);
        }

        self.principal -= amount;
        self.pool_liquidity = self.pool_liquidity.saturating_sub(amount);
        Ok(amount)
    }

    fn accrued_yield(&self) -> u64 {
        self.fees_earned.saturating_sub(self.il_loss)
    }
}
