use super::{draw_principal, draw_yield_first, AdapterError, AdapterResult, OpportunityAdapter};

const SECONDS_PER_YEAR: u128 = 365 * 24 * 60 * 60;

/// Hundredths of a percent: 10_000 = 100%
const RATE_DENOMINATOR: u128 = 10_000;

/// Lending market model: simple interest on principal, accrued on demand.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LendingVenue {
    pub principal: u64,
    pub pending_yield: u64,
    /// Annual rate in hundredths of a percent (1050 = 10.50%)
    pub annual_rate: u32,
    pub last_accrual: i64,
}

impl LendingVenue {
    pub fn new(annual_rate: u32, now: i64) -> Self {
        Self {
            annual_rate,
            last_accrual: now,
            ..Self::default()
        }
    }

    /// Interest earned on the current principal between the last accrual and `now`.
    pub fn interest_since(&self, now: i64) -> u64 {
        if self.principal == 0 || now <= self.last_accrual {
            return 0;
        }
        let elapsed = (now - self.last_accrual) as u128;

        let interest = (self.principal as u128)
            .saturating_mul(self.annual_rate as u128)
            .saturating_mul(elapsed)
            / (RATE_DENOMINATOR * SECONDS_PER_YEAR);

        interest.min(u64::MAX as u128) as u64
    }

    pub fn accrue(&mut self, now: i64) -> AdapterResult<u64> {
        let interest = self.interest_since(now);
        self.pending_yield = self
            .pending_yield
            .checked_add(interest)
            .ok_or(AdapterError::Overflow)?;
        self.last_accrual = self.last_accrual.max(now);
        Ok(interest)
    }

    pub fn balance(&self) -> u64 {
        self.principal.saturating_add(self.pending_yield)
    }
}

impl OpportunityAdapter for LendingVenue {
    fn deposit(&mut self, amount: u64) -> AdapterResult<()> {
        if amount == 0 {
            return Err(AdapterError::ZeroAmount);
        }
        self.principal = self
            .principal
            .checked_add(amount)
            .ok_or(AdapterError::Overflow)?;
        Ok(())
    }

    fn withdraw(&mut self, amount: u64) -> AdapterResult<u64> {
        draw_yield_first(&mut self.principal, &mut self.pending_yield, amount)
    }

    fn withdraw_principal(&mut self, amount: u64) -> AdapterResult<u64> {
        draw_principal(&mut self.principal, amount)
    }

    fn accrued_yield(&self) -> u64 {
        self.pending_yield
    }
}
