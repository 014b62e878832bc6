//! Uniform interface to yield venues.
//!
//! The vault and the strategy engine only ever talk to a venue through
//! [`OpportunityAdapter`]. Venue-specific mechanics stay behind it.

use anchor_lang::prelude::*;

pub mod amm;
pub mod lending;

pub use amm::AmmVenue;
pub use lending::LendingVenue;

#[error_code(offset = 7000)]
#[derive(PartialEq, Eq)]
pub enum AdapterError {
    #[msg("Venue rejected a zero amount")]
    ZeroAmount,

    #[msg("Venue balance too low for withdrawal")]
    InsufficientBalance,

    #[msg("Venue arithmetic overflow")]
    Overflow,

    #[msg("Venue is not accepting operations")]
    VenueUnavailable,

    #[msg("Venue returned an unexpected amount")]
    UnexpectedAmount,
}

pub type AdapterResult<T> = core::result::Result<T, AdapterError>;

pub trait OpportunityAdapter {
    /// Place `amount` of the base asset with the venue.
    fn deposit(&mut self, amount: u64) -> AdapterResult<()>;

    /// Pull `amount` back from the venue, realized yield first.
    /// Returns the amount actually released.
    fn withdraw(&mut self, amount: u64) -> AdapterResult<u64>;

    /// Pull `amount` of principal back, leaving realized yield in place for
    /// the next harvest. Returns the amount actually released.
    fn withdraw_principal(&mut self, amount: u64) -> AdapterResult<u64>;

    /// Realized yield that can be withdrawn without touching principal.
    fn accrued_yield(&self) -> u64;
}

/// Resolves the adapters a rebalance moves capital between.
pub trait VenueRouter {
    /// Source (when capital is deployed) and destination adapters, or
    /// `None` when either venue is not available to this router.
    fn route(
        &mut self,
        from: Option<u8>,
        to: u8,
    ) -> Option<(Option<&mut dyn OpportunityAdapter>, &mut dyn OpportunityAdapter)>;
}

/// Venues keyed by opportunity id, for simulators driving the engine
/// off-chain.
#[derive(Debug)]
pub struct VenueBook<V> {
    venues: Vec<(u8, V)>,
}

impl<V> Default for VenueBook<V> {
    fn default() -> Self {
        Self { venues: Vec::new() }
    }
}

impl<V: OpportunityAdapter> VenueBook<V> {
    /// Add or replace the venue for `id`.
    pub fn insert(&mut self, id: u8, venue: V) {
        match self.position(id) {
            Some(index) => self.venues[index].1 = venue,
            None => self.venues.push((id, venue)),
        }
    }

    pub fn get(&self, id: u8) -> Option<&V> {
        let index = self.position(id)?;
        Some(&self.venues[index].1)
    }

    pub fn get_mut(&mut self, id: u8) -> Option<&mut V> {
        let index = self.position(id)?;
        Some(&mut self.venues[index].1)
    }

    fn position(&self, id: u8) -> Option<usize> {
        self.venues.iter().position(|(venue_id, _)| *venue_id == id)
    }
}

impl<V: OpportunityAdapter> VenueRouter for VenueBook<V> {
    fn route(
        &mut self,
        from: Option<u8>,
        to: u8,
    ) -> Option<(Option<&mut dyn OpportunityAdapter>, &mut dyn OpportunityAdapter)> {
        let to_index = self.position(to)?;
        let from_index = match from {
            Some(id) => Some(self.position(id)?),
            None => None,
        };

        match from_index {
            None => {
                let target: &mut dyn OpportunityAdapter = &mut self.venues[to_index].1;
                Some((None, target))
            }
            Some(from_index) if from_index == to_index => None,
            Some(from_index) => {
                let split = from_index.max(to_index);
                let (low, high) = self.venues.split_at_mut(split);
                let lower: &mut dyn OpportunityAdapter = &mut low[from_index.min(to_index)].1;
                let upper: &mut dyn OpportunityAdapter = &mut high[0].1;
                let (source, target) = if from_index < to_index {
                    (lower, upper)
                } else {
                    (upper, lower)
                };
                Some((Some(source), target))
            }
        }
    }
}

/// Withdraw yield-first from `(principal, pending_yield)` balances.
/// Shared by the venues that keep the two apart.
pub(crate) fn draw_yield_first(
    principal: &mut u64,
    pending_yield: &mut u64,
    amount: u64,
) -> AdapterResult<u64> {
    if amount == 0 {
        return Err(AdapterError::ZeroAmount);
    }
    let available = principal
        .checked_add(*pending_yield)
        .ok_or(AdapterError::Overflow)?;
    if amount > available {
        return Err(AdapterError::InsufficientBalance);
    }

    let from_yield = amount.min(*pending_yield);
    *pending_yield -= from_yield;
    *principal -= amount - from_yield;

    Ok(amount)
}

/// Withdraw from principal only, leaving pending yield untouched.
pub(crate) fn draw_principal(principal: &mut u64, amount: u64) -> AdapterResult<u64> {
    if amount == 0 {
        return Err(AdapterError::ZeroAmount);
    }
    if amount > *principal {
        return Err(AdapterError::InsufficientBalance);
    }
    *principal -= amount;
    Ok(amount)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_takes_yield_before_principal() {
        let (mut principal, mut pending) = (1_000, 50);
        assert_eq!(draw_yield_first(&mut principal, &mut pending, 80).unwrap(), 80);
        assert_eq!((principal, pending), (970, 0));
    }

    #[test]
    fn test_draw_rejects_overdraw_without_side_effects() {
        let (mut principal, mut pending) = (100, 5);
        assert_eq!(
            draw_yield_first(&mut principal, &mut pending, 106),
            Err(AdapterError::InsufficientBalance)
        );
        assert_eq!((principal, pending), (100, 5));
    }

    #[test]
    fn test_book_routes_disjoint_venues() {
        let mut book = VenueBook::default();
        book.insert(4, LendingVenue::new(500, 0));
        book.insert(9, LendingVenue::new(800, 0));
        book.get_mut(9).unwrap().deposit(100).unwrap();

        let (source, target) = book.route(Some(9), 4).unwrap();
        assert_eq!(source.unwrap().withdraw_principal(100).unwrap(), 100);
        target.deposit(100).unwrap();

        assert_eq!(book.get(4).unwrap().principal, 100);
        assert_eq!(book.get(9).unwrap().principal, 0);
    }

    #[test]
    fn test_book_refuses_unknown_or_identical_venues() {
        let mut book = VenueBook::default();
        book.insert(1, LendingVenue::default());
        assert!(book.route(None, 2).is_none());
        assert!(book.route(Some(2), 1).is_none());
        assert!(book.route(Some(1), 1).is_none());
        assert!(book.route(None, 1).is_some());
    }

    #[test]
    fn test_draw_rejects_zero() {
        let (mut principal, mut pending) = (100, 0);
        assert_eq!(
            draw_yield_first(&mut principal, &mut pending, 0),
            Err(AdapterError::ZeroAmount)
        );
    }

    #[test]
    fn test_principal_draw_leaves_yield_alone() {
        let (mut principal, pending) = (1_000, 50);
        assert_eq!(draw_principal(&mut principal, 1_000).unwrap(), 1_000);
        assert_eq!((principal, pending), (0, 50));
        assert_eq!(draw_principal(&mut principal, 1), Err(AdapterError::InsufficientBalance));
        assert_eq!(draw_principal(&mut principal, 0), Err(AdapterError::ZeroAmount));
    }
}
