use anchor_lang::prelude::Pubkey;
use fuzz_accounts::*;
use trident_fuzz::fuzzing::*;
use yield_vault::{
    adapters::{LendingVenue, OpportunityAdapter, VenueBook},
    state::{
        OpportunityParams, Recall, RebalanceOutcome, Role, RoleAuthority, StrategyState,
        UserPosition, UserRole, Vault,
    },
};
mod fuzz_accounts;

const USERS: usize = 4;
const VENUES: u8 = 3;
const COOLDOWN: i64 = 3_600;

/// In-memory vault driven through the program's core state transitions
struct World {
    vault: Vault,
    roles: RoleAuthority,
    admin: UserRole,
    treasury: UserRole,
    users: Vec<(UserRole, UserPosition)>,
    strategy: StrategyState,
    book: VenueBook<LendingVenue>,
    now: i64,
}

/// Flows into and out of the vault, for conservation checks
#[derive(Default, Clone)]
struct Ledger {
    deposited: u128,
    withdrawn: u128,
    harvested: u128,
    fees_paid: u128,
}

#[derive(Default)]
struct VaultTracker {
    world: Option<World>,
    ledger: Ledger,
}

#[derive(FuzzTestMethods)]
struct FuzzTest {
    trident: Trident,
    fuzz_accounts: AccountAddresses,
    vault_tracker: VaultTracker,
}

fn random_params() -> OpportunityParams {
    OpportunityParams {
        name: [0u8; 32],
        apy_bps_x100: rand::random::<u32>() % 20_000,
        volatility: rand::random::<u8>() % 101,
        il_risk: rand::random::<u8>() % 101,
        safety: rand::random::<u8>() % 101,
    }
}

fn snapshot(vault: &Vault) -> (u64, u64, u64, u64) {
    (
        vault.total_assets,
        vault.total_shares,
        vault.deployed_value,
        vault.fees_accrued,
    )
}

#[flow_executor]
impl FuzzTest {
    fn new() -> Self {
        Self {
            trident: Trident::default(),
            fuzz_accounts: AccountAddresses::default(),
            vault_tracker: VaultTracker::default(),
        }
    }

    #[init]
    fn start(&mut self) {
        self.vault_tracker = VaultTracker::default();
    }

    /// Create the vault, its role authority, members and a small catalog
    #[flow]
    fn flow_initialize(&mut self) {
        if self.vault_tracker.world.is_some() {
            return;
        }

        let vault_key = Pubkey::new_unique();
        let mut admin = UserRole::new(Pubkey::new_unique(), vault_key, 255);
        let mut roles = RoleAuthority {
            vault: Pubkey::default(),
            super_admin: Pubkey::default(),
            emergency_pause: false,
            admin_count: 0,
            bump: 0,
        };
        roles.initialize(vault_key, &mut admin, 254, 0).unwrap();

        let vault = Vault::new(
            admin.account,
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            0,
            253,
        );

        let mut treasury = UserRole::new(Pubkey::new_unique(), vault_key, 1);
        roles
            .assign_role(&admin, &mut treasury, Role::Treasury, 0)
            .unwrap();

        let users = (0..USERS)
            .map(|_| {
                let mut record = UserRole::new(Pubkey::new_unique(), vault_key, 1);
                roles
                    .assign_role(&admin, &mut record, Role::RegularUser, 0)
                    .unwrap();
                let position = UserPosition::new(record.account, vault_key, 1);
                (record, position)
            })
            .collect();

        let mut strategy = StrategyState::new(vault_key, 5, COOLDOWN, 1);
        let mut book = VenueBook::default();
        for _ in 0..VENUES {
            let id = strategy
                .register_opportunity(&roles, &admin, &random_params(), 0)
                .unwrap();
            let rate = rand::random::<u32>() % 3_000;
            book.insert(id, LendingVenue::new(rate, 0));
        }

        self.vault_tracker.world = Some(World {
            vault,
            roles,
            admin,
            treasury,
            users,
            strategy,
            book,
            now: 1,
        });
        self.check_invariants();
    }

    #[flow]
    fn flow_deposit(&mut self) {
        let Some(world) = self.vault_tracker.world.as_mut() else {
            return;
        };

        let amount = rand::random::<u64>() % 1_000_000_000_000;
        let index = rand::random::<usize>() % USERS;
        let (user, position) = &mut world.users[index];

        let before = snapshot(&world.vault);
        match world
            .vault
            .deposit(&world.roles, user, position, amount, world.now)
        {
            Ok(minted) => {
                assert!(minted > 0, "Invariant: accepted deposit mints shares");
                self.vault_tracker.ledger.deposited += amount as u128;
            }
            Err(_) => assert_eq!(
                snapshot(&world.vault),
                before,
                "Invariant: rejected deposit leaves the vault untouched"
            ),
        }
        self.check_invariants();
    }

    /// Redeem a random share amount, recalling from the venue when the
    /// idle reserve falls short
    #[flow]
    fn flow_withdraw(&mut self) {
        let Some(world) = self.vault_tracker.world.as_mut() else {
            return;
        };

        let index = rand::random::<usize>() % USERS;
        let World {
            vault,
            users,
            strategy,
            book,
            ..
        } = world;
        let (user, position) = &mut users[index];
        if position.shares == 0 {
            return;
        }
        let shares = (rand::random::<u64>() % position.shares).max(1);

        let recall = match strategy.current_opportunity_id {
            Some(id) => book.get_mut(id).map(|adapter| Recall {
                strategy: &mut *strategy,
                adapter: adapter as &mut dyn OpportunityAdapter,
            }),
            None => None,
        };

        let before = snapshot(vault);
        let price_before = (vault.total_assets as u128, vault.total_shares as u128);
        match vault.withdraw(&user.account, position, shares, recall) {
            Ok(out) => {
                self.vault_tracker.ledger.withdrawn += out.assets as u128;
                // remaining holders are not diluted: A'/S' >= A/S
                if vault.total_shares > 0 {
                    assert!(
                        (vault.total_assets as u128) * price_before.1
                            >= price_before.0 * (vault.total_shares as u128),
                        "Invariant: withdrawal cannot dilute remaining holders"
                    );
                }
            }
            Err(_) => assert_eq!(
                snapshot(vault),
                before,
                "Invariant: rejected withdrawal leaves the vault untouched"
            ),
        }
        self.check_invariants();
    }

    /// Advance the clock and let the engine move capital
    #[flow]
    fn flow_rebalance(&mut self) {
        let Some(world) = self.vault_tracker.world.as_mut() else {
            return;
        };

        world.now += (rand::random::<u64>() % (2 * COOLDOWN as u64)) as i64;
        let last = world.strategy.last_rebalance_at;
        let credited_before = world.vault.total_yield as u128 + world.vault.fees_accrued as u128;

        let outcome = world.strategy.rebalance(
            &world.roles,
            &world.admin,
            &mut world.vault,
            &mut world.book,
            world.now,
        );
        match outcome {
            Ok(RebalanceOutcome::Moved(plan)) => {
                assert_eq!(world.strategy.current_opportunity_id, Some(plan.to));
                assert_eq!(world.strategy.last_rebalance_at, world.now);
                assert!(
                    plan.best_score.saturating_sub(plan.current_score) > world.strategy.rebalance_threshold,
                    "Invariant: moves only clear the threshold"
                );
                if let Some(from) = plan.from {
                    assert_eq!(
                        world.book.get(from).map(|venue| venue.pending_yield),
                        Some(0),
                        "Invariant: outgoing venue keeps no uncollected yield"
                    );
                }
            }
            Ok(RebalanceOutcome::Held { .. }) => {
                assert_eq!(world.strategy.last_rebalance_at, last);
            }
            Err(_) => {}
        }

        // yield swept from the outgoing venue counts as harvested
        let credited_after = world.vault.total_yield as u128 + world.vault.fees_accrued as u128;
        self.vault_tracker.ledger.harvested += credited_after - credited_before;
        self.check_invariants();
    }

    /// Let interest build up on the active venue without harvesting it, so
    /// later rebalances and recalls run against pending yield
    #[flow]
    fn flow_accrue(&mut self) {
        let Some(world) = self.vault_tracker.world.as_mut() else {
            return;
        };
        let Some(id) = world.strategy.current_opportunity_id else {
            return;
        };

        world.now += (rand::random::<u64>() % 31_536_000) as i64;
        if let Some(venue) = world.book.get_mut(id) {
            let _ = venue.accrue(world.now);
        }
        self.check_invariants();
    }

    /// Accrue interest on the active venue and harvest it
    #[flow]
    fn flow_harvest(&mut self) {
        let Some(world) = self.vault_tracker.world.as_mut() else {
            return;
        };
        let Some(id) = world.strategy.current_opportunity_id else {
            return;
        };

        world.now += (rand::random::<u64>() % 31_536_000) as i64;
        let Some(venue) = world.book.get_mut(id) else {
            return;
        };
        if venue.accrue(world.now).is_err() {
            return;
        }

        let fees_before = world.vault.fees_accrued;
        if let Ok(receipt) =
            world
                .vault
                .harvest(&world.roles, &world.admin, &world.strategy, venue)
        {
            assert_eq!(receipt.fee + receipt.net, receipt.gross);
            assert_eq!(world.vault.fees_accrued, fees_before + receipt.fee);
            self.vault_tracker.ledger.harvested += receipt.gross as u128;
        }
        self.check_invariants();
    }

    #[flow]
    fn flow_withdraw_fees(&mut self) {
        let Some(world) = self.vault_tracker.world.as_mut() else {
            return;
        };
        if world.vault.fees_accrued == 0 {
            return;
        }

        let amount = (rand::random::<u64>() % world.vault.fees_accrued).max(1);
        if world
            .vault
            .withdraw_fees(&world.roles, &world.treasury, amount)
            .is_ok()
        {
            self.vault_tracker.ledger.fees_paid += amount as u128;
        }
        self.check_invariants();
    }

    /// Re-score a random opportunity
    #[flow]
    fn flow_update_opportunity(&mut self) {
        let Some(world) = self.vault_tracker.world.as_mut() else {
            return;
        };

        let id = rand::random::<u8>() % VENUES;
        if let Ok(score) = world.strategy.update_opportunity(
            &world.roles,
            &world.admin,
            id,
            &random_params(),
            world.now,
        ) {
            let cached = world.strategy.opportunity(id).map(|o| o.score);
            assert_eq!(cached, Some(score));
        }
    }

    /// Previewed round trip never creates assets
    #[flow]
    fn flow_conversion_check(&mut self) {
        let Some(world) = self.vault_tracker.world.as_ref() else {
            return;
        };

        let amount = (rand::random::<u64>() % 1_000_000_000).max(1);
        let Ok(shares) = world.vault.preview_deposit(amount) else {
            return;
        };
        if shares == 0 {
            return;
        }

        let mut after = world.vault.clone();
        after.total_assets = after.total_assets.saturating_add(amount);
        after.total_shares = after.total_shares.saturating_add(shares);
        if let Ok(assets_back) = after.preview_withdraw(shares) {
            assert!(
                assets_back <= amount,
                "Invariant: round-trip should not create free assets"
            );
        }
    }

    #[end]
    fn end(&mut self) {
        self.check_invariants();
    }

    fn check_invariants(&self) {
        let Some(world) = self.vault_tracker.world.as_ref() else {
            return;
        };
        let vault = &world.vault;

        let held: u64 = world.users.iter().map(|(_, position)| position.shares).sum();
        assert_eq!(
            held, vault.total_shares,
            "Invariant: positions sum to total shares"
        );
        assert!(
            vault.deployed_value <= vault.total_assets,
            "Invariant: deployed capital is backed by total assets"
        );
        assert_eq!(world.strategy.deployed_value, vault.deployed_value);

        if world.strategy.current_opportunity_id.is_none() {
            assert_eq!(vault.deployed_value, 0);
        }
        for id in 0..VENUES {
            let principal = world.book.get(id).map(|venue| venue.principal).unwrap_or(0);
            let expected = match world.strategy.current_opportunity_id {
                Some(current) if current == id => vault.deployed_value,
                _ => 0,
            };
            assert_eq!(
                principal, expected,
                "Invariant: venue principal matches the deployed figure"
            );
        }
        assert_eq!(
            vault.total_shares == 0,
            vault.total_assets == 0,
            "Invariant: assets exist exactly when shares do"
        );

        let ledger = &self.vault_tracker.ledger;
        assert_eq!(
            ledger.deposited + ledger.harvested,
            vault.total_assets as u128
                + vault.fees_accrued as u128
                + ledger.withdrawn
                + ledger.fees_paid,
            "Invariant: every unit in is accounted for"
        );
    }
}

fn main() {
    // Run 1000 iterations with up to 100 flows per iteration
    FuzzTest::fuzz(1000, 100);
}
