use crate::config::LedgerConfig;
use crate::domain::command::LedgerCommand;
use crate::domain::ledger::{Collection, LedgerState, Points, PurchaseOutcome, Redemption};
use crate::domain::ports::{KeyValueStore, KeyValueStoreBox};
use crate::domain::record::{
    BALANCE_KEY, decode_balance, decode_record, decode_set, encode_record, legacy_key,
};
use crate::error::{LedgerError, Result};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

/// Owner of a user's point balance and redemption history.
///
/// `PointsLedger` applies each operation to its in-memory state first and
/// then writes the whole ledger as one record to the injected store. A failed
/// write is logged and the in-memory change is kept; the next successful
/// write (or an explicit [`flush`](Self::flush)) brings storage back in line.
///
/// Operations are serialized by an async mutex held across the storage
/// write, so concurrent callers never lose updates and writes land in the
/// order the mutations were applied.
pub struct PointsLedger {
    store: KeyValueStoreBox,
    config: LedgerConfig,
    state: Mutex<LedgerState>,
    updates: watch::Sender<LedgerState>,
}

/// Where a loaded ledger came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadSource {
    Record,
    Migrated,
    Fallback,
}

impl PointsLedger {
    /// Loads the ledger from `store`.
    ///
    /// Never fails: unreadable storage yields a default ledger held in memory
    /// only, and malformed values are treated as absent. When no composite
    /// record exists yet, one is written immediately (from legacy per-field
    /// keys where present, otherwise from defaults).
    pub async fn load(store: KeyValueStoreBox, config: LedgerConfig) -> Self {
        let (state, source) = read_state(store.as_ref(), &config).await;
        info!(balance = %state.balance, source = ?source, "ledger loaded");

        let ledger = Self {
            store,
            config,
            updates: watch::Sender::new(state.clone()),
            state: Mutex::new(state),
        };

        if source == LoadSource::Migrated {
            ledger.migrate().await;
        }
        ledger
    }

    /// Loads the ledger with [`LedgerConfig::default`].
    pub async fn open(store: KeyValueStoreBox) -> Self {
        Self::load(store, LedgerConfig::default()).await
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Current balance.
    pub fn balance(&self) -> Points {
        self.updates.borrow().balance
    }

    /// A copy of the full ledger state.
    pub fn snapshot(&self) -> LedgerState {
        self.updates.borrow().clone()
    }

    /// Receives the ledger state after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<LedgerState> {
        self.updates.subscribe()
    }

    pub fn is_achievement_redeemed(&self, id: &str) -> bool {
        self.updates.borrow().contains(Collection::Achievements, id)
    }

    pub fn is_card_redeemed(&self, id: &str) -> bool {
        self.updates.borrow().contains(Collection::Cards, id)
    }

    pub fn is_purchased(&self, id: &str) -> bool {
        self.updates.borrow().contains(Collection::Items, id)
    }

    /// Credits `amount` and returns the new balance.
    pub async fn add_points(&self, amount: Points) -> Points {
        self.apply("add_points", |state| {
            state.credit(amount);
            (true, state.balance)
        })
        .await
    }

    /// Debits `amount`, clamping at zero, and returns the new balance.
    pub async fn subtract_points(&self, amount: Points) -> Points {
        self.apply("subtract_points", |state| {
            state.debit_clamped(amount);
            (true, state.balance)
        })
        .await
    }

    /// Credits `value` for achievement `id`, at most once per identifier.
    pub async fn redeem_achievement(&self, id: &str, value: Points) -> Redemption {
        self.redeem(Collection::Achievements, id, value).await
    }

    /// Credits `value` for card `id`, at most once per identifier.
    pub async fn redeem_card(&self, id: &str, value: Points) -> Redemption {
        self.redeem(Collection::Cards, id, value).await
    }

    /// Buys item `id` for `cost`.
    ///
    /// A repeat purchase of an owned item succeeds without charging. An
    /// unaffordable purchase is rejected with no state change, unlike
    /// [`subtract_points`](Self::subtract_points) which clamps.
    pub async fn purchase_item(&self, id: &str, cost: Points) -> PurchaseOutcome {
        let outcome = self
            .apply("purchase_item", |state| {
                let outcome = state.purchase(id, cost);
                (outcome == PurchaseOutcome::Purchased, outcome)
            })
            .await;
        if outcome == PurchaseOutcome::InsufficientBalance {
            debug!(item = id, cost = %cost, balance = %self.balance(), "purchase rejected");
        }
        outcome
    }

    /// Applies a batch command. Returns `false` only for a rejected purchase.
    pub async fn execute(&self, command: &LedgerCommand) -> bool {
        match command {
            LedgerCommand::AddPoints(amount) => {
                self.add_points(*amount).await;
            }
            LedgerCommand::SubtractPoints(amount) => {
                self.subtract_points(*amount).await;
            }
            LedgerCommand::RedeemAchievement { id, value } => {
                self.redeem_achievement(id, *value).await;
            }
            LedgerCommand::RedeemCard { id, value } => {
                self.redeem_card(id, *value).await;
            }
            LedgerCommand::Purchase { id, cost } => {
                return self.purchase_item(id, *cost).await.succeeded();
            }
        }
        true
    }

    /// Writes the current in-memory state to storage, reporting failure.
    pub async fn flush(&self) -> Result<()> {
        let state = self.state.lock().await;
        self.persist(&state).await
    }

    async fn redeem(&self, collection: Collection, id: &str, value: Points) -> Redemption {
        self.apply(collection.label(), |state| {
            let redemption = state.redeem(collection, id, value);
            (matches!(redemption, Redemption::Granted(_)), redemption)
        })
        .await
    }

    /// Runs `mutate` under the ledger lock. When it reports a change, the new
    /// state is published and persisted before the lock is released.
    async fn apply<T, F>(&self, op: &str, mutate: F) -> T
    where
        F: FnOnce(&mut LedgerState) -> (bool, T),
    {
        let mut state = self.state.lock().await;
        let (changed, output) = mutate(&mut state);
        if !changed {
            debug!(op, "no change");
            return output;
        }

        debug!(op, balance = %state.balance, "ledger updated");
        self.updates.send_replace(state.clone());
        if let Err(e) = self.persist(&state).await {
            warn!(op, error = %e, "ledger change kept in memory only");
        }
        output
    }

    async fn persist(&self, state: &LedgerState) -> Result<()> {
        let key = self.config.record_key.as_str();
        let raw = encode_record(state).map_err(|e| LedgerError::write(key, e))?;
        self.store
            .set(key, raw)
            .await
            .map_err(|e| LedgerError::write(key, e))
    }

    /// Writes the composite record, then drops the legacy keys it replaces.
    async fn migrate(&self) {
        if let Err(e) = self.flush().await {
            warn!(error = %e, "could not write ledger record; legacy keys left in place");
            return;
        }
        let legacy = std::iter::once(BALANCE_KEY).chain(Collection::ALL.map(legacy_key));
        for key in legacy {
            if let Err(e) = self.store.remove(key).await {
                warn!(key, error = %e, "could not remove legacy ledger key");
            }
        }
    }
}

async fn read_state(
    store: &dyn KeyValueStore,
    config: &LedgerConfig,
) -> (LedgerState, LoadSource) {
    let fallback = || (LedgerState::new(config.starting_balance), LoadSource::Fallback);
    let record_key = config.record_key.as_str();

    match store.get(record_key).await {
        Ok(Some(raw)) => match decode_record(&raw) {
            Ok(state) => return (state, LoadSource::Record),
            Err(e) => warn!(key = record_key, error = %e, "ignoring malformed ledger record"),
        },
        Ok(None) => {}
        Err(e) => {
            warn!(error = %LedgerError::read(record_key, e), "using default ledger");
            return fallback();
        }
    }

    let mut state = LedgerState::new(config.starting_balance);

    match store.get(BALANCE_KEY).await {
        Ok(Some(raw)) => match decode_balance(&raw) {
            Some(balance) => state.balance = balance,
            None => warn!(key = BALANCE_KEY, "ignoring malformed balance"),
        },
        Ok(None) => {}
        Err(e) => {
            warn!(error = %LedgerError::read(BALANCE_KEY, e), "using default ledger");
            return fallback();
        }
    }

    for collection in Collection::ALL {
        let key = legacy_key(collection);
        let ids = match store.get(key).await {
            Ok(Some(raw)) => decode_set(&raw).unwrap_or_else(|| {
                warn!(key, "ignoring malformed id set");
                Default::default()
            }),
            Ok(None) => continue,
            Err(e) => {
                warn!(error = %LedgerError::read(key, e), "using default ledger");
                return fallback();
            }
        };
        match collection {
            Collection::Achievements => state.redeemed_achievements = ids,
            Collection::Cards => state.redeemed_cards = ids,
            Collection::Items => state.purchased_items = ids,
        }
    }

    (state, LoadSource::Migrated)
}
