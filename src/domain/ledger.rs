use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, AddAssign};

/// A non-negative quantity of reward points.
///
/// Arithmetic saturates at both ends, so a balance can never wrap or go
/// below zero.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Points(u64);

impl Points {
    pub const ZERO: Self = Self(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Subtracts `rhs`, stopping at zero.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl From<u64> for Points {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Points> for u64 {
    fn from(points: Points) -> Self {
        points.0
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Points {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Points {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// The three permanent identifier sets tracked by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Achievements,
    Cards,
    Items,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Self::Achievements, Self::Cards, Self::Items];

    /// Singular label used in reports and log events.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Achievements => "achievement",
            Self::Cards => "card",
            Self::Items => "item",
        }
    }
}

/// Result of a redemption request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    /// The identifier was new; the points were credited.
    Granted(Points),
    /// The identifier had been redeemed before; nothing changed.
    AlreadyRedeemed,
}

/// Result of a purchase request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// The item was bought and the cost deducted.
    Purchased,
    /// The item was bought earlier; no charge was made.
    AlreadyOwned,
    /// The balance does not cover the cost; nothing changed.
    InsufficientBalance,
}

impl PurchaseOutcome {
    /// Whether the caller now owns the item.
    pub fn succeeded(&self) -> bool {
        !matches!(self, Self::InsufficientBalance)
    }
}

/// A user's point balance and redemption/purchase history.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    pub balance: Points,
    #[serde(default)]
    pub redeemed_achievements: BTreeSet<String>,
    #[serde(default)]
    pub redeemed_cards: BTreeSet<String>,
    #[serde(default)]
    pub purchased_items: BTreeSet<String>,
}

impl LedgerState {
    pub fn new(balance: Points) -> Self {
        Self {
            balance,
            ..Self::default()
        }
    }

    pub fn entries(&self, collection: Collection) -> &BTreeSet<String> {
        match collection {
            Collection::Achievements => &self.redeemed_achievements,
            Collection::Cards => &self.redeemed_cards,
            Collection::Items => &self.purchased_items,
        }
    }

    fn entries_mut(&mut self, collection: Collection) -> &mut BTreeSet<String> {
        match collection {
            Collection::Achievements => &mut self.redeemed_achievements,
            Collection::Cards => &mut self.redeemed_cards,
            Collection::Items => &mut self.purchased_items,
        }
    }

    pub fn contains(&self, collection: Collection, id: &str) -> bool {
        self.entries(collection).contains(id)
    }

    pub fn credit(&mut self, amount: Points) {
        self.balance += amount;
    }

    /// Deducts `amount`, clamping the balance at zero.
    pub fn debit_clamped(&mut self, amount: Points) {
        self.balance = self.balance.saturating_sub(amount);
    }

    /// Records `id` in `collection` and credits `value`, once per identifier.
    pub fn redeem(&mut self, collection: Collection, id: &str, value: Points) -> Redemption {
        if self.contains(collection, id) {
            return Redemption::AlreadyRedeemed;
        }
        self.entries_mut(collection).insert(id.to_string());
        self.credit(value);
        Redemption::Granted(value)
    }

    /// Buys `id` for `cost`. Unlike `debit_clamped`, an unaffordable purchase
    /// is rejected rather than clamped.
    pub fn purchase(&mut self, id: &str, cost: Points) -> PurchaseOutcome {
        if self.purchased_items.contains(id) {
            return PurchaseOutcome::AlreadyOwned;
        }
        if self.balance < cost {
            return PurchaseOutcome::InsufficientBalance;
        }
        self.balance = self.balance.saturating_sub(cost);
        self.purchased_items.insert(id.to_string());
        PurchaseOutcome::Purchased
    }
}
