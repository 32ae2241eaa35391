//! Currencies and cosmetic unlocks
//!
//! Balances and the unlocked costume list outlive a single run. They are read
//! at startup, credited when a run ends and written back through a
//! [`KeyValueStore`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persistence::KeyValueStore;

/// The three currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    Coin,
    Strawberry,
    Chocolate,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Coin, Currency::Strawberry, Currency::Chocolate];

    /// Storage key for the persisted balance
    pub fn storage_key(&self) -> &'static str {
        match self {
            Currency::Coin => "donut_coins",
            Currency::Strawberry => "donut_strawberries",
            Currency::Chocolate => "donut_chocolates",
        }
    }
}

/// Currency balances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub coins: u64,
    pub strawberries: u64,
    pub chocolates: u64,
}

impl Wallet {
    pub fn get(&self, currency: Currency) -> u64 {
        match currency {
            Currency::Coin => self.coins,
            Currency::Strawberry => self.strawberries,
            Currency::Chocolate => self.chocolates,
        }
    }

    fn slot(&mut self, currency: Currency) -> &mut u64 {
        match currency {
            Currency::Coin => &mut self.coins,
            Currency::Strawberry => &mut self.strawberries,
            Currency::Chocolate => &mut self.chocolates,
        }
    }

    pub fn add(&mut self, currency: Currency, amount: u64) {
        let slot = self.slot(currency);
        *slot = slot.saturating_add(amount);
    }

    /// Add every balance of `other`
    pub fn deposit(&mut self, other: &Wallet) {
        for currency in Currency::ALL {
            self.add(currency, other.get(currency));
        }
    }

    pub fn can_afford(&self, price: &Price) -> bool {
        self.coins >= price.coins
            && self.strawberries >= price.strawberries
            && self.chocolates >= price.chocolates
    }
}

/// Cost of an unlock across all three currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub coins: u64,
    pub strawberries: u64,
    pub chocolates: u64,
}

impl Price {
    /// Full cost in coins, half in each secondary currency
    pub fn for_cost(cost: u64) -> Self {
        Self {
            coins: cost,
            strawberries: cost / 2,
            chocolates: cost / 2,
        }
    }
}

/// Cosmetic variants for the player donut
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Costume {
    Default,
    Police,
    Rockstar,
    Alien,
    Chef,
    Superhero,
    Sailor,
}

impl Costume {
    pub const ALL: [Costume; 7] = [
        Costume::Default,
        Costume::Police,
        Costume::Rockstar,
        Costume::Alien,
        Costume::Chef,
        Costume::Superhero,
        Costume::Sailor,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Costume::Default => "default",
            Costume::Police => "police",
            Costume::Rockstar => "rockstar",
            Costume::Alien => "alien",
            Costume::Chef => "chef",
            Costume::Superhero => "superhero",
            Costume::Sailor => "sailor",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Base cost; see [`Price::for_cost`]
    pub fn cost(&self) -> u64 {
        match self {
            Costume::Default => 0,
            Costume::Police => 100,
            Costume::Chef => 150,
            Costume::Rockstar => 200,
            Costume::Sailor => 250,
            Costume::Alien => 300,
            Costume::Superhero => 500,
        }
    }

    pub fn price(&self) -> Price {
        Price::for_cost(self.cost())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("{costume:?} is already unlocked")]
    AlreadyUnlocked { costume: Costume },
    #[error("not enough currency: need {needed:?}, have {available:?}")]
    InsufficientFunds { needed: Price, available: Wallet },
}

/// Storage key for the unlocked costume list
pub const COSTUMES_KEY: &str = "donut_costumes";

/// Persistent progression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub wallet: Wallet,
    pub unlocked: BTreeSet<Costume>,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            wallet: Wallet::default(),
            unlocked: BTreeSet::from([Costume::Default]),
        }
    }
}

impl Progression {
    pub fn is_unlocked(&self, costume: Costume) -> bool {
        self.unlocked.contains(&costume)
    }

    /// Buy a costume. Either every balance is charged or nothing changes.
    pub fn purchase(&mut self, costume: Costume) -> Result<(), PurchaseError> {
        if self.is_unlocked(costume) {
            return Err(PurchaseError::AlreadyUnlocked { costume });
        }
        let price = costume.price();
        if !self.wallet.can_afford(&price) {
            return Err(PurchaseError::InsufficientFunds {
                needed: price,
                available: self.wallet,
            });
        }
        self.wallet.coins -= price.coins;
        self.wallet.strawberries -= price.strawberries;
        self.wallet.chocolates -= price.chocolates;
        self.unlocked.insert(costume);
        log::info!("Unlocked costume {}", costume.name());
        Ok(())
    }

    /// Make a costume available for selection, buying it if needed
    pub fn acquire(&mut self, costume: Costume) -> Result<Costume, PurchaseError> {
        if !self.is_unlocked(costume) {
            self.purchase(costume)?;
        }
        Ok(costume)
    }

    /// Credit what a finished session earned
    pub fn settle(&mut self, earned: &Wallet) {
        self.wallet.deposit(earned);
        log::info!(
            "Session settled: +{} coins, +{} strawberries, +{} chocolates",
            earned.coins,
            earned.strawberries,
            earned.chocolates
        );
    }

    /// Load from storage; absent or unreadable values become defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut progression = Self::default();
        for currency in Currency::ALL {
            let key = currency.storage_key();
            if let Some(raw) = store.get(key) {
                match raw.trim().parse::<u64>() {
                    Ok(amount) => progression.wallet.add(currency, amount),
                    Err(_) => log::warn!("Ignoring unreadable balance {key}={raw:?}"),
                }
            }
        }
        if let Some(raw) = store.get(COSTUMES_KEY) {
            match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(names) => {
                    progression
                        .unlocked
                        .extend(names.iter().filter_map(|n| Costume::from_name(n)));
                }
                Err(e) => log::warn!("Ignoring unreadable costume list: {e}"),
            }
        }
        progression
    }

    /// Write balances and unlocks. Failures are logged, not returned.
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        for currency in Currency::ALL {
            let value = self.wallet.get(currency).to_string();
            if let Err(e) = store.set(currency.storage_key(), &value) {
                log::warn!("Failed to save {}: {e}", currency.storage_key());
            }
        }
        let names: Vec<&str> = self.unlocked.iter().map(|c| c.name()).collect();
        match serde_json::to_string(&names) {
            Ok(json) => {
                if let Err(e) = store.set(COSTUMES_KEY, &json) {
                    log::warn!("Failed to save costumes: {e}");
                }
            }
            Err(e) => log::warn!("Failed to encode costumes: {e}"),
        }
    }
}
