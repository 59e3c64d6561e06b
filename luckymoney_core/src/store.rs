use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    denomination::{Amount, Inventory},
    engine::{resolve, SpinOutcome},
    history::{HistoryLog, SpinHistoryEntry},
    rigging::RiggingConfig,
    rng::RandomSource,
    storage::StateStorage,
};

pub const DEFAULT_STORAGE_KEY: &str = "tet-lucky-money-data";
pub const DEFAULT_ADMIN_PIN: &str = "1234";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_key: String,
    /// Shared secret gating the admin panel. Not a security boundary.
    pub admin_pin: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            admin_pin: DEFAULT_ADMIN_PIN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub inventory: Inventory,
    pub history: HistoryLog,
    pub rigging: RiggingConfig,
    /// Session only, never written out.
    #[serde(skip)]
    pub admin_authenticated: bool,
}

/// Owns the game state and writes the persisted part after every change.
pub struct GameStore<S, R> {
    state: GameState,
    storage: S,
    rng: R,
    config: StoreConfig,
}

impl<S: StateStorage, R: RandomSource> GameStore<S, R> {
    /// Restores the saved record, or the compiled-in defaults when it is
    /// missing, unreadable or malformed.
    pub fn open(storage: S, rng: R, config: StoreConfig) -> Self {
        let state = load_state(&storage, &config.storage_key);
        Self::from_state(state, storage, rng, config)
    }

    pub fn from_state(mut state: GameState, storage: S, rng: R, config: StoreConfig) -> Self {
        state.admin_authenticated = false;
        Self {
            state,
            storage,
            rng,
            config,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn inventory(&self) -> &Inventory {
        &self.state.inventory
    }

    pub fn history(&self) -> &HistoryLog {
        &self.state.history
    }

    pub fn rigging(&self) -> RiggingConfig {
        self.state.rigging
    }

    pub fn is_admin(&self) -> bool {
        self.state.admin_authenticated
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn login(&mut self, pin: &str) -> bool {
        if pin == self.config.admin_pin {
            self.state.admin_authenticated = true;
            info!("admin session opened");
            true
        } else {
            warn!("admin login rejected");
            false
        }
    }

    pub fn logout(&mut self) {
        self.state.admin_authenticated = false;
        info!("admin session closed");
    }

    /// Overwrites the rigging slot. Callers gate this behind [`Self::is_admin`].
    pub fn set_rigging(&mut self, rigging: RiggingConfig) {
        self.state.rigging = rigging;
        info!(?rigging, "rigging updated");
        self.persist();
    }

    /// Returns the new quantity, or `None` if `value` is not in the catalog.
    pub fn adjust_quantity(&mut self, value: Amount, delta: i64) -> Option<u32> {
        match self.state.inventory.adjust(value, delta) {
            Ok(quantity) => {
                info!(value, delta, quantity, "inventory adjusted");
                self.persist();
                Some(quantity)
            }
            Err(e) => {
                debug!(error = %e, "ignoring inventory adjustment");
                None
            }
        }
    }

    pub fn reset_inventory(&mut self) {
        self.state.inventory.reset();
        info!("inventory reset to initial quantities");
        self.persist();
    }

    pub fn total_value(&self) -> Amount {
        self.state.inventory.total_value()
    }

    /// Resolves, commits and records one spin.
    ///
    /// A non-empty spin decrements the paid denomination and clears the
    /// rigging. An empty spin is still logged but leaves the rigging armed.
    pub fn spin(&mut self, user_name: &str) -> SpinOutcome {
        let outcome = resolve(&self.state.inventory, &self.state.rigging, &mut self.rng);

        if let Some(value) = outcome.inventory_delta {
            if let Err(e) = self.state.inventory.adjust(value, -1) {
                warn!(error = %e, "resolved value missing from catalog");
            }
            self.state.rigging = RiggingConfig::Random;
        }
        self.state
            .history
            .push(SpinHistoryEntry::record(user_name, &outcome));

        info!(
            user = user_name,
            displayed = outcome.displayed,
            real = outcome.real,
            scenario = ?outcome.scenario,
            "spin resolved"
        );
        self.persist();
        outcome
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.state) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize game state");
                return;
            }
        };
        if let Err(e) = self.storage.save(&self.config.storage_key, &json) {
            warn!(error = %e, "failed to persist game state");
        }
    }
}

fn load_state<S: StateStorage>(storage: &S, key: &str) -> GameState {
    let raw = match storage.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return GameState::default(),
        Err(e) => {
            warn!(error = %e, "failed to read saved state, using defaults");
            return GameState::default();
        }
    };
    match serde_json::from_str::<GameState>(&raw) {
        Ok(state) => match state.inventory.validate() {
            Ok(()) => state,
            Err(e) => {
                warn!(error = %e, "saved catalog invalid, using defaults");
                GameState::default()
            }
        },
        Err(e) => {
            warn!(error = %e, "saved state malformed, using defaults");
            GameState::default()
        }
    }
}
