pub mod denomination;
pub mod engine;
pub mod error;
pub mod history;
pub mod rigging;
pub mod rng;
pub mod storage;
pub mod store;

pub use crate::denomination::{Amount, Denomination, Inventory};
pub use crate::engine::{resolve, weighted_pick, Scenario, SpinOutcome};
pub use crate::error::{CoreError, StorageError};
pub use crate::history::{HistoryLog, SpinHistoryEntry, ANONYMOUS};
pub use crate::rigging::RiggingConfig;
pub use crate::rng::{derive_floats, derive_hash_hex, HmacRandom, RandomSource};
pub use crate::storage::{FileStorage, MemoryStorage, StateStorage};
pub use crate::store::{GameState, GameStore, StoreConfig, DEFAULT_ADMIN_PIN, DEFAULT_STORAGE_KEY};
