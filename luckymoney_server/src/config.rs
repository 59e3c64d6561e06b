use std::path::PathBuf;

use anyhow::bail;
use luckymoney_core::StoreConfig;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_ADMIN_PATH: &str = "/admin-duy-only";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub state_dir: PathBuf,
    /// Unlisted route prefix for the admin panel.
    pub admin_path: String,
    pub store: StoreConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let admin_path = lookup("ADMIN_PATH").unwrap_or_else(|| DEFAULT_ADMIN_PATH.to_string());
        if !admin_path.starts_with('/') || admin_path.len() < 2 || admin_path.ends_with('/') {
            bail!("ADMIN_PATH must look like /some-path, got {admin_path:?}");
        }
        let mut store = StoreConfig::default();
        if let Some(pin) = lookup("ADMIN_PIN") {
            if pin.len() != 4 || !pin.bytes().all(|b| b.is_ascii_digit()) {
                bail!("ADMIN_PIN must be exactly 4 digits");
            }
            store.admin_pin = pin;
        }
        if let Some(key) = lookup("STORAGE_KEY") {
            store.storage_key = key;
        }
        Ok(Self {
            bind: lookup("BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            state_dir: lookup("STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            admin_path,
            store,
        })
    }
}
