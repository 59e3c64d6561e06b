use chrono::{DateTime, Utc};
use luckymoney_core::{
    Amount, Denomination, GameState, RiggingConfig, Scenario, SpinHistoryEntry, SpinOutcome,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpinRequest {
    pub user_name: String,
}

impl SpinRequest {
    /// Trimmed name, rejected when blank.
    pub fn validated_name(&self) -> ApiResult<&str> {
        let name = self.user_name.trim();
        if name.is_empty() {
            return Err(ApiError::Invalid("user_name must not be empty".into()));
        }
        Ok(name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SpinResponse {
    pub display_value: Amount,
    pub real_value: Amount,
    pub scenario: Scenario,
    pub is_troll: bool,
    pub is_empty: bool,
}

impl From<SpinOutcome> for SpinResponse {
    fn from(o: SpinOutcome) -> Self {
        Self {
            display_value: o.displayed,
            real_value: o.real,
            scenario: o.scenario,
            is_troll: o.is_troll(),
            is_empty: o.is_empty(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoginRequest {
    pub pin: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdjustRequest {
    pub value: Amount,
    pub delta: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct InventoryView {
    pub denominations: Vec<Denomination>,
    pub total_value: Amount,
}

impl InventoryView {
    pub fn of(state: &GameState) -> Self {
        Self {
            denominations: state.inventory.denominations().to_vec(),
            total_value: state.inventory.total_value(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminStateResponse {
    pub inventory: InventoryView,
    pub rigging: RiggingConfig,
    pub history: Vec<SpinLogEntry>,
}

impl AdminStateResponse {
    pub fn of(state: &GameState) -> Self {
        Self {
            inventory: InventoryView::of(state),
            rigging: state.rigging,
            history: state.history.iter().map(SpinLogEntry::from).collect(),
        }
    }
}

/// Flattened history row for display and CSV export.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SpinLogEntry {
    pub id: String,
    pub ts: DateTime<Utc>,
    pub user_name: String,
    pub display_value: Amount,
    pub real_value: Amount,
    pub scenario: Scenario,
}

impl From<&SpinHistoryEntry> for SpinLogEntry {
    fn from(e: &SpinHistoryEntry) -> Self {
        Self {
            id: e.id.to_string(),
            ts: e.timestamp,
            user_name: e.display_name().to_string(),
            display_value: e.displayed_value,
            real_value: e.real_value,
            scenario: e.scenario,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("admin session required")]
    Unauthorized,
    #[error("internal server error")]
    Internal,
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_rejected() {
        let req = SpinRequest {
            user_name: "   ".into(),
        };
        assert!(matches!(req.validated_name(), Err(ApiError::Invalid(_))));
        let req = SpinRequest {
            user_name: "  Linh ".into(),
        };
        assert_eq!(req.validated_name().unwrap(), "Linh");
    }

    #[test]
    fn log_entry_uses_display_name() {
        let outcome = SpinOutcome::empty();
        let entry = SpinHistoryEntry::record("", &outcome);
        let row = SpinLogEntry::from(&entry);
        assert_eq!(row.user_name, "Anonymous");
        assert_eq!(row.scenario, Scenario::Empty);
        assert_eq!(row.id, entry.id.to_string());
    }

    #[test]
    fn response_flags_follow_scenario() {
        let resp = SpinResponse::from(SpinOutcome {
            displayed: 500_000,
            real: 20_000,
            scenario: Scenario::TrollFakeToReal,
            inventory_delta: Some(20_000),
        });
        assert!(resp.is_troll);
        assert!(!resp.is_empty);
    }
}
