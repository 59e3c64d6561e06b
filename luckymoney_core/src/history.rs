use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    denomination::Amount,
    engine::{Scenario, SpinOutcome},
};

pub const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpinHistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub user_name: String,
    pub displayed_value: Amount,
    pub real_value: Amount,
    pub scenario: Scenario,
}

impl SpinHistoryEntry {
    pub fn record(user_name: impl Into<String>, outcome: &SpinOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            user_name: user_name.into(),
            displayed_value: outcome.displayed,
            real_value: outcome.real,
            scenario: outcome.scenario,
        }
    }

    pub fn display_name(&self) -> &str {
        if self.user_name.is_empty() {
            ANONYMOUS
        } else {
            &self.user_name
        }
    }
}

/// Append-only spin log, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct HistoryLog(VecDeque<SpinHistoryEntry>);

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: SpinHistoryEntry) {
        self.0.push_front(entry);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn most_recent(&self) -> Option<&SpinHistoryEntry> {
        self.0.front()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &SpinHistoryEntry> {
        self.0.iter()
    }

    pub fn latest(&self, n: usize) -> impl Iterator<Item = &SpinHistoryEntry> {
        self.0.iter().take(n)
    }

    /// Oldest first.
    pub fn chronological(&self) -> impl Iterator<Item = &SpinHistoryEntry> {
        self.0.iter().rev()
    }
}
