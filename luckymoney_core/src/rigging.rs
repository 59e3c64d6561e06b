use serde::{Deserialize, Serialize};

use crate::denomination::Amount;

/// One-shot instruction for how the next spin resolves.
///
/// Consumed by the next non-empty spin and reset to [`RiggingConfig::Random`]
/// whether or not the target was actually available.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RiggingConfig {
    #[default]
    Random,
    ForceValue { target: Amount },
    /// Show `displayed` first, then pay out `real`. `displayed` is cosmetic
    /// and need not exist in the catalog.
    TrollFakeThenReal { displayed: Amount, real: Amount },
}

impl RiggingConfig {
    pub fn is_random(&self) -> bool {
        matches!(self, RiggingConfig::Random)
    }

    /// The denomination this config wants paid out, if any.
    pub fn target(&self) -> Option<Amount> {
        match self {
            RiggingConfig::Random => None,
            RiggingConfig::ForceValue { target } => Some(*target),
            RiggingConfig::TrollFakeThenReal { real, .. } => Some(*real),
        }
    }
}
