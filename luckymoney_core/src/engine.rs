use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    denomination::{Amount, Denomination, Inventory},
    rigging::RiggingConfig,
    rng::RandomSource,
};

/// Which resolution path produced a spin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Random,
    Forced,
    TrollFakeToReal,
    Empty,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpinOutcome {
    pub displayed: Amount,
    pub real: Amount,
    pub scenario: Scenario,
    /// Denomination to decrement by one, `None` for an empty machine.
    pub inventory_delta: Option<Amount>,
}

impl SpinOutcome {
    pub fn empty() -> Self {
        Self {
            displayed: 0,
            real: 0,
            scenario: Scenario::Empty,
            inventory_delta: None,
        }
    }

    fn paid(displayed: Amount, real: Amount, scenario: Scenario) -> Self {
        Self {
            displayed,
            real,
            scenario,
            inventory_delta: Some(real),
        }
    }

    pub fn is_troll(&self) -> bool {
        self.scenario == Scenario::TrollFakeToReal
    }

    pub fn is_empty(&self) -> bool {
        self.scenario == Scenario::Empty
    }
}

/// Picks a value with probability proportional to remaining quantity.
///
/// Draws one value in `[0, total)` and walks `available` in order, subtracting
/// each weight; the first entry that brings the running value to `<= 0` wins.
/// Falls back to the first entry if rounding leaves nothing selected.
/// Entries with zero quantity are skipped outright.
pub fn weighted_pick<R: RandomSource + ?Sized>(
    available: &[&Denomination],
    rng: &mut R,
) -> Option<Amount> {
    let candidates: Vec<&Denomination> = available
        .iter()
        .copied()
        .filter(|d| d.is_available())
        .collect();
    let first = candidates.first()?;
    let total: f64 = candidates.iter().map(|d| f64::from(d.quantity)).sum();
    let mut remaining = rng.next_unit() * total;
    for d in &candidates {
        remaining -= f64::from(d.quantity);
        if remaining <= 0.0 {
            return Some(d.value);
        }
    }
    Some(first.value)
}

/// Decides the next spin. Pure: the caller applies the delta, records history
/// and clears the rigging.
pub fn resolve<R: RandomSource + ?Sized>(
    inventory: &Inventory,
    rigging: &RiggingConfig,
    rng: &mut R,
) -> SpinOutcome {
    let available = inventory.available();
    if available.is_empty() {
        return SpinOutcome::empty();
    }

    let target_in_stock = |target: Amount| available.iter().any(|d| d.value == target);

    match *rigging {
        RiggingConfig::ForceValue { target } if target_in_stock(target) => {
            SpinOutcome::paid(target, target, Scenario::Forced)
        }
        // A zero fake value means no troll was armed.
        RiggingConfig::TrollFakeThenReal { displayed, real }
            if displayed > 0 && target_in_stock(real) =>
        {
            SpinOutcome::paid(displayed, real, Scenario::TrollFakeToReal)
        }
        _ => {
            if let Some(target) = rigging.target() {
                debug!(value = target, "rigged target out of stock, falling back to random");
            }
            match weighted_pick(&available, rng) {
                Some(real) => SpinOutcome::paid(real, real, Scenario::Random),
                None => SpinOutcome::empty(),
            }
        }
    }
}
