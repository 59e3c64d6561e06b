use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A currency amount in the smallest unit (whole dong).
pub type Amount = u64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Denomination {
    pub value: Amount,
    pub quantity: u32,
    pub initial_quantity: u32,
}

impl Denomination {
    pub fn new(value: Amount, quantity: u32) -> Self {
        Self {
            value,
            quantity,
            initial_quantity: quantity,
        }
    }

    pub fn is_available(&self) -> bool {
        self.quantity > 0
    }
}

/// Fixed catalog of denominations. Order is significant: the weighted pick
/// walks it front to back and falls back to the first available entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Inventory(Vec<Denomination>);

impl Inventory {
    pub fn new(denominations: Vec<Denomination>) -> Result<Self, CoreError> {
        let inventory = Self(denominations);
        inventory.validate()?;
        Ok(inventory)
    }

    /// The Tet catalog the machine ships with.
    pub fn tet_default() -> Self {
        Self(vec![
            Denomination::new(10_000, 20),
            Denomination::new(20_000, 15),
            Denomination::new(50_000, 10),
            Denomination::new(100_000, 8),
            Denomination::new(200_000, 5),
            Denomination::new(500_000, 2),
        ])
    }

    /// Values must be positive and unique.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (i, d) in self.0.iter().enumerate() {
            if d.value == 0 {
                return Err(CoreError::InvalidCatalog(
                    "denomination value must be positive".into(),
                ));
            }
            if self.0[..i].iter().any(|prev| prev.value == d.value) {
                return Err(CoreError::InvalidCatalog(format!(
                    "duplicate denomination {}",
                    d.value
                )));
            }
        }
        Ok(())
    }

    pub fn denominations(&self) -> &[Denomination] {
        &self.0
    }

    pub fn get(&self, value: Amount) -> Option<&Denomination> {
        self.0.iter().find(|d| d.value == value)
    }

    /// Denominations with stock left, in catalog order.
    pub fn available(&self) -> Vec<&Denomination> {
        self.0.iter().filter(|d| d.is_available()).collect()
    }

    pub fn total_stock(&self) -> u64 {
        self.0.iter().map(|d| u64::from(d.quantity)).sum()
    }

    /// Sum of `value * quantity`. Display only.
    pub fn total_value(&self) -> Amount {
        self.0
            .iter()
            .map(|d| d.value.saturating_mul(u64::from(d.quantity)))
            .fold(0, Amount::saturating_add)
    }

    /// Sets `quantity = max(0, quantity + delta)` and returns the new quantity.
    pub fn adjust(&mut self, value: Amount, delta: i64) -> Result<u32, CoreError> {
        let denom = self
            .0
            .iter_mut()
            .find(|d| d.value == value)
            .ok_or(CoreError::UnknownDenomination(value))?;
        let next = (i64::from(denom.quantity)).saturating_add(delta);
        denom.quantity = next.clamp(0, i64::from(u32::MAX)) as u32;
        Ok(denom.quantity)
    }

    pub fn reset(&mut self) {
        for d in &mut self.0 {
            d.quantity = d.initial_quantity;
        }
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::tet_default()
    }
}
