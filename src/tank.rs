// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! The shared fuel tank.
//!
//! Stock moves in two directions only: fueling dispenses decrement it,
//! refills increment it. Capacity is informational; refills are not clamped
//! to it.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use fuel_ledger_rs::{Tank, TankId};
//!
//! let tank = Tank::new(TankId(1), "Principal", dec!(6000), dec!(6000));
//! assert_eq!(tank.stock(), dec!(6000));
//! ```

use crate::FuelError;
use crate::base::TankId;
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};

#[derive(Debug)]
pub(crate) struct TankData {
    stock: Decimal,
}

impl TankData {
    fn assert_invariants(&self) {
        debug_assert!(
            self.stock >= Decimal::ZERO,
            "Invariant violated: tank stock went negative: {}",
            self.stock
        );
    }

    /// Fails with [`FuelError::InsufficientStock`] if `liters` exceeds stock.
    pub(crate) fn check_dispense(&self, liters: Decimal) -> Result<(), FuelError> {
        if liters < Decimal::ZERO {
            return Err(FuelError::InvalidAmount(liters));
        }
        if self.stock < liters {
            return Err(FuelError::InsufficientStock {
                available: self.stock,
            });
        }
        Ok(())
    }

    /// Decreases stock.
    pub(crate) fn dispense(&mut self, liters: Decimal) -> Result<(), FuelError> {
        self.check_dispense(liters)?;
        self.stock -= liters;
        self.assert_invariants();
        Ok(())
    }

    /// Increases stock. No upper bound.
    fn refill(&mut self, amount: Decimal) -> Result<Decimal, FuelError> {
        if amount <= Decimal::ZERO {
            return Err(FuelError::InvalidAmount(amount));
        }
        self.stock = self.stock.checked_add(amount).ok_or(FuelError::Overflow)?;
        self.assert_invariants();
        Ok(self.stock)
    }
}

/// Fuel tank.
#[derive(Debug)]
pub struct Tank {
    id: TankId,
    name: String,
    capacity: Decimal,
    inner: Mutex<TankData>,
}

impl Tank {
    const DECIMAL_PRECISION: u32 = 2;

    pub fn new(id: TankId, name: impl Into<String>, capacity: Decimal, stock: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            capacity,
            inner: Mutex::new(TankData { stock }),
        }
    }

    pub fn id(&self) -> TankId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> Decimal {
        self.capacity
    }

    pub fn stock(&self) -> Decimal {
        self.inner.lock().stock
    }

    /// Removes `liters` from stock.
    ///
    /// # Errors
    ///
    /// - [`FuelError::InsufficientStock`] - `liters` exceeds the current stock.
    /// - [`FuelError::InvalidAmount`] - `liters` is negative.
    pub fn dispense(&self, liters: Decimal) -> Result<(), FuelError> {
        self.inner.lock().dispense(liters)
    }

    /// Adds `amount` to stock and returns the new stock level.
    ///
    /// # Errors
    ///
    /// - [`FuelError::InvalidAmount`] - `amount` is not positive.
    /// - [`FuelError::Overflow`] - The new stock does not fit in a `Decimal`.
    pub fn refill(&self, amount: Decimal) -> Result<Decimal, FuelError> {
        self.inner.lock().refill(amount)
    }

    /// Locks the stock for a validate-then-apply sequence.
    pub(crate) fn lock(&self) -> MutexGuard<'_, TankData> {
        self.inner.lock()
    }
}

impl Serialize for Tank {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let data = self.inner.lock();
        let mut state = serializer.serialize_struct("Tank", 4)?;
        state.serialize_field("tank", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field(
            "capacity",
            &self.capacity.round_dp(Tank::DECIMAL_PRECISION),
        )?;
        state.serialize_field("stock", &data.stock.round_dp(Tank::DECIMAL_PRECISION))?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // === TankData Internal Tests ===

    #[test]
    fn tank_data_dispense() {
        let mut data = TankData { stock: dec!(100) };
        data.dispense(dec!(30)).unwrap();
        assert_eq!(data.stock, dec!(70));
    }

    #[test]
    fn tank_data_dispense_whole_stock() {
        let mut data = TankData { stock: dec!(100) };
        data.dispense(dec!(100)).unwrap();
        assert_eq!(data.stock, Decimal::ZERO);
    }

    #[test]
    fn tank_data_dispense_insufficient_reports_available() {
        let mut data = TankData { stock: dec!(20.5) };
        let result = data.dispense(dec!(21));
        assert_eq!(
            result,
            Err(FuelError::InsufficientStock {
                available: dec!(20.5)
            })
        );
        assert_eq!(data.stock, dec!(20.5));
    }

    #[test]
    fn tank_data_rejects_negative_dispense() {
        let mut data = TankData { stock: dec!(100) };
        let result = data.dispense(dec!(-5));
        assert_eq!(result, Err(FuelError::InvalidAmount(dec!(-5))));
        assert_eq!(data.stock, dec!(100));
    }

    #[test]
    fn tank_data_refill_rejects_non_positive() {
        let mut data = TankData { stock: dec!(100) };
        assert_eq!(data.refill(dec!(0)), Err(FuelError::InvalidAmount(dec!(0))));
        assert_eq!(data.refill(dec!(-1)), Err(FuelError::InvalidAmount(dec!(-1))));
        assert_eq!(data.stock, dec!(100));
    }

    #[test]
    fn tank_data_refill_is_not_clamped() {
        let mut data = TankData { stock: dec!(6000) };
        assert_eq!(data.refill(dec!(500)), Ok(dec!(6500)));
    }

    #[test]
    fn tank_data_refill_overflow_keeps_stock() {
        let mut data = TankData { stock: dec!(6000) };
        assert_eq!(data.refill(Decimal::MAX), Err(FuelError::Overflow));
        assert_eq!(data.stock, dec!(6000));
    }

    // === Serialization Tests ===

    #[test]
    fn serializer_rounds_to_two_decimal_places() {
        let tank = Tank::new(TankId(1), "Principal", dec!(6000), dec!(0));
        {
            let mut data = tank.inner.lock();
            data.stock = dec!(123.456);
        }

        let json = serde_json::to_string(&tank).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["tank"], 1);
        assert_eq!(parsed["name"], "Principal");
        assert_eq!(parsed["capacity"].as_str().unwrap(), "6000");
        assert_eq!(parsed["stock"].as_str().unwrap(), "123.46");
    }
}
