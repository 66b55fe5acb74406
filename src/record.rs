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

//! Fuel records.
//!
//! A [`FuelRecord`] is one dispense from the shared tank into a truck. Its
//! `total` is derived from liters and price and is recomputed whenever
//! either changes. The timestamp is written once, at creation.

use crate::FuelError;
use crate::base::{RecordId, TruckId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A proposed fuel record, as submitted for creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFuelRecord {
    pub truck_id: TruckId,
    /// Odometer reading at fill time. Skips odometer validation when absent.
    #[serde(default)]
    pub odometer: Option<Decimal>,
    pub liters: Decimal,
    /// Defaults to zero.
    #[serde(default)]
    pub price_per_liter: Option<Decimal>,
    /// Only honored for fuel managers.
    #[serde(default)]
    pub driver: Option<UserId>,
    /// Defaults to the creation time.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewFuelRecord {
    pub fn new(truck_id: TruckId, liters: Decimal) -> Self {
        Self {
            truck_id,
            odometer: None,
            liters,
            price_per_liter: None,
            driver: None,
            timestamp: None,
        }
    }

    pub fn odometer(mut self, odometer: Decimal) -> Self {
        self.odometer = Some(odometer);
        self
    }

    pub fn price_per_liter(mut self, price: Decimal) -> Self {
        self.price_per_liter = Some(price);
        self
    }

    pub fn driver(mut self, driver: UserId) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A partial update to an existing fuel record.
///
/// `None` leaves the field untouched. Setting `timestamp` is always
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelRecordChanges {
    pub truck_id: Option<TruckId>,
    pub driver: Option<UserId>,
    pub timestamp: Option<DateTime<Utc>>,
    pub odometer: Option<Decimal>,
    pub liters: Option<Decimal>,
    pub price_per_liter: Option<Decimal>,
}

impl FuelRecordChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Returns `liters * price_per_liter`.
///
/// # Errors
///
/// Returns [`FuelError::Overflow`] if the product does not fit in a `Decimal`.
pub(crate) fn checked_total(liters: Decimal, price_per_liter: Decimal) -> Result<Decimal, FuelError> {
    liters
        .checked_mul(price_per_liter)
        .ok_or(FuelError::Overflow)
}

/// A persisted fuel record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuelRecord {
    id: RecordId,
    truck_id: TruckId,
    plate: String,
    driver: UserId,
    timestamp: DateTime<Utc>,
    odometer: Option<Decimal>,
    liters: Decimal,
    price_per_liter: Decimal,
    total: Decimal,
}

impl FuelRecord {
    pub(crate) fn new(
        id: RecordId,
        entry: NewFuelRecord,
        plate: String,
        driver: UserId,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, FuelError> {
        let price_per_liter = entry.price_per_liter.unwrap_or(Decimal::ZERO);
        Ok(Self {
            id,
            truck_id: entry.truck_id,
            plate,
            driver,
            timestamp,
            odometer: entry.odometer,
            liters: entry.liters,
            price_per_liter,
            total: checked_total(entry.liters, price_per_liter)?,
        })
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn truck_id(&self) -> TruckId {
        self.truck_id
    }

    /// License plate of the referenced truck.
    pub fn plate(&self) -> &str {
        &self.plate
    }

    pub fn driver(&self) -> UserId {
        self.driver
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn odometer(&self) -> Option<Decimal> {
        self.odometer
    }

    pub fn liters(&self) -> Decimal {
        self.liters
    }

    pub fn price_per_liter(&self) -> Decimal {
        self.price_per_liter
    }

    /// Returns `liters * price_per_liter`.
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Applies every change except `timestamp`, which callers must have
    /// rejected already. A new truck reference must come with its plate.
    ///
    /// The record is left untouched if the new total overflows.
    pub(crate) fn apply(
        &mut self,
        changes: FuelRecordChanges,
        plate: Option<String>,
    ) -> Result<(), FuelError> {
        debug_assert!(changes.timestamp.is_none());

        let liters = changes.liters.unwrap_or(self.liters);
        let price_per_liter = changes.price_per_liter.unwrap_or(self.price_per_liter);
        let total = if changes.liters.is_some() || changes.price_per_liter.is_some() {
            checked_total(liters, price_per_liter)?
        } else {
            self.total
        };

        if let Some(truck_id) = changes.truck_id {
            self.truck_id = truck_id;
        }
        if let Some(plate) = plate {
            self.plate = plate;
        }
        if let Some(driver) = changes.driver {
            self.driver = driver;
        }
        if let Some(odometer) = changes.odometer {
            self.odometer = Some(odometer);
        }
        self.liters = liters;
        self.price_per_liter = price_per_liter;
        self.total = total;
        Ok(())
    }
}
