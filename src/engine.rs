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

//! Fueling engine.
//!
//! The [`Engine`] owns the fleet's trucks, the shared fuel tank and the fuel
//! records, and enforces the business rules applied when records are
//! created, changed or deleted.
//!
//! # Operations
//!
//! - **Create**: validates each entry against the truck's last odometer and
//!   the tank's stock, then advances the odometer, decrements stock and
//!   stores the record.
//! - **Update**: applies field changes, except that the timestamp is
//!   write-once. No odometer or stock re-validation happens on update.
//! - **Delete**: fuel managers only.
//! - **Refill**: adds fuel to the tank with no capacity clamp.
//!
//! # Thread Safety
//!
//! Trucks and records live in [`DashMap`]s and the tank stock behind a
//! mutex, so the engine can be shared across threads. When a truck entry
//! and the tank are locked together, the truck is always locked first.

use crate::base::{RecordId, TankId, TruckId};
use crate::config::EngineConfig;
use crate::principal::{Capability, Principal};
use crate::record::{self, FuelRecord, FuelRecordChanges, NewFuelRecord};
use crate::store::RecordStore;
use crate::tank::Tank;
use crate::truck::{NewTruck, Truck};
use crate::FuelError;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info};

/// Fueling engine managing trucks, the shared tank and fuel records.
///
/// # Invariants
///
/// - A truck's `last_odometer` never decreases.
/// - Tank stock never goes negative through a dispense.
/// - Every stored record's `total` equals `liters * price_per_liter`.
/// - A record's timestamp never changes after creation.
/// - There is exactly one tank.
pub struct Engine {
    /// Trucks indexed by truck ID.
    trucks: DashMap<TruckId, Truck>,
    next_truck_id: AtomicU32,
    tank: Tank,
    records: RecordStore,
    config: EngineConfig,
}

impl Engine {
    /// ID of the engine's tank.
    pub const TANK_ID: TankId = TankId(1);

    /// Creates an engine with the default configuration: a full 6000 L tank,
    /// no trucks and no records.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let tank = Tank::new(
            Self::TANK_ID,
            config.tank.name.clone(),
            config.tank.capacity,
            config.tank.initial_stock,
        );
        Engine {
            trucks: DashMap::new(),
            next_truck_id: AtomicU32::new(1),
            tank,
            records: RecordStore::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registers a truck under a freshly allocated ID.
    pub fn register_truck(&self, truck: NewTruck) -> TruckId {
        loop {
            let id = TruckId(self.next_truck_id.fetch_add(1, Ordering::Relaxed));
            // IDs may already be taken by `register_truck_with_id`
            if let Entry::Vacant(entry) = self.trucks.entry(id) {
                debug!(truck = %id, plate = %truck.plate, "truck registered");
                entry.insert(Truck::new(id, truck));
                return id;
            }
        }
    }

    /// Registers a truck under a caller-chosen ID.
    ///
    /// # Errors
    ///
    /// Returns [`FuelError::DuplicateTruck`] if the ID is already in use.
    pub fn register_truck_with_id(&self, id: TruckId, truck: NewTruck) -> Result<(), FuelError> {
        match self.trucks.entry(id) {
            Entry::Occupied(_) => Err(FuelError::DuplicateTruck(id)),
            Entry::Vacant(entry) => {
                debug!(truck = %id, plate = %truck.plate, "truck registered");
                entry.insert(Truck::new(id, truck));
                Ok(())
            }
        }
    }

    /// Creates fuel records, one entry at a time, in submission order.
    ///
    /// Each entry is validated and applied independently: the result at
    /// index `i` belongs to `batch[i]`, a failed entry does not undo the
    /// entries before it, and later entries are still attempted.
    pub fn create_fuel_records<P, I>(
        &self,
        batch: I,
        actor: &P,
    ) -> Vec<Result<FuelRecord, FuelError>>
    where
        P: Principal + ?Sized,
        I: IntoIterator<Item = NewFuelRecord>,
    {
        batch
            .into_iter()
            .map(|entry| self.create_fuel_record(entry, actor))
            .collect()
    }

    /// Creates a single fuel record.
    ///
    /// # Steps
    ///
    /// | Step | Behavior |
    /// |------|----------|
    /// | Driver | Non-managers are always recorded as the driver |
    /// | Odometer | Rejects readings below the truck's last odometer, then advances it |
    /// | Stock | Rejects liters above the tank's stock, then decrements it |
    /// | Persist | Stores the record with `total = liters * price_per_liter` |
    ///
    /// Unless [`EngineConfig::atomic_entries`] is set, the odometer is
    /// advanced before the stock check, so an entry rejected with
    /// [`FuelError::InsufficientStock`] still moves the truck's odometer.
    ///
    /// # Errors
    ///
    /// - [`FuelError::InvalidAmount`] - Negative liters or price.
    /// - [`FuelError::Overflow`] - `liters * price_per_liter` is out of range.
    /// - [`FuelError::TruckNotFound`] - Unknown truck.
    /// - [`FuelError::OdometerRegression`] - Reading below the truck's last odometer.
    /// - [`FuelError::InsufficientStock`] - Not enough fuel in the tank.
    pub fn create_fuel_record<P>(
        &self,
        entry: NewFuelRecord,
        actor: &P,
    ) -> Result<FuelRecord, FuelError>
    where
        P: Principal + ?Sized,
    {
        let truck_id = entry.truck_id;
        let result = self.apply_fuel_entry(entry, actor);
        if let Err(e) = &result {
            debug!(truck = %truck_id, actor = %actor.user_id(), error = %e, "fuel record rejected");
        }
        result
    }

    fn apply_fuel_entry<P>(&self, entry: NewFuelRecord, actor: &P) -> Result<FuelRecord, FuelError>
    where
        P: Principal + ?Sized,
    {
        if entry.liters < Decimal::ZERO {
            return Err(FuelError::InvalidAmount(entry.liters));
        }
        if let Some(price) = entry.price_per_liter.filter(|p| *p < Decimal::ZERO) {
            return Err(FuelError::InvalidAmount(price));
        }
        // The total must fit before the truck or tank is touched
        record::checked_total(entry.liters, entry.price_per_liter.unwrap_or(Decimal::ZERO))?;

        let driver = if actor.has_capability(Capability::FuelManager) {
            entry.driver.unwrap_or_else(|| actor.user_id())
        } else {
            actor.user_id()
        };

        let plate = {
            let mut truck = self
                .trucks
                .get_mut(&entry.truck_id)
                .ok_or(FuelError::TruckNotFound(entry.truck_id))?;

            if let Some(reading) = entry.odometer {
                if !truck.accepts_odometer(reading) {
                    return Err(FuelError::OdometerRegression {
                        last: truck.last_odometer(),
                        supplied: reading,
                    });
                }
            }

            if self.config.atomic_entries {
                let mut tank = self.tank.lock();
                tank.check_dispense(entry.liters)?;
                if let Some(reading) = entry.odometer {
                    truck.advance_odometer(reading);
                }
                tank.dispense(entry.liters)?;
                truck.plate().to_string()
            } else {
                if let Some(reading) = entry.odometer {
                    truck.advance_odometer(reading);
                }
                let plate = truck.plate().to_string();
                drop(truck);
                self.tank.dispense(entry.liters)?;
                plate
            }
        };

        let timestamp = entry.timestamp.unwrap_or_else(Utc::now);
        let record = FuelRecord::new(self.records.allocate_id(), entry, plate, driver, timestamp)?;
        self.records.insert(record.clone());

        debug!(
            record = %record.id(),
            truck = %record.truck_id(),
            driver = %record.driver(),
            liters = %record.liters(),
            total = %record.total(),
            "fuel record created"
        );
        Ok(record)
    }

    /// Applies `changes` to an existing fuel record.
    ///
    /// Any change carrying a timestamp is rejected, whoever the actor is.
    /// Other fields are applied as given; the odometer and tank stock are
    /// not re-validated.
    ///
    /// # Errors
    ///
    /// - [`FuelError::ImmutableField`] - `changes.timestamp` is set.
    /// - [`FuelError::RecordNotFound`] - Unknown record.
    /// - [`FuelError::TruckNotFound`] - `changes.truck_id` references an unknown truck.
    /// - [`FuelError::Overflow`] - The new total is out of range; the record is unchanged.
    pub fn update_fuel_record<P>(
        &self,
        id: RecordId,
        changes: FuelRecordChanges,
        actor: &P,
    ) -> Result<FuelRecord, FuelError>
    where
        P: Principal + ?Sized,
    {
        if changes.timestamp.is_some() {
            debug!(record = %id, actor = %actor.user_id(), "attempt to change fuel record timestamp");
            return Err(FuelError::ImmutableField { field: "timestamp" });
        }

        let mut record = self.records.get_mut(id)?;
        if changes.is_empty() {
            return Ok(record.clone());
        }
        let plate = match changes.truck_id {
            Some(truck_id) => Some(
                self.trucks
                    .get(&truck_id)
                    .ok_or(FuelError::TruckNotFound(truck_id))?
                    .plate()
                    .to_string(),
            ),
            None => None,
        };

        record.apply(changes, plate)?;
        debug!(record = %id, actor = %actor.user_id(), "fuel record updated");
        Ok(record.clone())
    }

    /// Deletes fuel records. Fuel managers only.
    ///
    /// Every ID is checked before anything is removed; the first failure
    /// aborts the whole batch and leaves all records in place.
    ///
    /// # Errors
    ///
    /// - [`FuelError::PermissionDenied`] - Actor is not a fuel manager.
    /// - [`FuelError::RecordNotFound`] - Unknown record.
    pub fn delete_fuel_records<P>(&self, ids: &[RecordId], actor: &P) -> Result<(), FuelError>
    where
        P: Principal + ?Sized,
    {
        for id in ids {
            if !actor.has_capability(Capability::FuelManager) {
                debug!(record = %id, actor = %actor.user_id(), "fuel record deletion denied");
                return Err(FuelError::PermissionDenied);
            }
            if !self.records.contains(*id) {
                return Err(FuelError::RecordNotFound(*id));
            }
        }

        for id in ids {
            self.records.remove(*id);
        }
        if !ids.is_empty() {
            info!(count = ids.len(), actor = %actor.user_id(), "fuel records deleted");
        }
        Ok(())
    }

    /// Adds `amount` liters to the tank and returns the new stock level.
    ///
    /// Stock may exceed the tank's capacity.
    ///
    /// # Errors
    ///
    /// - [`FuelError::TankNotFound`] - `tank_id` is not [`Engine::TANK_ID`].
    /// - [`FuelError::InvalidAmount`] - `amount` is not positive.
    /// - [`FuelError::Overflow`] - The new stock is out of range.
    pub fn refill_tank(&self, tank_id: TankId, amount: Decimal) -> Result<Decimal, FuelError> {
        if tank_id != self.tank.id() {
            return Err(FuelError::TankNotFound(tank_id));
        }
        let stock = self.tank.refill(amount)?;
        info!(tank = %tank_id, amount = %amount, stock = %stock, "tank refilled");
        Ok(stock)
    }

    pub fn tank(&self) -> &Tank {
        &self.tank
    }

    /// Retrieves a truck by ID.
    pub fn truck(&self, id: TruckId) -> Option<Truck> {
        self.trucks.get(&id).map(|truck| truck.clone())
    }

    /// Returns all trucks ordered by ID.
    pub fn trucks(&self) -> Vec<Truck> {
        let mut trucks: Vec<Truck> = self.trucks.iter().map(|t| t.value().clone()).collect();
        trucks.sort_by_key(Truck::id);
        trucks
    }

    /// Retrieves a fuel record by ID.
    pub fn fuel_record(&self, id: RecordId) -> Option<FuelRecord> {
        self.records.get(id)
    }

    /// Returns all fuel records in creation order.
    pub fn fuel_records(&self) -> Vec<FuelRecord> {
        self.records.snapshot()
    }

    /// The last odometer currently registered for the record's truck.
    ///
    /// This follows the truck, so it reflects fuelings made after the
    /// record was created.
    pub fn previous_odometer(&self, id: RecordId) -> Result<Decimal, FuelError> {
        let truck_id = self
            .records
            .get(id)
            .ok_or(FuelError::RecordNotFound(id))?
            .truck_id();
        self.trucks
            .get(&truck_id)
            .map(|truck| truck.last_odometer())
            .ok_or(FuelError::TruckNotFound(truck_id))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
