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

//! # Fuel Ledger
//!
//! This library tracks fuel dispensed from a shared tank into the trucks of a
//! small fleet. It enforces odometer monotonicity per truck, stock
//! sufficiency in the tank, a write-once record timestamp and
//! manager-only deletion.
//!
//! ## Core Components
//!
//! - [`Engine`]: Validates and applies fueling, updates, deletes and refills
//! - [`Tank`]: The shared tank and its stock level
//! - [`Truck`]: A fleet truck and its last odometer reading
//! - [`FuelRecord`]: One dispense, with its derived total
//! - [`Principal`]: The acting user, queried for [`Capability::FuelManager`]
//! - [`FuelError`]: Error types for rejected operations
//!
//! ## Example
//!
//! ```
//! use fuel_ledger_rs::{Engine, NewFuelRecord, NewTruck, User, UserId};
//! use rust_decimal_macros::dec;
//!
//! let engine = Engine::new();
//! let truck = engine.register_truck(NewTruck {
//!     name: "Volvo FH".to_string(),
//!     plate: "ABC-1234".to_string(),
//!     odometer: dec!(1000),
//!     tank_capacity: dec!(400),
//! });
//!
//! let driver = User::driver(UserId(7));
//! let record = engine
//!     .create_fuel_record(
//!         NewFuelRecord::new(truck, dec!(50))
//!             .odometer(dec!(1050))
//!             .price_per_liter(dec!(5)),
//!         &driver,
//!     )
//!     .unwrap();
//!
//! assert_eq!(record.total(), dec!(250));
//! assert_eq!(engine.truck(truck).unwrap().last_odometer(), dec!(1050));
//! assert_eq!(engine.tank().stock(), dec!(5950));
//! ```
//!
//! ## Thread Safety
//!
//! The engine can be shared across threads. Fuelings for different trucks
//! proceed in parallel and serialize only on the tank stock.

mod base;
pub mod config;
mod engine;
pub mod error;
mod principal;
mod record;
mod store;
pub mod tank;
mod truck;

pub use base::{RecordId, TankId, TruckId, UserId};
pub use config::{EngineConfig, TankConfig};
pub use engine::Engine;
pub use error::{ConfigError, FuelError};
pub use principal::{Capability, Principal, User};
pub use record::{FuelRecord, FuelRecordChanges, NewFuelRecord};
pub use store::RecordStore;
pub use tank::Tank;
pub use truck::{NewTruck, Truck};
