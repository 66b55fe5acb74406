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

//! Error types for fuel record processing and configuration loading.

use crate::base::{RecordId, TankId, TruckId};
use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

/// Fueling, mutation and refill errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FuelError {
    /// Supplied odometer is below the truck's last recorded reading
    #[error("odometer regression: last recorded reading is {last}, cannot record {supplied}")]
    OdometerRegression { last: Decimal, supplied: Decimal },

    /// Requested liters exceed the tank's current stock
    #[error("insufficient stock: {available} L available")]
    InsufficientStock { available: Decimal },

    /// Attempt to change a write-once field
    #[error("field '{field}' cannot be changed after the record is created")]
    ImmutableField { field: &'static str },

    /// Actor lacks the capability required for the operation
    #[error("permission denied: only fuel managers may delete fuel records")]
    PermissionDenied,

    /// Referenced truck does not exist
    #[error("truck {0} not found")]
    TruckNotFound(TruckId),

    /// Truck ID is already registered
    #[error("truck {0} is already registered")]
    DuplicateTruck(TruckId),

    /// Referenced fuel record does not exist
    #[error("fuel record {0} not found")]
    RecordNotFound(RecordId),

    /// Referenced tank is not the engine's tank
    #[error("tank {0} not found")]
    TankNotFound(TankId),

    /// Quantity is negative, or not positive where a positive one is required
    #[error("invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Quantity arithmetic exceeded the decimal range
    #[error("arithmetic overflow: quantity out of range")]
    Overflow,
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
