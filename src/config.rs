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

//! Engine configuration.
//!
//! Loaded from a TOML file; every key is optional.
//!
//! ```toml
//! atomic_entries = false
//!
//! [tank]
//! name = "Principal (6.000L)"
//! capacity = "6000"
//! initial_stock = "6000"
//! ```

use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Validate odometer and stock together before mutating either.
    ///
    /// When `false`, a fueling entry advances the truck's odometer before
    /// the stock check, so an entry rejected for insufficient stock still
    /// leaves the odometer advanced.
    #[serde(default)]
    pub atomic_entries: bool,

    #[serde(default)]
    pub tank: TankConfig,
}

/// Shared tank settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TankConfig {
    #[serde(default = "default_tank_name")]
    pub name: String,

    #[serde(default = "default_tank_capacity")]
    pub capacity: Decimal,

    #[serde(default = "default_tank_capacity")]
    pub initial_stock: Decimal,
}

fn default_tank_name() -> String {
    "Principal (6.000L)".to_string()
}

fn default_tank_capacity() -> Decimal {
    dec!(6000)
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            name: default_tank_name(),
            capacity: default_tank_capacity(),
            initial_stock: default_tank_capacity(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            atomic_entries: false,
            tank: TankConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads configuration from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Loads configuration from `path` if given, otherwise returns defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
