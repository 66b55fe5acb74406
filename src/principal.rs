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

//! Acting principals and their capabilities.
//!
//! Every engine operation that depends on who is acting takes the principal
//! explicitly. The engine only asks two questions of it: who it is, and
//! whether it holds a given [`Capability`].

use crate::base::UserId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A permission a principal may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// May attribute fuel to other drivers and delete fuel records.
    FuelManager,
}

/// The identity an operation is performed on behalf of.
///
/// Implement this for whatever identity type the host application uses.
pub trait Principal {
    fn user_id(&self) -> UserId;

    fn has_capability(&self, capability: Capability) -> bool;
}

/// A simple principal backed by an explicit capability set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    capabilities: HashSet<Capability>,
}

impl User {
    /// A driver: no capabilities.
    pub fn driver(id: UserId) -> Self {
        Self {
            id,
            capabilities: HashSet::new(),
        }
    }

    /// A fuel manager.
    pub fn manager(id: UserId) -> Self {
        Self::driver(id).with_capability(Capability::FuelManager)
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }
}

impl Principal for User {
    fn user_id(&self) -> UserId {
        self.id
    }

    fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}
