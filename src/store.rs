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

//! Thread-safe fuel record store.
//!
//! Allocates record IDs in increasing order and keeps records in a
//! [`DashMap`] for concurrent lookup and mutation.

use crate::FuelError;
use crate::base::RecordId;
use crate::record::FuelRecord;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::RefMut;
use std::sync::atomic::{AtomicU32, Ordering};

/// Fuel records indexed by ID.
#[derive(Debug)]
pub struct RecordStore {
    records: DashMap<RecordId, FuelRecord>,

    /// Next ID to hand out. Starts at 1.
    next_id: AtomicU32,
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }

    /// Reserves a fresh record ID.
    pub fn allocate_id(&self) -> RecordId {
        RecordId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Stores a record under its ID.
    pub fn insert(&self, record: FuelRecord) {
        // Use entry API so an ID is never silently overwritten
        match self.records.entry(record.id()) {
            Entry::Occupied(_) => {
                debug_assert!(false, "record ID {} allocated twice", record.id());
            }
            Entry::Vacant(entry) => {
                entry.insert(record);
            }
        }
    }

    pub fn get(&self, id: RecordId) -> Option<FuelRecord> {
        self.records.get(&id).map(|record| record.clone())
    }

    pub(crate) fn get_mut(
        &self,
        id: RecordId,
    ) -> Result<RefMut<'_, RecordId, FuelRecord>, FuelError> {
        self.records
            .get_mut(&id)
            .ok_or(FuelError::RecordNotFound(id))
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn remove(&self, id: RecordId) -> Option<FuelRecord> {
        self.records.remove(&id).map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns a snapshot of all records in creation order.
    pub fn snapshot(&self) -> Vec<FuelRecord> {
        let mut records: Vec<FuelRecord> =
            self.records.iter().map(|entry| entry.value().clone()).collect();
        records.sort_by_key(FuelRecord::id);
        records
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}
