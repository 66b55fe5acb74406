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

//! Fleet trucks.

use crate::base::TruckId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Registration data for a new truck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTruck {
    pub name: String,
    pub plate: String,
    /// Current odometer reading at registration.
    #[serde(default)]
    pub odometer: Decimal,
    /// Fuel tank capacity of the truck, in liters.
    #[serde(default)]
    pub tank_capacity: Decimal,
}

/// A truck and its last known odometer reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Truck {
    id: TruckId,
    name: String,
    plate: String,
    last_odometer: Decimal,
    tank_capacity: Decimal,
}

impl Truck {
    pub fn new(id: TruckId, truck: NewTruck) -> Self {
        Self {
            id,
            name: truck.name,
            plate: truck.plate,
            last_odometer: truck.odometer,
            tank_capacity: truck.tank_capacity,
        }
    }

    pub fn id(&self) -> TruckId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plate(&self) -> &str {
        &self.plate
    }

    pub fn last_odometer(&self) -> Decimal {
        self.last_odometer
    }

    pub fn tank_capacity(&self) -> Decimal {
        self.tank_capacity
    }

    /// Returns `true` if `reading` would not move the odometer backwards.
    pub(crate) fn accepts_odometer(&self, reading: Decimal) -> bool {
        reading >= self.last_odometer
    }

    pub(crate) fn advance_odometer(&mut self, reading: Decimal) {
        debug_assert!(
            self.accepts_odometer(reading),
            "Invariant violated: odometer moved backwards from {} to {}",
            self.last_odometer,
            reading
        );
        self.last_odometer = reading;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn truck(odometer: Decimal) -> Truck {
        Truck::new(
            TruckId(1),
            NewTruck {
                name: "Volvo FH".to_string(),
                plate: "ABC-1234".to_string(),
                odometer,
                tank_capacity: dec!(400),
            },
        )
    }

    #[test]
    fn new_truck_starts_at_registered_odometer() {
        let truck = truck(dec!(1000));
        assert_eq!(truck.last_odometer(), dec!(1000));
        assert_eq!(truck.plate(), "ABC-1234");
        assert_eq!(truck.tank_capacity(), dec!(400));
    }

    #[test]
    fn accepts_equal_and_greater_readings() {
        let truck = truck(dec!(1000));
        assert!(truck.accepts_odometer(dec!(1000)));
        assert!(truck.accepts_odometer(dec!(1000.1)));
        assert!(!truck.accepts_odometer(dec!(999.9)));
    }

    #[test]
    fn advance_updates_reading() {
        let mut truck = truck(dec!(1000));
        truck.advance_odometer(dec!(1050));
        assert_eq!(truck.last_odometer(), dec!(1050));
    }
}
