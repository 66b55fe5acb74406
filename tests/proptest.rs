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

//! Property-based tests for the fueling engine.
//!
//! These tests verify invariants that should hold for any sequence of
//! fuelings, updates, deletes and refills.

use chrono::{TimeZone, Utc};
use fuel_ledger_rs::{
    Engine, FuelError, FuelRecordChanges, NewFuelRecord, NewTruck, RecordId, TruckId, User,
    UserId,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

// =============================================================================
// Arbitrary Strategies
// =============================================================================

/// Generate a positive quantity (0.01 to 1000 with 2 decimal places).
fn arb_liters() -> impl Strategy<Value = Decimal> {
    (1i64..=100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Generate a price per liter (0.001 to 20 with 3 decimal places).
fn arb_price() -> impl Strategy<Value = Decimal> {
    (1i64..=20_000i64).prop_map(|mills| Decimal::new(mills, 3))
}

/// Generate an odometer reading (0 to 1,000,000 with 1 decimal place).
fn arb_odometer() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000_000i64).prop_map(|tenths| Decimal::new(tenths, 1))
}

fn arb_actor() -> impl Strategy<Value = User> {
    (1u32..100, any::<bool>()).prop_map(|(id, is_manager)| {
        if is_manager {
            User::manager(UserId(id))
        } else {
            User::driver(UserId(id))
        }
    })
}

fn engine_with_truck(odometer: Decimal) -> (Engine, TruckId) {
    let engine = Engine::new();
    let truck = engine.register_truck(NewTruck {
        name: "Volvo FH".to_string(),
        plate: "ABC-1234".to_string(),
        odometer,
        tank_capacity: Decimal::new(400, 0),
    });
    (engine, truck)
}

// =============================================================================
// Creation Invariant Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// A successful fueling moves the truck, the tank and the total exactly.
    #[test]
    fn successful_fueling_is_exact(
        start in arb_odometer(),
        distance in arb_odometer(),
        liters in arb_liters(),
        price in arb_price(),
    ) {
        let (engine, truck) = engine_with_truck(start);
        let stock = engine.tank().stock();
        let reading = start + distance;

        let record = engine.create_fuel_record(
            NewFuelRecord::new(truck, liters).odometer(reading).price_per_liter(price),
            &User::driver(UserId(1)),
        ).unwrap();

        prop_assert_eq!(record.total(), liters * price);
        prop_assert_eq!(engine.truck(truck).unwrap().last_odometer(), reading);
        prop_assert_eq!(engine.tank().stock(), stock - liters);
    }

    /// A reading below the last odometer fails and mutates nothing.
    #[test]
    fn regression_mutates_nothing(
        start in arb_odometer(),
        back in arb_liters(),
        liters in arb_liters(),
    ) {
        let (engine, truck) = engine_with_truck(start + back);
        let last = start + back;

        let result = engine.create_fuel_record(
            NewFuelRecord::new(truck, liters).odometer(start),
            &User::driver(UserId(1)),
        );

        prop_assert_eq!(
            result,
            Err(FuelError::OdometerRegression { last, supplied: start })
        );
        prop_assert_eq!(engine.truck(truck).unwrap().last_odometer(), last);
        prop_assert_eq!(engine.tank().stock(), Decimal::new(6000, 0));
        prop_assert!(engine.fuel_records().is_empty());
    }

    /// Asking for more than the stock fails and leaves the stock alone.
    /// The odometer advance for that entry has already happened.
    #[test]
    fn overdraw_leaves_stock_but_advances_odometer(
        start in arb_odometer(),
        distance in arb_odometer(),
        excess in arb_liters(),
    ) {
        let (engine, truck) = engine_with_truck(start);
        let stock = engine.tank().stock();
        let reading = start + distance;

        let result = engine.create_fuel_record(
            NewFuelRecord::new(truck, stock + excess).odometer(reading),
            &User::driver(UserId(1)),
        );

        prop_assert_eq!(result, Err(FuelError::InsufficientStock { available: stock }));
        prop_assert_eq!(engine.tank().stock(), stock);
        prop_assert_eq!(engine.truck(truck).unwrap().last_odometer(), reading);
    }

    /// Across any sequence of fuelings, the odometer never decreases and the
    /// stock never goes negative.
    #[test]
    fn odometer_monotonic_and_stock_non_negative(
        readings in prop::collection::vec(arb_odometer(), 1..30),
        amounts in prop::collection::vec(arb_liters(), 1..30),
    ) {
        let (engine, truck) = engine_with_truck(Decimal::ZERO);
        let actor = User::driver(UserId(1));
        let mut last = Decimal::ZERO;

        for (reading, liters) in readings.iter().zip(amounts.iter()) {
            let _ = engine.create_fuel_record(
                NewFuelRecord::new(truck, *liters).odometer(*reading),
                &actor,
            );
            let current = engine.truck(truck).unwrap().last_odometer();
            prop_assert!(current >= last);
            prop_assert!(engine.tank().stock() >= Decimal::ZERO);
            last = current;
        }
    }

    /// Stock plus everything dispensed always equals the initial stock.
    #[test]
    fn stock_is_conserved(
        amounts in prop::collection::vec(arb_liters(), 1..30),
    ) {
        let (engine, truck) = engine_with_truck(Decimal::ZERO);
        let initial = engine.tank().stock();

        let results = engine.create_fuel_records(
            amounts.iter().map(|liters| NewFuelRecord::new(truck, *liters)),
            &User::driver(UserId(1)),
        );

        let dispensed: Decimal = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|r| r.liters())
            .sum();
        prop_assert_eq!(engine.tank().stock() + dispensed, initial);
    }

    /// Non-managers are always recorded as the driver.
    #[test]
    fn drivers_cannot_attribute_fuel(
        actor_id in 1u32..100,
        claimed in 1u32..100,
    ) {
        let (engine, truck) = engine_with_truck(Decimal::ZERO);

        let record = engine.create_fuel_record(
            NewFuelRecord::new(truck, Decimal::ONE).driver(UserId(claimed)),
            &User::driver(UserId(actor_id)),
        ).unwrap();

        prop_assert_eq!(record.driver(), UserId(actor_id));
    }
}

// =============================================================================
// Mutation Guard Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any update that carries a timestamp fails, for any actor.
    #[test]
    fn timestamp_updates_always_fail(
        actor in arb_actor(),
        secs in 0i64..4_000_000_000i64,
        liters in prop::option::of(arb_liters()),
    ) {
        let (engine, truck) = engine_with_truck(Decimal::ZERO);
        let record = engine.create_fuel_record(
            NewFuelRecord::new(truck, Decimal::ONE),
            &User::driver(UserId(1)),
        ).unwrap();

        let result = engine.update_fuel_record(
            record.id(),
            FuelRecordChanges {
                timestamp: Some(Utc.timestamp_opt(secs, 0).unwrap()),
                liters,
                ..Default::default()
            },
            &actor,
        );

        prop_assert_eq!(result, Err(FuelError::ImmutableField { field: "timestamp" }));
        prop_assert_eq!(engine.fuel_record(record.id()), Some(record));
    }

    /// Updating liters or price keeps `total == liters * price`.
    #[test]
    fn updates_keep_total_consistent(
        liters in prop::option::of(arb_liters()),
        price in prop::option::of(arb_price()),
    ) {
        let (engine, truck) = engine_with_truck(Decimal::ZERO);
        let record = engine.create_fuel_record(
            NewFuelRecord::new(truck, Decimal::TEN).price_per_liter(Decimal::TWO),
            &User::driver(UserId(1)),
        ).unwrap();

        let updated = engine.update_fuel_record(
            record.id(),
            FuelRecordChanges { liters, price_per_liter: price, ..Default::default() },
            &User::driver(UserId(1)),
        ).unwrap();

        prop_assert_eq!(updated.total(), updated.liters() * updated.price_per_liter());
    }

    /// A non-manager delete always fails and leaves every record in place.
    #[test]
    fn driver_deletes_always_fail(
        count in 1usize..10,
        actor_id in 1u32..100,
    ) {
        let (engine, truck) = engine_with_truck(Decimal::ZERO);
        let ids: Vec<RecordId> = engine
            .create_fuel_records(
                (0..count).map(|_| NewFuelRecord::new(truck, Decimal::ONE)),
                &User::driver(UserId(1)),
            )
            .into_iter()
            .map(|r| r.unwrap().id())
            .collect();

        let result = engine.delete_fuel_records(&ids, &User::driver(UserId(actor_id)));

        prop_assert_eq!(result, Err(FuelError::PermissionDenied));
        prop_assert_eq!(engine.fuel_records().len(), count);
    }

    /// A refill adds exactly its amount, with no clamp at capacity.
    #[test]
    fn refill_adds_exact_amount(
        amounts in prop::collection::vec(arb_liters(), 1..20),
    ) {
        let engine = Engine::new();
        let mut expected = engine.tank().stock();

        for amount in &amounts {
            let stock = engine.refill_tank(Engine::TANK_ID, *amount).unwrap();
            expected += *amount;
            prop_assert_eq!(stock, expected);
        }

        prop_assert_eq!(engine.tank().stock(), expected);
        prop_assert!(engine.tank().stock() > engine.tank().capacity());
    }
}
