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

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use fuel_ledger_rs::{
    Engine, EngineConfig, NewFuelRecord, NewTruck, RecordId, TruckId, User, UserId,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Fuel Ledger - Replay fleet fueling operations
///
/// Loads the fleet from a trucks CSV, applies the operations CSV in order and
/// writes the resulting fuel records to stdout.
#[derive(Parser, Debug)]
#[command(name = "fuel-ledger-rs")]
#[command(about = "A fleet fueling ledger that replays fueling operation CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with operations
    ///
    /// Expected format: type,user,role,truck,odometer,liters,price,driver,record,amount
    /// Example: cargo run -- --trucks trucks.csv operations.csv > records.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Path to CSV file with the fleet
    ///
    /// Expected format: truck,name,plate,odometer,capacity
    #[arg(long, value_name = "FILE")]
    trucks: PathBuf,

    /// Path to a TOML engine configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match EngineConfig::load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };
    let engine = Engine::with_config(config);
    info!(
        atomic_entries = engine.config().atomic_entries,
        tank = %engine.tank().name(),
        "engine ready"
    );

    let trucks = match File::open(&args.trucks) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.trucks.display(), e);
            process::exit(1);
        }
    };
    match load_trucks(&engine, BufReader::new(trucks)) {
        Ok(count) => info!(count, "fleet loaded"),
        Err(e) => {
            eprintln!("Error loading trucks: {}", e);
            process::exit(1);
        }
    }

    let operations = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };
    match process_operations(&engine, BufReader::new(operations)) {
        Ok(rejected) => info!(rejected, "operations processed"),
        Err(e) => {
            eprintln!("Error processing operations: {}", e);
            process::exit(1);
        }
    }

    info!(stock = %engine.tank().stock(), "final tank stock");

    if let Err(e) = write_records(&engine, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .trim(Trim::All) // Handle whitespace in fields like " fuel "
        .flexible(true) // Allow trailing optional fields to be omitted
        .has_headers(true);
    builder
}

/// Raw truck row.
///
/// Fields: `truck, name, plate, odometer, capacity`
#[derive(Debug, Deserialize)]
struct CsvTruck {
    truck: u32,
    name: String,
    plate: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    odometer: Option<Decimal>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    capacity: Option<Decimal>,
}

/// Registers every well-formed truck row and returns how many were loaded.
///
/// # Errors
///
/// Returns a CSV error if the reader fails. Malformed rows and duplicate
/// truck IDs are logged and skipped.
pub fn load_trucks<R: Read>(engine: &Engine, reader: R) -> Result<usize, csv::Error> {
    let mut rdr = reader_builder().from_reader(reader);
    let mut loaded = 0;

    for result in rdr.deserialize::<CsvTruck>() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!(error = %e, "skipping malformed truck row");
                continue;
            }
        };

        let truck = NewTruck {
            name: row.name,
            plate: row.plate,
            odometer: row.odometer.unwrap_or(Decimal::ZERO),
            tank_capacity: row.capacity.unwrap_or(Decimal::ZERO),
        };
        match engine.register_truck_with_id(TruckId(row.truck), truck) {
            Ok(()) => loaded += 1,
            Err(e) => warn!(error = %e, "skipping truck"),
        }
    }

    Ok(loaded)
}

/// Raw operation row.
///
/// Fields: `type, user, role, truck, odometer, liters, price, driver, record, amount`
#[derive(Debug, Deserialize)]
struct CsvOperation {
    #[serde(rename = "type")]
    op_type: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    user: Option<u32>,
    #[serde(default)]
    role: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    truck: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    odometer: Option<Decimal>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    liters: Option<Decimal>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    price: Option<Decimal>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    driver: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    record: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    amount: Option<Decimal>,
}

#[derive(Debug)]
enum Operation {
    Fuel { actor: User, entry: NewFuelRecord },
    Refill { amount: Decimal },
    Delete { actor: User, record: RecordId },
}

impl CsvOperation {
    fn actor(&self) -> Option<User> {
        let id = UserId(self.user?);
        match self.role.to_lowercase().as_str() {
            "manager" => Some(User::manager(id)),
            "driver" | "" => Some(User::driver(id)),
            _ => None,
        }
    }

    /// Converts the row to an operation.
    ///
    /// Returns `None` for unknown types or missing required fields.
    fn into_operation(self) -> Option<Operation> {
        match self.op_type.to_lowercase().as_str() {
            "fuel" => {
                let actor = self.actor()?;
                let mut entry = NewFuelRecord::new(TruckId(self.truck?), self.liters?);
                entry.odometer = self.odometer;
                entry.price_per_liter = self.price;
                entry.driver = self.driver.map(UserId);
                Some(Operation::Fuel { actor, entry })
            }
            "refill" => Some(Operation::Refill {
                amount: self.amount?,
            }),
            "delete" => {
                let actor = self.actor()?;
                Some(Operation::Delete {
                    actor,
                    record: RecordId(self.record?),
                })
            }
            _ => None,
        }
    }
}

/// Applies operations from a CSV reader in order.
///
/// Rows are streamed, so arbitrarily large files are fine. Malformed rows
/// and rejected operations are logged and skipped.
///
/// # CSV Format
///
/// - `type`: `fuel`, `refill` or `delete`
/// - `user`, `role`: acting user and `driver`/`manager` (fuel, delete)
/// - `truck`, `odometer`, `liters`, `price`, `driver`: fueling entry
/// - `record`: record ID to delete
/// - `amount`: liters added by a refill
///
/// # Example
///
/// ```csv
/// type,user,role,truck,odometer,liters,price,driver,record,amount
/// fuel,7,driver,1,1050,50,5,,,
/// refill,,,,,,,,,500
/// delete,1,manager,,,,,,1,
/// ```
///
/// # Errors
///
/// Returns the number of operations the engine rejected, or a CSV error if
/// the reader fails.
pub fn process_operations<R: Read>(engine: &Engine, reader: R) -> Result<usize, csv::Error> {
    let mut rdr = reader_builder().from_reader(reader);
    let mut rejected = 0;

    for (line, result) in rdr.deserialize::<CsvOperation>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!(error = %e, "skipping malformed operation row");
                continue;
            }
        };

        let Some(operation) = row.into_operation() else {
            warn!(row = line + 1, "skipping invalid operation");
            continue;
        };

        let result = match operation {
            Operation::Fuel { actor, entry } => {
                engine.create_fuel_record(entry, &actor).map(|_| ())
            }
            Operation::Refill { amount } => engine.refill_tank(Engine::TANK_ID, amount).map(|_| ()),
            Operation::Delete { actor, record } => engine.delete_fuel_records(&[record], &actor),
        };
        if let Err(e) = result {
            warn!(row = line + 1, error = %e, "operation rejected");
            rejected += 1;
        }
    }

    Ok(rejected)
}

/// Writes all fuel records as CSV, in creation order.
///
/// # CSV Format
///
/// Columns: `id, truck_id, plate, driver, timestamp, odometer, liters, price_per_liter, total`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_records<W: Write>(engine: &Engine, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for record in engine.fuel_records() {
        wtr.serialize(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
