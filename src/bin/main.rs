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

use booking_engine_rs::{
    Actor, ApprovalChanges, BookingAction, BookingId, CustomerRef, Engine, ModificationKind,
    NewBooking, PaymentStatus,
};
use chrono::NaiveDate;
use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;

/// Booking Engine - Replay booking operation CSV files
///
/// Reads booking operations from a CSV file and outputs booking states to
/// stdout. Supports create, confirm, cancel, payment, request, approve,
/// deny, and message operations.
#[derive(Parser, Debug)]
#[command(name = "booking-engine-rs")]
#[command(about = "A booking engine that replays operation CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with booking operations
    ///
    /// Expected format: op,booking,name,email,destination,package,start,end,guests,amount,value,details
    /// Example: cargo run -- operations.csv > bookings.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Open input file
    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    // Replay operations from CSV
    let engine = match process_operations(BufReader::new(file)) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error processing operations: {}", e);
            process::exit(1);
        }
    };

    // Write results to stdout
    if let Err(e) = write_bookings(&engine, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `op, booking, name, email, destination, package, start, end,
/// guests, amount, value, details` — only `op` and `booking` are always
/// required; the rest depend on the operation.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    op: String,
    booking: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    package: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    end: Option<NaiveDate>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    guests: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    amount: Option<Decimal>,
    /// Payment status, modification kind, or message sender.
    #[serde(default)]
    value: Option<String>,
    /// Reason, request details, admin note, or message body.
    #[serde(default)]
    details: Option<String>,
}

/// One replayable engine call.
#[derive(Debug)]
enum Step {
    Create(NewBooking),
    Apply(BookingId, BookingAction),
}

fn parse_payment_status(value: &str) -> Option<PaymentStatus> {
    match value {
        "partially_paid" => Some(PaymentStatus::PartiallyPaid),
        "paid" => Some(PaymentStatus::Paid),
        "refunded" => Some(PaymentStatus::Refunded),
        _ => None,
    }
}

fn parse_modification_kind(value: &str) -> Option<ModificationKind> {
    match value {
        "date_change" => Some(ModificationKind::DateChange),
        "guest_count_change" => Some(ModificationKind::GuestCountChange),
        "package_change" => Some(ModificationKind::PackageChange),
        _ => None,
    }
}

fn parse_actor(value: &str) -> Option<Actor> {
    match value {
        "customer" => Some(Actor::Customer),
        "admin" => Some(Actor::Admin),
        "system" => Some(Actor::System),
        _ => None,
    }
}

impl CsvRecord {
    /// Converts a CSV record to an engine step.
    ///
    /// Returns `None` for unknown operations or missing required fields.
    fn into_step(self) -> Option<Step> {
        let booking_id = BookingId::new(self.booking);

        match self.op.to_lowercase().as_str() {
            "create" => Some(Step::Create(NewBooking {
                id: booking_id,
                customer: CustomerRef {
                    name: self.name?,
                    email: self.email?,
                    phone: None,
                },
                package_ref: self.package?,
                destination: self.destination?,
                start_date: self.start?,
                end_date: self.end?,
                guests: self.guests?,
                amount: self.amount?,
            })),
            "confirm" => Some(Step::Apply(
                booking_id,
                BookingAction::Confirm {
                    actor: Actor::Admin,
                },
            )),
            "cancel" => Some(Step::Apply(
                booking_id,
                BookingAction::Cancel {
                    actor: Actor::Admin,
                    reason: self.details,
                },
            )),
            "payment" => {
                let status = parse_payment_status(self.value?.as_str())?;
                Some(Step::Apply(
                    booking_id,
                    BookingAction::MarkPayment {
                        actor: Actor::System,
                        status,
                    },
                ))
            }
            "request" => {
                let kind = parse_modification_kind(self.value?.as_str())?;
                Some(Step::Apply(
                    booking_id,
                    BookingAction::RequestModification {
                        kind,
                        details: self.details.unwrap_or_default(),
                    },
                ))
            }
            "approve" => {
                let kind = parse_modification_kind(self.value?.as_str())?;
                let changes = match kind {
                    ModificationKind::DateChange => ApprovalChanges::Dates {
                        start_date: self.start?,
                        end_date: self.end?,
                    },
                    ModificationKind::GuestCountChange => ApprovalChanges::Guests {
                        guests: self.guests?,
                    },
                    ModificationKind::PackageChange => ApprovalChanges::Package {
                        package_ref: self.package?,
                        amount: self.amount?,
                    },
                    _ => return None,
                };
                Some(Step::Apply(
                    booking_id,
                    BookingAction::ApproveModification {
                        actor: Actor::Admin,
                        changes,
                        note: self.details,
                    },
                ))
            }
            "deny" => Some(Step::Apply(
                booking_id,
                BookingAction::DenyModification {
                    actor: Actor::Admin,
                    note: self.details,
                },
            )),
            "message" => {
                let sender = parse_actor(self.value?.as_str())?;
                Some(Step::Apply(
                    booking_id,
                    BookingAction::AddMessage {
                        sender,
                        content: self.details?,
                    },
                ))
            }
            _ => None,
        }
    }
}

/// Replay booking operations from a CSV reader.
///
/// Uses streaming parsing so arbitrarily large operation logs never load
/// into memory at once. Malformed rows and rejected operations are
/// silently skipped; the replay is best-effort, like a batch import.
///
/// # CSV Format
///
/// Expected columns: `op, booking, name, email, destination, package,
/// start, end, guests, amount, value, details`
/// - `op`: Operation (create, confirm, cancel, payment, request, approve, deny, message)
/// - `booking`: Booking ID (string)
/// - remaining columns: operation-specific, may be left empty
///
/// # Example
///
/// ```csv
/// op,booking,name,email,destination,package,start,end,guests,amount,value,details
/// create,B-1,Ana,ana@example.com,Bali,PKG-1,2026-09-01,2026-09-08,2,2499.00,,
/// confirm,B-1,,,,,,,,,,
/// payment,B-1,,,,,,,,,paid,
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is
/// invalid. Individual operation errors are logged in debug mode but
/// don't stop the replay.
pub fn process_operations<R: Read>(reader: R) -> Result<Engine, csv::Error> {
    let engine = Engine::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " confirm "
        .flexible(true) // Allow trailing fields to be omitted
        .has_headers(true) // Skip first row as header
        .from_reader(reader);

    for result in rdr.deserialize::<CsvRecord>() {
        match result {
            Ok(record) => {
                // Convert CSV record to an engine step
                let Some(step) = record.into_step() else {
                    #[cfg(debug_assertions)]
                    eprintln!("Skipping invalid operation record");
                    continue;
                };

                // Apply the step, ignoring rejections (silent failure)
                let outcome = match step {
                    Step::Create(spec) => engine.create(spec, Actor::Customer),
                    Step::Apply(booking_id, action) => engine.apply(&booking_id, action),
                };
                if let Err(e) = outcome {
                    #[cfg(debug_assertions)]
                    eprintln!("Skipping operation: {}", e);
                }
            }
            Err(e) => {
                // Skip malformed rows
                #[cfg(debug_assertions)]
                eprintln!("Skipping malformed row: {}", e);
                continue;
            }
        }
    }

    Ok(engine)
}

/// Write booking states to a CSV writer
///
/// Outputs all bookings in CSV format with amounts at 2 decimal precision.
///
/// # CSV Format
///
/// Columns: `id, customer, destination, status, payment_status, amount`
///
/// # Example
///
/// ```csv
/// id,customer,destination,status,payment_status,amount
/// B-1,Ana,Bali,confirmed,paid,2499.00
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_bookings<W: Write>(engine: &Engine, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    // Get all booking records and serialize each one
    for booking in engine.records() {
        wtr.serialize(&*booking)?;
    }

    // Flush to ensure all data is written
    wtr.flush()?;
    Ok(())
}
