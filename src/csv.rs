use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Booking, BookingId, BookingRequest, Command, Height, PropertyId};
use crate::{Amount, gateway::InMemoryGateways};

/// Errors that can occur when parsing csv rows
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized op '{op}'")]
    UnrecognizedOp { line: usize, op: String },

    #[error("line {line}: unrecognized environment kind '{kind}'")]
    UnrecognizedKind { line: usize, kind: String },

    #[error("line {line}: {op} missing {field}")]
    MissingField {
        line: usize,
        op: String,
        field: &'static str,
    },

    #[error("line {line}: invalid location hash: {source}")]
    InvalidHash {
        line: usize,
        source: hex::FromHexError,
    },
}

/// Environment row declaring registry, verification or reputation facts.
#[derive(Debug, Deserialize)]
struct EnvRow {
    kind: String,
    id: Option<PropertyId>,
    identity: Option<String>,
    score: Option<u32>,
}

/// Command row; `create` uses the trailing columns, the others only `id`.
#[derive(Debug, Deserialize)]
struct CommandRow {
    op: String,
    actor: String,
    now: Height,
    id: Option<BookingId>,
    property: Option<PropertyId>,
    start: Option<Height>,
    end: Option<Height>,
    rent: Option<u64>,
    deposit: Option<u64>,
    guests: Option<u32>,
    policy: Option<String>,
    hash: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    id: BookingId,
    property: PropertyId,
    tenant: &'a str,
    landlord: &'a str,
    status: &'static str,
    start: Height,
    end: Height,
    checkin: Option<Height>,
    checkout: Option<Height>,
}

fn require<T>(value: Option<T>, line: usize, op: &str, field: &'static str) -> Result<T, CsvError> {
    value.ok_or_else(|| CsvError::MissingField {
        line,
        op: op.to_string(),
        field,
    })
}

/// Read collaborator state (property owners, verified identities,
/// reputation scores) from a csv file. The environment must be complete
/// before any command runs, so the first bad row aborts.
pub fn read_environment(path: impl AsRef<Path>) -> Result<InMemoryGateways, CsvError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .expect("failed to open csv file");

    let mut gateways = InMemoryGateways::new();
    for (idx, result) in reader.into_deserialize::<EnvRow>().enumerate() {
        let line = idx + 2; // 1-indexed, skip header
        let row = result.map_err(|source| CsvError::Parse { line, source })?;
        match row.kind.as_str() {
            "property" => {
                let id = require(row.id, line, "property", "id")?;
                let owner = require(row.identity, line, "property", "identity")?;
                gateways = gateways.with_property(id, owner);
            }
            "verified" => {
                let identity = require(row.identity, line, "verified", "identity")?;
                gateways = gateways.with_verified(identity);
            }
            "reputation" => {
                let identity = require(row.identity, line, "reputation", "identity")?;
                let score = require(row.score, line, "reputation", "score")?;
                gateways = gateways.with_score(identity, score);
            }
            other => {
                return Err(CsvError::UnrecognizedKind {
                    line,
                    kind: other.to_string(),
                });
            }
        }
    }
    Ok(gateways)
}

/// Read lifecycle commands from a csv file
pub fn read_commands(
    path: impl AsRef<Path>,
) -> impl Iterator<Item = Result<Command, CsvError>> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .expect("failed to open csv file");

    reader
        .into_deserialize::<CommandRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            let (actor, now) = (row.actor, row.now);
            match row.op.as_str() {
                "create" => {
                    let hash = require(row.hash, line, "create", "hash")?;
                    let location_hash = hex::decode(&hash)
                        .map_err(|source| CsvError::InvalidHash { line, source })?;
                    Ok(Command::Create {
                        actor,
                        now,
                        request: BookingRequest {
                            property_id: require(row.property, line, "create", "property")?,
                            start_date: require(row.start, line, "create", "start")?,
                            end_date: require(row.end, line, "create", "end")?,
                            rental_amount: Amount::new(require(row.rent, line, "create", "rent")?),
                            deposit_amount: Amount::new(require(
                                row.deposit,
                                line,
                                "create",
                                "deposit",
                            )?),
                            guest_count: require(row.guests, line, "create", "guests")?,
                            location_hash,
                            cancellation_policy: require(row.policy, line, "create", "policy")?,
                        },
                    })
                }
                "confirm" => Ok(Command::Confirm {
                    id: require(row.id, line, "confirm", "id")?,
                    actor,
                    now,
                }),
                "checkin" => Ok(Command::CheckIn {
                    id: require(row.id, line, "checkin", "id")?,
                    actor,
                    now,
                }),
                "checkout" => Ok(Command::CheckOut {
                    id: require(row.id, line, "checkout", "id")?,
                    actor,
                    now,
                }),
                "cancel" => Ok(Command::Cancel {
                    id: require(row.id, line, "cancel", "id")?,
                    actor,
                    now,
                }),
                "dispute" => Ok(Command::Dispute {
                    id: require(row.id, line, "dispute", "id")?,
                    actor,
                    now,
                }),
                other => Err(CsvError::UnrecognizedOp {
                    line,
                    op: other.to_string(),
                }),
            }
        })
}

/// Write the booking table to stdout in csv format, sorted by id
pub fn write_bookings<'a>(bookings: impl IntoIterator<Item = (BookingId, &'a Booking)>) {
    let stdout = io::stdout();
    let mut writer = csv::Writer::from_writer(stdout.lock());

    let mut rows: Vec<_> = bookings.into_iter().collect();
    rows.sort_by_key(|(id, _)| *id);

    for (id, booking) in rows {
        let row = OutputRow {
            id,
            property: booking.property_id,
            tenant: &booking.tenant,
            landlord: &booking.landlord,
            status: booking.status.as_str(),
            start: booking.start_date,
            end: booking.end_date,
            checkin: booking.checkin_time,
            checkout: booking.checkout_time,
        };
        writer.serialize(&row).expect("failed to write csv row");
    }

    writer.flush().expect("failed to flush csv writer");
}
