//! The diploma contract.
//!
//! A pure state-transition function over a [`WorldState`]. Entries are
//! created by `IssueDiploma`, move `ISSUED -> REVOKED` through
//! `RevokeDiploma`, and are never deleted or re-issued.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::entry::{LedgerEntry, LedgerStatus};
use crate::error::ContractError;
use crate::world_state::WorldState;

/// Contract function names.
pub mod functions {
    pub const READ: &str = "ReadDiploma";
    pub const ISSUE: &str = "IssueDiploma";
    pub const REVOKE: &str = "RevokeDiploma";
}

/// Per-transaction context supplied by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxContext {
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
}

type Result<T> = std::result::Result<T, ContractError>;

/// Dispatch a named contract function.
///
/// Returns the JSON ledger entry on success.
pub fn invoke<S: WorldState + ?Sized>(
    state: &mut S,
    ctx: &TxContext,
    function: &str,
    args: &[String],
) -> Result<String> {
    let entry = match function {
        functions::READ => read_diploma(state, arg(args, 0)?)?,
        functions::ISSUE => issue_diploma(state, ctx, arg(args, 0)?, arg(args, 1)?)?,
        functions::REVOKE => {
            let revoked_at = args.get(1).map(String::as_str).unwrap_or("");
            revoke_diploma(state, ctx, arg(args, 0)?, revoked_at)?
        }
        other => return Err(ContractError::UnknownFunction(other.to_string())),
    };
    Ok(entry.to_json())
}

/// Read the entry for a serial number.
pub fn read_diploma<S: WorldState + ?Sized>(state: &S, serial_no: &str) -> Result<LedgerEntry> {
    let key = ensure_serial(serial_no)?;
    state.get_state(key).ok_or(ContractError::NotFound)
}

/// Create an `ISSUED` entry.
pub fn issue_diploma<S: WorldState + ?Sized>(
    state: &mut S,
    ctx: &TxContext,
    serial_no: &str,
    json_record: &str,
) -> Result<LedgerEntry> {
    let key = ensure_serial(serial_no)?;
    let record: Map<String, Value> = serde_json::from_str(json_record)
        .map_err(|e| ContractError::InvalidArgument(format!("jsonRecord: {e}")))?;

    let field = |name: &str| required_field(&record, name);
    let student_id = field("studentId")?;
    let student_name = field("studentName")?;
    let birth_date = field("birthDate")?;
    let major = field("major")?;
    let ranking = field("ranking")?;
    let gpa = field("gpa")?;
    let graduation_year = field("graduationYear")?;
    let record_hash = ensure_hash(&field("recordHash")?)?;

    let issued_at = match record.get("issuedAt") {
        None | Some(Value::Null) => ctx.timestamp,
        Some(Value::String(s)) => ensure_time(s, ctx.timestamp, "issuedAt")?,
        Some(_) => return Err(ContractError::InvalidArgument("issuedAt".into())),
    };

    if state.get_state(key).is_some() {
        return Err(ContractError::AlreadyExists);
    }

    let entry = LedgerEntry {
        serial_no: key.to_string(),
        student_id,
        student_name,
        birth_date,
        major,
        ranking,
        gpa,
        graduation_year,
        record_hash,
        status: LedgerStatus::Issued,
        issued_at,
        revoked_at: None,
        tx_id: ctx.tx_id.clone(),
    };
    state.put_state(key, entry.clone());
    Ok(entry)
}

/// Move an `ISSUED` entry to `REVOKED`.
///
/// An empty `revoked_at` defaults to the transaction timestamp.
pub fn revoke_diploma<S: WorldState + ?Sized>(
    state: &mut S,
    ctx: &TxContext,
    serial_no: &str,
    revoked_at: &str,
) -> Result<LedgerEntry> {
    let key = ensure_serial(serial_no)?;
    let revoked_at = ensure_time(revoked_at, ctx.timestamp, "revokedAt")?;

    let mut entry = state.get_state(key).ok_or(ContractError::NotFound)?;
    if entry.status != LedgerStatus::Issued {
        return Err(ContractError::NotIssued);
    }

    entry.status = LedgerStatus::Revoked;
    entry.revoked_at = Some(revoked_at);
    entry.tx_id = ctx.tx_id.clone();
    state.put_state(key, entry.clone());
    Ok(entry)
}

// ─────────────────────────────────────────────────────────────────────────
// Argument checks
// ─────────────────────────────────────────────────────────────────────────

fn arg(args: &[String], index: usize) -> Result<&str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| ContractError::InvalidArgument(format!("missing argument {index}")))
}

fn ensure_serial(serial_no: &str) -> Result<&str> {
    let key = serial_no.trim();
    if key.is_empty() {
        return Err(ContractError::SerialRequired);
    }
    Ok(key)
}

fn ensure_hash(value: &str) -> Result<diploma_ledger_core::RecordHash> {
    diploma_ledger_core::parse_record_hash(value).map_err(|_| ContractError::InvalidRecordHash)
}

fn ensure_time(value: &str, default: DateTime<Utc>, name: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(default);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ContractError::InvalidArgument(name.to_string()))
}

fn required_field(record: &Map<String, Value>, name: &str) -> Result<String> {
    match record.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        _ => Err(ContractError::MissingField(name.to_string())),
    }
}
