//! Date/time utilities for ChatVault.
//!
//! Timestamps are stored in the database as UTC strings in SQLite format
//! (`YYYY-MM-DD HH:MM:SS`) and converted to RFC3339 at the API boundary.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Storage format for database timestamps.
pub const DB_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC time in database format.
pub fn now_db() -> String {
    Utc::now().format(DB_FORMAT).to_string()
}

/// UTC time `minutes` from now, in database format.
///
/// Used when minting sessions and share links, where the expiry is a fixed
/// offset from the creation time.
pub fn expiry_in_minutes(minutes: i64) -> String {
    (Utc::now() + Duration::minutes(minutes))
        .format(DB_FORMAT)
        .to_string()
}

/// Parse a database datetime string into a `DateTime<Utc>`.
///
/// Returns `None` if the string is not in database format.
pub fn parse_db(datetime_str: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(datetime_str, DB_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Whether a database datetime string lies in the past.
///
/// A timestamp equal to the current instant is not yet past, so a session
/// or link stays valid through its exact expiry time. Unparseable strings
/// are treated as expired, so a corrupt expiry can never keep a session or
/// link alive.
pub fn is_past(datetime_str: &str) -> bool {
    is_past_at(datetime_str, Utc::now())
}

fn is_past_at(datetime_str: &str, now: DateTime<Utc>) -> bool {
    match parse_db(datetime_str) {
        Some(dt) => dt < now,
        None => true,
    }
}

/// Convert a database datetime string (YYYY-MM-DD HH:MM:SS) to RFC3339 format.
///
/// This is useful for Web API responses where the frontend expects RFC3339
/// timestamps. The database stores times in UTC, so this function appends
/// 'Z' to indicate UTC.
pub fn to_rfc3339(datetime_str: &str) -> String {
    // Replace space with 'T' and append 'Z' for UTC
    format!("{}Z", datetime_str.replace(' ', "T"))
}
