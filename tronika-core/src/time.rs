//! Time utilities: timezone-aware deadline parsing.
//!
//! The engine only accepts `DateTime<Utc>`; turning user text into one is
//! the caller's job and happens here.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Error, Result};

const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

pub fn parse_tz(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| Error::invalid(format!("invalid timezone: {tz}")))
}

/// Parse a deadline like "2026-02-20 23:59" in an IANA tz like "Asia/Jakarta",
/// returning UTC.
pub fn parse_local_deadline_to_utc(local: &str, tz: &str) -> Result<DateTime<Utc>> {
    let tz = parse_tz(tz)?;
    let ndt = parse_naive(local.trim())?;
    local_to_utc(ndt, tz)
}

/// Parse any accepted deadline spelling:
/// - RFC 3339 (`2024-01-10T12:00:00Z`, offsets honoured, `tz` ignored)
/// - local `YYYY-MM-DD HH:MM` or `YYYY-MM-DDTHH:MM` in `tz`
/// - date only `YYYY-MM-DD`, meaning 23:59 local on that day
pub fn parse_deadline(input: &str, tz: &str) -> Result<DateTime<Utc>> {
    let s = input.trim();
    if s.is_empty() {
        return Err(Error::invalid("deadline is empty"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let tz = parse_tz(tz)?;

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 0)
            .ok_or_else(|| Error::invalid("invalid end-of-day time"))?;
        return local_to_utc(date.and_time(end_of_day), tz);
    }

    local_to_utc(parse_naive(s)?, tz)
}

fn parse_naive(s: &str) -> Result<NaiveDateTime> {
    LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| Error::invalid(format!("invalid local datetime '{s}'")))
}

fn local_to_utc(ndt: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>> {
    let local_dt = tz.from_local_datetime(&ndt).single().ok_or_else(|| {
        Error::invalid(format!("ambiguous or invalid local time (DST?): {ndt} {tz}"))
    })?;
    Ok(local_dt.with_timezone(&Utc))
}

/// Render a UTC instant in `tz` for list views.
pub fn format_local(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%a %d %b %Y %H:%M").to_string()
}
