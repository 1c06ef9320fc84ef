//! Time handling for upstream queries.
//!
//! The canonical wire format is `YYYY-MM-DDTHH:mm:ss` without an offset.
//! Date-only upstreams receive the `YYYY-MM-DD` prefix of that value; no
//! timezone conversion is involved, so the calendar day never shifts.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PointDataError, PointDataResult};

/// Canonical datetime format used on the wire.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Date-only format accepted by legacy upstreams.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Check that `s` is a valid datetime written exactly as `YYYY-MM-DDTHH:mm:ss`.
pub fn is_canonical_datetime(s: &str) -> bool {
    NaiveDateTime::parse_from_str(s, CANONICAL_FORMAT)
        .map(|dt| dt.format(CANONICAL_FORMAT).to_string() == s)
        .unwrap_or(false)
}

/// A closed time range for a series query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl TimeRange {
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        Self { from, to }
    }

    /// Parse `fromTime`/`toTime` query values.
    ///
    /// Every problem is reported, not just the first one.
    pub fn parse(from: &str, to: &str) -> PointDataResult<Self> {
        let mut errors = Vec::new();
        let from = parse_canonical("fromTime", from, &mut errors);
        let to = parse_canonical("toTime", to, &mut errors);

        match (from, to) {
            (Some(from), Some(to)) if from > to => Err(PointDataError::validation(format!(
                "Parameter 'fromTime' ({}) must not be after 'toTime' ({})",
                from.format(CANONICAL_FORMAT),
                to.format(CANONICAL_FORMAT)
            ))),
            (Some(from), Some(to)) => Ok(Self { from, to }),
            _ => Err(PointDataError::Validation(errors)),
        }
    }

    /// Start of the range as `YYYY-MM-DD`.
    pub fn from_date(&self) -> String {
        self.from.format(DATE_FORMAT).to_string()
    }

    /// End of the range as `YYYY-MM-DD`.
    pub fn to_date(&self) -> String {
        self.to.format(DATE_FORMAT).to_string()
    }

    /// Start of the range in the canonical wire format.
    pub fn from_canonical(&self) -> String {
        self.from.format(CANONICAL_FORMAT).to_string()
    }

    /// End of the range in the canonical wire format.
    pub fn to_canonical(&self) -> String {
        self.to.format(CANONICAL_FORMAT).to_string()
    }
}

fn parse_canonical(name: &str, value: &str, errors: &mut Vec<String>) -> Option<NaiveDateTime> {
    match NaiveDateTime::parse_from_str(value, CANONICAL_FORMAT) {
        Ok(dt) if dt.format(CANONICAL_FORMAT).to_string() == value => Some(dt),
        _ => {
            errors.push(format!(
                "Parameter '{}' must be a datetime string in the format YYYY-MM-DDTHH:mm:ss",
                name
            ));
            None
        }
    }
}

/// Parse a loosely formatted instant. Values without an offset are UTC.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    // Full datetime with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, CANONICAL_FORMAT) {
        return Some(Utc.from_utc_datetime(&ndt));
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

/// Render an instant the way the DMI API expects (`2024-01-01T00:00:00.000Z`).
pub fn format_instant(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build the DMI `datetime` interval argument.
///
/// - neither bound: empty string
/// - only `from`: `from/now`
/// - only `to`: `to`
/// - both: `from/to`
pub fn datetime_argument(
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    match (from, to) {
        (None, None) => String::new(),
        (Some(from), None) => format!("{}/{}", format_instant(&from), format_instant(&now)),
        (None, Some(to)) => format_instant(&to),
        (Some(from), Some(to)) => format!("{}/{}", format_instant(&from), format_instant(&to)),
    }
}
