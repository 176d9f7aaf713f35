// src/normalizer.rs
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::error::ScheduleError;
use crate::schedule_entry::{EntryKind, RawEntry};

/// Daily hours at which a PTO or holiday entry counts as a full day off.
pub const FULL_DAY_HOURS: f64 = 8.0;
/// Hours booked for a full day off. Larger than any fixed dispatch allocation
/// (9 hours per day), so nothing gets scheduled on top of it.
pub const BLOCKED_DAY_HOURS: f64 = 12.0;

/// A raw entry with its resolved local range and per-day allocation.
///
/// Serializes as the raw entry's fields plus `start`, `end`, `days` and
/// `effectiveHoursPerDay`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEntry {
    #[serde(flatten)]
    pub raw: RawEntry,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub days: i64,
    pub effective_hours_per_day: f64,
}

impl NormalizedEntry {
    pub fn id(&self) -> i64 {
        self.raw.id
    }

    pub fn ticket_id(&self) -> Option<i64> {
        self.raw.ticket_id()
    }

    /// Hours on the entry: nominal for the whole span, or per day on a day's copy.
    pub fn hours(&self) -> f64 {
        self.raw.hours
    }

    /// Local wall-clock start of each day the entry spans, first day first.
    pub fn day_starts(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        let start = self.start.naive_local();
        (0..self.days).map(move |day| start + Duration::days(day))
    }

    /// Copy stamped with the per-day allocation, for a single day's entry list.
    pub fn for_day(&self) -> NormalizedEntry {
        let mut copy = self.clone();
        copy.raw.hours = self.effective_hours_per_day;
        copy
    }
}

/// Looks up an IANA timezone name such as `America/New_York`.
pub fn parse_timezone(name: &str) -> Result<Tz, ScheduleError> {
    name.parse::<Tz>()
        .map_err(|_| ScheduleError::UnknownTimezone(name.to_string()))
}

fn parse_instant(
    entry_id: i64,
    field: &'static str,
    value: &str,
) -> Result<DateTime<Utc>, ScheduleError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| ScheduleError::InvalidDate {
            entry_id,
            field,
            value: value.to_string(),
            source,
        })
}

// Both ends at UTC midnight means the entry is not pinned to a time of day.
fn is_date_only(start: &DateTime<Utc>, end: &DateTime<Utc>) -> bool {
    start.time() == NaiveTime::MIN && end.time() == NaiveTime::MIN
}

/// Whole days between the local start and end (truncated), plus one; never below one.
pub fn inclusive_days(start: &DateTime<FixedOffset>, end: &DateTime<FixedOffset>) -> i64 {
    let elapsed = end.naive_local() - start.naive_local();
    (elapsed.num_days() + 1).max(1)
}

/// Hours booked on each day, after the full-day override for PTO and holidays.
pub fn hours_per_day(kind: &EntryKind, hours: f64, days: i64) -> f64 {
    let per_day = hours / days as f64;
    if kind.blocks_full_day() && per_day >= FULL_DAY_HOURS {
        BLOCKED_DAY_HOURS
    } else {
        per_day
    }
}

/// Resolves an entry's local time range, day span and per-day allocation.
///
/// Date-only entries stay in UTC so converting them does not push them into
/// the neighbouring day.
pub fn normalize(raw: &RawEntry, timezone: Tz) -> Result<NormalizedEntry, ScheduleError> {
    let start_utc = parse_instant(raw.id, "dateStart", &raw.date_start)?;
    let end_utc = parse_instant(raw.id, "dateEnd", &raw.date_end)?;

    let (start, end) = if is_date_only(&start_utc, &end_utc) {
        (start_utc.fixed_offset(), end_utc.fixed_offset())
    } else {
        (
            start_utc.with_timezone(&timezone).fixed_offset(),
            end_utc.with_timezone(&timezone).fixed_offset(),
        )
    };

    let kind = raw.kind();
    let days = inclusive_days(&start, &end);
    let effective_hours_per_day = hours_per_day(&kind, raw.hours, days);

    debug!(
        "Normalized entry {} ({}): {} -> {}, {} day(s) at {} hours",
        raw.id,
        kind.code(),
        start,
        end,
        days,
        effective_hours_per_day
    );

    Ok(NormalizedEntry {
        raw: raw.clone(),
        start,
        end,
        days,
        effective_hours_per_day,
    })
}
