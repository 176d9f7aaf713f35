// src/aggregator.rs
use chrono_tz::Tz;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::day_bucket::{day_key, DayBucketStore};
use crate::error::ScheduleError;
use crate::normalizer::normalize;
use crate::schedule_entry::RawEntry;

/// Buckets a page of schedule entries by local calendar day.
///
/// Calendar placeholders are dropped. Every other entry is normalized and its
/// per-day allocation booked on each day it spans. The first entry that fails
/// to normalize aborts the whole aggregation.
pub fn aggregate(entries: &[RawEntry], timezone: Tz) -> Result<DayBucketStore, ScheduleError> {
    let mut store = DayBucketStore::new();
    let mut skipped = 0usize;

    for raw in entries {
        let kind = raw.kind();
        if kind.is_skipped() {
            debug!("Skipping calendar placeholder entry {}", raw.id);
            skipped += 1;
            continue;
        }

        let entry = normalize(raw, timezone)?;
        let ticket_id = raw.ticket_id();

        for day_start in entry.day_starts() {
            let key = day_key(&day_start);
            debug!(
                "Booking {} hours of entry {} on {}",
                entry.effective_hours_per_day, raw.id, key
            );
            store.add_entry(
                ticket_id,
                day_start,
                entry.effective_hours_per_day,
                Some(raw.id),
            );
            store.ensure_day(&key).entries.push(entry.for_day());
        }
    }

    info!(
        "Aggregated {} schedule entries into {} day(s) ({} placeholder(s) skipped)",
        entries.len() - skipped,
        store.len(),
        skipped
    );
    Ok(store)
}

/// Total hours per ticket across every day in the store.
///
/// Tickets whose hours add up to zero are left out.
pub fn combined_ticket_hours(store: &DayBucketStore) -> BTreeMap<i64, f64> {
    let mut ticket_hours: BTreeMap<i64, f64> = BTreeMap::new();
    for (_, day) in store.iter() {
        for (ticket_id, hours) in &day.ticket_hours {
            *ticket_hours.entry(*ticket_id).or_insert(0.0) += hours;
        }
    }
    ticket_hours.retain(|_, hours| *hours != 0.0);
    ticket_hours
}
