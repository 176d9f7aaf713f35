// src/export.rs
use serde::Serialize;
use std::io::Write;

use crate::day_bucket::DayBucketStore;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct DayTotalsRow<'a> {
    date: &'a str,
    hours: f64,
    tickets: String,
    entries: usize,
    occupied_slots: usize,
}

/// Writes one CSV row per day, in day order.
pub fn write_day_totals<W: Write>(store: &DayBucketStore, writer: W) -> Result<(), AppError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (date, day) in store.iter() {
        let tickets = day
            .tickets
            .iter()
            .map(|ticket_id| ticket_id.to_string())
            .collect::<Vec<_>>()
            .join(";");
        csv_writer.serialize(DayTotalsRow {
            date,
            hours: day.hours,
            tickets,
            entries: day.entries.len(),
            occupied_slots: day.times.len(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
