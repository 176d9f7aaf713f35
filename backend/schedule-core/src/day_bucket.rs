// src/day_bucket.rs
use chrono::{Duration, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use crate::normalizer::NormalizedEntry;

pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";
pub const SLOT_KEY_FORMAT: &str = "%H:%M";
pub const SLOT_MINUTES: i64 = 15;
pub const SLOTS_PER_HOUR: f64 = 4.0;

/// Who occupies a 15-minute slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOccupant {
    Occupied(i64),
    OccupiedUnknown,
}

impl SlotOccupant {
    const UNKNOWN_MARKER: i64 = -1;

    pub fn from_entry_id(entry_id: Option<i64>) -> Self {
        match entry_id {
            Some(id) => SlotOccupant::Occupied(id),
            None => SlotOccupant::OccupiedUnknown,
        }
    }
}

// On the wire the slot map has always been `"HH:mm": <entry id or -1>`
impl Serialize for SlotOccupant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SlotOccupant::Occupied(id) => serializer.serialize_i64(*id),
            SlotOccupant::OccupiedUnknown => serializer.serialize_i64(Self::UNKNOWN_MARKER),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAggregate {
    pub hours: f64,
    pub times: BTreeMap<String, SlotOccupant>,
    pub tickets: Vec<i64>,
    pub entries: Vec<NormalizedEntry>,
    pub ticket_hours: BTreeMap<i64, f64>,
}

/// Per-day buckets keyed by `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DayBucketStore {
    days: BTreeMap<String, DayAggregate>,
}

pub fn day_key(at: &NaiveDateTime) -> String {
    at.format(DAY_KEY_FORMAT).to_string()
}

impl DayBucketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the zero-valued bucket for `key` if it is not there yet.
    pub fn ensure_day(&mut self, key: &str) -> &mut DayAggregate {
        self.days.entry(key.to_string()).or_default()
    }

    /// Books `hours` on the day containing `day_start` and marks the slots they cover.
    ///
    /// `day_start` must already be a single day's start; multi-day spans are split
    /// by the caller. The slot count is `hours * 4` truncated, starting at the
    /// time of day of `day_start` and wrapping past midnight within the same day.
    pub fn add_entry(
        &mut self,
        ticket_id: Option<i64>,
        day_start: NaiveDateTime,
        hours: f64,
        entry_id: Option<i64>,
    ) {
        let key = day_key(&day_start);
        let day = self.ensure_day(&key);

        day.hours += hours;
        if let Some(ticket_id) = ticket_id {
            day.tickets.push(ticket_id);
            *day.ticket_hours.entry(ticket_id).or_insert(0.0) += hours;
        }

        let occupant = SlotOccupant::from_entry_id(entry_id);
        let slots = (hours * SLOTS_PER_HOUR) as usize;
        let mut time_of_day = day_start.time();
        for _ in 0..slots {
            day.times
                .insert(time_of_day.format(SLOT_KEY_FORMAT).to_string(), occupant);
            time_of_day += Duration::minutes(SLOT_MINUTES);
        }
    }

    pub fn get(&self, key: &str) -> Option<&DayAggregate> {
        self.days.get(key)
    }

    pub fn contains_day(&self, key: &str) -> bool {
        self.days.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.days.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DayAggregate)> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
