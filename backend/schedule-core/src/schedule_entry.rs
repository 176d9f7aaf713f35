// src/schedule_entry.rs
use serde::{Deserialize, Serialize};

// --- Schedule API Data Structures ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemberRef {
    pub id: Option<i64>,
    pub identifier: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTypeRef {
    pub id: Option<i64>,
    pub identifier: String,
    pub name: Option<String>,
}

/// One schedule entry as returned by the scheduling service.
///
/// Dates are kept as the raw strings from the wire so that a malformed value
/// only fails once the entry is normalized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawEntry {
    pub id: i64,
    pub object_id: Option<i64>,
    pub name: Option<String>,
    pub member: Option<MemberRef>,
    pub date_start: String,
    pub date_end: String,
    #[serde(default)]
    pub hours: f64,
    #[serde(rename = "type")]
    pub type_: ScheduleTypeRef,
}

impl RawEntry {
    pub fn kind(&self) -> EntryKind {
        EntryKind::from_code(&self.type_.identifier)
    }

    /// Ticket the entry's hours are booked against. Only ticket work carries one.
    pub fn ticket_id(&self) -> Option<i64> {
        match self.kind() {
            EntryKind::TicketWork => self.object_id,
            _ => None,
        }
    }
}

// Classification of an entry by its type code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    TicketWork,
    Pto,
    Holiday,
    CalendarPlaceholder,
    Other(String),
}

impl EntryKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "S" => EntryKind::TicketWork,
            "V" => EntryKind::Pto,
            "H" => EntryKind::Holiday,
            "C" => EntryKind::CalendarPlaceholder,
            other => EntryKind::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            EntryKind::TicketWork => "S",
            EntryKind::Pto => "V",
            EntryKind::Holiday => "H",
            EntryKind::CalendarPlaceholder => "C",
            EntryKind::Other(code) => code,
        }
    }

    /// Calendar placeholders (out-of-office events and the like) are not working time.
    pub fn is_skipped(&self) -> bool {
        matches!(self, EntryKind::CalendarPlaceholder)
    }

    /// PTO and holidays block the whole day once they reach a full day's worth of hours.
    pub fn blocks_full_day(&self) -> bool {
        matches!(self, EntryKind::Pto | EntryKind::Holiday)
    }
}
