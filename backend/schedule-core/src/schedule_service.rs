// src/schedule_service.rs
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};

use crate::aggregator::{aggregate, combined_ticket_hours};
use crate::day_bucket::DayBucketStore;
use crate::error::AppError;
use crate::manage_client::{build_conditions, ScheduleQuery, DEFAULT_PAGE_SIZE};

/// Aggregated schedule for one member.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleReport {
    pub member: String,
    pub start_date: NaiveDate,
    pub timezone: String,
    pub days: DayBucketStore,
    pub ticket_hours: BTreeMap<i64, f64>,
}

#[derive(Clone)]
pub struct ScheduleService {
    query: Arc<dyn ScheduleQuery>,
    page_size: u32,
}

impl ScheduleService {
    pub fn new(query: Arc<dyn ScheduleQuery>) -> Self {
        Self {
            query,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Fetches one page of a member's entries from `start_date` on and buckets them by day.
    pub async fn get_schedule(
        &self,
        member: &str,
        start_date: NaiveDate,
        timezone: Tz,
    ) -> Result<ScheduleReport, AppError> {
        let conditions = build_conditions(member, start_date);
        info!(
            "Fetching schedule for member {} from {} ({})...",
            member, start_date, timezone
        );

        let entries = match self.query.schedule_entries(&conditions, self.page_size).await {
            Ok(entries) => entries,
            Err(e) => {
                error!("Failed to fetch schedule entries for member {}: {}", member, e);
                return Err(AppError::Manage(e));
            }
        };

        let days = match aggregate(&entries, timezone) {
            Ok(days) => days,
            Err(e) => {
                error!("Failed to aggregate schedule for member {}: {}", member, e);
                return Err(AppError::Schedule(e));
            }
        };
        let ticket_hours = combined_ticket_hours(&days);

        info!(
            "Schedule for member {}: {} entries, {} day(s), {} ticket(s)",
            member,
            entries.len(),
            days.len(),
            ticket_hours.len()
        );

        Ok(ScheduleReport {
            member: member.to_string(),
            start_date,
            timezone: timezone.name().to_string(),
            days,
            ticket_hours,
        })
    }
}
