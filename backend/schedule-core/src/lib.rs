// src/lib.rs
pub mod aggregator;
pub mod config;
pub mod day_bucket;
pub mod error;
pub mod export;
pub mod manage_client;
pub mod normalizer;
pub mod schedule_entry;
pub mod schedule_service;
pub mod server;

mod server_tests;

pub use aggregator::{aggregate, combined_ticket_hours};
pub use day_bucket::{DayAggregate, DayBucketStore, SlotOccupant};
pub use error::{AppError, ScheduleError};
pub use normalizer::{normalize, NormalizedEntry};
pub use schedule_entry::{EntryKind, RawEntry};
