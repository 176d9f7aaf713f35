// src/main.rs

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::error::Error;

// Response types
#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleResponse {
    member: String,
    start_date: String,
    timezone: String,
    days: BTreeMap<String, DayResponse>,
    ticket_hours: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct DayResponse {
    hours: f64,
    times: BTreeMap<String, i64>,
    tickets: Vec<i64>,
    entries: Vec<Value>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let base_url = env::var("SCHEDULE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let member = env::args().nth(1).unwrap_or_else(|| "jdoe".to_string());
    let start_date = env::args().nth(2).unwrap_or_else(|| "2024-03-04".to_string());
    let timezone = env::args().nth(3).unwrap_or_else(|| "UTC".to_string());
    let client = Client::new();

    // Test 1: Status
    println!("\n🔍 Testing status endpoint...");
    let status_response = client
        .get(format!("{}/status", base_url))
        .send()
        .await?
        .json::<StatusResponse>()
        .await?;
    println!("Status response: {}", status_response.status);

    // Test 2: Full schedule
    println!("\n🔍 Fetching schedule for {} from {} ({})...", member, start_date, timezone);
    let query = [
        ("member", member.as_str()),
        ("start_date", start_date.as_str()),
        ("timezone", timezone.as_str()),
    ];
    let schedule_response = client
        .get(format!("{}/api/schedule", base_url))
        .query(&query)
        .send()
        .await?;

    println!("Schedule response status: {}", schedule_response.status());
    if schedule_response.status().is_success() {
        let schedule = schedule_response.json::<ScheduleResponse>().await?;
        println!(
            "Schedule for {} from {} ({}): {} day(s)",
            schedule.member,
            schedule.start_date,
            schedule.timezone,
            schedule.days.len()
        );
        for (date, day) in &schedule.days {
            println!(
                "  {}: {:.2} hours, {} slot(s), tickets {:?}, {} entr(y/ies)",
                date,
                day.hours,
                day.times.len(),
                day.tickets,
                day.entries.len()
            );
        }
        println!("Ticket hours: {:?}", schedule.ticket_hours);
    } else {
        println!("Failed to get schedule: {}", schedule_response.text().await?);
    }

    // Test 3: Ticket hours only
    println!("\n🔍 Fetching combined ticket hours...");
    let ticket_response = client
        .get(format!("{}/api/schedule/ticket-hours", base_url))
        .query(&query)
        .send()
        .await?;
    println!("Ticket hours response status: {}", ticket_response.status());
    println!("Ticket hours body: {}", ticket_response.text().await?);

    // Test 4: Bad timezone should be rejected
    println!("\n🔍 Testing invalid timezone handling...");
    let bad_response = client
        .get(format!("{}/api/schedule", base_url))
        .query(&[
            ("member", member.as_str()),
            ("start_date", start_date.as_str()),
            ("timezone", "Nowhere/Land"),
        ])
        .send()
        .await?;
    println!("Invalid timezone status: {}", bad_response.status());

    println!("\n✅ Testing complete!");

    Ok(())
}
