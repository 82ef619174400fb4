// src/main.rs

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::error::Error;

// Response types
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    status: String,
    consultants: usize,
    assignments: usize,
    insights: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamStats {
    total_hours: f64,
    overloaded_count: usize,
    available_count: usize,
    total_fte: f64,
    occupancy_pct: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Row {
    name: String,
    total_hours: f64,
    fte: f64,
    status: String,
}

#[derive(Debug, Deserialize)]
struct TeamOverview {
    rows: Vec<Row>,
    stats: TeamStats,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CopySummary {
    assignments_copied: usize,
    absences_copied: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetSummary {
    assignments_removed: usize,
    absences_removed: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let base_url = std::env::var("OCCUPANCY_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let period = std::env::args().nth(1).unwrap_or_else(|| "2026-01".to_string());
    let client = Client::new();

    // Test 1: Status
    println!("\n🔍 Testing status endpoint...");
    let status = client
        .get(format!("{}/status", base_url))
        .send()
        .await?
        .json::<StatusResponse>()
        .await?;
    println!("Status response: {:?}", status);

    // Test 2: Team occupancy
    println!("\n🔍 Fetching team occupancy for {}...", period);
    let overview = client
        .get(format!("{}/api/occupancy", base_url))
        .query(&[("period", period.as_str())])
        .send()
        .await?
        .json::<TeamOverview>()
        .await?;
    for row in &overview.rows {
        println!(
            "  {:<24} {:>7.1}h  FTE {:>5.2}  {}",
            row.name, row.total_hours, row.fte, row.status
        );
    }
    println!("Team stats: {:?}", overview.stats);

    // Test 3: Copy into a scratch period and reset it again
    let scratch = "2099-12";
    println!("\n🔍 Copying {} -> {} ...", period, scratch);
    let copy_response = client
        .post(format!("{}/api/periods/copy", base_url))
        .json(&json!({ "from": period, "to": scratch }))
        .send()
        .await?;
    if copy_response.status().is_success() {
        let summary = copy_response.json::<CopySummary>().await?;
        println!("Copy summary: {:?}", summary);

        let reset = client
            .post(format!("{}/api/periods/reset", base_url))
            .json(&json!({ "period": scratch }))
            .send()
            .await?
            .json::<ResetSummary>()
            .await?;
        println!("Reset summary: {:?}", reset);
    } else {
        println!("Copy failed ({}): {}", copy_response.status(), copy_response.text().await?);
    }

    // Test 4: CSV export
    println!("\n🔍 Exporting planning sheet for {}...", period);
    let csv_response = client
        .get(format!("{}/api/planning/{}/export.csv", base_url, period))
        .send()
        .await?;
    println!("Export status: {}", csv_response.status());
    println!("{}", csv_response.text().await?);

    // Test 5: Insights (only when the server has a key)
    if status.insights {
        println!("\n🔍 Requesting insights...");
        let response = client
            .post(format!("{}/api/insights", base_url))
            .json(&json!({ "period": period }))
            .send()
            .await?;
        println!("Insights status: {}", response.status());
        println!("{}", response.text().await?);
    } else {
        println!("\n⚠️ Insights disabled on the server; skipping.");
    }

    // Test 6: Error mapping
    println!("\n🔍 Checking error responses...");
    let bad_period = client
        .get(format!("{}/api/occupancy?period=2026-13", base_url))
        .send()
        .await?;
    println!("Bad period -> {}", bad_period.status());
    let missing = client
        .delete(format!("{}/api/assignments/does-not-exist", base_url))
        .send()
        .await?;
    println!("Missing assignment -> {}", missing.status());

    println!("\n✅ Testing complete!");

    Ok(())
}
