//! Send a batch of dispatch records to the planner and print the result.

use anyhow::{Context, Result};
use clap::Parser;
use dispatch_core::models::{DispatchPlan, DispatchRecord};
use dispatch_core::planner::RETURN_LEG_ID;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dispatch server URL
    #[arg(long, default_value = "http://localhost:8080")]
    url: String,

    /// JSON file holding an array of dispatch records
    records: PathBuf,

    /// Print the flight path as GeoJSON instead of the plan summary
    #[arg(long)]
    geojson: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.records)
        .with_context(|| format!("Failed to read {}", args.records.display()))?;
    let records: Vec<DispatchRecord> =
        serde_json::from_str(&raw).context("Records file is not a dispatch-record array")?;
    println!("Submitting {} dispatch records...", records.len());

    let client = reqwest::Client::new();

    if args.geojson {
        let geojson = client
            .post(format!("{}/calcDeliveryPathAsGeoJson", args.url))
            .json(&records)
            .send()
            .await
            .context("Planner request failed")?
            .error_for_status()?
            .text()
            .await?;
        println!("{}", geojson);
        return Ok(());
    }

    let plan: DispatchPlan = client
        .post(format!("{}/calcDeliveryPath", args.url))
        .json(&records)
        .send()
        .await
        .context("Planner request failed")?
        .error_for_status()?
        .json()
        .await?;

    let served: usize = plan
        .drone_paths
        .iter()
        .flat_map(|path| path.deliveries.iter())
        .filter(|leg| leg.delivery_id != RETURN_LEG_ID)
        .count();

    println!(
        "Planned {} of {} deliveries in {} sorties",
        served,
        records.len(),
        plan.drone_paths.len()
    );
    for path in &plan.drone_paths {
        let legs = path.deliveries.len();
        let steps: usize = path
            .deliveries
            .iter()
            .map(|leg| leg.flight_path.len().saturating_sub(2))
            .sum();
        println!("  {}: {} legs, {} moves", path.drone_id, legs, steps);
    }
    println!("Total: {} moves, cost {:.2}", plan.total_moves, plan.total_cost);

    if served < records.len() {
        println!("Warning: {} deliveries could not be served", records.len() - served);
    }

    Ok(())
}
