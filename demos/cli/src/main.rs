mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use growth_core::{DashboardQuery, DashboardSnapshot, IdentityPolicy, Month};
use growth_pivot::{build_dashboard_audited, records_from_json_str, TrendAudit};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "growth-cli",
    about = "Summarize a child growth register export (JSON) into monitoring views."
)]
struct Args {
    /// Path to the JSON export of measurement records.
    #[arg(short, long)]
    input: PathBuf,
    /// Measurement year, matched against `DD/MM/YYYY` dates.
    #[arg(short, long)]
    year: Option<String>,
    /// Register month name, e.g. `April`.
    #[arg(short, long)]
    month: Option<String>,
    #[arg(long)]
    village: Option<String>,
    /// Exclusive age bound in years (overrides GROWTH_MAX_AGE_YEARS).
    #[arg(long)]
    max_age: Option<u32>,
    /// `name` or `national_id` (overrides GROWTH_IDENTITY).
    #[arg(long)]
    identity: Option<IdentityPolicy>,
    /// Print the full snapshot as JSON instead of a text report.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = config::from_env().context("Invalid environment configuration")?;
    if let Some(years) = args.max_age {
        config.max_age_years = years;
    }
    if let Some(identity) = args.identity {
        config.identity = identity;
    }

    let month = args
        .month
        .as_deref()
        .map(str::parse::<Month>)
        .transpose()
        .context("Invalid --month")?;

    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Could not read file {:?}", args.input))?;
    let records = records_from_json_str(&data)
        .with_context(|| format!("Could not load records from {:?}", args.input))?;
    tracing::info!(records = records.len(), "register loaded");

    let query = DashboardQuery {
        year: args.year,
        month,
        village: args.village,
    };
    let (snapshot, audit) = build_dashboard_audited(&records, &query, &config);
    if let Some(audit) = &audit {
        log_trend_audit(audit);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_report(&snapshot);
    }

    Ok(())
}

fn log_trend_audit(audit: &TrendAudit) {
    tracing::info!(
        compared = audit.compared,
        stagnant = audit.stagnant,
        "weight comparison finished"
    );
    for (reason, count) in &audit.skipped {
        tracing::info!(?reason, count, "children left out of weight comparison");
    }
    if audit.unformattable_dates > 0 {
        tracing::warn!(
            count = audit.unformattable_dates,
            "stagnant children with unreadable dates omitted from detail list"
        );
    }
}

fn print_report(snapshot: &DashboardSnapshot) {
    println!("Generated at: {}", snapshot.generated_at);
    println!("Children: {}", snapshot.total_children);

    println!("\nChildren per village:");
    for row in &snapshot.by_village {
        println!("  {:<24} {}", row.village, row.count);
    }

    println!("\nStatus per month:");
    for row in &snapshot.status_by_month {
        let cells: Vec<String> = row
            .counts
            .iter()
            .map(|(status, count)| format!("{status}={count}"))
            .collect();
        println!("  {:<10} {}", row.month, cells.join(", "));
    }

    println!("\nStatus per posyandu:");
    for row in &snapshot.status_by_posyandu {
        let cells: Vec<String> = row
            .counts
            .iter()
            .map(|(posyandu, count)| format!("{posyandu}={count}"))
            .collect();
        println!("  {:<20} {}", row.status, cells.join(", "));
    }

    if let Some(trend) = &snapshot.weight_trend {
        println!("\nWeight not gained (total {}):", trend.total());
        for (posyandu, count) in &trend.counts {
            println!("  {posyandu:<20} {count}");
            for record in trend.flagged_for(posyandu) {
                println!(
                    "    - {} ({}, {} kg)",
                    record.name, record.measurement_date, record.weight_kg
                );
            }
        }
    }
}
