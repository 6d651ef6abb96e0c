//! Net worth projection CLI
//!
//! Reads holdings and snapshots from CSV, runs a projection and prints the timeline

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use networth_projection::calculators::UnpaidInterest;
use networth_projection::holdings::{load_assets, load_liabilities};
use networth_projection::projection::PayoffStatus;
use networth_projection::repository::load_snapshots;
use networth_projection::{
    Granularity, Horizon, Month, Portfolio, ProjectionConfig, ProjectionMode, ProjectionRequest, ProjectionResult,
    ScenarioRunner, TimelinePoint,
};

#[derive(Debug, Parser)]
#[command(name = "networth", version, about = "Project net worth month by month from assets and loans")]
struct Cli {
    /// Assets CSV
    #[arg(long, default_value = "data/assets.csv")]
    assets: PathBuf,

    /// Liabilities CSV
    #[arg(long, default_value = "data/liabilities.csv")]
    liabilities: PathBuf,

    /// Snapshots CSV (optional)
    #[arg(long)]
    snapshots: Option<PathBuf>,

    /// historical, dynamic or future
    #[arg(long, default_value = "future")]
    mode: ProjectionMode,

    /// Horizon in months
    #[arg(long, conflicts_with = "years")]
    months: Option<u32>,

    /// Horizon in years
    #[arg(long)]
    years: Option<u32>,

    /// month or year
    #[arg(long, default_value = "month")]
    granularity: Granularity,

    /// Month treated as "now" (YYYY-MM); defaults to the current month
    #[arg(long)]
    now: Option<Month>,

    /// Add interest an EMI does not cover to the loan balance
    #[arg(long)]
    capitalize_unpaid_interest: bool,

    /// Extra horizons in years to compare side by side
    #[arg(long, value_delimiter = ',')]
    compare_years: Vec<u32>,

    /// Write the timeline as CSV
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write the full result as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

/// Flat CSV row for one timeline point
#[derive(Debug, Serialize)]
struct TimelineCsvRow<'a> {
    month: String,
    source: &'static str,
    assets: f64,
    liabilities: f64,
    net_worth: f64,
    liquid_assets: f64,
    payoff: &'a str,
    cash_flow_improvement: f64,
    cumulative_cash_flow_improvement: f64,
}

impl<'a> From<&'a TimelinePoint> for TimelineCsvRow<'a> {
    fn from(point: &'a TimelinePoint) -> Self {
        Self {
            month: point.month.to_string(),
            source: source_label(point),
            assets: point.assets,
            liabilities: point.liabilities,
            net_worth: point.net_worth,
            liquid_assets: point.liquid_assets,
            payoff: point.payoff_event.as_ref().map(|e| e.name.as_str()).unwrap_or(""),
            cash_flow_improvement: point.cash_flow_improvement,
            cumulative_cash_flow_improvement: point.cumulative_cash_flow_improvement,
        }
    }
}

fn source_label(point: &TimelinePoint) -> &'static str {
    if point.is_historical {
        "historical"
    } else if point.is_projected {
        "projected"
    } else {
        "current"
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let horizon = match (cli.months, cli.years) {
        (Some(m), _) => Horizon::Months(m),
        (None, Some(y)) => Horizon::Years(y),
        (None, None) => Horizon::Years(5),
    };
    let now = cli.now.unwrap_or_else(Month::current);

    let portfolio = Portfolio {
        user_id: "local".to_string(),
        assets: load_assets(&cli.assets).with_context(|| format!("loading {}", cli.assets.display()))?,
        liabilities: load_liabilities(&cli.liabilities)
            .with_context(|| format!("loading {}", cli.liabilities.display()))?,
        snapshots: match &cli.snapshots {
            Some(path) => load_snapshots(path).with_context(|| format!("loading {}", path.display()))?,
            None => Vec::new(),
        },
    };

    let config = ProjectionConfig {
        unpaid_interest: if cli.capitalize_unpaid_interest {
            UnpaidInterest::Capitalize
        } else {
            UnpaidInterest::Plateau
        },
        ..Default::default()
    };
    let runner = ScenarioRunner::with_config(config);

    println!("Net Worth Projection v{}", env!("CARGO_PKG_VERSION"));
    println!("==========================\n");
    println!(
        "As of {}: {} assets, {} liabilities, {} snapshots",
        now,
        portfolio.assets.len(),
        portfolio.liabilities.len(),
        portfolio.snapshots.len()
    );

    let request = ProjectionRequest::new(horizon, cli.mode, cli.granularity);
    let result = runner.run(&portfolio, &request, now)?;

    print_timeline(&result);
    print_milestones(&result);

    if !cli.compare_years.is_empty() {
        compare_horizons(&runner, &portfolio, &cli, now)?;
    }

    if let Some(path) = &cli.output {
        write_csv(path, &result.timeline)?;
        println!("\nTimeline written to: {}", path.display());
    }

    if let Some(path) = &cli.json {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &result)?;
        println!("Result written to: {}", path.display());
    }

    Ok(())
}

fn print_timeline(result: &ProjectionResult) {
    println!(
        "\n{:?} timeline {}..={} ({} points):",
        result.mode,
        result.start_month,
        result.end_month,
        result.timeline.len()
    );
    println!(
        "{:>8} {:>10} {:>16} {:>16} {:>16} {:>14}",
        "Month", "Source", "Assets", "Liabilities", "Net Worth", "Freed EMI"
    );
    println!("{}", "-".repeat(86));

    for point in &result.timeline {
        println!(
            "{:>8} {:>10} {:>16.2} {:>16.2} {:>16.2} {:>14.2}",
            point.month.to_string(),
            source_label(point),
            point.assets,
            point.liabilities,
            point.net_worth,
            point.cumulative_cash_flow_improvement,
        );
    }
}

fn print_milestones(result: &ProjectionResult) {
    let insights = &result.insights;

    println!("\nSummary:");
    println!("  Final Net Worth: {:.2}", insights.final_net_worth);
    println!("  Total Growth: {:.2}", insights.total_growth);
    println!(
        "  Loans: {} ({} active)",
        insights.liability_count, insights.active_loan_count
    );
    match result.crossover_month {
        Some(month) => println!("  Net worth turns non-negative: {}", month),
        None => println!("  Net worth crossover: none within the timeline"),
    }
    if let Some(event) = &insights.quickest_payoff {
        println!("  Quickest payoff: {} in {}", event.name, event.month);
    }
    println!("  Freed-up EMIs: {:.2}/month", result.total_cash_flow_improvement);

    if !result.payoff_events.is_empty() {
        println!("\nPayoffs:");
        for event in &result.payoff_events {
            println!(
                "  {}  {:<24} cleared {:>12.2}  frees {:>10.2}/month",
                event.month, event.name, event.balance_cleared, event.monthly_savings
            );
        }
    }

    for outlook in &result.liability_outlooks {
        if let PayoffStatus::NotFoundWithinHorizon { remaining_balance } = outlook.payoff {
            println!(
                "  {}: not paid off within horizon ({:.2} outstanding)",
                outlook.name, remaining_balance
            );
        }
    }

    for estimate in &result.estimated_payoffs {
        println!(
            "  ~{} liabilities fell by {:.2} (estimated from snapshots)",
            estimate.month, estimate.drop
        );
    }

    for warning in &result.warnings {
        println!("  Warning: {}: {:?}", warning.liability_id, warning.issue);
    }
}

fn compare_horizons(runner: &ScenarioRunner, portfolio: &Portfolio, cli: &Cli, now: Month) -> Result<()> {
    let requests: Vec<ProjectionRequest> = cli
        .compare_years
        .iter()
        .map(|&y| ProjectionRequest::new(Horizon::Years(y), ProjectionMode::Future, Granularity::Year))
        .collect();

    println!("\nHorizon comparison:");
    println!("{:>6} {:>10} {:>16} {:>10}", "Years", "End", "Net Worth", "Payoffs");
    for (years, result) in cli.compare_years.iter().zip(runner.run_scenarios(portfolio, &requests, now)) {
        let result = result?;
        println!(
            "{:>6} {:>10} {:>16.2} {:>10}",
            years,
            result.end_month.to_string(),
            result.insights.final_net_worth,
            result.payoff_events.len()
        );
    }
    Ok(())
}

fn write_csv(path: &Path, timeline: &[TimelinePoint]) -> Result<()> {
    if timeline.is_empty() {
        bail!("nothing to write: timeline is empty");
    }
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for point in timeline {
        writer.serialize(TimelineCsvRow::from(point))?;
    }
    writer.flush()?;
    Ok(())
}
