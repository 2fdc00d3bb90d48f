use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use cubesat_budget::config::{
    DataScenarioConfig, TimelineScenarioConfig, load_pass_schedule, parse_timestamp, select,
};
use cubesat_budget::data::DataBudgetEngine;
use cubesat_budget::{logging, plot, scenario};

#[derive(Parser)]
#[command(author, version, about = "Onboard data budget: daily aggregates or a pass timeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Daily generation vs. downlink for a regular pass plan
    Daily {
        #[arg(long)]
        scenario: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Cumulative storage across scheduled downlink windows
    Timeline {
        #[arg(long)]
        scenario: PathBuf,
        #[arg(long)]
        name: Option<String>,
        /// Extra pass schedule CSV (start,end[,downlink_rate_bps])
        #[arg(long)]
        passes: Option<PathBuf>,
        /// Mission start (RFC 3339); overrides the manifest, defaults to now
        #[arg(long)]
        start: Option<String>,
        /// Render the storage timeline to this PNG
        #[arg(long)]
        plot: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();
    let engine = DataBudgetEngine::default();

    match cli.command {
        Command::Daily {
            scenario: path,
            name,
            json,
        } => {
            let config: DataScenarioConfig = select(&path, name.as_deref())?;
            let params = scenario::daily_parameters(&config);
            let result = engine.calculate_simple(&params)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }
            println!("=== Data Budget: {} ===", config.name);
            println!("Generated / day : {:.1} MB", result.data_generated_per_day_mb);
            println!("Downlink / day  : {:.1} MB", result.downlink_capacity_per_day_mb);
            println!("Backlog / day   : {:.1} MB", result.backlog_per_day_mb);
            println!("Storage required: {:.1} MB", result.storage_required_mb);
            println!("Storage free    : {:.1} MB", result.storage_available_mb);
            match result.days_until_full {
                Some(days) => println!("Days until full : {:.1}", days),
                None => println!("Days until full : never (downlink keeps up)"),
            }
            print_advisories(&result.recommendations);
        }
        Command::Timeline {
            scenario: path,
            name,
            passes,
            start,
            plot: plot_path,
            json,
        } => {
            let mut config: TimelineScenarioConfig = select(&path, name.as_deref())?;
            if let Some(raw) = start.as_deref() {
                config.mission_start = Some(parse_timestamp(raw)?);
            }
            let extra = match &passes {
                Some(csv) => load_pass_schedule(csv)?,
                None => Vec::new(),
            };
            let params = scenario::timeline_parameters(&config, &extra, Utc::now());
            let result = engine.calculate_timeline(&params)?;

            if let Some(png) = &plot_path {
                plot::render_storage_timeline(
                    png,
                    &result.timeline,
                    params.storage_capacity_mb,
                    (1000, 700),
                )?;
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }
            println!("=== Storage Timeline: {} ===", config.name);
            println!("Mission start   : {}", params.mission_start.to_rfc3339());
            println!("Windows         : {}", params.downlink_opportunities.len());
            println!("Generated       : {:.1} MB", result.total_data_generated_mb);
            println!("Downlink        : {:.1} MB", result.total_downlink_capacity_mb);
            println!("Peak storage    : {:.1} MB", result.max_storage_required_mb);
            println!(
                "Storage margin  : {:.1} MB ({})",
                result.storage_margin_mb,
                if result.viable { "viable" } else { "overflows" }
            );
            if let Some(days) = result.days_until_full {
                println!("Days until full : {:.1}", days);
            }
            print_advisories(&result.recommendations);
            if let Some(png) = &plot_path {
                println!("Timeline plot   : {}", png.display());
            }
        }
    }
    Ok(())
}

fn print_advisories(advisories: &[cubesat_budget::data::DataAdvisory]) {
    if advisories.is_empty() {
        return;
    }
    println!("Recommendations:");
    for advisory in advisories {
        println!("  - {}", advisory);
    }
}
