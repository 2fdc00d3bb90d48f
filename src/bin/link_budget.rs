use std::path::PathBuf;

use clap::Parser;
use cubesat_budget::config::{LinkScenarioConfig, select};
use cubesat_budget::link::{LinkBudgetEngine, LinkStatus};
use cubesat_budget::{logging, scenario};

#[derive(Parser)]
#[command(author, version, about = "Evaluate an RF link budget from a scenario manifest")]
struct Cli {
    /// Scenario manifest (YAML list, TOML file, or directory of TOML files)
    #[arg(long)]
    scenario: PathBuf,

    /// Scenario name (case-insensitive); defaults to the first entry
    #[arg(long)]
    name: Option<String>,

    /// Print the result record as JSON instead of a table
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let config: LinkScenarioConfig = select(&cli.scenario, cli.name.as_deref())?;
    let params = scenario::link_parameters(&config)?;
    let result = LinkBudgetEngine::default().calculate(&params)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let status = match result.status {
        LinkStatus::Sufficient => "sufficient (stable connection expected)",
        LinkStatus::Low => "low (marginal connection)",
        LinkStatus::Negative => "negative (connection unstable)",
    };

    println!("=== Link Budget: {} ===", config.name);
    println!("EIRP            : {:.1} dBm", result.eirp_dbm);
    println!("Path loss       : {:.1} dB", result.free_space_path_loss_db);
    println!("Received power  : {:.1} dBm", result.received_power_dbm);
    println!("Noise power     : {:.1} dBm", result.noise_power_dbm);
    println!("C/N             : {:.1} dB", result.carrier_to_noise_db);
    println!("Bit error rate  : {:.3e}", result.bit_error_rate);
    println!("Link margin     : {:.1} dB", result.link_margin_db);
    println!("Status          : {}", status);
    if !result.recommendations.is_empty() {
        println!("To improve the link:");
        for advisory in &result.recommendations {
            println!("  - {}", advisory);
        }
    }
    Ok(())
}
