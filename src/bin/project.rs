use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use cubesat_budget::config::{
    DataScenarioConfig, LinkScenarioConfig, TimelineScenarioConfig, parse_timestamp, select,
};
use cubesat_budget::data::DataBudgetEngine;
use cubesat_budget::link::LinkBudgetEngine;
use cubesat_budget::project::Project;
use cubesat_budget::{logging, scenario};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Save and inspect budget projects")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate the given scenarios and snapshot parameters and results into a project file
    Save {
        /// Project name
        #[arg(long)]
        name: String,
        /// Output JSON path (`-` for stdout)
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        link: Option<PathBuf>,
        #[arg(long)]
        link_name: Option<String>,
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        data_name: Option<String>,
        #[arg(long)]
        timeline: Option<PathBuf>,
        #[arg(long)]
        timeline_name: Option<String>,
        /// Timeline mission start (RFC 3339); overrides the manifest, defaults to now
        #[arg(long)]
        timeline_start: Option<String>,
    },
    /// Print a summary of a saved project
    Show {
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Save {
            name,
            output,
            link,
            link_name,
            data,
            data_name,
            timeline,
            timeline_name,
            timeline_start,
        } => {
            let now = Utc::now();
            // Re-saving over an existing project keeps its creation time.
            let mut project = if output.is_file() {
                let existing = Project::load(&output)?;
                let mut project = Project::new(name, existing.created_at);
                project.touch(now);
                project
            } else {
                Project::new(name, now)
            };
            if let Some(path) = link {
                let config: LinkScenarioConfig = select(&path, link_name.as_deref())?;
                let params = scenario::link_parameters(&config)?;
                let result = LinkBudgetEngine::default().calculate(&params)?;
                project = project.with_link(params, result);
            }
            if let Some(path) = data {
                let config: DataScenarioConfig = select(&path, data_name.as_deref())?;
                let params = scenario::daily_parameters(&config);
                let result = DataBudgetEngine::default().calculate_simple(&params)?;
                project = project.with_data(params, result);
            }
            if let Some(path) = timeline {
                let mut config: TimelineScenarioConfig =
                    select(&path, timeline_name.as_deref())?;
                if let Some(raw) = timeline_start.as_deref() {
                    config.mission_start = Some(parse_timestamp(raw)?);
                }
                let params = scenario::timeline_parameters(&config, &[], now);
                let result = DataBudgetEngine::default().calculate_timeline(&params)?;
                project = project.with_timeline(params, result);
            }
            project.save(&output)?;
            info!(project = %project.name, path = %output.display(), "project saved");
        }
        Command::Show { path } => {
            let project = Project::load(&path)?;
            println!("=== Project: {} ===", project.name);
            println!("Created         : {}", project.created_at.to_rfc3339());
            if let Some(updated) = project.updated_at {
                println!("Updated         : {}", updated.to_rfc3339());
            }
            match &project.link {
                Some(link) => println!(
                    "Link margin     : {:.1} dB ({:?})",
                    link.result.link_margin_db, link.result.status
                ),
                None => println!("Link margin     : -"),
            }
            match &project.data {
                Some(data) => println!(
                    "Daily backlog   : {:.1} MB",
                    data.result.backlog_per_day_mb
                ),
                None => println!("Daily backlog   : -"),
            }
            match &project.timeline {
                Some(timeline) => println!(
                    "Storage margin  : {:.1} MB",
                    timeline.result.storage_margin_mb
                ),
                None => println!("Storage margin  : -"),
            }
        }
    }
    Ok(())
}
