use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use cubesat_budget::config::{LinkScenarioConfig, select};
use cubesat_budget::link::{LinkBudgetEngine, Modulation, SweepParameter};
use cubesat_budget::physics::units::km_to_m;
use cubesat_budget::{logging, plot, scenario};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Sweep link margin against frequency, distance, or modulation"
)]
struct Cli {
    #[arg(long)]
    scenario: PathBuf,

    #[arg(long)]
    name: Option<String>,

    #[arg(long, value_enum)]
    parameter: Axis,

    /// First value (MHz for frequency, km for distance, index for modulation)
    #[arg(long)]
    start: f64,

    #[arg(long)]
    end: f64,

    #[arg(long)]
    step: f64,

    /// Modulation scheme for modulation sweeps (QPSK, 8PSK, 16QAM, 64QAM)
    #[arg(long)]
    modulation: Option<String>,

    /// Render the curve to this PNG instead of printing the points
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, default_value_t = 1000)]
    width: u32,

    #[arg(long, default_value_t = 700)]
    height: u32,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum Axis {
    Frequency,
    Distance,
    Modulation,
}

impl Axis {
    fn parameter(self) -> SweepParameter {
        match self {
            Axis::Frequency => SweepParameter::Frequency,
            Axis::Distance => SweepParameter::Distance,
            Axis::Modulation => SweepParameter::Modulation,
        }
    }

    /// Display unit to engine unit.
    fn to_engine(self, value: f64) -> f64 {
        match self {
            Axis::Frequency => value * 1.0e6,
            Axis::Distance => km_to_m(value),
            Axis::Modulation => value,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Axis::Frequency => "Frequency (MHz)",
            Axis::Distance => "Distance (km)",
            Axis::Modulation => "Modulation index",
        }
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let config: LinkScenarioConfig = select(&cli.scenario, cli.name.as_deref())?;
    let params = scenario::link_parameters(&config)?;
    let modulation = cli
        .modulation
        .as_deref()
        .map(str::parse::<Modulation>)
        .transpose()?;

    let engine = LinkBudgetEngine::default();
    let mut points = engine.sweep_margin(
        &params,
        cli.parameter.parameter(),
        cli.parameter.to_engine(cli.start),
        cli.parameter.to_engine(cli.end),
        cli.parameter.to_engine(cli.step),
        modulation,
    )?;
    // Back to display units for printing and plotting.
    let scale = cli.parameter.to_engine(1.0);
    for point in &mut points {
        point.x /= scale;
    }

    match &cli.output {
        Some(path) => {
            plot::render_margin_curve(path, &points, cli.parameter.label(), (cli.width, cli.height))?;
            println!("Wrote {} points to {}", points.len(), path.display());
        }
        None => {
            println!("{:>16}  {:>12}", cli.parameter.label(), "margin (dB)");
            for point in &points {
                println!("{:>16.3}  {:>12.3}", point.x, point.margin_db);
            }
        }
    }
    Ok(())
}
