use clap::{Args, Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tripstop::config::{parse_duration, parse_heuristic, parse_threshold_km};
use tripstop::loader::{TripFormat, load_trip, read_trip, write_trip_log};
use tripstop::{AnalysisConfig, Heuristic, TripDataset, TripReport};

#[derive(Parser)]
#[command(name = "tripstop", about = "A CLI tool for detecting stops in GPS trip logs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Print distance, time, stop and speed statistics of a trip")]
    Summary(AnalysisArgs),
    #[command(about = "Write the samples classified as moving as a trip log")]
    Moving(AnalysisArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum InputFormat {
    Csv,
    Gpx,
}

impl From<InputFormat> for TripFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Csv => TripFormat::TripLog,
            InputFormat::Gpx => TripFormat::Gpx,
        }
    }
}

#[derive(Args)]
struct AnalysisArgs {
    #[arg(help = "Trip log or GPX file (reads a trip log from stdin when omitted)")]
    file: Option<PathBuf>,

    #[arg(
        long,
        default_value = "h1",
        value_parser = parse_heuristic,
        help = "Stop heuristic: h1 (adjacent displacement) or h2 (stop zones)"
    )]
    heuristic: Heuristic,

    #[arg(
        long,
        value_parser = parse_threshold_km,
        help = "Stop distance threshold in km (default: 0.6 for h1, 0.5 for h2)"
    )]
    threshold: Option<f64>,

    #[arg(
        long,
        default_value = "5m",
        value_parser = parse_duration,
        help = "Time between two samples, e.g. 300s, 5m"
    )]
    interval: Duration,

    #[arg(long, value_enum, help = "Input format (default: from the file extension)")]
    format: Option<InputFormat>,
}

impl AnalysisArgs {
    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            heuristic: self.heuristic,
            threshold_km: self.threshold,
            sample_interval: self.interval,
        }
    }

    fn load_trip(&self) -> Result<TripDataset, Box<dyn Error>> {
        let trip = match (&self.file, self.format) {
            (Some(path), None) => load_trip(path)?,
            (Some(path), Some(format)) => read_trip(&std::fs::read(path)?, format.into())?,
            (None, format) => {
                let mut input = Vec::new();
                io::stdin().lock().read_to_end(&mut input)?;
                read_trip(&input, format.map_or(TripFormat::TripLog, Into::into))?
            }
        };
        debug!("loaded trip with {} samples", trip.size());
        Ok(trip)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Summary(args) => summary_command(&args),
        Commands::Moving(args) => moving_command(&args),
    }
}

fn summary_command(args: &AnalysisArgs) -> Result<(), Box<dyn Error>> {
    let trip = args.load_trip()?;
    let report = TripReport::build(&trip, &args.config())?;
    write_report(&report, io::stdout().lock())?;
    Ok(())
}

fn moving_command(args: &AnalysisArgs) -> Result<(), Box<dyn Error>> {
    let trip = args.load_trip()?;
    let moving = args.config().classifier().classify(&trip).into_moving();
    write_trip_log(&moving, io::stdout().lock())?;
    Ok(())
}

fn write_report<W: Write>(report: &TripReport, mut output: W) -> io::Result<()> {
    writeln!(
        output,
        "Heuristic: {} (threshold {:.2} km)",
        report.heuristic, report.threshold_km
    )?;
    writeln!(output, "Samples: {}", report.sample_count)?;
    writeln!(output, "Total time: {:.2} hours", report.total_time_hours)?;
    writeln!(output, "Total distance: {:.2} km", report.total_distance_km)?;
    writeln!(output, "Stops: {}", report.stop_count)?;
    writeln!(output, "Moving samples: {}", report.moving_sample_count)?;
    writeln!(output, "Moving time: {:.2} hours", report.moving_time_hours)?;
    writeln!(output, "Stopped time: {:.2} hours", report.stopped_time_hours)?;
    writeln!(output, "Moving distance: {:.2} km", report.moving_distance_km)?;
    match report.average_moving_speed_kmh {
        Some(speed) => writeln!(output, "Average moving speed: {speed:.2} km/h")?,
        None => writeln!(output, "Average moving speed: n/a")?,
    }
    output.flush()
}
