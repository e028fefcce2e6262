// cargo run --bin ground-track --release -- --catalog catalog/test_fixtures/stations.txt --start 2008-09-20T12:30:00Z --horizon 180 --dt 30 /tmp/ground_track.csv

use clap::Parser;
use std::fs::{self, File};
use std::io::prelude::*;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracker_lib::{ground_track::track, propagator::Sgp4Propagator, units::Time};

/// Write an unwrapped ground track as CSV (t, lat, lon, elevation)
#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Element-set catalog file
    #[arg(short = 'c', long)]
    catalog: PathBuf,

    /// Catalog object name
    #[arg(short = 'n', long, default_value = "ISS (ZARYA)")]
    name: String,

    /// Track start (RFC 3339), defaults to the element-set epoch
    #[arg(short = 's', long)]
    start: Option<DateTime<Utc>>,

    /// Horizon in minutes
    #[arg(short = 'd', long, default_value_t = 90.0)]
    horizon: f64,

    /// Time step in seconds
    #[arg(short = 't', long, default_value_t = 60.0)]
    dt: f64,

    /// Output file path to write
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();

    let text = fs::read_to_string(&opts.catalog)?;
    let set = catalog::find_element_set(&text, &opts.name)?;
    let propagator = Sgp4Propagator::new(&set)?;
    let start = opts.start.unwrap_or_else(|| set.epoch());

    let points = track(
        &propagator,
        start,
        Time::from_minutes(opts.horizon),
        Time::from_secs(opts.dt),
    )?;

    let mut output = File::create(opts.output)?;
    writeln!(&mut output, "t_secs,latitude_deg,longitude_deg,elevation_km")?;
    for p in points.iter() {
        writeln!(
            &mut output,
            "{},{:.6},{:.6},{:.3}",
            Time::between(start, p.timestamp).as_secs(),
            p.position.latitude_deg,
            p.position.longitude_deg,
            p.position.elevation_km
        )?;
    }

    Ok(())
}
