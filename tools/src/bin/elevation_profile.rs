// cargo run --bin elevation-profile --release -- --catalog catalog/test_fixtures/stations.txt --lat 28.7041 --lon 77.1025 --duration 86400 --dt 10 /tmp/elevation.txt

use clap::Parser;
use std::fs::{self, File};
use std::io::prelude::*;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use track_types::prelude::ObserverLocation;
use tracker_lib::{
    propagator::{Propagator, Sgp4Propagator},
    topocentric::look_angles,
    units::Time,
};

/// Print azimuth and elevation over time as seen from a ground observer
#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Element-set catalog file
    #[arg(short = 'c', long)]
    catalog: PathBuf,

    /// Catalog object name
    #[arg(short = 'n', long, default_value = "ISS (ZARYA)")]
    name: String,

    /// Observer latitude [deg]
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    /// Observer longitude [deg]
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    /// Observer elevation [m]
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    elevation: f64,

    /// Profile start (RFC 3339), defaults to the element-set epoch
    #[arg(short = 's', long)]
    start: Option<DateTime<Utc>>,

    /// Duration in seconds
    #[arg(short = 'd', long)]
    duration: f64,

    /// Time step (dt)
    #[arg(short = 't', long)]
    dt: f64,

    /// Output file path to write
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();
    if opts.dt <= 0.0 {
        return Err("Time step must be positive".into());
    }

    let text = fs::read_to_string(&opts.catalog)?;
    let set = catalog::find_element_set(&text, &opts.name)?;
    let propagator = Sgp4Propagator::new(&set)?;
    let observer = ObserverLocation::new(opts.lat, opts.lon, opts.elevation);
    let start = opts.start.unwrap_or_else(|| set.epoch());

    let mut output = File::create(opts.output)?;

    let dt = Time::from_secs(opts.dt);
    let mut time = Time::from_secs(0.0);

    loop {
        if time.as_secs() >= opts.duration {
            break;
        }

        let pos = propagator.position_at(time.after(start))?;
        let angles = look_angles(&observer, &pos);

        writeln!(
            &mut output,
            "{} {} {}",
            time.as_secs(),
            angles.azimuth_deg,
            angles.elevation_deg
        )?;

        time = time + dt;
    }

    Ok(())
}
