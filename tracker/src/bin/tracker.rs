use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, time::Duration};
use tracing::{info, warn};

use tracker_lib::{
    cache::RefreshOutcome,
    config::{duration, positive_duration, Config},
    geolocator::{Availability, Location},
    report::{format_position, pass_summary, render_pass_table, DisplayZone, PositionReport},
    service::TrackingService,
    source::CatalogSource,
    units::Time,
};

#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Configuration toml file.
    ///
    /// Built-in defaults are used when not provided.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog object name to track, e.g. "ISS (ZARYA)"
    #[arg(long, global = true)]
    object: Option<String>,

    /// Read the catalog from a local file instead of fetching it
    #[arg(long, global = true)]
    catalog_file: Option<PathBuf>,

    /// Observer latitude [deg]
    #[arg(long, global = true, allow_negative_numbers = true)]
    latitude: Option<f64>,

    /// Observer longitude [deg]
    #[arg(long, global = true, allow_negative_numbers = true)]
    longitude: Option<f64>,

    /// Observer elevation [m]
    #[arg(long, global = true, allow_negative_numbers = true)]
    elevation: Option<f64>,

    /// Display timezone: local, utc, an IANA name like Asia/Kolkata or an offset like +05:30
    #[arg(long, global = true, allow_hyphen_values = true)]
    timezone: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current sub-point
    Now,

    /// Predict complete passes over the observer
    Passes {
        /// Prediction window in days, 1 to 7
        #[arg(long)]
        days: Option<u32>,

        /// Window start (RFC 3339), defaults to now
        #[arg(long)]
        start: Option<DateTime<Utc>>,
    },

    /// Print the upcoming ground track
    Track {
        /// How far ahead, e.g. "90m"
        #[arg(long)]
        horizon: Option<String>,

        /// Sample spacing, e.g. "5m"
        #[arg(long)]
        step: Option<String>,
    },

    /// Keep printing the current sub-point until interrupted
    Live {
        /// Update interval
        #[arg(long, default_value = "5s")]
        interval: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let opts = Opts::parse();

    let intr = interruptor::Interruptor::new();
    let intr_clone = intr.clone();
    ctrlc::set_handler(move || {
        if intr_clone.is_set() {
            let exit_code = if cfg!(target_family = "unix") {
                // 128 (fatal error signal "n") + 2 (control-c is fatal error signal 2)
                130
            } else {
                // Windows code 3221225786
                // -1073741510 == C000013A
                -1073741510
            };
            std::process::exit(exit_code);
        } else {
            intr_clone.set();
        }
    })?;

    let mut cfg = match opts.config.as_ref() {
        Some(p) => Config::load(p)?,
        None => Config::default(),
    };
    apply_overrides(&mut cfg, &opts);
    let settings = cfg.settings()?;

    let source = settings.catalog_source()?;
    info!(object = %settings.object_name, origin = %source.origin(), "Starting tracker");
    let service = TrackingService::from_settings(&settings, source);

    let now = Utc::now();
    if let RefreshOutcome::Unavailable(e) = service.refresh(now) {
        warn!(error = %e, "No element set available yet");
    }

    match &opts.command {
        Command::Now => {
            let location = service.current_location(now)?;
            print_location(&location, service.display_zone(), opts.json)?;
        }
        Command::Passes { days, start } => {
            let start = start.unwrap_or(now);
            let days = days.unwrap_or(settings.pass_days);
            let rows = service.pass_rows(&settings.observer, start, days)?;
            if opts.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                match rows {
                    Availability::Available(rows) => {
                        println!(
                            "{}",
                            pass_summary(&settings.object_name, &settings.observer, days, rows.len())
                        );
                        if !rows.is_empty() {
                            print!("{}", render_pass_table(&rows));
                        }
                    }
                    Availability::Unavailable => println!("Tracking unavailable"),
                }
            }
        }
        Command::Track { horizon, step } => {
            let horizon = match horizon {
                Some(h) => duration("--horizon", h)?,
                None => settings.track_horizon,
            };
            let step = match step {
                Some(s) => positive_duration("--step", s)?,
                None => settings.track_step,
            };
            let points = service.track(now, horizon, step)?;
            let zone = service.display_zone();
            if opts.json {
                let reports = points.map(|pts| {
                    pts.iter()
                        .map(|p| PositionReport::new(p, zone))
                        .collect::<Vec<_>>()
                });
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                match points {
                    Availability::Available(points) => {
                        for p in points {
                            println!("{}  {}", zone.format(p.timestamp), format_position(&p.position));
                        }
                    }
                    Availability::Unavailable => println!("Tracking unavailable"),
                }
            }
        }
        Command::Live { interval } => {
            let interval = positive_duration("--interval", interval)?;
            while !intr.is_set() {
                let now = Utc::now();
                service.refresh(now);
                let location = service.current_location(now)?;
                print_location(&location, service.display_zone(), opts.json)?;
                sleep_unless_interrupted(interval, &intr);
            }
        }
    }

    Ok(())
}

fn apply_overrides(cfg: &mut Config, opts: &Opts) {
    if let Some(o) = opts.object.as_ref() {
        cfg.object_name = Some(o.clone());
    }
    if let Some(f) = opts.catalog_file.as_ref() {
        cfg.catalog_file = Some(f.clone());
    }
    if let Some(lat) = opts.latitude {
        cfg.observer.latitude = Some(lat);
    }
    if let Some(lon) = opts.longitude {
        cfg.observer.longitude = Some(lon);
    }
    if let Some(elev) = opts.elevation {
        cfg.observer.elevation = Some(elev);
    }
    if let Some(tz) = opts.timezone.as_ref() {
        cfg.timezone = Some(tz.clone());
    }
}

fn print_location(
    location: &Location,
    zone: DisplayZone,
    json: bool,
) -> Result<(), serde_json::Error> {
    if json {
        let report = location.clone().map(|p| PositionReport::new(&p, zone));
        println!("{}", serde_json::to_string(&report)?);
    } else {
        match location {
            Availability::Available(p) => {
                println!("{}  {}", zone.format(p.timestamp), format_position(&p.position))
            }
            Availability::Unavailable => println!("Tracking unavailable, waiting for element data"),
        }
    }
    Ok(())
}

fn sleep_unless_interrupted(interval: Time, intr: &interruptor::Interruptor) {
    let tick = Duration::from_millis(100);
    let mut remaining = Duration::from_secs_f64(interval.as_secs().max(0.0));
    while !remaining.is_zero() && !intr.is_set() {
        let t = remaining.min(tick);
        std::thread::sleep(t);
        remaining -= t;
    }
}

mod interruptor {
    use std::sync::atomic::{AtomicBool, Ordering::SeqCst};
    use std::sync::Arc;

    #[derive(Clone, Debug)]
    #[repr(transparent)]
    pub struct Interruptor(Arc<AtomicBool>);

    impl Interruptor {
        pub fn new() -> Self {
            Interruptor(Arc::new(AtomicBool::new(false)))
        }

        pub fn set(&self) {
            self.0.store(true, SeqCst);
        }

        pub fn is_set(&self) -> bool {
            self.0.load(SeqCst)
        }
    }

    impl Default for Interruptor {
        fn default() -> Self {
            Self::new()
        }
    }
}
