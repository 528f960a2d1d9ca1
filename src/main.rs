//! nemo2gpx cli - GPX trajectories from the NEMO beacon positions

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};

use argopt::{cmd_group, subcmd};
use serde::Deserialize;
use time::format_description::well_known;
use time::OffsetDateTime;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nemo2gpx::sources::{Credentials, JsonSource, NemoApiSource};
use nemo2gpx::{
    read_trajectory, GeofenceCleaner, GeofenceOptions, GpxGenerator, PositionsSource,
    TrajectoryBuilder, TrajectoryOptions,
};

/// CLI of nemo2gpx - Convert the NEMO beacon positions into a GPX file
#[cmd_group(commands = [fetch, convert, clean])]
fn main() -> Result<(), String> {}

/// Generate a GPX from the tracking service
#[subcmd]
fn fetch(
    /// Start time, RFC3339 format
    start: String,
    /// End time, RFC3339 format or `now`
    end: String,
    /// GPX path file destination
    destination: String,
    /// Login parameter file. Default: param.json
    #[opt(long)]
    params: Option<String>,
    /// Min time between two points, in minutes
    #[opt(long)]
    min_gap: Option<u32>,
    /// Trajectory and geofence configuration. Default: .nemo2gpx.yaml, ~/.nemo2gpx.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    init_logging();

    let credentials = Credentials::load(&params.unwrap_or_else(|| "param.json".to_string()))?;
    let source = NemoApiSource::new(credentials);

    build_gpx(source, &start, &end, destination, min_gap, config)
}

/// Generate a GPX from a saved payload of the tracking service
#[subcmd]
fn convert(
    /// JSON payload file source
    payload: String,
    /// Start time, RFC3339 format
    start: String,
    /// End time, RFC3339 format or `now`
    end: String,
    /// GPX path file destination
    destination: String,
    /// Min time between two points, in minutes
    #[opt(long)]
    min_gap: Option<u32>,
    /// Trajectory and geofence configuration. Default: .nemo2gpx.yaml, ~/.nemo2gpx.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    init_logging();

    let payload = File::open(payload)
        .map_err(|e| format!("Failed on open the payload file: {}", e))?;
    let source = JsonSource::new(BufReader::new(payload));

    build_gpx(source, &start, &end, destination, min_gap, config)
}

/// Remove the spurious positions of a GPX file
#[subcmd]
fn clean(
    /// GPX path file source
    source: String,
    /// GPX path file destination
    destination: String,
    /// Trajectory and geofence configuration. Default: .nemo2gpx.yaml, ~/.nemo2gpx.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    init_logging();

    let (_, geofence) = load_configs(config);

    let input = File::open(source)
        .map_err(|e| format!("Failed on open the source file: {}", e))?;
    let trajectory = read_trajectory(BufReader::new(input))?;

    let (cleaned, discarded) = GeofenceCleaner::new(geofence).clean(&trajectory);

    let destination_file = File::create(&destination)
        .map_err(|e| format!("Failed on create the destination file: {}", e))?;
    GpxGenerator::new(cleaned).write(BufWriter::new(destination_file))?;

    info!("Created GPX file {}, {} points removed", destination, discarded);

    Ok(())
}

fn build_gpx<SU>(
    mut source: SU,
    start: &str,
    end: &str,
    destination: String,
    min_gap: Option<u32>,
    config: Option<String>,
) -> Result<(), String>
where
    SU: PositionsSource,
{
    let start = parse_time(start).map_err(|e| format!("Failed on parse the start time: {}", e))?;
    let end = parse_time(end).map_err(|e| format!("Failed on parse the end time: {}", e))?;

    let (mut options, _) = load_configs(config);
    if let Some(gap) = min_gap {
        options.min_gap = gap;
    }

    let reports = source.fetch(start, end)?;

    let (trajectory, stats) = TrajectoryBuilder::new(start, end)
        .options(options)
        .build(&reports)?;

    match stats {
        Some(stats) => {
            println!("Number of points: {} ({} kept)", stats.reports, stats.retained);
            match stats.average_speed {
                Some(avg) => println!("Average speed: {:.2} kn", avg),
                None => println!("Average speed: no speed data"),
            }
            println!("Distance: {:.2} NM", stats.distance);
        }
        None => {
            println!("No data in the window");
            return Ok(());
        }
    }

    let destination_file = File::create(&destination)
        .map_err(|e| format!("Failed on create the destination file: {}", e))?;
    GpxGenerator::new(trajectory).write(BufWriter::new(destination_file))?;

    info!("Created GPX file {}", destination);

    Ok(())
}

fn parse_time(raw: &str) -> Result<OffsetDateTime, String> {
    if raw == "now" {
        return Ok(OffsetDateTime::now_utc());
    }

    OffsetDateTime::parse(raw, &well_known::Rfc3339).map_err(|e| e.to_string())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nemo2gpx=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load the current config
fn load_configs(provided: Option<String>) -> (TrajectoryOptions, GeofenceOptions) {
    let mut options = vec![];

    if let Some(sprovided) = provided {
        options.push(sprovided);
    }

    options.push(".nemo2gpx.yaml".to_string());

    if let Some(home) = dirs::home_dir() {
        if let Some(shome) = home.to_str() {
            options.push(format!("{}/.nemo2gpx.yaml", shome));
        }
    }

    let found = options
        .into_iter()
        .find_map(|fi| fs::read_to_string(&fi).ok().map(|s| (fi, s)));

    if let Some((path, s)) = found {
        match serde_yaml::from_str::<Configs>(&s) {
            Ok(conf) => return (conf.trajectory, conf.geofence),
            Err(e) => warn!("Ignoring the config {}: {}", path, e),
        }
    }

    (TrajectoryOptions::default(), GeofenceOptions::default())
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
struct Configs {
    pub trajectory: TrajectoryOptions,
    pub geofence: GeofenceOptions,
}

#[test]
fn parse_configs() -> Result<(), String> {
    let yaml = "\ntrajectory: {}\n";

    let conf: Configs = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;

    assert_eq!(Configs::default(), conf);
    assert_eq!(2, conf.geofence.zones.len());
    assert_eq!(1.945, conf.trajectory.speed_factor);

    let yaml = "\ntrajectory:\n  min_gap: 15\n  utc_offset: \"+01:00\"\ngeofence:\n  zones:\n    - latitude: 43.3\n      longitude: -8.4\n      tolerance: 0.05";

    let conf: Configs = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;

    assert_eq!(15, conf.trajectory.min_gap);
    assert_eq!("+01:00", conf.trajectory.utc_offset);
    assert_eq!(1.945, conf.trajectory.speed_factor);
    assert_eq!(
        vec![nemo2gpx::ExclusionZone::new(43.3, -8.4, 0.05)],
        conf.geofence.zones
    );

    Ok(())
}

#[test]
fn invalid_config_falls_back() -> Result<(), String> {
    let path = std::env::temp_dir().join("nemo2gpx_invalid_config.yaml");
    fs::write(&path, "trajectory:\n  min_gap: [not, a, number]\n").map_err(|e| e.to_string())?;

    let (trajectory, geofence) = load_configs(path.to_str().map(|s| s.to_string()));
    fs::remove_file(&path).map_err(|e| e.to_string())?;

    assert_eq!(TrajectoryOptions::default(), trajectory);
    assert_eq!(GeofenceOptions::default(), geofence);

    Ok(())
}
