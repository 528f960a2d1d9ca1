//! nemo2gpx - GPX trajectories from the NEMO beacon positions

mod generator;
pub mod geomath;
pub mod sources;

pub use generator::cleaner::{ExclusionZone, GeofenceCleaner, GeofenceOptions};
pub use generator::gpx::{read_trajectory, GpxGenerator};
pub use generator::position::PositionReport;
pub use generator::tracker::{TrajectoryBuilder, TrajectoryOptions, SPEED_FACTOR};
pub use generator::trajectory::{
    normalize_longitude, signed_longitude, Statistics, TrackPoint, Trajectory,
};
pub use sources::PositionsSource;
