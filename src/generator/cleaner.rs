//! Geofence cleaner API

use geo::geometry::Point;
use serde::Deserialize;
use tracing::info;

use super::trajectory::Trajectory;

/// Area where the beacon is known to report spurious fixes
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ExclusionZone {
    pub latitude: f64,
    pub longitude: f64,
    /// Half-width of the box, degrees, on both axes
    pub tolerance: f64,
}

impl ExclusionZone {
    pub fn new(latitude: f64, longitude: f64, tolerance: f64) -> Self {
        Self {
            latitude,
            longitude,
            tolerance,
        }
    }

    /// Bounding box test, not a geodesic radius
    pub fn contains(&self, point: &Point) -> bool {
        // longitudes may come normalized into [0, 360)
        let mut dlon = (point.x() - self.longitude).rem_euclid(360.0);
        if dlon > 180.0 {
            dlon -= 360.0;
        }

        (point.y() - self.latitude).abs() <= self.tolerance && dlon.abs() <= self.tolerance
    }
}

/// Geofence cleaner options
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeofenceOptions {
    pub zones: Vec<ExclusionZone>,
}

impl Default for GeofenceOptions {
    fn default() -> Self {
        Self {
            zones: vec![
                // Lebanon coast
                ExclusionZone::new(33.81825, 35.4908, 0.1),
                // Gaza coast
                ExclusionZone::new(31.6561, 34.53845, 0.1),
            ],
        }
    }
}

pub struct GeofenceCleaner {
    pub zones: Vec<ExclusionZone>,
}

impl GeofenceCleaner {
    pub fn new(options: GeofenceOptions) -> Self {
        Self {
            zones: options.zones,
        }
    }

    pub fn is_excluded(&self, point: &Point) -> bool {
        self.zones.iter().any(|z| z.contains(point))
    }

    /// Build a new trajectory without the points inside the exclusion zones.
    /// The last known position is kept as is. Returns the number of discarded points too.
    pub fn clean(&self, trajectory: &Trajectory) -> (Trajectory, usize) {
        let points: Vec<_> = trajectory
            .points
            .iter()
            .filter(|p| !self.is_excluded(&p.coordinates))
            .cloned()
            .collect();

        let discarded = trajectory.points.len() - points.len();

        let cleaned = Trajectory {
            points,
            last_fix: trajectory.last_fix.clone(),
        };

        info!(
            "{} points discarded, {:.2} NM after cleaning",
            discarded,
            cleaned.distance()
        );

        (cleaned, discarded)
    }
}

impl Default for GeofenceCleaner {
    fn default() -> Self {
        Self::new(GeofenceOptions::default())
    }
}
