//! Trajectory data model

use geo::geometry::Point;
use time::OffsetDateTime;

use crate::geomath::{great_circle_distance, NAUTICAL_MILE};

/// Point of a trajectory, also used for the last known position marker
#[derive(Clone, Debug, PartialEq)]
pub struct TrackPoint {
    pub coordinates: Point,
    pub elevation: f64,
    pub time: OffsetDateTime,
    pub label: String,
}

impl TrackPoint {
    pub fn new(coordinates: Point, time: OffsetDateTime, label: String) -> Self {
        Self {
            coordinates,
            elevation: 0.0,
            time,
            label,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.x()
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.y()
    }
}

/// Decimated trajectory, in chronological order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    pub points: Vec<TrackPoint>,
    /// Last known position
    pub last_fix: Option<TrackPoint>,
}

impl Trajectory {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of the great-circle distances between consecutive points, in nautical miles
    pub fn distance(&self) -> f64 {
        let meters: f64 = self
            .points
            .windows(2)
            .map(|w| {
                great_circle_distance(
                    w[0].latitude(),
                    w[0].longitude(),
                    w[1].latitude(),
                    w[1].longitude(),
                )
            })
            .sum();

        meters / NAUTICAL_MILE
    }
}

/// Run summary of the trajectory builder
#[derive(Clone, Debug, PartialEq)]
pub struct Statistics {
    /// Raw reports received
    pub reports: usize,
    /// Points kept in the trajectory
    pub retained: usize,
    /// Mean of the non-zero speeds, in knots. None without any speed sample
    pub average_speed: Option<f64>,
    /// Nautical miles
    pub distance: f64,
}

/// Longitude into [-180, 180)
pub fn signed_longitude(longitude: f64) -> f64 {
    if (-180.0..180.0).contains(&longitude) {
        return longitude;
    }

    let lon = normalize_longitude(longitude);
    if lon >= 180.0 {
        lon - 360.0
    } else {
        lon
    }
}

/// Longitude into [0, 360)
pub fn normalize_longitude(longitude: f64) -> f64 {
    let lon = longitude.rem_euclid(360.0);
    if lon >= 360.0 {
        0.0
    } else {
        lon
    }
}
