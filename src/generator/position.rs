//! Position definition

use geo::geometry::Point;
use time::OffsetDateTime;

/// Raw position report of the beacon
#[derive(Clone, Debug, PartialEq)]
pub struct PositionReport {
    /// Longitude (x) and latitude (y), decimal degrees
    pub coordinates: Point,
    /// UTC time of the fix
    pub time: OffsetDateTime,
    /// Speed over ground, in the unit of the tracking service
    pub speed: Option<f64>,
    /// Course over ground, degrees
    pub heading: Option<f64>,
}

impl PositionReport {
    pub fn basic(coordinates: Point, time: OffsetDateTime) -> Self {
        Self {
            coordinates,
            time,
            speed: None,
            heading: None,
        }
    }

    pub fn new(coordinates: Point, time: OffsetDateTime, speed: f64, heading: f64) -> Self {
        Self {
            coordinates,
            time,
            speed: Some(speed),
            heading: Some(heading),
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.x()
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.y()
    }
}
