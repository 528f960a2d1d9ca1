//! GPX generator API

use std::io::{Read, Write};

use geo::geometry::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};
use time::format_description::well_known;
use time::OffsetDateTime;

use super::trajectory::{normalize_longitude, signed_longitude, TrackPoint, Trajectory};

pub struct GpxGenerator {
    pub trajectory: Trajectory,
    /// Track name
    pub name: Option<String>,
}

impl GpxGenerator {
    pub fn new(trajectory: Trajectory) -> Self {
        Self {
            trajectory,
            name: None,
        }
    }

    pub fn name(mut self, name: String) -> Self {
        self.name = Some(name);

        self
    }

    /// One track with a single segment, plus the last position as waypoint.
    /// GPX longitudes are written in [-180, 180).
    pub fn generate(self) -> Result<Gpx, String> {
        let mut gpx: Gpx = Default::default();
        gpx.version = GpxVersion::Gpx11;
        gpx.creator = Some("nemo2gpx".to_string());

        let mut track = Track::new();
        track.name = self.name;

        let mut segment = TrackSegment::new();
        segment.points = self.trajectory.points.iter().map(to_waypoint).collect();
        track.segments.push(segment);
        gpx.tracks.push(track);

        if let Some(last) = &self.trajectory.last_fix {
            gpx.waypoints.push(to_waypoint(last));
        }

        Ok(gpx)
    }

    pub fn write<W: Write>(self, writer: W) -> Result<(), String> {
        let doc = self.generate()?;

        gpx::write(&doc, writer).map_err(|e| format!("Failed on write the GPX: {}", e))
    }
}

/// Load a trajectory from a GPX document. The segments of every track are
/// joined in order and the first waypoint becomes the last known position.
/// Track point longitudes come back into [0, 360), the waypoint is kept as read.
pub fn read_trajectory<R: Read>(reader: R) -> Result<Trajectory, String> {
    let doc = gpx::read(reader).map_err(|e| format!("Failed on read the GPX: {}", e))?;

    let mut trajectory = Trajectory::empty();

    for track in doc.tracks {
        for segment in track.segments {
            for wp in segment.points {
                let mut point = from_waypoint(wp)?;
                point.coordinates =
                    Point::new(normalize_longitude(point.longitude()), point.latitude());
                trajectory.points.push(point);
            }
        }
    }

    if let Some(wp) = doc.waypoints.into_iter().next() {
        trajectory.last_fix = Some(from_waypoint(wp)?);
    }

    Ok(trajectory)
}

fn to_waypoint(point: &TrackPoint) -> Waypoint {
    let mut wp = Waypoint::new(Point::new(
        signed_longitude(point.longitude()),
        point.latitude(),
    ));

    wp.elevation = Some(point.elevation);
    wp.time = Some(point.time.into());
    wp.comment = Some(point.label.clone());

    wp
}

fn from_waypoint(wp: Waypoint) -> Result<TrackPoint, String> {
    let coordinates = wp.point();
    let time = match wp.time {
        Some(t) => {
            let raw = t
                .format()
                .map_err(|e| format!("Failed on format the point time: {}", e))?;
            parse_time(&raw)?
        }
        None => return Err(format!("Point without time at {:?}", coordinates.x_y())),
    };

    Ok(TrackPoint {
        coordinates,
        elevation: wp.elevation.unwrap_or(0.0),
        time,
        label: wp.comment.unwrap_or_default(),
    })
}

fn parse_time(raw: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(raw, &well_known::Rfc3339)
        .map_err(|e| format!("Failed on parse the point time `{}`: {}", raw, e))
}
