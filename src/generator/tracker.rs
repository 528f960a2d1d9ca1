//! Trajectory builder API

use geo::geometry::Point;
use serde::Deserialize;
use time::format_description::well_known;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, info, warn};

use super::position::PositionReport;
use super::trajectory::{normalize_longitude, Statistics, TrackPoint, Trajectory};

/// Speed unit of the tracking service to knots. Empirical calibration.
pub const SPEED_FACTOR: f64 = 1.945;

/// Trajectory builder options
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrajectoryOptions {
    /// Min time, in minutes, between two points of the trajectory
    pub min_gap: u32,
    /// Local time zone of the last position label, `+HH:MM`
    pub utc_offset: String,
    /// Reported speed to knots
    pub speed_factor: f64,
}

impl TrajectoryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local_offset(&self) -> Result<UtcOffset, String> {
        UtcOffset::parse(
            &self.utc_offset,
            format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
        )
        .map_err(|e| format!("Invalid UTC offset `{}`: {}", self.utc_offset, e))
    }
}

impl Default for TrajectoryOptions {
    fn default() -> Self {
        Self {
            min_gap: 0,
            utc_offset: "+00:00".to_string(),
            speed_factor: SPEED_FACTOR,
        }
    }
}

pub struct TrajectoryBuilder {
    /// Window start, inclusive
    pub start: OffsetDateTime,
    /// Window end, inclusive
    pub end: OffsetDateTime,
    pub options: TrajectoryOptions,
}

impl TrajectoryBuilder {
    /// Start a new builder over the time window
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self {
            start,
            end,
            options: TrajectoryOptions::default(),
        }
    }

    pub fn options(&mut self, options: TrajectoryOptions) -> &mut Self {
        self.options = options;

        self
    }

    pub fn min_gap(&mut self, minutes: u32) -> &mut Self {
        self.options.min_gap = minutes;

        self
    }

    /// Decimate the reports, ordered by time, into a trajectory.
    ///
    /// A report becomes a point when more than `min_gap` minutes elapsed since
    /// the last selected point (the first report counts as selected), or when it
    /// is the last report, and only if it lies in the window. The last report
    /// always gives the last known position, in or out of the window.
    ///
    /// Statistics are None when there is no report at all.
    pub fn build(
        &self,
        reports: &[PositionReport],
    ) -> Result<(Trajectory, Option<Statistics>), String> {
        let mut trajectory = Trajectory::empty();

        let Some(first) = reports.first() else {
            info!("No data in the window {} - {}", self.start, self.end);
            return Ok((trajectory, None));
        };

        let offset = self.options.local_offset()?;
        let min_gap = self.options.min_gap as f64;
        let last_index = reports.len() - 1;

        let mut last_selected = first.time;
        let mut speed_sum = 0.0;
        let mut speed_count = 0usize;

        for (i, report) in reports.iter().enumerate() {
            let is_last = i == last_index;
            let in_window = self.start <= report.time && report.time <= self.end;

            let speed = read_or_zero(report.speed, "speed", report);
            let heading = read_or_zero(report.heading, "heading", report);

            let elapsed = (report.time - last_selected).as_seconds_f64() / 60.0;

            if (elapsed > min_gap || is_last) && in_window {
                last_selected = report.time;
                trajectory.points.push(body_point(report, speed, heading)?);
            } else {
                debug!("Skipping the report of {} ({:.1} min)", report.time, elapsed);
            }

            if in_window && speed != 0.0 {
                speed_sum += speed;
                speed_count += 1;
            }

            if is_last {
                trajectory.last_fix = Some(last_fix(report, speed, offset)?);
            }
        }

        let average_speed = if speed_count > 0 {
            Some(speed_sum / speed_count as f64 * self.options.speed_factor)
        } else {
            warn!("No speed samples, the average speed is not computed");
            None
        };

        let stats = Statistics {
            reports: reports.len(),
            retained: trajectory.points.len(),
            average_speed,
            distance: trajectory.distance(),
        };

        info!(
            "{} reports, {} points kept, {:.2} NM",
            stats.reports, stats.retained, stats.distance
        );
        if let Some(avg) = stats.average_speed {
            info!("Average speed {:.2} kn", avg);
        }

        Ok((trajectory, Some(stats)))
    }
}

fn read_or_zero(value: Option<f64>, field: &str, report: &PositionReport) -> f64 {
    match value {
        Some(v) => v,
        None => {
            warn!("No {} for the report of {}, using 0", field, report.time);
            0.0
        }
    }
}

fn body_point(report: &PositionReport, speed: f64, heading: f64) -> Result<TrackPoint, String> {
    let time = report
        .time
        .format(&well_known::Rfc3339)
        .map_err(|e| format!("Failed on format the time: {}", e))?;

    let coordinates = Point::new(normalize_longitude(report.longitude()), report.latitude());
    let label = format!("{}, SOG: {}, COG: {}", time, speed, heading);

    Ok(TrackPoint::new(coordinates, report.time, label))
}

fn last_fix(report: &PositionReport, speed: f64, offset: UtcOffset) -> Result<TrackPoint, String> {
    let local = report
        .time
        .to_offset(offset)
        .format(format_description!("[day]-[month]-[year] [hour]:[minute]"))
        .map_err(|e| format!("Failed on format the local time: {}", e))?;

    let label = format!("Last position: {}, SOG: {}", local, speed);

    Ok(TrackPoint::new(report.coordinates, report.time, label))
}
