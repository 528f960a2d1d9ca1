use geo::Point;
use time::macros::datetime;
use time::Duration;

use super::cleaner::{ExclusionZone, GeofenceCleaner, GeofenceOptions};
use super::gpx::{read_trajectory, GpxGenerator};
use super::position::PositionReport;
use super::tracker::{TrajectoryBuilder, TrajectoryOptions};
use super::trajectory::{TrackPoint, Trajectory};
use crate::geomath::{great_circle_distance, NAUTICAL_MILE};

#[test]
fn decimation_scenario() -> Result<(), String> {
    let t = datetime!(2022-10-27 6:30 UTC);

    let p1 = PositionReport::new(Point::new(10.0, 20.0), t, 5.0, 90.0);
    let p2 = PositionReport::new(Point::new(10.01, 20.01), t + Duration::minutes(3), 0.0, 90.0);
    let p3 = PositionReport::new(Point::new(10.5, 20.5), t + Duration::minutes(12), 8.0, 45.0);

    let (trajectory, stats) = TrajectoryBuilder::new(t, t + Duration::minutes(20))
        .min_gap(10)
        .build(&[p1, p2, p3.clone()])?;

    assert_eq!(1, trajectory.points.len());
    let point = &trajectory.points[0];
    assert_eq!(p3.coordinates, point.coordinates);
    assert_eq!(p3.time, point.time);
    assert_eq!(0.0, point.elevation);
    assert_eq!("2022-10-27T06:42:00Z, SOG: 8, COG: 45", point.label);

    let last = trajectory.last_fix.ok_or("No last position")?;
    assert_eq!(p3.coordinates, last.coordinates);
    assert_eq!(p3.time, last.time);

    let stats = stats.ok_or("No statistics")?;
    assert_eq!(3, stats.reports);
    assert_eq!(1, stats.retained);
    assert_eq!(0.0, stats.distance);
    let avg = stats.average_speed.ok_or("No average speed")?;
    assert!((avg - 12.6425).abs() < 1e-9, "got {}", avg);

    Ok(())
}

#[test]
fn empty_reports() -> Result<(), String> {
    let (trajectory, stats) = TrajectoryBuilder::new(
        datetime!(2022-10-27 0:00 UTC),
        datetime!(2022-10-28 0:00 UTC),
    )
    .build(&[])?;

    assert!(trajectory.is_empty());
    assert_eq!(None, trajectory.last_fix);
    assert_eq!(None, stats);

    Ok(())
}

#[test]
fn gap_between_points() -> Result<(), String> {
    let t = datetime!(2022-10-27 6:30 UTC);
    let reports: Vec<_> = (0..=60)
        .map(|m| {
            PositionReport::new(
                Point::new(-1.5 + m as f64 * 0.01, 45.9),
                t + Duration::minutes(m),
                4.0,
                200.0,
            )
        })
        .collect();

    let (trajectory, _) = TrajectoryBuilder::new(t, t + Duration::hours(2))
        .min_gap(10)
        .build(&reports)?;

    let minutes: Vec<i64> = trajectory
        .points
        .iter()
        .map(|p| (p.time - t).whole_minutes())
        .collect();
    assert_eq!(vec![11, 22, 33, 44, 55, 60], minutes);

    let body = &trajectory.points[..trajectory.points.len() - 1];
    for pair in body.windows(2) {
        assert!((pair[1].time - pair[0].time).whole_minutes() > 10);
    }

    Ok(())
}

#[test]
fn zero_gap_skips_only_the_first() -> Result<(), String> {
    let t = datetime!(2022-10-27 6:30 UTC);
    let reports = vec![
        PositionReport::new(Point::new(1.0, 45.0), t, 3.0, 0.0),
        PositionReport::new(Point::new(1.1, 45.0), t + Duration::minutes(1), 3.0, 0.0),
        PositionReport::new(Point::new(1.2, 45.0), t + Duration::minutes(2), 3.0, 0.0),
    ];

    let (trajectory, stats) = TrajectoryBuilder::new(t, t + Duration::hours(1)).build(&reports)?;

    assert_eq!(2, trajectory.points.len());
    assert_eq!(reports[1].time, trajectory.points[0].time);
    assert_eq!(reports[2].time, trajectory.points[1].time);

    let stats = stats.ok_or("No statistics")?;
    let expected = great_circle_distance(45.0, 1.1, 45.0, 1.2) / NAUTICAL_MILE;
    assert!((stats.distance - expected).abs() < 1e-9);

    Ok(())
}

#[test]
fn window_filter() -> Result<(), String> {
    let t = datetime!(2022-10-27 6:30 UTC);
    let reports = vec![
        PositionReport::new(Point::new(1.0, 45.0), t - Duration::minutes(30), 6.0, 0.0),
        PositionReport::new(Point::new(1.1, 45.0), t + Duration::minutes(15), 2.0, 0.0),
        PositionReport::new(Point::new(1.2, 45.0), t + Duration::minutes(30), 0.0, 0.0),
        PositionReport::new(Point::new(1.3, 45.0), t + Duration::hours(3), 9.0, 0.0),
    ];

    let (trajectory, stats) = TrajectoryBuilder::new(t, t + Duration::hours(1))
        .min_gap(10)
        .build(&reports)?;

    assert_eq!(2, trajectory.points.len());
    assert_eq!(reports[1].time, trajectory.points[0].time);
    assert_eq!(reports[2].time, trajectory.points[1].time);

    // the last report is outside the window but still the last known position
    let last = trajectory.last_fix.ok_or("No last position")?;
    assert_eq!(reports[3].coordinates, last.coordinates);

    // only the speeds inside the window count
    let avg = stats.ok_or("No statistics")?.average_speed.ok_or("No average")?;
    assert!((avg - 2.0 * 1.945).abs() < 1e-9);

    Ok(())
}

#[test]
fn longitude_normalized_in_body_only() -> Result<(), String> {
    let t = datetime!(2022-10-27 6:30 UTC);
    let reports = vec![
        PositionReport::new(Point::new(-170.0, -20.0), t, 1.0, 0.0),
        PositionReport::new(Point::new(-170.0, -20.0), t + Duration::minutes(5), 1.0, 0.0),
    ];

    let (trajectory, _) = TrajectoryBuilder::new(t, t + Duration::hours(1)).build(&reports)?;

    assert_eq!(1, trajectory.points.len());
    assert_eq!(190.0, trajectory.points[0].longitude());
    assert_eq!(-20.0, trajectory.points[0].latitude());
    assert_eq!(-170.0, trajectory.last_fix.ok_or("No last position")?.longitude());

    Ok(())
}

#[test]
fn missing_speed_and_heading() -> Result<(), String> {
    let t = datetime!(2022-10-27 6:30 UTC);
    let reports = vec![
        PositionReport::basic(Point::new(1.0, 45.0), t),
        PositionReport::basic(Point::new(1.1, 45.0), t + Duration::minutes(5)),
    ];

    let (trajectory, stats) = TrajectoryBuilder::new(t, t + Duration::hours(1)).build(&reports)?;

    assert_eq!(1, trajectory.points.len());
    assert_eq!("2022-10-27T06:35:00Z, SOG: 0, COG: 0", trajectory.points[0].label);
    assert_eq!(None, stats.ok_or("No statistics")?.average_speed);

    Ok(())
}

#[test]
fn last_position_in_local_time() -> Result<(), String> {
    let t = datetime!(2022-10-31 23:15 UTC);
    let reports = vec![PositionReport::new(Point::new(-8.4, 43.37), t, 6.5, 180.0)];

    let mut options = TrajectoryOptions::new();
    options.utc_offset = "+02:00".to_string();

    let (trajectory, _) = TrajectoryBuilder::new(t, t)
        .options(options)
        .build(&reports)?;

    // a single report is the last one, so it is also kept
    assert_eq!(1, trajectory.points.len());
    let last = trajectory.last_fix.ok_or("No last position")?;
    assert_eq!("Last position: 01-11-2022 01:15, SOG: 6.5", last.label);

    Ok(())
}

#[test]
fn invalid_offset() {
    let t = datetime!(2022-10-31 23:15 UTC);
    let reports = vec![PositionReport::new(Point::new(-8.4, 43.37), t, 6.5, 180.0)];

    let mut options = TrajectoryOptions::new();
    options.utc_offset = "Europe/Paris".to_string();

    let result = TrajectoryBuilder::new(t, t).options(options).build(&reports);
    assert!(result.is_err());
}

fn point(lon: f64, lat: f64, minute: i64) -> TrackPoint {
    let time = datetime!(2023-03-01 12:00 UTC) + Duration::minutes(minute);
    TrackPoint::new(Point::new(lon, lat), time, format!("point {}", minute))
}

#[test]
fn geofence_clean() {
    let trajectory = Trajectory {
        points: vec![
            point(34.0, 32.5, 0),
            point(35.45, 33.85, 10),
            point(34.1, 32.6, 20),
            point(34.6, 31.7, 30),
            point(35.62, 33.81825, 40),
            point(34.2, 32.7, 50),
        ],
        last_fix: Some(point(35.4908, 33.81825, 50)),
    };

    let cleaner = GeofenceCleaner::default();
    let (cleaned, discarded) = cleaner.clean(&trajectory);

    assert_eq!(2, discarded);
    let labels: Vec<&str> = cleaned.points.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(vec!["point 0", "point 20", "point 40", "point 50"], labels);
    // the last known position is never tested
    assert_eq!(trajectory.last_fix, cleaned.last_fix);

    let (again, discarded) = cleaner.clean(&cleaned);
    assert_eq!(0, discarded);
    assert_eq!(cleaned, again);
}

#[test]
fn geofence_custom_zones() {
    let trajectory = Trajectory {
        points: vec![point(190.0, -20.0, 0), point(33.81825, 35.4908, 10)],
        last_fix: None,
    };

    let options = GeofenceOptions {
        zones: vec![ExclusionZone::new(-20.0, -170.0, 0.5)],
    };
    let (cleaned, discarded) = GeofenceCleaner::new(options).clean(&trajectory);

    assert_eq!(1, discarded);
    assert_eq!(1, cleaned.points.len());
    assert_eq!("point 10", cleaned.points[0].label);
}

#[test]
fn gpx_write_and_read() -> Result<(), String> {
    let trajectory = Trajectory {
        points: vec![point(358.5, 46.0, 0), point(358.75, 46.1, 15)],
        last_fix: Some(point(-1.3, 46.1, 15)),
    };

    let doc = GpxGenerator::new(trajectory.clone())
        .name("Oleron - La Coruna".to_string())
        .generate()?;
    assert_eq!(1, doc.tracks.len());
    assert_eq!(1, doc.tracks[0].segments.len());
    assert_eq!(2, doc.tracks[0].segments[0].points.len());
    assert_eq!(1, doc.waypoints.len());
    assert_eq!(Some("point 15".to_string()), doc.waypoints[0].comment);
    // GPX readers only accept [-180, 180)
    assert_eq!(-1.5, doc.tracks[0].segments[0].points[0].point().x());
    assert_eq!(-1.25, doc.tracks[0].segments[0].points[1].point().x());
    assert_eq!(-1.3, doc.waypoints[0].point().x());

    let mut buf = vec![];
    GpxGenerator::new(trajectory.clone()).write(&mut buf)?;

    let loaded = read_trajectory(buf.as_slice())?;
    assert_eq!(trajectory, loaded);

    Ok(())
}

#[test]
fn gpx_without_waypoint() -> Result<(), String> {
    let trajectory = Trajectory {
        points: vec![point(10.0, 20.0, 0)],
        last_fix: None,
    };

    let mut buf = vec![];
    GpxGenerator::new(trajectory).write(&mut buf)?;

    let loaded = read_trajectory(buf.as_slice())?;
    assert_eq!(1, loaded.points.len());
    assert_eq!(None, loaded.last_fix);

    Ok(())
}

#[test]
fn build_write_read_clean() -> Result<(), String> {
    let t = datetime!(2022-10-27 6:30 UTC);
    let reports = vec![
        PositionReport::new(Point::new(-1.40, 45.95), t, 2.0, 200.0),
        PositionReport::new(Point::new(-1.45, 45.92), t + Duration::minutes(10), 2.5, 210.0),
        // spurious fix near Gaza
        PositionReport::new(Point::new(34.55, 31.66), t + Duration::minutes(20), 0.0, 0.0),
        PositionReport::new(Point::new(-1.50, 45.90), t + Duration::minutes(30), 3.0, 215.0),
        PositionReport::new(Point::new(-1.55, 45.88), t + Duration::minutes(40), 3.5, 220.0),
    ];

    let (trajectory, _) = TrajectoryBuilder::new(t, t + Duration::hours(1)).build(&reports)?;
    assert_eq!(4, trajectory.points.len());

    let mut buf = vec![];
    GpxGenerator::new(trajectory).write(&mut buf)?;
    let loaded = read_trajectory(buf.as_slice())?;

    assert_eq!(4, loaded.points.len());
    assert!((loaded.points[0].longitude() - 358.55).abs() < 1e-9);
    assert_eq!(-1.55, loaded.last_fix.as_ref().ok_or("No last position")?.longitude());

    let cleaner = GeofenceCleaner::default();
    let (cleaned, discarded) = cleaner.clean(&loaded);
    assert_eq!(1, discarded);
    let minutes: Vec<i64> = cleaned
        .points
        .iter()
        .map(|p| (p.time - t).whole_minutes())
        .collect();
    assert_eq!(vec![10, 30, 40], minutes);
    assert_eq!(loaded.last_fix, cleaned.last_fix);

    let mut buf = vec![];
    GpxGenerator::new(cleaned).write(&mut buf)?;
    let reloaded = read_trajectory(buf.as_slice())?;
    assert_eq!(3, reloaded.points.len());

    let (again, discarded) = cleaner.clean(&reloaded);
    assert_eq!(0, discarded);
    assert_eq!(3, again.points.len());

    Ok(())
}
