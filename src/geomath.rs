//! Geodesic helpers on a spherical earth

use std::f64::consts::PI;

/// Earth radius in meters (IAG-GRS80 equatorial radius, used as a sphere)
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Meters in one nautical mile
pub const NAUTICAL_MILE: f64 = 1852.0;

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees / 180.0 * PI
}

pub fn radians_to_degrees(radians: f64) -> f64 {
    radians / PI * 180.0
}

/// Degrees, minutes and seconds to decimal degrees
pub fn dms_to_dd(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

/// Decimal degrees to degrees, minutes and seconds. Degrees and minutes
/// are truncated towards zero, the remainder ends up in the seconds.
pub fn dd_to_dms(dd: f64) -> (i32, i32, f64) {
    let degrees = dd.trunc();
    let x = (dd - degrees) * 60.0;
    let minutes = x.trunc();
    let seconds = (x - minutes) * 60.0;

    (degrees as i32, minutes as i32, seconds)
}

/// Great-circle distance in meters between A and B, given in decimal degrees
pub fn great_circle_distance(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    if lat_a == lat_b && lon_a == lon_b {
        return 0.0;
    }

    let lat_a = degrees_to_radians(lat_a);
    let lon_a = degrees_to_radians(lon_a);
    let lat_b = degrees_to_radians(lat_b);
    let lon_b = degrees_to_radians(lon_b);

    let val = lat_a.sin() * lat_b.sin() + lat_a.cos() * lat_b.cos() * (lon_b - lon_a).cos();

    // rounding can push the cosine out of [-1, 1] for (almost) equal or antipodal points
    let s = if val >= 1.0 {
        0.0
    } else if val <= -1.0 {
        PI
    } else {
        val.acos()
    };

    s * EARTH_RADIUS
}
