use crate::error::TripError;
use crate::sample::Sample;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculates the great circle distance in kilometers between two GPS
/// coordinates using the haversine formula on a spherical Earth.
///
/// References:
/// - R.W. Sinnott, "Virtues of the Haversine", Sky and Telescope, vol. 68, no. 2, 1984, p. 159
/// - https://en.wikipedia.org/wiki/Haversine_formula
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    // a = sin²(Δφ/2) + cos φ1 ⋅ cos φ2 ⋅ sin²(Δλ/2)
    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);

    // Rounding can push `a` marginally past 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Great circle distance in kilometers between two samples.
pub fn distance(p1: &Sample, p2: &Sample) -> f64 {
    haversine_distance(p1.latitude(), p1.longitude(), p2.latitude(), p2.longitude())
}

/// Average speed in km/h between two samples.
///
/// Fails with [`TripError::DivisionByZero`] when both samples carry the same
/// timestamp.
pub fn speed_kmh(p1: &Sample, p2: &Sample) -> Result<f64, TripError> {
    let minutes = p1.time_minutes().abs_diff(p2.time_minutes());
    if minutes == 0 {
        return Err(TripError::DivisionByZero {
            operation: "speed between samples with equal timestamps",
        });
    }
    Ok(distance(p1, p2) / f64::from(minutes) * 60.0)
}

/// Sum of the distances between consecutive samples, in kilometers.
///
/// Zero for fewer than two samples.
pub fn path_distance_km(samples: &[Sample]) -> f64 {
    samples
        .windows(2)
        .map(|pair| distance(&pair[0], &pair[1]))
        .sum()
}
