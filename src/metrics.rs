//! Trip level aggregates computed from a dataset and a moving subsequence.
//!
//! Moving and stopped time are derived from sample counts and the assumed
//! sampling interval, while [`TripDataset::total_time_hours`] uses the first
//! and last timestamps. The two are independent approximations and need not
//! add up when sampling is irregular.

use crate::dataset::TripDataset;
use crate::error::TripError;
use crate::geo::{path_distance_km, speed_kmh};
use crate::sample::Sample;
use time::Duration;

/// Hours covered by `intervals` sampling intervals.
fn intervals_to_hours(intervals: f64, sample_interval: Duration) -> f64 {
    intervals * sample_interval.as_seconds_f64() / 3600.0
}

/// Average speed in km/h between two samples.
pub fn average_speed(a: &Sample, b: &Sample) -> Result<f64, TripError> {
    speed_kmh(a, b)
}

/// Time spent moving, in hours: `(count - 1) * interval`.
///
/// Duration is measured between samples, so a single moving sample yields 0
/// and an empty subsequence yields minus one interval.
pub fn moving_time_hours(moving: &[Sample], sample_interval: Duration) -> f64 {
    intervals_to_hours(moving.len() as f64 - 1.0, sample_interval)
}

/// Time spent stopped, in hours: one interval per sample not in `moving`.
pub fn stopped_time_hours(
    trip: &TripDataset,
    moving: &[Sample],
    sample_interval: Duration,
) -> f64 {
    let stopped = trip.size().saturating_sub(moving.len());
    intervals_to_hours(stopped as f64, sample_interval)
}

pub fn total_moving_distance_km(moving: &[Sample]) -> f64 {
    path_distance_km(moving)
}

/// Average speed while moving, in km/h.
///
/// Fails with [`TripError::DivisionByZero`] when the moving subsequence has at
/// most one sample or `moving_time_hours` is zero.
pub fn average_moving_speed(moving: &[Sample], moving_time_hours: f64) -> Result<f64, TripError> {
    if moving.len() <= 1 || moving_time_hours == 0.0 {
        return Err(TripError::DivisionByZero {
            operation: "average moving speed",
        });
    }
    Ok(total_moving_distance_km(moving) / moving_time_hours)
}
