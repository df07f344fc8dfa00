use crate::classifier::{Classification, Heuristic, StopClassifier};
use crate::config::AnalysisConfig;
use crate::dataset::TripDataset;
use crate::error::TripError;
use crate::metrics::{
    average_moving_speed, moving_time_hours, stopped_time_hours, total_moving_distance_km,
};
use crate::sample::Sample;

/// Holds the current stop classification of one trip.
///
/// Each run replaces the previous result; there is no incremental update.
/// Callers sharing a dataset across threads should keep their own
/// [`Classification`] values instead of a shared analysis.
#[derive(Debug)]
pub struct TripAnalysis<'a> {
    trip: &'a TripDataset,
    current: Option<Classification>,
}

impl<'a> TripAnalysis<'a> {
    pub fn new(trip: &'a TripDataset) -> Self {
        TripAnalysis {
            trip,
            current: None,
        }
    }

    pub fn trip(&self) -> &TripDataset {
        self.trip
    }

    /// Classifies the trip with `classifier`, discarding any earlier result.
    pub fn run(&mut self, classifier: &StopClassifier) -> &Classification {
        self.current.insert(classifier.classify(self.trip))
    }

    pub fn current(&self) -> Option<&Classification> {
        self.current.as_ref()
    }

    /// Moving samples of the current classification, empty before the first run.
    pub fn moving(&self) -> &[Sample] {
        self.current
            .as_ref()
            .map(Classification::moving)
            .unwrap_or_default()
    }

    pub fn stop_count(&self) -> usize {
        self.current.as_ref().map_or(0, Classification::stop_count)
    }
}

/// All trip aggregates for one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TripReport {
    pub heuristic: Heuristic,
    pub threshold_km: f64,
    pub sample_count: usize,
    pub total_time_hours: f64,
    pub total_distance_km: f64,
    pub stop_count: usize,
    pub moving_sample_count: usize,
    pub moving_time_hours: f64,
    pub stopped_time_hours: f64,
    pub moving_distance_km: f64,
    /// `None` when fewer than two samples are moving.
    pub average_moving_speed_kmh: Option<f64>,
}

impl TripReport {
    /// Fails with [`TripError::EmptyTrip`] for a trip without samples.
    pub fn build(trip: &TripDataset, config: &AnalysisConfig) -> Result<Self, TripError> {
        let total_time_hours = trip.total_time_hours()?;

        let mut analysis = TripAnalysis::new(trip);
        let classification = analysis.run(&config.classifier());
        let moving = classification.moving();

        let moving_time = moving_time_hours(moving, config.sample_interval);
        let average_moving_speed_kmh = match average_moving_speed(moving, moving_time) {
            Ok(speed) => Some(speed),
            Err(TripError::DivisionByZero { .. }) => None,
            Err(e) => return Err(e),
        };

        Ok(TripReport {
            heuristic: classification.heuristic(),
            threshold_km: classification.threshold_km(),
            sample_count: trip.size(),
            total_time_hours,
            total_distance_km: trip.total_distance_km(),
            stop_count: classification.stop_count(),
            moving_sample_count: moving.len(),
            moving_time_hours: moving_time,
            stopped_time_hours: stopped_time_hours(trip, moving, config.sample_interval),
            moving_distance_km: total_moving_distance_km(moving),
            average_moving_speed_kmh,
        })
    }
}
