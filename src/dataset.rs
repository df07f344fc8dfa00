use crate::error::TripError;
use crate::geo::path_distance_km;
use crate::sample::Sample;

/// The ordered samples of one recorded trip.
///
/// A dataset is validated once on construction and never mutated afterwards.
/// Derived results (classifications, metrics) are always new values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripDataset {
    samples: Vec<Sample>,
}

impl TripDataset {
    /// Builds a dataset from samples ordered by ascending time.
    ///
    /// Fails with [`TripError::UnorderedSamples`] if a timestamp is earlier
    /// than its predecessor, or [`TripError::InvalidCoordinate`] if a sample
    /// lies outside the valid latitude/longitude ranges.
    pub fn new(samples: Vec<Sample>) -> Result<Self, TripError> {
        for (index, sample) in samples.iter().enumerate() {
            if !sample.has_valid_coordinates() {
                return Err(TripError::InvalidCoordinate {
                    index,
                    latitude: sample.latitude(),
                    longitude: sample.longitude(),
                });
            }
        }

        if let Some(index) = samples
            .windows(2)
            .position(|pair| pair[1].time_minutes() < pair[0].time_minutes())
        {
            return Err(TripError::UnorderedSamples { index: index + 1 });
        }

        Ok(TripDataset { samples })
    }

    pub fn size(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn at(&self, index: usize) -> Result<&Sample, TripError> {
        self.samples.get(index).ok_or(TripError::IndexOutOfRange {
            index,
            len: self.samples.len(),
        })
    }

    /// Read-only view of the samples.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Independent copy of the full ordered sequence.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.clone()
    }

    /// Elapsed time between the first and the last sample, in hours.
    pub fn total_time_hours(&self) -> Result<f64, TripError> {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => {
                Ok(f64::from(last.time_minutes() - first.time_minutes()) / 60.0)
            }
            _ => Err(TripError::EmptyTrip),
        }
    }

    /// Sum of the distances between consecutive samples, in kilometers.
    pub fn total_distance_km(&self) -> f64 {
        path_distance_km(&self.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::distance;

    fn make_trip() -> TripDataset {
        TripDataset::new(vec![
            Sample::new(0, 35.2111, -97.4411),
            Sample::new(5, 35.2150, -97.4470),
            Sample::new(10, 35.2250, -97.4520),
            Sample::new(15, 35.2400, -97.4600),
        ])
        .unwrap()
    }

    #[test]
    fn test_at_and_size() {
        let trip = make_trip();
        assert_eq!(trip.size(), 4);
        assert_eq!(trip.at(2).unwrap().time_minutes(), 10);
        assert_eq!(
            trip.at(4),
            Err(TripError::IndexOutOfRange { index: 4, len: 4 })
        );
    }

    #[test]
    fn test_snapshot_is_independent() {
        let trip = make_trip();
        let mut copy = trip.snapshot();
        copy.clear();
        assert_eq!(trip.size(), 4);
        assert_eq!(trip.samples().len(), 4);
    }

    #[test]
    fn test_total_time_uses_first_and_last_sample() {
        let trip = TripDataset::new(vec![
            Sample::new(30, 0.0, 0.0),
            Sample::new(60, 0.0, 0.1),
            Sample::new(120, 0.0, 0.2),
        ])
        .unwrap();
        assert_eq!(trip.total_time_hours().unwrap(), 1.5);
    }

    #[test]
    fn test_total_time_empty_trip() {
        let trip = TripDataset::default();
        assert_eq!(trip.total_time_hours(), Err(TripError::EmptyTrip));
    }

    #[test]
    fn test_total_distance() {
        let trip = make_trip();
        let samples = trip.samples();
        let expected = distance(&samples[0], &samples[1])
            + distance(&samples[1], &samples[2])
            + distance(&samples[2], &samples[3]);
        assert!((trip.total_distance_km() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_total_distance_short_trips() {
        assert_eq!(TripDataset::default().total_distance_km(), 0.0);
        let single = TripDataset::new(vec![Sample::new(0, 12.0, 34.0)]).unwrap();
        assert_eq!(single.total_distance_km(), 0.0);
    }

    #[test]
    fn test_duplicate_timestamps_are_accepted() {
        let trip = TripDataset::new(vec![
            Sample::new(0, 0.0, 0.0),
            Sample::new(0, 0.0, 0.001),
            Sample::new(5, 0.0, 0.002),
        ]);
        assert!(trip.is_ok());
    }

    #[test]
    fn test_unordered_samples_are_rejected() {
        let trip = TripDataset::new(vec![
            Sample::new(0, 0.0, 0.0),
            Sample::new(10, 0.0, 0.001),
            Sample::new(5, 0.0, 0.002),
        ]);
        assert_eq!(trip, Err(TripError::UnorderedSamples { index: 2 }));
    }

    #[test]
    fn test_invalid_coordinates_are_rejected() {
        let trip = TripDataset::new(vec![Sample::new(0, 0.0, 0.0), Sample::new(5, 91.0, 0.0)]);
        assert!(matches!(
            trip,
            Err(TripError::InvalidCoordinate { index: 1, .. })
        ));
    }
}
