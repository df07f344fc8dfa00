//! Stop detection over the samples of a trip.
//!
//! Two heuristics are available:
//!
//! - [`Heuristic::Adjacent`] marks a sample as stopped when it lies within the
//!   threshold of the sample right before it.
//! - [`Heuristic::Zone`] looks for stop zones: three samples of which at least
//!   two pairs are within the threshold open a zone, and the zone keeps
//!   absorbing samples as long as they are within the threshold of any of its
//!   members.
//!
//! Both produce a [`Classification`] labelling every sample exactly once.

use crate::dataset::TripDataset;
use crate::geo::distance;
use crate::sample::Sample;
use std::fmt;
use tracing::{debug, trace};

/// Default threshold of the adjacent-displacement heuristic, in kilometers.
pub const ADJACENT_DEFAULT_THRESHOLD_KM: f64 = 0.6;

/// Default threshold of the zone heuristic, in kilometers.
pub const ZONE_DEFAULT_THRESHOLD_KM: f64 = 0.5;

/// Number of samples needed to open a stop zone.
const ZONE_SEED_LEN: usize = 3;

/// Close pairs among the seed samples required to open a stop zone.
const ZONE_SEED_MIN_CLOSE_PAIRS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heuristic {
    /// H1: pairwise displacement between consecutive samples.
    Adjacent,
    /// H2: zone based detection tolerant to single outliers.
    Zone,
}

impl Heuristic {
    pub fn default_threshold_km(self) -> f64 {
        match self {
            Heuristic::Adjacent => ADJACENT_DEFAULT_THRESHOLD_KM,
            Heuristic::Zone => ZONE_DEFAULT_THRESHOLD_KM,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Heuristic::Adjacent => "h1",
            Heuristic::Zone => "h2",
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classification of a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleClass {
    Moving,
    Stopped,
}

/// Result of one classifier run over a trip.
///
/// `labels[i]` holds the class of sample `i` of the classified dataset. The
/// moving subsequence and the stop count are derived from the labels, so they
/// always agree with each other.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    heuristic: Heuristic,
    threshold_km: f64,
    stop_count: usize,
    moving: Vec<Sample>,
    labels: Vec<SampleClass>,
}

impl Classification {
    fn from_labels(
        heuristic: Heuristic,
        threshold_km: f64,
        samples: &[Sample],
        labels: Vec<SampleClass>,
    ) -> Self {
        debug_assert_eq!(samples.len(), labels.len());
        let moving: Vec<Sample> = samples
            .iter()
            .zip(&labels)
            .filter(|(_, class)| **class == SampleClass::Moving)
            .map(|(sample, _)| *sample)
            .collect();
        let stop_count = labels.len() - moving.len();

        Classification {
            heuristic,
            threshold_km,
            stop_count,
            moving,
            labels,
        }
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    pub fn threshold_km(&self) -> f64 {
        self.threshold_km
    }

    /// Number of samples classified as stopped.
    pub fn stop_count(&self) -> usize {
        self.stop_count
    }

    /// Samples classified as moving, in trip order.
    pub fn moving(&self) -> &[Sample] {
        &self.moving
    }

    pub fn labels(&self) -> &[SampleClass] {
        &self.labels
    }

    pub fn into_moving(self) -> Vec<Sample> {
        self.moving
    }
}

/// A configured stop detection heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopClassifier {
    heuristic: Heuristic,
    threshold_km: f64,
}

impl StopClassifier {
    /// Creates a classifier using the heuristic's default threshold.
    pub fn new(heuristic: Heuristic) -> Self {
        StopClassifier::with_threshold(heuristic, heuristic.default_threshold_km())
    }

    pub fn with_threshold(heuristic: Heuristic, threshold_km: f64) -> Self {
        StopClassifier {
            heuristic,
            threshold_km,
        }
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    pub fn threshold_km(&self) -> f64 {
        self.threshold_km
    }

    /// Runs the heuristic over the whole trip and returns a fresh result.
    pub fn classify(&self, trip: &TripDataset) -> Classification {
        let samples = trip.samples();
        let labels = match self.heuristic {
            Heuristic::Adjacent => classify_adjacent(samples, self.threshold_km),
            Heuristic::Zone => ZoneScanner::new(samples, self.threshold_km).run(),
        };
        let classification =
            Classification::from_labels(self.heuristic, self.threshold_km, samples, labels);

        debug!(
            "{} classification (threshold {} km): {} samples, {} stopped, {} moving",
            self.heuristic,
            self.threshold_km,
            samples.len(),
            classification.stop_count(),
            classification.moving().len()
        );
        classification
    }
}

/// H1: the first sample is always moving, every later sample is stopped when
/// it is within `threshold_km` of its predecessor.
fn classify_adjacent(samples: &[Sample], threshold_km: f64) -> Vec<SampleClass> {
    let mut labels = Vec::with_capacity(samples.len());
    if samples.is_empty() {
        return labels;
    }

    labels.push(SampleClass::Moving);
    for pair in samples.windows(2) {
        if distance(&pair[0], &pair[1]) <= threshold_km {
            labels.push(SampleClass::Stopped);
        } else {
            labels.push(SampleClass::Moving);
        }
    }
    labels
}

/// Samples believed to belong to the stop zone currently being tracked.
#[derive(Debug, Clone, Default, PartialEq)]
struct StopRun {
    members: Vec<Sample>,
}

impl StopRun {
    fn is_near(&self, sample: &Sample, threshold_km: f64) -> bool {
        self.members
            .iter()
            .any(|member| distance(member, sample) <= threshold_km)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ZoneState {
    Scanning,
    InZone(StopRun),
}

/// A single transition of the zone state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZoneStep {
    /// Scanning: the sample at the index was classified as moving.
    Moving(usize),
    /// Scanning: a zone was opened with the three samples starting at the index.
    ZoneOpened(usize),
    /// InZone: the sample at the index joined the active zone.
    ZoneExtended(usize),
    /// InZone: the sample at the index is outside the zone. The zone is
    /// dropped and the same index is scanned again.
    ZoneClosed(usize),
}

impl ZoneStep {
    fn index(self) -> usize {
        match self {
            ZoneStep::Moving(i)
            | ZoneStep::ZoneOpened(i)
            | ZoneStep::ZoneExtended(i)
            | ZoneStep::ZoneClosed(i) => i,
        }
    }
}

/// H2 state machine. The index only ever moves forward; leaving a zone keeps
/// the index where it is so the sample is rescanned as a possible new seed.
#[derive(Debug)]
struct ZoneScanner<'a> {
    samples: &'a [Sample],
    threshold_km: f64,
    index: usize,
    state: ZoneState,
    labels: Vec<SampleClass>,
}

impl<'a> ZoneScanner<'a> {
    fn new(samples: &'a [Sample], threshold_km: f64) -> Self {
        ZoneScanner {
            samples,
            threshold_km,
            index: 0,
            state: ZoneState::Scanning,
            labels: Vec::with_capacity(samples.len()),
        }
    }

    fn run(mut self) -> Vec<SampleClass> {
        while let Some(step) = self.step() {
            trace!(index = step.index(), ?step, "zone scanner");
        }
        self.labels
    }

    /// Performs one transition. Returns `None` once every sample is classified.
    fn step(&mut self) -> Option<ZoneStep> {
        let i = self.index;
        if i >= self.samples.len() {
            return None;
        }
        debug_assert_eq!(self.labels.len(), i);

        let state = std::mem::replace(&mut self.state, ZoneState::Scanning);
        let step = match state {
            ZoneState::Scanning => {
                if self.seeds_zone(i) {
                    let members = self.samples[i..i + ZONE_SEED_LEN].to_vec();
                    self.labels
                        .extend(std::iter::repeat_n(SampleClass::Stopped, ZONE_SEED_LEN));
                    self.index += ZONE_SEED_LEN;
                    self.state = ZoneState::InZone(StopRun { members });
                    ZoneStep::ZoneOpened(i)
                } else {
                    self.labels.push(SampleClass::Moving);
                    self.index += 1;
                    ZoneStep::Moving(i)
                }
            }
            ZoneState::InZone(mut run) => {
                let sample = self.samples[i];
                if run.is_near(&sample, self.threshold_km) {
                    run.members.push(sample);
                    self.labels.push(SampleClass::Stopped);
                    self.index += 1;
                    self.state = ZoneState::InZone(run);
                    ZoneStep::ZoneExtended(i)
                } else {
                    ZoneStep::ZoneClosed(i)
                }
            }
        };
        Some(step)
    }

    /// Whether the three samples starting at `i` open a stop zone.
    fn seeds_zone(&self, i: usize) -> bool {
        if i + ZONE_SEED_LEN > self.samples.len() {
            return false;
        }
        let (a, b, c) = (&self.samples[i], &self.samples[i + 1], &self.samples[i + 2]);
        let close_pairs = [distance(a, b), distance(b, c), distance(a, c)]
            .into_iter()
            .filter(|d| *d <= self.threshold_km)
            .count();
        close_pairs >= ZONE_SEED_MIN_CLOSE_PAIRS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_trip(points: &[(u32, f64, f64)]) -> TripDataset {
        TripDataset::new(
            points
                .iter()
                .map(|&(time, lat, lon)| Sample::new(time, lat, lon))
                .collect(),
        )
        .unwrap()
    }

    /// Samples on the equator spaced `step_deg` degrees of longitude apart.
    fn equator_trip(count: usize, step_deg: f64) -> TripDataset {
        make_trip(
            &(0..count)
                .map(|i| (i as u32 * 5, 0.0, i as f64 * step_deg))
                .collect::<Vec<_>>(),
        )
    }

    fn zone_steps(trip: &TripDataset, threshold_km: f64) -> Vec<ZoneStep> {
        let mut scanner = ZoneScanner::new(trip.samples(), threshold_km);
        std::iter::from_fn(|| scanner.step()).collect()
    }

    /// Each index is labelled exactly once and the derived values agree with the labels.
    fn assert_partition(trip: &TripDataset, result: &Classification) {
        assert_eq!(result.labels().len(), trip.size());
        let moving_indices: Vec<usize> = result
            .labels()
            .iter()
            .enumerate()
            .filter(|(_, class)| **class == SampleClass::Moving)
            .map(|(i, _)| i)
            .collect();
        let expected_moving: Vec<Sample> = moving_indices
            .iter()
            .map(|&i| *trip.at(i).unwrap())
            .collect();
        assert_eq!(result.moving(), expected_moving.as_slice());
        assert_eq!(result.stop_count() + result.moving().len(), trip.size());
    }

    #[test]
    fn test_heuristic_defaults() {
        assert_eq!(Heuristic::Adjacent.default_threshold_km(), 0.6);
        assert_eq!(Heuristic::Zone.default_threshold_km(), 0.5);
        let classifier = StopClassifier::new(Heuristic::Zone);
        assert_eq!(classifier.threshold_km(), 0.5);
        assert_eq!(Heuristic::Adjacent.to_string(), "h1");
    }

    #[test]
    fn test_adjacent_all_pairs_far() {
        // ~1.1km between consecutive samples
        let trip = equator_trip(6, 0.01);
        let result = StopClassifier::new(Heuristic::Adjacent).classify(&trip);
        assert_eq!(result.stop_count(), 0);
        assert_eq!(result.moving(), trip.samples());
        assert_partition(&trip, &result);
    }

    #[test]
    fn test_adjacent_all_pairs_close() {
        // ~0.11km between consecutive samples
        let trip = equator_trip(6, 0.001);
        let result = StopClassifier::new(Heuristic::Adjacent).classify(&trip);
        assert_eq!(result.stop_count(), 5);
        assert_eq!(result.moving(), &trip.samples()[..1]);
        assert_partition(&trip, &result);
    }

    #[test]
    fn test_adjacent_hand_computed_trip() {
        // Gaps: ~1.112km, ~1.112km, ~157km
        let trip = make_trip(&[(0, 0.0, 0.0), (5, 0.0, 0.01), (10, 0.0, 0.02), (15, 1.0, 1.0)]);
        let result = StopClassifier::new(Heuristic::Adjacent).classify(&trip);
        assert_eq!(result.stop_count(), 0);
        assert_eq!(result.moving().len(), 4);

        // Gaps: ~0.111km, ~0.111km, ~157km
        let trip = make_trip(&[
            (0, 0.0, 0.0),
            (5, 0.0, 0.001),
            (10, 0.0, 0.002),
            (15, 1.0, 1.0),
        ]);
        let result = StopClassifier::new(Heuristic::Adjacent).classify(&trip);
        assert_eq!(result.stop_count(), 2);
        assert_eq!(
            result.moving(),
            &[*trip.at(0).unwrap(), *trip.at(3).unwrap()]
        );
        assert_eq!(
            result.labels(),
            &[
                SampleClass::Moving,
                SampleClass::Stopped,
                SampleClass::Stopped,
                SampleClass::Moving
            ]
        );
    }

    #[test]
    fn test_adjacent_threshold_is_inclusive() {
        let trip = make_trip(&[(0, 0.0, 0.0), (5, 0.0, 0.01)]);
        let gap = distance(trip.at(0).unwrap(), trip.at(1).unwrap());
        let result = StopClassifier::with_threshold(Heuristic::Adjacent, gap).classify(&trip);
        assert_eq!(result.stop_count(), 1);
    }

    #[test]
    fn test_adjacent_short_trips() {
        let empty = TripDataset::default();
        let result = StopClassifier::new(Heuristic::Adjacent).classify(&empty);
        assert_eq!(result.stop_count(), 0);
        assert!(result.moving().is_empty());

        let single = make_trip(&[(0, 10.0, 10.0)]);
        let result = StopClassifier::new(Heuristic::Adjacent).classify(&single);
        assert_eq!(result.stop_count(), 0);
        assert_eq!(result.moving(), single.samples());
    }

    #[test]
    fn test_zone_three_close_samples() {
        let trip = equator_trip(3, 0.001);
        let result = StopClassifier::new(Heuristic::Zone).classify(&trip);
        assert_eq!(result.stop_count(), 3);
        assert!(result.moving().is_empty());
    }

    #[test]
    fn test_zone_single_close_pair_is_not_a_stop() {
        // Only samples 0 and 1 are close to each other.
        let trip = make_trip(&[(0, 0.0, 0.0), (5, 0.0, 0.001), (10, 0.0, 0.05)]);
        let result = StopClassifier::new(Heuristic::Zone).classify(&trip);
        assert_eq!(result.stop_count(), 0);
        assert_eq!(result.moving(), trip.samples());
    }

    #[test]
    fn test_zone_two_of_three_pairs_open_a_zone() {
        // d(0,1) ~0.33km, d(1,2) ~0.33km, d(0,2) ~0.67km
        let trip = make_trip(&[(0, 0.0, 0.0), (5, 0.0, 0.003), (10, 0.0, 0.006)]);
        let result = StopClassifier::new(Heuristic::Zone).classify(&trip);
        assert_eq!(result.stop_count(), 3);
        assert!(result.moving().is_empty());
    }

    #[test]
    fn test_zone_absorbs_drifting_samples() {
        // Sample 3 is too far from sample 0 but close to sample 2, so it joins
        // the zone. Sample 4 is far from every member.
        let trip = make_trip(&[
            (0, 0.0, 0.0),
            (5, 0.0, 0.003),
            (10, 0.0, 0.006),
            (15, 0.0, 0.009),
            (20, 0.0, 0.05),
            (25, 0.0, 0.1),
        ]);
        assert_eq!(
            zone_steps(&trip, ZONE_DEFAULT_THRESHOLD_KM),
            vec![
                ZoneStep::ZoneOpened(0),
                ZoneStep::ZoneExtended(3),
                ZoneStep::ZoneClosed(4),
                ZoneStep::Moving(4),
                ZoneStep::Moving(5),
            ]
        );

        let result = StopClassifier::new(Heuristic::Zone).classify(&trip);
        assert_eq!(result.stop_count(), 4);
        assert_eq!(result.moving(), &trip.samples()[4..]);
        assert_partition(&trip, &result);
    }

    #[test]
    fn test_zone_closed_sample_is_rescanned_as_seed() {
        // Two separate clusters ~11km apart. Sample 3 closes the first zone and
        // immediately seeds the second one.
        let trip = make_trip(&[
            (0, 0.0, 0.0),
            (5, 0.0, 0.001),
            (10, 0.0, 0.002),
            (15, 0.0, 0.1),
            (20, 0.0, 0.101),
            (25, 0.0, 0.102),
        ]);
        assert_eq!(
            zone_steps(&trip, ZONE_DEFAULT_THRESHOLD_KM),
            vec![
                ZoneStep::ZoneOpened(0),
                ZoneStep::ZoneClosed(3),
                ZoneStep::ZoneOpened(3),
            ]
        );

        let result = StopClassifier::new(Heuristic::Zone).classify(&trip);
        assert_eq!(result.stop_count(), 6);
        assert!(result.moving().is_empty());
    }

    #[test]
    fn test_zone_last_two_samples_cannot_seed() {
        // Far apart first, then a close pair at the end.
        let trip = make_trip(&[
            (0, 0.0, 0.0),
            (5, 0.0, 0.05),
            (10, 0.0, 0.1),
            (15, 0.0, 0.1001),
        ]);
        let result = StopClassifier::new(Heuristic::Zone).classify(&trip);
        assert_eq!(result.stop_count(), 0);
        assert_eq!(result.moving(), trip.samples());
    }

    #[test]
    fn test_zone_short_trips() {
        for count in 0..3 {
            let trip = equator_trip(count, 0.0001);
            let result = StopClassifier::new(Heuristic::Zone).classify(&trip);
            assert_eq!(result.stop_count(), 0);
            assert_eq!(result.moving(), trip.samples());
        }
    }

    #[test]
    fn test_partition_invariant_on_generated_trips() {
        // Deterministic LCG so the walk mixes close and far steps.
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 33) as f64 / (1u64 << 31) as f64
        };

        for _ in 0..50 {
            let mut points = Vec::new();
            let (mut lat, mut lon) = (35.0, -97.0);
            for i in 0..40 {
                let step = if next() < 0.5 { 0.002 } else { 0.02 };
                lat += (next() - 0.5) * step;
                lon += (next() - 0.5) * step;
                points.push((i * 5, lat, lon));
            }
            let trip = make_trip(&points);

            for heuristic in [Heuristic::Adjacent, Heuristic::Zone] {
                let result = StopClassifier::new(heuristic).classify(&trip);
                assert_partition(&trip, &result);
            }
        }
    }

    #[test_log::test]
    fn test_classification_is_fresh_each_run() {
        let trip = equator_trip(5, 0.001);
        let loose = StopClassifier::with_threshold(Heuristic::Zone, 1.0).classify(&trip);
        let strict = StopClassifier::with_threshold(Heuristic::Zone, 0.01).classify(&trip);
        assert_eq!(loose.stop_count(), 5);
        assert_eq!(strict.stop_count(), 0);
        assert_eq!(strict.moving().len(), 5);
        assert_eq!(strict.threshold_km(), 0.01);
    }
}
