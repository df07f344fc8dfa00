//! Trip analysis for GPS logs sampled at a fixed interval.
//!
//! A [`TripDataset`] is classified into moving and stopped samples by a
//! [`StopClassifier`]; the [`metrics`] functions and [`TripReport`] derive
//! distances, times and speeds from the dataset and the moving subsequence.
//!
//! ```rust
//! use tripstop::{Heuristic, Sample, StopClassifier, TripDataset};
//!
//! let trip = TripDataset::new(vec![
//!     Sample::new(0, 35.2111, -97.4411),
//!     Sample::new(5, 35.2112, -97.4412),
//!     Sample::new(10, 35.2400, -97.4600),
//! ])
//! .unwrap();
//!
//! let result = StopClassifier::new(Heuristic::Adjacent).classify(&trip);
//! assert_eq!(result.stop_count(), 1);
//! assert_eq!(result.moving().len(), 2);
//! ```

pub mod analysis;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod geo;
pub mod gpx;
pub mod loader;
pub mod metrics;
pub mod sample;

pub use analysis::{TripAnalysis, TripReport};
pub use classifier::{Classification, Heuristic, SampleClass, StopClassifier};
pub use config::AnalysisConfig;
pub use dataset::TripDataset;
pub use error::{ConfigError, LoadError, TripError};
pub use sample::Sample;
