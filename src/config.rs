use crate::classifier::{Heuristic, StopClassifier};
use crate::error::ConfigError;
use time::Duration;

/// Assumed time between two consecutive samples of a trip log.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::minutes(5);

/// Settings of one trip analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    pub heuristic: Heuristic,
    /// Stop threshold in kilometers. `None` uses the heuristic's default.
    pub threshold_km: Option<f64>,
    /// Sampling cadence used to turn sample counts into moving/stopped time.
    pub sample_interval: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            heuristic: Heuristic::Adjacent,
            threshold_km: None,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }
}

impl AnalysisConfig {
    pub fn threshold_km(&self) -> f64 {
        self.threshold_km
            .unwrap_or_else(|| self.heuristic.default_threshold_km())
    }

    pub fn classifier(&self) -> StopClassifier {
        StopClassifier::with_threshold(self.heuristic, self.threshold_km())
    }
}

/// Parses a positive duration such as `300s`, `5m` or `1h`.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ConfigError::EmptyDuration);
    }

    let (num_str, unit) = s.split_at(s.len() - s.chars().last().map_or(0, char::len_utf8));
    let num: i64 = num_str
        .parse()
        .map_err(|_| ConfigError::InvalidDuration(s.to_string()))?;
    if num <= 0 {
        return Err(ConfigError::InvalidDuration(s.to_string()));
    }

    match unit {
        "s" => Ok(Duration::seconds(num)),
        "m" => Ok(Duration::minutes(num)),
        "h" => Ok(Duration::hours(num)),
        _ => Err(ConfigError::InvalidDurationUnit(unit.to_string())),
    }
}

pub fn parse_heuristic(s: &str) -> Result<Heuristic, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "h1" | "adjacent" => Ok(Heuristic::Adjacent),
        "h2" | "zone" => Ok(Heuristic::Zone),
        _ => Err(ConfigError::UnknownHeuristic(s.to_string())),
    }
}

/// Parses a stop threshold in kilometers.
pub fn parse_threshold_km(s: &str) -> Result<f64, ConfigError> {
    match s.trim().parse::<f64>() {
        Ok(km) if km.is_finite() && km > 0.0 => Ok(km),
        _ => Err(ConfigError::InvalidThreshold(s.to_string())),
    }
}
