/// One GPS fix of a recorded trip.
///
/// `time_minutes` is the time of the fix in whole minutes, counted from an
/// arbitrary origin shared by every sample of the trip. Latitude and longitude
/// are decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    time_minutes: u32,
    latitude: f64,
    longitude: f64,
}

impl Sample {
    pub fn new(time_minutes: u32, latitude: f64, longitude: f64) -> Self {
        Sample {
            time_minutes,
            latitude,
            longitude,
        }
    }

    pub fn time_minutes(&self) -> u32 {
        self.time_minutes
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns `true` when both coordinates are finite and inside the valid
    /// latitude/longitude ranges.
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}
