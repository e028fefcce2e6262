use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A ground location the passes are predicted for.
///
/// Range checks happen where user input enters the system, not here.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Display, Serialize, Deserialize)]
#[display(
    fmt = "{{lat: {:.4}, lon: {:.4}, elev_m: {}}}",
    "latitude_deg",
    "longitude_deg",
    "elevation_m"
)]
pub struct ObserverLocation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub elevation_m: f64,
}

impl ObserverLocation {
    pub fn new(latitude_deg: f64, longitude_deg: f64, elevation_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            elevation_m,
        }
    }
}
