//! Core types for the geocoding subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A resolved (latitude, longitude) pair in EPSG:4326.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lon)
    }
}

/// Addressing scheme understood by the geocoding service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Street-name address (도로명주소).
    Road,
    /// Lot-number address (지번주소).
    Parcel,
}

impl QueryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Road => "road",
            Self::Parcel => "parcel",
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failed lookup attempt. Never fatal: the chain moves on.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid geocoder response: {0}")]
    InvalidResponse(String),

    #[error("coordinate out of range: {0}")]
    OutOfRange(Coordinate),
}

/// One lookup against a coordinate-resolution backend.
///
/// `Ok(None)` means the service answered but found no match.
pub trait AddressLookup {
    fn lookup(&self, address: &str, mode: QueryMode) -> Result<Option<Coordinate>, GeocodeError>;
}

impl<T: AddressLookup + ?Sized> AddressLookup for &T {
    fn lookup(&self, address: &str, mode: QueryMode) -> Result<Option<Coordinate>, GeocodeError> {
        (**self).lookup(address, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_mode_wire_names() {
        assert_eq!(QueryMode::Road.as_str(), "road");
        assert_eq!(QueryMode::Parcel.to_string(), "parcel");
        assert_eq!(serde_json::to_string(&QueryMode::Parcel).unwrap(), "\"parcel\"");
    }

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(37.5665, 126.9780).is_valid());
        assert!(!Coordinate::new(126.9780, 37.5665).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }
}
