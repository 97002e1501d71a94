//! Core types for station records.

use crate::geocode::Coordinate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One charging site as returned by the open-data API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStation {
    /// Metropolitan-area name or code (e.g. "서울특별시")
    #[serde(default, deserialize_with = "crate::lenient::text")]
    pub metro: String,
    #[serde(default, deserialize_with = "crate::lenient::text")]
    pub city: String,
    #[serde(default, deserialize_with = "crate::lenient::text")]
    pub stn_place: String,
    #[serde(default, deserialize_with = "crate::lenient::text")]
    pub stn_addr: String,
    #[serde(default, deserialize_with = "crate::lenient::count")]
    pub rapid_cnt: u32,
    #[serde(default, deserialize_with = "crate::lenient::count")]
    pub slow_cnt: u32,
    /// Compatible vehicle types, free text
    #[serde(default, deserialize_with = "crate::lenient::text")]
    pub car_type: String,
}

/// A station record, optionally carrying resolved coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub metro: String,
    pub city: String,
    pub place: String,
    pub address: String,
    pub rapid_count: u32,
    pub slow_count: u32,
    pub car_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
}

impl StationRecord {
    /// Attach coordinates to a raw upstream item.
    pub fn located(raw: RawStation, coord: Coordinate) -> Self {
        Self {
            lon: Some(coord.lon),
            lat: Some(coord.lat),
            ..Self::from(raw)
        }
    }

    /// Both coordinates, or nothing.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }
}

impl From<RawStation> for StationRecord {
    fn from(raw: RawStation) -> Self {
        Self {
            metro: raw.metro,
            city: raw.city,
            place: raw.stn_place,
            address: raw.stn_addr,
            rapid_count: raw.rapid_cnt,
            slow_count: raw.slow_cnt,
            car_type: raw.car_type,
            lon: None,
            lat: None,
        }
    }
}

/// Failure of the station-list fetch itself.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid station response: {0}")]
    InvalidResponse(String),

    #[error("station response has no data array")]
    MissingData,
}

/// Something that can produce one page of raw station items.
pub trait StationSource {
    fn fetch(&self) -> Result<Vec<RawStation>, LoadError>;
}

impl<T: StationSource + ?Sized> StationSource for &T {
    fn fetch(&self) -> Result<Vec<RawStation>, LoadError> {
        (**self).fetch()
    }
}
