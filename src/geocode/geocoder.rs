//! Geocoder: the three-step fallback chain.
//!
//! Chain:  road(full) → parcel(full) → road(last token dropped, if > 5 chars) → absent

use super::normalize::normalize_address;
use super::types::{AddressLookup, Coordinate, QueryMode};
use tracing::{debug, instrument};

/// Truncated addresses at or below this many characters are not worth a query.
const MIN_TRUNCATED_CHARS: usize = 5;

/// Resolves cleaned addresses through a fixed fallback chain.
pub struct Geocoder<L> {
    lookup: L,
}

impl<L: AddressLookup> Geocoder<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Normalize a raw upstream address, then locate it.
    pub fn locate_raw(&self, raw_address: &str) -> Option<Coordinate> {
        let cleaned = normalize_address(raw_address);
        if cleaned.is_empty() {
            debug!(raw = raw_address, "address empty after normalization");
        }
        self.locate(&cleaned)
    }

    /// Locate an already-normalized address. Short-circuits on the first match.
    #[instrument(level = "debug", skip(self))]
    pub fn locate(&self, address: &str) -> Option<Coordinate> {
        // 1. Road address
        if let Some(coord) = self.attempt(address, QueryMode::Road) {
            return Some(coord);
        }

        // 2. Parcel address
        if let Some(coord) = self.attempt(address, QueryMode::Parcel) {
            return Some(coord);
        }

        // 3. Road address with the last token dropped
        let shortened = truncate_last_token(address);
        if shortened.chars().count() > MIN_TRUNCATED_CHARS {
            return self.attempt(&shortened, QueryMode::Road);
        }

        None
    }

    fn attempt(&self, address: &str, mode: QueryMode) -> Option<Coordinate> {
        match self.lookup.lookup(address, mode) {
            Ok(Some(coord)) => {
                debug!(%mode, address, %coord, "geocoded");
                Some(coord)
            }
            Ok(None) => {
                debug!(%mode, address, "no match");
                None
            }
            Err(e) => {
                debug!(%mode, address, error = %e, "lookup failed");
                None
            }
        }
    }
}

/// Drop the last whitespace-separated token and rejoin with single spaces.
pub fn truncate_last_token(address: &str) -> String {
    let tokens: Vec<&str> = address.split_whitespace().collect();
    match tokens.split_last() {
        Some((_, rest)) => rest.join(" "),
        None => String::new(),
    }
}
