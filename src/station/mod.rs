//! Charging-station data: upstream records, the KEPCO client, and the loader
//! that enriches records with coordinates.

pub mod kepco;
pub mod loader;
pub mod types;

pub use kepco::{KepcoClient, PageRequest};
pub use loader::{enrich, Enriched, LoadOutcome, LoadStatus, StationLoader};
pub use types::{LoadError, RawStation, StationRecord, StationSource};
