//! Address-to-coordinate resolution.
//!
//! Flow:  normalize → road query → parcel query → truncated road query → absent

pub mod geocoder;
pub mod normalize;
pub mod types;
pub mod vworld;

pub use geocoder::{truncate_last_token, Geocoder};
pub use normalize::normalize_address;
pub use types::{AddressLookup, Coordinate, GeocodeError, QueryMode};
pub use vworld::VWorldClient;
