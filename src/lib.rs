//! EV charging-station map: KEPCO station listing, VWorld geocoding with a
//! fallback chain, and a clustered marker map.

pub mod app;
pub mod config;
pub mod geocode;
mod lenient;
pub mod logging;
pub mod map;
pub mod server;
pub mod station;
