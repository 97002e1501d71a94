//! Map rendering: view, markers, clustering and the renderer that ties them
//! to the station list.

pub mod cluster;
pub mod marker;
pub mod readiness;
pub mod renderer;
pub mod view;

pub use cluster::{ClusterEngine, ClusterGroup, ClusterItem, ClusterOptions};
pub use marker::{Marker, RED_ICON};
pub use readiness::ClusterReady;
pub use renderer::{render_stations, MapRenderer, MapSnapshot, RenderReport};
pub use view::{Layer, MapOptions, MapView};
