//! The map view: center, zoom and the stack of attached layers.

use super::cluster::ClusterGroup;
use super::marker::Marker;
use crate::geocode::Coordinate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// How a fresh map view is set up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Initial center (Seoul City Hall by default)
    pub center: Coordinate,
    pub zoom: u8,
    pub tile_url: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: Coordinate::new(37.5665, 126.9780),
            zoom: 12,
            tile_url: DEFAULT_TILE_URL.into(),
        }
    }
}

/// Anything attached to the map.
#[derive(Debug, Clone)]
pub enum Layer {
    Tiles(String),
    Marker(Marker),
    MarkerGroup(ClusterGroup),
}

impl Layer {
    /// Markers and marker groups are overlays; tiles are the base map.
    pub fn is_overlay(&self) -> bool {
        matches!(self, Self::Marker(_) | Self::MarkerGroup(_))
    }
}

#[derive(Debug)]
pub struct MapView {
    center: Coordinate,
    zoom: u8,
    layers: Vec<Layer>,
}

impl MapView {
    pub fn new(options: &MapOptions) -> Self {
        Self {
            center: options.center,
            zoom: options.zoom,
            layers: vec![Layer::Tiles(options.tile_url.clone())],
        }
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn pan_to(&mut self, center: Coordinate) {
        self.center = center;
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Detach every marker and marker group. Returns how many layers went.
    pub fn clear_overlays(&mut self) -> usize {
        let before = self.layers.len();
        self.layers.retain(|l| !l.is_overlay());
        before - self.layers.len()
    }

    pub fn tile_url(&self) -> Option<&str> {
        self.layers.iter().find_map(|l| match l {
            Layer::Tiles(url) => Some(url.as_str()),
            _ => None,
        })
    }

    /// Every marker on the map, loose or grouped.
    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.layers.iter().flat_map(|l| layer_markers(l).iter())
    }

    pub fn groups(&self) -> impl Iterator<Item = &ClusterGroup> {
        self.layers.iter().filter_map(|l| match l {
            Layer::MarkerGroup(g) => Some(g),
            _ => None,
        })
    }
}

fn layer_markers(layer: &Layer) -> &[Marker] {
    match layer {
        Layer::Tiles(_) => &[],
        Layer::Marker(m) => std::slice::from_ref(m),
        Layer::MarkerGroup(g) => g.markers(),
    }
}
