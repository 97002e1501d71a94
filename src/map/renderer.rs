//! Map renderer. Owns the map view and rebuilds its marker layer whenever
//! the station list changes, once clustering is ready.
//!
//! Render:  clear overlays → new cluster group → one marker per located
//!          station → attach group → pan to first rendered station

use super::cluster::{ClusterEngine, ClusterItem};
use super::marker::Marker;
use super::view::{Layer, MapOptions, MapView};
use crate::geocode::Coordinate;
use crate::station::StationRecord;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// What one render pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderReport {
    pub removed_layers: usize,
    pub rendered: usize,
    pub excluded: usize,
}

/// Clear-and-rebuild of the marker layer on `view`.
pub fn render_stations(view: &mut MapView, engine: &ClusterEngine, stations: &[StationRecord]) -> RenderReport {
    let removed_layers = view.clear_overlays();

    let mut group = engine.group();
    let mut first: Option<Coordinate> = None;
    for station in stations {
        if let Some(marker) = Marker::for_station(station) {
            first.get_or_insert(marker.position);
            group.add_marker(marker);
        }
    }

    let rendered = group.len();
    view.add_layer(Layer::MarkerGroup(group));

    if let Some(center) = first {
        view.pan_to(center);
    }

    RenderReport {
        removed_layers,
        rendered,
        excluded: stations.len() - rendered,
    }
}

/// Serializable picture of the map at one zoom level.
#[derive(Debug, Clone, Serialize)]
pub struct MapSnapshot {
    pub ready: bool,
    pub center: Coordinate,
    pub zoom: u8,
    pub tile_url: String,
    pub marker_count: usize,
    pub items: Vec<ClusterItem>,
}

pub struct MapRenderer {
    options: MapOptions,
    view: Option<MapView>,
    engine: Option<ClusterEngine>,
    stations: Arc<[StationRecord]>,
}

impl MapRenderer {
    /// Construct the map view. Not ready until a cluster engine arrives.
    pub fn init(options: MapOptions) -> Self {
        let view = MapView::new(&options);
        Self {
            options,
            view: Some(view),
            engine: None,
            stations: Vec::<StationRecord>::new().into(),
        }
    }

    /// Destroy the map view. Later changes are accepted but not drawn.
    pub fn teardown(&mut self) {
        if self.view.take().is_some() {
            debug!("map view torn down");
        }
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    pub fn view(&self) -> Option<&MapView> {
        self.view.as_ref()
    }

    pub fn stations(&self) -> &Arc<[StationRecord]> {
        &self.stations
    }

    /// Readiness transition. Only the first engine counts.
    pub fn mark_ready(&mut self, engine: ClusterEngine) -> Option<RenderReport> {
        if self.engine.is_some() {
            return None;
        }
        info!("marker clustering ready");
        self.engine = Some(engine);
        if self.stations.is_empty() {
            return None;
        }
        self.render()
    }

    /// New station list. Redraws if ready.
    pub fn set_stations(&mut self, stations: impl Into<Arc<[StationRecord]>>) -> Option<RenderReport> {
        self.stations = stations.into();
        self.render()
    }

    /// Redraw from the current station list.
    pub fn render(&mut self) -> Option<RenderReport> {
        let engine = self.engine.as_ref()?;
        let view = self.view.as_mut()?;
        let report = render_stations(view, engine, &self.stations);
        info!(
            rendered = report.rendered,
            excluded = report.excluded,
            removed = report.removed_layers,
            center = %view.center(),
            "markers rebuilt"
        );
        Some(report)
    }

    pub fn snapshot(&self, zoom: Option<u8>) -> MapSnapshot {
        let zoom = zoom.unwrap_or_else(|| self.view.as_ref().map_or(self.options.zoom, MapView::zoom));
        let Some(view) = self.view.as_ref() else {
            return MapSnapshot {
                ready: false,
                center: self.options.center,
                zoom,
                tile_url: self.options.tile_url.clone(),
                marker_count: 0,
                items: Vec::new(),
            };
        };

        let items = if self.is_ready() {
            view.groups().flat_map(|g| g.clusters(zoom)).collect()
        } else {
            Vec::new()
        };

        MapSnapshot {
            ready: self.is_ready(),
            center: view.center(),
            zoom,
            tile_url: view.tile_url().unwrap_or(&self.options.tile_url).to_string(),
            marker_count: view.markers().count(),
            items,
        }
    }
}
