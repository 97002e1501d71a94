//! Marker clustering.
//!
//! Greedy grid clustering in Web-Mercator pixel space: each marker joins the
//! nearest existing cluster whose seed lies within `max_cluster_radius`
//! pixels at the requested zoom, otherwise it seeds a new cluster.

use super::marker::Marker;
use crate::geocode::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;

const TILE_SIZE: f64 = 256.0;
pub const MAX_ZOOM: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterOptions {
    /// Pixels; markers closer than this to a cluster seed are merged.
    pub max_cluster_radius: f64,
    /// At or above this zoom every marker is shown individually.
    pub disable_clustering_at_zoom: u8,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            max_cluster_radius: 80.0,
            disable_clustering_at_zoom: 18,
        }
    }
}

/// The clustering capability. Constructing it precomputes the world size
/// for every zoom level; once it exists the renderer is ready.
#[derive(Debug, Clone)]
pub struct ClusterEngine {
    options: ClusterOptions,
    world_px: Vec<f64>,
}

impl ClusterEngine {
    pub fn new(options: ClusterOptions) -> Self {
        let world_px = (0..=MAX_ZOOM)
            .map(|z| TILE_SIZE * 2f64.powi(z as i32))
            .collect();
        Self { options, world_px }
    }

    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    /// A new, empty cluster-capable marker group.
    pub fn group(&self) -> ClusterGroup {
        ClusterGroup {
            engine: self.clone(),
            markers: Vec::new(),
        }
    }

    fn project(&self, coord: Coordinate, zoom: u8) -> (f64, f64) {
        let size = self.world_px[zoom.min(MAX_ZOOM) as usize];
        let lat = coord.lat.clamp(-85.051_128_78, 85.051_128_78).to_radians();
        let x = (coord.lon + 180.0) / 360.0 * size;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
        (x, y)
    }
}

/// Bounding box of a cluster's members.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl Bounds {
    fn point(c: Coordinate) -> Self {
        Self { south_west: c, north_east: c }
    }

    fn extend(&mut self, c: Coordinate) {
        self.south_west.lat = self.south_west.lat.min(c.lat);
        self.south_west.lon = self.south_west.lon.min(c.lon);
        self.north_east.lat = self.north_east.lat.max(c.lat);
        self.north_east.lon = self.north_east.lon.max(c.lon);
    }
}

/// What the map shows at one zoom level: a lone marker or an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClusterItem {
    Marker(Marker),
    Cluster {
        center: Coordinate,
        count: usize,
        bounds: Bounds,
    },
}

/// A marker layer that aggregates nearby markers at low zoom.
#[derive(Debug, Clone)]
pub struct ClusterGroup {
    engine: ClusterEngine,
    markers: Vec<Marker>,
}

struct Bucket {
    seed: (f64, f64),
    members: Vec<usize>,
}

impl ClusterGroup {
    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Group the markers for display at `zoom`.
    pub fn clusters(&self, zoom: u8) -> Vec<ClusterItem> {
        let opts = &self.engine.options;
        if zoom >= opts.disable_clustering_at_zoom || opts.max_cluster_radius <= 0.0 {
            return self.markers.iter().cloned().map(ClusterItem::Marker).collect();
        }

        let radius = opts.max_cluster_radius;
        let mut buckets: Vec<Bucket> = Vec::new();
        let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();

        for (idx, marker) in self.markers.iter().enumerate() {
            let (x, y) = self.engine.project(marker.position, zoom);
            let cell = ((x / radius).floor() as i64, (y / radius).floor() as i64);

            let mut nearest: Option<(usize, f64)> = None;
            for dx in -1..=1 {
                for dy in -1..=1 {
                    let Some(ids) = grid.get(&(cell.0 + dx, cell.1 + dy)) else {
                        continue;
                    };
                    for &b in ids {
                        let (sx, sy) = buckets[b].seed;
                        let d = ((sx - x).powi(2) + (sy - y).powi(2)).sqrt();
                        if d <= radius && nearest.map_or(true, |(_, best)| d < best) {
                            nearest = Some((b, d));
                        }
                    }
                }
            }

            match nearest {
                Some((b, _)) => buckets[b].members.push(idx),
                None => {
                    grid.entry(cell).or_default().push(buckets.len());
                    buckets.push(Bucket { seed: (x, y), members: vec![idx] });
                }
            }
        }

        buckets
            .into_iter()
            .map(|bucket| self.to_item(&bucket.members))
            .collect()
    }

    fn to_item(&self, members: &[usize]) -> ClusterItem {
        if let [only] = members {
            return ClusterItem::Marker(self.markers[*only].clone());
        }

        let first = self.markers[members[0]].position;
        let mut bounds = Bounds::point(first);
        let (mut lat_sum, mut lon_sum) = (0.0, 0.0);
        for &i in members {
            let p = self.markers[i].position;
            bounds.extend(p);
            lat_sum += p.lat;
            lon_sum += p.lon;
        }
        let n = members.len() as f64;
        ClusterItem::Cluster {
            center: Coordinate::new(lat_sum / n, lon_sum / n),
            count: members.len(),
            bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::marker::RED_ICON;
    use approx::assert_relative_eq;

    fn marker(lat: f64, lon: f64) -> Marker {
        Marker {
            position: Coordinate::new(lat, lon),
            icon: RED_ICON,
            popup_html: String::new(),
        }
    }

    fn seoul_group() -> ClusterGroup {
        let mut group = ClusterEngine::new(ClusterOptions::default()).group();
        // Three stations around City Hall, one in Gangnam
        group.add_marker(marker(37.5665, 126.9780));
        group.add_marker(marker(37.5670, 126.9790));
        group.add_marker(marker(37.5660, 126.9775));
        group.add_marker(marker(37.4979, 127.0276));
        group
    }

    fn count_of(item: &ClusterItem) -> usize {
        match item {
            ClusterItem::Marker(_) => 1,
            ClusterItem::Cluster { count, .. } => *count,
        }
    }

    #[test]
    fn test_low_zoom_merges_everything() {
        let items = seoul_group().clusters(8);
        assert_eq!(items.len(), 1);
        assert_eq!(count_of(&items[0]), 4);
    }

    #[test]
    fn test_city_zoom_separates_districts() {
        let items = seoul_group().clusters(13);
        assert_eq!(items.len(), 2);
        assert_eq!(count_of(&items[0]), 3);
        assert!(matches!(items[1], ClusterItem::Marker(_)));
    }

    #[test]
    fn test_high_zoom_disables_clustering() {
        let items = seoul_group().clusters(18);
        assert_eq!(items.len(), 4);
        assert!(items.iter().all(|i| matches!(i, ClusterItem::Marker(_))));
    }

    #[test]
    fn test_cluster_center_and_bounds() {
        let items = seoul_group().clusters(13);
        let ClusterItem::Cluster { center, bounds, .. } = &items[0] else {
            panic!("expected a cluster");
        };
        assert_relative_eq!(center.lat, 37.5665, epsilon = 1e-4);
        assert_relative_eq!(bounds.south_west.lat, 37.5660, epsilon = 1e-9);
        assert_relative_eq!(bounds.north_east.lon, 126.9790, epsilon = 1e-9);
    }

    #[test]
    fn test_counts_are_preserved() {
        let group = seoul_group();
        for zoom in 0..=MAX_ZOOM {
            let total: usize = group.clusters(zoom).iter().map(count_of).sum();
            assert_eq!(total, group.len(), "zoom {}", zoom);
        }
    }

    #[test]
    fn test_empty_group() {
        let group = ClusterEngine::new(ClusterOptions::default()).group();
        assert!(group.is_empty());
        assert!(group.clusters(12).is_empty());
    }

    #[test]
    fn test_projection_origin() {
        let engine = ClusterEngine::new(ClusterOptions::default());
        let (x, y) = engine.project(Coordinate::new(0.0, 0.0), 0);
        assert_relative_eq!(x, 128.0, epsilon = 1e-9);
        assert_relative_eq!(y, 128.0, epsilon = 1e-9);
    }
}
