//! Shared application state: the station list, the load status and the map
//! renderer, updated together.

use crate::config::Config;
use crate::geocode::{AddressLookup, Geocoder, VWorldClient};
use crate::map::{ClusterEngine, MapRenderer, MapSnapshot};
use crate::station::{KepcoClient, LoadOutcome, LoadStatus, StationLoader, StationRecord, StationSource};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

struct Shared {
    renderer: MapRenderer,
    status: LoadStatus,
    loaded_at: Option<DateTime<Utc>>,
    skipped: usize,
}

pub struct AppState {
    shared: Mutex<Shared>,
    display_tz: Tz,
}

/// Status line as shown to clients.
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub status: LoadStatus,
    pub message: String,
    pub finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<String>,
    pub skipped: usize,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            shared: Mutex::new(Shared {
                renderer: MapRenderer::init(config.map.clone()),
                status: LoadStatus::Idle,
                loaded_at: None,
                skipped: 0,
            }),
            display_tz: config.display_zone().unwrap_or(chrono_tz::Asia::Seoul),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_status(&self, status: &LoadStatus) {
        info!(status = %status, "status");
        self.lock().status = status.clone();
    }

    /// Publish a finished load: stations, status and redraw in one step.
    pub fn apply(&self, outcome: LoadOutcome) {
        let mut shared = self.lock();
        if matches!(outcome.status, LoadStatus::Loaded(_)) {
            shared.loaded_at = Some(Utc::now());
        }
        shared.status = outcome.status;
        shared.skipped = outcome.skipped;
        shared.renderer.set_stations(outcome.stations);
        info!(status = %shared.status, "load published");
    }

    pub fn mark_ready(&self, engine: ClusterEngine) {
        self.lock().renderer.mark_ready(engine);
    }

    pub fn teardown(&self) {
        self.lock().renderer.teardown();
    }

    pub fn status(&self) -> StatusView {
        let shared = self.lock();
        StatusView {
            message: shared.status.to_string(),
            finished: shared.status.is_finished(),
            status: shared.status.clone(),
            loaded_at: shared
                .loaded_at
                .map(|t| t.with_timezone(&self.display_tz).format("%Y-%m-%d %H:%M:%S %Z").to_string()),
            skipped: shared.skipped,
        }
    }

    pub fn stations(&self) -> Arc<[StationRecord]> {
        self.lock().renderer.stations().clone()
    }

    pub fn snapshot(&self, zoom: Option<u8>) -> MapSnapshot {
        self.lock().renderer.snapshot(zoom)
    }
}

pub type HttpLoader = StationLoader<KepcoClient, VWorldClient>;

pub fn build_loader(config: &Config) -> HttpLoader {
    let source = KepcoClient::new(
        config.stations.base_url.clone(),
        config.stations.api_key.clone(),
        config.stations.page(),
    );
    let lookup = VWorldClient::new(config.geocoder.base_url.clone(), config.geocoder.api_key.clone());
    StationLoader::new(source, Geocoder::new(lookup))
}

/// Run the whole load against `state`. Blocking; one geocoding request at a time.
pub fn run_load<S: StationSource, L: AddressLookup>(state: &AppState, loader: &StationLoader<S, L>) {
    let outcome = loader.load(|status| state.set_status(status));
    state.apply(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::{Coordinate, GeocodeError, QueryMode};
    use crate::map::ClusterOptions;
    use crate::station::{LoadError, RawStation};

    struct Listing(Vec<RawStation>);

    impl StationSource for Listing {
        fn fetch(&self) -> Result<Vec<RawStation>, LoadError> {
            Ok(self.0.clone())
        }
    }

    struct Down;

    impl StationSource for Down {
        fn fetch(&self) -> Result<Vec<RawStation>, LoadError> {
            Err(LoadError::Network("connection refused".into()))
        }
    }

    /// Knows exactly two road addresses.
    struct TwoKnown;

    impl AddressLookup for TwoKnown {
        fn lookup(&self, address: &str, mode: QueryMode) -> Result<Option<Coordinate>, GeocodeError> {
            Ok(match (address, mode) {
                ("서울 중구 세종대로 110", QueryMode::Road) => Some(Coordinate::new(37.5665, 126.978)),
                ("서울 강남구 영동대로 513", QueryMode::Road) => Some(Coordinate::new(37.5116, 127.0594)),
                _ => None,
            })
        }
    }

    fn raw(place: &str, addr: &str) -> RawStation {
        RawStation {
            metro: "서울특별시".into(),
            city: String::new(),
            stn_place: place.into(),
            stn_addr: addr.into(),
            rapid_cnt: 1,
            slow_cnt: 3,
            car_type: String::new(),
        }
    }

    #[test]
    fn test_end_to_end_three_items() {
        let state = AppState::new(&Config::default());
        state.mark_ready(ClusterEngine::new(ClusterOptions::default()));

        let loader = StationLoader::new(
            Listing(vec![
                raw("시청", "서울 중구 세종대로 110 (태평로1가)"),
                raw("미상", "어딘가"),
                raw("코엑스", "서울 강남구 영동대로 513, 지하 2층"),
            ]),
            Geocoder::new(TwoKnown),
        );
        run_load(&state, &loader);

        let status = state.status();
        assert_eq!(status.status, LoadStatus::Loaded(2));
        assert_eq!(status.skipped, 1);
        assert!(status.loaded_at.is_some());

        let snap = state.snapshot(Some(18));
        assert_eq!(snap.marker_count, 2);
        assert_eq!(snap.center, Coordinate::new(37.5665, 126.978));
        assert_eq!(state.stations().len(), 2);
    }

    #[test]
    fn test_fetch_failure_reports_status_only() {
        let state = AppState::new(&Config::default());
        state.mark_ready(ClusterEngine::new(ClusterOptions::default()));
        run_load(&state, &StationLoader::new(Down, Geocoder::new(TwoKnown)));

        let status = state.status();
        assert!(status.finished);
        assert!(status.message.contains("connection refused"));
        assert!(status.loaded_at.is_none());
        assert_eq!(state.snapshot(None).marker_count, 0);
        assert_eq!(state.snapshot(None).center, Config::default().map.center);
    }

    #[test]
    fn test_data_before_readiness() {
        let state = AppState::new(&Config::default());
        let loader = StationLoader::new(Listing(vec![raw("시청", "서울 중구 세종대로 110")]), Geocoder::new(TwoKnown));
        run_load(&state, &loader);
        assert_eq!(state.snapshot(None).marker_count, 0);

        state.mark_ready(ClusterEngine::new(ClusterOptions::default()));
        assert_eq!(state.snapshot(None).marker_count, 1);
    }
}
