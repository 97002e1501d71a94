use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::app::{AppState, StatusView};
use crate::map::cluster::MAX_ZOOM;
use crate::map::MapSnapshot;
use crate::station::StationRecord;

use super::static_files;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── Static file handlers ────────────────────────────────────────

pub async fn index() -> Html<&'static str> {
    Html(static_files::INDEX_HTML)
}

pub async fn style() -> Response {
    (
        [(header::CONTENT_TYPE, "text/css")],
        static_files::STYLE_CSS,
    )
        .into_response()
}

pub async fn script() -> Response {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        static_files::APP_JS,
    )
        .into_response()
}

// ─── GET /api/status ─────────────────────────────────────────────

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusView> {
    Json(state.status())
}

// ─── GET /api/stations ───────────────────────────────────────────

#[derive(Serialize)]
pub struct StationsResponse {
    pub count: usize,
    pub stations: Vec<StationRecord>,
}

pub async fn stations(State(state): State<Arc<AppState>>) -> Json<StationsResponse> {
    let stations = state.stations();
    Json(StationsResponse {
        count: stations.len(),
        stations: stations.to_vec(),
    })
}

// ─── GET /api/map ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct MapQuery {
    pub zoom: Option<String>,
}

#[derive(Serialize)]
pub struct MapResponse {
    #[serde(flatten)]
    pub map: MapSnapshot,
    pub status: StatusView,
}

pub async fn map_view(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MapQuery>,
) -> Result<Json<MapResponse>, ApiError> {
    let start = Instant::now();

    let zoom = parse_zoom(params.zoom.as_deref())?;

    let map = state.snapshot(zoom);
    let status = state.status();

    info!(
        zoom = map.zoom,
        items = map.items.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/map"
    );

    Ok(Json(MapResponse { map, status }))
}

// ─── Helpers ─────────────────────────────────────────────────────

fn parse_zoom(raw: Option<&str>) -> Result<Option<u8>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<u8>() {
        Ok(z) if z <= MAX_ZOOM => Ok(Some(z)),
        _ => Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid zoom '{}'. Use 0..={}", raw, MAX_ZOOM),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::geocode::Coordinate;
    use crate::map::{ClusterEngine, ClusterOptions};
    use crate::station::{LoadOutcome, LoadStatus};

    fn located(place: &str, lat: f64, lon: f64) -> StationRecord {
        StationRecord {
            metro: "서울특별시".into(),
            city: "중구".into(),
            place: place.into(),
            address: String::new(),
            rapid_count: 0,
            slow_count: 2,
            car_type: String::new(),
            lat: Some(lat),
            lon: Some(lon),
        }
    }

    fn loaded_state() -> Arc<AppState> {
        let state = Arc::new(AppState::new(&Config::default()));
        state.mark_ready(ClusterEngine::new(ClusterOptions::default()));
        state.apply(LoadOutcome {
            stations: vec![located("A", 37.5665, 126.978), located("B", 37.4979, 127.0276)],
            status: LoadStatus::Loaded(2),
            skipped: 0,
        });
        state
    }

    #[tokio::test]
    async fn test_status_handler() {
        let state = Arc::new(AppState::new(&Config::default()));
        let Json(view) = status(State(state)).await;
        assert_eq!(view.status, LoadStatus::Idle);
        assert!(!view.finished);
    }

    #[tokio::test]
    async fn test_stations_handler() {
        let Json(resp) = stations(State(loaded_state())).await;
        assert_eq!(resp.count, 2);
        assert_eq!(resp.stations[0].place, "A");
    }

    #[tokio::test]
    async fn test_map_handler_clusters_by_zoom() {
        let state = loaded_state();

        let Ok(Json(low)) = map_view(State(Arc::clone(&state)), Query(MapQuery { zoom: Some("8".into()) })).await else {
            panic!("expected map");
        };
        assert!(low.map.ready);
        assert_eq!(low.map.items.len(), 1);
        assert_eq!(low.map.center, Coordinate::new(37.5665, 126.978));

        let Ok(Json(high)) = map_view(State(state), Query(MapQuery { zoom: Some("15".into()) })).await else {
            panic!("expected map");
        };
        assert_eq!(high.map.items.len(), 2);
        assert_eq!(high.status.status, LoadStatus::Loaded(2));
    }

    #[tokio::test]
    async fn test_map_handler_rejects_zoom() {
        for bad in ["30", "300", "abc", "-1"] {
            let result = map_view(State(loaded_state()), Query(MapQuery { zoom: Some(bad.into()) })).await;
            let response = match result {
                Err(e) => e.into_response(),
                Ok(_) => panic!("expected error for zoom={}", bad),
            };
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
                Some("application/json")
            );
        }
    }

    #[test]
    fn test_parse_zoom() {
        assert_eq!(parse_zoom(None).ok(), Some(None));
        assert_eq!(parse_zoom(Some("")).ok(), Some(None));
        assert_eq!(parse_zoom(Some(" 14 ")).ok(), Some(Some(14)));
        assert!(parse_zoom(Some("21")).is_err());
    }
}
