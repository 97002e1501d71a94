//! VWorld address geocoder (api.vworld.kr, `getcoord` v2.0).

use super::types::{AddressLookup, Coordinate, GeocodeError, QueryMode};
use serde::Deserialize;

pub const DEFAULT_VWORLD_URL: &str = "https://api.vworld.kr/req/address";

/// Sentinel the service puts in `response.status` on a match.
const STATUS_OK: &str = "OK";

// ─── Wire format ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Body,
}

#[derive(Debug, Deserialize)]
struct Body {
    status: String,
    #[serde(default)]
    result: Option<ResultBody>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ResultBody {
    point: Point,
}

#[derive(Debug, Deserialize)]
struct Point {
    #[serde(deserialize_with = "crate::lenient::float")]
    x: f64,
    #[serde(deserialize_with = "crate::lenient::float")]
    y: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Interpret a VWorld response body.
///
/// `status == "OK"` with a point is a match; `NOT_FOUND` (or any other
/// non-error status) is a miss; `ERROR` carries the service's message.
pub fn parse_response(body: &str) -> Result<Option<Coordinate>, GeocodeError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;
    interpret(envelope.response)
}

fn interpret(body: Body) -> Result<Option<Coordinate>, GeocodeError> {
    if body.status != STATUS_OK {
        if let Some(err) = body.error {
            return Err(GeocodeError::InvalidResponse(format!(
                "{}: {}",
                err.code.as_deref().unwrap_or(&body.status),
                err.text.as_deref().unwrap_or("no message"),
            )));
        }
        return Ok(None);
    }

    let point = body
        .result
        .ok_or_else(|| GeocodeError::InvalidResponse("status OK without result".into()))?
        .point;

    // x is longitude, y is latitude
    let coord = Coordinate::new(point.y, point.x);
    if !coord.is_valid() {
        return Err(GeocodeError::OutOfRange(coord));
    }
    Ok(Some(coord))
}

// ─── Client ─────────────────────────────────────────────────────

/// Blocking VWorld client. One request per `lookup`, transport-default timeouts.
pub struct VWorldClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl VWorldClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("evmap/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

impl VWorldClient {
    /// Query string for one `getcoord` call, in request order.
    pub fn query_params(&self, address: &str, mode: QueryMode) -> [(&'static str, String); 10] {
        [
            ("service", "address".into()),
            ("request", "getcoord".into()),
            ("version", "2.0".into()),
            ("crs", "epsg:4326".into()),
            ("address", address.into()),
            ("refine", "true".into()),
            ("simple", "false".into()),
            ("format", "json".into()),
            ("type", mode.as_str().into()),
            ("key", self.api_key.clone()),
        ]
    }
}

impl AddressLookup for VWorldClient {
    fn lookup(&self, address: &str, mode: QueryMode) -> Result<Option<Coordinate>, GeocodeError> {
        let mut request = self.agent.get(&self.base_url);
        for (name, value) in &self.query_params(address, mode) {
            request = request.query(name, value);
        }
        let response = request
            .call()
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        let envelope: Envelope = response
            .into_json()
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;
        interpret(envelope.response)
    }
}
