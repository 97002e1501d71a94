//! KEPCO open-data EV charger listing (bigdata.kepco.co.kr `EVcharge.do`).

use super::types::{LoadError, RawStation, StationSource};
use serde::Deserialize;

pub const DEFAULT_KEPCO_URL: &str = "https://bigdata.kepco.co.kr/openapi/v1/EVcharge.do";

/// Which page of which metro area to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub metro_code: String,
    pub page_size: u32,
    pub page_no: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            metro_code: "11".into(),
            page_size: 20,
            page_no: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Option<Vec<RawStation>>,
}

/// Parse a listing body. A body without a `data` array is malformed.
pub fn parse_listing(body: &str) -> Result<Vec<RawStation>, LoadError> {
    let parsed: ListResponse =
        serde_json::from_str(body).map_err(|e| LoadError::InvalidResponse(e.to_string()))?;
    parsed.data.ok_or(LoadError::MissingData)
}

/// Blocking client for one configured page.
pub struct KepcoClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    page: PageRequest,
}

impl KepcoClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, page: PageRequest) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("evmap/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            base_url: base_url.into(),
            api_key: api_key.into(),
            page,
        }
    }

    /// Query string for the configured page, in request order.
    pub fn query_params(&self) -> [(&'static str, String); 5] {
        [
            ("apiKey", self.api_key.clone()),
            ("returnType", "json".into()),
            ("viewCount", self.page.page_size.to_string()),
            ("pageNo", self.page.page_no.to_string()),
            ("metroCd", self.page.metro_code.clone()),
        ]
    }
}

impl StationSource for KepcoClient {
    fn fetch(&self) -> Result<Vec<RawStation>, LoadError> {
        let mut request = self.agent.get(&self.base_url);
        for (name, value) in &self.query_params() {
            request = request.query(name, value);
        }
        let response = request
            .call()
            .map_err(|e| LoadError::Network(e.to_string()))?;

        let body = response
            .into_string()
            .map_err(|e| LoadError::Network(e.to_string()))?;
        parse_listing(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing() {
        let body = r#"{"data": [
            {"metro": "서울특별시", "city": "중구", "stnPlace": "서울시청", "stnAddr": "서울특별시 중구 세종대로 110",
             "rapidCnt": 2, "slowCnt": "4", "carType": "아이오닉5, EV6"},
            {"metro": "서울특별시", "city": "강남구", "stnPlace": "코엑스", "stnAddr": "서울 강남구 영동대로 513",
             "rapidCnt": "", "slowCnt": 10, "carType": null}
        ]}"#;
        let items = parse_listing(body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].stn_place, "서울시청");
        assert_eq!(items[0].slow_cnt, 4);
        assert_eq!(items[1].rapid_cnt, 0);
        assert_eq!(items[1].car_type, "");
    }

    #[test]
    fn test_parse_listing_tolerates_bad_count() {
        let body = r#"{"data": [
            {"stnPlace": "서울시청", "stnAddr": "서울특별시 중구 세종대로 110", "rapidCnt": 2, "slowCnt": 4},
            {"stnPlace": "코엑스", "stnAddr": "서울 강남구 영동대로 513", "rapidCnt": "-", "slowCnt": "N/A"}
        ]}"#;
        let items = parse_listing(body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].rapid_cnt, 2);
        assert_eq!(items[1].stn_place, "코엑스");
        assert_eq!(items[1].rapid_cnt, 0);
        assert_eq!(items[1].slow_cnt, 0);
    }

    #[test]
    fn test_query_params() {
        let client = KepcoClient::new(
            DEFAULT_KEPCO_URL,
            "kepco-key",
            PageRequest {
                metro_code: "26".into(),
                page_size: 50,
                page_no: 3,
            },
        );
        let params = client.query_params();
        let expected = [
            ("apiKey", "kepco-key"),
            ("returnType", "json"),
            ("viewCount", "50"),
            ("pageNo", "3"),
            ("metroCd", "26"),
        ];
        assert_eq!(params.len(), expected.len());
        for ((name, value), (want_name, want_value)) in params.iter().zip(expected) {
            assert_eq!(*name, want_name);
            assert_eq!(value, want_value);
        }
    }

    #[test]
    fn test_parse_listing_empty_page() {
        assert!(parse_listing(r#"{"data": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_listing_missing_data() {
        let err = parse_listing(r#"{"errMsg": "INVALID API KEY"}"#).unwrap_err();
        assert!(matches!(err, LoadError::MissingData));
    }

    #[test]
    fn test_parse_listing_not_json() {
        assert!(matches!(parse_listing("<html/>"), Err(LoadError::InvalidResponse(_))));
    }

    #[test]
    fn test_default_page_is_seoul() {
        let page = PageRequest::default();
        assert_eq!(page.metro_code, "11");
        assert_eq!(page.page_size, 20);
        assert_eq!(page.page_no, 1);
    }
}
