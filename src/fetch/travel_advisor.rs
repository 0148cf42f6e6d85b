//! Travel Advisor (RapidAPI) places fetcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::PlacesFetcher;
use crate::types::config::UpstreamConfig;
use crate::types::{LatLng, Place, QueryType};
use crate::{PlacegateError, PlacegateResult};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HotelsRequest {
    bounding_box: BoundingBox,
    update_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BoundingBox {
    north_east_corner: Corner,
    south_west_corner: Corner,
}

#[derive(Serialize)]
struct Corner {
    latitude: f64,
    longitude: f64,
}

impl From<LatLng> for Corner {
    fn from(p: LatLng) -> Self {
        Self {
            latitude: p.lat,
            longitude: p.lng,
        }
    }
}

/// Fetcher for the Travel Advisor API.
///
/// Hotels use the POST `hotels/v2/list` endpoint, which nests places under
/// `data.data`; every other type uses GET `{type}/list-in-boundary` with the
/// places under `data`.
pub struct TravelAdvisorFetcher {
    client: Client,
    base_url: String,
    api_host: String,
    api_key: String,
}

impl TravelAdvisorFetcher {
    /// Creates a fetcher from configuration.
    ///
    /// Fails when no API key is configured or set in the environment.
    pub fn from_config(config: &UpstreamConfig) -> PlacegateResult<Self> {
        Self::with_api_key(config, config.resolved_api_key())
    }

    /// Creates a fetcher using `api_key` instead of the configured one.
    pub fn with_api_key(config: &UpstreamConfig, api_key: Option<String>) -> PlacegateResult<Self> {
        let api_key = api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            PlacegateError::config(format!(
                "no upstream API key: set upstream.api_key or {}",
                crate::types::config::API_KEY_ENV
            ))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_host: config.api_host.clone(),
            api_key,
        })
    }

    fn hotels_url(&self) -> String {
        format!(
            "{}/hotels/v2/list?currency=USD&units=km&lang=en_US",
            self.base_url
        )
    }

    fn boundary_url(&self, query_type: &QueryType) -> String {
        format!("{}/{}/list-in-boundary", self.base_url, query_type)
    }

    async fn fetch_hotels(&self, sw: LatLng, ne: LatLng) -> PlacegateResult<Value> {
        let body = HotelsRequest {
            bounding_box: BoundingBox {
                north_east_corner: ne.into(),
                south_west_corner: sw.into(),
            },
            update_token: String::new(),
        };

        let response = self
            .client
            .post(self.hotels_url())
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    async fn fetch_in_boundary(
        &self,
        query_type: &QueryType,
        sw: LatLng,
        ne: LatLng,
    ) -> PlacegateResult<Value> {
        let response = self
            .client
            .get(self.boundary_url(query_type))
            .query(&[
                ("bl_latitude", sw.lat),
                ("bl_longitude", sw.lng),
                ("tr_longitude", ne.lng),
                ("tr_latitude", ne.lat),
            ])
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

/// Pulls the place array out of a response body. A missing array means no places.
fn extract_places(body: &Value, query_type: &QueryType) -> Vec<Place> {
    let list = match query_type {
        QueryType::Hotels => body.pointer("/data/data"),
        _ => body.get("data"),
    };

    list.and_then(Value::as_array)
        .map(|items| items.iter().cloned().map(Place::new).collect())
        .unwrap_or_default()
}

#[async_trait]
impl PlacesFetcher for TravelAdvisorFetcher {
    fn name(&self) -> &str {
        "travel-advisor"
    }

    async fn fetch_places(
        &self,
        query_type: &QueryType,
        sw: LatLng,
        ne: LatLng,
    ) -> PlacegateResult<Vec<Place>> {
        tracing::debug!(query_type = %query_type, "Fetching places from upstream");

        let body = match query_type {
            QueryType::Hotels => self.fetch_hotels(sw, ne).await?,
            _ => self.fetch_in_boundary(query_type, sw, ne).await?,
        };

        Ok(extract_places(&body, query_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fetcher() -> TravelAdvisorFetcher {
        let config = UpstreamConfig {
            api_key: "test-key".to_string(),
            base_url: "https://example.test/".to_string(),
            ..UpstreamConfig::default()
        };
        TravelAdvisorFetcher::from_config(&config).unwrap()
    }

    #[test]
    fn test_urls() {
        let f = fetcher();
        assert_eq!(
            f.hotels_url(),
            "https://example.test/hotels/v2/list?currency=USD&units=km&lang=en_US"
        );
        assert_eq!(
            f.boundary_url(&QueryType::Restaurants),
            "https://example.test/restaurants/list-in-boundary"
        );
    }

    #[test]
    fn test_hotels_body_shape() {
        let body = HotelsRequest {
            bounding_box: BoundingBox {
                north_east_corner: LatLng::new(2.0, 3.0).into(),
                south_west_corner: LatLng::new(1.0, 0.5).into(),
            },
            update_token: String::new(),
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["boundingBox"]["northEastCorner"]["latitude"], 2.0);
        assert_eq!(value["boundingBox"]["southWestCorner"]["longitude"], 0.5);
        assert_eq!(value["updateToken"], "");
    }

    #[test]
    fn test_extract_places() {
        let body = json!({"data": [{"name": "A"}, {"name": "B"}]});
        assert_eq!(extract_places(&body, &QueryType::Restaurants).len(), 2);

        let body = json!({"data": {"data": [{"name": "H"}]}});
        assert_eq!(extract_places(&body, &QueryType::Hotels).len(), 1);

        let body = json!({"errors": ["nope"]});
        assert!(extract_places(&body, &QueryType::Attractions).is_empty());
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let config = UpstreamConfig {
            api_key: " ".to_string(),
            ..UpstreamConfig::default()
        };
        let result = TravelAdvisorFetcher::with_api_key(&config, config.resolve_api_key(None));
        assert!(matches!(result, Err(PlacegateError::Config(_))));

        let result = TravelAdvisorFetcher::with_api_key(&config, Some("  ".to_string()));
        assert!(matches!(result, Err(PlacegateError::Config(_))));
    }

    #[test]
    fn test_explicit_key_builds_fetcher() {
        let config = UpstreamConfig {
            base_url: "http://localhost:9/".to_string(),
            ..UpstreamConfig::default()
        };
        let fetcher = TravelAdvisorFetcher::with_api_key(&config, Some("k".to_string())).unwrap();
        assert_eq!(fetcher.api_key, "k");
        assert_eq!(fetcher.base_url, "http://localhost:9");
    }
}
