use crate::domain::model::{PointOfInterest, SearchQuery};
use crate::domain::ports::{ConfigProvider, PlacesProvider};
use crate::utils::error::Result;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://atlas.mappls.com/api/places/search/json";
pub const REST_KEY_HEADER: &str = "X-Mappls-REST-Key";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default, rename = "suggestedLocations")]
    suggested_locations: Vec<RawLocation>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    #[serde(default, rename = "placeName")]
    place_name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    latitude: f64,
    #[serde(default)]
    longitude: f64,
}

/// Mappls 地點搜尋客戶端
pub struct MapplsClient<C: ConfigProvider> {
    config: C,
    client: Client,
    tag_re: Regex,
    ws_re: Regex,
}

impl<C: ConfigProvider> MapplsClient<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            client: Client::new(),
            tag_re: Regex::new(r"<[^>]+>").expect("valid tag pattern"),
            ws_re: Regex::new(r"\s+").expect("valid whitespace pattern"),
        }
    }

    // 清掉上游偶爾夾帶的 HTML 標籤與多餘空白
    fn clean_text(&self, raw: &str) -> String {
        let stripped = self.tag_re.replace_all(raw, " ");
        self.ws_re.replace_all(stripped.trim(), " ").into_owned()
    }

    fn map_location(&self, raw: RawLocation) -> PointOfInterest {
        PointOfInterest {
            name: self.clean_text(&raw.place_name),
            address: self.clean_text(&raw.address),
            latitude: raw.latitude,
            longitude: raw.longitude,
        }
    }
}

#[async_trait]
impl<C: ConfigProvider> PlacesProvider for MapplsClient<C> {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<PointOfInterest>> {
        let location = format!("{},{}", query.center_latitude, query.center_longitude);
        let radius = query.radius_meters.to_string();

        tracing::debug!(
            "📡 Searching '{}' around {} within {}m",
            query.category,
            location,
            query.radius_meters
        );

        // 構建請求：query/location/radius 走查詢參數，金鑰走標頭
        let response = self
            .client
            .get(self.config.endpoint())
            .header(REST_KEY_HEADER, self.config.api_key())
            .query(&[
                ("query", query.category.as_str()),
                ("location", location.as_str()),
                ("radius", radius.as_str()),
            ])
            .timeout(Duration::from_secs(self.config.timeout_seconds()))
            .send()
            .await?;

        tracing::debug!("API response status: {}", response.status());
        let response = response.error_for_status()?;

        // 缺少 suggestedLocations 欄位時視為空清單
        let body: SearchResponse = response.json().await?;
        let pois: Vec<PointOfInterest> = body
            .suggested_locations
            .into_iter()
            .map(|raw| self.map_location(raw))
            .collect();

        tracing::debug!("📊 '{}' returned {} POIs", query.category, pois.len());
        Ok(pois)
    }
}
