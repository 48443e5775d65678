use crate::domain::model::{RawPolygon, RegionCode, RegionFamily};
use crate::domain::ports::PolygonSource;
use crate::utils::error::{AreaError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// PC*MILER polygons API 回傳的單筆資料
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MapsPolygon {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    polygon: Option<String>,
    #[serde(default)]
    abbreviation: Option<String>,
}

/// 以 HTTP 呼叫 PC*MILER 的多邊形端點
#[derive(Debug, Clone)]
pub struct PcMilerSource {
    client: Client,
    base_url: String,
    auth_token: String,
    timeout: Option<Duration>,
}

impl PcMilerSource {
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            auth_token: auth_token.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn endpoint(&self, family: RegionFamily) -> (String, &'static str) {
        let base = self.base_url.trim_end_matches('/');
        match family {
            RegionFamily::State => (format!("{}/polygons/state", base), "states"),
            RegionFamily::Postal => (format!("{}/polygons/zip", base), "zipcodes"),
        }
    }
}

#[async_trait]
impl PolygonSource for PcMilerSource {
    async fn fetch_by_codes(
        &self,
        codes: &[RegionCode],
        family: RegionFamily,
    ) -> Result<Vec<RawPolygon>> {
        let (url, param) = self.endpoint(family);
        tracing::debug!("Making polygon request to: {} ({} codes)", url, codes.len());

        let mut request = self.client.get(&url).query(&[
            (param, codes.join(",")),
            ("authToken", self.auth_token.clone()),
        ]);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        tracing::debug!("Polygon API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(AreaError::FetchError {
                message: format!("{} returned HTTP {}", url, response.status()),
            });
        }

        let items: Vec<MapsPolygon> = response.json().await?;
        Ok(items
            .into_iter()
            .filter_map(|item| {
                // 州以縮寫對應，郵遞區號以 Code 對應
                let code = match family {
                    RegionFamily::State => item.abbreviation.or(item.code),
                    RegionFamily::Postal => item.code,
                };
                match (code, item.polygon) {
                    (Some(code), Some(polygon)) => Some(RawPolygon::new(code, polygon)),
                    _ => {
                        tracing::debug!("Skipping polygon without code or boundary: {:?}", item.name);
                        None
                    }
                }
            })
            .collect())
    }
}
