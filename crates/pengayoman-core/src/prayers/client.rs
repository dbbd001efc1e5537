use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error};
use url::Url;

use super::{fallback_prayers, map_rows, Prayer, PrayerPage};
use crate::error::PrayerApiError;
use crate::storage::PrayerApiConfig;

/// Client for the remote prayer table.
pub struct PrayerClient {
    config: PrayerApiConfig,
    http_client: Client,
}

impl PrayerClient {
    pub fn new(config: PrayerApiConfig) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            config,
            http_client,
        }
    }

    /// `{base_url}/api/database/rows/table/{table_id}/?user_field_names=true`
    pub fn endpoint(&self) -> Result<Url, PrayerApiError> {
        let mut url = Url::parse(&self.config.base_url)?.join(&format!(
            "api/database/rows/table/{}/",
            self.config.table_id
        ))?;
        url.query_pairs_mut().append_pair("user_field_names", "true");
        Ok(url)
    }

    /// Fetch and map all prayers.
    ///
    /// # Errors
    /// Transport failures and non-success statuses.
    pub async fn fetch(&self) -> Result<Vec<Prayer>, PrayerApiError> {
        let url = self.endpoint()?;
        debug!(%url, "fetching prayers");

        let resp = self
            .http_client
            .get(url)
            .header("Authorization", format!("Token {}", self.config.token))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PrayerApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let page: PrayerPage = resp.json().await?;
        Ok(map_rows(page.results))
    }

    /// Like [`fetch`](Self::fetch), but never fails.
    pub async fn fetch_or_fallback(&self) -> Vec<Prayer> {
        match self.fetch().await {
            Ok(prayers) => prayers,
            Err(e) => {
                error!(error = %e, "error fetching prayers, using built-in list");
                fallback_prayers()
            }
        }
    }
}
