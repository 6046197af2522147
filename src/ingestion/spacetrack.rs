use log::debug;
use serde::Deserialize;

use super::error::IngestionError;
use super::omm::OmmRecord;

#[derive(Debug, Clone, Deserialize)]
pub struct SpaceTrackConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn default_base_url() -> String {
    "https://www.space-track.org".to_string()
}

impl Default for SpaceTrackConfig {
    fn default() -> Self {
        SpaceTrackConfig {
            base_url: default_base_url(),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// Cookie-authenticated Space-Track client. Each fetch logs in first; the
/// session cookie lives in the client's cookie store for the follow-up
/// catalog query.
pub struct SpaceTrackClient {
    http: reqwest::Client,
    config: SpaceTrackConfig,
}

/// Current element sets for everything on orbit, newest epoch per object.
const CATALOG_QUERY: &str =
    "/basicspacedata/query/class/gp/decay_date/null-val/epoch/%3Enow-30/orderby/norad_cat_id/format/json";

impl SpaceTrackClient {
    pub fn new(config: SpaceTrackConfig) -> Result<Self, IngestionError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(SpaceTrackClient { http, config })
    }

    pub async fn fetch_catalog(&self) -> Result<Vec<OmmRecord>, IngestionError> {
        self.login().await?;

        let url = format!("{}{}", self.config.base_url, CATALOG_QUERY);
        debug!("Fetching catalog from {}", url);
        let records: Vec<OmmRecord> = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("Fetched {} catalog records", records.len());
        Ok(records)
    }

    async fn login(&self) -> Result<(), IngestionError> {
        let url = format!("{}/ajaxauth/login", self.config.base_url);
        self.http
            .post(&url)
            .form(&[
                ("identity", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
