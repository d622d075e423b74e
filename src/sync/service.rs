use crate::core::config::ClientConfig;
use crate::raster::{cache_busted_url, unix_millis};
use crate::sync::wire::{ApplyLabelsRequest, GenerateRequest, MapReply, MapResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;

/// The poster rendering service as seen by the sync controller
#[async_trait]
pub trait LabelService: Send + Sync {
    /// Renders a route into a fresh poster preview.
    async fn generate(&self, request: &GenerateRequest) -> Result<MapReply>;

    /// Re-renders the poster with label adjustments and hidden labels applied.
    async fn apply_labels(&self, request: &ApplyLabelsRequest) -> Result<MapReply>;

    /// Downloads the raster behind a `mapUrl`, bypassing any HTTP cache.
    async fn fetch_raster(&self, map_url: &str) -> Result<Vec<u8>>;
}

/// [`LabelService`] over HTTP with JSON bodies
pub struct HttpLabelService {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpLabelService {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn post_json<B: Serialize + ?Sized + Sync>(&self, url: &str, body: &B) -> Result<MapReply> {
        log::debug!("POST {url}");
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        decode_reply(status, &bytes)
    }
}

#[async_trait]
impl LabelService for HttpLabelService {
    async fn generate(&self, request: &GenerateRequest) -> Result<MapReply> {
        self.post_json(&self.config.generate_url(), request).await
    }

    async fn apply_labels(&self, request: &ApplyLabelsRequest) -> Result<MapReply> {
        self.post_json(&self.config.apply_url(), request).await
    }

    async fn fetch_raster(&self, map_url: &str) -> Result<Vec<u8>> {
        let url = cache_busted_url(
            &self.config.endpoint(map_url),
            &self.config.cache_bust_param,
            unix_millis(),
        );
        log::debug!("GET {url}");
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::service(
                Some(status.as_u16()),
                format!("Could not download the map image (status {}).", status.as_u16()),
            ));
        }
        let bytes = response.bytes().await?;
        log::info!("downloaded map image {} ({} bytes)", map_url, bytes.len());
        Ok(bytes.to_vec())
    }
}

/// Turns a raw HTTP status and body into a reply.
///
/// A body that does not parse is a serialization error on 2xx and a plain
/// service failure otherwise, since error pages are rarely JSON.
pub fn decode_reply(status: u16, body: &[u8]) -> Result<MapReply> {
    match serde_json::from_slice::<MapResponse>(body) {
        Ok(envelope) => envelope.into_reply(Some(status)),
        Err(_) if !(200..300).contains(&status) => Err(Error::service(
            Some(status),
            format!("The map service failed with status {status}."),
        )),
        Err(err) => Err(err.into()),
    }
}
