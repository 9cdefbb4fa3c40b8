//! Byte sources for the probe

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream::BoxStream};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::ProbeError;
use crate::config::ProbeConfig;

pub type ChunkStream = BoxStream<'static, Result<Bytes, ProbeError>>;

/// Opens a live FLV stream and yields its body in arbitrary chunks
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlvPuller: Send + Sync {
    async fn pull(&self, url: &Url) -> Result<ChunkStream, ProbeError>;
}

/// HTTP(S)-FLV over reqwest's streaming body
#[derive(Clone)]
pub struct HttpFlvPuller {
    client: Client,
}

impl HttpFlvPuller {
    pub fn new(config: &ProbeConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FlvPuller for HttpFlvPuller {
    async fn pull(&self, url: &Url) -> Result<ChunkStream, ProbeError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ProbeError::Connection {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Connection {
                url: url.to_string(),
                message: format!("Non-success status: {status}"),
            });
        }
        debug!("Pulling {} ({})", url, status);

        let url = url.to_string();
        Ok(response
            .bytes_stream()
            .map(move |chunk| {
                chunk.map_err(|e| ProbeError::Connection {
                    url: url.clone(),
                    message: e.to_string(),
                })
            })
            .boxed())
    }
}
