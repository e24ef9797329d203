use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use thiserror::Error;

use super::models::Request;
use super::models::Response;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid method: {0}")]
    InvalidMethod(String),
    #[error("Network unreachable")]
    Unreachable,
}

/// Performs the real network request behind the cache
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// `request.url` is already absolute when this is called
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}

/// Fetcher backed by `reqwest`
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| NetworkError::InvalidUrl(format!("{}: {}", request.url, e)))?;
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| NetworkError::InvalidMethod(request.method.clone()))?;

        let response = self.client.request(method, url).send().await?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?;

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}
