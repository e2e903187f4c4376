// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! HTTP transport backed by reqwest

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::{Client as HttpClient, Method};
use tracing::debug;
use url::Url;

use crate::network_config::NetworkConfig;
use crate::transport::{Transport, TransportError, TransportResponse};

/// [`Transport`] that talks to Kibana over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: HttpClient,
    base_url: Url,
    default_headers: HeaderMap,
}

impl HttpTransport {
    /// Create a new transport from network settings
    pub fn new(config: &NetworkConfig) -> Result<Self, TransportError> {
        let mut base_url = Url::parse(&config.url)?;
        // Keep any Kibana base path when joining endpoint paths onto it
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http_client = HttpClient::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            default_headers: config.default_headers()?,
        })
    }

    /// Create a transport from a base URL string with default settings
    pub fn from_url(base_url: &str) -> Result<Self, TransportError> {
        Self::new(&NetworkConfig::new(base_url))
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, path: &str, query: &[(String, String)]) -> Result<Url, TransportError> {
        let mut url = self.base_url.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<TransportResponse, TransportError> {
        let url = self.resolve(path, query)?;
        debug!(%method, %url, "sending request");

        let mut request = self
            .http_client
            .request(method, url)
            .headers(self.default_headers.clone())
            .headers(headers);

        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(%status, "received response");

        let body = response.bytes_stream().map(|chunk| chunk.map_err(TransportError::from)).boxed();
        Ok(TransportResponse::new(status, body))
    }
}
