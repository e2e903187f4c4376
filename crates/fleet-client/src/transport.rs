// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Transport seam between commands and the network
//!
//! Commands talk to Fleet through [`Transport`] so that they can run against
//! the real HTTP stack ([`crate::HttpTransport`]) or an in-memory double in
//! tests. A [`TransportResponse`] owns its body stream; reading it with
//! [`TransportResponse::into_bytes`] or dropping the response releases the
//! underlying connection.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while exchanging a request with the remote service
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Connection failed: {0}")]
    Connection(String),
}

/// Streamed response body
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Status code plus a readable body
pub struct TransportResponse {
    status: StatusCode,
    body: BodyStream,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: BodyStream) -> Self {
        Self { status, body }
    }

    /// Build a response whose body is already in memory
    pub fn from_bytes(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let body: Bytes = body.into();
        Self::new(status, stream::once(async move { Ok(body) }).boxed())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Read the whole body, consuming the response
    pub async fn into_bytes(self) -> Result<Bytes, TransportError> {
        let mut body = self.body;
        let mut buf = BytesMut::new();
        while let Some(chunk) = body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Capability to perform one HTTP exchange
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `body` to `path` with the given method, query parameters and headers
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<TransportResponse, TransportError> {
        (**self).send(method, path, query, headers, body).await
    }
}
