// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use snafu::ResultExt;
use tracing::debug;
use url::Url;

use crate::types::{ClientResult, HttpSnafu};

/// Status and body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body:   String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// The two HTTP exchanges the client needs from the store.
///
/// Implementations return `Err` only when no response was obtained; any
/// status code, including errors, comes back as an [`HttpReply`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs `body` to `url` with `Content-Type: text/plain`
    async fn post_text(&self, url: Url, body: String) -> ClientResult<HttpReply>;

    /// GETs `url`
    async fn get(&self, url: Url) -> ClientResult<HttpReply>;
}

/// [`Transport`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport, optionally with a per-request timeout.
    ///
    /// # Errors
    /// Returns `ClientError::Http` if the underlying client cannot be built
    pub fn new(timeout: Option<Duration>) -> ClientResult<Self> {
        // Create HTTP client with no proxy to avoid proxy issues with localhost
        let mut builder = Client::builder().no_proxy();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context(HttpSnafu)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_text(&self, url: Url, body: String) -> ClientResult<HttpReply> {
        debug!("Sending POST request to: {}", url);
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await
            .context(HttpSnafu)?;

        let status = response.status().as_u16();
        // The status alone decides the write outcome; an unreadable body is left empty
        let body = response.text().await.unwrap_or_default();
        Ok(HttpReply { status, body })
    }

    async fn get(&self, url: Url) -> ClientResult<HttpReply> {
        debug!("Sending GET request to: {}", url);
        let response = self.client.get(url).send().await.context(HttpSnafu)?;

        let status = response.status().as_u16();
        let body = response.text().await.context(HttpSnafu)?;
        Ok(HttpReply { status, body })
    }
}
