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

use snafu::{ResultExt, ensure};
use tracing::{debug, info};
use url::Url;

use crate::{
    line_protocol,
    query,
    transport::{ReqwestTransport, Transport},
    types::{
        ClientError, ClientResult, InvalidArgumentSnafu, InvalidUrlSnafu, LocationWrite,
        QueryOutcome, QueryWindow,
    },
};

/// Line protocol ingestion endpoint
pub const WRITE_PATH: &str = "api/v2/write";

/// Prometheus range query endpoint
pub const QUERY_RANGE_PATH: &str = "api/v1/query_range";

/// REST client for writing and reading location samples
///
/// # Examples
///
/// ```rust,no_run
/// use vmgeo_client::{LocationWrite, QueryWindow, RestClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = RestClient::new("http://localhost:8428")?;
///     let now = RestClient::current_timestamp_ms();
///
///     // Store one observation
///     let write = LocationWrite::new("333", now - 10_000, now, 111.11, 111.11);
///     client.write_location(&write).await?;
///
///     // Read the last three hours back
///     let window = QueryWindow::builder()
///         .user_id("333")
///         .start_ms(now - 10_800_000)
///         .end_ms(now)
///         .build();
///     let outcome = client.query_range(&window).await?;
///     println!("Found {} samples", outcome.samples.len());
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RestClient<T = ReqwestTransport> {
    /// The HTTP transport
    transport: T,
    /// Base URL for the store, always ending in `/`
    base_url:  Url,
}

impl RestClient<ReqwestTransport> {
    /// Creates a new REST client for the store at `base_url`
    ///
    /// # Errors
    /// Returns a `ClientError` if the base URL is invalid
    pub fn new<S: AsRef<str>>(base_url: S) -> ClientResult<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Creates a new REST client whose requests give up after `timeout`
    pub fn with_timeout<S: AsRef<str>>(
        base_url: S,
        timeout: Option<Duration>,
    ) -> ClientResult<Self> {
        info!("Creating REST client for {}", base_url.as_ref());
        let transport = ReqwestTransport::new(timeout)?;
        Self::with_transport(base_url, transport)
    }

    /// Gets the current timestamp in milliseconds since Unix epoch
    pub fn current_timestamp_ms() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

impl<T: Transport> RestClient<T> {
    /// Creates a client that sends its requests through `transport`
    ///
    /// # Errors
    /// Returns `ClientError::InvalidUrl` if the base URL cannot be parsed
    pub fn with_transport<S: AsRef<str>>(base_url: S, transport: T) -> ClientResult<Self> {
        let mut base_url = Url::parse(base_url.as_ref()).context(InvalidUrlSnafu)?;
        ensure!(
            !base_url.cannot_be_a_base(),
            InvalidArgumentSnafu {
                message: format!("'{base_url}' cannot be used as a base URL"),
            }
        );

        // Keep any path prefix when joining endpoint paths
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            transport,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url { &self.base_url }

    pub fn transport(&self) -> &T { &self.transport }

    /// Writes one location observation as a line protocol record
    ///
    /// # Errors
    /// Returns `ClientError::InvalidArgument` for non-finite coordinates,
    /// `ClientError::Http` on transport failure and
    /// `ClientError::WriteRejected` unless the store answers 204 No Content
    pub async fn write_location(&self, write: &LocationWrite) -> ClientResult<()> {
        debug!(
            "Writing location for user: {}, event_ts: {}, collect_ts: {}, j: {}, w: {}",
            write.user_id, write.event_ts_ms, write.collect_ts_ms, write.longitude, write.latitude
        );

        let line = line_protocol::encode(write)?;
        debug!("Line protocol record: {}", line.trim_end());

        let url = self.endpoint(WRITE_PATH)?;
        let reply = self.transport.post_text(url, line).await?;
        debug!("Write response status: {}", reply.status);

        if reply.status == 204 {
            debug!("Successfully stored location");
            Ok(())
        } else {
            Err(ClientError::WriteRejected {
                status: reply.status,
                body:   reply.body,
            })
        }
    }

    /// Runs a range query and decodes the returned samples
    ///
    /// # Errors
    /// Returns `ClientError::InvalidArgument` for an inverted window or a zero
    /// step, `ClientError::Http` on transport failure, `ClientError::Json` if
    /// the body cannot be decoded and `ClientError::QueryFailed` if the store
    /// reports an error
    pub async fn query_range(&self, window: &QueryWindow) -> ClientResult<QueryOutcome> {
        debug!(
            "Querying metric: {} for user: {}, window: [{}, {}] ms, step: {}s",
            window.metric, window.user_id, window.start_ms, window.end_ms, window.step_secs
        );

        ensure!(
            window.start_ms <= window.end_ms,
            InvalidArgumentSnafu {
                message: format!(
                    "Window start {} is after end {}",
                    window.start_ms, window.end_ms
                ),
            }
        );
        ensure!(
            window.step_secs > 0,
            InvalidArgumentSnafu {
                message: "Step must be positive",
            }
        );

        let mut url = self.endpoint(QUERY_RANGE_PATH)?;
        {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in query::range_params(window) {
                query_pairs.append_pair(key, &value);
            }
        }

        let reply = self.transport.get(url).await?;
        debug!("Query response status: {}, body: {}", reply.status, reply.body);

        let outcome = query::decode(&reply.body, window)?;
        info!(
            "Query returned {} samples ({} rows skipped)",
            outcome.samples.len(),
            outcome.skipped
        );
        Ok(outcome)
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url.join(path).context(InvalidUrlSnafu)
    }
}
