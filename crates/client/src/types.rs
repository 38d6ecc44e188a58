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

use bon::Builder;
use serde::{Deserialize, Serialize};
use snafu::Snafu;

/// Metric a [`QueryWindow`] built without `.metric(..)` queries
pub const BUILDER_DEFAULT_METRIC: &str = "j";

/// Step of a [`QueryWindow`] built without `.step_secs(..)`, in seconds.
///
/// This is a fine-grained library fallback. The `vmgeo` binary always sets
/// the step explicitly and defaults it to 8 640 000 s, one point per window.
pub const BUILDER_DEFAULT_STEP_SECS: u64 = 10;

/// Common result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Coarse classification of a [`ClientError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not be built or never got a response
    Request,
    /// The store answered, but not with what was expected
    Protocol,
}

/// Client error types
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ClientError {
    /// HTTP request error
    #[snafu(display("HTTP error: {source}"))]
    Http { source: reqwest::Error },

    /// Transport failure reported by a non-reqwest transport
    #[snafu(display("Transport error: {message}"))]
    Transport { message: String },

    /// URL parsing error
    #[snafu(display("Invalid URL: {source}"))]
    InvalidUrl { source: url::ParseError },

    /// Invalid argument error
    #[snafu(display("Invalid argument: {message}"))]
    InvalidArgument { message: String },

    /// The write endpoint answered with something other than 204
    #[snafu(display("Write failed with status {status}: {body}"))]
    WriteRejected { status: u16, body: String },

    /// The query response body was not the expected JSON
    #[snafu(display("JSON error: {source}"))]
    Json { source: serde_json::Error },

    /// The query response reported a non-success status
    #[snafu(display("Query failed ({error_type}): {message}"))]
    QueryFailed { error_type: String, message: String },
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Http { .. }
            | ClientError::Transport { .. }
            | ClientError::InvalidUrl { .. }
            | ClientError::InvalidArgument { .. } => ErrorKind::Request,
            ClientError::WriteRejected { .. }
            | ClientError::Json { .. }
            | ClientError::QueryFailed { .. } => ErrorKind::Protocol,
        }
    }
}

/// A single geolocation observation read back from the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationSample {
    /// The user the observation belongs to
    pub user_id:   String,
    /// Longitude in degrees
    pub longitude: f64,
    /// Latitude in degrees
    pub latitude:  f64,
    /// Timestamp in milliseconds since Unix epoch
    pub timestamp: i64,
}

/// A geolocation observation to be written to the store
#[derive(Debug, Clone, PartialEq)]
pub struct LocationWrite {
    pub user_id:       String,
    /// When the observation happened, in milliseconds since Unix epoch
    pub event_ts_ms:   i64,
    /// When the observation was collected, in milliseconds since Unix epoch.
    /// Not part of the encoded record.
    pub collect_ts_ms: i64,
    pub longitude:     f64,
    pub latitude:      f64,
}

impl LocationWrite {
    pub fn new(
        user_id: impl Into<String>,
        event_ts_ms: i64,
        collect_ts_ms: i64,
        longitude: f64,
        latitude: f64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            event_ts_ms,
            collect_ts_ms,
            longitude,
            latitude,
        }
    }
}

/// Which coordinate of a decoded sample the series value is stored in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueField {
    #[default]
    Longitude,
    Latitude,
}

/// Parameters of one range query
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct QueryWindow {
    #[builder(into)]
    pub user_id:     String,
    /// Window start in milliseconds since Unix epoch
    pub start_ms:    i64,
    /// Window end in milliseconds since Unix epoch
    pub end_ms:      i64,
    #[builder(default = BUILDER_DEFAULT_STEP_SECS)]
    pub step_secs:   u64,
    #[builder(into, default = BUILDER_DEFAULT_METRIC.to_owned())]
    pub metric:      String,
    #[builder(default)]
    pub value_field: ValueField,
}

/// Result of a range query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    /// Decoded samples, in the order the store returned them
    pub samples: Vec<LocationSample>,
    /// Number of value rows that could not be decoded and were dropped
    pub skipped: usize,
}

impl QueryOutcome {
    pub fn is_empty(&self) -> bool { self.samples.is_empty() }
}
