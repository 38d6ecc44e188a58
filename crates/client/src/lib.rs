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

//! vmgeo Client Library
//!
//! Writes geolocation samples to a VictoriaMetrics store over the InfluxDB
//! line protocol and reads them back through the Prometheus range query API.
//!
//! # Features
//!
//! - **Line protocol writer**: one `t_zbs` record per observation, POSTed to
//!   `/api/v2/write`
//! - **Range reader**: `/api/v1/query_range` responses decoded into typed
//!   samples, with malformed rows counted instead of failing the query
//! - **Pluggable transport**: requests go through the [`Transport`] trait, so
//!   tests can swap the HTTP stack out
//! - **Error handling**: snafu error types split into request and protocol
//!   failures
//!
//! # Examples
//!
//! ```rust,no_run
//! use vmgeo_client::{LocationWrite, QueryWindow, RestClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RestClient::new("http://localhost:8428")?;
//!     let now = RestClient::current_timestamp_ms();
//!
//!     client
//!         .write_location(&LocationWrite::new("333", now, now, 111.11, 111.11))
//!         .await?;
//!
//!     let window = QueryWindow::builder()
//!         .user_id("333")
//!         .start_ms(now - 3_600_000)
//!         .end_ms(now)
//!         .build();
//!     for sample in client.query_range(&window).await?.samples {
//!         println!("{} {}", sample.timestamp, sample.longitude);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod line_protocol;
pub mod query;
pub mod rest;
pub mod transport;
pub mod types;

// Re-export the main client types
pub use rest::RestClient;
pub use transport::{HttpReply, ReqwestTransport, Transport};
pub use types::{
    ClientError, ClientResult, ErrorKind, LocationSample, LocationWrite, QueryOutcome,
    QueryWindow, ValueField,
};
