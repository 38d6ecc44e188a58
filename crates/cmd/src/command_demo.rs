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

use clap::Args;
use snafu::{ResultExt, Snafu, Whatever};
use tracing::info;
use vmgeo_client::{
    ClientError, LocationWrite, QueryOutcome, QueryWindow, RestClient, Transport,
};
use vmgeo_common::config::{
    DEFAULT_EVENT_OFFSET_MS, DEFAULT_LATITUDE, DEFAULT_LONGITUDE, DEFAULT_METRIC,
    DEFAULT_STEP_SECS, DEFAULT_USER_ID, DEFAULT_WINDOW_SECS, ENV_USER_ID,
};

use crate::{
    command_query::{print_samples, window_start_ms},
    command_write::event_ts_ms,
};

#[derive(Debug, Clone, Args)]
#[command(
    about = "Write one sample, then read the recent window back",
    long_about = "Write a single location sample stamped a few seconds in the past, then query the
trailing window for the same user and print what the store returns. The query only runs if
the write succeeds.

Examples:
  vmgeo demo
  vmgeo demo --user-id 42 --longitude 116.397 --latitude 39.908
  vmgeo --store-url http://vm:8428 demo --metric t_zbs_j"
)]
pub(crate) struct DemoArgs {
    /// User the sample is written for and queried by
    #[arg(long, env = ENV_USER_ID, default_value = DEFAULT_USER_ID)]
    pub(crate) user_id: String,

    /// Longitude in degrees
    #[arg(long, default_value_t = DEFAULT_LONGITUDE, allow_hyphen_values = true)]
    pub(crate) longitude: f64,

    /// Latitude in degrees
    #[arg(long, default_value_t = DEFAULT_LATITUDE, allow_hyphen_values = true)]
    pub(crate) latitude: f64,

    /// How many milliseconds before collection the observation happened
    #[arg(long, default_value_t = DEFAULT_EVENT_OFFSET_MS)]
    pub(crate) event_offset_ms: i64,

    /// Length of the queried window ending now, in seconds
    #[arg(long, default_value_t = DEFAULT_WINDOW_SECS)]
    pub(crate) window_secs: u64,

    /// Query resolution step in seconds
    #[arg(long, default_value_t = DEFAULT_STEP_SECS)]
    pub(crate) step_secs: u64,

    /// Metric name to query
    #[arg(long, default_value = DEFAULT_METRIC)]
    pub(crate) metric: String,
}

#[derive(Debug, Snafu)]
pub(crate) enum DemoError {
    #[snafu(display("Invalid demo arguments"))]
    Args { source: Whatever },

    #[snafu(display("Write failed"))]
    Write { source: ClientError },

    #[snafu(display("Query failed"))]
    Query { source: ClientError },
}

impl DemoArgs {
    fn location_write(&self, now_ms: i64) -> Result<LocationWrite, Whatever> {
        Ok(LocationWrite::new(
            self.user_id.clone(),
            event_ts_ms(now_ms, self.event_offset_ms)?,
            now_ms,
            self.longitude,
            self.latitude,
        ))
    }

    fn query_window(&self, now_ms: i64) -> Result<QueryWindow, Whatever> {
        Ok(QueryWindow::builder()
            .user_id(self.user_id.clone())
            .start_ms(window_start_ms(now_ms, self.window_secs)?)
            .end_ms(now_ms)
            .step_secs(self.step_secs)
            .metric(self.metric.clone())
            .build())
    }
}

/// Writes the sample and, only if that succeeds, queries the window
pub(crate) async fn run_sequence<T: Transport>(
    client: &RestClient<T>,
    args: &DemoArgs,
    now_ms: i64,
) -> Result<QueryOutcome, DemoError> {
    // Both are derived up front so bad arguments never reach the store
    let write = args.location_write(now_ms).context(ArgsSnafu)?;
    let window = args.query_window(now_ms).context(ArgsSnafu)?;

    client.write_location(&write).await.context(WriteSnafu)?;
    info!("Location written for user {}", write.user_id);

    client.query_range(&window).await.context(QuerySnafu)
}

/// Run the demo command
pub(crate) async fn run(args: DemoArgs, client: &RestClient) -> Result<(), Whatever> {
    let now_ms = RestClient::current_timestamp_ms();
    let outcome = run_sequence(client, &args, now_ms)
        .await
        .whatever_context("Demo sequence failed")?;

    print_samples(&outcome);
    Ok(())
}
