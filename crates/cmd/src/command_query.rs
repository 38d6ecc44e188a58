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

use clap::{Args, ValueEnum};
use snafu::{ResultExt, Whatever, whatever};
use tracing::{info, warn};
use vmgeo_client::{QueryOutcome, QueryWindow, RestClient, ValueField};
use vmgeo_common::config::{
    DEFAULT_METRIC, DEFAULT_STEP_SECS, DEFAULT_USER_ID, DEFAULT_WINDOW_SECS, ENV_USER_ID,
};

/// Coordinate the queried metric holds
#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum FieldArg {
    Longitude,
    Latitude,
}

impl From<FieldArg> for ValueField {
    fn from(arg: FieldArg) -> Self {
        match arg {
            FieldArg::Longitude => ValueField::Longitude,
            FieldArg::Latitude => ValueField::Latitude,
        }
    }
}

#[derive(Debug, Clone, Args)]
#[command(
    about = "Run a range query for one user",
    long_about = "Query the samples of one user over a trailing window ending now.

Examples:
  vmgeo query
  vmgeo query --user-id 42 --metric t_zbs_j --window-secs 3600 --step-secs 10
  vmgeo query --metric t_zbs_w --field latitude"
)]
pub(crate) struct QueryArgs {
    /// User whose samples are queried
    #[arg(long, env = ENV_USER_ID, default_value = DEFAULT_USER_ID)]
    pub(crate) user_id: String,

    /// Metric name to select
    #[arg(long, default_value = DEFAULT_METRIC)]
    pub(crate) metric: String,

    /// Length of the window ending now, in seconds
    #[arg(long, default_value_t = DEFAULT_WINDOW_SECS)]
    pub(crate) window_secs: u64,

    /// Query resolution step in seconds
    #[arg(long, default_value_t = DEFAULT_STEP_SECS)]
    pub(crate) step_secs: u64,

    /// Which coordinate the metric values are
    #[arg(long, value_enum, default_value_t = FieldArg::Longitude)]
    pub(crate) field: FieldArg,
}

/// Run the query command
pub(crate) async fn run(args: QueryArgs, client: &RestClient) -> Result<(), Whatever> {
    let end_ms = RestClient::current_timestamp_ms();
    let window = QueryWindow::builder()
        .user_id(args.user_id)
        .start_ms(window_start_ms(end_ms, args.window_secs)?)
        .end_ms(end_ms)
        .step_secs(args.step_secs)
        .metric(args.metric)
        .value_field(args.field.into())
        .build();

    let outcome = client
        .query_range(&window)
        .await
        .whatever_context("Query failed")?;

    print_samples(&outcome);
    Ok(())
}

/// Start of a window of `window_secs` ending at `end_ms`
///
/// # Errors
/// Fails when the window does not fit in the millisecond range
pub(crate) fn window_start_ms(end_ms: i64, window_secs: u64) -> Result<i64, Whatever> {
    let start_ms = i64::try_from(window_secs)
        .ok()
        .and_then(|secs| secs.checked_mul(1000))
        .and_then(|window_ms| end_ms.checked_sub(window_ms));
    match start_ms {
        Some(start_ms) => Ok(start_ms),
        None => whatever!("A window of {window_secs}s cannot end at {end_ms} ms"),
    }
}

/// Prints each sample on its own line, or a notice when there are none
pub(crate) fn print_samples(outcome: &QueryOutcome) {
    if outcome.skipped > 0 {
        warn!("{} malformed rows were skipped", outcome.skipped);
    }

    if outcome.is_empty() {
        println!("No data found.");
        return;
    }

    info!("Found {} samples", outcome.samples.len());
    for sample in &outcome.samples {
        println!(
            "{} user_id={} j={:.6} w={:.6}",
            sample.timestamp, sample.user_id, sample.longitude, sample.latitude
        );
    }
}
