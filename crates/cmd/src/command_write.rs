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
use snafu::{ResultExt, Whatever, whatever};
use tracing::info;
use vmgeo_client::{LocationWrite, RestClient};
use vmgeo_common::config::{DEFAULT_EVENT_OFFSET_MS, DEFAULT_USER_ID, ENV_USER_ID};

#[derive(Debug, Clone, Args)]
#[command(
    about = "Write a single location sample",
    long_about = "Write one location sample for a user, stamped relative to now.

Examples:
  vmgeo write --longitude 116.397 --latitude 39.908
  vmgeo write --user-id 42 --longitude -122.42 --latitude 37.77 --event-offset-ms 0"
)]
pub(crate) struct WriteArgs {
    /// User the sample belongs to
    #[arg(long, env = ENV_USER_ID, default_value = DEFAULT_USER_ID)]
    pub(crate) user_id: String,

    /// Longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) longitude: f64,

    /// Latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) latitude: f64,

    /// How many milliseconds before now the observation happened
    #[arg(long, default_value_t = DEFAULT_EVENT_OFFSET_MS)]
    pub(crate) event_offset_ms: i64,
}

/// Run the write command
pub(crate) async fn run(args: WriteArgs, client: &RestClient) -> Result<(), Whatever> {
    let collect_ts = RestClient::current_timestamp_ms();
    let write = LocationWrite::new(
        args.user_id,
        event_ts_ms(collect_ts, args.event_offset_ms)?,
        collect_ts,
        args.longitude,
        args.latitude,
    );

    client
        .write_location(&write)
        .await
        .whatever_context("Write failed")?;

    info!(
        "Stored location for user {} at {}",
        write.user_id, write.event_ts_ms
    );
    println!("Write succeeded.");
    Ok(())
}

/// Event time `offset_ms` before `collect_ts`
///
/// # Errors
/// Fails when the result does not fit in the millisecond range
pub(crate) fn event_ts_ms(collect_ts: i64, offset_ms: i64) -> Result<i64, Whatever> {
    match collect_ts.checked_sub(offset_ms) {
        Some(event_ts) => Ok(event_ts),
        None => whatever!("An event offset of {offset_ms} ms cannot precede {collect_ts} ms"),
    }
}
