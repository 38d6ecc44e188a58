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

use clap::{Args, Parser, Subcommand};
use snafu::{ResultExt, Whatever};
use tracing::{debug, info};
use vmgeo_client::RestClient;
use vmgeo_common::config::{
    DEFAULT_LOG_LEVEL, DEFAULT_STORE_URL, ENV_LOG, ENV_STORE_URL, ENV_TIMEOUT_SECS,
};

mod build_info;
mod command_demo;
mod command_query;
mod command_write;

#[derive(Debug, Parser)]
#[command(
    name = "vmgeo",
    about = "Write and read geolocation samples in VictoriaMetrics",
    author = build_info::AUTHOR,
    version = build_info::FULL_VERSION,
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    /// Log filter, e.g. `info` or `vmgeo_client=debug`
    #[arg(short, long, env = ENV_LOG, default_value = DEFAULT_LOG_LEVEL, global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write one sample, then read the recent window back
    Demo(command_demo::DemoArgs),
    /// Write a single location sample
    Write(command_write::WriteArgs),
    /// Run a range query and print the samples
    Query(command_query::QueryArgs),
}

/// Where the store lives and how long to wait for it
#[derive(Debug, Clone, Args)]
pub(crate) struct StoreArgs {
    /// Base URL of the VictoriaMetrics HTTP API
    #[arg(long, env = ENV_STORE_URL, default_value = DEFAULT_STORE_URL, global = true)]
    store_url: String,

    /// Per-request timeout in seconds; no timeout when unset
    #[arg(long, env = ENV_TIMEOUT_SECS, global = true)]
    timeout_secs: Option<u64>,
}

impl StoreArgs {
    pub(crate) fn client(&self) -> Result<RestClient, Whatever> {
        RestClient::with_timeout(&self.store_url, self.timeout_secs.map(Duration::from_secs))
            .whatever_context(format!("Failed to create client for {}", self.store_url))
    }
}

#[tokio::main]
async fn main() -> Result<(), Whatever> {
    human_panic::setup_panic!();

    // `.env` must be loaded before clap reads env-backed arguments
    let dotenv = vmgeo_common::config::load_dotenv();

    // Parse command line arguments
    let cli = Cli::parse();

    vmgeo_common::logging::init_logging(&cli.log_level)
        .whatever_context("Failed to initialize logging")?;

    if let Some(path) = dotenv.whatever_context("Failed to load .env")? {
        debug!("Loaded environment from {}", path.display());
    }

    info!("Starting vmgeo version {}", build_info::FULL_VERSION);

    let client = cli.store.client()?;

    // Execute the selected command
    match cli.command {
        Commands::Demo(args) => {
            command_demo::run(args, &client).await?;
        }
        Commands::Write(args) => {
            command_write::run(args, &client).await?;
        }
        Commands::Query(args) => {
            command_query::run(args, &client).await?;
        }
    }
    Ok(())
}
