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

use snafu::ResultExt;
use tracing_subscriber::EnvFilter;

use crate::{InvalidLogFilterSnafu, Result, SetSubscriberSnafu};

/// Parses a filter directive such as `info` or `vmgeo_client=debug,warn`
pub fn env_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).context(InvalidLogFilterSnafu { filter: directives })
}

/// Installs the process-wide `fmt` subscriber.
///
/// Must be called at most once per process.
pub fn init_logging(directives: &str) -> Result<()> {
    let filter = env_filter(directives)?;

    let subscriber = tracing_subscriber::fmt()
        // Use a more compact, abbreviated log format
        .compact()
        // Display source code file paths
        .with_file(true)
        // Display source code line numbers
        .with_line_number(true)
        // Display the thread ID an event was recorded on
        .with_thread_ids(true)
        // Don't display the event's target (module path)
        .with_target(false)
        .with_env_filter(filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context(SetSubscriberSnafu)
}
