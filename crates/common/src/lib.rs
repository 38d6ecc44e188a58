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

pub mod config;
pub mod logging;

use snafu::Snafu;

#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid log filter '{filter}'"))]
    InvalidLogFilter {
        filter: String,
        #[snafu(source)]
        source: tracing_subscriber::filter::ParseError,
    },

    #[snafu(display("Failed to install the global tracing subscriber"))]
    SetSubscriber {
        #[snafu(source)]
        source: tracing::subscriber::SetGlobalDefaultError,
    },

    #[snafu(display("Failed to load environment file"))]
    Dotenv {
        #[snafu(source)]
        source: dotenvy::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
