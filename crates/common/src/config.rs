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

//! Defaults and environment variable names shared by the binaries.

use std::path::{Path, PathBuf};

use snafu::ResultExt;

use crate::{DotenvSnafu, Result};

/// Base URL of a local single-node VictoriaMetrics
pub const DEFAULT_STORE_URL: &str = "http://localhost:8428";
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_USER_ID: &str = "333";
pub const DEFAULT_LONGITUDE: f64 = 111.11;
pub const DEFAULT_LATITUDE: f64 = 111.11;

/// How long before collection the demo observation happened
pub const DEFAULT_EVENT_OFFSET_MS: i64 = 10_000;

/// Three hours
pub const DEFAULT_WINDOW_SECS: u64 = 10_800;

/// 100 days, large enough that the whole window collapses into one point
pub const DEFAULT_STEP_SECS: u64 = 8_640_000;

pub const DEFAULT_METRIC: &str = "j";

pub const ENV_STORE_URL: &str = "VMGEO_STORE_URL";
pub const ENV_TIMEOUT_SECS: &str = "VMGEO_TIMEOUT_SECS";
pub const ENV_LOG: &str = "VMGEO_LOG";
pub const ENV_USER_ID: &str = "VMGEO_USER_ID";

/// Loads `.env` from the working directory or its parents, if there is one.
///
/// Variables already set in the environment win over the file. Runs before
/// logging is set up, so the caller reports the outcome.
///
/// # Errors
/// Returns `Error::Dotenv` if a file was found but could not be read or parsed
pub fn load_dotenv() -> Result<Option<PathBuf>> { found_or_absent(dotenvy::dotenv()) }

/// Like [`load_dotenv`], for an explicit file
pub fn load_dotenv_from(path: &Path) -> Result<Option<PathBuf>> {
    found_or_absent(dotenvy::from_path(path).map(|()| path.to_path_buf()))
}

fn found_or_absent(loaded: dotenvy::Result<PathBuf>) -> Result<Option<PathBuf>> {
    match loaded {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e).context(DotenvSnafu),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::Error;

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_dotenv_from(&dir.path().join(".env")).unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn test_valid_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "VMGEO_CONFIG_TEST_LOADED=yes").unwrap();

        let loaded = load_dotenv_from(file.path()).unwrap();
        assert_eq!(loaded.as_deref(), Some(file.path()));
        assert_eq!(std::env::var("VMGEO_CONFIG_TEST_LOADED").unwrap(), "yes");
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this line is not an assignment").unwrap();

        let err = load_dotenv_from(file.path()).unwrap_err();
        assert!(matches!(err, Error::Dotenv { .. }));
    }
}
