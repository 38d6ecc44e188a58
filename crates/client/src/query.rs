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

//! Range query construction and response decoding
//!
//! Responses follow the Prometheus `query_range` shape:
//!
//! ```json
//! {"status":"success","data":{"resultType":"matrix","result":[
//!   {"metric":{"__name__":"j","user_id":"333"},"values":[[1700000000,"111.11"]]}
//! ]}}
//! ```

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use snafu::ResultExt;
use tracing::{debug, warn};

use crate::types::{
    ClientError, ClientResult, JsonSnafu, LocationSample, QueryOutcome, QueryWindow, ValueField,
};

/// Label the user identifier is stored under
pub const USER_LABEL: &str = "user_id";

const STATUS_SUCCESS: &str = "success";

/// Raw `query_range` response body
#[derive(Debug, Deserialize)]
struct RangeResponse {
    status:     String,
    #[serde(default)]
    data:       Option<RangeData>,
    #[serde(rename = "errorType", default)]
    error_type: Option<String>,
    #[serde(default)]
    error:      Option<String>,
}

#[derive(Debug, Deserialize)]
struct RangeData {
    #[serde(default)]
    result: Option<Vec<SeriesResult>>,
}

/// One series of the result matrix. Rows are kept as raw JSON so a single
/// malformed row does not fail the whole body.
#[derive(Debug, Deserialize)]
struct SeriesResult {
    #[serde(default)]
    metric: HashMap<String, String>,
    #[serde(default)]
    values: Vec<Value>,
}

/// Builds the selector `<metric>{user_id="<id>"}`
pub fn build_query(metric: &str, user_id: &str) -> String {
    let mut escaped = String::with_capacity(user_id.len());
    for c in user_id.chars() {
        if matches!(c, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("{metric}{{{USER_LABEL}=\"{escaped}\"}}")
}

/// Query parameters for a window, in the order they are sent.
///
/// Bounds are converted from milliseconds to whole seconds by truncating
/// division.
pub fn range_params(window: &QueryWindow) -> [(&'static str, String); 4] {
    [
        ("query", build_query(&window.metric, &window.user_id)),
        ("start", (window.start_ms / 1000).to_string()),
        ("end", (window.end_ms / 1000).to_string()),
        ("step", window.step_secs.to_string()),
    ]
}

/// Decodes a `query_range` body into samples.
///
/// Rows that are not a `[number, "numeric string"]` pair are dropped and
/// counted in [`QueryOutcome::skipped`].
///
/// # Errors
/// Returns `ClientError::Json` when the body is not a valid response and
/// `ClientError::QueryFailed` when the store reports a non-success status.
pub fn decode(body: &str, window: &QueryWindow) -> ClientResult<QueryOutcome> {
    let response: RangeResponse = serde_json::from_str(body).context(JsonSnafu)?;

    if response.status != STATUS_SUCCESS {
        return Err(ClientError::QueryFailed {
            error_type: response.error_type.unwrap_or(response.status),
            message:    response.error.unwrap_or_default(),
        });
    }

    let series = response
        .data
        .and_then(|data| data.result)
        .unwrap_or_default();

    let mut outcome = QueryOutcome::default();
    for series in series {
        let user_id = series
            .metric
            .get(USER_LABEL)
            .cloned()
            .unwrap_or_else(|| window.user_id.clone());

        for row in &series.values {
            match decode_row(row) {
                Some((timestamp, value)) => {
                    let (longitude, latitude) = match window.value_field {
                        ValueField::Longitude => (value, 0.0),
                        ValueField::Latitude => (0.0, value),
                    };
                    outcome.samples.push(LocationSample {
                        user_id: user_id.clone(),
                        longitude,
                        latitude,
                        timestamp,
                    });
                }
                None => {
                    warn!("Skipping malformed row for user '{}': {}", user_id, row);
                    outcome.skipped += 1;
                }
            }
        }
    }

    debug!(
        "Decoded {} samples, skipped {} rows",
        outcome.samples.len(),
        outcome.skipped
    );
    Ok(outcome)
}

/// Returns `(timestamp_ms, value)` for a well-formed row.
fn decode_row(row: &Value) -> Option<(i64, f64)> {
    let [ts, value] = row.as_array()?.as_slice() else {
        return None;
    };
    let ts_secs = ts.as_f64()?;
    let value = value.as_str()?.trim().parse::<f64>().ok()?;
    Some(((ts_secs * 1000.0) as i64, value))
}
