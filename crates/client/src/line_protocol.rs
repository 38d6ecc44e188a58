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

//! InfluxDB line protocol encoding for location writes
//!
//! Format: `t_zbs,user_id=<id>,u_ts=<event_ts> j=<longitude>,w=<latitude>\n`
//!
//! The field keys are short on purpose: `j` is longitude and `w` is latitude,
//! which is what the existing store schema expects.

use std::fmt::Write as _;

use snafu::ensure;

use crate::types::{ClientResult, InvalidArgumentSnafu, LocationWrite};

/// Measurement every location record is written under
pub const MEASUREMENT: &str = "t_zbs";

/// Field key holding the longitude
pub const LONGITUDE_FIELD: &str = "j";

/// Field key holding the latitude
pub const LATITUDE_FIELD: &str = "w";

/// Encodes one location write as a single newline-terminated record.
///
/// Coordinates are printed with six fractional digits. `collect_ts_ms` is not
/// part of the record.
///
/// # Errors
/// Returns `ClientError::InvalidArgument` for non-finite coordinates, which
/// line protocol cannot represent.
pub fn encode(write: &LocationWrite) -> ClientResult<String> {
    ensure!(
        write.longitude.is_finite() && write.latitude.is_finite(),
        InvalidArgumentSnafu {
            message: format!(
                "Coordinates must be finite, got j={} w={}",
                write.longitude, write.latitude
            ),
        }
    );

    let mut line = String::with_capacity(64);
    line.push_str(MEASUREMENT);
    line.push_str(",user_id=");
    escape_tag_value(&write.user_id, &mut line);
    // Writing into a String cannot fail.
    let _ = writeln!(
        line,
        ",u_ts={} {LONGITUDE_FIELD}={:.6},{LATITUDE_FIELD}={:.6}",
        write.event_ts_ms, write.longitude, write.latitude
    );
    Ok(line)
}

/// Backslash-escapes the characters that would end an unquoted tag value.
fn escape_tag_value(value: &str, out: &mut String) {
    for c in value.chars() {
        if matches!(c, ' ' | ',' | '=' | '\n' | '\r' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
}
