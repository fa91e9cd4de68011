// Tvgrid
// Copyright (C) 2025 Throneless Tech

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Reshaping of Tvheadend listings into the front end's JSON.
//!
//! Tvheadend grid endpoints answer `{"entries": [...], "total": N}`. A missing `entries` is read
//! as an empty listing; anything that is not an object of that shape is a decode error.

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const START_STR: &str = "start_str";
pub const STOP_STR: &str = "stop_str";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Deserialize)]
struct Listing<T> {
    #[serde(default = "Vec::new")]
    entries: Vec<T>,
}

/// Entries are copied through as whatever JSON Tvheadend sent; a missing field becomes `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub uuid: Value,
    pub name: Value,
    pub number: Value,
    pub chid: Value,
}

impl From<&Map<String, Value>> for ChannelSummary {
    fn from(entry: &Map<String, Value>) -> Self {
        let field = |key: &str| entry.get(key).cloned().unwrap_or(Value::Null);
        Self {
            uuid: field("uuid"),
            name: field("name"),
            number: field("number"),
            chid: field("chid"),
        }
    }
}

/// Channel identifier to lower-cased audio codec.
pub type AudioMap = BTreeMap<String, String>;

/// An EPG event as Tvheadend sent it, plus `start_str` and `stop_str`.
pub type Program = Map<String, Value>;

/// Keeps uuid, name, number and chid of every channel, dropping the rest.
pub fn channels(listing: Value) -> serde_json::Result<Vec<ChannelSummary>> {
    let listing: Listing<Map<String, Value>> = serde_json::from_value(listing)?;
    Ok(listing.entries.iter().map(ChannelSummary::from).collect())
}

pub fn audio(listing: Value) -> serde_json::Result<AudioMap> {
    let listing: Listing<Map<String, Value>> = serde_json::from_value(listing)?;

    let non_empty = |entry: &Map<String, Value>, key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    };

    let mut map = AudioMap::new();
    for entry in listing
        .entries
        .iter()
        .filter(|entry| entry.get("type").and_then(Value::as_str) == Some("Audio"))
    {
        if let (Some(channel), Some(codec)) =
            (non_empty(entry, "channel_uuid"), non_empty(entry, "codec"))
        {
            map.insert(channel, codec.to_lowercase());
        }
    }
    Ok(map)
}

pub fn epg(listing: Value) -> serde_json::Result<Vec<Program>> {
    let listing: Listing<Program> = serde_json::from_value(listing)?;

    Ok(listing
        .entries
        .into_iter()
        .map(|mut program| {
            let start = derived_timestamp(program.get("start"));
            let stop = derived_timestamp(program.get("stop"));
            program.insert(START_STR.to_owned(), start);
            program.insert(STOP_STR.to_owned(), stop);
            program
        })
        .collect())
}

/// Renders epoch seconds as `YYYY-MM-DD HH:MM` in the local time zone.
pub fn format_timestamp(ts: i64) -> Option<String> {
    Local
        .timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
}

// absent, null, zero and non-numeric all map to null
fn derived_timestamp(value: Option<&Value>) -> Value {
    value
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .filter(|ts| *ts != 0)
        .and_then(format_timestamp)
        .map_or(Value::Null, Value::String)
}
