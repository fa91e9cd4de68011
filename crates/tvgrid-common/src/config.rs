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

//! The persisted configuration document.
//!
//! The document is whatever JSON object the front end last saved, kept as-is. Only the grid
//! identifiers are ever written by the server; the connection keys are read where a route needs
//! them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

pub const DEFAULT_TVHEADEND_URL: &str = "http://192.168.3.104:9981";
pub const DEFAULT_GRID_ROWS: u32 = 3;
pub const DEFAULT_GRID_COLS: u32 = 4;

pub const TVHEADEND_URL: &str = "tvheadend_url";
pub const TVH_USERNAME: &str = "tvh_username";
pub const TVH_PASSWORD: &str = "tvh_password";
pub const GRIDS: &str = "grids";
pub const GRID_ID: &str = "uuid";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(Map<String, Value>);

impl Default for Configuration {
    fn default() -> Self {
        let mut map = Map::new();
        map.insert(TVHEADEND_URL.to_owned(), json!(DEFAULT_TVHEADEND_URL));
        map.insert("grid_rows".to_owned(), json!(DEFAULT_GRID_ROWS));
        map.insert("grid_cols".to_owned(), json!(DEFAULT_GRID_COLS));
        map.insert("cells".to_owned(), json!([]));
        Self(map)
    }
}

impl From<Map<String, Value>> for Configuration {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl Configuration {
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    /// A string value, or `None` when the key is missing or holds anything else.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn tvheadend_url(&self) -> Option<&str> {
        self.get_str(TVHEADEND_URL)
    }

    pub fn tvh_username(&self) -> Option<&str> {
        self.get_str(TVH_USERNAME)
    }

    pub fn tvh_password(&self) -> Option<&str> {
        self.get_str(TVH_PASSWORD)
    }

    pub fn grid_count(&self) -> usize {
        self.0
            .get(GRIDS)
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// Gives every grid whose `uuid` is missing, null or empty a fresh v4 UUID and returns how
    /// many were assigned. Any other `uuid` is left alone, which is how a client updates a grid
    /// in place.
    pub fn assign_grid_ids(&mut self) -> usize {
        let Some(grids) = self.0.get_mut(GRIDS).and_then(Value::as_array_mut) else {
            return 0;
        };

        let mut assigned = 0;
        for grid in grids.iter_mut().filter_map(Value::as_object_mut) {
            let missing = match grid.get(GRID_ID) {
                None | Some(Value::Null) => true,
                Some(Value::String(id)) => id.is_empty(),
                Some(_) => false,
            };
            if missing {
                grid.insert(GRID_ID.to_owned(), Value::String(Uuid::new_v4().to_string()));
                assigned += 1;
            }
        }
        assigned
    }
}
