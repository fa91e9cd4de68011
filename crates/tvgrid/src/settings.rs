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

//! Process settings.
//!
//! Layered lowest to highest: built-in defaults, the TOML settings file, `TVGRID_*` environment
//! variables, then command line flags.

use clap::Args;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const DEFAULT_BIND: &str = "0.0.0.0:7070";
pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_SETTINGS_FILE: &str = "tvgrid.toml";
pub const ENV_PREFIX: &str = "TVGRID_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// IP address and port to listen on
    pub bind: String,
    /// Where the grid configuration document is persisted
    pub config_file: PathBuf,
    /// Directory holding the HTML pages
    pub static_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_owned(),
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

/// Command line overrides. Only flags that were given end up in the merged settings.
#[derive(Debug, Default, Args, Serialize)]
pub struct Overrides {
    /// IP address and port to bind to
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    /// Path to the grid configuration file
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,

    /// Directory of static HTML pages
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

impl Settings {
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let file = file.unwrap_or(Path::new(DEFAULT_SETTINGS_FILE));
        let settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
            .extract()?;
        Ok(settings)
    }
}
