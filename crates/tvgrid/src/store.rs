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

use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;
use tvgrid_common::config::Configuration;

use crate::error::Result;

/// Where the configuration document lives between requests.
pub trait ConfigStore: Send + Sync {
    /// Returns the saved document, or the default one if nothing has been saved yet.
    fn load(&self) -> Result<Configuration>;

    /// Replaces the saved document wholesale. Concurrent saves race; the last one wins.
    fn save(&self, config: &Configuration) -> Result<()>;
}

/// A pretty-printed JSON file, overwritten in place on every save.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileStore {
    fn load(&self) -> Result<Configuration> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path =% self.path.display(), "no saved configuration, using defaults");
                return Ok(Configuration::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, config: &Configuration) -> Result<()> {
        let contents = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, contents)?;
        debug!(path =% self.path.display(), "saved configuration");
        Ok(())
    }
}
