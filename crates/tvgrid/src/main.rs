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

pub mod api;
pub mod backend;
pub mod error;
pub mod server;
pub mod settings;
pub mod store;
pub mod utils;

use clap::Parser;
use clap_verbosity_flag::Verbosity;
use std::path::PathBuf;

use error::TvgridError;
use settings::{Overrides, Settings};

/// The Tvgrid server
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Verbosity
    #[command(flatten)]
    verbose: Verbosity,

    /// Path to a TOML settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

////////////////////////////////////////////////////////////////////////////////
// PUBLIC FUNCTION
////////////////////////////////////////////////////////////////////////////////

#[tokio::main]
async fn main() -> Result<(), TvgridError> {
    let args = Cli::parse();
    let settings = Settings::load(args.settings.as_deref(), &args.overrides)?;
    server::init_server(settings, &args.verbose).await
}
