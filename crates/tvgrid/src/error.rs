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

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Error as SerdeError;
use std::{io, net::AddrParseError};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum TvgridError {
    #[error("I/O error: `{0}`")]
    Io(#[from] io::Error),
    #[error("Serialization/deserialization error: `{0}`")]
    Serde(#[from] SerdeError),
    #[error("Figment error: `{0}`")]
    Figment(#[from] figment::Error),
    #[error("Bind address error: `{0}`")]
    Address(#[from] AddrParseError),
}

impl IntoResponse for TvgridError {
    fn into_response(self) -> Response {
        error!("{}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, TvgridError>;
