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

#[cfg(test)]
use axum::Router;
#[cfg(test)]
use axum_test::TestServer;
#[cfg(test)]
use std::path::Path;
#[cfg(test)]
use tokio::net::TcpListener;

#[cfg(test)]
use crate::{api::ApiState, server, store::FileStore};

/// The full router over a configuration file and static pages kept in `dir`.
#[cfg(test)]
pub fn get_test_server(dir: &Path) -> TestServer {
    let state = ApiState::new(FileStore::new(dir.join("config.json")));
    TestServer::new(server::router(state, dir)).unwrap()
}

/// Serves `app` on an ephemeral localhost port and returns its base URL.
#[cfg(test)]
pub async fn spawn_backend(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
#[cfg(test)]
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
