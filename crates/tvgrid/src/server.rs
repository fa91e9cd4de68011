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
    Router,
    routing::{get, post},
};
use clap_verbosity_flag::Verbosity;
use std::{net::SocketAddr, path::Path};
use tokio::net::TcpListener;
use tower_http::{services::ServeFile, trace::TraceLayer};
use tracing::info;
use tracing_log::AsTrace;

use crate::{
    api::{self, ApiState},
    error::Result,
    settings::Settings,
    store::FileStore,
};

pub fn router(state: ApiState, static_dir: &Path) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route_service("/grid", ServeFile::new(static_dir.join("grid.html")))
        .route_service("/grid2", ServeFile::new(static_dir.join("grid2.html")))
        .route(
            "/api/settings",
            get(api::get_settings).post(api::post_settings),
        )
        .route("/api/test_connection", post(api::post_test_connection))
        .route("/api/channels", post(api::post_channels))
        .route("/api/audioinfo", post(api::post_audioinfo))
        .route("/api/epg/all", get(api::get_epg_all))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn init_server(settings: Settings, verbose: &Verbosity) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(verbose.log_level_filter().as_trace())
        .init();

    let addr: SocketAddr = settings.bind.parse()?;
    let store = FileStore::new(&settings.config_file);
    let app = router(ApiState::new(store), &settings.static_dir);

    let listener = TcpListener::bind(addr).await?;
    info!(
        %addr,
        config_file =% settings.config_file.display(),
        static_dir =% settings.static_dir.display(),
        "server is running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
