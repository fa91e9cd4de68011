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
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};
use tvgrid_common::{
    config::Configuration,
    shape::{self, AudioMap, ChannelSummary, Program},
};

use crate::{
    backend::{Backend, BackendError},
    error::TvgridError,
    store::ConfigStore,
};

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn ConfigStore>,
}

impl ApiState {
    pub fn new(store: impl ConfigStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Connection settings posted by the settings page before they are saved. Values that are not
/// strings are treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectionRequest {
    #[serde(default)]
    tvheadend_url: Value,
    #[serde(default)]
    tvh_username: Value,
    #[serde(default)]
    tvh_password: Value,
}

impl ConnectionRequest {
    fn backend(&self) -> Option<Backend> {
        self.tvheadend_url
            .as_str()
            .filter(|url| !url.is_empty())
            .map(Backend::new)
    }

    fn authenticated_backend(&self) -> Option<Backend> {
        self.backend().map(|backend| {
            backend.with_credentials(self.tvh_username.as_str(), self.tvh_password.as_str())
        })
    }
}

#[derive(Debug, Serialize)]
struct ChannelsResponse {
    ok: bool,
    channels: Vec<ChannelSummary>,
}

#[derive(Debug, Serialize)]
struct AudioResponse {
    ok: bool,
    audio: AudioMap,
}

#[derive(Debug, Serialize)]
struct EpgResponse {
    status: &'static str,
    count: usize,
    programs: Vec<Program>,
}

fn no_url() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "ok": false, "error": "No URL" })),
    )
        .into_response()
}

// Tvheadend trouble is reported in the body, not the status line.
fn backend_failure(err: BackendError) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "ok": false, "error": err.to_string() })),
    )
        .into_response()
}

/*
Settings
*/

pub async fn get_settings(State(state): State<ApiState>) -> Result<impl IntoResponse, TvgridError> {
    let config = state.store.load()?;
    Ok((StatusCode::OK, Json(config)))
}

pub async fn post_settings(
    State(state): State<ApiState>,
    Json(mut config): Json<Configuration>,
) -> Result<impl IntoResponse, TvgridError> {
    let assigned = config.assign_grid_ids();
    state.store.save(&config)?;

    info!(
        grids = config.grid_count(),
        assigned,
        "saved settings"
    );
    Ok((StatusCode::OK, Json(json!({ "status": "ok" }))))
}

#[cfg(test)]
mod test_settings {
    use super::*;
    use crate::utils::get_test_server;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn it_should_return_the_default_document() {
        let dir = tempdir().unwrap();
        let server = get_test_server(dir.path());

        let response = server.get("/api/settings").await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({
                "tvheadend_url": "http://192.168.3.104:9981",
                "grid_rows": 3,
                "grid_cols": 4,
                "cells": [],
            })
        );
        assert!(!dir.path().join("config.json").exists());
    }

    #[tokio::test]
    async fn it_should_assign_a_grid_id_once() {
        let dir = tempdir().unwrap();
        let server = get_test_server(dir.path());

        server
            .post("/api/settings")
            .json(&json!({
                "tvheadend_url": "http://tvh.local:9981",
                "grids": [{
                    "name": "Living room",
                    "rows": 2,
                    "cols": 2,
                    "cells": [{ "row": 0, "col": 0, "channel_uuid": "c1" }],
                }],
            }))
            .await
            .assert_json(&json!({ "status": "ok" }));

        let saved: Value = server.get("/api/settings").await.json();
        let uuid = saved["grids"][0]["uuid"].as_str().unwrap().to_owned();
        assert!(!uuid.is_empty());
        assert_eq!(saved["grids"][0]["cells"][0]["channel_uuid"], "c1");

        server
            .post("/api/settings")
            .json(&saved)
            .await
            .assert_status_ok();

        let resaved: Value = server.get("/api/settings").await.json();
        assert_eq!(resaved["grids"][0]["uuid"], uuid.as_str());
        assert_eq!(resaved, saved);
    }

    #[tokio::test]
    async fn it_should_assign_distinct_ids() {
        let dir = tempdir().unwrap();
        let server = get_test_server(dir.path());

        server
            .post("/api/settings")
            .json(&json!({ "grids": [{ "name": "one" }, { "name": "two", "uuid": "" }] }))
            .await
            .assert_status_ok();

        let saved: Value = server.get("/api/settings").await.json();
        let first = saved["grids"][0]["uuid"].as_str().unwrap();
        let second = saved["grids"][1]["uuid"].as_str().unwrap();
        assert!(!first.is_empty());
        assert!(!second.is_empty());
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn it_should_replace_the_whole_document() {
        let dir = tempdir().unwrap();
        let server = get_test_server(dir.path());

        server
            .post("/api/settings")
            .json(&json!({ "tvh_username": "admin", "grids": [{ "uuid": "g1" }] }))
            .await
            .assert_status_ok();
        server
            .post("/api/settings")
            .json(&json!({ "tvheadend_url": "http://other:9981" }))
            .await
            .assert_status_ok();

        let saved: Value = server.get("/api/settings").await.json();
        assert_eq!(saved, json!({ "tvheadend_url": "http://other:9981" }));
    }

    #[tokio::test]
    async fn it_should_store_the_body_as_sent() {
        let dir = tempdir().unwrap();
        let server = get_test_server(dir.path());
        let body = json!({
            "tvheadend_url": "http://tvh.local:9981",
            "tvh_password": null,
            "grid_rows": "3",
            "grids": [{
                "uuid": "g",
                "rows": "2",
                "cells": [{ "row": 0, "col": 0 }, { "col": 1, "channel_uuid": 5 }],
            }],
        });

        server
            .post("/api/settings")
            .json(&body)
            .await
            .assert_json(&json!({ "status": "ok" }));

        let saved: Value = server.get("/api/settings").await.json();
        assert_eq!(saved, body);
    }

    #[tokio::test]
    async fn it_should_load_a_file_with_unusual_values() {
        let dir = tempdir().unwrap();
        let document = json!({ "grid_rows": "3", "cells": [{ "row": "a" }], "grids": 1 });
        fs::write(dir.path().join("config.json"), document.to_string()).unwrap();
        let server = get_test_server(dir.path());

        let response = server.get("/api/settings").await;
        response.assert_status_ok();
        response.assert_json(&document);
    }

    #[tokio::test]
    async fn it_should_fail_on_a_corrupt_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("config.json"), "{\"grids\": [").unwrap();
        let server = get_test_server(dir.path());

        server
            .get("/api/settings")
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}

/*
Tvheadend
*/

pub async fn post_test_connection(Json(body): Json<ConnectionRequest>) -> Response {
    let Some(backend) = body.authenticated_backend() else {
        return no_url();
    };

    match backend.probe().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Err(err) => {
            warn!(error =% err, "connection test failed");
            backend_failure(err)
        }
    }
}

pub async fn post_channels(Json(body): Json<ConnectionRequest>) -> Response {
    let Some(backend) = body.authenticated_backend() else {
        return no_url();
    };

    let channels = backend
        .channel_grid()
        .await
        .and_then(|listing| shape::channels(listing).map_err(BackendError::decode));

    match channels {
        Ok(channels) => {
            (StatusCode::OK, Json(ChannelsResponse { ok: true, channels })).into_response()
        }
        Err(err) => {
            warn!(error =% err, "failed to fetch channels");
            backend_failure(err)
        }
    }
}

/// The stream list is fetched without credentials even when some were posted.
pub async fn post_audioinfo(Json(body): Json<ConnectionRequest>) -> Response {
    let Some(backend) = body.backend() else {
        return no_url();
    };

    let audio = backend
        .stream_list()
        .await
        .and_then(|listing| shape::audio(listing).map_err(BackendError::decode));

    match audio {
        Ok(audio) => {
            (StatusCode::OK, Json(AudioResponse { ok: true, audio })).into_response()
        }
        Err(err) => {
            warn!(error =% err, "failed to fetch stream list");
            backend_failure(err)
        }
    }
}

/// Unlike the other Tvheadend routes this one reads the connection from the saved document.
pub async fn get_epg_all(State(state): State<ApiState>) -> Result<Response, TvgridError> {
    let config = state.store.load()?;
    let Some(url) = config.tvheadend_url().filter(|url| !url.is_empty()) else {
        return Ok(no_url());
    };
    let backend = Backend::new(url).with_credentials(config.tvh_username(), config.tvh_password());

    let programs = backend
        .epg_grid()
        .await
        .and_then(|listing| shape::epg(listing).map_err(BackendError::decode));

    match programs {
        Ok(programs) => Ok((
            StatusCode::OK,
            Json(EpgResponse {
                status: "ok",
                count: programs.len(),
                programs,
            }),
        )
            .into_response()),
        Err(err) => {
            warn!(error =% err, "failed to fetch epg");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": err.to_string() })),
            )
                .into_response())
        }
    }
}
