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

//! Client for the Tvheadend HTTP API.
//!
//! Tvheadend being unreachable is routine, so every failure comes back as a [`BackendError`]
//! value for the route to report. Nothing here turns into a server error on its own.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::Value;
use std::{fmt::Display, time::Duration};
use thiserror::Error;
use tracing::debug;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

pub const SERVER_INFO_PATH: &str = "/api/serverinfo";
pub const CHANNEL_GRID_PATH: &str = "/api/channel/grid";
pub const STREAM_LIST_PATH: &str = "/api/stream/list";
pub const EPG_GRID_PATH: &str = "/api/epg/events/grid";

pub const CHANNEL_LIMIT: &str = "999";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP {0}")]
    Status(u16),
    #[error("{0}")]
    Transport(String),
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn decode(err: impl Display) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BackendError>;

#[derive(Debug, Clone)]
pub struct Backend {
    base_url: String,
    authorization: Option<String>,
}

impl Backend {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            authorization: None,
        }
    }

    /// Basic credentials are only sent when a non-empty password is set.
    pub fn with_credentials(mut self, username: Option<&str>, password: Option<&str>) -> Self {
        self.authorization = password.filter(|p| !p.is_empty()).map(|password| {
            let token = STANDARD.encode(format!("{}:{}", username.unwrap_or_default(), password));
            format!("Basic {token}")
        });
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Succeeds when `/api/serverinfo` answers 200. The body is not inspected.
    pub async fn probe(&self) -> Result<()> {
        self.call(SERVER_INFO_PATH, &[], PROBE_TIMEOUT, |_| Ok(())).await
    }

    pub async fn channel_grid(&self) -> Result<Value> {
        self.get(CHANNEL_GRID_PATH, &[("limit", CHANNEL_LIMIT)]).await
    }

    pub async fn stream_list(&self) -> Result<Value> {
        self.get(STREAM_LIST_PATH, &[]).await
    }

    pub async fn epg_grid(&self) -> Result<Value> {
        self.get(EPG_GRID_PATH, &[]).await
    }

    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.call(path, query, FETCH_TIMEOUT, |response| {
            response.into_json::<Value>().map_err(BackendError::decode)
        })
        .await
    }

    // ureq blocks, so the request runs on the blocking pool
    async fn call<T, F>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        timeout: Duration,
        read: F,
    ) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(ureq::Response) -> Result<T> + Send + 'static,
    {
        let url = self.url(path);
        let authorization = self.authorization.clone();
        let query: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();

        debug!(%url, ?timeout, auth = authorization.is_some(), "calling tvheadend");

        tokio::task::spawn_blocking(move || {
            let agent = ureq::AgentBuilder::new().timeout(timeout).build();
            let mut request = agent.get(&url);
            for (key, value) in &query {
                request = request.query(key, value);
            }
            if let Some(authorization) = &authorization {
                request = request.set("Authorization", authorization);
            }

            let response = request.call().map_err(|err| match err {
                ureq::Error::Status(code, _) => BackendError::Status(code),
                ureq::Error::Transport(transport) => BackendError::Transport(transport.to_string()),
            })?;
            if response.status() != 200 {
                return Err(BackendError::Status(response.status()));
            }
            read(response)
        })
        .await
        .map_err(|err| BackendError::Transport(err.to_string()))?
    }
}

#[cfg(test)]
mod test_backend {
    use super::*;
    use crate::utils::{refused_url, spawn_backend};
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode, header},
        routing::get,
    };
    use serde_json::json;

    #[test]
    fn it_should_strip_trailing_slashes() {
        let backend = Backend::new("http://tvh.local:9981//");
        assert_eq!(
            backend.url(SERVER_INFO_PATH),
            "http://tvh.local:9981/api/serverinfo"
        );
    }

    #[test]
    fn it_should_only_authenticate_with_a_password() {
        let backend = Backend::new("http://tvh").with_credentials(Some("admin"), None);
        assert!(backend.authorization.is_none());

        let backend = Backend::new("http://tvh").with_credentials(Some("admin"), Some(""));
        assert!(backend.authorization.is_none());

        let backend = Backend::new("http://tvh").with_credentials(Some("admin"), Some("secret"));
        assert_eq!(
            backend.authorization.as_deref(),
            Some("Basic YWRtaW46c2VjcmV0")
        );

        let backend = Backend::new("http://tvh").with_credentials(None, Some("secret"));
        assert_eq!(backend.authorization.as_deref(), Some("Basic OnNlY3JldA=="));
    }

    #[tokio::test]
    async fn it_should_send_credentials_and_query() {
        let app = Router::new().route(
            CHANNEL_GRID_PATH,
            get(|headers: HeaderMap, uri: axum::http::Uri| async move {
                let auth = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_owned();
                Json(json!({ "auth": auth, "query": uri.query() }))
            }),
        );
        let base = spawn_backend(app).await;

        let body = Backend::new(&base)
            .with_credentials(Some("admin"), Some("secret"))
            .channel_grid()
            .await
            .unwrap();

        assert_eq!(body["auth"], "Basic YWRtaW46c2VjcmV0");
        assert_eq!(body["query"], "limit=999");
    }

    #[tokio::test]
    async fn it_should_report_status_failures() {
        let app = Router::new().route(
            STREAM_LIST_PATH,
            get(|| async { (StatusCode::UNAUTHORIZED, "denied") }),
        );
        let base = spawn_backend(app).await;

        let err = Backend::new(&base).stream_list().await.unwrap_err();
        assert!(matches!(err, BackendError::Status(401)));
        assert_eq!(err.to_string(), "HTTP 401");
    }

    #[tokio::test]
    async fn it_should_report_non_ok_success_codes() {
        let app = Router::new().route(SERVER_INFO_PATH, get(|| async { StatusCode::NO_CONTENT }));
        let base = spawn_backend(app).await;

        let err = Backend::new(&base).probe().await.unwrap_err();
        assert!(matches!(err, BackendError::Status(204)));
    }

    #[tokio::test]
    async fn it_should_report_malformed_json() {
        let app = Router::new().route(EPG_GRID_PATH, get(|| async { "<html>nope</html>" }));
        let base = spawn_backend(app).await;

        let err = Backend::new(&base).epg_grid().await.unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn it_should_report_refused_connections() {
        let base = refused_url().await;

        let err = Backend::new(&base).probe().await.unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
        assert!(!err.to_string().is_empty());
    }
}
