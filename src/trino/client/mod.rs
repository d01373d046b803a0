// trino-probe: smoke probes for Trino clusters on Kubernetes
// Copyright 2025 MinIO, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Trino client speaking the coordinator's REST statement protocol.
//!
//! A statement is posted to `/v1/statement`; the client then polls the
//! `nextUri` of each reply until the coordinator stops returning one. All
//! requests are issued one after another on behalf of a single logical
//! session whose catalog, schema and properties live on the client.

use bytes::Bytes;
use http::HeaderMap;
use http::header::CONTENT_TYPE;
use std::sync::{Arc, RwLock};

use crate::trino::creds::Provider;
use crate::trino::error::{Error, NetworkError, ServerError, ValidationErr};
use crate::trino::header_constants::*;
use crate::trino::http::BaseUrl;
use crate::trino::session::{ClientSession, header_value};
use crate::trino::types::QueryResults;

mod execute_statement;

/// Value of `X-Trino-Source` unless overridden.
pub const DEFAULT_SOURCE: &str = "trino-probe";

/// Builder for [`TrinoClient`]
#[derive(Debug)]
pub struct TrinoClientBuilder {
    base_url: BaseUrl,
    user: String,
    source: String,
    provider: Option<Arc<dyn Provider + Send + Sync + 'static>>,
    ignore_cert_check: Option<bool>,
    session: ClientSession,
}

impl TrinoClientBuilder {
    /// Creates a builder for the coordinator at `base_url`, connecting as `user`.
    pub fn new(base_url: BaseUrl, user: impl Into<String>) -> Self {
        Self {
            base_url,
            user: user.into(),
            source: DEFAULT_SOURCE.to_string(),
            provider: None,
            ignore_cert_check: None,
            session: ClientSession::default(),
        }
    }

    /// Set credentials for HTTP basic authentication. Requests are
    /// unauthenticated when no provider is set.
    pub fn provider<P: Provider + Send + Sync + 'static>(mut self, provider: Option<P>) -> Self {
        self.provider = provider.map(|p| Arc::new(p) as Arc<dyn Provider + Send + Sync + 'static>);
        self
    }

    /// Set this to disable TLS certificate verification. Only has an effect
    /// for `https` coordinators.
    pub fn ignore_cert_check(mut self, ignore_cert_check: Option<bool>) -> Self {
        self.ignore_cert_check = ignore_cert_check;
        self
    }

    /// Add a session property, such as `query_max_execution_time`.
    pub fn session_property(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, ValidationErr> {
        self.session.set_property(name, value)?;
        Ok(self)
    }

    /// Build the client. No network connection is made here.
    pub fn build(self) -> Result<TrinoClient, Error> {
        let mut builder = reqwest::Client::builder();

        let user_agent = String::from("TrinoProbe (")
            + std::env::consts::OS
            + "; "
            + std::env::consts::ARCH
            + ") trino-probe/"
            + env!("CARGO_PKG_VERSION");
        builder = builder.user_agent(user_agent);

        #[cfg(any(
            feature = "default-tls",
            feature = "native-tls",
            feature = "rustls-tls"
        ))]
        if let Some(v) = self.ignore_cert_check {
            builder = builder.danger_accept_invalid_certs(v);
        }

        Ok(TrinoClient {
            http_client: builder.build().map_err(ValidationErr::HttpClient)?,
            shared: Arc::new(SharedClientItems {
                base_url: self.base_url,
                user: self.user,
                source: self.source,
                provider: self.provider,
                session: RwLock::new(self.session),
            }),
        })
    }
}

/// Client for a Trino coordinator.
///
/// Clones share the same session, so a `USE` issued through one clone is
/// visible to statements issued through any other.
#[derive(Clone, Debug)]
pub struct TrinoClient {
    http_client: reqwest::Client,
    pub(crate) shared: Arc<SharedClientItems>,
}

#[derive(Debug)]
pub(crate) struct SharedClientItems {
    pub(crate) base_url: BaseUrl,
    user: String,
    source: String,
    provider: Option<Arc<dyn Provider + Send + Sync + 'static>>,
    session: RwLock<ClientSession>,
}

impl TrinoClient {
    /// Returns a client for the coordinator at `base_url` with default settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use trino_probe::trino::TrinoClient;
    /// use trino_probe::trino::http::BaseUrl;
    ///
    /// let base_url: BaseUrl = "http://localhost:8080".parse().unwrap();
    /// let client = TrinoClient::new(base_url, "admin").unwrap();
    /// ```
    pub fn new(base_url: BaseUrl, user: impl Into<String>) -> Result<Self, Error> {
        TrinoClientBuilder::new(base_url, user).build()
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.shared.base_url
    }

    pub fn user(&self) -> &str {
        &self.shared.user
    }

    /// Returns whether this client is configured to use HTTPS.
    pub fn is_secure(&self) -> bool {
        self.shared.base_url.is_secure()
    }

    /// Returns a snapshot of the current session.
    pub fn session(&self) -> ClientSession {
        match self.shared.session.read() {
            Ok(session) => session.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn request_headers(&self) -> Result<HeaderMap, ValidationErr> {
        let mut headers = match self.shared.session.read() {
            Ok(session) => session.headers()?,
            Err(poisoned) => poisoned.into_inner().headers()?,
        };
        headers.insert(X_TRINO_USER, header_value(X_TRINO_USER, &self.shared.user)?);
        headers.insert(
            X_TRINO_SOURCE,
            header_value(X_TRINO_SOURCE, &self.shared.source)?,
        );
        Ok(headers)
    }

    fn apply_session_updates(&self, headers: &HeaderMap) {
        match self.shared.session.write() {
            Ok(mut session) => session.apply_response_headers(headers),
            Err(poisoned) => poisoned.into_inner().apply_response_headers(headers),
        }
    }

    /// Posts a new statement and returns the first page of its results.
    pub(crate) async fn submit_statement(&self, sql: &str) -> Result<QueryResults, Error> {
        let url = self.shared.base_url.statement_url();
        log::debug!("POST {url}: {sql}");

        let mut req = self
            .http_client
            .post(&url)
            .headers(self.request_headers()?)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(sql.to_string());
        if let Some(provider) = &self.shared.provider {
            let creds = provider.fetch();
            req = req.basic_auth(creds.username, Some(creds.password));
        }

        self.execute(url, req).await
    }

    /// Fetches the page at a `nextUri` returned by the coordinator.
    pub(crate) async fn fetch_next(&self, next_uri: &str) -> Result<QueryResults, Error> {
        log::debug!("GET {next_uri}");

        let mut req = self
            .http_client
            .get(next_uri)
            .headers(self.request_headers()?);
        if let Some(provider) = &self.shared.provider {
            let creds = provider.fetch();
            req = req.basic_auth(creds.username, Some(creds.password));
        }

        self.execute(next_uri.to_string(), req).await
    }

    async fn execute(
        &self,
        url: String,
        req: reqwest::RequestBuilder,
    ) -> Result<QueryResults, Error> {
        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(source) => return Err(NetworkError::Request { url, source }.into()),
        };

        let status = resp.status();
        self.apply_session_updates(resp.headers());
        let body: Bytes = resp.bytes().await.map_err(NetworkError::ReqwestError)?;

        if !status.is_success() {
            return Err(ServerError {
                status: status.as_u16(),
                url,
                body: String::from_utf8_lossy(&body).into_owned(),
            }
            .into());
        }

        let results: QueryResults = serde_json::from_slice(&body)?;
        if let Some(stats) = &results.stats {
            log::debug!("query {} is {}", results.id, stats.state);
        }
        Ok(results)
    }
}
