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

//! Error definitions for Trino client operations

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Errors raised while building a request, before anything is sent.
#[derive(Debug, Error)]
pub enum ValidationErr {
    #[error("SQL statement cannot be empty")]
    EmptyStatement,

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme '{0}'; expected http or https")]
    InvalidScheme(String),

    #[error("invalid namespace '{0}'; must be a DNS-1123 label")]
    InvalidNamespace(String),

    #[error("invalid value for header {name}: {source}")]
    InvalidHeaderValue {
        name: &'static str,
        #[source]
        source: http::header::InvalidHeaderValue,
    },

    #[error("invalid session property name '{0}'")]
    InvalidSessionProperty(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Transport level failures.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response body: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

/// The coordinator answered with a non-success HTTP status.
#[derive(Debug, Error)]
#[error("coordinator returned HTTP {status} for {url}: {body}")]
pub struct ServerError {
    pub status: u16,
    pub url: String,
    pub body: String,
}

/// Failure reported by the query engine inside a `QueryResults` document.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub sql_state: Option<String>,
    #[serde(default)]
    pub error_code: i32,
    #[serde(default)]
    pub error_name: String,
    #[serde(default)]
    pub error_type: String,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, code {}): {}",
            self.error_name, self.error_type, self.error_code, self.message
        )
    }
}

impl std::error::Error for QueryError {}

/// Error definitions
#[derive(Debug, Error)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationErr),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("server error: {0}")]
    Server(#[from] ServerError),

    #[error("query {query_id} failed: {error}")]
    Query { query_id: String, error: QueryError },

    #[error("malformed response from coordinator: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Returns the engine-side error when the query itself failed.
    pub fn query_error(&self) -> Option<&QueryError> {
        match self {
            Error::Query { error, .. } => Some(error),
            _ => None,
        }
    }
}
