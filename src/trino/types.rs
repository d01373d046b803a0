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

//! Core types of the Trino client protocol

use crate::trino::client::TrinoClient;
use crate::trino::error::{Error, QueryError, ValidationErr};
use serde::Deserialize;
use serde_json::Value;

/// One page of results, as returned by `POST /v1/statement` and by every
/// `nextUri` that follows it.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults {
    pub id: String,
    pub info_uri: Option<String>,
    pub partial_cancel_uri: Option<String>,
    pub next_uri: Option<String>,
    pub columns: Option<Vec<Column>>,
    pub data: Option<Vec<Vec<Value>>>,
    pub stats: Option<StatementStats>,
    pub error: Option<QueryError>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
    pub update_type: Option<String>,
    pub update_count: Option<u64>,
}

/// Column description
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Progress information of a running statement
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatementStats {
    pub state: String,
    pub queued: bool,
    pub scheduled: bool,
    pub nodes: u32,
    pub total_splits: u64,
    pub completed_splits: u64,
    pub processed_rows: u64,
    pub processed_bytes: u64,
    pub elapsed_time_millis: u64,
}

/// Non-fatal warning attached to a statement
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Warning {
    pub message: String,
}

/// Request to submit one statement to the coordinator
#[derive(Clone, Debug)]
pub struct TrinoRequest {
    /// Client reference
    pub client: TrinoClient,
    /// Statement text sent as the request body
    pub sql: String,
}

impl TrinoRequest {
    /// Submits the statement and follows `nextUri` until the statement
    /// completes, returning every page received.
    ///
    /// # Errors
    ///
    /// Returns `Error` on transport failure, a non-success HTTP status, or a
    /// query failure reported by the engine.
    pub(crate) async fn execute(&self) -> Result<Vec<QueryResults>, Error> {
        let mut results = self.client.submit_statement(&self.sql).await?;
        let mut pages = Vec::new();

        loop {
            if let Some(error) = results.error.take() {
                return Err(Error::Query {
                    query_id: results.id,
                    error,
                });
            }
            for warning in &results.warnings {
                log::warn!("query {}: {}", results.id, warning.message);
            }

            let next_uri = results.next_uri.clone();
            pages.push(results);

            match next_uri {
                Some(uri) => results = self.client.fetch_next(&uri).await?,
                None => break,
            }
        }

        Ok(pages)
    }
}

/// Convert builder to TrinoRequest
pub trait ToTrinoRequest {
    /// Convert this builder into a TrinoRequest
    ///
    /// # Errors
    ///
    /// Returns `ValidationErr` if the request parameters are invalid.
    fn to_trino_request(self) -> Result<TrinoRequest, ValidationErr>;
}

/// Execute Trino API operation
pub trait TrinoApi: ToTrinoRequest {
    /// Response type for this operation
    type TrinoResponse: FromTrinoResponse;

    /// Send the request and await the response
    ///
    /// # Errors
    ///
    /// Returns `Error` if the request fails or the response cannot be parsed.
    fn send(self) -> impl std::future::Future<Output = Result<Self::TrinoResponse, Error>> + Send
    where
        Self: Sized + Send,
    {
        async move {
            let request: TrinoRequest = self.to_trino_request()?;
            let pages: Result<Vec<QueryResults>, Error> = request.execute().await;
            Self::TrinoResponse::from_trino_response(request, pages).await
        }
    }
}

/// Parse response from Trino API
#[async_trait::async_trait]
pub trait FromTrinoResponse: Sized {
    /// Assemble the response from the pages of a finished statement
    ///
    /// # Errors
    ///
    /// Returns `Error` if the statement failed or its pages are inconsistent.
    async fn from_trino_response(
        request: TrinoRequest,
        pages: Result<Vec<QueryResults>, Error>,
    ) -> Result<Self, Error>;
}
