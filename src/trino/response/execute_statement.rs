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

use crate::trino::error::Error;
use crate::trino::types::{Column, FromTrinoResponse, QueryResults, TrinoRequest};
use serde_json::Value;

/// Result of a statement run to completion.
///
/// Rows from every page are concatenated in the order the coordinator sent
/// them.
#[derive(Clone, Debug)]
pub struct ExecuteStatementResponse {
    request: TrinoRequest,
    query_id: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
    update_type: Option<String>,
    update_count: Option<u64>,
    state: Option<String>,
}

impl ExecuteStatementResponse {
    pub(crate) fn from_pages(request: TrinoRequest, pages: Vec<QueryResults>) -> Self {
        let mut resp = ExecuteStatementResponse {
            request,
            query_id: String::new(),
            columns: Vec::new(),
            rows: Vec::new(),
            update_type: None,
            update_count: None,
            state: None,
        };

        for page in pages {
            resp.query_id = page.id;
            if resp.columns.is_empty()
                && let Some(columns) = page.columns
            {
                resp.columns = columns;
            }
            if let Some(data) = page.data {
                resp.rows.extend(data);
            }
            if page.update_type.is_some() {
                resp.update_type = page.update_type;
            }
            if page.update_count.is_some() {
                resp.update_count = page.update_count;
            }
            if let Some(stats) = page.stats {
                resp.state = Some(stats.state);
            }
        }

        resp
    }

    /// The statement text that was executed.
    pub fn sql(&self) -> &str {
        &self.request.sql
    }

    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Final state reported by the coordinator, e.g. `FINISHED`.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// Kind of update performed, e.g. `CREATE TABLE` or `DROP TABLE`.
    pub fn update_type(&self) -> Option<&str> {
        self.update_type.as_deref()
    }

    pub fn update_count(&self) -> Option<u64> {
        self.update_count
    }

    /// First column of the first row.
    pub fn first_value(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }

    /// First value as an unsigned integer, if it is one.
    pub fn scalar_u64(&self) -> Option<u64> {
        self.first_value().and_then(Value::as_u64)
    }

    /// First value as a string, if it is one.
    pub fn scalar_string(&self) -> Option<&str> {
        self.first_value().and_then(Value::as_str)
    }
}

#[async_trait::async_trait]
impl FromTrinoResponse for ExecuteStatementResponse {
    async fn from_trino_response(
        request: TrinoRequest,
        pages: Result<Vec<QueryResults>, Error>,
    ) -> Result<Self, Error> {
        Ok(Self::from_pages(request, pages?))
    }
}
