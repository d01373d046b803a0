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

//! Client method for ExecuteStatement operation

use crate::trino::builders::{ExecuteStatement, ExecuteStatementBldr};
use crate::trino::client::TrinoClient;

impl TrinoClient {
    /// Creates an [`ExecuteStatement`] request builder for one SQL statement.
    ///
    /// To execute the request, call [`ExecuteStatement::send()`](crate::trino::types::TrinoApi::send),
    /// which returns a [`Result`] containing an [`ExecuteStatementResponse`](crate::trino::response::ExecuteStatementResponse).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use trino_probe::trino::TrinoClient;
    /// use trino_probe::trino::types::TrinoApi;
    /// use trino_probe::trino::response::ExecuteStatementResponse;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let client = TrinoClient::new("http://localhost:8080".parse().unwrap(), "admin").unwrap();
    ///     let resp: ExecuteStatementResponse = client
    ///         .execute_statement("SELECT COUNT(*) FROM system.runtime.nodes")
    ///         .build()
    ///         .send()
    ///         .await
    ///         .unwrap();
    ///     println!("nodes: {:?}", resp.first_value());
    /// }
    /// ```
    pub fn execute_statement<S: Into<String>>(&self, sql: S) -> ExecuteStatementBldr {
        ExecuteStatement::builder().client(self.clone()).sql(sql)
    }
}
