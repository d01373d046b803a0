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

//! Builder for ExecuteStatement operation

use crate::trino::client::TrinoClient;
use crate::trino::error::ValidationErr;
use crate::trino::response::ExecuteStatementResponse;
use crate::trino::types::{ToTrinoRequest, TrinoApi, TrinoRequest};
use typed_builder::TypedBuilder;

/// Argument builder for ExecuteStatement operation
///
/// Submits one SQL statement and follows `nextUri` until it completes.
///
/// This struct constructs the parameters required for the
/// [`TrinoClient::execute_statement`](crate::trino::TrinoClient::execute_statement) method.
#[derive(Clone, Debug, TypedBuilder)]
pub struct ExecuteStatement {
    #[builder(!default)]
    client: TrinoClient,
    #[builder(!default, setter(into))]
    sql: String,
}

impl TrinoApi for ExecuteStatement {
    type TrinoResponse = ExecuteStatementResponse;
}

/// Builder type for [`ExecuteStatement`] that is returned by
/// [`TrinoClient::execute_statement`](crate::trino::TrinoClient::execute_statement).
pub type ExecuteStatementBldr = ExecuteStatementBuilder<((TrinoClient,), (String,))>;

impl ToTrinoRequest for ExecuteStatement {
    fn to_trino_request(self) -> Result<TrinoRequest, ValidationErr> {
        let sql = self.sql.trim();
        if sql.is_empty() {
            return Err(ValidationErr::EmptyStatement);
        }

        Ok(TrinoRequest {
            client: self.client,
            sql: sql.to_string(),
        })
    }
}
