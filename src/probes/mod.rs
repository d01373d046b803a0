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

//! Validation probes run against a live cluster.
//!
//! Each probe issues a fixed sequence of statements over one client session
//! and stops at the first error. Nothing is retried.
//!
//! - [`WorkerCountProbe`]: active worker membership
//! - [`StorageRoundtripProbe`]: object-storage backed tables and CTAS

pub mod error;
pub mod storage_roundtrip;
pub mod worker_count;

pub use error::ProbeError;
pub use storage_roundtrip::{StorageFixture, StorageRoundtripProbe};
pub use worker_count::WorkerCountProbe;

use crate::trino::TrinoClient;
use crate::trino::response::ExecuteStatementResponse;
use crate::trino::types::TrinoApi;

/// Exit code reported when the probe ran but the cluster is not in the
/// expected state.
pub const MISMATCH_EXIT_CODE: i32 = -1;

/// Outcome of one probe invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeResult {
    pub success: bool,
    pub message: String,
    pub exit_code: i32,
}

impl ProbeResult {
    pub fn passed(message: impl Into<String>) -> Self {
        ProbeResult {
            success: true,
            message: message.into(),
            exit_code: 0,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ProbeResult {
            success: false,
            message: message.into(),
            exit_code: MISMATCH_EXIT_CODE,
        }
    }
}

pub(crate) async fn run_query(
    client: &TrinoClient,
    sql: &str,
) -> Result<ExecuteStatementResponse, ProbeError> {
    log::debug!("Executing query {sql}");
    Ok(client.execute_statement(sql).build().send().await?)
}

/// Reads the single integer a `COUNT(*)`-style statement returns.
pub(crate) fn single_count(
    resp: &ExecuteStatementResponse,
    step: &str,
) -> Result<u64, ProbeError> {
    let value = resp.first_value().ok_or_else(|| ProbeError::NoRows {
        step: step.to_string(),
    })?;
    value.as_u64().ok_or_else(|| ProbeError::NotAnInteger {
        step: step.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_result_exit_codes() {
        let ok = ProbeResult::passed("all good");
        assert!(ok.success);
        assert_eq!(ok.exit_code, 0);

        let bad = ProbeResult::failed("mismatch");
        assert!(!bad.success);
        assert_eq!(bad.exit_code, -1);
    }
}
