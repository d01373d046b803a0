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

//! Active worker membership check

use crate::probes::{ProbeError, ProbeResult, run_query, single_count};
use crate::trino::TrinoClient;

pub const USE_HIVE_DEFAULT: &str = r#"USE "hive"."default""#;
pub const SHOW_SCHEMAS: &str = "SHOW SCHEMAS";
pub const SHOW_HIVE_DEFAULT_TABLES: &str = r#"SHOW TABLES FROM "hive"."default""#;
pub const COUNT_ACTIVE_WORKERS: &str = "SELECT COUNT(*) AS nodes FROM system.runtime.nodes \
     WHERE coordinator = false AND state = 'active'";

/// Expected cluster state for [`WorkerCountProbe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpectedState {
    pub expected_worker_count: u64,
}

/// Compares the number of active, non-coordinator nodes with an expected count.
#[derive(Clone, Debug)]
pub struct WorkerCountProbe {
    expected: ExpectedState,
}

impl WorkerCountProbe {
    pub fn new(expected_worker_count: u64) -> Self {
        Self {
            expected: ExpectedState {
                expected_worker_count,
            },
        }
    }

    pub fn expected(&self) -> ExpectedState {
        self.expected
    }

    /// Runs the probe. A count mismatch is a failed [`ProbeResult`]; any
    /// query failure is returned as an error.
    pub async fn run(&self, client: &TrinoClient) -> Result<ProbeResult, ProbeError> {
        run_query(client, USE_HIVE_DEFAULT).await?;
        log::info!("USE command executed successfully.");

        let schemas = run_query(client, SHOW_SCHEMAS).await?;
        log::info!("Schemas: {:?}", schemas.rows());

        let tables = run_query(client, SHOW_HIVE_DEFAULT_TABLES).await?;
        log::info!("Tables: {:?}", tables.rows());

        let resp = run_query(client, COUNT_ACTIVE_WORKERS).await?;
        let active_workers = single_count(&resp, "count active workers")?;

        Ok(self.evaluate(active_workers))
    }

    /// Exact comparison of the active worker count with the expectation.
    pub fn evaluate(&self, active_workers: u64) -> ProbeResult {
        let expected = self.expected.expected_worker_count;
        if active_workers == expected {
            ProbeResult::passed(format!(
                "Test check-active-workers succeeded! [{active_workers}] active workers"
            ))
        } else {
            ProbeResult::failed(format!(
                "Mismatch: [expected/active] workers [{expected}/{active_workers}]"
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_match() {
        let probe = WorkerCountProbe::new(2);
        let result = probe.evaluate(2);
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn test_evaluate_mismatch() {
        let result = WorkerCountProbe::new(3).evaluate(2);
        assert!(!result.success);
        assert_eq!(result.exit_code, -1);
        assert_eq!(result.message, "Mismatch: [expected/active] workers [3/2]");
    }

    #[test]
    fn test_success_iff_equal() {
        for expected in 0..5u64 {
            for actual in 0..5u64 {
                let result = WorkerCountProbe::new(expected).evaluate(actual);
                assert_eq!(result.success, expected == actual);
                assert_eq!(result.exit_code == 0, expected == actual);
            }
        }
    }
}
