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

use serde_json::json;
use trino_probe::probes::ProbeError;
use trino_probe::probes::worker_count::{
    COUNT_ACTIVE_WORKERS, SHOW_HIVE_DEFAULT_TABLES, SHOW_SCHEMAS, USE_HIVE_DEFAULT,
    WorkerCountProbe,
};
use trino_probe_common::mock_coordinator::ScriptedQuery;
use trino_probe_common::test_context::TestContext;

fn script_cluster(ctx: &TestContext, active_workers: u64) {
    ctx.coordinator
        .script(
            ScriptedQuery::new(USE_HIVE_DEFAULT)
                .update_type("USE")
                .response_header("X-Trino-Set-Catalog", "hive")
                .response_header("X-Trino-Set-Schema", "default"),
        )
        .script(
            ScriptedQuery::new(SHOW_SCHEMAS)
                .column("Schema", "varchar")
                .row(vec![json!("default")])
                .row(vec![json!("information_schema")]),
        )
        .script(ScriptedQuery::new(SHOW_HIVE_DEFAULT_TABLES).column("Table", "varchar"))
        .script(ScriptedQuery::count(COUNT_ACTIVE_WORKERS, active_workers));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn active_workers_match() {
    let ctx = TestContext::new().await;
    script_cluster(&ctx, 2);

    let result = WorkerCountProbe::new(2).run(&ctx.client).await.unwrap();

    assert!(result.success);
    assert_eq!(result.exit_code, 0);
    assert_eq!(
        result.message,
        "Test check-active-workers succeeded! [2] active workers"
    );
    assert_eq!(
        ctx.coordinator.statements(),
        vec![
            USE_HIVE_DEFAULT,
            SHOW_SCHEMAS,
            SHOW_HIVE_DEFAULT_TABLES,
            COUNT_ACTIVE_WORKERS,
        ]
    );

    // the count runs in the session USE selected
    let count = &ctx.coordinator.statement_requests()[3];
    assert_eq!(count.header("X-Trino-Catalog"), Some("hive"));
    assert_eq!(count.header("X-Trino-Schema"), Some("default"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn active_workers_mismatch() {
    let ctx = TestContext::new().await;
    script_cluster(&ctx, 2);

    let result = WorkerCountProbe::new(3).run(&ctx.client).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.exit_code, -1);
    assert!(result.message.contains("[3/2]"), "{}", result.message);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn zero_workers_expected() {
    let ctx = TestContext::new().await;
    script_cluster(&ctx, 0);

    let result = WorkerCountProbe::new(0).run(&ctx.client).await.unwrap();

    assert!(result.success);
    assert!(result.message.contains("[0] active workers"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_use_stops_the_probe() {
    let ctx = TestContext::new().await;
    ctx.coordinator.script(
        ScriptedQuery::new(USE_HIVE_DEFAULT).fail("CATALOG_NOT_FOUND", "Catalog 'hive' not found"),
    );

    let err = WorkerCountProbe::new(2).run(&ctx.client).await.unwrap_err();

    assert!(matches!(err, ProbeError::Trino(_)), "got {err:?}");
    assert_eq!(ctx.coordinator.statements(), vec![USE_HIVE_DEFAULT]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn count_without_rows_is_an_error() {
    let ctx = TestContext::new().await;
    ctx.coordinator
        .script(ScriptedQuery::new(COUNT_ACTIVE_WORKERS).column("nodes", "bigint"));

    let err = WorkerCountProbe::new(2).run(&ctx.client).await.unwrap_err();

    assert!(matches!(err, ProbeError::NoRows { .. }), "got {err:?}");
}
