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
use trino_probe::connection::ConnectionConfig;
use trino_probe::trino::error::{Error, ServerError, ValidationErr};
use trino_probe::trino::response::ExecuteStatementResponse;
use trino_probe::trino::types::TrinoApi;
use trino_probe_common::mock_coordinator::{MockCoordinator, ScriptedQuery};
use trino_probe_common::test_context::TestContext;
use trino_probe_common::utils::unreachable_port;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn execute_statement_follows_next_uri() {
    let ctx = TestContext::new().await;
    ctx.coordinator.script(
        ScriptedQuery::new("SHOW SCHEMAS")
            .column("Schema", "varchar")
            .row(vec![json!("default")])
            .row(vec![json!("information_schema")])
            .row(vec![json!("minio")])
            .rows_per_page(1),
    );

    let resp: ExecuteStatementResponse = ctx
        .client
        .execute_statement("SHOW SCHEMAS")
        .build()
        .send()
        .await
        .unwrap();

    assert_eq!(resp.sql(), "SHOW SCHEMAS");
    assert_eq!(resp.columns().len(), 1);
    assert_eq!(resp.columns()[0].name, "Schema");
    assert_eq!(
        resp.rows(),
        &[
            vec![json!("default")],
            vec![json!("information_schema")],
            vec![json!("minio")],
        ]
    );
    assert_eq!(resp.state(), Some("FINISHED"));
    assert!(!resp.query_id().is_empty());

    // one submission, then the queued page plus three data pages
    let requests = ctx.coordinator.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[0].method, "POST");
    assert!(requests[1..].iter().all(|r| r.method == "GET"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn execute_statement_reads_scalar() {
    let ctx = TestContext::new().await;
    ctx.coordinator
        .script(ScriptedQuery::count("FROM system.runtime.nodes", 7));

    let resp = ctx
        .client
        .execute_statement("SELECT COUNT(*) FROM system.runtime.nodes")
        .build()
        .send()
        .await
        .unwrap();

    assert_eq!(resp.scalar_u64(), Some(7));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn statement_without_rows() {
    let ctx = TestContext::new().await;
    ctx.coordinator
        .script(ScriptedQuery::new("CREATE SCHEMA").update_type("CREATE SCHEMA"));

    let resp = ctx
        .client
        .execute_statement("CREATE SCHEMA IF NOT EXISTS hive.minio")
        .build()
        .send()
        .await
        .unwrap();

    assert!(resp.rows().is_empty());
    assert!(resp.first_value().is_none());
    assert_eq!(resp.update_type(), Some("CREATE SCHEMA"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn submission_carries_session_headers() {
    let ctx = TestContext::new().await;

    ctx.client
        .execute_statement("  SELECT 1  ")
        .build()
        .send()
        .await
        .unwrap();

    let submitted = ctx.coordinator.statement_requests();
    assert_eq!(submitted.len(), 1);
    let req = &submitted[0];
    assert_eq!(req.body, "SELECT 1");
    assert_eq!(req.header("X-Trino-User"), Some("admin"));
    assert_eq!(req.header("X-Trino-Source"), Some("trino-probe"));
    assert_eq!(
        req.header("X-Trino-Session"),
        Some("query_max_execution_time=60s")
    );
    assert!(req.header("X-Trino-Catalog").is_none());
    assert!(req.header("Authorization").is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn basic_auth_sends_credentials() {
    let coordinator = MockCoordinator::start().await;
    let client = TestContext::config_for(&coordinator, true)
        .connect()
        .unwrap();

    client
        .execute_statement("SELECT 1")
        .build()
        .send()
        .await
        .unwrap();

    let requests = coordinator.requests();
    assert!(!requests.is_empty());
    for req in &requests {
        assert_eq!(req.header("Authorization"), Some("Basic YWRtaW46YWRtaW4="));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn query_failure_is_an_error() {
    let ctx = TestContext::new().await;
    ctx.coordinator.script(ScriptedQuery::new("hive.minio.nope").fail(
        "TABLE_NOT_FOUND",
        "line 1:22: Table 'hive.minio.nope' does not exist",
    ));

    let err = ctx
        .client
        .execute_statement("SELECT COUNT(*) FROM hive.minio.nope")
        .build()
        .send()
        .await
        .unwrap_err();

    match &err {
        Error::Query { query_id, error } => {
            assert!(!query_id.is_empty());
            assert_eq!(error.error_name, "TABLE_NOT_FOUND");
            assert_eq!(error.error_type, "USER_ERROR");
        }
        other => panic!("expected a query error, got {other:?}"),
    }
    assert!(err.to_string().contains("does not exist"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn http_status_is_a_server_error() {
    let ctx = TestContext::new().await;
    ctx.coordinator.fail_all_requests(503, "coordinator is starting");

    let err = ctx
        .client
        .execute_statement("SELECT 1")
        .build()
        .send()
        .await
        .unwrap_err();

    match err {
        Error::Server(ServerError { status, body, .. }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "coordinator is starting");
        }
        other => panic!("expected a server error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_statement_is_not_sent() {
    let ctx = TestContext::new().await;

    let err = ctx
        .client
        .execute_statement(" \n\t ")
        .build()
        .send()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationErr::EmptyStatement)
    ));
    assert!(ctx.coordinator.requests().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_coordinator_is_a_network_error() {
    let client = ConnectionConfig::builder()
        .namespace("kuttl-test-probe")
        .user("admin")
        .host_override("127.0.0.1")
        .port(unreachable_port())
        .build()
        .connect()
        .unwrap();

    let err = client
        .execute_statement("SELECT 1")
        .build()
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network(_)), "got {err:?}");
}
