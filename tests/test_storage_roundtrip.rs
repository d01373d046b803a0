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
use trino_probe::probes::storage_roundtrip::COORDINATOR_VERSION;
use trino_probe::probes::{ProbeError, StorageFixture, StorageRoundtripProbe};
use trino_probe_common::mock_coordinator::{MockCoordinator, ScriptedQuery};
use trino_probe_common::test_context::TestContext;

/// Row counts the scripted cluster reports for each stage.
struct Counts {
    source: u64,
    copy_written: u64,
    copy: u64,
    transform_written: u64,
    transformed: u64,
}

impl Default for Counts {
    fn default() -> Self {
        Counts {
            source: 5000,
            copy_written: 5000,
            copy: 5000,
            transform_written: 5000,
            transformed: 5000,
        }
    }
}

fn script_storage(coordinator: &MockCoordinator, counts: Counts) {
    let fixture = StorageFixture::default();
    coordinator
        .script(
            ScriptedQuery::new("node_version")
                .column("node_version", "varchar")
                .row(vec![json!("476")]),
        )
        // the source table name is a prefix of the others, so it goes last
        .script(ScriptedQuery::count(
            StorageFixture::count_sql(&fixture.copy_table),
            counts.copy,
        ))
        .script(ScriptedQuery::count(
            StorageFixture::count_sql(&fixture.transformed_table),
            counts.transformed,
        ))
        .script(ScriptedQuery::count(
            StorageFixture::count_sql(&fixture.source_table),
            counts.source,
        ))
        .script(ScriptedQuery::count(fixture.copy_sql(), counts.copy_written))
        .script(ScriptedQuery::count(
            fixture.transform_sql(),
            counts.transform_written,
        ));
}

fn expected_statements(fixture: &StorageFixture) -> Vec<String> {
    let mut statements = vec![COORDINATOR_VERSION.to_string(), fixture.create_schema_sql()];
    statements.extend(
        fixture
            .stale_tables
            .iter()
            .map(|t| StorageFixture::drop_table_sql(t)),
    );
    statements.extend([
        fixture.create_source_table_sql(),
        StorageFixture::count_sql(&fixture.source_table),
        fixture.copy_sql(),
        StorageFixture::count_sql(&fixture.copy_table),
        fixture.transform_sql(),
        StorageFixture::count_sql(&fixture.transformed_table),
    ]);
    statements
}

fn failed_step(err: ProbeError) -> String {
    match err {
        ProbeError::AssertionFailed { step, .. } => step,
        other => panic!("expected an assertion failure, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn storage_roundtrip_succeeds() {
    let ctx = TestContext::new().await;
    script_storage(&ctx.coordinator, Counts::default());

    let probe = StorageRoundtripProbe::default();
    let result = probe.run(&ctx.client).await.unwrap();

    assert!(result.success);
    assert_eq!(result.message, "[SUCCESS] All tests in check-s3 succeeded!");
    assert_eq!(
        ctx.coordinator.statements(),
        expected_statements(probe.fixture())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn zero_rows_written_is_tolerated() {
    let ctx = TestContext::new().await;
    script_storage(
        &ctx.coordinator,
        Counts {
            copy_written: 0,
            transform_written: 0,
            ..Default::default()
        },
    );

    let result = StorageRoundtripProbe::default()
        .run(&ctx.client)
        .await
        .unwrap();

    assert!(result.success);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn short_copy_fails() {
    let ctx = TestContext::new().await;
    script_storage(
        &ctx.coordinator,
        Counts {
            copy_written: 4999,
            ..Default::default()
        },
    );

    let probe = StorageRoundtripProbe::default();
    let err = probe.run(&ctx.client).await.unwrap_err();

    assert_eq!(failed_step(err), "copy table");
    assert_eq!(
        ctx.coordinator.statements().last(),
        Some(&probe.fixture().copy_sql())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn doubled_transform_fails() {
    let ctx = TestContext::new().await;
    script_storage(
        &ctx.coordinator,
        Counts {
            transform_written: 10000,
            ..Default::default()
        },
    );

    let err = StorageRoundtripProbe::default()
        .run(&ctx.client)
        .await
        .unwrap_err();

    assert_eq!(failed_step(err), "transform table");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn copied_table_count_mismatch_fails() {
    let ctx = TestContext::new().await;
    script_storage(
        &ctx.coordinator,
        Counts {
            copy_written: 0,
            copy: 4999,
            ..Default::default()
        },
    );

    let err = StorageRoundtripProbe::default()
        .run(&ctx.client)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "count copied table: expected 5000, got 4999"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn source_table_count_mismatch_fails() {
    let ctx = TestContext::new().await;
    script_storage(
        &ctx.coordinator,
        Counts {
            source: 0,
            ..Default::default()
        },
    );

    let probe = StorageRoundtripProbe::default();
    let err = probe.run(&ctx.client).await.unwrap_err();

    assert_eq!(failed_step(err), "count source table");
    // nothing is copied from a bad source
    assert!(
        !ctx.coordinator
            .statements()
            .contains(&probe.fixture().copy_sql())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blank_version_is_accepted() {
    let ctx = TestContext::new().await;
    ctx.coordinator.script(
        ScriptedQuery::new("node_version")
            .column("node_version", "varchar")
            .row(vec![json!("")]),
    );
    script_storage(&ctx.coordinator, Counts::default());

    let result = StorageRoundtripProbe::default()
        .run(&ctx.client)
        .await
        .unwrap();

    assert!(result.success);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn storage_failure_stops_the_probe() {
    let ctx = TestContext::new().await;
    ctx.coordinator.script(
        ScriptedQuery::new("CREATE SCHEMA")
            .fail("HIVE_METASTORE_ERROR", "Failed connecting to Hive metastore"),
    );
    script_storage(&ctx.coordinator, Counts::default());

    let err = StorageRoundtripProbe::default()
        .run(&ctx.client)
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::Trino(_)), "got {err:?}");
    assert_eq!(ctx.coordinator.statements().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rerun_is_idempotent() {
    let ctx = TestContext::new().await;
    script_storage(&ctx.coordinator, Counts::default());
    let probe = StorageRoundtripProbe::default();

    let first = probe.run(&ctx.client).await.unwrap();
    let second = probe.run(&ctx.client).await.unwrap();

    assert_eq!(first, second);
    let statements = ctx.coordinator.statements();
    let half = statements.len() / 2;
    assert_eq!(statements[..half], statements[half..]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn custom_fixture() {
    let ctx = TestContext::new().await;
    let fixture = StorageFixture {
        schema: "hive.probe".to_string(),
        schema_location: "s3a://probe/".to_string(),
        data_location: "s3a://probe/data/".to_string(),
        source_table: "hive.probe.src".to_string(),
        copy_table: "hive.probe.src_copy".to_string(),
        transformed_table: "hive.probe.src_cast".to_string(),
        stale_tables: vec!["hive.probe.src".to_string()],
        expected_rows: 12,
    };
    ctx.coordinator
        .script(
            ScriptedQuery::new("node_version")
                .column("node_version", "varchar")
                .row(vec![json!("476")]),
        )
        .script(ScriptedQuery::count(StorageFixture::count_sql(&fixture.copy_table), 12))
        .script(ScriptedQuery::count(
            StorageFixture::count_sql(&fixture.transformed_table),
            12,
        ))
        .script(ScriptedQuery::count(StorageFixture::count_sql(&fixture.source_table), 12))
        .script(ScriptedQuery::count(fixture.copy_sql(), 12))
        .script(ScriptedQuery::count(fixture.transform_sql(), 0));

    let probe = StorageRoundtripProbe::new(fixture.clone());
    let result = probe.run(&ctx.client).await.unwrap();

    assert!(result.success);
    assert_eq!(ctx.coordinator.statements(), expected_statements(&fixture));
}
