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

//! Object storage round-trip check
//!
//! Loads a CSV dataset from the bucket as an external Hive table, copies it
//! with CTAS, copies it again while casting columns, and checks the row
//! count at every stage. Stale tables from earlier runs are dropped first so
//! repeated runs end in the same state.
//!
//! For CTAS the engine may report zero rows written even though the table
//! is fully populated, so a reported count of either the true row count or
//! zero is accepted. The follow-up `COUNT(*)` is what proves the copy.

use crate::probes::{ProbeError, ProbeResult, run_query, single_count};
use crate::trino::TrinoClient;

/// Columns of the taxi dataset, with the type each is cast to in the
/// transformed copy. `None` keeps the column as `VARCHAR`.
const TAXI_COLUMNS: [(&str, Option<&str>); 6] = [
    ("vendor_id", Some("BIGINT")),
    ("tpep_pickup_datetime", None),
    ("tpep_dropoff_datetime", None),
    ("passenger_count", Some("BIGINT")),
    ("trip_distance", Some("DOUBLE")),
    ("ratecode_id", Some("BIGINT")),
];

pub const COORDINATOR_VERSION: &str = "select node_version from system.runtime.nodes \
     where coordinator = true and state = 'active'";

/// Tables, locations and expected counts used by [`StorageRoundtripProbe`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageFixture {
    pub schema: String,
    pub schema_location: String,
    pub data_location: String,
    pub source_table: String,
    pub copy_table: String,
    pub transformed_table: String,
    /// Dropped before anything is created.
    pub stale_tables: Vec<String>,
    pub expected_rows: u64,
}

impl Default for StorageFixture {
    fn default() -> Self {
        StorageFixture {
            schema: "hive.minio".to_string(),
            schema_location: "s3a://trino/".to_string(),
            data_location: "s3a://trino/taxi-data/".to_string(),
            source_table: "hive.minio.taxi_data".to_string(),
            copy_table: "hive.minio.taxi_data_copy".to_string(),
            transformed_table: "hive.minio.taxi_data_transformed".to_string(),
            stale_tables: vec![
                "hive.minio.taxi_data".to_string(),
                "hive.minio.taxi_data_copy".to_string(),
                "hive.minio.taxi_data_transformed".to_string(),
                "hive.hdfs.taxi_data_copy".to_string(),
                "iceberg.minio.taxi_data_copy_iceberg".to_string(),
            ],
            expected_rows: 5000,
        }
    }
}

impl StorageFixture {
    pub fn create_schema_sql(&self) -> String {
        format!(
            "CREATE SCHEMA IF NOT EXISTS {} WITH (location = '{}')",
            self.schema, self.schema_location
        )
    }

    pub fn drop_table_sql(table: &str) -> String {
        format!("DROP TABLE IF EXISTS {table}")
    }

    pub fn create_source_table_sql(&self) -> String {
        let columns = TAXI_COLUMNS
            .iter()
            .map(|(name, _)| format!("    {name} VARCHAR"))
            .collect::<Vec<_>>()
            .join(",\n");
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{columns}\n) WITH (\n    \
             external_location = '{}',\n    format = 'csv',\n    skip_header_line_count = 1\n)",
            self.source_table, self.data_location
        )
    }

    pub fn count_sql(table: &str) -> String {
        format!("SELECT COUNT(*) FROM {table}")
    }

    pub fn copy_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} AS SELECT * FROM {}",
            self.copy_table, self.source_table
        )
    }

    pub fn transform_sql(&self) -> String {
        let projections = TAXI_COLUMNS
            .iter()
            .map(|(name, cast)| match cast {
                Some(ty) => format!("    CAST({name} AS {ty}) AS {name}"),
                None => format!("    {name}"),
            })
            .collect::<Vec<_>>()
            .join(",\n");
        format!(
            "CREATE TABLE IF NOT EXISTS {} AS\nSELECT\n{projections}\nFROM {}",
            self.transformed_table, self.source_table
        )
    }
}

/// Whether a CTAS rows-written report is acceptable for `expected` rows.
pub fn rows_written_acceptable(reported: u64, expected: u64) -> bool {
    reported == expected || reported == 0
}

fn assert_row_count(step: &str, actual: u64, expected: u64) -> Result<(), ProbeError> {
    if actual != expected {
        return Err(ProbeError::AssertionFailed {
            step: step.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

fn assert_rows_written(step: &str, reported: u64, expected: u64) -> Result<(), ProbeError> {
    if !rows_written_acceptable(reported, expected) {
        return Err(ProbeError::AssertionFailed {
            step: step.to_string(),
            expected: format!("{expected} or 0 rows written"),
            actual: reported.to_string(),
        });
    }
    Ok(())
}

/// Creates, copies and transforms object-storage backed tables and checks
/// row counts along the way.
#[derive(Clone, Debug, Default)]
pub struct StorageRoundtripProbe {
    fixture: StorageFixture,
}

impl StorageRoundtripProbe {
    pub fn new(fixture: StorageFixture) -> Self {
        Self { fixture }
    }

    pub fn fixture(&self) -> &StorageFixture {
        &self.fixture
    }

    /// Runs every step in order. The first failed statement or assertion is
    /// returned as an error.
    pub async fn run(&self, client: &TrinoClient) -> Result<ProbeResult, ProbeError> {
        let fixture = &self.fixture;
        let expected = fixture.expected_rows;

        let resp = run_query(client, COORDINATOR_VERSION).await?;
        let version = resp
            .first_value()
            .ok_or_else(|| ProbeError::NoRows {
                step: "query coordinator version".to_string(),
            })?
            .as_str()
            .unwrap_or_default()
            .to_string();
        // The version is blank in some test environments, so it is not checked.
        log::info!("Testing against Trino version \"{version}\"");

        run_query(client, &fixture.create_schema_sql()).await?;

        for table in &fixture.stale_tables {
            run_query(client, &StorageFixture::drop_table_sql(table)).await?;
        }

        run_query(client, &fixture.create_source_table_sql()).await?;
        let resp = run_query(client, &StorageFixture::count_sql(&fixture.source_table)).await?;
        let count = single_count(&resp, "count source table")?;
        assert_row_count("count source table", count, expected)?;
        log::info!("{} holds {count} rows", fixture.source_table);

        let resp = run_query(client, &fixture.copy_sql()).await?;
        let written = single_count(&resp, "copy table")?;
        assert_rows_written("copy table", written, expected)?;
        let resp = run_query(client, &StorageFixture::count_sql(&fixture.copy_table)).await?;
        let count = single_count(&resp, "count copied table")?;
        assert_row_count("count copied table", count, expected)?;
        log::info!("{} holds {count} rows", fixture.copy_table);

        let resp = run_query(client, &fixture.transform_sql()).await?;
        let written = single_count(&resp, "transform table")?;
        assert_rows_written("transform table", written, expected)?;
        let resp = run_query(
            client,
            &StorageFixture::count_sql(&fixture.transformed_table),
        )
        .await?;
        let count = single_count(&resp, "count transformed table")?;
        assert_row_count("count transformed table", count, expected)?;
        log::info!("{} holds {count} rows", fixture.transformed_table);

        Ok(ProbeResult::passed(
            "[SUCCESS] All tests in check-s3 succeeded!",
        ))
    }
}
