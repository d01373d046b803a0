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

use crate::mock_coordinator::MockCoordinator;
use std::time::Duration;
use trino_probe::connection::ConnectionConfig;
use trino_probe::trino::TrinoClient;

pub const TEST_NAMESPACE: &str = "kuttl-test-probe";
pub const TEST_USER: &str = "admin";
pub const TEST_PASSWORD: &str = "admin";

/// A mock coordinator plus a client session connected to it.
pub struct TestContext {
    pub coordinator: MockCoordinator,
    pub client: TrinoClient,
}

impl TestContext {
    pub async fn new() -> Self {
        let coordinator = MockCoordinator::start().await;
        let client = Self::config_for(&coordinator, false)
            .connect()
            .expect("connect to mock coordinator");
        Self {
            coordinator,
            client,
        }
    }

    /// Connection settings pointing at `coordinator` instead of the
    /// in-cluster service name.
    pub fn config_for(coordinator: &MockCoordinator, basic_auth: bool) -> ConnectionConfig {
        let _ = env_logger::builder().is_test(true).try_init();
        ConnectionConfig::builder()
            .namespace(TEST_NAMESPACE)
            .user(TEST_USER)
            .password(TEST_PASSWORD)
            .host_override("127.0.0.1")
            .port(coordinator.port())
            .query_timeout(Duration::from_secs(60))
            .basic_auth(basic_auth)
            .build()
    }

    /// A fresh session against the same coordinator.
    pub fn reconnect(&self) -> TrinoClient {
        Self::config_for(&self.coordinator, false)
            .connect()
            .expect("connect to mock coordinator")
    }
}

