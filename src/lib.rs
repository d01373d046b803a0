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

//! # Trino smoke probes (`trino-probe`)
//!
//! Smoke checks for a Trino cluster deployed on Kubernetes, typically backed
//! by a MinIO or other S3-compatible bucket.
//!
//! - [`probes::WorkerCountProbe`] verifies the number of active workers.
//! - [`probes::StorageRoundtripProbe`] creates external tables over object
//!   storage, copies them with CTAS and verifies row counts.
//!
//! Both run over a [`trino::TrinoClient`], a small client for the coordinator's
//! REST statement protocol built with the same request-builder pattern as the
//! MinIO SDK: each operation has a builder implementing
//! [`trino::types::TrinoApi`], whose `send` returns a typed response.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use trino_probe::connection::ConnectionConfig;
//! use trino_probe::probes::WorkerCountProbe;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = ConnectionConfig::builder()
//!         .namespace("kuttl-test-1")
//!         .user("admin")
//!         .build()
//!         .connect()
//!         .unwrap();
//!
//!     let result = WorkerCountProbe::new(2).run(&client).await.unwrap();
//!     println!("{}", result.message);
//! }
//! ```

pub mod connection;
pub mod probes;
pub mod trino;
