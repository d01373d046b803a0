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

// Request headers
pub const X_TRINO_USER: &str = "X-Trino-User";
pub const X_TRINO_SOURCE: &str = "X-Trino-Source";
pub const X_TRINO_CATALOG: &str = "X-Trino-Catalog";
pub const X_TRINO_SCHEMA: &str = "X-Trino-Schema";
pub const X_TRINO_SESSION: &str = "X-Trino-Session";

// Response headers carrying session updates
pub const X_TRINO_SET_CATALOG: &str = "X-Trino-Set-Catalog";
pub const X_TRINO_SET_SCHEMA: &str = "X-Trino-Set-Schema";
pub const X_TRINO_SET_SESSION: &str = "X-Trino-Set-Session";
pub const X_TRINO_CLEAR_SESSION: &str = "X-Trino-Clear-Session";
