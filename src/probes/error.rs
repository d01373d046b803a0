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

use crate::trino::error::Error;
use thiserror::Error;

/// Fatal probe failures. Any of these aborts the probe run.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Trino(#[from] Error),

    #[error("{step}: query returned no rows")]
    NoRows { step: String },

    #[error("{step}: expected an integer, got {value}")]
    NotAnInteger { step: String, value: String },

    #[error("{step}: expected {expected}, got {actual}")]
    AssertionFailed {
        step: String,
        expected: String,
        actual: String,
    },
}
