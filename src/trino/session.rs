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

//! Client-side session state
//!
//! Trino keeps no per-connection state on the coordinator. The client sends
//! the current catalog, schema and session properties with every statement,
//! and the coordinator asks the client to change them through response
//! headers (for example after `USE` or `SET SESSION`).

use crate::trino::error::ValidationErr;
use crate::trino::header_constants::*;
use http::{HeaderMap, HeaderValue};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientSession {
    catalog: Option<String>,
    schema: Option<String>,
    properties: BTreeMap<String, String>,
}

impl ClientSession {
    pub fn catalog(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn set_catalog(&mut self, catalog: Option<String>) {
        self.catalog = catalog;
    }

    pub fn set_schema(&mut self, schema: Option<String>) {
        self.schema = schema;
    }

    /// Sets a session property sent with every later statement.
    pub fn set_property(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ValidationErr> {
        let name = name.into();
        if name.is_empty() || name.contains(['=', ',']) || name.trim() != name {
            return Err(ValidationErr::InvalidSessionProperty(name));
        }
        self.properties.insert(name, value.into());
        Ok(())
    }

    pub fn clear_property(&mut self, name: &str) {
        self.properties.remove(name);
    }

    /// Renders the session as request headers.
    pub fn headers(&self) -> Result<HeaderMap, ValidationErr> {
        let mut headers = HeaderMap::new();

        if let Some(catalog) = &self.catalog {
            headers.insert(X_TRINO_CATALOG, header_value(X_TRINO_CATALOG, catalog)?);
        }
        if let Some(schema) = &self.schema {
            headers.insert(X_TRINO_SCHEMA, header_value(X_TRINO_SCHEMA, schema)?);
        }
        if !self.properties.is_empty() {
            let rendered = self
                .properties
                .iter()
                .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
                .collect::<Vec<_>>()
                .join(",");
            headers.insert(X_TRINO_SESSION, header_value(X_TRINO_SESSION, &rendered)?);
        }

        Ok(headers)
    }

    /// Applies the session updates the coordinator returned with a response.
    pub fn apply_response_headers(&mut self, headers: &HeaderMap) {
        if let Some(catalog) = header_str(headers, X_TRINO_SET_CATALOG) {
            log::debug!("session catalog set to {catalog}");
            self.catalog = Some(catalog.to_string());
        }
        if let Some(schema) = header_str(headers, X_TRINO_SET_SCHEMA) {
            log::debug!("session schema set to {schema}");
            self.schema = Some(schema.to_string());
        }

        for value in headers.get_all(X_TRINO_SET_SESSION) {
            let Ok(value) = value.to_str() else {
                continue;
            };
            if let Some((name, encoded)) = value.split_once('=') {
                let decoded = urlencoding::decode(encoded)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| encoded.to_string());
                log::debug!("session property {name} set to {decoded}");
                self.properties.insert(name.trim().to_string(), decoded);
            }
        }

        for value in headers.get_all(X_TRINO_CLEAR_SESSION) {
            if let Ok(name) = value.to_str() {
                log::debug!("session property {name} cleared");
                self.clear_property(name.trim());
            }
        }
    }
}

pub(crate) fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, ValidationErr> {
    HeaderValue::from_str(value).map_err(|source| ValidationErr::InvalidHeaderValue { name, source })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
