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

//! Connection settings for a coordinator deployed in a Kubernetes namespace.
//!
//! The coordinator runs as pod `0` of the `<cluster>-coordinator-<group>`
//! stateful set and is reached through its headless service:
//!
//! ```text
//! <cluster>-coordinator-<group>-0.<cluster>-coordinator-<group>.<namespace>.svc.cluster.local
//! ```

use crate::trino::creds::StaticProvider;
use crate::trino::error::{Error, ValidationErr};
use crate::trino::http::{BaseUrl, Scheme};
use crate::trino::{TrinoClient, TrinoClientBuilder};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_CLUSTER_NAME: &str = "test-trino";
pub const DEFAULT_ROLE_GROUP: &str = "default";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HTTPS_PORT: u16 = 8443;
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(60);

/// Session property bounding how long the coordinator lets a query run.
pub const QUERY_MAX_EXECUTION_TIME: &str = "query_max_execution_time";

lazy_static! {
    static ref DNS_LABEL_REGEX: Regex =
        Regex::new(r"^[a-z0-9]([-a-z0-9]{0,61}[a-z0-9])?$").unwrap();
}

/// Settings of one probe session. Immutable once built.
///
/// # Example
///
/// ```
/// use trino_probe::connection::ConnectionConfig;
///
/// let config = ConnectionConfig::builder()
///     .namespace("kuttl-test-1")
///     .user("admin")
///     .build();
/// assert_eq!(
///     config.coordinator_host(),
///     "test-trino-coordinator-default-0.test-trino-coordinator-default.kuttl-test-1.svc.cluster.local"
/// );
/// ```
#[derive(Clone, TypedBuilder)]
pub struct ConnectionConfig {
    #[builder(setter(into))]
    namespace: String,
    #[builder(setter(into))]
    user: String,
    /// Only sent when `basic_auth` is enabled.
    #[builder(default, setter(strip_option, into))]
    password: Option<String>,
    #[builder(default = DEFAULT_CLUSTER_NAME.to_string(), setter(into))]
    cluster_name: String,
    #[builder(default = DEFAULT_ROLE_GROUP.to_string(), setter(into))]
    role_group: String,
    /// Replaces the in-cluster DNS name, e.g. `127.0.0.1` behind a port-forward.
    #[builder(default, setter(strip_option, into))]
    host_override: Option<String>,
    /// Defaults to the coordinator's port for `scheme`.
    #[builder(default, setter(into))]
    port: Option<u16>,
    #[builder(default)]
    scheme: Scheme,
    #[builder(default = DEFAULT_QUERY_TIMEOUT)]
    query_timeout: Duration,
    #[builder(default = false)]
    tls_verify: bool,
    #[builder(default = false)]
    basic_auth: bool,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("namespace", &self.namespace)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "*****"))
            .field("cluster_name", &self.cluster_name)
            .field("role_group", &self.role_group)
            .field("host_override", &self.host_override)
            .field("port", &self.port())
            .field("scheme", &self.scheme)
            .field("query_timeout", &self.query_timeout)
            .field("tls_verify", &self.tls_verify)
            .field("basic_auth", &self.basic_auth)
            .finish()
    }
}

impl ConnectionConfig {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(match self.scheme {
            Scheme::Http => DEFAULT_PORT,
            Scheme::Https => DEFAULT_HTTPS_PORT,
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    pub fn tls_verify(&self) -> bool {
        self.tls_verify
    }

    /// Host name of the coordinator, derived from the namespace unless overridden.
    pub fn coordinator_host(&self) -> String {
        if let Some(host) = &self.host_override {
            return host.clone();
        }
        let service = format!("{}-coordinator-{}", self.cluster_name, self.role_group);
        format!(
            "{service}-0.{service}.{}.svc.cluster.local",
            self.namespace
        )
    }

    pub fn base_url(&self) -> BaseUrl {
        BaseUrl::new(self.scheme, self.coordinator_host(), self.port())
    }

    /// Builds a client session for the configured coordinator.
    ///
    /// No request is sent here; the first statement is the first contact
    /// with the coordinator and fails if it is unreachable.
    pub fn connect(&self) -> Result<TrinoClient, Error> {
        if self.host_override.is_none() && !DNS_LABEL_REGEX.is_match(&self.namespace) {
            return Err(ValidationErr::InvalidNamespace(self.namespace.clone()).into());
        }

        let provider = match (&self.password, self.basic_auth) {
            (Some(password), true) => Some(StaticProvider::new(&self.user, password)),
            _ => None,
        };

        let base_url = self.base_url();
        log::debug!(
            "connecting to {base_url} as {} (tls verify: {}, basic auth: {})",
            self.user,
            self.tls_verify,
            provider.is_some()
        );

        TrinoClientBuilder::new(base_url, self.user.clone())
            .provider(provider)
            .ignore_cert_check(Some(!self.tls_verify))
            .session_property(QUERY_MAX_EXECUTION_TIME, format_duration(self.query_timeout))?
            .build()
    }
}

/// Formats a duration the way Trino session properties expect, e.g. `60s`.
pub fn format_duration(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
