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

//! HTTP addressing of a Trino coordinator

use crate::trino::error::ValidationErr;
use std::fmt;
use std::str::FromStr;

/// Path of the statement resource on the coordinator.
pub const STATEMENT_PATH: &str = "/v1/statement";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Transport used to reach the coordinator
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = ValidationErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            v => Err(ValidationErr::InvalidScheme(v.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Base URL of a Trino coordinator
pub struct BaseUrl {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
}

impl BaseUrl {
    pub fn new(scheme: Scheme, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme,
            host: host.into(),
            port,
        }
    }

    pub fn is_secure(&self) -> bool {
        self.scheme == Scheme::Https
    }

    /// Returns the URL new statements are posted to.
    pub fn statement_url(&self) -> String {
        format!("{self}{STATEMENT_PATH}")
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl FromStr for BaseUrl {
    type Err = ValidationErr;

    /// Parses `http://host:port`, `https://host` or a bare `host[:port]`.
    /// A missing scheme means plain HTTP and a missing port means the
    /// scheme's well-known port.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let with_scheme = if s.contains("://") {
            s.to_string()
        } else {
            format!("http://{s}")
        };

        let url = url::Url::parse(&with_scheme).map_err(|source| ValidationErr::InvalidUrl {
            url: s.to_string(),
            source,
        })?;

        let scheme: Scheme = url.scheme().parse()?;
        let host = url
            .host_str()
            .ok_or_else(|| ValidationErr::InvalidUrl {
                url: s.to_string(),
                source: url::ParseError::EmptyHost,
            })?
            .to_string();
        let port = url.port_or_known_default().unwrap_or(match scheme {
            Scheme::Http => 80,
            Scheme::Https => 443,
        });

        Ok(BaseUrl { scheme, host, port })
    }
}
