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

use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use trino_probe::connection::{ConnectionConfig, DEFAULT_CLUSTER_NAME, DEFAULT_ROLE_GROUP};
use trino_probe::probes::{StorageRoundtripProbe, WorkerCountProbe};
use trino_probe::trino::http::Scheme;

/// User the storage probe connects as.
const STORAGE_PROBE_USER: &str = "admin";
const STORAGE_PROBE_PASSWORD: &str = "admin";

/// Smoke checks for a Trino cluster running in a Kubernetes namespace.
#[derive(Parser)]
#[command(name = "trino-probe", version, about)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Name of the TrinoCluster; prefix of the coordinator service name
    #[arg(long, global = true, env = "TRINO_PROBE_CLUSTER", default_value = DEFAULT_CLUSTER_NAME)]
    cluster_name: String,
    /// Role group of the coordinator
    #[arg(long, global = true, default_value = DEFAULT_ROLE_GROUP)]
    role_group: String,
    /// Connect to this host instead of the in-cluster service, e.g. 127.0.0.1
    /// behind `kubectl port-forward`
    #[arg(long, global = true, env = "TRINO_PROBE_HOST")]
    host: Option<String>,
    /// Coordinator port [default: 8080 for http, 8443 for https]
    #[arg(long, global = true)]
    port: Option<u16>,
    /// http or https
    #[arg(long, global = true, default_value = "http")]
    scheme: Scheme,
    /// Server-side limit on query execution time, in seconds
    #[arg(long, global = true, default_value_t = 60)]
    query_timeout_secs: u64,
    /// Send the password with HTTP basic authentication
    #[arg(long, global = true)]
    basic_auth: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Verify the number of active workers
    CheckActiveWorkers {
        /// Username to connect as
        #[arg(short, long)]
        user: String,
        /// Password for the user
        #[arg(short, long)]
        password: String,
        /// Namespace the test is running in
        #[arg(short, long, env = "TRINO_PROBE_NAMESPACE")]
        namespace: String,
        /// Expected amount of workers to be present
        #[arg(short, long)]
        workers: u64,
    },
    /// Verify S3-backed table creation, loading and CTAS
    CheckS3 {
        /// Namespace the test is running in
        #[arg(short, long, env = "TRINO_PROBE_NAMESPACE")]
        namespace: String,
    },
}

impl ConnectionArgs {
    fn config(&self, namespace: &str, user: &str, password: &str) -> ConnectionConfig {
        let config = ConnectionConfig::builder()
            .namespace(namespace)
            .user(user)
            .password(password)
            .cluster_name(self.cluster_name.clone())
            .role_group(self.role_group.clone())
            .port(self.port)
            .scheme(self.scheme)
            .query_timeout(Duration::from_secs(self.query_timeout_secs))
            .basic_auth(self.basic_auth);

        match &self.host {
            Some(host) => config.host_override(host.clone()).build(),
            None => config.build(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::CheckActiveWorkers {
            user,
            password,
            namespace,
            workers,
        } => {
            let client = cli.connection.config(&namespace, &user, &password).connect()?;
            let result = WorkerCountProbe::new(workers).run(&client).await?;
            println!("{}", result.message);
            if !result.success {
                std::process::exit(result.exit_code);
            }
        }
        Command::CheckS3 { namespace } => {
            log::info!("Starting S3 tests...");
            let client = cli
                .connection
                .config(&namespace, STORAGE_PROBE_USER, STORAGE_PROBE_PASSWORD)
                .connect()?;
            let result = StorageRoundtripProbe::default().run(&client).await?;
            println!("{}", result.message);
        }
    }

    Ok(())
}
