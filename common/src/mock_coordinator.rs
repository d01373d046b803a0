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

//! In-process stand-in for a Trino coordinator.
//!
//! Speaks just enough HTTP/1.1 to serve the statement protocol: a `POST
//! /v1/statement` is answered with a queued page whose `nextUri` points back
//! at the mock, and each `GET` on that URI pops the next scripted page.
//! Every request is recorded so tests can assert on headers and ordering.

use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use trino_probe::trino::http::{BaseUrl, Scheme};

const STATEMENT_PATH: &str = "/v1/statement";
const EXECUTING_PREFIX: &str = "/v1/statement/executing/";

/// One request as received by the mock.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Scripted answer for every statement whose text contains `matcher`.
///
/// Statements without a matching script finish successfully with no rows.
#[derive(Clone, Debug, Default)]
pub struct ScriptedQuery {
    matcher: String,
    columns: Vec<(String, String)>,
    rows: Vec<Vec<Value>>,
    rows_per_page: Option<usize>,
    update_type: Option<String>,
    error: Option<(String, String)>,
    response_headers: Vec<(String, String)>,
}

impl ScriptedQuery {
    pub fn new(matcher: impl Into<String>) -> Self {
        ScriptedQuery {
            matcher: matcher.into(),
            ..Default::default()
        }
    }

    /// A single `bigint` column holding `value`, the shape of both
    /// `COUNT(*)` results and CTAS rows-written reports.
    pub fn count(matcher: impl Into<String>, value: u64) -> Self {
        Self::new(matcher)
            .column("_col0", "bigint")
            .row(vec![json!(value)])
    }

    pub fn column(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.columns.push((name.into(), type_name.into()));
        self
    }

    pub fn row(mut self, row: Vec<Value>) -> Self {
        self.rows.push(row);
        self
    }

    /// Splits the rows over several pages.
    pub fn rows_per_page(mut self, rows_per_page: usize) -> Self {
        self.rows_per_page = Some(rows_per_page);
        self
    }

    pub fn update_type(mut self, update_type: impl Into<String>) -> Self {
        self.update_type = Some(update_type.into());
        self
    }

    /// Fails the query with the given error name and message.
    pub fn fail(mut self, error_name: impl Into<String>, message: impl Into<String>) -> Self {
        self.error = Some((error_name.into(), message.into()));
        self
    }

    /// Header sent with the final page, e.g. `X-Trino-Set-Catalog`.
    pub fn response_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.response_headers.push((name.into(), value.into()));
        self
    }
}

type Page = (Value, Vec<(String, String)>);

#[derive(Default)]
struct State {
    scripts: Vec<ScriptedQuery>,
    requests: Vec<RecordedRequest>,
    pending: HashMap<String, VecDeque<Page>>,
    query_seq: u32,
    forced_status: Option<(u16, String)>,
}

struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl Reply {
    fn json(page: Value, headers: Vec<(String, String)>) -> Self {
        Reply {
            status: 200,
            headers,
            body: page.to_string(),
        }
    }

    fn not_found(body: &str) -> Self {
        Reply {
            status: 404,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }
}

/// Scripted coordinator listening on an ephemeral localhost port.
///
/// The accept loop runs on the current tokio runtime until the test ends.
pub struct MockCoordinator {
    addr: SocketAddr,
    state: Arc<Mutex<State>>,
}

impl MockCoordinator {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock coordinator");
        let addr = listener.local_addr().expect("mock coordinator address");
        let state = Arc::new(Mutex::new(State::default()));

        let shared = state.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let state = shared.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve(stream, state, addr).await {
                        log::debug!("mock coordinator connection failed: {e}");
                    }
                });
            }
        });

        MockCoordinator { addr, state }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("mock coordinator state")
    }

    pub fn script(&self, query: ScriptedQuery) -> &Self {
        self.lock().scripts.push(query);
        self
    }

    /// Answers every request from now on with `status` and `body`.
    pub fn fail_all_requests(&self, status: u16, body: &str) {
        self.lock().forced_status = Some((status, body.to_string()));
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn base_url(&self) -> BaseUrl {
        BaseUrl::new(Scheme::Http, "127.0.0.1", self.port())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Statement submissions, in the order they arrived.
    pub fn statement_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "POST" && r.path == STATEMENT_PATH)
            .collect()
    }

    /// Text of every submitted statement, in order.
    pub fn statements(&self) -> Vec<String> {
        self.statement_requests()
            .into_iter()
            .map(|r| r.body)
            .collect()
    }
}

fn respond(state: &mut State, req: &RecordedRequest, addr: SocketAddr) -> Reply {
    if let Some((status, body)) = &state.forced_status {
        return Reply {
            status: *status,
            headers: Vec::new(),
            body: body.clone(),
        };
    }

    if req.method == "POST" && req.path == STATEMENT_PATH {
        state.query_seq += 1;
        let id = format!("20250101_000000_{:05}_mock0", state.query_seq);
        let script = state
            .scripts
            .iter()
            .find(|s| req.body.contains(&s.matcher))
            .cloned()
            .unwrap_or_default();
        state.pending.insert(id.clone(), build_pages(&id, &script, addr));

        let queued = json!({
            "id": id,
            "infoUri": format!("http://{addr}/ui/query.html?{id}"),
            "nextUri": format!("http://{addr}{EXECUTING_PREFIX}{id}"),
            "stats": { "state": "QUEUED", "queued": true },
        });
        return Reply::json(queued, Vec::new());
    }

    if req.method == "GET" {
        if let Some(rest) = req.path.strip_prefix(EXECUTING_PREFIX) {
            let id = rest.split('/').next().unwrap_or_default();
            return match state.pending.get_mut(id).and_then(|p| p.pop_front()) {
                Some((page, headers)) => Reply::json(page, headers),
                None => Reply::not_found("no such query"),
            };
        }
    }

    Reply::not_found("not found")
}

fn build_pages(id: &str, script: &ScriptedQuery, addr: SocketAddr) -> VecDeque<Page> {
    let mut pages = VecDeque::new();

    if let Some((name, message)) = &script.error {
        let page = json!({
            "id": id,
            "stats": { "state": "FAILED" },
            "error": {
                "message": message,
                "errorCode": 1,
                "errorName": name,
                "errorType": "USER_ERROR",
            },
        });
        pages.push_back((page, Vec::new()));
        return pages;
    }

    let columns: Vec<Value> = script
        .columns
        .iter()
        .map(|(name, type_name)| json!({ "name": name, "type": type_name }))
        .collect();
    let per_page = script
        .rows_per_page
        .unwrap_or(script.rows.len())
        .max(1);
    let chunks: Vec<&[Vec<Value>]> = script.rows.chunks(per_page).collect();
    let total = chunks.len().max(1);

    for index in 0..total {
        let last = index + 1 == total;
        let mut page = json!({
            "id": id,
            "stats": { "state": if last { "FINISHED" } else { "RUNNING" } },
        });
        if !columns.is_empty() {
            page["columns"] = Value::Array(columns.clone());
        }
        if let Some(rows) = chunks.get(index) {
            page["data"] = json!(rows);
        }

        let headers = if last {
            if let Some(update_type) = &script.update_type {
                page["updateType"] = json!(update_type);
            }
            script.response_headers.clone()
        } else {
            page["nextUri"] = json!(format!("http://{addr}{EXECUTING_PREFIX}{id}/{}", index + 1));
            Vec::new()
        };
        pages.push_back((page, headers));
    }

    pages
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

async fn serve(
    mut stream: TcpStream,
    state: Arc<Mutex<State>>,
    addr: SocketAddr,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(end) = find_header_end(&buf) {
            break end;
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = (header_end + content_length).min(buf.len());
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).into_owned();

    let request = RecordedRequest {
        method,
        path,
        headers,
        body,
    };
    let reply = {
        let mut state = state.lock().expect("mock coordinator state");
        state.requests.push(request.clone());
        respond(&mut state, &request, addr)
    };

    let mut out = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reason(reply.status),
        reply.body.len()
    );
    for (name, value) in &reply.headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str("\r\n");
    out.push_str(&reply.body);

    stream.write_all(out.as_bytes()).await?;
    stream.shutdown().await
}
