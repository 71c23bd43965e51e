//! Local HTTP front end.
//!
//! Each connection gets its own task; the request runs the engine
//! synchronously against the shared, read-only [`Dashboard`]. Reads are
//! bounded in time and size, so a stalled client only holds its own task.
//!
//! Endpoints:
//!   GET /              - dashboard page
//!   GET /api/update    - charts and summary table for a filter selection
//!   GET /api/insights  - startup aggregates
//!   GET /api/options   - control options and default date range
//!   GET /api/manifest  - dataset manifest
//!   GET /api/health    - health check

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use crate::dashboard::Dashboard;
use crate::filter::FilterSelection;
use crate::logging::{log, log_request, obj, v_str, Domain, Level};

/// Time allowed for the request line, and again for the headers.
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);
/// Bytes read from a connection before the request is cut off.
pub const MAX_REQUEST_BYTES: u64 = 16 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    fn html(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.to_string(),
        }
    }

    fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status: 200,
                content_type: "application/json",
                body,
            },
            Err(err) => Self::text(500, &format!("serialization failed: {}", err)),
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.to_string(),
        }
    }

    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }

    pub fn to_http(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: {}\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{}",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

/// Split `GET /path?query HTTP/1.1` into (method, path, query).
pub fn parse_request_line(line: &str) -> Option<(&str, &str, &str)> {
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    Some((method, path, query))
}

pub fn route(dash: &Dashboard, request_line: &str) -> Response {
    let Some((method, path, query)) = parse_request_line(request_line) else {
        return Response::text(400, "malformed request line");
    };
    if method != "GET" {
        return Response::text(405, "only GET is supported");
    }

    match path {
        "/" | "/index.html" => Response::html(dash.page()),
        "/api/update" => match FilterSelection::from_query(query, dash.default_span()) {
            Ok(selection) => Response::json(&dash.update(&selection)),
            Err(msg) => Response::text(400, &msg),
        },
        "/api/insights" => Response::json(dash.insights()),
        "/api/options" => Response::json(&dash.layout().controls),
        "/api/manifest" => match dash.manifest() {
            Some(m) => Response::json(m),
            None => Response::text(404, "no manifest"),
        },
        "/api/health" => Response::json(&serde_json::json!({ "status": "ok" })),
        _ => Response::text(404, "Not Found"),
    }
}

pub async fn serve(dash: Arc<Dashboard>, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    serve_listener(dash, listener).await
}

/// Accept loop over an already bound listener.
pub async fn serve_listener(dash: Arc<Dashboard>, listener: TcpListener) -> Result<()> {
    let local = listener.local_addr().context("listener has no local address")?;
    log(
        Level::Info,
        Domain::Server,
        "listening",
        obj(&[("addr", v_str(&local.to_string()))]),
    );

    loop {
        let stream = match listener.accept().await {
            Ok((s, _)) => s,
            Err(err) => {
                log(
                    Level::Warn,
                    Domain::Server,
                    "accept_failed",
                    obj(&[("msg", v_str(&err.to_string()))]),
                );
                continue;
            }
        };
        let dash = Arc::clone(&dash);
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, &dash).await {
                log(
                    Level::Warn,
                    Domain::Server,
                    "connection_failed",
                    obj(&[("msg", v_str(&format!("{:#}", err)))]),
                );
            }
        });
    }
}

async fn handle_connection(stream: TcpStream, dash: &Dashboard) -> Result<()> {
    let mut reader = BufReader::new(stream.take(MAX_REQUEST_BYTES));
    let mut request_line = String::new();
    let n = timeout(READ_TIMEOUT, reader.read_line(&mut request_line))
        .await
        .context("timed out waiting for the request line")??;
    if n == 0 {
        return Ok(());
    }

    // no newline: the size cap cut the line short, or the client hung up
    let response = if request_line.ends_with('\n') {
        timeout(READ_TIMEOUT, drain_headers(&mut reader))
            .await
            .context("timed out reading headers")??;
        route(dash, request_line.trim_end())
    } else {
        Response::text(400, "request line too long")
    };
    let path = parse_request_line(&request_line)
        .map(|(_, p, _)| p)
        .unwrap_or("?");
    log_request(path, response.status, response.body.len());

    let mut stream = reader.into_inner().into_inner();
    stream.write_all(response.to_http().as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Headers are not used; read up to the blank line.
async fn drain_headers<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<()> {
    loop {
        let mut header = String::new();
        let n = reader.read_line(&mut header).await?;
        if n == 0 || header.trim().is_empty() {
            return Ok(());
        }
    }
}
