//! Dashboard HTTP server.
//!
//! Endpoints:
//!   GET /                    - dashboard page (tabs, dropdowns, plotly chart area)
//!   GET /api/views           - views with their control options and defaults
//!   GET /api/figure/{view}   - figure JSON, selection taken from `?sport=&country=`
//!   GET /api/health          - status, load time and dataset summary
//!
//! Connections are served one at a time. The dashboard is only ever borrowed,
//! so every figure is computed from scratch for the request that asked for it.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use chrono::{DateTime, Local};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::json;
use url::Url;

use crate::controller::{Dashboard, View};
use crate::error::ServeError;

const INDEX_HTML: &str = include_str!("index.html");

/// Longest request head (request line plus headers) read from a client.
pub const MAX_REQUEST_HEAD: u64 = 8192;

/// How long a connection may sit silent before it is dropped.
pub const READ_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    fn json<T: Serialize>(value: &T) -> Response {
        match serde_json::to_string(value) {
            Ok(body) => Response {
                status: 200,
                content_type: "application/json",
                body,
            },
            Err(e) => {
                warn!("cannot serialize response: {}", e);
                Response::error(500, "Internal Server Error")
            }
        }
    }

    fn html(body: &str) -> Response {
        Response {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.to_string(),
        }
    }

    fn error(status: u16, message: &str) -> Response {
        Response {
            status,
            content_type: "text/plain",
            body: message.to_string(),
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }

    pub fn to_http(&self) -> String {
        let allow = if self.status == 405 { "Allow: GET\r\n" } else { "" };
        format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: {}\r\n\
             Access-Control-Allow-Origin: *\r\n\
             {}\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{}",
            self.status,
            self.reason(),
            self.content_type,
            allow,
            self.body.len(),
            self.body
        )
    }
}

pub struct Server {
    dashboard: Dashboard,
    loaded_at: DateTime<Local>,
}

impl Server {
    pub fn new(dashboard: Dashboard) -> Self {
        Server {
            dashboard,
            loaded_at: Local::now(),
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn bind(addr: &str) -> Result<TcpListener, ServeError> {
        TcpListener::bind(addr).map_err(|source| ServeError::Bind {
            addr: addr.to_string(),
            source,
        })
    }

    pub fn serve(&self, addr: &str) -> Result<(), ServeError> {
        let listener = Server::bind(addr)?;
        info!("dashboard running at http://{}", listener.local_addr()?);
        self.run(listener)
    }

    /// Accept loop. Failures on a single connection are logged and skipped.
    pub fn run(&self, listener: TcpListener) -> Result<(), ServeError> {
        for stream in listener.incoming() {
            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    warn!("accept failed: {}", e);
                    continue;
                }
            };
            if let Err(e) = self.handle_connection(stream) {
                warn!("connection error: {}", e);
            }
        }
        Ok(())
    }

    fn handle_connection(&self, mut stream: TcpStream) -> Result<(), ServeError> {
        // idle peers must not hold up the accept loop
        stream.set_read_timeout(Some(READ_TIMEOUT))?;
        let request_line = match read_request_line(&stream)? {
            Some(line) => line,
            None => return Ok(()),
        };

        let response = self.handle(request_line.trim_end());
        debug!("{} -> {}", request_line.trim_end(), response.status);
        stream.write_all(response.to_http().as_bytes())?;
        stream.flush()?;
        Ok(())
    }

    /// Maps one request line (`GET /path?query HTTP/1.1`) to a response.
    pub fn handle(&self, request_line: &str) -> Response {
        let mut parts = request_line.split_whitespace();
        let (method, target) = match (parts.next(), parts.next()) {
            (Some(method), Some(target)) => (method, target),
            _ => return Response::error(400, "Bad Request"),
        };
        if method != "GET" {
            return Response::error(405, "Method Not Allowed");
        }
        let url = match Url::parse("http://localhost").and_then(|base| base.join(target)) {
            Ok(url) => url,
            Err(_) => return Response::error(400, "Bad Request"),
        };

        let segments = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect::<Vec<_>>())
            .unwrap_or_default();
        match segments.as_slice() {
            [] | ["index.html"] => Response::html(INDEX_HTML),
            ["api", "health"] => Response::json(&json!({
                "status": "ok",
                "loaded_at": self.loaded_at.to_rfc3339(),
                "dataset": self.dashboard.dataset().summary(),
            })),
            ["api", "views"] => Response::json(&self.dashboard.describe_all()),
            ["api", "figure", slug] => match slug.parse::<View>() {
                Ok(view) => {
                    let pairs = url.query_pairs().collect::<Vec<_>>();
                    let selection = self
                        .dashboard
                        .selection_from_pairs(view, pairs.iter().map(|(k, v)| (&k[..], &v[..])));
                    Response::json(&self.dashboard.render(&selection))
                }
                Err(e) => Response::error(404, &e.to_string()),
            },
            _ => Response::error(404, "Not Found"),
        }
    }
}

/// Reads the request line and drains the headers after it, never consuming
/// more than `MAX_REQUEST_HEAD` bytes. `None` when the peer sent nothing.
pub fn read_request_line<R: Read>(source: R) -> io::Result<Option<String>> {
    let mut reader = BufReader::new(source.take(MAX_REQUEST_HEAD));
    let mut request_line = String::new();
    if reader.read_line(&mut request_line)? == 0 {
        return Ok(None);
    }
    // the body is never needed
    let mut header = String::new();
    loop {
        header.clear();
        if reader.read_line(&mut header)? == 0 || header.trim().is_empty() {
            break;
        }
    }
    Ok(Some(request_line))
}
