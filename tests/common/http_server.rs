//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed set of paths, one request per connection. A route can be
//! told to answer `503` a number of times before succeeding.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: Vec<u8>,
    /// Leading requests answered with 503.
    pub fail_first: usize,
}

impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            fail_first: 0,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            fail_first: 0,
        }
    }

    pub fn flaky(self, fail_first: usize) -> Self {
        Self { fail_first, ..self }
    }
}

struct Entry {
    route: Route,
    hits: AtomicUsize,
}

/// Handle to a running server. The server lives until the process exits.
pub struct Server {
    base: String,
    routes: Arc<HashMap<String, Entry>>,
}

impl Server {
    /// URL for `path` (which starts with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Requests received for `path` so far.
    pub fn hits(&self, path: &str) -> usize {
        self.routes
            .get(path)
            .map(|e| e.hits.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

pub fn start(routes: Vec<(&str, Route)>) -> Server {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Entry>> = Arc::new(
        routes
            .into_iter()
            .map(|(path, route)| {
                (
                    path.to_string(),
                    Entry {
                        route,
                        hits: AtomicUsize::new(0),
                    },
                )
            })
            .collect(),
    );

    let shared = Arc::clone(&routes);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&shared);
            thread::spawn(move || handle(stream, &routes));
        }
    });

    Server {
        base: format!("http://127.0.0.1:{port}"),
        routes,
    }
}

const EMPTY: &[u8] = &[];

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn handle(mut stream: std::net::TcpStream, routes: &HashMap<String, Entry>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");

    let (status, body) = match routes.get(path) {
        Some(entry) => {
            let hit = entry.hits.fetch_add(1, Ordering::SeqCst);
            if hit < entry.route.fail_first {
                (503, EMPTY)
            } else {
                (entry.route.status, entry.route.body.as_slice())
            }
        }
        None => (404, EMPTY),
    };

    let head = format!(
        "HTTP/1.1 {status} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        reason(status),
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}
