//! Local HTTP fixture server for integration tests.
//!
//! A bare tokio TCP listener speaking just enough HTTP/1.1 for reqwest:
//! fixed routes, optional redirects, delayed responses, and bodies streamed
//! without a Content-Length header.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use std::sync::Mutex;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Clone)]
#[allow(dead_code)]
pub enum Route {
    Html(String),
    Bytes {
        content_type: String,
        body: Vec<u8>,
    },
    Redirect(String),
    Status(u16),
    /// `total` bytes streamed with no Content-Length header.
    Stream {
        total: usize,
    },
    /// Respond with HTML after a delay.
    Slow {
        body: String,
        delay: Duration,
    },
}

pub struct TestServer {
    addr: SocketAddr,
    routes: Arc<Mutex<HashMap<String, Route>>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(routes: HashMap<String, Route>) -> Self {
        let routes = Arc::new(Mutex::new(routes));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let accept_routes = routes.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let routes = accept_routes.clone();
                tokio::spawn(async move {
                    handle_connection(socket, routes).await;
                });
            }
        });

        Self {
            addr,
            routes,
            handle,
        }
    }

    /// Register a route after startup, e.g. one whose body needs to embed
    /// the server's own port.
    #[allow(dead_code)]
    pub fn add(&self, path: &str, route: Route) {
        self.routes.lock().unwrap().insert(path.to_string(), route);
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.addr.port(), path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_connection(mut socket: TcpStream, routes: Arc<Mutex<HashMap<String, Route>>>) {
    let mut buf = vec![0u8; 8192];
    let n = match socket.read(&mut buf).await {
        Ok(n) => n,
        Err(_) => return,
    };
    let request = String::from_utf8_lossy(&buf[..n]).to_string();
    let path = request
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();

    // Clone the route out so the lock is not held across writes or sleeps.
    let route = routes.lock().unwrap().get(&path).cloned();

    match route {
        Some(Route::Html(body)) => {
            write_body(&mut socket, 200, "text/html; charset=utf-8", body.as_bytes()).await;
        }
        Some(Route::Bytes { content_type, body }) => {
            write_body(&mut socket, 200, &content_type, &body).await;
        }
        Some(Route::Redirect(location)) => {
            let head = format!(
                "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                location
            );
            let _ = socket.write_all(head.as_bytes()).await;
        }
        Some(Route::Status(code)) => {
            let head = format!(
                "HTTP/1.1 {} Status\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                code
            );
            let _ = socket.write_all(head.as_bytes()).await;
        }
        Some(Route::Stream { total }) => {
            let head =
                "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n";
            if socket.write_all(head.as_bytes()).await.is_err() {
                return;
            }
            let chunk = vec![b'x'; 4096];
            let mut sent = 0;
            while sent < total {
                if socket.write_all(&chunk).await.is_err() {
                    return;
                }
                sent += chunk.len();
                tokio::task::yield_now().await;
            }
        }
        Some(Route::Slow { body, delay }) => {
            tokio::time::sleep(delay).await;
            write_body(&mut socket, 200, "text/html; charset=utf-8", body.as_bytes()).await;
        }
        None => {
            let head = "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
            let _ = socket.write_all(head.as_bytes()).await;
        }
    }

    let _ = socket.shutdown().await;
}

async fn write_body(socket: &mut TcpStream, status: u16, content_type: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {} OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    if socket.write_all(head.as_bytes()).await.is_ok() {
        let _ = socket.write_all(body).await;
    }
}
