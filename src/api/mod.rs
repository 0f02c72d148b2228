// SPDX-License-Identifier: MPL-2.0

//! HTTP surface: a small tiny_http listener with a fixed pool of request
//! threads in front of [`routes::dispatch`].

mod error;
mod routes;

pub use error::ApiError;
pub use routes::{ApiRequest, AppState, dispatch};

use crate::store::StoreError;
use once_cell::sync::Lazy;
use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use thiserror::Error;
use tiny_http::{Header, Request, Response, Server};
use tracing::{info, warn};

/// Request bodies larger than this are refused
const MAX_BODY_BYTES: u64 = 64 * 1024;

static RESPONSE_HEADERS: Lazy<Vec<Header>> = Lazy::new(|| {
    [
        ("Content-Type", "application/json"),
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
        ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
    ]
    .iter()
    .filter_map(|(field, value)| Header::from_bytes(field.as_bytes(), value.as_bytes()).ok())
    .collect()
});

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {0}: {1}")]
    Bind(String, String),
    #[error("failed to start request thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Status code plus JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: serde_json::Value,
}

impl Reply {
    pub fn ok(body: serde_json::Value) -> Self {
        Self { status: 200, body }
    }

    pub fn no_content() -> Self {
        Self {
            status: 204,
            body: serde_json::Value::Null,
        }
    }

    pub fn json<T: serde::Serialize>(status: u16, value: &T) -> Result<Self, ApiError> {
        Ok(Self {
            status,
            body: serde_json::to_value(value)?,
        })
    }
}

/// A running listener and its request threads
pub struct ApiServer {
    server: Arc<Server>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl ApiServer {
    /// Bind `address` and start `threads` request threads
    pub fn start(state: Arc<AppState>, address: &str, threads: usize) -> Result<Self, ServerError> {
        let server = Server::http(address)
            .map_err(|e| ServerError::Bind(address.to_string(), e.to_string()))?;
        let server = Arc::new(server);
        let shutdown = Arc::new(AtomicBool::new(false));

        let workers = (0..threads.max(1))
            .map(|i| {
                let server = Arc::clone(&server);
                let state = Arc::clone(&state);
                let shutdown = Arc::clone(&shutdown);
                std::thread::Builder::new()
                    .name(format!("pulse-http-{}", i))
                    .spawn(move || serve(&server, &state, &shutdown))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!("Listening on {} with {} request threads", address, workers.len());

        Ok(Self {
            server,
            workers,
            shutdown,
        })
    }

    /// Actual bound address (useful when binding port 0)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Stop accepting requests and wait for in-flight ones to finish
    pub fn shutdown(self) {
        self.shutdown.store(true, Ordering::SeqCst);
        for _ in &self.workers {
            self.server.unblock();
        }
        for worker in self.workers {
            if worker.join().is_err() {
                warn!("Request thread panicked during shutdown");
            }
        }
        info!("Server stopped");
    }
}

fn serve(server: &Server, state: &AppState, shutdown: &AtomicBool) {
    loop {
        match server.recv() {
            Ok(request) => handle(request, state),
            Err(e) => {
                if shutdown.load(Ordering::SeqCst) {
                    break;
                }
                warn!("Failed to receive request: {}", e);
            }
        }
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
    }
}

fn handle(mut request: Request, state: &AppState) {
    let authorization = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Authorization"))
        .map(|h| h.value.as_str().to_string());

    let reply = match read_body(&mut request) {
        Ok(body) => {
            let api_request = ApiRequest {
                method: request.method().clone(),
                url: request.url().to_string(),
                authorization,
                body,
            };
            dispatch(state, &api_request)
        }
        Err(e) => e.into_reply(),
    };

    let body = if reply.status == 204 {
        String::new()
    } else {
        reply.body.to_string()
    };

    let mut response = Response::from_string(body).with_status_code(reply.status);
    for header in RESPONSE_HEADERS.iter() {
        response.add_header(header.clone());
    }

    if let Err(e) = request.respond(response) {
        warn!("Failed to send response: {}", e);
    }
}

fn read_body(request: &mut Request) -> Result<String, ApiError> {
    let mut body = String::new();
    request
        .as_reader()
        .take(MAX_BODY_BYTES + 1)
        .read_to_string(&mut body)
        .map_err(|e| ApiError::InvalidInput(format!("Unreadable body: {}", e)))?;

    if body.len() as u64 > MAX_BODY_BYTES {
        return Err(ApiError::PayloadTooLarge);
    }
    Ok(body)
}
