//! A throwaway internal service that records what it receives

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Answers every request with the configured status.
///
/// Success bodies are `{"ok":true,"path":..}`; error bodies are
/// `{"message":"nope"}`.
#[derive(Debug)]
pub struct MockUpstream {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<RecordedRequest>>>,
    status: Arc<AtomicU16>,
    handle: JoinHandle<()>,
}

impl MockUpstream {
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let received = Arc::new(Mutex::new(Vec::new()));
        let status = Arc::new(AtomicU16::new(200));

        let handle = tokio::spawn({
            let received = received.clone();
            let status = status.clone();
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let received = received.clone();
                    let status = status.clone();
                    tokio::spawn(async move {
                        let svc = service_fn(move |req: Request<Incoming>| {
                            let received = received.clone();
                            let status = status.clone();
                            async move { Ok::<_, Infallible>(answer(req, &received, &status).await) }
                        });
                        let _ = hyper::server::conn::http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), svc)
                            .await;
                    });
                }
            }
        });

        Ok(Self { addr, received, status, handle })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_status(&self, status: u16) {
        self.status.store(status, Ordering::SeqCst);
    }

    pub fn received(&self) -> Vec<RecordedRequest> {
        self.received.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn answer(
    req: Request<Incoming>,
    received: &Mutex<Vec<RecordedRequest>>,
    status: &AtomicU16,
) -> Response<Full<Bytes>> {
    let method = req.method().to_string();
    let path_and_query = req.uri().path_and_query().map(|p| p.to_string()).unwrap_or_default();
    let headers = req.headers().clone();
    let body = req.into_body().collect().await.map(|b| b.to_bytes()).unwrap_or_default();

    if let Ok(mut log) = received.lock() {
        log.push(RecordedRequest { method, path_and_query: path_and_query.clone(), headers, body });
    }

    let status = StatusCode::from_u16(status.load(Ordering::SeqCst)).unwrap_or(StatusCode::OK);
    let payload = if status.is_success() {
        serde_json::json!({ "ok": true, "path": path_and_query })
    } else {
        serde_json::json!({ "message": "nope" })
    };

    let mut resp = Response::new(Full::new(Bytes::from(payload.to_string())));
    *resp.status_mut() = status;
    resp.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp
}
