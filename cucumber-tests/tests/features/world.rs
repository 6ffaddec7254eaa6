use bytes::Bytes;
use cucumber::World;
use cucumber_tests::MockUpstream;
use evt_edge_core::app::EdgeService;
use evt_edge_core::config::EdgeConfig;
use evt_edge_core::http::Resp;
use evt_edge_core::notify::NotificationBus;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderMap, COOKIE};
use hyper::{Request, StatusCode};
use std::sync::Arc;
use std::time::Duration;

/// One finished request/response pair
#[derive(Debug)]
pub struct Exchange {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Exchange {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(World)]
#[world(init = Self::new)]
pub struct EdgeWorld {
    pub config: EdgeConfig,
    pub bus: Arc<NotificationBus>,
    pub cookies: Vec<String>,
    pub last: Option<Exchange>,
    pub upstream: Option<MockUpstream>,
    /// Open notification streams, in connection order
    pub listeners: Vec<Resp>,
    service: Option<Arc<EdgeService>>,
}

impl std::fmt::Debug for EdgeWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeWorld")
            .field("cookies", &self.cookies)
            .field("last", &self.last)
            .field("upstream", &self.upstream)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EdgeWorld {
    fn new() -> Self {
        Self {
            config: EdgeConfig::default(),
            bus: Arc::new(NotificationBus::new()),
            cookies: Vec::new(),
            last: None,
            upstream: None,
            listeners: Vec::new(),
            service: None,
        }
    }

    /// Built on first use so Given steps can still change the config
    pub fn service(&mut self) -> Arc<EdgeService> {
        if self.service.is_none() {
            let service = EdgeService::from_config(&self.config, self.bus.clone())
                .expect("edge service should build");
            self.service = Some(Arc::new(service));
        }
        self.service.clone().expect("service was just built")
    }

    fn build_request(&self, method: &str, path: &str, body: Option<&str>) -> Request<Full<Bytes>> {
        let mut builder = Request::builder().method(method).uri(path);
        if !self.cookies.is_empty() {
            builder = builder.header(COOKIE, self.cookies.join("; "));
        }
        let body = body.map(|b| Bytes::from(b.to_string())).unwrap_or_default();
        builder.body(Full::new(body)).expect("valid request")
    }

    pub async fn request(&mut self, method: &str, path: &str, body: Option<&str>) {
        let req = self.build_request(method, path, body);
        let resp = self.service().handle(req).await;
        let (parts, body) = resp.into_parts();
        let body = body.collect().await.map(|b| b.to_bytes()).unwrap_or_default();
        self.last = Some(Exchange { status: parts.status, headers: parts.headers, body });
    }

    pub fn last(&self) -> &Exchange {
        self.last.as_ref().expect("no request has been made")
    }

    /// Open a notification stream and consume its welcome frame
    pub async fn connect_listener(&mut self) {
        let req = self.build_request("GET", "/api/notifications/stream", None);
        let mut resp = self.service().handle(req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let welcome = next_frame(&mut resp, Duration::from_secs(2)).await;
        assert!(
            welcome.as_deref().is_some_and(|f| f.starts_with("event: welcome")),
            "expected welcome frame, got {:?}",
            welcome
        );
        self.listeners.push(resp);
    }
}

/// Next SSE frame, or `None` if nothing arrives in time
pub async fn next_frame(resp: &mut Resp, wait: Duration) -> Option<String> {
    match tokio::time::timeout(wait, resp.body_mut().frame()).await {
        Ok(Some(Ok(frame))) => {
            frame.into_data().ok().map(|data| String::from_utf8_lossy(&data).into_owned())
        }
        _ => None,
    }
}
