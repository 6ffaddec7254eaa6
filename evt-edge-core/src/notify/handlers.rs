//! HTTP endpoints for the notification bus

use crate::config::server::DEFAULT_MAX_BODY_SIZE;
use crate::config::NotificationsConfig;
use crate::http::utils::{
    json_response, query_param, read_body_limited, BodyReadError, BoxError, Resp,
};
use crate::notify::bus::{NotificationBus, SubscriberFilter};
use crate::notify::event::{PublishError, PublishRequest};
use crate::notify::sse::stream_response;
use bytes::Bytes;
use http_body::Body;
use hyper::{Request, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use subtle::ConstantTimeEq;

/// Header carrying the shared key for internal publish calls
pub const INTERNAL_KEY_HEADER: &str = "x-internal-key";

fn keys_match(expected: &[u8], given: &[u8]) -> bool {
    bool::from(given.ct_eq(expected))
}

#[derive(Clone)]
pub struct NotificationHandlers {
    bus: Arc<NotificationBus>,
    heartbeat: Duration,
    publish_key: Option<String>,
    max_body_size: usize,
}

impl NotificationHandlers {
    pub fn new(bus: Arc<NotificationBus>, config: &NotificationsConfig) -> Self {
        Self {
            bus,
            heartbeat: Duration::from_secs(config.heartbeat_secs),
            publish_key: config.publish_key.clone().filter(|k| !k.is_empty()),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Cap on the publish body
    pub fn with_max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = limit;
        self
    }

    pub fn bus(&self) -> &Arc<NotificationBus> {
        &self.bus
    }

    /// `GET` stream; `?userId=` narrows delivery to one user
    pub fn stream(&self, query: Option<&str>) -> Resp {
        let filter = SubscriberFilter::from_user_id(query_param(query, "userId"));
        stream_response(&self.bus, filter, self.heartbeat)
    }

    /// `POST` publish with a JSON [`PublishRequest`] body
    pub async fn publish<B>(&self, req: Request<B>) -> Resp
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        match self.try_publish(req).await {
            Ok(resp) => resp,
            Err(err) => {
                log::info!("notification publish rejected: {}", err);
                err.into_response()
            }
        }
    }

    async fn try_publish<B>(&self, req: Request<B>) -> Result<Resp, PublishError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        if let Some(expected) = &self.publish_key {
            let given =
                req.headers().get(INTERNAL_KEY_HEADER).map(|v| v.as_bytes()).unwrap_or_default();
            if !keys_match(expected.as_bytes(), given) {
                return Err(PublishError::Unauthorized);
            }
        }

        let body = read_body_limited(req.into_body(), self.max_body_size).await.map_err(|e| match e {
            BodyReadError::TooLarge(limit) => PublishError::PayloadTooLarge(limit),
            BodyReadError::Unreadable(detail) => PublishError::InvalidBody(detail),
        })?;

        let request: PublishRequest = if body.is_empty() {
            PublishRequest::default()
        } else {
            serde_json::from_slice(&body).map_err(|e| PublishError::InvalidBody(e.to_string()))?
        };

        let notification = self.bus.publish(request)?;
        Ok(json_response(
            StatusCode::OK,
            &serde_json::json!({ "ok": true, "notification": notification }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;

    fn handlers(key: Option<&str>) -> NotificationHandlers {
        let config = NotificationsConfig {
            publish_key: key.map(str::to_string),
            ..Default::default()
        };
        NotificationHandlers::new(Arc::new(NotificationBus::new()), &config)
    }

    fn post(body: &'static str, key: Option<&'static str>) -> Request<Full<Bytes>> {
        let mut builder = Request::builder().method("POST").uri("/api/notifications/publish");
        if let Some(key) = key {
            builder = builder.header(INTERNAL_KEY_HEADER, key);
        }
        builder.body(Full::new(Bytes::from_static(body.as_bytes()))).unwrap()
    }

    #[tokio::test]
    async fn test_publish_ok() {
        let h = handlers(None);
        let mut sub = h.bus().subscribe(SubscriberFilter::All);
        let resp = h.publish(post(r#"{"userId":"u1","title":"X"}"#, None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(sub.try_recv().map(|n| n.user_id), Some("u1".to_string()));
    }

    #[tokio::test]
    async fn test_publish_requires_user_id() {
        let resp = handlers(None).publish(post(r#"{"title":"X"}"#, None)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_publish_rejects_bad_json() {
        let resp = handlers(None).publish(post("not json", None)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_publish_key() {
        let h = handlers(Some("s3cret"));
        let body = r#"{"userId":"u1"}"#;
        assert_eq!(h.publish(post(body, None)).await.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(h.publish(post(body, Some("wrong!"))).await.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(h.publish(post(body, Some("s3cret"))).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_oversized_publish_is_413() {
        let h = handlers(None).with_max_body_size(64);
        let mut sub = h.bus().subscribe(SubscriberFilter::All);
        let title = "x".repeat(1024);
        let body = format!(r#"{{"userId":"u1","title":"{}"}}"#, title);
        let req = Request::builder()
            .method("POST")
            .uri("/api/notifications/publish")
            .body(Full::new(Bytes::from(body)))
            .unwrap();
        assert_eq!(h.publish(req).await.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_keys_match() {
        assert!(keys_match(b"abc", b"abc"));
        assert!(!keys_match(b"abc", b"abd"));
        assert!(!keys_match(b"abc", b"ab"));
    }
}
