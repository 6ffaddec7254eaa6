//! Server-Sent Events stream for notifications
//!
//! Each connection gets a pump task that owns the [`Subscription`] and
//! writes frames into a small channel read by [`SseBody`]. When hyper drops
//! the body (client gone), the pump sees the channel close, stops its
//! heartbeat, deregisters the listener and exits. Nothing is written after
//! that point.

use crate::http::utils::Resp;
use crate::notify::bus::{NotificationBus, SubscriberFilter, Subscription};
use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};
use http_body_util::BodyExt;
use hyper::header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use hyper::Response;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};

/// Frames buffered per connection before the pump waits on the client
const FRAME_BUFFER: usize = 32;

/// One SSE frame: `event: <name>` then one `data:` line per payload line
pub fn format_event(event: &str, data: &str) -> Bytes {
    let mut frame = format!("event: {}\n", event);
    for line in data.split('\n') {
        frame.push_str("data: ");
        frame.push_str(line);
        frame.push('\n');
    }
    frame.push('\n');
    Bytes::from(frame)
}

fn welcome_frame(subscriber: u64) -> Bytes {
    format_event("welcome", &serde_json::json!({ "ok": true, "subscriber": subscriber }).to_string())
}

fn ping_frame() -> Bytes {
    format_event("ping", &serde_json::json!({ "t": chrono::Utc::now().timestamp_millis() }).to_string())
}

/// Streaming body fed by the pump task
pub struct SseBody {
    rx: mpsc::Receiver<Bytes>,
}

impl SseBody {
    pub fn new(rx: mpsc::Receiver<Bytes>) -> Self {
        Self { rx }
    }
}

impl Body for SseBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(bytes)) => Poll::Ready(Some(Ok(Frame::data(bytes)))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::default()
    }
}

/// Drive one connection until the client goes away
async fn pump(mut sub: Subscription, tx: mpsc::Sender<Bytes>, heartbeat: Duration) {
    if tx.send(welcome_frame(sub.id())).await.is_ok() {
        let mut ticker = interval_at(Instant::now() + heartbeat, heartbeat);
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                next = sub.recv() => {
                    let Some(notification) = next else { break };
                    let Ok(data) = serde_json::to_string(&notification) else { continue };
                    if tx.send(format_event("message", &data)).await.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if tx.send(ping_frame()).await.is_err() {
                        break;
                    }
                }
            }
        }
        drop(ticker);
    }
    let id = sub.id();
    sub.close();
    log::debug!("notification stream {} closed", id);
}

/// Open an SSE response subscribed to `bus`.
///
/// Emits `welcome` immediately, `message` per notification and `ping` every
/// `heartbeat`.
pub fn stream_response(
    bus: &Arc<NotificationBus>,
    filter: SubscriberFilter,
    heartbeat: Duration,
) -> Resp {
    let sub = bus.subscribe(filter);
    let (tx, rx) = mpsc::channel(FRAME_BUFFER);
    tokio::spawn(pump(sub, tx, heartbeat));

    let mut resp = Response::new(SseBody::new(rx).boxed());
    let headers = resp.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert("x-accel-buffering", HeaderValue::from_static("no"));
    resp
}
