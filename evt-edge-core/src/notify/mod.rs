//! Notification fan-out
//!
//! An internal publish endpoint feeds a per-process bus; browsers listen on
//! a Server-Sent Events stream. Nothing is persisted or replayed, and the
//! bus does not span processes.

pub mod bus;
pub mod event;
pub mod handlers;
pub mod sse;

pub use bus::{NotificationBus, SubscriberFilter, Subscription};
pub use event::{Notification, PublishError, PublishRequest};
pub use handlers::{NotificationHandlers, INTERNAL_KEY_HEADER};
pub use sse::{format_event, stream_response, SseBody};
