//! In-process notification fan-out
//!
//! Listeners live in a lock-free map keyed by subscription id. Publishing
//! pushes onto each matching listener's bounded queue without waiting. A
//! listener whose queue is full has stopped reading and is dropped; its
//! stream ends once the queued notifications are drained.

use crate::notify::event::{Notification, PublishError, PublishRequest};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Notifications queued per listener before it is considered stalled
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Which notifications a subscriber receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriberFilter {
    /// Every notification
    All,
    /// Only notifications addressed to this user id
    User(String),
}

impl SubscriberFilter {
    /// `User` for a non-empty id, `All` otherwise
    pub fn from_user_id(user_id: Option<String>) -> Self {
        match user_id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty()) {
            Some(id) => SubscriberFilter::User(id),
            None => SubscriberFilter::All,
        }
    }

    pub fn matches(&self, notification: &Notification) -> bool {
        match self {
            SubscriberFilter::All => true,
            SubscriberFilter::User(id) => notification.user_id == *id,
        }
    }
}

struct Listener {
    filter: SubscriberFilter,
    tx: mpsc::Sender<Notification>,
}

pub struct NotificationBus {
    listeners: scc::HashMap<u64, Listener>,
    next_id: AtomicU64,
    queue_capacity: usize,
}

static GLOBAL_BUS: OnceLock<Arc<NotificationBus>> = OnceLock::new();

impl NotificationBus {
    pub fn new() -> Self {
        Self::with_queue_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Bus whose listeners may fall at most `capacity` notifications behind
    pub fn with_queue_capacity(capacity: usize) -> Self {
        Self {
            listeners: scc::HashMap::new(),
            next_id: AtomicU64::new(1),
            queue_capacity: capacity.max(1),
        }
    }

    /// Process-wide bus, created on first use
    pub fn global() -> Arc<NotificationBus> {
        GLOBAL_BUS.get_or_init(|| Arc::new(NotificationBus::new())).clone()
    }

    /// Register a listener. It stays registered until the subscription is
    /// closed or dropped.
    pub fn subscribe(self: &Arc<Self>, filter: SubscriberFilter) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let _ = self.listeners.insert_sync(id, Listener { filter, tx });
        log::debug!("notification subscriber {} registered ({} active)", id, self.subscriber_count());
        Subscription { id, rx, bus: Arc::clone(self), closed: false }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Validate, fill defaults and deliver to every current subscriber
    pub fn publish(&self, req: PublishRequest) -> Result<Notification, PublishError> {
        let notification = Notification::from_request(req)?;
        let delivered = self.broadcast(&notification);
        log::info!(
            "notification published: user={} delivered={}",
            notification.user_id,
            delivered
        );
        Ok(notification)
    }

    /// Deliver to matching listeners; drops listeners whose receiver is gone
    /// or whose queue is full.
    ///
    /// Returns the number of listeners the notification was handed to.
    pub fn broadcast(&self, notification: &Notification) -> usize {
        let mut delivered = 0;
        self.listeners.retain_sync(|id, listener| {
            if listener.tx.is_closed() {
                return false;
            }
            if !listener.filter.matches(notification) {
                return true;
            }
            match listener.tx.try_send(notification.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    log::warn!("notification subscriber {} stalled, dropping it", id);
                    false
                }
                Err(TrySendError::Closed(_)) => false,
            }
        });
        delivered
    }

    fn unregister(&self, id: u64) {
        if self.listeners.remove_sync(&id).is_some() {
            log::debug!("notification subscriber {} removed ({} active)", id, self.subscriber_count());
        }
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered listener.
///
/// Closing is idempotent and also happens on drop.
pub struct Subscription {
    id: u64,
    rx: mpsc::Receiver<Notification>,
    bus: Arc<NotificationBus>,
    closed: bool,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next notification; `None` once closed
    pub async fn recv(&mut self) -> Option<Notification> {
        if self.closed {
            return None;
        }
        self.rx.recv().await
    }

    /// Next notification if one is already queued
    pub fn try_recv(&mut self) -> Option<Notification> {
        if self.closed {
            return None;
        }
        self.rx.try_recv().ok()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.bus.unregister(self.id);
        self.rx.close();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fan_out_to_all_subscribers() {
        let bus = Arc::new(NotificationBus::new());
        let mut a = bus.subscribe(SubscriberFilter::All);
        let mut b = bus.subscribe(SubscriberFilter::All);

        let published = bus.publish(PublishRequest::new("u1", "X")).unwrap();

        assert_eq!(a.recv().await, Some(published.clone()));
        assert_eq!(b.recv().await, Some(published));
    }

    #[tokio::test]
    async fn test_late_subscriber_gets_nothing() {
        let bus = Arc::new(NotificationBus::new());
        bus.publish(PublishRequest::new("u1", "X")).unwrap();
        let mut late = bus.subscribe(SubscriberFilter::All);
        assert_eq!(late.try_recv(), None);
    }

    #[test]
    fn test_user_filter() {
        let bus = Arc::new(NotificationBus::new());
        let mut u1 = bus.subscribe(SubscriberFilter::User("u1".into()));
        let mut u2 = bus.subscribe(SubscriberFilter::User("u2".into()));

        bus.publish(PublishRequest::new("u1", "for u1")).unwrap();

        assert_eq!(u1.try_recv().map(|n| n.title), Some("for u1".to_string()));
        assert_eq!(u2.try_recv(), None);
    }

    #[test]
    fn test_close_is_idempotent_and_deregisters() {
        let bus = Arc::new(NotificationBus::new());
        let mut sub = bus.subscribe(SubscriberFilter::All);
        let _other = bus.subscribe(SubscriberFilter::All);
        assert_eq!(bus.subscriber_count(), 2);

        sub.close();
        sub.close();
        assert!(sub.is_closed());
        assert_eq!(bus.subscriber_count(), 1);

        drop(sub);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_drop_deregisters() {
        let bus = Arc::new(NotificationBus::new());
        {
            let _sub = bus.subscribe(SubscriberFilter::All);
            assert_eq!(bus.subscriber_count(), 1);
        }
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_stalled_subscriber_is_dropped() {
        let bus = Arc::new(NotificationBus::with_queue_capacity(2));
        let mut slow = bus.subscribe(SubscriberFilter::All);
        let mut fast = bus.subscribe(SubscriberFilter::All);

        for i in 0..3 {
            bus.publish(PublishRequest::new("u1", &format!("n{}", i))).unwrap();
            assert!(fast.recv().await.is_some());
        }

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(slow.recv().await.map(|n| n.title), Some("n0".to_string()));
        assert_eq!(slow.recv().await.map(|n| n.title), Some("n1".to_string()));
        assert_eq!(slow.recv().await, None);
    }

    #[test]
    fn test_missing_user_id_rejected() {
        let bus = Arc::new(NotificationBus::new());
        let err = bus.publish(PublishRequest { title: Some("X".into()), ..Default::default() });
        assert_eq!(err, Err(PublishError::MissingUserId));
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(&NotificationBus::global(), &NotificationBus::global()));
    }

    #[test]
    fn test_filter_from_user_id() {
        assert_eq!(SubscriberFilter::from_user_id(None), SubscriberFilter::All);
        assert_eq!(SubscriberFilter::from_user_id(Some(" ".into())), SubscriberFilter::All);
        assert_eq!(
            SubscriberFilter::from_user_id(Some("u1".into())),
            SubscriberFilter::User("u1".into())
        );
    }
}
