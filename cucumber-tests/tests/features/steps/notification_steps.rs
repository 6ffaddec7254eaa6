use crate::features::world::next_frame;
use crate::features::EdgeWorld;
use cucumber::{given, then, when};
use std::time::Duration;

#[given(expr = "{int} listener(s) is/are connected to the notification stream")]
async fn given_listeners(world: &mut EdgeWorld, count: usize) {
    for _ in 0..count {
        world.connect_listener().await;
    }
}

#[when(expr = "another listener connects")]
async fn when_listener_connects(world: &mut EdgeWorld) {
    world.connect_listener().await;
}

#[when(expr = "a notification for user {string} titled {string} is published")]
async fn when_published(world: &mut EdgeWorld, user: String, title: String) {
    let body = serde_json::json!({ "userId": user, "title": title }).to_string();
    world.request("POST", "/api/notifications/publish", Some(&body)).await;
    assert_eq!(world.last().status.as_u16(), 200);
}

#[when(expr = "listener {int} disconnects")]
async fn when_listener_disconnects(world: &mut EdgeWorld, index: usize) {
    // Dropping the body is what hyper does when the client goes away
    drop(world.listeners.remove(index - 1));
}

#[then(expr = "listener {int} receives the notification {string}")]
async fn then_listener_receives(world: &mut EdgeWorld, index: usize, title: String) {
    let listener = &mut world.listeners[index - 1];
    let frame = next_frame(listener, Duration::from_secs(2)).await.expect("a message frame");
    assert!(frame.starts_with("event: message\n"), "got {:?}", frame);
    assert!(frame.contains(&format!("\"title\":\"{}\"", title)), "got {:?}", frame);
    assert!(frame.contains("\"read\":false"), "got {:?}", frame);
}

#[then(expr = "listener {int} receives nothing")]
async fn then_listener_receives_nothing(world: &mut EdgeWorld, index: usize) {
    let listener = &mut world.listeners[index - 1];
    let frame = next_frame(listener, Duration::from_millis(200)).await;
    assert!(frame.is_none(), "unexpected frame {:?}", frame);
}

#[then(expr = "the edge reports {int} subscriber(s)")]
async fn then_subscriber_count(world: &mut EdgeWorld, expected: usize) {
    // The stream task notices the disconnect asynchronously
    for _ in 0..100 {
        if world.bus.subscriber_count() == expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(world.bus.subscriber_count(), expected);
}
