use crate::features::EdgeWorld;
use cucumber::{given, then, when};

#[given(expr = "an edge with default settings")]
async fn given_default_edge(_world: &mut EdgeWorld) {}

#[given(expr = "the cookie {string}")]
async fn given_cookie(world: &mut EdgeWorld, cookie: String) {
    world.cookies.push(cookie);
}

#[when(expr = "I request {string}")]
async fn when_get(world: &mut EdgeWorld, path: String) {
    world.request("GET", &path, None).await;
}

#[when(expr = "I {word} {string} with body {string}")]
async fn when_send_with_body(world: &mut EdgeWorld, method: String, path: String, body: String) {
    world.request(&method, &path, Some(&body)).await;
}

#[then(expr = "the response status is {int}")]
async fn then_status(world: &mut EdgeWorld, status: u16) {
    assert_eq!(world.last().status.as_u16(), status, "body: {:?}", world.last().body);
}

#[then(expr = "the response redirects to {string}")]
async fn then_redirects(world: &mut EdgeWorld, location: String) {
    let actual = world.last().headers.get("location").and_then(|v| v.to_str().ok());
    assert_eq!(actual, Some(location.as_str()));
}

#[then(expr = "the request is not redirected")]
async fn then_not_redirected(world: &mut EdgeWorld) {
    let last = world.last();
    assert!(last.headers.get("location").is_none(), "unexpected redirect: {:?}", last.headers);
    assert!(!last.status.is_redirection());
}

#[then(expr = "the response body field {string} is {string}")]
async fn then_body_field_str(world: &mut EdgeWorld, field: String, value: String) {
    assert_eq!(world.last().json()[field.as_str()], serde_json::json!(value));
}

#[then(expr = "the response body field {string} is {int}")]
async fn then_body_field_int(world: &mut EdgeWorld, field: String, value: i64) {
    assert_eq!(world.last().json()[field.as_str()], serde_json::json!(value));
}

#[then(expr = "the response body has no field {string}")]
async fn then_body_no_field(world: &mut EdgeWorld, field: String) {
    assert!(world.last().json().get(field.as_str()).is_none());
}
