use crate::features::EdgeWorld;
use cucumber::{given, then};

#[given(expr = "the supported locales are {string} with default {string}")]
async fn given_locales(world: &mut EdgeWorld, supported: String, default: String) {
    world.config.locales.supported = supported.split(',').map(|s| s.trim().to_string()).collect();
    world.config.locales.default = default;
}

#[then(expr = "the response has header {string} with value {string}")]
async fn then_header(world: &mut EdgeWorld, name: String, value: String) {
    let actual = world.last().headers.get(name.as_str()).and_then(|v| v.to_str().ok());
    assert_eq!(actual, Some(value.as_str()));
}

#[then(expr = "the response has header {string}")]
async fn then_has_header(world: &mut EdgeWorld, name: String) {
    assert!(world.last().headers.contains_key(name.as_str()), "missing {}", name);
}

#[then(expr = "the response sets a CSRF cookie")]
async fn then_sets_csrf(world: &mut EdgeWorld) {
    let found = world
        .last()
        .headers
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|c| c.starts_with("evt_csrf=") && c.contains("SameSite=Lax"));
    assert!(found, "no evt_csrf cookie in {:?}", world.last().headers);
}

#[then(expr = "the response sets no cookie")]
async fn then_sets_no_cookie(world: &mut EdgeWorld) {
    assert!(world.last().headers.get("set-cookie").is_none());
}
