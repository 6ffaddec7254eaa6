use crate::features::EdgeWorld;
use cucumber::{given, then};
use cucumber_tests::MockUpstream;
use evt_edge_core::proxy::ServiceKind;

fn kind(name: &str) -> ServiceKind {
    name.parse().expect("known service name")
}

#[given(expr = "a mock {word} service")]
async fn given_mock_service(world: &mut EdgeWorld, service: String) {
    let upstream = MockUpstream::start().await.expect("mock upstream should bind");
    world.config.services.set(kind(&service), Some(upstream.url()));
    world.upstream = Some(upstream);
}

#[given(expr = "the {word} service is not configured")]
async fn given_unconfigured(world: &mut EdgeWorld, service: String) {
    world.config.services.set(kind(&service), None);
}

#[given(expr = "the {word} service is down")]
async fn given_service_down(world: &mut EdgeWorld, service: String) {
    // Bind and release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    world.config.services.set(kind(&service), Some(format!("http://{}", addr)));
}

#[given(expr = "the mock service answers with status {int}")]
async fn given_mock_status(world: &mut EdgeWorld, status: u16) {
    world.upstream.as_ref().expect("mock service started").set_status(status);
}

#[given(expr = "upstream diagnostics are hidden")]
async fn given_diagnostics_hidden(world: &mut EdgeWorld) {
    world.config.proxy.expose_diagnostics = false;
}

#[then(expr = "the mock service received {word} {string}")]
async fn then_received(world: &mut EdgeWorld, method: String, path: String) {
    let received = world.upstream.as_ref().expect("mock service started").received();
    assert_eq!(received.len(), 1, "received: {:?}", received);
    assert_eq!(received[0].method, method);
    assert_eq!(received[0].path_and_query, path);
}

#[then(expr = "the mock service received no requests")]
async fn then_received_nothing(world: &mut EdgeWorld) {
    let received = world.upstream.as_ref().expect("mock service started").received();
    assert!(received.is_empty(), "received: {:?}", received);
}

#[then(expr = "the mock service saw header {string} with value {string}")]
async fn then_upstream_header(world: &mut EdgeWorld, name: String, value: String) {
    let received = world.upstream.as_ref().expect("mock service started").received();
    let actual = received[0].headers.get(name.as_str()).and_then(|v| v.to_str().ok());
    assert_eq!(actual, Some(value.as_str()));
}

#[then(expr = "the mock service saw no header {string}")]
async fn then_upstream_no_header(world: &mut EdgeWorld, name: String) {
    let received = world.upstream.as_ref().expect("mock service started").received();
    assert!(received[0].headers.get(name.as_str()).is_none());
}
