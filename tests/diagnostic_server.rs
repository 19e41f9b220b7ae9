//! End-to-end tests of the diagnostic context over a real listener.

use std::time::{Duration, Instant};

use feed_intercept::config::AgentConfig;
use feed_intercept::http::{HttpServer, X_REQUEST_ID};

mod common;

fn config(delay_ms: u64) -> AgentConfig {
    let mut config = AgentConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.diagnostic.delay_ms = delay_ms;
    config.observability.trace_requests = true;
    config.observability.trace_responses = true;
    config
}

#[tokio::test]
async fn get_on_mount_path_answers_done() {
    let (addr, shutdown) = common::start_server(HttpServer::new(config(0))).await;

    let res = common::client()
        .get(format!("http://{addr}/delay"))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key(X_REQUEST_ID));
    assert_eq!(
        res.headers()["content-type"],
        "text/plain; charset=utf-8"
    );
    assert_eq!(res.text().await.unwrap(), "Done");

    shutdown.trigger();
}

#[tokio::test]
async fn client_request_id_is_echoed() {
    let (addr, shutdown) = common::start_server(HttpServer::new(config(0))).await;

    let res = common::client()
        .get(format!("http://{addr}/delay"))
        .header(X_REQUEST_ID, "feed-push-17")
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()[X_REQUEST_ID], "feed-push-17");
    shutdown.trigger();
}

#[tokio::test]
async fn non_get_is_method_not_allowed() {
    let (addr, shutdown) = common::start_server(HttpServer::new(config(0))).await;

    let res = common::client()
        .post(format!("http://{addr}/delay"))
        .body("<feed/>")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 405);
    assert_eq!(res.text().await.unwrap(), "Method not allowed");
    shutdown.trigger();
}

#[tokio::test]
async fn path_below_mount_is_not_found() {
    let (addr, shutdown) = common::start_server(HttpServer::new(config(0))).await;
    let client = common::client();

    let res = client
        .get(format!("http://{addr}/delay/extra"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.text().await.unwrap(), "Not found");

    let res = client
        .get(format!("http://{addr}/unmounted"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    shutdown.trigger();
}

#[tokio::test]
async fn configured_delay_is_honoured() {
    let (addr, shutdown) = common::start_server(HttpServer::new(config(300))).await;

    let start = Instant::now();
    let res = common::client()
        .get(format!("http://{addr}/delay"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(start.elapsed() >= Duration::from_millis(300));
    shutdown.trigger();
}

#[tokio::test]
async fn request_timeout_cuts_the_wait_short() {
    let mut config = config(60_000);
    config.timeouts.request_secs = 1;
    let (addr, shutdown) = common::start_server(HttpServer::new(config)).await;

    let start = Instant::now();
    let res = common::client()
        .get(format!("http://{addr}/delay"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 408);
    assert!(start.elapsed() < Duration::from_secs(30));
    shutdown.trigger();
}

#[tokio::test]
async fn disabled_diagnostic_context_is_not_mounted() {
    let mut config = config(0);
    config.diagnostic.enabled = false;
    let (addr, shutdown) = common::start_server(HttpServer::new(config)).await;

    let res = common::client()
        .get(format!("http://{addr}/delay"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 404);
    shutdown.trigger();
}
