//! Shared test helpers for exercising the engine against a mock server.

use crate::config::Config;
use crate::source::Selection;
use crate::types::{Event, SourceFile};
use crate::upscaler::BatchUpscaler;
use serde_json::json;
use std::time::Duration;
use tokio::sync::broadcast;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config pointed at a mock server, with retries and pacing tightened so
/// tests stay fast.
pub(crate) fn test_config(server: &MockServer) -> Config {
    let mut config = Config::new("demo", "preset123");
    config.endpoints.api_base = server.uri();
    config.endpoints.delivery_base = server.uri();
    config.concurrency = 3;
    config.retry.max_attempts = 1;
    config.retry.base_delay = Duration::from_millis(10);
    config.pacing.cooldown = Duration::from_millis(0);
    config
}

/// Engine built from [`test_config`]
pub(crate) fn test_engine(server: &MockServer) -> BatchUpscaler {
    BatchUpscaler::new(test_config(server)).unwrap()
}

/// Selection of `n` synthetic JPEGs named `img00.jpg`, `img01.jpg`, ...
pub(crate) fn selection_of(n: usize) -> Selection {
    let files = (0..n)
        .map(|i| SourceFile::new(format!("img{i:02}.jpg"), "image/jpeg", vec![0x42; 16]))
        .collect();
    Selection::from_files("testpics", files)
}

/// Mount an upload mock answering every file with the same handle, plus a
/// transform mock serving the upscaled bytes.
pub(crate) async fn mount_happy_path(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/demo/image/upload"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"public_id": "scaled/ok"})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/demo/image/upload/e_upscale/scaled/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"upscaled-bytes".to_vec()))
        .mount(server)
        .await;
}

/// Mount a higher-priority upload rejection for requests whose multipart
/// body mentions `marker` (a file name works)
pub(crate) async fn mount_upload_failure_for(server: &MockServer, marker: &str) {
    Mock::given(method("POST"))
        .and(path("/demo/image/upload"))
        .and(body_string_contains(marker.to_string()))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"error": {"message": "corrupt upload"}})),
        )
        .with_priority(1)
        .mount(server)
        .await;
}

/// Drain every event already broadcast on a receiver
pub(crate) fn drain_events(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
