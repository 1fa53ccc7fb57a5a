//! Shared helpers for end-to-end tests.

use cloudscale::Config;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config pointed at a mock server, with retries and pacing tightened so
/// tests stay fast.
pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::new("demo", "preset123");
    config.endpoints.api_base = server.uri();
    config.endpoints.delivery_base = server.uri();
    config.concurrency = 3;
    config.retry.max_attempts = 1;
    config.retry.base_delay = Duration::from_millis(10);
    config.pacing.cooldown = Duration::from_millis(0);
    config
}

/// Write `names` as small image files into `dir`
pub fn write_images(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), b"not-really-pixels").unwrap();
    }
}

/// Mount an upload mock answering every file with the same handle, plus a
/// transform mock serving the upscaled bytes.
pub async fn mount_happy_path(server: &MockServer) {
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
pub async fn mount_upload_failure_for(server: &MockServer, marker: &str) {
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
