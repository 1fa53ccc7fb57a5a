use crate::error::Error;
use crate::source::Selection;
use crate::types::{Event, ItemState};
use crate::upscaler::test_helpers::{
    drain_events, mount_happy_path, mount_upload_failure_for, selection_of, test_config,
    test_engine,
};
use std::io::Cursor;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// --- happy path ---

#[tokio::test]
async fn seven_files_concurrency_three_complete_into_archive() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    let engine = test_engine(&server);
    let report = engine.run(selection_of(7)).await.unwrap();

    assert_eq!(report.completed, 7);
    assert_eq!(report.errors, 0);

    let archive = report.archive.expect("archive should be produced");
    assert_eq!(archive.name, "testpics_upscaled.zip");
    assert_eq!(archive.entries, 7);

    let stats = engine.stats().await;
    assert_eq!(stats.total, 7);
    assert_eq!(stats.completed, 7);
    assert_eq!(stats.errors, 0);
    assert_eq!(stats.processing, 0, "nothing should remain in flight");

    let states = engine.item_states().await;
    assert_eq!(states.len(), 7);
    assert!(states.iter().all(|s| *s == ItemState::Completed));
}

#[tokio::test]
async fn window_two_starts_only_after_window_one_settles() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    let engine = test_engine(&server);
    let mut rx = engine.subscribe();
    engine.run(selection_of(7)).await.unwrap();

    let events = drain_events(&mut rx);

    // Position of index 3's pre-mark (first item of window 2) versus the
    // completions of window 1's items.
    let window_two_premark = events
        .iter()
        .position(|e| {
            matches!(
                e,
                Event::StateChanged {
                    index: 3,
                    state: ItemState::Uploading,
                    ..
                }
            )
        })
        .expect("index 3 should be pre-marked");

    for index in 0..3 {
        let completed = events
            .iter()
            .position(|e| {
                matches!(
                    e,
                    Event::StateChanged {
                        index: i,
                        state: ItemState::Completed,
                        ..
                    } if *i == index
                )
            })
            .unwrap_or_else(|| panic!("index {index} should complete"));
        assert!(
            completed < window_two_premark,
            "item {index} must settle before window 2 is pre-marked"
        );
    }
}

#[tokio::test]
async fn each_item_emits_handle_created_with_the_upload_handle() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    let engine = test_engine(&server);
    let mut rx = engine.subscribe();
    engine.run(selection_of(2)).await.unwrap();

    let events = drain_events(&mut rx);
    let handles: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            Event::HandleCreated { public_id, .. } => Some(public_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(handles, ["scaled/ok", "scaled/ok"]);
}

// --- partial failure ---

#[tokio::test]
async fn one_failure_in_first_window_leaves_six_archive_entries() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;
    mount_upload_failure_for(&server, "img01.jpg").await;

    let engine = test_engine(&server);
    let mut rx = engine.subscribe();
    let report = engine.run(selection_of(7)).await.unwrap();

    assert_eq!(report.completed, 6);
    assert_eq!(report.errors, 1);

    let archive = report.archive.expect("archive should still be produced");
    assert_eq!(archive.entries, 6);

    let zip = zip::ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
    let names: Vec<_> = zip.file_names().collect();
    assert_eq!(names.len(), 6);
    assert!(
        !names.contains(&"img01_upscaled.jpg"),
        "failed item must not be bundled, got {names:?}"
    );
    assert!(names.contains(&"img00_upscaled.jpg"));

    let events = drain_events(&mut rx);
    let failure = events.iter().find_map(|e| match e {
        Event::ItemFailed { index, name, error } => Some((*index, name.clone(), error.clone())),
        _ => None,
    });
    let (index, name, error) = failure.expect("failure event should be emitted");
    assert_eq!(index, 1);
    assert_eq!(name, "img01.jpg");
    assert!(
        error.contains("corrupt upload"),
        "vendor message should surface, got: {error}"
    );

    let states = engine.item_states().await;
    assert_eq!(states[1], ItemState::Failed);
    assert_eq!(
        states.iter().filter(|s| **s == ItemState::Completed).count(),
        6
    );
}

#[tokio::test]
async fn transform_failure_counts_as_error_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/demo/image/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"public_id": "scaled/ok"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/demo/image/upload/e_upscale/scaled/ok"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.retry.max_attempts = 2;
    let engine = crate::upscaler::BatchUpscaler::new(config).unwrap();

    let report = engine.run(selection_of(1)).await.unwrap();
    assert_eq!(report.completed, 0);
    assert_eq!(report.errors, 1);
    assert!(report.archive.is_none());
}

// --- zero success ---

#[tokio::test]
async fn zero_successes_produce_no_archive_and_a_run_failed_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/demo/image/upload"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let engine = test_engine(&server);
    let mut rx = engine.subscribe();
    let report = engine.run(selection_of(4)).await.unwrap();

    assert_eq!(report.completed, 0);
    assert_eq!(report.errors, 4);
    assert!(report.archive.is_none(), "no archive on total failure");

    let events = drain_events(&mut rx);
    assert!(
        events.iter().any(|e| matches!(e, Event::RunFailed { .. })),
        "run failure must be announced"
    );
    assert!(
        !events.iter().any(|e| matches!(e, Event::ArchiveReady { .. })),
        "no archive event on total failure"
    );
}

// --- run exclusivity and input validation ---

#[tokio::test]
async fn second_run_while_active_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/demo/image/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"public_id": "scaled/ok"}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/demo/image/upload/e_upscale/scaled/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
        .mount(&server)
        .await;

    let engine = test_engine(&server);
    let background = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.run(selection_of(1)).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(engine.is_running());
    let second = engine.run(selection_of(1)).await;
    assert!(matches!(second, Err(Error::RunActive)));

    let first = background.await.unwrap().unwrap();
    assert_eq!(first.completed, 1);
    assert!(!engine.is_running());
}

#[tokio::test]
async fn stats_mid_run_show_the_window_in_flight() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/demo/image/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"public_id": "scaled/ok"}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/demo/image/upload/e_upscale/scaled/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
        .mount(&server)
        .await;

    let engine = test_engine(&server);
    let background = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.run(selection_of(5)).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    // First window (3 of 5) is pre-marked and in flight.
    let stats = engine.stats().await;
    assert_eq!(stats.total, 5);
    assert_eq!(stats.processing, 3);
    assert_eq!(stats.completed + stats.errors, 0);

    let states = engine.item_states().await;
    let non_terminal = states.iter().filter(|s| !s.is_terminal()).count();
    assert_eq!(stats.completed + stats.errors + non_terminal, stats.total);

    background.await.unwrap().unwrap();
}

#[tokio::test]
async fn empty_selection_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    let engine = test_engine(&server);

    let result = engine.run(Selection::from_files("empty", vec![])).await;
    assert!(matches!(result, Err(Error::NoSources(_))));
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn cooldown_spaces_consecutive_windows() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    let mut config = test_config(&server);
    config.concurrency = 2;
    config.pacing.cooldown = Duration::from_millis(150);
    let engine = crate::upscaler::BatchUpscaler::new(config).unwrap();

    let start = std::time::Instant::now();
    engine.run(selection_of(4)).await.unwrap();
    let elapsed = start.elapsed();

    // Two windows, one cooldown between them.
    assert!(
        elapsed >= Duration::from_millis(150),
        "cooldown must separate windows, elapsed {elapsed:?}"
    );
}

#[tokio::test]
async fn concurrency_above_cap_is_clamped_to_five() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    let mut config = test_config(&server);
    config.concurrency = 50;
    let engine = crate::upscaler::BatchUpscaler::new(config).unwrap();
    let mut rx = engine.subscribe();

    engine.run(selection_of(7)).await.unwrap();

    // With the cap at 5, index 5 belongs to window 2 and is pre-marked
    // after index 0 completes.
    let events = drain_events(&mut rx);
    let premark_5 = events
        .iter()
        .position(|e| {
            matches!(
                e,
                Event::StateChanged {
                    index: 5,
                    state: ItemState::Uploading,
                    ..
                }
            )
        })
        .expect("index 5 should be pre-marked");
    let complete_0 = events
        .iter()
        .position(|e| {
            matches!(
                e,
                Event::StateChanged {
                    index: 0,
                    state: ItemState::Completed,
                    ..
                }
            )
        })
        .expect("index 0 should complete");
    assert!(
        complete_0 < premark_5,
        "index 5 must wait for the first window"
    );
}
