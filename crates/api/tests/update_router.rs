//! Delivery tests for the update router, plus the end-to-end submission
//! scenario: submit, poll to completion, and observe the WebSocket frames
//! a connected client would receive.

mod common;

use std::sync::Arc;

use axum::extract::ws::Message;

use common::{provider_job, ScriptedProvider};
use reel_api::engine::{SubmitVideoRequest, Submitter};
use reel_api::updates::UpdateRouter;
use reel_api::ws::{SessionRegistry, WsManager};
use reel_db::store::VideoStore;
use reel_events::{EventBus, JobUpdate};
use reel_sora::{VideoJob, VideoProvider};

struct Wiring {
    sessions: Arc<SessionRegistry>,
    ws_manager: Arc<WsManager>,
    bus: Arc<EventBus>,
    router_handle: tokio::task::JoinHandle<()>,
}

/// Stand up registry, connection manager, bus, and a running router task.
fn wire_router() -> Wiring {
    let sessions = Arc::new(SessionRegistry::new());
    let ws_manager = Arc::new(WsManager::new());
    let bus = Arc::new(EventBus::default());

    let router = UpdateRouter::new(Arc::clone(&sessions), Arc::clone(&ws_manager));
    let router_handle = tokio::spawn(router.run(bus.subscribe()));

    Wiring {
        sessions,
        ws_manager,
        bus,
        router_handle,
    }
}

/// Parse the text payload of a WebSocket frame as JSON.
fn frame_json(msg: Message) -> serde_json::Value {
    match msg {
        Message::Text(text) => serde_json::from_str(&text).expect("frame should be JSON"),
        other => panic!("expected Text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn update_reaches_the_owners_bound_channel() {
    let wiring = wire_router();

    let mut rx = wiring.ws_manager.add("chan-a".into(), 1).await;
    wiring.sessions.register(1, "chan-a".into()).await;

    wiring
        .bus
        .publish(JobUpdate::progress(7, 1, "in_progress", Some(40)));

    let payload = frame_json(rx.recv().await.expect("frame should arrive"));
    assert_eq!(payload["type"], "job:update");
    assert_eq!(payload["id"], 7);
    assert_eq!(payload["status"], "in_progress");
    assert_eq!(payload["progress"], 40);
}

#[tokio::test]
async fn update_for_unbound_user_is_a_silent_noop() {
    let wiring = wire_router();

    let mut rx = wiring.ws_manager.add("chan-a".into(), 1).await;
    wiring.sessions.register(1, "chan-a".into()).await;

    // User 2 has no channel: this update is dropped without error.
    wiring.bus.publish(JobUpdate::progress(8, 2, "queued", None));
    // A subsequent update for user 1 still arrives, proving the router
    // survived and user 1's frame is the FIRST thing on the channel.
    wiring.bus.publish(JobUpdate::failed(7, 1));

    let payload = frame_json(rx.recv().await.expect("frame should arrive"));
    assert_eq!(payload["id"], 7);
    assert_eq!(payload["status"], "failed");
}

#[tokio::test]
async fn router_exits_when_the_bus_is_dropped() {
    let wiring = wire_router();

    drop(wiring.bus);

    wiring
        .router_handle
        .await
        .expect("router task should finish cleanly");
}

#[tokio::test(start_paused = true)]
async fn end_to_end_submission_streams_updates_to_the_owner() {
    let wiring = wire_router();

    // Provider: create accepts the job as queued; first poll still queued,
    // second poll completed with the media URL.
    let mut provider = ScriptedProvider::new();
    provider.create_response = Some(provider_job("p1", "queued"));
    let provider = provider.with_script(vec![
        provider_job("p1", "queued"),
        VideoJob {
            url: Some("https://x/video.mp4".into()),
            ..provider_job("p1", "completed")
        },
    ]);

    let store = Arc::new(common::MemStore::new());
    let submitter = Submitter::new(
        Arc::clone(&store) as Arc<dyn VideoStore>,
        Arc::new(provider) as Arc<dyn VideoProvider>,
        Arc::clone(&wiring.bus),
    );

    // The owner is connected before submitting.
    let mut rx = wiring.ws_manager.add("chan-a".into(), 1).await;
    wiring.sessions.register(1, "chan-a".into()).await;

    let video = submitter
        .submit(
            1,
            SubmitVideoRequest {
                prompt: "a cat on a skateboard".into(),
                ..Default::default()
            },
        )
        .await
        .expect("submission should succeed");
    assert_eq!(video.status, "queued");

    // First frame: the queued progress update from the first poll.
    let first = frame_json(rx.recv().await.expect("first frame"));
    assert_eq!(first["type"], "job:update");
    assert_eq!(first["id"], video.id);
    assert_eq!(first["status"], "queued");

    // Second frame: the final full-record update.
    let second = frame_json(rx.recv().await.expect("second frame"));
    assert_eq!(second["type"], "job:update");
    assert_eq!(second["video"]["status"], "completed");
    assert_eq!(second["video"]["video_url"], "https://x/video.mp4");

    // The persisted record agrees with the final frame.
    let record = store.get(video.id).unwrap();
    assert_eq!(record.status, "completed");
    assert_eq!(record.video_url.as_deref(), Some("https://x/video.mp4"));
}
