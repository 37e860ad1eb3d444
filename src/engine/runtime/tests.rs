use super::*;
use crate::engine::producer::TargetId;
use crate::engine::stereo::{STEREO_SIGNAL_HEIGHT, STEREO_SIGNAL_WIDTH, STEREO_SIGNAL_X, Viewport};
use crate::engine::testing::{MockBackend, MockProducer, ProducerCall, SourceCall};

fn settings() -> BridgeSettings {
    BridgeSettings {
        display_timeout_ms: 5_000,
        ..BridgeSettings::default()
    }
}

fn bridge() -> (StereoBridge<MockProducer, MockBackend>, MockProducer, MockBackend) {
    let producer = MockProducer::new();
    let backend = MockBackend::new();
    let bridge = StereoBridge::new(producer.clone(), backend.clone(), settings());
    (bridge, producer, backend)
}

fn sentinel() -> Viewport {
    Viewport {
        x: STEREO_SIGNAL_X,
        y: 0,
        width: STEREO_SIGNAL_WIDTH,
        height: STEREO_SIGNAL_HEIGHT,
        min_z: 0.0,
        max_z: 1.0,
    }
}

/// Runs one host frame through the hooks and returns the post-present result.
fn frame(bridge: &mut StereoBridge<MockProducer, MockBackend>, stereo: bool) -> bool {
    bridge.on_frame_boundary_begin();
    if stereo {
        assert!(bridge.on_viewport_change(&sentinel()));
    }
    bridge.on_frame_boundary_end();
    bridge.on_frame_presented()
}

#[test]
fn test_nothing_happens_before_first_present() {
    let (mut bridge, producer, _) = bridge();
    bridge.on_frame_boundary_begin();
    assert_eq!(bridge.session(), SessionState::Idle);
    assert!(producer.calls().is_empty());

    bridge.on_frame_boundary_end();
    assert!(!bridge.on_frame_presented());
    assert_eq!(bridge.stats().presented_targets, 1);
    assert_eq!(producer.live_surfaces(), 0);
}

#[test]
fn test_mono_frames_are_displayed() {
    let (mut bridge, producer, backend) = bridge();
    assert!(!frame(&mut bridge, false));

    for k in 1..=3 {
        assert!(frame(&mut bridge, false));
        assert_eq!(backend.surface_swaps(), k);
    }
    assert!(bridge.session().is_live());
    assert_eq!(producer.live_surfaces(), 2);
    assert_eq!(bridge.stats().wait_timeouts, 0);
    assert!(!bridge.stereo_enabled());

    let request = backend.last_request().unwrap();
    assert_eq!(request.parent, producer.source().handle());
    assert_eq!(request.size, producer.source().client_size());
}

#[test]
fn test_stereo_frames_are_split_and_displayed() {
    let (mut bridge, _, backend) = bridge();
    backend.set_stereo_available(true);
    frame(&mut bridge, false);

    assert!(frame(&mut bridge, true));
    assert!(bridge.stereo_enabled());
    assert_eq!(bridge.stats().frames_dx, 2);
    let calls = backend.gl_calls();
    assert!(calls.contains(&crate::engine::testing::GlCall::SelectDrawBuffer(glow::BACK_LEFT)));
    assert!(calls.contains(&crate::engine::testing::GlCall::SelectDrawBuffer(glow::BACK_RIGHT)));
}

#[test]
fn test_stereo_signal_before_init_only_latches() {
    let (mut bridge, producer, _) = bridge();
    assert!(bridge.on_viewport_change(&sentinel()));
    assert!(bridge.stereo_enabled());
    assert_eq!(bridge.session(), SessionState::Idle);
    assert!(producer.calls().is_empty());

    let plain = Viewport {
        width: 640,
        height: 480,
        ..sentinel()
    };
    assert!(bridge.on_viewport_change(&plain));
}

#[test]
fn test_offscreen_target_is_not_captured() {
    let (mut bridge, producer, _) = bridge();
    frame(&mut bridge, false);
    frame(&mut bridge, false);
    producer.clear_calls();

    producer.set_current_target(Some(TargetId(7)));
    bridge.on_frame_boundary_begin();
    assert!(
        !producer
            .calls()
            .iter()
            .any(|call| matches!(call, ProducerCall::SetRenderTarget(_)))
    );
}

#[test]
fn test_display_init_failure_ends_session() {
    let (mut bridge, producer, backend) = bridge();
    backend.fail_open_interop(true);
    frame(&mut bridge, false);

    frame(&mut bridge, false);
    assert_eq!(bridge.session(), SessionState::Failed);
    assert_eq!(producer.live_surfaces(), 0);
    assert!(producer.calls().contains(&ProducerCall::RestoreOutputTarget));
    assert!(producer.source().calls().contains(&SourceCall::PostQuit));

    producer.clear_calls();
    assert!(!frame(&mut bridge, false));
    assert!(producer.calls().is_empty());
}

#[test]
fn test_missing_focus_window_fails_creation() {
    let (mut bridge, producer, _) = bridge();
    producer.set_has_window(false);
    frame(&mut bridge, false);
    assert!(!frame(&mut bridge, false));
    assert_eq!(bridge.session(), SessionState::Failed);
    assert_eq!(producer.live_surfaces(), 0);
}

#[test]
fn test_surface_creation_failure_rolls_back() {
    let (mut bridge, producer, _) = bridge();
    producer.fail_create_after(1);
    frame(&mut bridge, false);
    assert!(!frame(&mut bridge, false));
    assert_eq!(bridge.session(), SessionState::Failed);
    assert_eq!(producer.live_surfaces(), 0);
    assert!(producer.source().calls().contains(&SourceCall::PostQuit));
}

#[test]
fn test_bind_failure_mid_session_restores_output() {
    let (mut bridge, producer, backend) = bridge();
    frame(&mut bridge, false);
    assert!(frame(&mut bridge, false));

    producer.fail_set_render_target(true);
    assert!(!frame(&mut bridge, false));
    assert_eq!(bridge.session(), SessionState::Failed);
    assert_eq!(producer.live_surfaces(), 0);
    assert!(producer.calls().contains(&ProducerCall::RestoreOutputTarget));
    assert_eq!(backend.gl_live_objects(), 0);

    producer.clear_calls();
    frame(&mut bridge, true);
    assert!(producer.calls().is_empty());
}

#[test]
fn test_shutdown_is_idempotent() {
    let (mut bridge, producer, backend) = bridge();
    frame(&mut bridge, false);
    frame(&mut bridge, false);

    bridge.shutdown();
    assert_eq!(bridge.session(), SessionState::Stopped);
    assert_eq!(producer.live_surfaces(), 0);
    assert_eq!(backend.gl_live_objects(), 0);
    let calls = producer.calls().len();

    bridge.shutdown();
    assert_eq!(producer.calls().len(), calls);
    assert!(!frame(&mut bridge, false));
}

#[test]
fn test_drop_releases_surfaces() {
    let (mut bridge, producer, backend) = bridge();
    frame(&mut bridge, false);
    frame(&mut bridge, false);
    drop(bridge);
    assert_eq!(producer.live_surfaces(), 0);
    assert_eq!(backend.gl_live_objects(), 0);
    assert_eq!(producer.calls().last(), Some(&ProducerCall::RestoreOutputTarget));
}

#[test]
fn test_shutdown_before_start_touches_nothing() {
    let (mut bridge, producer, _) = bridge();
    bridge.shutdown();
    assert_eq!(bridge.session(), SessionState::Stopped);
    assert!(producer.calls().is_empty());
}
