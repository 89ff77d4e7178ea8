mod common;

use std::f32::consts::TAU;

use prism_demos::cube::{self, CubeScene, ANGULAR_SPEED};
use prism_demos::shaders;
use prism_engine::device::{
    Command, DebugMessage, DebugMode, DebugSeverity, DeviceError, DrawMode, RecordingDevice,
};
use prism_engine::frame::{FrameLoop, LoopState};
use prism_engine::time::FixedClock;
use prism_engine::transform::mat4_bytes;
use prism_engine::Error;

use common::ScriptedHost;

fn load(host: &mut ScriptedHost) -> CubeScene {
    CubeScene::load(
        &mut host.gfx,
        &shaders::library(None),
        cube::WIDTH,
        cube::HEIGHT,
    )
    .unwrap()
}

fn expected_angle(frames: u32) -> f32 {
    (frames as f32 / 60.0 * ANGULAR_SPEED).rem_euclid(TAU)
}

// ── rotation ──────────────────────────────────────────────────────────────

#[test]
fn angle_advances_by_dt_times_speed() {
    let mut host = ScriptedHost::new(RecordingDevice::new(), DebugMode::Strict);
    let mut scene = load(&mut host);
    let mut frame_loop = FrameLoop::new(FixedClock::hz(60));

    for _ in 0..120 {
        assert_eq!(
            frame_loop.iterate(&mut host, &mut scene).unwrap(),
            LoopState::Running
        );
    }

    assert!((scene.angle() - expected_angle(120)).abs() < 1e-4);
    assert!((scene.angle() - 1.0).abs() < 1e-4);
}

#[test]
fn angle_wraps_after_full_turns() {
    let mut host = ScriptedHost::new(RecordingDevice::new(), DebugMode::Strict);
    let mut scene = load(&mut host);
    let mut frame_loop = FrameLoop::new(FixedClock::hz(60));

    // 1000 frames = 8.33 rad, more than one full turn
    for _ in 0..1000 {
        frame_loop.iterate(&mut host, &mut scene).unwrap();
        assert!((0.0..TAU).contains(&scene.angle()));
    }

    assert!((scene.angle() - expected_angle(1000)).abs() < 1e-3);
}

#[test]
fn full_period_in_small_steps_returns_to_start() {
    let mut host = ScriptedHost::new(RecordingDevice::new(), DebugMode::Strict);
    let mut scene = load(&mut host);
    let start = scene.angle();

    let steps = 1000;
    let period = TAU / ANGULAR_SPEED;
    let mut frame_loop = FrameLoop::new(FixedClock::new(period / steps as f32));

    for _ in 0..steps {
        frame_loop.iterate(&mut host, &mut scene).unwrap();
    }

    let diff = (scene.angle() - start).rem_euclid(TAU);
    let circular = diff.min(TAU - diff);
    assert!(circular < 1e-3, "drifted {circular} rad after one period");
}

// ── per-frame commands ────────────────────────────────────────────────────

#[test]
fn one_upload_then_draw_then_present_per_frame() {
    let dev = RecordingDevice::new();
    let recorder = dev.clone();
    let mut host = ScriptedHost::new(dev, DebugMode::Strict).close_after(5);
    let mut scene = load(&mut host);

    let summary = FrameLoop::new(FixedClock::hz(60))
        .run(&mut host, &mut scene)
        .unwrap();
    assert_eq!(summary.frames, 5);

    let frame_cmds: Vec<&'static str> = recorder
        .commands()
        .iter()
        .filter_map(|c| match c {
            Command::Clear { depth: true, .. } => Some("clear"),
            Command::SetUniform { .. } => Some("uniform"),
            Command::Draw(_) => Some("draw"),
            Command::Present => Some("present"),
            _ => None,
        })
        .collect();
    assert_eq!(frame_cmds, ["clear", "uniform", "draw", "present"].repeat(5));
}

#[test]
fn uploaded_matrix_matches_scene_state() {
    let dev = RecordingDevice::new();
    let recorder = dev.clone();
    let mut host = ScriptedHost::new(dev, DebugMode::Strict);
    let mut scene = load(&mut host);

    FrameLoop::new(FixedClock::hz(60))
        .iterate(&mut host, &mut scene)
        .unwrap();

    let uploaded: Vec<Vec<u8>> = recorder
        .commands()
        .into_iter()
        .filter_map(|c| match c {
            Command::SetUniform { bytes, .. } => Some(bytes),
            _ => None,
        })
        .collect();
    assert_eq!(uploaded, vec![mat4_bytes(&scene.mvp()).to_vec()]);
}

#[test]
fn indexed_draw_of_36_elements_with_depth() {
    let dev = RecordingDevice::new();
    let recorder = dev.clone();
    let mut host = ScriptedHost::new(dev, DebugMode::Strict);
    let scene = load(&mut host);

    assert_eq!(
        scene.geometry().draw_call().mode,
        DrawMode::Elements { count: 36 }
    );
    let vao = recorder.vertex_array(scene.geometry().vertex_array()).unwrap();
    assert!(vao.depth_test);
    assert_eq!(
        recorder.buffer_contents(scene.geometry().vertex_buffer()).map(|b| b.len()),
        Some(24 * 24)
    );
}

// ── failure and teardown ──────────────────────────────────────────────────

#[test]
fn strict_debug_error_aborts_the_loop() {
    let dev = RecordingDevice::new();
    let recorder = dev.clone();
    let mut host = ScriptedHost::new(dev, DebugMode::Strict);
    let mut scene = load(&mut host);

    recorder.inject_debug(DebugMessage::new(DebugSeverity::Error, "GL_INVALID_OPERATION"));

    let err = FrameLoop::new(FixedClock::hz(60))
        .run(&mut host, &mut scene)
        .unwrap_err();

    match err {
        Error::Device(DeviceError::Debug(msg)) => assert_eq!(msg.message, "GL_INVALID_OPERATION"),
        other => panic!("unexpected: {other:?}"),
    }
    // the frame that hit the error was still presented
    assert_eq!(recorder.count(|c| matches!(c, Command::Present)), 1);
}

#[test]
fn log_mode_survives_debug_errors() {
    let dev = RecordingDevice::new();
    let recorder = dev.clone();
    let mut host = ScriptedHost::new(dev, DebugMode::Log).close_after(2);
    let mut scene = load(&mut host);

    recorder.inject_debug(DebugMessage::new(DebugSeverity::Error, "ignored"));

    let summary = FrameLoop::new(FixedClock::hz(60))
        .run(&mut host, &mut scene)
        .unwrap();
    assert_eq!(summary.frames, 2);
}

#[test]
fn teardown_releases_every_object_once() {
    let dev = RecordingDevice::new();
    let recorder = dev.clone();
    let mut host = ScriptedHost::new(dev, DebugMode::Strict).close_after(2);
    let mut scene = load(&mut host);

    FrameLoop::new(FixedClock::hz(60))
        .run(&mut host, &mut scene)
        .unwrap();

    // program, vertex buffer, index buffer, vertex array
    assert_eq!(host.gfx.teardown(), 4);
    assert_eq!(host.gfx.teardown(), 0);
    drop(host);

    assert_eq!(recorder.live_objects(), 0);
    assert_eq!(recorder.invalid_releases(), 0);
}
