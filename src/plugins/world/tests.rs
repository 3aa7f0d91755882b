use bevy::prelude::*;
use bevy::ecs::message::Messages;
use proptest::prelude::*;

use super::*;
use crate::common::test_utils::{add_message, run_system_once, sim_world};

fn params(chunk_size: f32, ahead_distance: f32, behind_margin: u32) -> ChunkParams {
    ChunkParams { chunk_size, ahead_distance, behind_margin }
}

fn indices(window: &ChunkWindow) -> Vec<i64> {
    window.chunks().map(|c| c.index).collect()
}

#[test]
fn window_at_origin_covers_behind_and_ahead() {
    let w = compute_active_chunks(0.0, params(80.0, 200.0, 2)).unwrap();
    assert_eq!(indices(&w), vec![-2, -1, 0, 1, 2]);
    assert_eq!(w.len(), 5);
    assert_eq!(w.current_index(), 0);
}

#[test]
fn origin_offset_is_index_times_size() {
    let w = compute_active_chunks(170.0, params(80.0, 80.0, 1)).unwrap();
    let chunks: Vec<Chunk> = w.chunks().collect();
    assert_eq!(chunks.first().unwrap().index, 1);
    assert_eq!(chunks.first().unwrap().origin_offset, 80.0);
    assert_eq!(chunks.last().unwrap().index, 3);
    assert_eq!(chunks.last().unwrap().origin_offset, 240.0);
}

#[test]
fn negative_displacement_floors_downward() {
    let w = compute_active_chunks(-1.0, params(80.0, 0.0, 0)).unwrap();
    assert_eq!(w.current_index(), -1);
    assert_eq!(indices(&w), vec![-1]);
}

#[test]
fn non_finite_input_is_rejected() {
    let p = params(80.0, 200.0, 2);
    assert!(compute_active_chunks(f32::NAN, p).is_none());
    assert!(compute_active_chunks(f32::INFINITY, p).is_none());
    assert!(compute_active_chunks(0.0, params(0.0, 200.0, 2)).is_none());
    assert!(compute_active_chunks(0.0, params(80.0, f32::NAN, 2)).is_none());
}

#[test]
fn huge_displacement_is_rejected_not_clipped() {
    let p = params(80.0, 200.0, 2);
    assert!(compute_active_chunks(1.0e30, p).is_none());
    assert!(compute_active_chunks(-1.0e30, p).is_none());
    assert!(compute_active_chunks(f32::MAX, p).is_none());

    // Still exact just inside the representable range.
    let w = compute_active_chunks(1.0e17, p).unwrap();
    assert_eq!(w.len(), 6);
    assert_eq!(w.last_index() - w.first_index(), 5);
}

#[test]
fn oversized_window_is_rejected() {
    assert!(compute_active_chunks(0.0, params(1.0, 1.0e30, 2)).is_none());
    assert!(compute_active_chunks(0.0, params(1.0, 0.0, u32::MAX)).is_none());
    assert!(ahead_chunk_count(4095.0, 1.0, 0).is_some());
    assert!(ahead_chunk_count(4096.0, 1.0, 0).is_none());
}

#[test]
fn streamer_keeps_previous_window_on_huge_displacement() {
    let p = params(80.0, 200.0, 2);
    let mut streamer = ChunkStreamer::default();
    assert!(streamer.recompute(100.0, p));
    let before = *streamer.window().unwrap();

    assert!(!streamer.recompute(1.0e30, p));
    assert_eq!(*streamer.window().unwrap(), before);
}

#[test]
fn streamer_keeps_previous_window_on_nan() {
    let p = params(80.0, 200.0, 2);
    let mut streamer = ChunkStreamer::default();
    assert!(streamer.recompute(100.0, p));
    let before = *streamer.window().unwrap();

    assert!(!streamer.recompute(f32::NAN, p));
    assert_eq!(*streamer.window().unwrap(), before);
    assert!(!streamer.needs_recompute(f32::NAN, 0.0));
}

#[test]
fn first_recompute_activates_whole_window() {
    let mut streamer = ChunkStreamer::default();
    streamer.recompute(0.0, params(80.0, 200.0, 2));
    assert_eq!(streamer.delta().activated.len(), 5);
    assert!(streamer.delta().deactivated.is_empty());
}

#[test]
fn moving_one_chunk_shifts_one_in_one_out() {
    let p = params(80.0, 200.0, 2);
    let mut streamer = ChunkStreamer::default();
    streamer.recompute(0.0, p);
    streamer.recompute(80.0, p);

    let delta = streamer.delta();
    assert_eq!(delta.activated.iter().map(|c| c.index).collect::<Vec<_>>(), vec![3]);
    assert_eq!(delta.deactivated.iter().map(|c| c.index).collect::<Vec<_>>(), vec![-2]);
}

#[test]
fn same_displacement_twice_yields_empty_delta() {
    let p = params(80.0, 200.0, 2);
    let mut streamer = ChunkStreamer::default();
    streamer.recompute(42.0, p);
    streamer.recompute(42.0, p);
    assert!(streamer.delta().is_empty());
}

#[test]
fn throttle_waits_for_threshold() {
    let mut streamer = ChunkStreamer::default();
    assert!(streamer.needs_recompute(0.0, 10.0));
    streamer.recompute(0.0, params(80.0, 200.0, 2));
    assert!(!streamer.needs_recompute(9.0, 10.0));
    assert!(streamer.needs_recompute(10.0, 10.0));
    assert!(streamer.needs_recompute(-10.0, 10.0));
}

#[test]
fn stream_chunks_system_writes_activation_messages() {
    let mut world = sim_world(Tunables::default());
    world.init_resource::<ChunkStreamer>();
    add_message::<ChunkActivated>(&mut world);
    add_message::<ChunkDeactivated>(&mut world);

    run_system_once(&mut world, super::stream_chunks);

    let streamer = world.resource::<ChunkStreamer>();
    assert_eq!(streamer.window().unwrap().len(), 5);

    let messages = world.resource::<Messages<ChunkActivated>>();
    assert_eq!(messages.len(), 5);

    // Moving less than the threshold publishes nothing.
    world.resource_mut::<PlayerMotion>().position.z = 5.0;
    run_system_once(&mut world, super::stream_chunks);
    assert_eq!(world.resource::<Messages<ChunkActivated>>().len(), 5);
    assert!(world.resource::<Messages<ChunkDeactivated>>().is_empty());
}

proptest! {
    #[test]
    fn window_is_contiguous_with_expected_len(
        displacement in -1.0e6f32..1.0e6,
        chunk_size in 1.0f32..500.0,
        ahead in 0.0f32..2000.0,
        behind in 0u32..8,
    ) {
        let p = params(chunk_size, ahead, behind);
        let w = compute_active_chunks(displacement, p).unwrap();
        let ahead_count = (ahead / chunk_size).ceil() as usize;

        let idx = indices(&w);
        prop_assert_eq!(idx.len(), behind as usize + ahead_count + 1);
        prop_assert!(idx.windows(2).all(|pair| pair[1] == pair[0] + 1));
        prop_assert!(w.contains(w.current_index()));
    }

    #[test]
    fn window_is_exact_or_rejected_for_any_finite_displacement(
        displacement in proptest::num::f32::POSITIVE
            | proptest::num::f32::NEGATIVE
            | proptest::num::f32::NORMAL
            | proptest::num::f32::ZERO,
    ) {
        let p = params(80.0, 200.0, 2);
        if let Some(w) = compute_active_chunks(displacement, p) {
            prop_assert_eq!(w.len(), 6);
            prop_assert_eq!(w.last_index() - w.first_index(), 5);
        } else {
            prop_assert!((f64::from(displacement) / 80.0).abs() > 9.0e15);
        }
    }

    #[test]
    fn window_is_idempotent(displacement in -1.0e6f32..1.0e6) {
        let p = params(80.0, 200.0, 2);
        let a: Vec<ChunkId> = compute_active_chunks(displacement, p).unwrap().chunks().map(|c| c.id).collect();
        let b: Vec<ChunkId> = compute_active_chunks(displacement, p).unwrap().chunks().map(|c| c.id).collect();
        prop_assert_eq!(a, b);
    }
}
