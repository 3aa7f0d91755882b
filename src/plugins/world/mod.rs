//! World plugin: streams fixed-length chunks along the travel axis.
//!
//! The window math is a pure function (`compute_active_chunks`). The only state
//! is the last valid window kept in `ChunkStreamer`, which the fixed-step system
//! diffs against so renderers receive just the chunks that entered or left.
//!
//! Recompute is throttled here, one layer above the pure function: the window is
//! only rebuilt once the player has moved `chunk_recompute_threshold` since the
//! last rebuild.

use std::ops::RangeInclusive;

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::SimSet;
use crate::plugins::player::PlayerMotion;

/// Chunk identity. Derived from the index alone, so recomputing the same window
/// always yields the same ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chunk {
    pub id: ChunkId,
    pub index: i64,
    /// Start of the chunk along the travel axis (`index * chunk_size`).
    pub origin_offset: f32,
}

impl Chunk {
    #[inline]
    pub fn at(index: i64, chunk_size: f32) -> Self {
        Self { id: ChunkId(index), index, origin_offset: index as f32 * chunk_size }
    }
}

/// Window sizing. `behind_margin` chunks are kept behind the current one and
/// enough chunks to cover `ahead_distance` in front of it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkParams {
    pub chunk_size: f32,
    pub ahead_distance: f32,
    pub behind_margin: u32,
}

impl ChunkParams {
    pub fn from_tunables(t: &Tunables) -> Self {
        Self {
            chunk_size: t.chunk_size,
            ahead_distance: t.chunk_ahead_distance,
            behind_margin: t.chunk_behind_margin,
        }
    }
}

/// Largest window `compute_active_chunks` will produce, behind and ahead
/// chunks included.
pub const MAX_WINDOW_CHUNKS: u64 = 4096;

/// Largest chunk index magnitude. Past 2^53 an `f64` no longer holds every
/// integer, so floored indices would skip chunks.
const MAX_CHUNK_INDEX: f64 = 9_007_199_254_740_992.0;

/// Number of chunks covering `ahead_distance`, or `None` if the resulting
/// window would exceed `MAX_WINDOW_CHUNKS`.
pub fn ahead_chunk_count(ahead_distance: f32, chunk_size: f32, behind_margin: u32) -> Option<u64> {
    let ahead = (f64::from(ahead_distance.max(0.0)) / f64::from(chunk_size)).ceil();
    let total = ahead + f64::from(behind_margin) + 1.0;
    if !total.is_finite() || total > MAX_WINDOW_CHUNKS as f64 {
        return None;
    }
    Some(ahead as u64)
}

/// A contiguous run of chunk indices, `[current - behind, current + ahead]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkWindow {
    first: i64,
    last: i64,
    current: i64,
    chunk_size: f32,
}

impl ChunkWindow {
    #[inline]
    pub fn first_index(&self) -> i64 {
        self.first
    }

    #[inline]
    pub fn last_index(&self) -> i64 {
        self.last
    }

    /// Index of the chunk the player stands in.
    #[inline]
    pub fn current_index(&self) -> i64 {
        self.current
    }

    #[inline]
    pub fn indices(&self) -> RangeInclusive<i64> {
        self.first..=self.last
    }

    #[inline]
    pub fn contains(&self, index: i64) -> bool {
        self.indices().contains(&index)
    }

    pub fn len(&self) -> usize {
        (self.last - self.first) as usize + 1
    }

    /// A window always holds at least the current chunk.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Chunks in ascending index order.
    pub fn chunks(&self) -> impl Iterator<Item = Chunk> + '_ {
        self.indices().map(|i| Chunk::at(i, self.chunk_size))
    }
}

/// Active window for a displacement along the travel axis.
///
/// Returns `None` for non-finite displacement, unusable sizing, a window wider
/// than `MAX_WINDOW_CHUNKS`, or a displacement whose chunk index is beyond
/// exact integer range. Callers keep their previous window in that case.
pub fn compute_active_chunks(displacement: f32, params: ChunkParams) -> Option<ChunkWindow> {
    let ChunkParams { chunk_size, ahead_distance, behind_margin } = params;
    if !displacement.is_finite() || !chunk_size.is_finite() || chunk_size <= 0.0 {
        return None;
    }
    if !ahead_distance.is_finite() {
        return None;
    }

    let ahead_count = ahead_chunk_count(ahead_distance, chunk_size, behind_margin)?;
    let current = (f64::from(displacement) / f64::from(chunk_size)).floor();
    if current.abs() > MAX_CHUNK_INDEX {
        return None;
    }
    let current = current as i64;

    Some(ChunkWindow {
        first: current - i64::from(behind_margin),
        last: current + ahead_count as i64,
        current,
        chunk_size,
    })
}

/// Chunks that entered and left the window on the last recompute.
#[derive(Debug, Default, Clone)]
pub struct ChunkDelta {
    pub activated: Vec<Chunk>,
    pub deactivated: Vec<Chunk>,
}

impl ChunkDelta {
    fn clear(&mut self) {
        self.activated.clear();
        self.deactivated.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.activated.is_empty() && self.deactivated.is_empty()
    }
}

/// Last valid window plus the throttle bookkeeping.
#[derive(Resource, Debug, Default)]
pub struct ChunkStreamer {
    window: Option<ChunkWindow>,
    last_displacement: Option<f32>,
    delta: ChunkDelta,
}

impl ChunkStreamer {
    pub fn window(&self) -> Option<&ChunkWindow> {
        self.window.as_ref()
    }

    /// Delta produced by the most recent successful `recompute`.
    pub fn delta(&self) -> &ChunkDelta {
        &self.delta
    }

    /// Whether a rebuild is due: first call, or moved at least `threshold`.
    pub fn needs_recompute(&self, displacement: f32, threshold: f32) -> bool {
        if !displacement.is_finite() {
            return false;
        }
        match self.last_displacement {
            None => true,
            Some(last) => (displacement - last).abs() >= threshold,
        }
    }

    /// Rebuild the window and fill `delta`. Returns `false` (and keeps the old
    /// window) when the displacement cannot be windowed.
    pub fn recompute(&mut self, displacement: f32, params: ChunkParams) -> bool {
        let Some(next) = compute_active_chunks(displacement, params) else {
            debug!("Rejected chunk recompute for displacement {displacement}; keeping previous window");
            return false;
        };

        self.delta.clear();
        match self.window {
            Some(prev) => {
                self.delta
                    .deactivated
                    .extend(prev.chunks().filter(|c| !next.contains(c.index)));
                self.delta
                    .activated
                    .extend(next.chunks().filter(|c| !prev.contains(c.index)));
            }
            None => self.delta.activated.extend(next.chunks()),
        }

        self.window = Some(next);
        self.last_displacement = Some(displacement);
        true
    }
}

#[derive(Message, Clone, Copy, Debug)]
pub struct ChunkActivated(pub Chunk);

#[derive(Message, Clone, Copy, Debug)]
pub struct ChunkDeactivated(pub Chunk);

pub fn plugin(app: &mut App) {
    app.init_resource::<ChunkStreamer>()
        .add_message::<ChunkActivated>()
        .add_message::<ChunkDeactivated>()
        .add_systems(OnEnter(GameState::InGame), reset_streamer)
        .add_systems(FixedUpdate, stream_chunks.in_set(SimSet::Chunks));
}

fn reset_streamer(mut streamer: ResMut<ChunkStreamer>) {
    *streamer = ChunkStreamer::default();
}

fn stream_chunks(
    tunables: Res<Tunables>,
    motion: Res<PlayerMotion>,
    mut streamer: ResMut<ChunkStreamer>,
    mut activated: MessageWriter<ChunkActivated>,
    mut deactivated: MessageWriter<ChunkDeactivated>,
) {
    let displacement = motion.displacement();
    if !streamer.needs_recompute(displacement, tunables.chunk_recompute_threshold) {
        return;
    }
    if !streamer.recompute(displacement, ChunkParams::from_tunables(&tunables)) {
        return;
    }

    let delta = streamer.delta();
    if !delta.is_empty() {
        trace!(
            "Chunk window moved: +{} -{}",
            delta.activated.len(),
            delta.deactivated.len()
        );
    }
    for chunk in &delta.deactivated {
        deactivated.write(ChunkDeactivated(*chunk));
    }
    for chunk in &delta.activated {
        activated.write(ChunkActivated(*chunk));
    }
}

#[cfg(test)]
mod tests;
