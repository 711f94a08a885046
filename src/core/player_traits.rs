// Platform-agnostic media engine capability.
// Decoding, rendering and network buffering live behind these traits;
// everything in this crate talks to an engine only through them.

use std::time::Duration;

use crate::player::{BandwidthConfig, MediaSource, TrackSelection};
use crate::surface::SurfaceId;
use crate::utils::PlayerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Buffering,
    Ready,
    Ended,
}

impl PlaybackState {
    /// Idle and Ended streams are not polled.
    pub fn is_active(&self) -> bool {
        matches!(self, PlaybackState::Buffering | PlaybackState::Ready)
    }
}

// Engines are driven from the UI thread only, hence no Send bound.
pub trait MediaEngine {
    fn prepare(&mut self, source: &MediaSource) -> Result<(), PlayerError>;
    fn set_play_when_ready(&mut self, play_when_ready: bool);
    fn play_when_ready(&self) -> bool;
    fn seek_to(&mut self, position: Duration);
    fn playback_state(&self) -> PlaybackState;
    fn position(&self) -> Duration;
    /// `Duration::ZERO` while unknown.
    fn duration(&self) -> Duration;
    fn buffered_position(&self) -> Duration;
    /// Route video output to `target`, or nowhere. Setting a new target
    /// implicitly detaches the previous one.
    fn set_render_target(&mut self, target: Option<SurfaceId>);
    fn render_target(&self) -> Option<SurfaceId>;
    fn release(&mut self);
}

pub trait EngineFactory {
    fn create(
        &self,
        tracks: &TrackSelection,
        bandwidth: &BandwidthConfig,
    ) -> Result<Box<dyn MediaEngine>, PlayerError>;
}

/// Optional host-side observer. Only user-initiated transitions are
/// reported; programmatic ones never reach it.
pub trait PlaybackCallback {
    fn on_play(&mut self, surface: SurfaceId);
    fn on_pause(&mut self, surface: SurfaceId);
    fn on_fullscreen_change(&mut self, is_fullscreen: bool, surface: SurfaceId);
    /// Transient engine failures (load, network). The session is left idle.
    fn on_error(&mut self, _error: &PlayerError) {}
}
