// Single-engine playback across detachable view surfaces, with an
// auto-hiding transport overlay.

pub mod config;
pub mod constants;
pub mod core;
pub mod manager;
pub mod overlay;
pub mod player;
pub mod surface;
pub mod utils;
pub mod workers;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use core::{
    Clock, EngineFactory, ManualClock, MediaEngine, PlaybackCallback, PlaybackState, Scheduler,
    SystemClock, Task,
};
pub use manager::{PlayOutcome, PlayerManager};
pub use overlay::{ControlOverlay, ControlState, PlayPauseIcon, SampledTime, SeekBar};
pub use player::{
    ContentRequest, ContentType, FileResumeStore, MediaSource, MemoryResumeStore,
    PlaybackSession, ResumePoint, ResumeStore, SimulatedEngine, SimulatedFactory,
    SimulatedHandle,
};
pub use surface::{
    AbortReason, HandoffOutcome, HostDetachOutcome, HostId, HostLayout, MemoryLayout, SurfaceId,
};
pub use utils::PlayerError;
pub use workers::ResumeWorker;
