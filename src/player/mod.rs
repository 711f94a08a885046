pub mod media_source;
pub mod resume;
pub mod session;
pub mod simulated;
pub mod types;

pub use media_source::{ContentType, MediaSource};
pub use resume::{FileResumeStore, MemoryResumeStore, ResumeStore};
pub use session::PlaybackSession;
pub use simulated::{SimulatedEngine, SimulatedFactory, SimulatedHandle};
pub use types::{BandwidthConfig, ContentRequest, ResumePoint, TrackSelection};
