pub mod clock;
pub mod player_traits;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use player_traits::{EngineFactory, MediaEngine, PlaybackCallback, PlaybackState};
pub use scheduler::{Scheduler, Task};
