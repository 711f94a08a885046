use std::time::Duration;

use crate::constants::{MIN_SYNC_DELAY_MS, SYNC_PERIOD_MS};
use crate::core::{MediaEngine, PlaybackState};

/// One reading of the engine clock. A zero duration means "unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampledTime {
    pub position: Duration,
    pub duration: Duration,
    pub buffered_position: Duration,
}

impl SampledTime {
    /// Seek value for the playhead, or `None` while the duration is unknown.
    pub fn progress(&self, max: u32) -> Option<u32> {
        scale(self.position, self.duration, max)
    }

    /// Seek value for the buffered extent.
    pub fn secondary_progress(&self, max: u32) -> Option<u32> {
        scale(self.buffered_position, self.duration, max)
    }

    /// Media position a seek value stands for.
    pub fn position_at(&self, progress: u32, max: u32) -> Duration {
        if max == 0 {
            return Duration::ZERO;
        }
        let millis = self.duration.as_millis() * u128::from(progress.min(max)) / u128::from(max);
        Duration::from_millis(millis as u64)
    }
}

// round(max * value / duration), clamped to max.
fn scale(value: Duration, duration: Duration, max: u32) -> Option<u32> {
    let duration = duration.as_millis();
    if duration == 0 {
        return None;
    }
    let scaled = (u128::from(max) * value.as_millis() + duration / 2) / duration;
    Some(scaled.min(u128::from(max)) as u32)
}

/// Reads the engine and keeps the last sample around for drag previews.
#[derive(Debug, Default)]
pub struct TimeSampler {
    last: SampledTime,
}

impl TimeSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&mut self, engine: &dyn MediaEngine) -> SampledTime {
        self.last = SampledTime {
            position: engine.position(),
            duration: engine.duration(),
            buffered_position: engine.buffered_position(),
        };
        self.last
    }

    pub fn last(&self) -> SampledTime {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = SampledTime::default();
    }
}

/// Delay until the displayed clock next changes: the rest of the current
/// second of media time, pushed one full second out if that is too short.
pub fn sync_period(position: Duration) -> Duration {
    let into_second = position.as_millis() as u64 % SYNC_PERIOD_MS;
    let mut delay = SYNC_PERIOD_MS - into_second;
    if delay < MIN_SYNC_DELAY_MS {
        delay += SYNC_PERIOD_MS;
    }
    Duration::from_millis(delay)
}

/// When to poll again, or `None` once the stream is idle or ended.
pub fn next_poll_delay(
    state: PlaybackState,
    play_when_ready: bool,
    position: Duration,
    idle_interval: Duration,
) -> Option<Duration> {
    match state {
        PlaybackState::Idle | PlaybackState::Ended => None,
        PlaybackState::Ready if play_when_ready => Some(sync_period(position)),
        _ => Some(idle_interval),
    }
}

pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
