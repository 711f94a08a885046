// Timing and sizing defaults shared by the overlay, session and config.
// All durations are in milliseconds unless the name says otherwise.

// === Control overlay ===
/// How long the overlay stays visible after being shown while playing.
pub const DEFAULT_SHOW_TIMEOUT_MS: u64 = 3000;
/// Resolution of the seek control.
pub const DEFAULT_SEEK_BAR_MAX: u32 = 1000;
/// Poll interval used whenever playback is not actively playing-and-ready.
pub const IDLE_POLL_INTERVAL_MS: u64 = 1000;

// === Sync period ===
// Polls are aligned to the next whole second of media time. If that
// boundary is closer than the minimum, skip to the one after it.
pub const SYNC_PERIOD_MS: u64 = 1000;
pub const MIN_SYNC_DELAY_MS: u64 = 200;

// === Playback ===
pub const DEFAULT_USER_AGENT: &str = "slotplay";
pub const DEFAULT_INITIAL_BITRATE_ESTIMATE: u64 = 1_000_000;

// === Simulated engine ===
/// How far the simulated buffer runs ahead of the playhead.
pub const SIMULATED_BUFFER_AHEAD_MS: u64 = 15_000;
