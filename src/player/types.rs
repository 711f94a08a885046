/// Common types shared by the session, the manager and engine implementations
use std::time::Duration;

use crate::config::PlaybackConfig;
use crate::surface::HostId;

/// A request to play `content_id` inside `host`. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub content_id: String,
    pub host: HostId,
    /// Child index in the host; `None` appends.
    pub insertion_index: Option<usize>,
}

impl ContentRequest {
    pub fn new(host: HostId, content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            host,
            insertion_index: None,
        }
    }

    pub fn at_index(mut self, index: usize) -> Self {
        self.insertion_index = Some(index);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSelection {
    pub adaptive: bool,
    pub max_video_bitrate: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandwidthConfig {
    pub initial_bitrate_estimate: u64,
    pub user_agent: String,
}

impl TrackSelection {
    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self {
            adaptive: config.prefer_adaptive,
            max_video_bitrate: config.max_video_bitrate,
        }
    }
}

impl BandwidthConfig {
    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self {
            initial_bitrate_estimate: config.initial_bitrate_estimate,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Last known position of a content id, handed to the resume worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePoint {
    pub content_id: String,
    pub position: Duration,
}
