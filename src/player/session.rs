use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::PlaybackConfig;
use crate::core::{EngineFactory, MediaEngine, PlaybackState};
use crate::player::{BandwidthConfig, MediaSource, ResumePoint, ResumeStore, TrackSelection};
use crate::surface::SurfaceId;
use crate::utils::PlayerError;

/// Owns the one live engine and remembers which content it plays.
pub struct PlaybackSession {
    factory: Box<dyn EngineFactory>,
    engine: Option<Box<dyn MediaEngine>>,
    current_content: Option<String>,
    resume_store: Option<Arc<dyn ResumeStore>>,
    config: PlaybackConfig,
}

impl PlaybackSession {
    pub fn new(
        factory: Box<dyn EngineFactory>,
        config: PlaybackConfig,
        resume_store: Option<Arc<dyn ResumeStore>>,
    ) -> Self {
        Self {
            factory,
            engine: None,
            current_content: None,
            resume_store,
            config,
        }
    }

    pub fn current_content(&self) -> Option<&str> {
        self.current_content.as_deref()
    }

    pub fn is_current(&self, content_id: &str) -> bool {
        self.current_content.as_deref() == Some(content_id)
    }

    pub fn engine_mut(&mut self) -> Option<&mut (dyn MediaEngine + 'static)> {
        self.engine.as_deref_mut()
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    /// Playing means the user would see motion once data arrives.
    pub fn is_playing(&self) -> bool {
        self.engine
            .as_deref()
            .is_some_and(|e| e.play_when_ready() && e.playback_state().is_active())
    }

    /// Start `content_id` on a fresh engine rendering into `target`.
    ///
    /// Any previous engine is released first; its resume point is
    /// returned alongside the outcome so the caller can persist it. On
    /// failure the session is left idle, ready for another `start`.
    pub fn start(
        &mut self,
        content_id: &str,
        source: &MediaSource,
        target: SurfaceId,
    ) -> (Result<(), PlayerError>, Option<ResumePoint>) {
        let previous = self.release();

        let tracks = TrackSelection::from_config(&self.config);
        let bandwidth = BandwidthConfig::from_config(&self.config);
        let mut engine = match self.factory.create(&tracks, &bandwidth) {
            Ok(engine) => engine,
            Err(e) => {
                warn!("Failed to create engine for {}: {}", content_id, e);
                return (Err(e), previous);
            }
        };

        engine.set_render_target(Some(target));
        if let Err(e) = engine.prepare(source) {
            warn!("Failed to prepare {}: {}", content_id, e);
            engine.release();
            return (Err(e), previous);
        }
        engine.set_play_when_ready(self.config.play_when_ready);

        if let Some(offset) = self.resume_offset(content_id) {
            debug!("Resuming {} at {:?}", content_id, offset);
            engine.seek_to(offset);
        }

        info!(
            "Playing {} ({}) on {}",
            content_id, source.content_type, target
        );
        self.engine = Some(engine);
        self.current_content = Some(content_id.to_string());
        (Ok(()), previous)
    }

    fn resume_offset(&self, content_id: &str) -> Option<Duration> {
        self.resume_store
            .as_ref()?
            .get(content_id)
            .filter(|offset| !offset.is_zero())
    }

    /// Stop and drop the engine. Returns the point to resume from next
    /// time: the last position, or zero once the stream has ended.
    pub fn release(&mut self) -> Option<ResumePoint> {
        let content_id = self.current_content.take();
        let mut engine = self.engine.take()?;

        let position = match engine.playback_state() {
            PlaybackState::Ended => Duration::ZERO,
            _ => engine.position(),
        };
        engine.release();
        info!("Released engine for {:?}", content_id);

        content_id.map(|content_id| ResumePoint {
            content_id,
            position,
        })
    }

    pub fn seek_to(&mut self, position: Duration) {
        if let Some(engine) = self.engine.as_deref_mut() {
            engine.seek_to(position);
        }
    }
}
