//! Shared harness for the integration tests
//!
//! Drives a `PlayerManager` over an in-memory layout with simulated engines
//! and a manual clock.

#![allow(dead_code)]

use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use slotplay::{
    Clock, Config, ContentRequest, HostId, ManualClock, MemoryLayout, PlayOutcome, PlayerManager,
    ResumeStore, ResumeWorker, SimulatedFactory, SurfaceId,
};

pub const CONTENT: &str = "https://media.example.com/show/episode.m3u8";
pub const OTHER_CONTENT: &str = "https://media.example.com/movie.mpd";
pub const DURATION: Duration = Duration::from_secs(100);

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

pub struct Harness {
    pub manager: PlayerManager<MemoryLayout>,
    pub clock: Rc<ManualClock>,
    pub factory: SimulatedFactory,
    pub inline: HostId,
    pub fullscreen: HostId,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(Config::default(), None)
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(config, None)
    }

    pub fn with_resume_store(store: Arc<dyn ResumeStore>) -> Self {
        Self::build(Config::default(), Some(ResumeWorker::new(store)))
    }

    pub fn build(config: Config, worker: Option<ResumeWorker>) -> Self {
        let clock = Rc::new(ManualClock::new());
        let factory = SimulatedFactory::new(clock.clone(), DURATION);
        let mut manager = PlayerManager::new(
            config,
            Box::new(factory.clone()),
            MemoryLayout::new(),
            clock.clone(),
            worker,
        );
        let inline = manager.layout_mut().add_host();
        let fullscreen = manager.layout_mut().add_host();
        Self {
            manager,
            clock,
            factory,
            inline,
            fullscreen,
        }
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Start `content_id` inline and attach its surface.
    pub fn start_inline(&mut self, content_id: &str) -> SurfaceId {
        match self
            .manager
            .play(ContentRequest::new(self.inline, content_id))
            .expect("inline play failed")
        {
            PlayOutcome::Started { surface } => {
                self.manager.surface_attached(surface);
                surface
            }
            other => panic!("expected a fresh start, got {:?}", other),
        }
    }

    /// Request the fullscreen hand-off; returns the shadow surface.
    pub fn request_fullscreen(&mut self, content_id: &str) -> SurfaceId {
        match self
            .manager
            .play(ContentRequest::new(self.fullscreen, content_id))
            .expect("fullscreen play failed")
        {
            PlayOutcome::HandoffPending { shadow } => shadow,
            other => panic!("expected a hand-off, got {:?}", other),
        }
    }

    /// Advance the clock to `at`, running due tasks in small steps.
    pub fn advance_to(&mut self, at: Duration) {
        while let Some(due) = self.manager.next_wakeup() {
            if due > at {
                break;
            }
            if due > self.clock.now() {
                self.clock.set(due);
            }
            self.manager.run_pending();
        }
        if at > self.clock.now() {
            self.clock.set(at);
        }
        self.manager.run_pending();
    }

    pub fn advance(&mut self, by: Duration) {
        let at = self.clock.now() + by;
        self.advance_to(at);
    }
}
