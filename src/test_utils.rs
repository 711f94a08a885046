#![cfg(test)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::core::{ManualClock, PlaybackCallback};
use crate::manager::PlayerManager;
use crate::player::{MemoryResumeStore, SimulatedFactory};
use crate::surface::{MemoryLayout, SurfaceId};
use crate::utils::PlayerError;
use crate::workers::ResumeWorker;

/// Length of every stream the fixture factory produces
pub const FIXTURE_DURATION: Duration = Duration::from_secs(100);

/// Events seen by a [`RecordingCallback`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackEvent {
    Play(SurfaceId),
    Pause(SurfaceId),
    Fullscreen(bool, SurfaceId),
    Error(String),
}

/// Callback that remembers every event, cloneable so the test keeps a
/// handle after boxing one into the manager
#[derive(Debug, Clone, Default)]
pub struct RecordingCallback {
    events: Rc<RefCell<Vec<CallbackEvent>>>,
}

impl RecordingCallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CallbackEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl PlaybackCallback for RecordingCallback {
    fn on_play(&mut self, surface: SurfaceId) {
        self.events.borrow_mut().push(CallbackEvent::Play(surface));
    }

    fn on_pause(&mut self, surface: SurfaceId) {
        self.events.borrow_mut().push(CallbackEvent::Pause(surface));
    }

    fn on_fullscreen_change(&mut self, is_fullscreen: bool, surface: SurfaceId) {
        self.events
            .borrow_mut()
            .push(CallbackEvent::Fullscreen(is_fullscreen, surface));
    }

    fn on_error(&mut self, error: &PlayerError) {
        self.events
            .borrow_mut()
            .push(CallbackEvent::Error(error.to_string()));
    }
}

/// Manager over an in-memory layout and simulated engines, without resume
/// persistence
pub fn manager_fixture() -> (PlayerManager<MemoryLayout>, Rc<ManualClock>, SimulatedFactory) {
    let clock = Rc::new(ManualClock::new());
    let factory = SimulatedFactory::new(clock.clone(), FIXTURE_DURATION);
    let manager = PlayerManager::new(
        Config::default(),
        Box::new(factory.clone()),
        MemoryLayout::new(),
        clock.clone(),
        None,
    );
    (manager, clock, factory)
}

/// Same as [`manager_fixture`] with an in-memory resume store behind a worker
pub fn manager_with_resume() -> (
    PlayerManager<MemoryLayout>,
    Rc<ManualClock>,
    SimulatedFactory,
    Arc<MemoryResumeStore>,
) {
    let clock = Rc::new(ManualClock::new());
    let factory = SimulatedFactory::new(clock.clone(), FIXTURE_DURATION);
    let store = Arc::new(MemoryResumeStore::new());
    let manager = PlayerManager::new(
        Config::default(),
        Box::new(factory.clone()),
        MemoryLayout::new(),
        clock.clone(),
        Some(ResumeWorker::new(store.clone())),
    );
    (manager, clock, factory, store)
}
