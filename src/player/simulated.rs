use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, trace};

use crate::constants::SIMULATED_BUFFER_AHEAD_MS;
use crate::core::{Clock, EngineFactory, MediaEngine, PlaybackState};
use crate::player::{BandwidthConfig, MediaSource, TrackSelection};
use crate::surface::SurfaceId;
use crate::utils::PlayerError;

#[derive(Debug)]
struct SimState {
    state: PlaybackState,
    play_when_ready: bool,
    // Position is anchor_position plus clock time since anchor_time while
    // ready and playing.
    anchor_position: Duration,
    anchor_time: Duration,
    duration: Duration,
    buffer_ahead: Duration,
    render_target: Option<SurfaceId>,
    released: bool,
    fail_prepare: Option<String>,
    seeks: Vec<Duration>,
}

/// Engine that plays nothing but keeps time like a real one. Position
/// advances with the supplied clock while ready and playing.
pub struct SimulatedEngine {
    clock: Rc<dyn Clock>,
    state: Rc<RefCell<SimState>>,
}

/// Shared view into a [`SimulatedEngine`] for hosts and tests.
#[derive(Clone)]
pub struct SimulatedHandle {
    clock: Rc<dyn Clock>,
    state: Rc<RefCell<SimState>>,
}

impl SimulatedEngine {
    pub fn new(clock: Rc<dyn Clock>, duration: Duration) -> Self {
        let state = SimState {
            state: PlaybackState::Idle,
            play_when_ready: false,
            anchor_position: Duration::ZERO,
            anchor_time: clock.now(),
            duration,
            buffer_ahead: Duration::from_millis(SIMULATED_BUFFER_AHEAD_MS),
            render_target: None,
            released: false,
            fail_prepare: None,
            seeks: Vec::new(),
        };
        Self {
            clock,
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn handle(&self) -> SimulatedHandle {
        SimulatedHandle {
            clock: self.clock.clone(),
            state: self.state.clone(),
        }
    }
}

fn current_position(state: &SimState, now: Duration) -> Duration {
    let mut position = state.anchor_position;
    if state.state == PlaybackState::Ready && state.play_when_ready {
        position += now.saturating_sub(state.anchor_time);
    }
    if !state.duration.is_zero() {
        position = position.min(state.duration);
    }
    position
}

fn rebase(state: &mut SimState, now: Duration) {
    state.anchor_position = current_position(state, now);
    state.anchor_time = now;
}

fn effective_state(state: &SimState, now: Duration) -> PlaybackState {
    if state.state == PlaybackState::Ready
        && !state.duration.is_zero()
        && current_position(state, now) >= state.duration
    {
        PlaybackState::Ended
    } else {
        state.state
    }
}

impl MediaEngine for SimulatedEngine {
    fn prepare(&mut self, source: &MediaSource) -> Result<(), PlayerError> {
        let now = self.clock.now();
        let mut state = self.state.borrow_mut();
        if let Some(message) = state.fail_prepare.take() {
            state.state = PlaybackState::Idle;
            return Err(PlayerError::Engine(message));
        }
        debug!("Simulated engine preparing {} ({})", source.uri, source.content_type);
        state.state = PlaybackState::Ready;
        state.anchor_position = Duration::ZERO;
        state.anchor_time = now;
        Ok(())
    }

    fn set_play_when_ready(&mut self, play_when_ready: bool) {
        let now = self.clock.now();
        let mut state = self.state.borrow_mut();
        rebase(&mut state, now);
        state.play_when_ready = play_when_ready;
    }

    fn play_when_ready(&self) -> bool {
        self.state.borrow().play_when_ready
    }

    fn seek_to(&mut self, position: Duration) {
        let now = self.clock.now();
        let mut state = self.state.borrow_mut();
        let position = if state.duration.is_zero() {
            position
        } else {
            position.min(state.duration)
        };
        trace!("Simulated engine seeking to {:?}", position);
        state.anchor_position = position;
        state.anchor_time = now;
        state.seeks.push(position);
    }

    fn playback_state(&self) -> PlaybackState {
        effective_state(&self.state.borrow(), self.clock.now())
    }

    fn position(&self) -> Duration {
        current_position(&self.state.borrow(), self.clock.now())
    }

    fn duration(&self) -> Duration {
        self.state.borrow().duration
    }

    fn buffered_position(&self) -> Duration {
        let state = self.state.borrow();
        let buffered = current_position(&state, self.clock.now()) + state.buffer_ahead;
        if state.duration.is_zero() {
            buffered
        } else {
            buffered.min(state.duration)
        }
    }

    fn set_render_target(&mut self, target: Option<SurfaceId>) {
        self.state.borrow_mut().render_target = target;
    }

    fn render_target(&self) -> Option<SurfaceId> {
        self.state.borrow().render_target
    }

    fn release(&mut self) {
        let mut state = self.state.borrow_mut();
        state.released = true;
        state.state = PlaybackState::Idle;
        state.render_target = None;
        state.play_when_ready = false;
    }
}

impl SimulatedHandle {
    pub fn playback_state(&self) -> PlaybackState {
        effective_state(&self.state.borrow(), self.clock.now())
    }

    pub fn set_playback_state(&self, playback_state: PlaybackState) {
        let now = self.clock.now();
        let mut state = self.state.borrow_mut();
        rebase(&mut state, now);
        state.state = playback_state;
    }

    pub fn position(&self) -> Duration {
        current_position(&self.state.borrow(), self.clock.now())
    }

    pub fn set_position(&self, position: Duration) {
        let mut state = self.state.borrow_mut();
        state.anchor_position = position;
        state.anchor_time = self.clock.now();
    }

    pub fn set_duration(&self, duration: Duration) {
        self.state.borrow_mut().duration = duration;
    }

    pub fn play_when_ready(&self) -> bool {
        self.state.borrow().play_when_ready
    }

    pub fn render_target(&self) -> Option<SurfaceId> {
        self.state.borrow().render_target
    }

    pub fn is_released(&self) -> bool {
        self.state.borrow().released
    }

    pub fn seeks(&self) -> Vec<Duration> {
        self.state.borrow().seeks.clone()
    }

    pub fn fail_next_prepare(&self, message: impl Into<String>) {
        self.state.borrow_mut().fail_prepare = Some(message.into());
    }
}

struct FactoryInner {
    clock: Rc<dyn Clock>,
    duration: RefCell<Duration>,
    created: RefCell<Vec<SimulatedHandle>>,
    configs: RefCell<Vec<(TrackSelection, BandwidthConfig)>>,
    fail_create: RefCell<Option<String>>,
    fail_prepare: RefCell<Option<String>>,
}

/// Builds [`SimulatedEngine`]s and remembers every one it built.
#[derive(Clone)]
pub struct SimulatedFactory {
    inner: Rc<FactoryInner>,
}

impl SimulatedFactory {
    pub fn new(clock: Rc<dyn Clock>, duration: Duration) -> Self {
        Self {
            inner: Rc::new(FactoryInner {
                clock,
                duration: RefCell::new(duration),
                created: RefCell::new(Vec::new()),
                configs: RefCell::new(Vec::new()),
                fail_create: RefCell::new(None),
                fail_prepare: RefCell::new(None),
            }),
        }
    }

    /// Duration given to engines created from now on.
    pub fn set_duration(&self, duration: Duration) {
        *self.inner.duration.borrow_mut() = duration;
    }

    pub fn created(&self) -> Vec<SimulatedHandle> {
        self.inner.created.borrow().clone()
    }

    pub fn last(&self) -> Option<SimulatedHandle> {
        self.inner.created.borrow().last().cloned()
    }

    pub fn configs(&self) -> Vec<(TrackSelection, BandwidthConfig)> {
        self.inner.configs.borrow().clone()
    }

    pub fn fail_next_create(&self, message: impl Into<String>) {
        *self.inner.fail_create.borrow_mut() = Some(message.into());
    }

    pub fn fail_next_prepare(&self, message: impl Into<String>) {
        *self.inner.fail_prepare.borrow_mut() = Some(message.into());
    }
}

impl EngineFactory for SimulatedFactory {
    fn create(
        &self,
        tracks: &TrackSelection,
        bandwidth: &BandwidthConfig,
    ) -> Result<Box<dyn MediaEngine>, PlayerError> {
        if let Some(message) = self.inner.fail_create.borrow_mut().take() {
            return Err(PlayerError::Engine(message));
        }
        self.inner
            .configs
            .borrow_mut()
            .push((tracks.clone(), bandwidth.clone()));

        let engine = SimulatedEngine::new(self.inner.clock.clone(), *self.inner.duration.borrow());
        let handle = engine.handle();
        if let Some(message) = self.inner.fail_prepare.borrow_mut().take() {
            handle.fail_next_prepare(message);
        }
        self.inner.created.borrow_mut().push(handle);
        Ok(Box::new(engine))
    }
}
