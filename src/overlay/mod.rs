use std::time::Duration;
use tracing::{debug, trace};

use crate::config::OverlayConfig;
use crate::core::{MediaEngine, Scheduler, Task};
use crate::surface::SurfaceId;

mod controls_visibility;
pub mod seek_bar;
pub mod time_sampler;

pub use controls_visibility::ControlState;
pub use seek_bar::SeekBar;
pub use time_sampler::{SampledTime, TimeSampler, format_duration, next_poll_delay, sync_period};

/// Which glyph the play/pause button shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayPauseIcon {
    Play,
    Pause,
}

impl PlayPauseIcon {
    pub fn for_play_when_ready(play_when_ready: bool) -> Self {
        if play_when_ready {
            PlayPauseIcon::Pause
        } else {
            PlayPauseIcon::Play
        }
    }
}

/// Everything an overlay transition may touch besides itself.
pub struct OverlayContext<'a> {
    pub engine: Option<&'a mut (dyn MediaEngine + 'static)>,
    pub scheduler: &'a mut Scheduler,
    pub now: Duration,
}

/// Transport controls bound to one surface: seek bar, labels, play/pause
/// and the auto-hide timer.
#[derive(Debug)]
pub struct ControlOverlay {
    surface: SurfaceId,
    state: ControlState,
    hide_deadline: Option<Duration>,
    attached: bool,
    seek_bar: SeekBar,
    sampler: TimeSampler,
    play_icon: PlayPauseIcon,
    show_timeout: Duration,
    idle_poll_interval: Duration,
}

impl ControlOverlay {
    pub fn new(surface: SurfaceId, config: &OverlayConfig) -> Self {
        Self {
            surface,
            state: ControlState::Hidden,
            hide_deadline: None,
            attached: false,
            seek_bar: SeekBar::new(config.seek_bar_max),
            sampler: TimeSampler::new(),
            play_icon: PlayPauseIcon::Play,
            show_timeout: config.show_timeout(),
            idle_poll_interval: config.idle_poll_interval(),
        }
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn hide_deadline(&self) -> Option<Duration> {
        self.hide_deadline
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_dragging(&self) -> bool {
        self.seek_bar.is_dragging()
    }

    pub fn seek_bar(&self) -> &SeekBar {
        &self.seek_bar
    }

    pub fn seek_bar_mut(&mut self) -> &mut SeekBar {
        &mut self.seek_bar
    }

    pub fn play_icon(&self) -> PlayPauseIcon {
        self.play_icon
    }

    pub fn last_sample(&self) -> SampledTime {
        self.sampler.last()
    }

    /// Poll the engine, refresh the display and schedule the next poll.
    /// Without an engine this does nothing at all.
    pub fn update_progress(&mut self, ctx: &mut OverlayContext<'_>) {
        let Some(engine) = ctx.engine.as_deref() else {
            return;
        };

        let sample = self.sampler.sample(engine);
        self.seek_bar.update(&sample);
        self.play_icon = PlayPauseIcon::for_play_when_ready(engine.play_when_ready());

        let task = Task::UpdateProgress(self.surface);
        ctx.scheduler.remove(task);

        // Detached or hidden overlays stop polling; attach/show restarts it.
        if !self.attached || !self.state.is_visible() {
            return;
        }

        if let Some(delay) = next_poll_delay(
            engine.playback_state(),
            engine.play_when_ready(),
            sample.position,
            self.idle_poll_interval,
        ) {
            trace!("Next progress poll for {} in {:?}", self.surface, delay);
            ctx.scheduler.post_delayed(task, ctx.now, delay);
        }
    }

    pub fn stop_update_progress(&mut self, scheduler: &mut Scheduler) {
        scheduler.remove(Task::UpdateProgress(self.surface));
    }

    /// Flip play-when-ready. Returns the new value, or `None` without an engine.
    pub fn toggle_play_pause(&mut self, ctx: &mut OverlayContext<'_>) -> Option<bool> {
        let engine = ctx.engine.as_deref_mut()?;
        let play_when_ready = !engine.play_when_ready();
        engine.set_play_when_ready(play_when_ready);
        self.play_icon = PlayPauseIcon::for_play_when_ready(play_when_ready);
        debug!(
            "{} toggled to {}",
            self.surface,
            if play_when_ready { "play" } else { "pause" }
        );
        self.update_progress(ctx);
        self.hide_after_timeout(ctx);
        Some(play_when_ready)
    }

    pub fn start_drag(&mut self, ctx: &mut OverlayContext<'_>) {
        self.seek_bar.start_drag();
        self.cancel_hide_timer(ctx.scheduler);
        self.hide_deadline = None;
    }

    pub fn drag_to(&mut self, progress: u32) {
        if self.seek_bar.is_dragging() {
            let sample = self.sampler.last();
            self.seek_bar.drag_to(progress, &sample);
        }
    }

    /// Finish a drag: seek to the chosen point, resume a paused stream and
    /// re-arm auto-hide. Returns the seek target.
    pub fn stop_drag(&mut self, ctx: &mut OverlayContext<'_>) -> Option<Duration> {
        if !self.seek_bar.is_dragging() {
            return None;
        }
        let progress = self.seek_bar.stop_drag();
        let target = self.sampler.last().position_at(progress, self.seek_bar.max());

        if let Some(engine) = ctx.engine.as_deref_mut() {
            engine.seek_to(target);
            // Seeking while paused resumes playback.
            if !engine.play_when_ready() {
                engine.set_play_when_ready(true);
                self.play_icon = PlayPauseIcon::Pause;
            }
        }
        debug!("{} seek to {:?} after drag", self.surface, target);
        self.update_progress(ctx);
        self.hide_after_timeout(ctx);
        Some(target)
    }

    /// Drop every pending callback. Used when the surface unbinds.
    pub fn teardown(&mut self, scheduler: &mut Scheduler) {
        scheduler.remove_surface(self.surface);
        self.hide_deadline = None;
        self.state = ControlState::Hidden;
        self.seek_bar.reset();
        self.sampler.reset();
    }
}
