use std::time::Duration;
use tracing::{debug, trace};

use super::{ControlOverlay, OverlayContext};
use crate::core::{Scheduler, Task};

/// Control visibility state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    /// Controls are hidden, nothing is pending
    Hidden,
    /// Controls are visible but will not hide on their own (paused,
    /// dragging, detached or auto-hide disabled)
    VisibleNoTimer,
    /// Controls are visible and the hide timer is pending
    VisibleTimerArmed,
}

impl ControlState {
    pub fn is_visible(&self) -> bool {
        !matches!(self, ControlState::Hidden)
    }
}

/// Control visibility state machine implementation
impl ControlOverlay {
    pub fn is_visible(&self) -> bool {
        self.state.is_visible()
    }

    pub fn show(&mut self, ctx: &mut OverlayContext<'_>) {
        self.set_visibility(true, ctx);
    }

    /// Hide now, from a manual request or the timer. Cancels the timer,
    /// clears the deadline and stops polling.
    pub fn hide(&mut self, ctx: &mut OverlayContext<'_>) {
        self.set_visibility(false, ctx);
    }

    /// Showing always refreshes progress and restarts the countdown, even
    /// when already visible.
    pub fn set_visibility(&mut self, visible: bool, ctx: &mut OverlayContext<'_>) {
        if visible {
            if self.state == ControlState::Hidden {
                debug!("Showing controls on {}", self.surface);
                self.state = ControlState::VisibleNoTimer;
            }
            self.update_progress(ctx);
            self.hide_after_timeout(ctx);
        } else {
            if self.state.is_visible() {
                debug!("Hiding controls on {}", self.surface);
            }
            self.cancel_hide_timer(ctx.scheduler);
            self.hide_deadline = None;
            self.stop_update_progress(ctx.scheduler);
            self.state = ControlState::Hidden;
        }
    }

    /// Returns true if the controls ended up visible.
    pub fn switch_visibility(&mut self, ctx: &mut OverlayContext<'_>) -> bool {
        let visible = !self.is_visible();
        self.set_visibility(visible, ctx);
        self.is_visible()
    }

    /// Apply the hide-timer policy: never while paused or dragging,
    /// otherwise `show_timeout` from now. A detached overlay only records
    /// the deadline; the timer is armed on attach.
    pub fn hide_after_timeout(&mut self, ctx: &mut OverlayContext<'_>) {
        self.cancel_hide_timer(ctx.scheduler);

        let paused = ctx
            .engine
            .as_deref()
            .is_some_and(|engine| !engine.play_when_ready());

        if !self.is_visible() || self.is_dragging() || paused || self.show_timeout.is_zero() {
            self.hide_deadline = None;
            return;
        }

        self.hide_deadline = Some(ctx.now + self.show_timeout);
        if self.attached {
            self.arm_hide_timer(ctx, self.show_timeout);
        } else {
            trace!(
                "{} detached, recorded hide deadline {:?}",
                self.surface, self.hide_deadline
            );
        }
    }

    /// The hide timer fired.
    pub fn on_hide_timer(&mut self, ctx: &mut OverlayContext<'_>) {
        if self.state != ControlState::VisibleTimerArmed {
            trace!("Spurious hide timer on {} in {:?}", self.surface, self.state);
            return;
        }
        self.state = ControlState::VisibleNoTimer;
        self.hide(ctx);
    }

    pub(crate) fn arm_hide_timer(&mut self, ctx: &mut OverlayContext<'_>, delay: Duration) {
        ctx.scheduler
            .replace(Task::Hide(self.surface), ctx.now, delay);
        self.state = ControlState::VisibleTimerArmed;
        trace!("Armed hide timer on {} for {:?}", self.surface, delay);
    }

    pub(crate) fn cancel_hide_timer(&mut self, scheduler: &mut Scheduler) {
        scheduler.remove(Task::Hide(self.surface));
        if self.state == ControlState::VisibleTimerArmed {
            self.state = ControlState::VisibleNoTimer;
        }
    }

    pub(crate) fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverlayConfig;
    use crate::surface::SurfaceId;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn attached_overlay() -> ControlOverlay {
        let mut overlay = ControlOverlay::new(SurfaceId::new(7), &OverlayConfig::default());
        overlay.set_attached(true);
        overlay
    }

    fn ctx(scheduler: &mut Scheduler, now: u64) -> OverlayContext<'_> {
        OverlayContext {
            engine: None,
            scheduler,
            now: ms(now),
        }
    }

    #[test]
    fn test_show_arms_single_timer() {
        let mut scheduler = Scheduler::new();
        let mut overlay = attached_overlay();

        for t in [0, 100, 200] {
            overlay.show(&mut ctx(&mut scheduler, t));
        }
        assert_eq!(overlay.state(), ControlState::VisibleTimerArmed);
        assert_eq!(scheduler.pending_count(Task::Hide(SurfaceId::new(7))), 1);
        assert_eq!(overlay.hide_deadline(), Some(ms(3200)));
    }

    #[test]
    fn test_hide_clears_everything() {
        let mut scheduler = Scheduler::new();
        let mut overlay = attached_overlay();
        overlay.show(&mut ctx(&mut scheduler, 0));
        overlay.hide(&mut ctx(&mut scheduler, 10));

        assert_eq!(overlay.state(), ControlState::Hidden);
        assert_eq!(overlay.hide_deadline(), None);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_switch_visibility_round_trip() {
        let mut scheduler = Scheduler::new();
        let mut overlay = attached_overlay();
        assert!(overlay.switch_visibility(&mut ctx(&mut scheduler, 0)));
        assert!(!overlay.switch_visibility(&mut ctx(&mut scheduler, 0)));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_detached_show_records_deadline_only() {
        let mut scheduler = Scheduler::new();
        let mut overlay = ControlOverlay::new(SurfaceId::new(7), &OverlayConfig::default());
        overlay.show(&mut ctx(&mut scheduler, 500));

        assert_eq!(overlay.state(), ControlState::VisibleNoTimer);
        assert_eq!(overlay.hide_deadline(), Some(ms(3500)));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_zero_timeout_never_auto_hides() {
        let mut scheduler = Scheduler::new();
        let config = OverlayConfig {
            show_timeout_ms: 0,
            ..OverlayConfig::default()
        };
        let mut overlay = ControlOverlay::new(SurfaceId::new(7), &config);
        overlay.set_attached(true);
        overlay.show(&mut ctx(&mut scheduler, 0));

        assert_eq!(overlay.state(), ControlState::VisibleNoTimer);
        assert_eq!(overlay.hide_deadline(), None);
    }

    #[test]
    fn test_drag_suspends_timer() {
        let mut scheduler = Scheduler::new();
        let mut overlay = attached_overlay();
        overlay.show(&mut ctx(&mut scheduler, 0));
        overlay.start_drag(&mut ctx(&mut scheduler, 1000));

        assert_eq!(overlay.state(), ControlState::VisibleNoTimer);
        assert_eq!(overlay.hide_deadline(), None);
        assert!(!scheduler.is_pending(Task::Hide(SurfaceId::new(7))));

        overlay.stop_drag(&mut ctx(&mut scheduler, 5000));
        assert_eq!(overlay.state(), ControlState::VisibleTimerArmed);
        assert_eq!(overlay.hide_deadline(), Some(ms(8000)));
    }

    #[test]
    fn test_stale_timer_fire_is_ignored() {
        let mut scheduler = Scheduler::new();
        let mut overlay = attached_overlay();
        overlay.on_hide_timer(&mut ctx(&mut scheduler, 0));
        assert_eq!(overlay.state(), ControlState::Hidden);

        overlay.show(&mut ctx(&mut scheduler, 0));
        overlay.start_drag(&mut ctx(&mut scheduler, 0));
        overlay.on_hide_timer(&mut ctx(&mut scheduler, 3000));
        assert!(overlay.is_visible());
    }
}
