use std::collections::HashSet;
use tracing::{debug, info};

use super::{HostId, HostLayout, SurfaceId, ViewSlotManager};
use crate::overlay::{ControlOverlay, OverlayContext};
use crate::player::{PlaybackSession, ResumePoint};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostDetachOutcome {
    /// The host is not watched or holds none of our surfaces.
    Ignored,
    /// The host held the live surface: playback was released and the
    /// surface removed.
    ReleasedPlayback {
        surface: SurfaceId,
        resume: Option<ResumePoint>,
    },
    /// The host only held a shadow surface waiting for a hand-off.
    DroppedShadow { surface: SurfaceId },
}

/// Reacts to hosts and surfaces entering or leaving the window.
#[derive(Debug, Default)]
pub struct AttachmentTracker {
    watched_hosts: HashSet<HostId>,
}

impl AttachmentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch(&mut self, host: HostId) {
        if self.watched_hosts.insert(host) {
            debug!("Watching {}", host);
        }
    }

    pub fn unwatch(&mut self, host: HostId) {
        if self.watched_hosts.remove(&host) {
            debug!("Stopped watching {}", host);
        }
    }

    pub fn is_watching(&self, host: HostId) -> bool {
        self.watched_hosts.contains(&host)
    }

    /// Re-arm a deadline recorded while detached against the original
    /// absolute time, then resume polling if still visible.
    pub fn surface_attached(&mut self, overlay: &mut ControlOverlay, ctx: &mut OverlayContext<'_>) {
        overlay.set_attached(true);

        if let Some(deadline) = overlay.hide_deadline() {
            if deadline <= ctx.now {
                debug!("Hide deadline for {} passed while detached", overlay.surface());
                overlay.hide(ctx);
                return;
            }
            overlay.arm_hide_timer(ctx, deadline - ctx.now);
        }

        if overlay.is_visible() {
            overlay.update_progress(ctx);
        }
    }

    /// Pause timers; the recorded deadline survives for the next attach.
    pub fn surface_detached(&mut self, overlay: &mut ControlOverlay, ctx: &mut OverlayContext<'_>) {
        overlay.set_attached(false);
        overlay.cancel_hide_timer(ctx.scheduler);
        overlay.stop_update_progress(ctx.scheduler);
    }

    /// A detached host must not keep playback resources alive.
    pub fn host_detached(
        &mut self,
        host: HostId,
        slots: &mut ViewSlotManager,
        session: &mut PlaybackSession,
        layout: &mut dyn HostLayout,
    ) -> HostDetachOutcome {
        if !self.is_watching(host) {
            return HostDetachOutcome::Ignored;
        }

        let surfaces = slots.surfaces_in(host);
        let outcome = if let Some(surface) = surfaces
            .iter()
            .copied()
            .find(|s| slots.output() == Some(*s))
        {
            info!("{} detached while holding {}, releasing playback", host, surface);
            let resume = session.release();
            slots.cancel_handoff(layout);
            slots.clear_output();
            slots.detach_from_host(layout, surface);
            HostDetachOutcome::ReleasedPlayback { surface, resume }
        } else if let Some(surface) = surfaces.first().copied() {
            debug!("{} detached with pending shadow {}", host, surface);
            slots.cancel_handoff(layout);
            slots.detach_from_host(layout, surface);
            HostDetachOutcome::DroppedShadow { surface }
        } else {
            HostDetachOutcome::Ignored
        };

        self.unwatch(host);
        outcome
    }
}
