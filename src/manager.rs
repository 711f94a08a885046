use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::core::{Clock, EngineFactory, PlaybackCallback, Scheduler, Task};
use crate::overlay::{ControlOverlay, OverlayContext};
use crate::player::{ContentRequest, MediaSource, PlaybackSession, ResumePoint, ResumeStore};
use crate::surface::{
    AttachmentTracker, HandoffOutcome, HostDetachOutcome, HostId, HostLayout, SurfaceId,
    ViewSlotManager,
};
use crate::utils::PlayerError;
use crate::workers::ResumeWorker;

/// What a `play` request turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// A fresh engine now renders into `surface`.
    Started { surface: SurfaceId },
    /// Same content already playing: `shadow` waits in the new host for
    /// [`PlayerManager::surface_ready`].
    HandoffPending { shadow: SurfaceId },
}

/// Host-facing entry point. Owns the session, both view slots, the
/// overlays and the scheduler; the host drives it with play requests,
/// attach/detach notifications, user input and `run_pending` ticks.
pub struct PlayerManager<L: HostLayout> {
    config: Config,
    layout: L,
    clock: Rc<dyn Clock>,
    session: PlaybackSession,
    slots: ViewSlotManager,
    overlays: HashMap<SurfaceId, ControlOverlay>,
    attachments: AttachmentTracker,
    scheduler: Scheduler,
    callback: Option<Box<dyn PlaybackCallback>>,
    resume_worker: Option<ResumeWorker>,
    last_request: Option<ContentRequest>,
    fullscreen: bool,
}

impl<L: HostLayout> PlayerManager<L> {
    pub fn new(
        config: Config,
        factory: Box<dyn EngineFactory>,
        layout: L,
        clock: Rc<dyn Clock>,
        resume_worker: Option<ResumeWorker>,
    ) -> Self {
        let resume_worker = resume_worker.filter(|_| config.resume.enabled);
        let store: Option<Arc<dyn ResumeStore>> = resume_worker.as_ref().map(|w| w.store());
        let session = PlaybackSession::new(factory, config.playback.clone(), store);

        Self {
            config,
            layout,
            clock,
            session,
            slots: ViewSlotManager::new(),
            overlays: HashMap::new(),
            attachments: AttachmentTracker::new(),
            scheduler: Scheduler::new(),
            callback: None,
            resume_worker,
            last_request: None,
            fullscreen: false,
        }
    }

    pub fn set_callback(&mut self, callback: Box<dyn PlaybackCallback>) {
        self.callback = Some(callback);
    }

    pub fn clear_callback(&mut self) {
        self.callback = None;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn slots(&self) -> &ViewSlotManager {
        &self.slots
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn overlay(&self, surface: SurfaceId) -> Option<&ControlOverlay> {
        self.overlays.get(&surface)
    }

    pub fn current_content(&self) -> Option<&str> {
        self.session.current_content()
    }

    pub fn output_surface(&self) -> Option<SurfaceId> {
        self.slots.output()
    }

    pub fn last_request(&self) -> Option<&ContentRequest> {
        self.last_request.as_ref()
    }

    pub fn is_watching(&self, host: HostId) -> bool {
        self.attachments.is_watching(host)
    }

    /// Surface the visibility and user-input calls act on.
    fn active_surface(&self) -> Option<SurfaceId> {
        self.slots
            .output()
            .or_else(|| self.slots.primary().map(|slot| slot.surface))
    }

    pub fn active_overlay(&self) -> Option<&ControlOverlay> {
        self.overlays.get(&self.active_surface()?)
    }

    /// Play `request.content_id` inside `request.host`.
    ///
    /// Content that is already playing is handed off to a shadow surface in
    /// the new host rather than restarted. Anything else releases the
    /// current engine and starts a fresh one on the primary surface.
    pub fn play(&mut self, request: ContentRequest) -> Result<PlayOutcome, PlayerError> {
        if request.content_id.trim().is_empty() {
            return Err(PlayerError::InvalidRequest(
                "content id must not be empty".to_string(),
            ));
        }

        if self.session.is_current(&request.content_id)
            && self.session.has_engine()
            && self.slots.output().is_some()
        {
            let ticket =
                self.slots
                    .begin_handoff(&mut self.layout, request.host, request.insertion_index);
            self.attachments.watch(request.host);
            self.last_request = Some(request);
            return Ok(PlayOutcome::HandoffPending {
                shadow: ticket.shadow(),
            });
        }

        // Resolve before touching any surface so a bad id leaves nothing behind.
        let source = MediaSource::resolve(&request.content_id)?;

        self.slots.cancel_handoff(&mut self.layout);
        if let Some(previous) = self.slots.clear_output() {
            self.unbind_overlay(previous);
        }

        let previous_host = self.slots.primary().and_then(|slot| slot.host);
        let target =
            self.slots
                .place_primary(&mut self.layout, request.host, request.insertion_index);
        if let Some(host) = previous_host
            && host != request.host
        {
            self.attachments.unwatch(host);
        }
        self.attachments.watch(request.host);
        self.last_request = Some(request.clone());

        let (result, previous) = self.session.start(&request.content_id, &source, target);
        if let Some(point) = previous {
            self.persist(point);
        }

        match result {
            Ok(()) => {
                self.slots.bind_output(target, &request.content_id);
                self.bind_overlay(target);
                Ok(PlayOutcome::Started { surface: target })
            }
            Err(e) => {
                warn!("Playback of {} failed: {}", request.content_id, e);
                if let Some(callback) = self.callback.as_mut() {
                    callback.on_error(&e);
                }
                Err(e)
            }
        }
    }

    /// Phase two of a hand-off: the host reports that `surface` has been
    /// laid out. Returns `None` when no hand-off waits on that surface.
    pub fn surface_ready(&mut self, surface: SurfaceId) -> Option<HandoffOutcome> {
        let ticket = self.slots.pending_handoff()?;
        if ticket.shadow() != surface {
            trace!("{} ready, but hand-off waits on {}", surface, ticket.shadow());
            return None;
        }

        let outcome =
            self.slots
                .commit_handoff(ticket, self.session.engine_mut(), &mut self.layout);

        if let HandoffOutcome::Committed {
            from,
            to,
            vacated_host,
        } = outcome
        {
            let was_visible = self.overlays.get(&from).is_some_and(|o| o.is_visible());
            self.unbind_overlay(from);
            self.bind_overlay(to);
            if was_visible {
                self.with_overlay(to, |overlay, ctx| overlay.show(ctx));
            }

            let new_host = self.slots.primary().and_then(|slot| slot.host);
            if let Some(host) = vacated_host
                && Some(host) != new_host
            {
                self.attachments.unwatch(host);
            }
        }
        Some(outcome)
    }

    /// Stop playback and unbind every surface. Safe to call repeatedly.
    pub fn release(&mut self) {
        self.slots.cancel_handoff(&mut self.layout);
        if let Some(surface) = self.slots.clear_output() {
            self.unbind_overlay(surface);
        }
        if let Some(point) = self.session.release() {
            self.persist(point);
        }
    }

    pub fn seek_to(&mut self, position: Duration) {
        self.session.seek_to(position);
        if let Some(surface) = self.active_surface() {
            self.with_overlay(surface, |overlay, ctx| {
                if overlay.is_visible() {
                    overlay.update_progress(ctx);
                }
            });
        }
    }

    /// Start the last request again on a fresh engine.
    pub fn replay(&mut self) -> Result<PlayOutcome, PlayerError> {
        let Some(request) = self.last_request.clone() else {
            return Err(PlayerError::InvalidRequest(
                "nothing has been played yet".to_string(),
            ));
        };
        info!("Replaying {}", request.content_id);
        self.release();
        self.play(request)
    }

    /// Attach a fresh control overlay to `surface`, replacing any existing one.
    pub fn bind_view(&mut self, surface: SurfaceId) {
        self.unbind_overlay(surface);
        self.bind_overlay(surface);
    }

    fn bind_overlay(&mut self, surface: SurfaceId) {
        let mut overlay = ControlOverlay::new(surface, &self.config.overlay);
        if self.slots.slot(surface).is_some_and(|slot| slot.attached) {
            overlay.set_attached(true);
        }
        self.overlays.insert(surface, overlay);
        self.with_overlay(surface, |overlay, ctx| overlay.update_progress(ctx));
        debug!("Bound overlay to {}", surface);
    }

    fn unbind_overlay(&mut self, surface: SurfaceId) {
        if let Some(mut overlay) = self.overlays.remove(&surface) {
            overlay.teardown(&mut self.scheduler);
            debug!("Unbound overlay from {}", surface);
        }
    }

    fn with_overlay<R>(
        &mut self,
        surface: SurfaceId,
        f: impl FnOnce(&mut ControlOverlay, &mut OverlayContext<'_>) -> R,
    ) -> Option<R> {
        let now = self.clock.now();
        let overlay = self.overlays.get_mut(&surface)?;
        let mut ctx = OverlayContext {
            engine: self.session.engine_mut(),
            scheduler: &mut self.scheduler,
            now,
        };
        Some(f(overlay, &mut ctx))
    }

    fn with_active_overlay<R>(
        &mut self,
        f: impl FnOnce(&mut ControlOverlay, &mut OverlayContext<'_>) -> R,
    ) -> Option<R> {
        let surface = self.active_surface()?;
        self.with_overlay(surface, f)
    }

    fn persist(&mut self, point: ResumePoint) {
        if let Some(worker) = self.resume_worker.as_mut() {
            worker.record(point);
        }
    }

    /// Flip the controls. Returns true if they ended up visible.
    pub fn switch_visibility(&mut self) -> bool {
        self.with_active_overlay(|overlay, ctx| overlay.switch_visibility(ctx))
            .unwrap_or(false)
    }

    pub fn set_visibility(&mut self, visible: bool) {
        self.with_active_overlay(|overlay, ctx| overlay.set_visibility(visible, ctx));
    }

    pub fn is_visible(&self) -> bool {
        self.active_overlay().is_some_and(|o| o.is_visible())
    }

    pub fn set_seek_bar_visible(&mut self, visible: bool) {
        if let Some(surface) = self.active_surface()
            && let Some(overlay) = self.overlays.get_mut(&surface)
        {
            overlay.seek_bar_mut().set_visible(visible);
        }
    }

    /// The user pressed play/pause.
    pub fn toggle_play_pause(&mut self) {
        let Some(surface) = self.active_surface() else {
            return;
        };
        let Some(Some(playing)) =
            self.with_overlay(surface, |overlay, ctx| overlay.toggle_play_pause(ctx))
        else {
            return;
        };
        if let Some(callback) = self.callback.as_mut() {
            if playing {
                callback.on_play(surface);
            } else {
                callback.on_pause(surface);
            }
        }
    }

    pub fn start_drag(&mut self) {
        self.with_active_overlay(|overlay, ctx| overlay.start_drag(ctx));
    }

    pub fn drag_to(&mut self, progress: u32) {
        if let Some(surface) = self.active_surface()
            && let Some(overlay) = self.overlays.get_mut(&surface)
        {
            overlay.drag_to(progress);
        }
    }

    /// Finish a drag. Returns the position the engine was asked to seek to.
    pub fn stop_drag(&mut self) -> Option<Duration> {
        self.with_active_overlay(|overlay, ctx| overlay.stop_drag(ctx))
            .flatten()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// The user pressed the fullscreen button. The host is expected to
    /// answer with a `play` into its fullscreen container.
    pub fn toggle_fullscreen(&mut self) {
        let Some(surface) = self.active_surface() else {
            return;
        };
        self.fullscreen = !self.fullscreen;
        info!("Fullscreen {} on {}", self.fullscreen, surface);
        if let Some(callback) = self.callback.as_mut() {
            callback.on_fullscreen_change(self.fullscreen, surface);
        }
        self.with_overlay(surface, |overlay, ctx| overlay.hide_after_timeout(ctx));
    }

    /// Record a fullscreen change the host made on its own.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    pub fn surface_attached(&mut self, surface: SurfaceId) {
        self.slots.set_attached(surface, true);
        let now = self.clock.now();
        if let Some(overlay) = self.overlays.get_mut(&surface) {
            let mut ctx = OverlayContext {
                engine: self.session.engine_mut(),
                scheduler: &mut self.scheduler,
                now,
            };
            self.attachments.surface_attached(overlay, &mut ctx);
        }
    }

    pub fn surface_detached(&mut self, surface: SurfaceId) {
        self.slots.set_attached(surface, false);
        let now = self.clock.now();
        if let Some(overlay) = self.overlays.get_mut(&surface) {
            let mut ctx = OverlayContext {
                engine: self.session.engine_mut(),
                scheduler: &mut self.scheduler,
                now,
            };
            self.attachments.surface_detached(overlay, &mut ctx);
        }
    }

    /// A host container left the window for good.
    pub fn host_detached(&mut self, host: HostId) -> HostDetachOutcome {
        let outcome = self.attachments.host_detached(
            host,
            &mut self.slots,
            &mut self.session,
            &mut self.layout,
        );
        match &outcome {
            HostDetachOutcome::ReleasedPlayback { surface, resume } => {
                self.unbind_overlay(*surface);
                if let Some(point) = resume.clone() {
                    self.persist(point);
                }
            }
            HostDetachOutcome::DroppedShadow { surface } => {
                self.unbind_overlay(*surface);
            }
            HostDetachOutcome::Ignored => {}
        }
        outcome
    }

    /// Run every task due at the current clock time. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let now = self.clock.now();
        let mut ran = 0;
        while let Some(task) = self.scheduler.pop_due(now) {
            let surface = task.surface();
            // Tasks of an unbound surface are dropped, never run.
            let handled = self.with_overlay(surface, |overlay, ctx| match task {
                Task::UpdateProgress(_) => overlay.update_progress(ctx),
                Task::Hide(_) => overlay.on_hide_timer(ctx),
            });
            if handled.is_some() {
                ran += 1;
            } else {
                trace!("Dropped {:?} for unbound {}", task, surface);
            }
        }
        ran
    }

    /// When `run_pending` next has work.
    pub fn next_wakeup(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// Release playback and stop the resume worker after it drains.
    pub fn shutdown(&mut self) {
        self.release();
        for (_, mut overlay) in self.overlays.drain() {
            overlay.teardown(&mut self.scheduler);
        }
        if let Some(worker) = self.resume_worker.as_mut() {
            worker.shutdown();
        }
        info!("Player manager shut down");
    }

    /// Block until queued resume offsets are written.
    pub fn flush_resume_offsets(&mut self) -> anyhow::Result<()> {
        match self.resume_worker.as_mut() {
            Some(worker) => worker.flush(),
            None => Ok(()),
        }
    }
}
