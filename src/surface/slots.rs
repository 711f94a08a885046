use std::mem;
use tracing::{debug, info};

use super::{HostId, HostLayout, SurfaceId};
use crate::core::MediaEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRole {
    /// The surface the user currently sees.
    Primary,
    /// The surface being prepared for a hand-off.
    Shadow,
}

#[derive(Debug, Clone)]
pub struct ViewSlot {
    pub surface: SurfaceId,
    pub host: Option<HostId>,
    pub bound_content: Option<String>,
    pub attached: bool,
}

impl ViewSlot {
    fn new(surface: SurfaceId) -> Self {
        Self {
            surface,
            host: None,
            bound_content: None,
            attached: false,
        }
    }

    /// Pull the surface out of its host. A surface outside any host is
    /// never attached.
    fn leave_host(&mut self, layout: &mut dyn HostLayout) -> Option<HostId> {
        let host = self.host.take()?;
        layout.remove(host, self.surface);
        self.attached = false;
        Some(host)
    }
}

/// Phase-one receipt of a hand-off. Only the latest ticket can commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandoffTicket {
    generation: u64,
    shadow: SurfaceId,
}

impl HandoffTicket {
    pub fn shadow(&self) -> SurfaceId {
        self.shadow
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// A newer hand-off or a content switch superseded this one.
    Stale,
    /// The session was released between request and commit.
    NoEngine,
    /// Primary and shadow resolve to the same surface.
    SameSlot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffOutcome {
    Committed {
        from: SurfaceId,
        to: SurfaceId,
        /// Host the old primary was removed from.
        vacated_host: Option<HostId>,
    },
    Aborted(AbortReason),
}

/// Owns at most two surfaces and decides which one holds the engine's
/// video output. `output` is the single source of truth for ownership.
#[derive(Debug, Default)]
pub struct ViewSlotManager {
    primary: Option<ViewSlot>,
    shadow: Option<ViewSlot>,
    output: Option<SurfaceId>,
    pending: Option<HandoffTicket>,
    next_generation: u64,
}

impl ViewSlotManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary(&self) -> Option<&ViewSlot> {
        self.primary.as_ref()
    }

    pub fn shadow(&self) -> Option<&ViewSlot> {
        self.shadow.as_ref()
    }

    /// Surface currently receiving the engine's output.
    pub fn output(&self) -> Option<SurfaceId> {
        self.output
    }

    pub fn pending_handoff(&self) -> Option<HandoffTicket> {
        self.pending
    }

    pub fn role_of(&self, surface: SurfaceId) -> Option<SlotRole> {
        if self.primary.as_ref().is_some_and(|s| s.surface == surface) {
            Some(SlotRole::Primary)
        } else if self.shadow.as_ref().is_some_and(|s| s.surface == surface) {
            Some(SlotRole::Shadow)
        } else {
            None
        }
    }

    pub fn slot(&self, surface: SurfaceId) -> Option<&ViewSlot> {
        self.slots().find(|s| s.surface == surface)
    }

    fn slot_mut(&mut self, surface: SurfaceId) -> Option<&mut ViewSlot> {
        self.primary
            .iter_mut()
            .chain(self.shadow.iter_mut())
            .find(|s| s.surface == surface)
    }

    pub fn slots(&self) -> impl Iterator<Item = &ViewSlot> {
        self.primary.iter().chain(self.shadow.iter())
    }

    /// Slots currently inserted in `host`.
    pub fn surfaces_in(&self, host: HostId) -> Vec<SurfaceId> {
        self.slots()
            .filter(|s| s.host == Some(host))
            .map(|s| s.surface)
            .collect()
    }

    pub fn set_attached(&mut self, surface: SurfaceId, attached: bool) {
        if let Some(slot) = self.slot_mut(surface) {
            slot.attached = attached;
        }
    }

    /// Make sure the primary surface exists and sits in `host`. A surface
    /// already in `host` keeps its position.
    pub fn place_primary(
        &mut self,
        layout: &mut dyn HostLayout,
        host: HostId,
        index: Option<usize>,
    ) -> SurfaceId {
        let slot = self
            .primary
            .get_or_insert_with(|| ViewSlot::new(layout.create_surface()));

        if slot.host != Some(host) {
            slot.leave_host(layout);
            let index = clamp_index(layout, host, index);
            layout.insert(host, slot.surface, index);
            slot.host = Some(host);
            debug!("Placed primary {} in {}", slot.surface, host);
        }
        slot.surface
    }

    /// Record that the engine now renders into `surface`.
    pub fn bind_output(&mut self, surface: SurfaceId, content_id: &str) {
        if let Some(previous) = self.output.replace(surface)
            && previous != surface
            && let Some(slot) = self.slot_mut(previous)
        {
            slot.bound_content = None;
        }
        if let Some(slot) = self.slot_mut(surface) {
            slot.bound_content = Some(content_id.to_string());
        }
    }

    pub fn clear_output(&mut self) -> Option<SurfaceId> {
        let surface = self.output.take()?;
        if let Some(slot) = self.slot_mut(surface) {
            slot.bound_content = None;
        }
        Some(surface)
    }

    /// Phase one: insert the shadow surface into `host` and hand back a
    /// ticket. Output does not move until [`Self::commit_handoff`].
    pub fn begin_handoff(
        &mut self,
        layout: &mut dyn HostLayout,
        host: HostId,
        index: Option<usize>,
    ) -> HandoffTicket {
        let slot = self
            .shadow
            .get_or_insert_with(|| ViewSlot::new(layout.create_surface()));

        slot.leave_host(layout);
        let index = clamp_index(layout, host, index);
        layout.insert(host, slot.surface, index);
        slot.host = Some(host);

        self.next_generation += 1;
        let ticket = HandoffTicket {
            generation: self.next_generation,
            shadow: slot.surface,
        };
        self.pending = Some(ticket);
        info!("Hand-off requested into {} via {}", host, ticket.shadow);
        ticket
    }

    /// Drop a pending hand-off and pull its shadow back out of the host.
    pub fn cancel_handoff(&mut self, layout: &mut dyn HostLayout) -> Option<HostId> {
        self.pending.take()?;
        let slot = self.shadow.as_mut()?;
        if self.output == Some(slot.surface) {
            return None;
        }
        let host = slot.leave_host(layout)?;
        debug!("Cancelled pending hand-off, removed {} from {}", slot.surface, host);
        Some(host)
    }

    /// Phase two: move the engine output to the shadow surface, swap the
    /// roles and pull the old primary out of its host. Any change since
    /// phase one aborts without touching the output.
    pub fn commit_handoff(
        &mut self,
        ticket: HandoffTicket,
        engine: Option<&mut (dyn MediaEngine + 'static)>,
        layout: &mut dyn HostLayout,
    ) -> HandoffOutcome {
        if self.pending != Some(ticket) {
            debug!("Ignoring stale hand-off ticket for {}", ticket.shadow);
            return HandoffOutcome::Aborted(AbortReason::Stale);
        }
        self.pending = None;

        let Some(engine) = engine else {
            debug!("Engine released before hand-off commit, aborting");
            self.cancel_shadow(layout);
            return HandoffOutcome::Aborted(AbortReason::NoEngine);
        };

        let (from, to) = match (&self.primary, &self.shadow) {
            (Some(primary), Some(shadow)) if primary.surface != shadow.surface => {
                (primary.surface, shadow.surface)
            }
            _ => return HandoffOutcome::Aborted(AbortReason::SameSlot),
        };

        // Single call: the engine detaches `from` as it attaches `to`.
        engine.set_render_target(Some(to));
        let content = self.primary.as_mut().and_then(|s| s.bound_content.take());
        self.output = Some(to);
        if let Some(shadow) = self.shadow.as_mut() {
            shadow.bound_content = content;
        }
        mem::swap(&mut self.primary, &mut self.shadow);

        let vacated_host = self.shadow.as_mut().and_then(|old| old.leave_host(layout));

        info!("Hand-off committed {} -> {}", from, to);
        HandoffOutcome::Committed {
            from,
            to,
            vacated_host,
        }
    }

    fn cancel_shadow(&mut self, layout: &mut dyn HostLayout) {
        if let Some(slot) = self.shadow.as_mut() {
            slot.leave_host(layout);
        }
    }

    /// Remove `surface` from whatever host holds it.
    pub fn detach_from_host(&mut self, layout: &mut dyn HostLayout, surface: SurfaceId) {
        if let Some(slot) = self.slot_mut(surface) {
            slot.leave_host(layout);
        }
    }
}

fn clamp_index(layout: &dyn HostLayout, host: HostId, index: Option<usize>) -> Option<usize> {
    index.map(|i| i.min(layout.child_count(host)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;
    use crate::player::SimulatedEngine;
    use crate::surface::MemoryLayout;
    use std::rc::Rc;
    use std::time::Duration;

    fn engine() -> SimulatedEngine {
        SimulatedEngine::new(Rc::new(ManualClock::new()), Duration::from_secs(60))
    }

    #[test]
    fn test_place_primary_clamps_index() {
        let mut layout = MemoryLayout::new();
        let host = layout.add_host();
        let title = layout.add_sibling(host);
        let mut slots = ViewSlotManager::new();

        let surface = slots.place_primary(&mut layout, host, Some(7));
        assert_eq!(layout.children(host), &[title, surface]);
        assert_eq!(slots.role_of(surface), Some(SlotRole::Primary));

        // Same host again: no re-insert.
        assert_eq!(slots.place_primary(&mut layout, host, Some(0)), surface);
        assert_eq!(layout.children(host), &[title, surface]);
    }

    #[test]
    fn test_commit_swaps_roles_and_vacates_old_host() {
        let mut layout = MemoryLayout::new();
        let inline = layout.add_host();
        let fullscreen = layout.add_host();
        let mut slots = ViewSlotManager::new();
        let mut engine = engine();

        let first = slots.place_primary(&mut layout, inline, None);
        engine.set_render_target(Some(first));
        slots.bind_output(first, "a.mp4");

        let ticket = slots.begin_handoff(&mut layout, fullscreen, Some(0));
        // Between phases the old surface still owns the output.
        assert_eq!(slots.output(), Some(first));
        assert_eq!(engine.render_target(), Some(first));

        let outcome = slots.commit_handoff(ticket, Some(&mut engine), &mut layout);
        assert_eq!(
            outcome,
            HandoffOutcome::Committed {
                from: first,
                to: ticket.shadow(),
                vacated_host: Some(inline),
            }
        );
        assert_eq!(slots.output(), Some(ticket.shadow()));
        assert_eq!(engine.render_target(), Some(ticket.shadow()));
        assert_eq!(slots.role_of(ticket.shadow()), Some(SlotRole::Primary));
        assert_eq!(slots.role_of(first), Some(SlotRole::Shadow));
        assert_eq!(
            slots.primary().unwrap().bound_content.as_deref(),
            Some("a.mp4")
        );
        assert!(layout.children(inline).is_empty());
        assert_eq!(layout.children(fullscreen), &[ticket.shadow()]);
    }

    #[test]
    fn test_surfaces_leaving_a_host_are_detached() {
        let mut layout = MemoryLayout::new();
        let inline = layout.add_host();
        let fullscreen = layout.add_host();
        let mut slots = ViewSlotManager::new();
        let mut engine = engine();

        let first = slots.place_primary(&mut layout, inline, None);
        slots.bind_output(first, "a.mp4");
        slots.set_attached(first, true);

        let ticket = slots.begin_handoff(&mut layout, fullscreen, None);
        slots.set_attached(ticket.shadow(), true);
        slots.commit_handoff(ticket, Some(&mut engine), &mut layout);
        assert!(!slots.slot(first).unwrap().attached);
        assert!(slots.slot(ticket.shadow()).unwrap().attached);

        // Cancelled shadow.
        let ticket = slots.begin_handoff(&mut layout, inline, None);
        slots.set_attached(ticket.shadow(), true);
        slots.cancel_handoff(&mut layout);
        assert!(!slots.slot(ticket.shadow()).unwrap().attached);

        // Aborted commit.
        let ticket = slots.begin_handoff(&mut layout, inline, None);
        slots.set_attached(ticket.shadow(), true);
        slots.commit_handoff(ticket, None, &mut layout);
        assert!(!slots.slot(ticket.shadow()).unwrap().attached);

        let primary = slots.primary().unwrap().surface;
        slots.detach_from_host(&mut layout, primary);
        assert!(!slots.slot(primary).unwrap().attached);
        assert!(layout.children(fullscreen).is_empty());
    }

    #[test]
    fn test_commit_without_engine_aborts_cleanly() {
        let mut layout = MemoryLayout::new();
        let inline = layout.add_host();
        let fullscreen = layout.add_host();
        let mut slots = ViewSlotManager::new();

        let first = slots.place_primary(&mut layout, inline, None);
        slots.bind_output(first, "a.mp4");
        let ticket = slots.begin_handoff(&mut layout, fullscreen, None);

        let outcome = slots.commit_handoff(ticket, None, &mut layout);
        assert_eq!(outcome, HandoffOutcome::Aborted(AbortReason::NoEngine));
        assert_eq!(slots.output(), Some(first));
        assert!(layout.children(fullscreen).is_empty());
    }

    #[test]
    fn test_superseded_ticket_is_stale() {
        let mut layout = MemoryLayout::new();
        let inline = layout.add_host();
        let a = layout.add_host();
        let b = layout.add_host();
        let mut slots = ViewSlotManager::new();
        let mut engine = engine();

        let first = slots.place_primary(&mut layout, inline, None);
        slots.bind_output(first, "a.mp4");
        let old = slots.begin_handoff(&mut layout, a, None);
        let new = slots.begin_handoff(&mut layout, b, None);

        assert_eq!(
            slots.commit_handoff(old, Some(&mut engine), &mut layout),
            HandoffOutcome::Aborted(AbortReason::Stale)
        );
        assert!(layout.children(a).is_empty());
        assert!(matches!(
            slots.commit_handoff(new, Some(&mut engine), &mut layout),
            HandoffOutcome::Committed { .. }
        ));
    }
}
