//! Auto-hide timing, progress polling and seek-bar interaction

mod common;

use common::{CONTENT, Harness, ms};
use slotplay::{Config, ControlState, PlayPauseIcon, SurfaceId, Task};

fn state(h: &Harness, surface: SurfaceId) -> ControlState {
    h.manager.overlay(surface).expect("overlay bound").state()
}

#[test]
fn test_controls_hide_after_timeout() {
    let mut h = Harness::new();
    let surface = h.start_inline(CONTENT);
    h.manager.set_visibility(true);
    assert_eq!(state(&h, surface), ControlState::VisibleTimerArmed);

    h.advance_to(ms(2999));
    assert!(h.manager.is_visible());
    h.advance_to(ms(3000));
    assert!(!h.manager.is_visible());
    assert!(h.manager.scheduler().is_empty());
}

#[test]
fn test_reattach_keeps_original_deadline() {
    let mut h = Harness::new();
    let surface = h.start_inline(CONTENT);
    h.manager.set_visibility(true);

    h.advance_to(ms(1000));
    h.manager.surface_detached(surface);
    assert!(h.manager.scheduler().is_empty());
    assert_eq!(
        h.manager.overlay(surface).unwrap().hide_deadline(),
        Some(ms(3000))
    );

    h.advance_to(ms(2500));
    h.manager.surface_attached(surface);
    assert_eq!(
        h.manager.scheduler().due_time(Task::Hide(surface)),
        Some(ms(3000))
    );

    h.advance_to(ms(2999));
    assert!(h.manager.is_visible());
    h.advance_to(ms(3000));
    assert!(!h.manager.is_visible());
}

#[test]
fn test_reattach_after_deadline_hides_at_once() {
    let mut h = Harness::new();
    let surface = h.start_inline(CONTENT);
    h.manager.set_visibility(true);
    h.manager.surface_detached(surface);

    h.advance_to(ms(4000));
    assert!(h.manager.is_visible());
    h.manager.surface_attached(surface);
    assert!(!h.manager.is_visible());
    assert!(h.manager.scheduler().is_empty());
}

#[test]
fn test_at_most_one_timer_and_poll() {
    let mut h = Harness::new();
    let surface = h.start_inline(CONTENT);

    for step in 0..20u64 {
        match step % 4 {
            0 | 1 => h.manager.set_visibility(true),
            2 => {
                h.manager.switch_visibility();
            }
            _ => h.manager.seek_to(ms(step * 1000)),
        }
        h.advance(ms(137));
        let scheduler = h.manager.scheduler();
        assert!(scheduler.pending_count(Task::Hide(surface)) <= 1);
        assert!(scheduler.pending_count(Task::UpdateProgress(surface)) <= 1);
    }
}

#[test]
fn test_progress_and_buffered_values() {
    let mut h = Harness::new();
    let surface = h.start_inline(CONTENT);
    h.factory.last().unwrap().set_position(ms(25_000));

    h.manager.set_visibility(true);
    let seek_bar = h.manager.overlay(surface).unwrap().seek_bar();
    assert_eq!(seek_bar.progress(), 250);
    assert_eq!(seek_bar.secondary_progress(), 400);
    assert_eq!(seek_bar.position_text(), "0:25");
    assert_eq!(seek_bar.duration_text(), "1:40");
}

#[test]
fn test_progress_follows_playback() {
    let mut h = Harness::new();
    let surface = h.start_inline(CONTENT);
    h.manager.set_visibility(true);

    h.advance_to(ms(2500));
    // Last poll ran at the 2s boundary.
    let seek_bar = h.manager.overlay(surface).unwrap().seek_bar();
    assert_eq!(seek_bar.progress(), 20);
    assert_eq!(seek_bar.position_text(), "0:02");
}

#[test]
fn test_drag_is_not_overwritten_by_polls() {
    let mut h = Harness::new();
    let surface = h.start_inline(CONTENT);
    h.manager.set_visibility(true);
    h.advance_to(ms(1000));

    h.manager.start_drag();
    h.manager.drag_to(700);
    assert_eq!(state(&h, surface), ControlState::VisibleNoTimer);

    h.advance(ms(2000));
    let overlay = h.manager.overlay(surface).unwrap();
    assert!(overlay.is_visible());
    assert_eq!(overlay.seek_bar().progress(), 700);
    assert_eq!(overlay.seek_bar().position_text(), "1:10");

    assert_eq!(h.manager.stop_drag(), Some(ms(70_000)));
    assert_eq!(h.factory.last().unwrap().seeks(), vec![ms(70_000)]);
    assert_eq!(
        h.manager.overlay(surface).unwrap().hide_deadline(),
        Some(h.now() + ms(3000))
    );
}

#[test]
fn test_paused_controls_stay_visible() {
    let mut h = Harness::new();
    let surface = h.start_inline(CONTENT);
    h.manager.toggle_play_pause();
    h.manager.set_visibility(true);

    assert_eq!(state(&h, surface), ControlState::VisibleNoTimer);
    assert_eq!(
        h.manager.overlay(surface).unwrap().play_icon(),
        PlayPauseIcon::Play
    );

    h.advance(ms(10_000));
    assert!(h.manager.is_visible());

    h.manager.toggle_play_pause();
    assert_eq!(state(&h, surface), ControlState::VisibleTimerArmed);
    h.advance(ms(3000));
    assert!(!h.manager.is_visible());
}

#[test]
fn test_seek_while_paused_resumes_playback() {
    let mut h = Harness::new();
    h.start_inline(CONTENT);
    h.manager.toggle_play_pause();
    h.manager.set_visibility(true);

    h.manager.start_drag();
    h.manager.drag_to(500);
    assert_eq!(h.manager.stop_drag(), Some(ms(50_000)));
    assert!(h.factory.last().unwrap().play_when_ready());
}

#[test]
fn test_zero_timeout_disables_auto_hide() {
    let mut config = Config::default();
    config.overlay.show_timeout_ms = 0;
    let mut h = Harness::with_config(config);
    h.start_inline(CONTENT);
    h.manager.set_visibility(true);

    h.advance(ms(60_000));
    assert!(h.manager.is_visible());
}

#[test]
fn test_polling_stops_when_stream_ends() {
    let mut h = Harness::new();
    let surface = h.start_inline(CONTENT);
    h.manager.set_visibility(true);
    h.factory.last().unwrap().set_position(ms(99_500));
    h.advance(ms(2000));

    // The poll at 1s saw the end and did not reschedule.
    assert_eq!(
        h.manager
            .scheduler()
            .pending_count(Task::UpdateProgress(surface)),
        0
    );
    h.manager.set_visibility(true);
    let overlay = h.manager.overlay(surface).unwrap();
    assert_eq!(overlay.seek_bar().progress(), 1000);
    assert_eq!(
        h.manager
            .scheduler()
            .pending_count(Task::UpdateProgress(surface)),
        0
    );
}
