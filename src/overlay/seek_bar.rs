use std::time::Duration;

use super::time_sampler::{SampledTime, format_duration};

/// Seek control plus the position/duration labels next to it.
/// While the user drags, polls leave the thumb and the position label alone.
#[derive(Debug, Clone)]
pub struct SeekBar {
    max: u32,
    progress: u32,
    secondary_progress: u32,
    visible: bool,
    is_dragging: bool,
    position_text: String,
    duration_text: String,
}

impl SeekBar {
    pub fn new(max: u32) -> Self {
        Self {
            max,
            progress: 0,
            secondary_progress: 0,
            visible: true,
            is_dragging: false,
            position_text: format_duration(Duration::ZERO),
            duration_text: format_duration(Duration::ZERO),
        }
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn secondary_progress(&self) -> u32 {
        self.secondary_progress
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Hosts hide the seek control for live streams.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn position_text(&self) -> &str {
        &self.position_text
    }

    pub fn duration_text(&self) -> &str {
        &self.duration_text
    }

    /// Apply a poll result.
    pub fn update(&mut self, sample: &SampledTime) {
        if !self.is_dragging {
            self.position_text = format_duration(sample.position);
        }
        self.duration_text = format_duration(sample.duration);

        if !self.visible {
            return;
        }
        if let Some(progress) = sample.progress(self.max)
            && !self.is_dragging
        {
            self.progress = progress;
        }
        if let Some(secondary) = sample.secondary_progress(self.max) {
            self.secondary_progress = secondary;
        }
    }

    pub fn start_drag(&mut self) {
        self.is_dragging = true;
    }

    /// Move the thumb under the user's finger and preview the target time.
    pub fn drag_to(&mut self, progress: u32, sample: &SampledTime) {
        self.progress = progress.min(self.max);
        self.position_text = format_duration(sample.position_at(self.progress, self.max));
    }

    /// End the drag and return the chosen seek value.
    pub fn stop_drag(&mut self) -> u32 {
        self.is_dragging = false;
        self.progress
    }

    pub fn reset(&mut self) {
        self.progress = 0;
        self.secondary_progress = 0;
        self.is_dragging = false;
        self.position_text = format_duration(Duration::ZERO);
        self.duration_text = format_duration(Duration::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(position: u64, duration: u64, buffered: u64) -> SampledTime {
        SampledTime {
            position: Duration::from_millis(position),
            duration: Duration::from_millis(duration),
            buffered_position: Duration::from_millis(buffered),
        }
    }

    #[test]
    fn test_update_sets_progress_and_labels() {
        let mut bar = SeekBar::new(1000);
        bar.update(&sample(25_000, 100_000, 40_000));
        assert_eq!(bar.progress(), 250);
        assert_eq!(bar.secondary_progress(), 400);
        assert_eq!(bar.position_text(), "0:25");
        assert_eq!(bar.duration_text(), "1:40");
    }

    #[test]
    fn test_drag_is_not_overwritten_by_polls() {
        let mut bar = SeekBar::new(1000);
        bar.update(&sample(10_000, 100_000, 20_000));
        bar.start_drag();
        bar.drag_to(800, &sample(10_000, 100_000, 20_000));
        assert_eq!(bar.position_text(), "1:20");

        bar.update(&sample(11_000, 100_000, 30_000));
        assert_eq!(bar.progress(), 800);
        assert_eq!(bar.position_text(), "1:20");
        // The buffered extent keeps moving.
        assert_eq!(bar.secondary_progress(), 300);

        assert_eq!(bar.stop_drag(), 800);
        bar.update(&sample(12_000, 100_000, 30_000));
        assert_eq!(bar.progress(), 120);
    }

    #[test]
    fn test_hidden_bar_only_updates_labels() {
        let mut bar = SeekBar::new(1000);
        bar.set_visible(false);
        bar.update(&sample(50_000, 100_000, 60_000));
        assert_eq!(bar.progress(), 0);
        assert_eq!(bar.position_text(), "0:50");
    }

    #[test]
    fn test_unknown_duration_keeps_previous_values() {
        let mut bar = SeekBar::new(1000);
        bar.update(&sample(50_000, 100_000, 60_000));
        bar.update(&sample(51_000, 0, 0));
        assert_eq!(bar.progress(), 500);
        assert_eq!(bar.duration_text(), "0:00");
    }
}
