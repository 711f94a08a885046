use anyhow::{Context, Result};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use slotplay::{
    Clock, Config, ContentRequest, FileResumeStore, ManualClock, MemoryLayout, MemoryResumeStore,
    PlayOutcome, PlaybackCallback, PlayerError, PlayerManager, ResumeStore, ResumeWorker,
    SimulatedFactory, SurfaceId,
};

const DEMO_CONTENT: &str = "https://media.example.com/demo/stream.mpd";
const DEMO_DURATION: Duration = Duration::from_secs(600);
const TICK: Duration = Duration::from_millis(250);

/// Logs what a real host would react to.
struct LoggingCallback;

impl PlaybackCallback for LoggingCallback {
    fn on_play(&mut self, surface: SurfaceId) {
        info!("callback: play on {}", surface);
    }

    fn on_pause(&mut self, surface: SurfaceId) {
        info!("callback: pause on {}", surface);
    }

    fn on_fullscreen_change(&mut self, is_fullscreen: bool, surface: SurfaceId) {
        info!("callback: fullscreen={} on {}", is_fullscreen, surface);
    }

    fn on_error(&mut self, error: &PlayerError) {
        warn!("callback: playback error: {}", error);
    }
}

fn resume_worker(config: &Config) -> Result<Option<ResumeWorker>> {
    if !config.resume.enabled {
        return Ok(None);
    }
    let store: Arc<dyn ResumeStore> = match config.resume_store_path() {
        Ok(path) => Arc::new(
            FileResumeStore::open(&path)
                .with_context(|| format!("Failed to open resume store {}", path.display()))?,
        ),
        Err(e) => {
            warn!("No resume store location ({:#}), keeping offsets in memory", e);
            Arc::new(MemoryResumeStore::new())
        }
    };
    Ok(Some(ResumeWorker::new(store)))
}

fn run_for(manager: &mut PlayerManager<MemoryLayout>, clock: &ManualClock, span: Duration) {
    let end = clock.now() + span;
    while clock.now() < end {
        clock.advance(TICK);
        manager.run_pending();
    }
    if let Some(overlay) = manager.active_overlay() {
        info!(
            "t={:?} visible={} progress={} {} / {}",
            clock.now(),
            overlay.is_visible(),
            overlay.seek_bar().progress(),
            overlay.seek_bar().position_text(),
            overlay.seek_bar().duration_text()
        );
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("slotplay=debug")),
        )
        .init();

    info!("Starting slotplay demo");

    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {:#}", e);
        Config::default()
    });
    let content = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEMO_CONTENT.to_string());

    let clock = Rc::new(ManualClock::new());
    let factory = SimulatedFactory::new(clock.clone(), DEMO_DURATION);
    let worker = resume_worker(&config)?;
    let mut manager = PlayerManager::new(
        config,
        Box::new(factory),
        MemoryLayout::new(),
        clock.clone(),
        worker,
    );
    manager.set_callback(Box::new(LoggingCallback));

    let inline = manager.layout_mut().add_host();
    let fullscreen = manager.layout_mut().add_host();
    // A sibling so the inline insertion index has something to clamp against.
    manager.layout_mut().add_sibling(inline);

    let PlayOutcome::Started { surface } =
        manager.play(ContentRequest::new(inline, content.as_str()).at_index(5))?
    else {
        anyhow::bail!("expected a fresh start for {}", content);
    };
    manager.surface_attached(surface);
    manager.set_visibility(true);
    run_for(&mut manager, &clock, Duration::from_secs(2));

    // The user asks for fullscreen; the host answers with a play into its
    // fullscreen container, which hands the running engine over.
    manager.toggle_fullscreen();
    if let PlayOutcome::HandoffPending { shadow } =
        manager.play(ContentRequest::new(fullscreen, content.as_str()))?
    {
        manager.surface_attached(shadow);
        if let Some(outcome) = manager.surface_ready(shadow) {
            info!("Hand-off finished: {:?}", outcome);
        }
    }
    manager.set_visibility(true);
    run_for(&mut manager, &clock, Duration::from_secs(4));

    manager.start_drag();
    manager.drag_to(500);
    if let Some(target) = manager.stop_drag() {
        info!("Dragged to {:?}", target);
    }
    run_for(&mut manager, &clock, Duration::from_secs(1));

    manager.toggle_play_pause();
    run_for(&mut manager, &clock, Duration::from_secs(5));

    info!("Fullscreen container closed: {:?}", manager.host_detached(fullscreen));
    manager.shutdown();
    Ok(())
}
