use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::player::{ResumePoint, ResumeStore};

#[derive(Debug)]
enum ResumeCommand {
    Persist,
    Flush(oneshot::Sender<()>),
}

/// Persists resume offsets on one dedicated background thread. The
/// thread is started on first use and stopped by [`ResumeWorker::shutdown`];
/// a later `record` starts a fresh one.
///
/// Must not be driven from inside another tokio runtime.
pub struct ResumeWorker {
    store: Arc<dyn ResumeStore>,
    runtime: Option<Runtime>,
    sender: Option<mpsc::UnboundedSender<ResumeCommand>>,
    task: Option<JoinHandle<()>>,
}

impl ResumeWorker {
    pub fn new(store: Arc<dyn ResumeStore>) -> Self {
        Self {
            store,
            runtime: None,
            sender: None,
            task: None,
        }
    }

    pub fn store(&self) -> Arc<dyn ResumeStore> {
        self.store.clone()
    }

    pub fn is_running(&self) -> bool {
        self.runtime.is_some()
    }

    fn ensure_started(&mut self) -> Result<&mpsc::UnboundedSender<ResumeCommand>> {
        if self.sender.is_none() {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("slotplay-resume")
                .enable_all()
                .build()
                .context("Failed to start resume worker runtime")?;

            let (sender, receiver) = mpsc::unbounded_channel();
            let store = self.store.clone();
            self.task = Some(runtime.spawn(Self::run(store, receiver)));
            self.runtime = Some(runtime);
            self.sender = Some(sender);
            info!("Resume worker started");
        }
        self.sender
            .as_ref()
            .context("Resume worker channel missing after start")
    }

    async fn run(store: Arc<dyn ResumeStore>, mut receiver: mpsc::UnboundedReceiver<ResumeCommand>) {
        while let Some(command) = receiver.recv().await {
            match command {
                ResumeCommand::Persist => {
                    if let Err(e) = store.persist().await {
                        error!("Failed to persist resume offsets: {:#}", e);
                    }
                }
                ResumeCommand::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
        debug!("Resume worker channel closed");
    }

    /// Record a resume point and queue it for persistence. The store
    /// answers `get` with it as soon as this returns. Never blocks.
    pub fn record(&mut self, point: ResumePoint) {
        self.store.put(&point.content_id, point.position);
        debug!("Recorded resume offset {:?} for {}", point.position, point.content_id);

        let sender = match self.ensure_started() {
            Ok(sender) => sender,
            Err(e) => {
                error!("Resume offset for {} kept in memory only: {:#}", point.content_id, e);
                return;
            }
        };
        if sender.send(ResumeCommand::Persist).is_err() {
            error!("Resume worker stopped unexpectedly");
        }
    }

    /// Block until everything queued so far has been written.
    pub fn flush(&mut self) -> Result<()> {
        let (Some(runtime), Some(sender)) = (&self.runtime, &self.sender) else {
            return Ok(());
        };
        let (done_tx, done_rx) = oneshot::channel();
        sender
            .send(ResumeCommand::Flush(done_tx))
            .map_err(|_| anyhow::anyhow!("Resume worker is not running"))?;
        runtime
            .block_on(done_rx)
            .context("Resume worker dropped flush request")
    }

    /// Drain pending writes and stop the thread.
    pub fn shutdown(&mut self) {
        self.sender.take();
        if let Some(runtime) = self.runtime.take() {
            if let Some(task) = self.task.take()
                && let Err(e) = runtime.block_on(task)
            {
                error!("Resume worker task failed: {}", e);
            }
            runtime.shutdown_timeout(Duration::from_secs(1));
            info!("Resume worker stopped");
        }
    }
}

impl Drop for ResumeWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
