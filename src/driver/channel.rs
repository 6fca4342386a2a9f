//! Tracking channel
//!
//! Connects a tracking source to the pointer session on a dedicated frame
//! loop thread, and manages its start/stop lifecycle.

use crate::config::PointerConfig;
use crate::output::sink::{CommandLog, PointerSink, RecordingSink};
use crate::processing::session::{FrameOutcome, PointerSession};
use crate::tracking::source::{TrackingError, TrackingEvent, TrackingSource};
use async_trait::async_trait;
use parking_lot::Mutex as ParkingMutex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Notify;
use uuid::Uuid;

/// Errors that can occur while running a tracking channel
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Already running")]
    AlreadyRunning,

    #[error("Not initialized")]
    NotInitialized,

    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Frame loop thread panicked")]
    ThreadPanicked,

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Result type for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Trait for tracking channels
///
/// A channel owns a tracking source and a pointer sink and forwards frames
/// between them while running.
#[async_trait]
pub trait TrackingChannel: Send + Sync {
    /// Get the channel identifier
    fn id(&self) -> &str;

    /// Prepare the channel (output directories, lifecycle logging)
    async fn initialize(&mut self) -> ChannelResult<()>;

    /// Start forwarding frames
    async fn start(&mut self) -> ChannelResult<()>;

    /// Stop forwarding frames and flush outputs
    async fn stop(&mut self) -> ChannelResult<()>;

    /// Check if the frame loop is running
    fn is_running(&self) -> bool;

    /// Get output files created by this channel
    fn output_files(&self) -> Vec<String>;
}

/// Frame counters shared with the frame loop thread
#[derive(Debug, Default)]
pub struct FrameStats {
    processed: AtomicU64,
    skipped: AtomicU64,
    errors: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameCounts {
    pub processed: u64,
    pub skipped: u64,
    pub errors: u64,
}

impl FrameStats {
    pub fn snapshot(&self) -> FrameCounts {
        FrameCounts {
            processed: self.processed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.processed.store(0, Ordering::Relaxed);
        self.skipped.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
    }
}

type LoopParts = (Box<dyn TrackingSource>, Box<dyn PointerSink>);

/// Source and sink, held by the channel while idle and by the frame loop
/// while it runs
type PartsSlot = Arc<ParkingMutex<Option<LoopParts>>>;

pub struct GestureChannel {
    id: String,
    session_id: Uuid,
    is_running: Arc<AtomicBool>,
    loop_finished: Arc<Notify>,
    initialized: bool,
    poll_interval: Duration,
    record_dir: Option<PathBuf>,
    output_files: Vec<String>,

    session: Arc<ParkingMutex<PointerSession>>,
    parts: PartsSlot,
    command_log: Option<CommandLog>,
    stats: Arc<FrameStats>,

    thread_handle: ParkingMutex<Option<std::thread::JoinHandle<()>>>,
}

impl GestureChannel {
    pub fn new(
        config: &PointerConfig,
        source: Box<dyn TrackingSource>,
        sink: Box<dyn PointerSink>,
    ) -> Self {
        let (sink, command_log): (Box<dyn PointerSink>, Option<CommandLog>) =
            if config.sink.record_dir.is_some() {
                let recording = RecordingSink::wrapping(sink);
                let log = recording.log();
                (Box::new(recording), Some(log))
            } else {
                (sink, None)
            };

        Self {
            id: "gesture".to_string(),
            session_id: Uuid::new_v4(),
            is_running: Arc::new(AtomicBool::new(false)),
            loop_finished: Arc::new(Notify::new()),
            initialized: false,
            poll_interval: Duration::from_millis(config.source.poll_interval_ms),
            record_dir: config.sink.record_dir.clone(),
            output_files: Vec::new(),
            session: Arc::new(ParkingMutex::new(PointerSession::new(config))),
            parts: Arc::new(ParkingMutex::new(Some((source, sink)))),
            command_log,
            stats: Arc::new(FrameStats::default()),
            thread_handle: ParkingMutex::new(None),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Shared pointer session, locked by the frame loop for each frame
    pub fn session(&self) -> Arc<ParkingMutex<PointerSession>> {
        self.session.clone()
    }

    pub fn stats(&self) -> FrameCounts {
        self.stats.snapshot()
    }

    /// Resolves once the frame loop has stopped on its own or been stopped
    pub async fn wait_for_source_end(&self) {
        loop {
            // Registered before the flag check so an exit in between still wakes us
            let finished = self.loop_finished.notified();
            if !self.is_running.load(Ordering::SeqCst) {
                return;
            }
            finished.await;
        }
    }

    /// Validate state and hand the frame loop to `spawn`.
    ///
    /// The running flag is raised before `spawn` so the loop sees it on its
    /// first check, and lowered again if `spawn` fails. The source and sink
    /// stay in the slot until the thread takes them, so a failed spawn
    /// leaves the channel ready to start again.
    fn launch<F>(&mut self, spawn: F) -> ChannelResult<()>
    where
        F: FnOnce(FrameLoop) -> std::io::Result<std::thread::JoinHandle<()>>,
    {
        if !self.initialized {
            return Err(ChannelError::NotInitialized);
        }
        if self.is_running.load(Ordering::SeqCst) || self.thread_handle.lock().is_some() {
            return Err(ChannelError::AlreadyRunning);
        }
        if self.parts.lock().is_none() {
            return Err(ChannelError::ConfigurationError(
                "Tracking source and pointer sink missing".to_string(),
            ));
        }

        self.output_files.clear();
        if let Some(log) = &self.command_log {
            log.clear();
        }
        self.stats.reset();

        let frame_loop = FrameLoop {
            parts: self.parts.clone(),
            session: self.session.clone(),
            is_running: self.is_running.clone(),
            finished: self.loop_finished.clone(),
            stats: self.stats.clone(),
            poll_interval: self.poll_interval,
        };

        self.is_running.store(true, Ordering::SeqCst);
        match spawn(frame_loop) {
            Ok(handle) => {
                *self.thread_handle.lock() = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.is_running.store(false, Ordering::SeqCst);
                self.loop_finished.notify_waiters();
                tracing::error!("Failed to spawn frame loop: {}", e);
                Err(e.into())
            }
        }
    }

    fn flush_commands(&mut self) -> ChannelResult<()> {
        let (Some(dir), Some(log)) = (self.record_dir.as_ref(), self.command_log.as_ref()) else {
            return Ok(());
        };

        let path = dir.join(format!("{}-pointer-commands.json", self.session_id));
        log.write_json(&path)?;
        self.output_files.push(path.to_string_lossy().to_string());
        Ok(())
    }
}

#[async_trait]
impl TrackingChannel for GestureChannel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn initialize(&mut self) -> ChannelResult<()> {
        if let Some(dir) = &self.record_dir {
            std::fs::create_dir_all(dir)?;
        }
        self.initialized = true;

        tracing::info!("Initialized (session={})", self.session_id);
        Ok(())
    }

    async fn start(&mut self) -> ChannelResult<()> {
        self.launch(spawn_frame_loop)?;

        tracing::info!("Tracking channel started");
        Ok(())
    }

    async fn stop(&mut self) -> ChannelResult<()> {
        self.is_running.store(false, Ordering::SeqCst);

        let Some(handle) = self.thread_handle.lock().take() else {
            return Ok(());
        };

        tokio::task::spawn_blocking(move || handle.join())
            .await
            .map_err(|_| ChannelError::ThreadPanicked)?
            .map_err(|_| ChannelError::ThreadPanicked)?;

        self.flush_commands()?;

        let counts = self.stats.snapshot();
        tracing::info!(
            "Exited (processed={}, skipped={}, errors={})",
            counts.processed,
            counts.skipped,
            counts.errors
        );
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    fn output_files(&self) -> Vec<String> {
        self.output_files.clone()
    }
}

/// State moved onto the frame loop thread
struct FrameLoop {
    parts: PartsSlot,
    session: Arc<ParkingMutex<PointerSession>>,
    is_running: Arc<AtomicBool>,
    finished: Arc<Notify>,
    stats: Arc<FrameStats>,
    poll_interval: Duration,
}

impl FrameLoop {
    /// Take the source and sink, pump frames until stopped or exhausted, then
    /// put them back and signal the exit.
    fn run(self) {
        let taken = self.parts.lock().take();
        if let Some((mut source, mut sink)) = taken {
            self.pump(source.as_mut(), sink.as_mut());
            *self.parts.lock() = Some((source, sink));
        }

        self.is_running.store(false, Ordering::SeqCst);
        self.finished.notify_waiters();
        tracing::info!("Frame loop stopped");
    }

    /// Each tick pulls events until one frame has been processed or the
    /// source has nothing pending, then sleeps out the rest of
    /// `poll_interval`.
    fn pump(&self, source: &mut dyn TrackingSource, sink: &mut dyn PointerSink) {
        tracing::info!(
            "Frame loop started (source={}, poll_interval={:?})",
            source.name(),
            self.poll_interval
        );

        while self.is_running.load(Ordering::Relaxed) {
            let loop_start = Instant::now();

            loop {
                match source.next_event() {
                    Ok(Some(TrackingEvent::Connected)) => tracing::info!("Connected"),
                    Ok(Some(TrackingEvent::Disconnected)) => tracing::info!("Disconnected"),
                    Ok(Some(TrackingEvent::Frame(frame))) => {
                        let outcome = self.session.lock().process_frame(&frame, sink);
                        match outcome {
                            FrameOutcome::SkipFrame(reason) => {
                                tracing::trace!("Skipped frame {}: {}", frame.id, reason);
                                self.stats.skipped.fetch_add(1, Ordering::Relaxed);
                            }
                            FrameOutcome::Processed(_) => {
                                self.stats.processed.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                        break;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!("Dropped tracking event: {}", e);
                        self.stats.errors.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                }
            }

            if source.is_exhausted() {
                tracing::info!("Tracking source {} has no more events", source.name());
                break;
            }

            let elapsed = loop_start.elapsed();
            if elapsed < self.poll_interval {
                std::thread::sleep(self.poll_interval - elapsed);
            }
        }
    }
}

fn spawn_frame_loop(frame_loop: FrameLoop) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("gesture-frame-loop".to_string())
        .spawn(move || frame_loop.run())
}
