//! Pointer device sink trait
//!
//! Defines the interface the pointer session drives: absolute cursor moves
//! and left button press/release. Platform implementations live next to
//! this module; the logging and recording sinks work everywhere.

use crate::processing::projection::PixelPoint;
use parking_lot::Mutex as ParkingMutex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Errors that can occur when driving the pointer
#[derive(Error, Debug)]
pub enum PointerError {
    #[error("Pointer output is not supported on this platform")]
    Unsupported,

    #[error("Platform error: {0}")]
    PlatformError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for pointer operations
pub type PointerResult<T> = Result<T, PointerError>;

/// Something that can move the cursor and click the left button
pub trait PointerSink: Send {
    /// Move the cursor to an absolute pixel position
    fn move_to(&mut self, point: PixelPoint) -> PointerResult<()>;

    /// Press the left button
    fn press(&mut self) -> PointerResult<()>;

    /// Release the left button
    fn release(&mut self) -> PointerResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum PointerCommand {
    MoveTo { x: i32, y: i32 },
    Press,
    Release,
}

/// Only logs commands. Used where no system pointer is available.
#[derive(Debug, Default)]
pub struct LoggingSink;

impl PointerSink for LoggingSink {
    fn move_to(&mut self, point: PixelPoint) -> PointerResult<()> {
        tracing::trace!("Move cursor to ({}, {})", point.x, point.y);
        Ok(())
    }

    fn press(&mut self) -> PointerResult<()> {
        tracing::debug!("Left button down");
        Ok(())
    }

    fn release(&mut self) -> PointerResult<()> {
        tracing::debug!("Left button up");
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedCommand {
    pub command: PointerCommand,
    pub process_time_ms: f64,
    pub unix_time_ms: i64,
}

/// Shared handle to the commands captured by a `RecordingSink`
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    commands: Arc<ParkingMutex<Vec<RecordedCommand>>>,
}

impl CommandLog {
    pub fn commands(&self) -> Vec<PointerCommand> {
        self.commands.lock().iter().map(|c| c.command).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.lock().is_empty()
    }

    pub fn clear(&self) {
        self.commands.lock().clear();
    }

    pub fn write_json(&self, path: &Path) -> PointerResult<()> {
        let data = serde_json::to_vec_pretty(&*self.commands.lock())?;
        std::fs::write(path, data)?;
        Ok(())
    }

    fn push(&self, command: RecordedCommand) {
        self.commands.lock().push(command);
    }
}

/// Captures every command with timestamps, optionally forwarding to another sink
pub struct RecordingSink {
    log: CommandLog,
    inner: Option<Box<dyn PointerSink>>,
    start_time: Instant,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            log: CommandLog::default(),
            inner: None,
            start_time: Instant::now(),
        }
    }

    /// Record commands and forward them to `inner`
    pub fn wrapping(inner: Box<dyn PointerSink>) -> Self {
        Self {
            inner: Some(inner),
            ..Self::new()
        }
    }

    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    fn record(&mut self, command: PointerCommand) -> PointerResult<()> {
        if let Some(inner) = self.inner.as_mut() {
            match command {
                PointerCommand::MoveTo { x, y } => inner.move_to(PixelPoint::new(x, y))?,
                PointerCommand::Press => inner.press()?,
                PointerCommand::Release => inner.release()?,
            }
        }

        self.log.push(RecordedCommand {
            command,
            process_time_ms: self.start_time.elapsed().as_secs_f64() * 1000.0,
            unix_time_ms: chrono::Utc::now().timestamp_millis(),
        });
        Ok(())
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerSink for RecordingSink {
    fn move_to(&mut self, point: PixelPoint) -> PointerResult<()> {
        self.record(PointerCommand::MoveTo {
            x: point.x,
            y: point.y,
        })
    }

    fn press(&mut self) -> PointerResult<()> {
        self.record(PointerCommand::Press)
    }

    fn release(&mut self) -> PointerResult<()> {
        self.record(PointerCommand::Release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    impl PointerSink for FailingSink {
        fn move_to(&mut self, _point: PixelPoint) -> PointerResult<()> {
            Err(PointerError::PlatformError("no display".to_string()))
        }

        fn press(&mut self) -> PointerResult<()> {
            Err(PointerError::Unsupported)
        }

        fn release(&mut self) -> PointerResult<()> {
            Err(PointerError::Unsupported)
        }
    }

    #[test]
    fn test_recording_sink_captures_in_order() {
        let mut sink = RecordingSink::new();
        let log = sink.log();

        sink.move_to(PixelPoint::new(10, 20)).unwrap();
        sink.press().unwrap();
        sink.release().unwrap();

        assert_eq!(
            log.commands(),
            vec![
                PointerCommand::MoveTo { x: 10, y: 20 },
                PointerCommand::Press,
                PointerCommand::Release,
            ]
        );
    }

    #[test]
    fn test_recording_sink_forwards_and_skips_failed_commands() {
        let mut sink = RecordingSink::wrapping(Box::new(FailingSink));
        let log = sink.log();

        assert!(sink.move_to(PixelPoint::new(1, 1)).is_err());
        assert!(log.is_empty());

        let mut inner = RecordingSink::new();
        let inner_log = inner.log();
        inner.press().unwrap();
        let mut outer = RecordingSink::wrapping(Box::new(inner));
        outer.release().unwrap();
        assert_eq!(inner_log.commands(), vec![PointerCommand::Press, PointerCommand::Release]);
        assert_eq!(outer.log().len(), 1);
    }

    #[test]
    fn test_command_log_writes_json() {
        let mut sink = RecordingSink::new();
        sink.move_to(PixelPoint::new(3, 4)).unwrap();
        sink.press().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commands.json");
        sink.log().write_json(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let recorded: Vec<RecordedCommand> = serde_json::from_str(&content).unwrap();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].command, PointerCommand::MoveTo { x: 3, y: 4 });
        assert!(content.contains("\"type\": \"moveTo\""));
        assert!(content.contains("processTimeMs"));
    }

    #[test]
    fn test_logging_sink_accepts_everything() {
        let mut sink = LoggingSink;
        assert!(sink.move_to(PixelPoint::new(0, 0)).is_ok());
        assert!(sink.press().is_ok());
        assert!(sink.release().is_ok());
    }
}
