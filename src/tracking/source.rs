//! Tracking source trait
//!
//! Defines the interface through which tracking frames reach the pointer
//! pipeline. The vendor SDK (or a recorded replay) sits behind it.

use crate::tracking::types::TrackingFrame;
use thiserror::Error;

/// Errors that can occur while pulling events from a tracking source
#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed frame on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for tracking operations
pub type TrackingResult<T> = Result<T, TrackingError>;

/// Events produced by a tracking controller
#[derive(Debug, Clone)]
pub enum TrackingEvent {
    /// The controller became available
    Connected,
    /// The controller went away
    Disconnected,
    /// A new frame of tracking data
    Frame(TrackingFrame),
}

/// A producer of tracking events.
///
/// Sources are polled from the frame loop thread; `Ok(None)` means no event
/// is ready yet and the loop should wait for the next poll.
pub trait TrackingSource: Send {
    /// Human readable name for logs
    fn name(&self) -> &str;

    /// Pull the next pending event, if any
    fn next_event(&mut self) -> TrackingResult<Option<TrackingEvent>>;

    /// Whether the source will never produce another event
    fn is_exhausted(&self) -> bool {
        false
    }
}
