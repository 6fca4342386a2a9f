//! Hand tracking input
//!
//! Data model for tracking frames plus the `TrackingSource` seam that feeds
//! them into the pointer pipeline.

pub mod replay;
pub mod source;
pub mod types;

pub use replay::ReplaySource;
pub use source::{TrackingError, TrackingEvent, TrackingResult, TrackingSource};
pub use types::{Finger, FingerKind, Hand, Screen, TrackingFrame, Vector};
