//! Processing module for live gesture to cursor mapping
//!
//! This module contains the projection of tracked hands onto the screen,
//! cursor smoothing, click gesture detection and the per-frame session that
//! ties them together.

pub mod click;
pub mod cursor_smoothing;
pub mod projection;
pub mod session;
pub mod window;

pub use click::{ClickAction, ClickDetector};
pub use cursor_smoothing::CursorFilter;
pub use projection::{PixelPoint, Projector, ScreenRatio};
pub use session::{FrameOutcome, PointerSession, ProcessedFrame, SkipReason};
pub use window::SlidingWindow;
