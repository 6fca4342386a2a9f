//! Per-frame gesture to cursor processing
//!
//! `PointerSession` owns all state that survives between frames: the
//! smoothing windows, the click detector, the cooldown counter and whether
//! the left button is currently held. Each call to `process_frame` reads one
//! tracking frame and drives the pointer sink.

use crate::config::PointerConfig;
use crate::output::sink::PointerSink;
use crate::processing::click::{ClickAction, ClickDetector};
use crate::processing::cursor_smoothing::CursorFilter;
use crate::processing::projection::{PixelPoint, Projector};
use crate::tracking::types::TrackingFrame;
use serde::Serialize;

/// Why a frame produced no pointer output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    NoHand,
    NoScreen,
    DegenerateProjection,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoHand => write!(f, "no hand"),
            SkipReason::NoScreen => write!(f, "no valid screen"),
            SkipReason::DegenerateProjection => write!(f, "degenerate projection"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedFrame {
    /// Smoothed cursor position sent to the sink
    pub cursor: PixelPoint,
    /// Button transition actually issued this frame
    pub click: Option<ClickAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameOutcome {
    SkipFrame(SkipReason),
    Processed(ProcessedFrame),
}

impl FrameOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, FrameOutcome::SkipFrame(_))
    }
}

#[derive(Debug, Clone)]
pub struct PointerSession {
    projector: Projector,
    filter: CursorFilter,
    clicks: ClickDetector,
    cooldown_frames: u32,
    button_down: bool,
}

impl PointerSession {
    pub fn new(config: &PointerConfig) -> Self {
        Self {
            projector: Projector::new(config),
            filter: CursorFilter::from_config(config),
            clicks: ClickDetector::from_config(&config.click),
            cooldown_frames: config.cooldown_frames,
            button_down: false,
        }
    }

    /// Process one tracking frame.
    ///
    /// Uses the first hand and the first screen of the frame. Click commands
    /// are issued before the cursor move. Sink failures are logged and do
    /// not affect later frames.
    pub fn process_frame(&mut self, frame: &TrackingFrame, sink: &mut dyn PointerSink) -> FrameOutcome {
        let Some(hand) = frame.hands.first() else {
            return FrameOutcome::SkipFrame(SkipReason::NoHand);
        };

        let Some(screen) = frame.screens.first().filter(|s| s.is_valid) else {
            return FrameOutcome::SkipFrame(SkipReason::NoScreen);
        };

        let Some(target) = self.projector.project(hand, screen) else {
            return FrameOutcome::SkipFrame(SkipReason::DegenerateProjection);
        };

        let mut click = None;
        if hand.fingers.len() > 1 {
            if let Some(action) = self.clicks.detect(hand, self.button_down) {
                // Freeze the cursor while the click motion plays out
                self.filter.start_cooldown(self.cooldown_frames);
                let issued = match action {
                    ClickAction::Press => self.press(sink),
                    ClickAction::Release => self.release(sink),
                };
                if issued {
                    click = Some(action);
                }
            }
        }

        let cursor = PixelPoint::from_vector(self.filter.update(target.to_vector()));
        if let Err(e) = sink.move_to(cursor) {
            tracing::warn!("Failed to move cursor to ({}, {}): {}", cursor.x, cursor.y, e);
        }

        FrameOutcome::Processed(ProcessedFrame { cursor, click })
    }

    /// Press the left button unless it is already down.
    /// Returns whether a press was issued.
    pub fn press(&mut self, sink: &mut dyn PointerSink) -> bool {
        if self.button_down {
            return false;
        }

        match sink.press() {
            Ok(()) => {
                tracing::info!("Down");
                self.button_down = true;
                true
            }
            Err(e) => {
                tracing::warn!("Failed to press left button: {}", e);
                false
            }
        }
    }

    /// Release the left button unless it is already up.
    /// Returns whether a release was issued.
    pub fn release(&mut self, sink: &mut dyn PointerSink) -> bool {
        if !self.button_down {
            return false;
        }

        match sink.release() {
            Ok(()) => {
                tracing::info!("Up");
                self.button_down = false;
                true
            }
            Err(e) => {
                tracing::warn!("Failed to release left button: {}", e);
                false
            }
        }
    }

    pub fn is_button_down(&self) -> bool {
        self.button_down
    }

    pub fn cooldown(&self) -> u32 {
        self.filter.cooldown()
    }

    pub fn filter(&self) -> &CursorFilter {
        &self.filter
    }
}
