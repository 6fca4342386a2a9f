//! Click gesture detection
//!
//! Exactly one strategy is active per session, chosen by
//! `ClickConfig::strategy`:
//!
//! * velocity outlier: a single fingertip moving vertically much faster
//!   than the rest of the hand. Moving down presses, moving up releases.
//! * pinch: the thumb and index fingertips closing in on each other
//!   presses, opening again releases.

use crate::config::{ClickConfig, ClickStrategy};
use crate::processing::window::SlidingWindow;
use crate::tracking::types::{Finger, FingerKind, Hand};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClickAction {
    Press,
    Release,
}

#[derive(Debug, Clone)]
pub struct VelocityOutlierDetector {
    deviation_threshold: f64,
    outlier_ratio: f64,
}

impl VelocityOutlierDetector {
    pub fn new(deviation_threshold: f64, outlier_ratio: f64) -> Self {
        Self {
            deviation_threshold,
            outlier_ratio,
        }
    }

    pub fn detect(&self, fingers: &[Finger]) -> Option<ClickAction> {
        if fingers.len() < 2 {
            return None;
        }

        let count = fingers.len() as f64;
        let mean = fingers.iter().map(|f| f.tip_velocity.y).sum::<f64>() / count;
        let variance = fingers
            .iter()
            .map(|f| (f.tip_velocity.y - mean).powi(2))
            .sum::<f64>()
            / count;
        let deviation = variance.sqrt();

        if deviation <= self.deviation_threshold {
            return None;
        }

        let (acting, spread) = fingers
            .iter()
            .map(|f| (f, (f.tip_velocity.y - mean).abs() / deviation))
            .max_by(|a, b| a.1.total_cmp(&b.1))?;

        if spread <= self.outlier_ratio {
            return None;
        }

        tracing::debug!(
            "Finger {} is the acting digit (vy={:.1}, spread={:.2})",
            acting.id,
            acting.tip_velocity.y,
            spread
        );

        if acting.tip_velocity.y < 0.0 {
            Some(ClickAction::Press)
        } else {
            Some(ClickAction::Release)
        }
    }
}

#[derive(Debug, Clone)]
pub struct PinchDetector {
    distances: SlidingWindow<f64>,
    thumb_speeds: SlidingWindow<f64>,
    trigger_distance: f64,
    thumb_speed_threshold: f64,
}

impl PinchDetector {
    pub fn new(window: usize, trigger_distance: f64, thumb_speed_threshold: f64) -> Self {
        Self {
            distances: SlidingWindow::new(window),
            thumb_speeds: SlidingWindow::new(window),
            trigger_distance,
            thumb_speed_threshold,
        }
    }

    /// Compare the current thumb/index distance against the windowed average.
    ///
    /// A press clears the distance window so the next frames cannot
    /// immediately re-trigger against the pre-pinch average.
    pub fn detect(&mut self, hand: &Hand, button_down: bool) -> Option<ClickAction> {
        let thumb = hand.finger(FingerKind::Thumb)?;
        let index = hand.finger(FingerKind::Index)?;

        let distance = thumb.tip_position.distance_to(index.tip_position);
        self.thumb_speeds.push(thumb.tip_velocity.magnitude());
        let thumb_speed = self.thumb_speeds.mean().unwrap_or(0.0);

        let average = self.distances.mean();
        self.distances.push(distance);
        let average = average?;

        let moving = thumb_speed > self.thumb_speed_threshold;

        if !button_down && moving && distance <= average - self.trigger_distance {
            self.distances.clear();
            return Some(ClickAction::Press);
        }

        if button_down && moving && distance > average {
            return Some(ClickAction::Release);
        }

        None
    }

    pub fn distances(&self) -> &SlidingWindow<f64> {
        &self.distances
    }
}

#[derive(Debug, Clone)]
pub enum ClickDetector {
    VelocityOutlier(VelocityOutlierDetector),
    Pinch(PinchDetector),
    Disabled,
}

impl ClickDetector {
    pub fn from_config(config: &ClickConfig) -> Self {
        match config.strategy {
            ClickStrategy::VelocityOutlier => ClickDetector::VelocityOutlier(
                VelocityOutlierDetector::new(config.velocity_deviation_threshold, config.outlier_ratio),
            ),
            ClickStrategy::Pinch => ClickDetector::Pinch(PinchDetector::new(
                config.pinch_window,
                config.pinch_trigger_distance,
                config.pinch_thumb_speed,
            )),
            ClickStrategy::Disabled => ClickDetector::Disabled,
        }
    }

    pub fn detect(&mut self, hand: &Hand, button_down: bool) -> Option<ClickAction> {
        match self {
            ClickDetector::VelocityOutlier(detector) => detector.detect(&hand.fingers),
            ClickDetector::Pinch(detector) => detector.detect(hand, button_down),
            ClickDetector::Disabled => None,
        }
    }
}
