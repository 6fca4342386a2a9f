//! Cursor smoothing for live hand tracking
//!
//! Raw projected positions jitter by several pixels per frame. The filter
//! keeps a window of recent frame-to-frame deltas and only admits a new
//! position once the hand is actually moving, then emits the mean of the
//! admitted positions. After a click gesture the cursor is frozen for a
//! cooldown period so the click motion does not drag it.

use crate::config::PointerConfig;
use crate::processing::window::SlidingWindow;
use crate::tracking::types::Vector;

/// Default number of positions averaged into the emitted cursor
pub const DEFAULT_POSITION_WINDOW: usize = 30;

/// Default number of deltas averaged for the motion gate
pub const DEFAULT_VELOCITY_WINDOW: usize = 10;

#[derive(Debug, Clone)]
pub struct CursorFilter {
    positions: SlidingWindow<Vector>,
    velocities: SlidingWindow<Vector>,
    last_position: Vector,
    motion_threshold: f64,
    cooldown: u32,
}

impl CursorFilter {
    pub fn new(position_window: usize, velocity_window: usize, motion_threshold: f64) -> Self {
        Self {
            positions: SlidingWindow::new(position_window),
            velocities: SlidingWindow::new(velocity_window),
            last_position: Vector::ZERO,
            motion_threshold,
            cooldown: 0,
        }
    }

    pub fn from_config(config: &PointerConfig) -> Self {
        Self::new(
            config.position_window,
            config.velocity_window,
            config.motion_threshold,
        )
    }

    /// Feed the latest raw position and return the smoothed cursor position
    pub fn update(&mut self, position: Vector) -> Vector {
        let delta = position - self.last_position;
        self.last_position = position;
        self.velocities.push(delta);

        let speed = self.mean_velocity().magnitude();
        if (speed > self.motion_threshold && self.cooldown == 0) || self.positions.is_empty() {
            self.positions.push(position);
        }

        self.cooldown = self.cooldown.saturating_sub(1);

        self.positions.mean().unwrap_or(position)
    }

    /// Freeze cursor motion for the next `frames` updates
    pub fn start_cooldown(&mut self, frames: u32) {
        self.cooldown = frames;
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn mean_velocity(&self) -> Vector {
        self.velocities.mean().unwrap_or(Vector::ZERO)
    }

    pub fn positions(&self) -> &SlidingWindow<Vector> {
        &self.positions
    }

    pub fn reset(&mut self) {
        self.positions.clear();
        self.velocities.clear();
        self.last_position = Vector::ZERO;
        self.cooldown = 0;
    }
}

impl Default for CursorFilter {
    fn default() -> Self {
        Self::new(DEFAULT_POSITION_WINDOW, DEFAULT_VELOCITY_WINDOW, 0.5)
    }
}
