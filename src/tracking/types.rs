use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// 3D vector in tracking space (millimetres for positions, mm/s for velocities)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: Vector) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: Vector) -> Vector {
        Vector::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn magnitude(&self) -> f64 {
        self.dot(*self).sqrt()
    }

    pub fn distance_to(&self, other: Vector) -> f64 {
        (*self - other).magnitude()
    }

    /// Unit vector in the same direction, or zero for a zero-length vector
    pub fn normalized(&self) -> Vector {
        let magnitude = self.magnitude();
        if magnitude <= f64::EPSILON {
            return Vector::ZERO;
        }
        *self / magnitude
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        Vector::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f64> for Vector {
    type Output = Vector;

    fn div(self, rhs: f64) -> Vector {
        Vector::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FingerKind {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finger {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub kind: FingerKind,
    pub tip_position: Vector,
    pub tip_velocity: Vector,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hand {
    #[serde(default)]
    pub id: i32,
    pub palm_position: Vector,
    /// Direction from the palm towards the fingers
    pub direction: Vector,
    #[serde(default)]
    pub palm_velocity: Vector,
    #[serde(default)]
    pub fingers: Vec<Finger>,
}

impl Hand {
    pub fn finger(&self, kind: FingerKind) -> Option<&Finger> {
        self.fingers.iter().find(|f| f.kind == kind)
    }
}

/// Calibrated display surface as reported by the tracking controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    #[serde(default)]
    pub id: u32,
    #[serde(default = "default_valid")]
    pub is_valid: bool,
    pub bottom_left_corner: Vector,
    pub horizontal_axis: Vector,
    pub vertical_axis: Vector,
    pub width_pixels: u32,
    pub height_pixels: u32,
}

fn default_valid() -> bool {
    true
}

impl Screen {
    /// Unit normal of the screen plane (horizontal x vertical)
    pub fn normal(&self) -> Vector {
        self.horizontal_axis.cross(self.vertical_axis).normalized()
    }

    /// Unsigned distance from `point` to the screen plane
    pub fn distance_to_point(&self, point: Vector) -> f64 {
        (point - self.bottom_left_corner).dot(self.normal()).abs()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingFrame {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub timestamp_us: i64,
    #[serde(default)]
    pub hands: Vec<Hand>,
    #[serde(default)]
    pub screens: Vec<Screen>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_ops() {
        let a = Vector::new(1.0, 2.0, 3.0);
        let b = Vector::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, Vector::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vector::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, Vector::new(2.0, 4.0, 6.0));
        assert_eq!(a.dot(b), 32.0);
        assert_eq!(
            Vector::new(1.0, 0.0, 0.0).cross(Vector::new(0.0, 1.0, 0.0)),
            Vector::new(0.0, 0.0, 1.0)
        );
        assert_eq!(Vector::new(3.0, 4.0, 0.0).magnitude(), 5.0);
        assert_eq!(Vector::ZERO.normalized(), Vector::ZERO);
    }

    #[test]
    fn test_screen_normal_and_distance() {
        let screen = Screen {
            id: 0,
            is_valid: true,
            bottom_left_corner: Vector::new(-200.0, 100.0, -100.0),
            horizontal_axis: Vector::new(400.0, 0.0, 0.0),
            vertical_axis: Vector::new(0.0, 250.0, 0.0),
            width_pixels: 1920,
            height_pixels: 1080,
        };

        assert_eq!(screen.normal(), Vector::new(0.0, 0.0, 1.0));
        assert_eq!(screen.distance_to_point(Vector::new(0.0, 200.0, 50.0)), 150.0);
    }

    #[test]
    fn test_frame_deserializes_with_defaults() {
        let json = r#"{
            "hands": [{
                "palmPosition": {"x": 0.0, "y": 150.0, "z": 0.0},
                "direction": {"x": 0.0, "y": 0.0, "z": -1.0},
                "fingers": [{
                    "kind": "thumb",
                    "tipPosition": {"x": 10.0, "y": 150.0, "z": 0.0},
                    "tipVelocity": {"x": 0.0, "y": 0.0, "z": 0.0}
                }]
            }]
        }"#;

        let frame: TrackingFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.hands.len(), 1);
        assert!(frame.screens.is_empty());
        assert_eq!(frame.hands[0].fingers[0].kind, FingerKind::Thumb);
        assert!(frame.hands[0].finger(FingerKind::Index).is_none());
        assert_eq!(frame.hands[0].palm_velocity, Vector::ZERO);
    }
}
