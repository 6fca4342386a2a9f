//! Mapping of tracked hands onto screen pixels
//!
//! Two methods are supported: casting a ray from the palm along the hand
//! direction onto the calibrated screen plane, and scaling the palm position
//! by its depth in front of the screen (frustum).

use crate::config::{FrustumConfig, PointerConfig, ProjectionMethod, Recalibration};
use crate::tracking::types::{Hand, Screen, Vector};
use serde::{Deserialize, Serialize};

/// Denominators below this are treated as zero
pub const DEGENERATE_EPSILON: f64 = 1e-6;

/// Absolute cursor position in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Truncate a pixel-space vector (z ignored)
    pub fn from_vector(v: Vector) -> Self {
        Self {
            x: v.x as i32,
            y: v.y as i32,
        }
    }

    pub fn to_vector(self) -> Vector {
        Vector::new(self.x as f64, self.y as f64, 0.0)
    }
}

/// Position relative to the screen, nominally in [0, 1] with y growing upward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRatio {
    pub x: f64,
    pub y: f64,
}

impl ScreenRatio {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Recalibration {
    pub fn apply(&self, ratio: ScreenRatio) -> ScreenRatio {
        ScreenRatio {
            x: (ratio.x - 0.5) * self.scale_x + self.offset_x,
            y: (ratio.y - 0.5) * self.scale_y + self.offset_y,
        }
    }
}

/// Point where the ray `origin + t * direction` crosses the plane.
///
/// Returns `None` when the ray runs parallel to the plane.
pub fn ray_plane_intersection(
    origin: Vector,
    direction: Vector,
    plane_point: Vector,
    plane_normal: Vector,
) -> Option<Vector> {
    let denominator = direction.dot(plane_normal);
    if denominator.abs() < DEGENERATE_EPSILON {
        return None;
    }

    let distance = (plane_point - origin).dot(plane_normal) / denominator;
    Some(origin + direction * distance)
}

/// Project `point` onto the screen axes, as a fraction of each axis length
pub fn screen_ratios(point: Vector, screen: &Screen) -> Option<ScreenRatio> {
    let width = screen.horizontal_axis.magnitude();
    let height = screen.vertical_axis.magnitude();
    if width < DEGENERATE_EPSILON || height < DEGENERATE_EPSILON {
        return None;
    }

    let relative = point - screen.bottom_left_corner;
    Some(ScreenRatio {
        x: relative.dot(screen.horizontal_axis.normalized()) / width,
        y: relative.dot(screen.vertical_axis.normalized()) / height,
    })
}

/// Convert screen ratios to pixels, clamped to the screen bounds.
///
/// Pixel y grows downward while ratio y grows upward, so the vertical axis
/// is flipped.
pub fn to_screen(ratio: ScreenRatio, width_pixels: u32, height_pixels: u32) -> PixelPoint {
    let width = width_pixels as f64;
    let height = height_pixels as f64;

    let x = (ratio.x * width).clamp(0.0, width);
    let y = (height - ratio.y * height).clamp(0.0, height);

    PixelPoint {
        x: x as i32,
        y: y as i32,
    }
}

/// Palm ray cast onto the screen plane, recalibrated
pub fn palm_ray_position(
    hand: &Hand,
    screen: &Screen,
    recalibration: &Recalibration,
) -> Option<PixelPoint> {
    let intersection = ray_plane_intersection(
        hand.palm_position,
        hand.direction,
        screen.bottom_left_corner,
        screen.normal(),
    )?;

    let ratio = recalibration.apply(screen_ratios(intersection, screen)?);
    Some(to_screen(ratio, screen.width_pixels, screen.height_pixels))
}

/// Palm position scaled by its depth in front of the screen
pub fn frustum_position(hand: &Hand, screen: &Screen, frustum: &FrustumConfig) -> Option<PixelPoint> {
    let distance = screen.distance_to_point(hand.palm_position) + frustum.depth_offset;
    let scale = 1.0 - distance / frustum.depth_range;
    if scale.abs() < DEGENERATE_EPSILON {
        return None;
    }

    let width = screen.horizontal_axis.magnitude();
    let height = screen.vertical_axis.magnitude();
    if width < DEGENERATE_EPSILON || height < DEGENERATE_EPSILON {
        return None;
    }

    let scaled = hand.palm_position / scale;
    let ratio = ScreenRatio {
        x: scaled.x / width + 0.5,
        y: scaled.y / height - 1.0,
    };

    Some(to_screen(ratio, screen.width_pixels, screen.height_pixels))
}

/// Projection stage configured from `PointerConfig`
#[derive(Debug, Clone)]
pub struct Projector {
    method: ProjectionMethod,
    recalibration: Recalibration,
    frustum: FrustumConfig,
}

impl Projector {
    pub fn new(config: &PointerConfig) -> Self {
        Self {
            method: config.projection,
            recalibration: config.recalibration,
            frustum: config.frustum,
        }
    }

    pub fn method(&self) -> ProjectionMethod {
        self.method
    }

    /// Target pixel for `hand`, `None` if the geometry is degenerate
    pub fn project(&self, hand: &Hand, screen: &Screen) -> Option<PixelPoint> {
        match self.method {
            ProjectionMethod::PalmRay => palm_ray_position(hand, screen, &self.recalibration),
            ProjectionMethod::Frustum => frustum_position(hand, screen, &self.frustum),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_screen() -> Screen {
        Screen {
            id: 0,
            is_valid: true,
            bottom_left_corner: Vector::new(-200.0, 100.0, 0.0),
            horizontal_axis: Vector::new(400.0, 0.0, 0.0),
            vertical_axis: Vector::new(0.0, 300.0, 0.0),
            width_pixels: 1920,
            height_pixels: 1080,
        }
    }

    fn hand_at(position: Vector, direction: Vector) -> Hand {
        Hand {
            id: 1,
            palm_position: position,
            direction,
            palm_velocity: Vector::ZERO,
            fingers: vec![],
        }
    }

    #[test]
    fn test_ray_plane_axis_aligned() {
        let hit = ray_plane_intersection(
            Vector::new(0.0, 0.0, 10.0),
            Vector::new(0.0, 0.0, -1.0),
            Vector::ZERO,
            Vector::new(0.0, 0.0, 1.0),
        );
        assert_eq!(hit, Some(Vector::ZERO));
    }

    #[test]
    fn test_ray_plane_oblique() {
        let hit = ray_plane_intersection(
            Vector::new(5.0, 2.0, 10.0),
            Vector::new(1.0, 0.0, -1.0),
            Vector::ZERO,
            Vector::new(0.0, 0.0, 1.0),
        );
        assert_eq!(hit, Some(Vector::new(15.0, 2.0, 0.0)));
    }

    #[test]
    fn test_ray_parallel_to_plane_is_degenerate() {
        let hit = ray_plane_intersection(
            Vector::new(0.0, 0.0, 10.0),
            Vector::new(1.0, 0.0, 0.0),
            Vector::ZERO,
            Vector::new(0.0, 0.0, 1.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_to_screen_inverts_vertical_axis() {
        assert_eq!(to_screen(ScreenRatio::new(0.5, 0.0), 1920, 1080), PixelPoint::new(960, 1080));
        assert_eq!(to_screen(ScreenRatio::new(0.5, 1.0), 1920, 1080), PixelPoint::new(960, 0));
    }

    #[test]
    fn test_to_screen_clamps() {
        assert_eq!(to_screen(ScreenRatio::new(-0.2, 1.3), 1000, 1000), PixelPoint::new(0, 0));
        assert_eq!(to_screen(ScreenRatio::new(1.5, -0.5), 1000, 1000), PixelPoint::new(1000, 1000));
    }

    #[test]
    fn test_screen_ratios() {
        let screen = test_screen();
        let ratio = screen_ratios(Vector::new(0.0, 250.0, 0.0), &screen).unwrap();
        assert_eq!(ratio, ScreenRatio::new(0.5, 0.5));

        let corner = screen_ratios(screen.bottom_left_corner, &screen).unwrap();
        assert_eq!(corner, ScreenRatio::new(0.0, 0.0));
    }

    #[test]
    fn test_screen_ratios_zero_axis() {
        let mut screen = test_screen();
        screen.vertical_axis = Vector::ZERO;
        assert!(screen_ratios(Vector::ZERO, &screen).is_none());
    }

    #[test]
    fn test_recalibration() {
        let ratio = Recalibration::default().apply(ScreenRatio::new(0.5, 0.5));
        assert!((ratio.x - 0.3).abs() < 1e-12);
        assert!((ratio.y - 0.5).abs() < 1e-12);

        let ratio = Recalibration::default().apply(ScreenRatio::new(1.0, 1.0));
        assert!((ratio.x - 1.15).abs() < 1e-12);
        assert!((ratio.y - 1.25).abs() < 1e-12);

        let identity = Recalibration::identity().apply(ScreenRatio::new(0.25, 0.75));
        assert_eq!(identity, ScreenRatio::new(0.25, 0.75));
    }

    #[test]
    fn test_palm_ray_hits_screen_centre() {
        let hand = hand_at(Vector::new(0.0, 250.0, 100.0), Vector::new(0.0, 0.0, -1.0));
        let pixel = palm_ray_position(&hand, &test_screen(), &Recalibration::identity());
        assert_eq!(pixel, Some(PixelPoint::new(960, 540)));
    }

    #[test]
    fn test_palm_ray_with_default_recalibration() {
        let hand = hand_at(Vector::new(0.0, 250.0, 100.0), Vector::new(0.0, 0.0, -1.0));
        let pixel = palm_ray_position(&hand, &test_screen(), &Recalibration::default()).unwrap();
        assert!((pixel.x - 576).abs() <= 1, "x = {}", pixel.x);
        assert_eq!(pixel.y, 540);
    }

    #[test]
    fn test_palm_ray_parallel_hand() {
        let hand = hand_at(Vector::new(0.0, 250.0, 100.0), Vector::new(1.0, 0.0, 0.0));
        assert!(palm_ray_position(&hand, &test_screen(), &Recalibration::default()).is_none());
    }

    #[test]
    fn test_frustum_position() {
        let hand = hand_at(Vector::new(0.0, 225.0, 200.0), Vector::new(0.0, 0.0, -1.0));
        let pixel = frustum_position(&hand, &test_screen(), &FrustumConfig::default());
        assert_eq!(pixel, Some(PixelPoint::new(960, 540)));
    }

    #[test]
    fn test_frustum_collapse_is_degenerate() {
        let hand = hand_at(Vector::new(0.0, 225.0, 500.0), Vector::new(0.0, 0.0, -1.0));
        assert!(frustum_position(&hand, &test_screen(), &FrustumConfig::default()).is_none());
    }

    #[test]
    fn test_projector_dispatches_on_method() {
        let hand = hand_at(Vector::new(0.0, 225.0, 200.0), Vector::new(0.0, 0.0, -1.0));

        let mut config = PointerConfig::default();
        config.projection = ProjectionMethod::Frustum;
        let projector = Projector::new(&config);
        assert_eq!(projector.method(), ProjectionMethod::Frustum);
        assert_eq!(projector.project(&hand, &test_screen()), Some(PixelPoint::new(960, 540)));

        config.projection = ProjectionMethod::PalmRay;
        config.recalibration = Recalibration::identity();
        let projector = Projector::new(&config);
        // palm at y=225 casts onto ratio y = 125/300
        let pixel = projector.project(&hand, &test_screen()).unwrap();
        assert_eq!(pixel.x, 960);
        assert!((pixel.y - 630).abs() <= 1, "y = {}", pixel.y);
    }
}
