//! Rigid 2D transform (rotation + translation).

use glam::Vec2;

/// Rotation + translation placing a shape or body in world space.
///
/// The rotation is stored as a cosine/sine pair so that repeated point and
/// vector transforms never call trigonometric functions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub translation: Vec2,
    cos: f32,
    sin: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec2::ZERO,
        cos: 1.0,
        sin: 0.0,
    };

    /// Create an identity transform.
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Create a transform from a translation.
    pub fn from_translation(translation: Vec2) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Create a transform from a rotation angle in radians.
    pub fn from_angle(angle: f32) -> Self {
        Self::new(Vec2::ZERO, angle)
    }

    /// Create a transform from a translation and rotation angle in radians.
    pub fn new(translation: Vec2, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            translation,
            cos,
            sin,
        }
    }

    /// Rotation angle in radians, in `(-pi, pi]`.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.sin.atan2(self.cos)
    }

    /// The rotation as a unit complex number `(cos, sin)`.
    #[inline]
    pub fn rotation(&self) -> Vec2 {
        Vec2::new(self.cos, self.sin)
    }

    /// Replace the rotation, keeping the translation.
    pub fn set_angle(&mut self, angle: f32) {
        let (sin, cos) = angle.sin_cos();
        self.cos = cos;
        self.sin = sin;
    }

    /// Transform a local point into world space.
    #[inline]
    pub fn transform_point(&self, point: Vec2) -> Vec2 {
        self.rotate(point) + self.translation
    }

    /// Transform a world point into local space.
    #[inline]
    pub fn inverse_transform_point(&self, point: Vec2) -> Vec2 {
        self.inverse_rotate(point - self.translation)
    }

    /// Rotate a local vector into world space (no translation).
    #[inline]
    pub fn rotate(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.cos * v.x - self.sin * v.y, self.sin * v.x + self.cos * v.y)
    }

    /// Rotate a world vector into local space (no translation).
    #[inline]
    pub fn inverse_rotate(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.cos * v.x + self.sin * v.y, -self.sin * v.x + self.cos * v.y)
    }

    /// Compose two transforms: the result applies `local` first, then `self`.
    pub fn compose(&self, local: &Transform) -> Transform {
        Transform {
            translation: self.transform_point(local.translation),
            cos: self.cos * local.cos - self.sin * local.sin,
            sin: self.sin * local.cos + self.cos * local.sin,
        }
    }

    /// Translate by `delta` in world space.
    pub fn translate(&mut self, delta: Vec2) {
        self.translation += delta;
    }

    /// Rotate by `angle` radians about the world point `center`.
    pub fn rotate_about(&mut self, angle: f32, center: Vec2) {
        let (s, c) = angle.sin_cos();
        let cos = c * self.cos - s * self.sin;
        let sin = s * self.cos + c * self.sin;
        // Renormalize to stop drift accumulating over many steps.
        let len = (cos * cos + sin * sin).sqrt();
        self.cos = cos / len;
        self.sin = sin / len;

        let offset = self.translation - center;
        self.translation = center + Vec2::new(c * offset.x - s * offset.y, s * offset.x + c * offset.y);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_point_round_trip() {
        let t = Transform::new(Vec2::new(3.0, -2.0), 0.7);
        let p = Vec2::new(1.5, 4.0);
        let back = t.inverse_transform_point(t.transform_point(p));
        assert!((back - p).length() < EPS);
    }

    #[test]
    fn test_quarter_turn() {
        let t = Transform::new(Vec2::new(1.0, 0.0), FRAC_PI_2);
        let p = t.transform_point(Vec2::X);
        assert!((p - Vec2::new(1.0, 1.0)).length() < EPS);
        assert!((t.angle() - FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn test_compose_matches_sequential_application() {
        let parent = Transform::new(Vec2::new(2.0, 1.0), 0.4);
        let child = Transform::new(Vec2::new(-1.0, 0.5), 1.1);
        let p = Vec2::new(0.3, 0.8);
        let composed = parent.compose(&child).transform_point(p);
        let sequential = parent.transform_point(child.transform_point(p));
        assert!((composed - sequential).length() < EPS);
    }

    #[test]
    fn test_rotate_about_keeps_center_fixed() {
        let mut t = Transform::from_translation(Vec2::new(2.0, 0.0));
        let center = t.transform_point(Vec2::new(1.0, 0.0));
        t.rotate_about(FRAC_PI_2, center);
        assert!((t.transform_point(Vec2::new(1.0, 0.0)) - center).length() < EPS);
        assert!((t.translation - Vec2::new(3.0, -1.0)).length() < EPS);
    }
}
