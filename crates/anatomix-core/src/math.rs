//! Rigid transforms, rays and planes used by picking and dragging.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Smallest quaternion norm accepted as an orientation.
pub const MIN_ROTATION_NORM: f32 = 1e-6;

/// Check that a quaternion is finite and long enough to normalize.
pub fn is_valid_rotation(rotation: Quat) -> bool {
    let norm = rotation.length();
    norm.is_finite() && norm > MIN_ROTATION_NORM
}

/// Normalize an orientation. Degenerate quaternions become identity.
pub fn unit_rotation(rotation: Quat) -> Quat {
    if is_valid_rotation(rotation) {
        rotation.normalize()
    } else {
        Quat::IDENTITY
    }
}

/// Position plus orientation of a rigid body in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a transform. The rotation is normalized.
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation: unit_rotation(rotation),
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    /// Map a local-space point into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.translation + self.rotation * local
    }

    /// Rotate about a world-space axis passing through the body's origin.
    pub fn rotate_world(&mut self, axis: Vec3, angle_radians: f32) {
        self.rotation = (Quat::from_axis_angle(axis, angle_radians) * self.rotation).normalize();
    }
}

/// Half-line with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing the direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to where it crosses `plane`.
    ///
    /// Returns `None` when the ray is parallel to the plane or the crossing
    /// lies behind the origin.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<f32> {
        let denom = self.direction.dot(plane.normal);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (plane.point - self.origin).dot(plane.normal) / denom;
        (t >= 0.0).then_some(t)
    }

    /// Nearest non-negative distance at which the ray enters a sphere.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();
        let near = -b - sqrt_d;
        if near >= 0.0 {
            return Some(near);
        }
        // Origin inside the sphere.
        let far = -b + sqrt_d;
        (far >= 0.0).then_some(0.0)
    }
}

/// Infinite plane through `point` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize(),
        }
    }

    /// Signed distance from the plane along its normal.
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        (p - self.point).dot(self.normal)
    }
}
