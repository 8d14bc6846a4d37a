//! Puzzle parts and their snap anchors.

use crate::math::{Transform, unit_rotation};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for parts.
pub type PartId = Uuid;

/// Default pick radius for parts created without one.
pub const DEFAULT_PICK_RADIUS: f32 = 0.5;

/// A reference point fixed in a part's local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Local-space offset from the part origin.
    #[serde(default)]
    pub offset: Vec3,
    /// Local-space orientation of the anchor frame.
    #[serde(default = "identity_rotation")]
    pub rotation: Quat,
}

fn identity_rotation() -> Quat {
    Quat::IDENTITY
}

impl Default for Anchor {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

impl Anchor {
    /// Create an anchor. The rotation is normalized.
    pub fn new(offset: Vec3, rotation: Quat) -> Self {
        Self {
            offset,
            rotation: unit_rotation(rotation),
        }
    }

    /// Anchor with an identity local orientation.
    pub fn at(offset: Vec3) -> Self {
        Self::new(offset, Quat::IDENTITY)
    }

    /// World pose of this anchor on a body with the given transform.
    pub fn world(&self, transform: &Transform) -> AnchorPose {
        AnchorPose {
            position: transform.transform_point(self.offset),
            rotation: unit_rotation(transform.rotation * self.rotation),
        }
    }
}

/// World-space anchor position and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorPose {
    pub position: Vec3,
    #[serde(default = "identity_rotation")]
    pub rotation: Quat,
}

impl AnchorPose {
    /// Create a pose. The rotation is normalized.
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation: unit_rotation(rotation),
        }
    }

    pub fn distance(&self, other: &AnchorPose) -> f32 {
        self.position.distance(other.position)
    }
}

/// A movable puzzle piece.
#[derive(Debug, Clone)]
pub struct Part {
    pub(crate) id: PartId,
    /// Display name, unique within a layout.
    pub name: String,
    pub(crate) transform: Transform,
    /// Radius of the bounding sphere used for pointer picking.
    pub pick_radius: f32,
    locked: bool,
}

impl Part {
    /// Create a new unlocked part. The transform's rotation is normalized.
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            transform: Transform::new(transform.translation, transform.rotation),
            pick_radius: DEFAULT_PICK_RADIUS,
            locked: false,
        }
    }

    pub fn with_pick_radius(mut self, radius: f32) -> Self {
        self.pick_radius = radius.max(0.0);
        self
    }

    pub fn id(&self) -> PartId {
        self.id
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    /// Whether the part has been snapped into place.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Lock the part in place. There is no way back.
    pub(crate) fn lock(&mut self) {
        self.locked = true;
    }

    /// Move the part. Ignored once the part is locked.
    pub fn set_position(&mut self, position: Vec3) -> bool {
        if self.locked {
            return false;
        }
        self.transform.translation = position;
        true
    }

    /// Reorient the part. Ignored once the part is locked.
    pub fn set_rotation(&mut self, rotation: Quat) -> bool {
        if self.locked {
            return false;
        }
        self.transform.rotation = unit_rotation(rotation);
        true
    }

    /// World pose of one of this part's anchors.
    pub fn anchor_pose(&self, anchor: &Anchor) -> AnchorPose {
        anchor.world(&self.transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_anchor_tracks_transform() {
        let mut part = Part::new("femur", Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        let anchor = Anchor::at(Vec3::new(0.0, 2.0, 0.0));

        assert!((part.anchor_pose(&anchor).position - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);

        part.set_rotation(Quat::from_rotation_z(FRAC_PI_2));
        // +Y rotated 90° about Z points to -X.
        assert!((part.anchor_pose(&anchor).position - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_anchor_rotation_composes() {
        let part = Part::new("tibia", Transform::new(Vec3::ZERO, Quat::from_rotation_y(FRAC_PI_2)));
        let anchor = Anchor::new(Vec3::ZERO, Quat::from_rotation_x(FRAC_PI_2));
        let pose = part.anchor_pose(&anchor);
        let expected = Quat::from_rotation_y(FRAC_PI_2) * Quat::from_rotation_x(FRAC_PI_2);
        assert!(pose.rotation.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_locked_part_rejects_moves() {
        let mut part = Part::new("skull", Transform::IDENTITY);
        part.lock();
        assert!(part.is_locked());
        assert!(!part.set_position(Vec3::ONE));
        assert!(!part.set_rotation(Quat::from_rotation_x(1.0)));
        assert_eq!(part.position(), Vec3::ZERO);
        assert_eq!(part.rotation(), Quat::IDENTITY);
    }

    #[test]
    fn test_non_unit_rotations_are_normalized() {
        let doubled = Quat::from_xyzw(0.0, 0.0, 0.0, 2.0);
        let part = Part::new("ulna", Transform { translation: Vec3::ZERO, rotation: doubled });
        assert!(part.rotation().is_normalized());

        let anchor = Anchor::new(Vec3::Y, doubled);
        assert!(anchor.rotation.is_normalized());
        assert!((part.anchor_pose(&anchor).position - Vec3::Y).length() < 1e-6);
        assert!(AnchorPose::new(Vec3::ZERO, doubled).rotation.is_normalized());
    }

    #[test]
    fn test_anchor_deserializes_with_defaults() {
        let anchor: Anchor = serde_json::from_str(r#"{"offset":[0.0,1.0,0.0]}"#).unwrap();
        assert_eq!(anchor.offset, Vec3::Y);
        assert_eq!(anchor.rotation, Quat::IDENTITY);
    }
}
