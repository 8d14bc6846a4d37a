//! Snap functionality for fitting a part's anchor onto its target anchor.

use crate::math::unit_rotation;
use crate::part::{Anchor, AnchorPose, Part, PartId};
use serde::{Deserialize, Serialize};

/// Default snap range in world units.
pub const DEFAULT_SNAP_RANGE: f32 = 2.0;

/// When snap evaluation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapTrigger {
    /// Evaluate every bound part on every tick.
    #[default]
    EveryFrame,
    /// Evaluate only the part whose drag just ended.
    OnRelease,
}

/// Result of a snap evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapOutcome {
    /// The part was already locked; nothing changed.
    Locked { distance: f32 },
    /// Anchors were too far apart; nothing changed.
    OutOfRange { distance: f32 },
    /// The part was moved onto the target and locked.
    Snapped { distance: f32 },
}

impl SnapOutcome {
    /// Anchor distance measured before any correction.
    pub fn distance(&self) -> f32 {
        match *self {
            SnapOutcome::Locked { distance }
            | SnapOutcome::OutOfRange { distance }
            | SnapOutcome::Snapped { distance } => distance,
        }
    }

    /// Check if this evaluation performed the snap.
    pub fn is_snapped(&self) -> bool {
        matches!(self, SnapOutcome::Snapped { .. })
    }
}

/// Test a part's anchor against a target pose and snap it when close enough.
///
/// On success the part is reoriented so the anchor frame matches the target
/// orientation, then translated by exactly the residual between the anchors,
/// and locked. Locked parts are never modified.
pub fn evaluate(part: &mut Part, source: &Anchor, target: &AnchorPose, snap_range: f32) -> SnapOutcome {
    let distance = part.anchor_pose(source).distance(target);
    log::trace!("'{}' anchor distance {:.4}", part.name, distance);

    if part.is_locked() {
        return SnapOutcome::Locked { distance };
    }
    if distance > snap_range {
        return SnapOutcome::OutOfRange { distance };
    }

    part.transform.rotation = unit_rotation(target.rotation * source.rotation.inverse());
    let residual = target.position - part.anchor_pose(source).position;
    part.transform.translation += residual;
    part.lock();

    log::info!("Snapped '{}' (distance {:.3})", part.name, distance);
    SnapOutcome::Snapped { distance }
}

/// What a bound part snaps onto.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapTarget {
    /// An anchor on another part, tracked as that part moves.
    Part { part: PartId, anchor: Anchor },
    /// A fixed pose in world space.
    Fixed { pose: AnchorPose },
}

/// Pairs a part's source anchor with its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapBinding {
    pub part: PartId,
    pub source: Anchor,
    pub target: SnapTarget,
    pub range: f32,
}

impl SnapBinding {
    pub fn new(part: PartId, source: Anchor, target: SnapTarget, range: f32) -> Self {
        Self {
            part,
            source,
            target,
            range,
        }
    }
}
