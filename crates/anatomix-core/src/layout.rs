//! Serializable puzzle layouts: which parts exist and where each one fits.

use crate::assembly::{Assembly, AssemblyError};
use crate::config::PuzzleConfig;
use crate::math::{Transform, is_valid_rotation};
use crate::part::{Anchor, AnchorPose, DEFAULT_PICK_RADIUS, Part, PartId};
use crate::snap::SnapTarget;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Layout loading and validation errors.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Duplicate part name: {0}")]
    DuplicatePart(String),
    #[error("Part '{part}' targets unknown part '{target}'")]
    UnknownTarget { part: String, target: String },
    #[error("Part '{0}' cannot snap onto itself")]
    SelfTarget(String),
    #[error("Invalid layout: {0}")]
    Invalid(String),
}

impl From<AssemblyError> for LayoutError {
    fn from(err: AssemblyError) -> Self {
        LayoutError::Invalid(err.to_string())
    }
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Where a part fits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetSpec {
    /// An anchor on another part, referenced by name.
    Part {
        part: String,
        #[serde(default)]
        anchor: Anchor,
    },
    /// A fixed world pose.
    Fixed { pose: AnchorPose },
}

/// One part in a layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSpec {
    pub name: String,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default = "default_pick_radius")]
    pub pick_radius: f32,
    /// Source anchor in the part's local space.
    #[serde(default)]
    pub anchor: Anchor,
    /// Parts without a target are fixed references (e.g. the skull).
    #[serde(default)]
    pub target: Option<TargetSpec>,
    /// Overrides the configured snap range for this part.
    #[serde(default)]
    pub snap_range: Option<f32>,
}

impl PartSpec {
    /// Reject non-finite positions and rotations that cannot be normalized.
    fn check_geometry(&self) -> LayoutResult<()> {
        let name = &self.name;
        check_pose(name, "transform", self.transform.translation, self.transform.rotation)?;
        check_pose(name, "anchor", self.anchor.offset, self.anchor.rotation)?;
        match &self.target {
            Some(TargetSpec::Part { anchor, .. }) => check_pose(name, "target anchor", anchor.offset, anchor.rotation),
            Some(TargetSpec::Fixed { pose }) => check_pose(name, "target pose", pose.position, pose.rotation),
            None => Ok(()),
        }
    }
}

fn check_pose(part: &str, field: &str, position: Vec3, rotation: Quat) -> LayoutResult<()> {
    if !position.is_finite() {
        return Err(LayoutError::Invalid(format!(
            "part '{}' has a non-finite {} position {}",
            part, field, position
        )));
    }
    if !is_valid_rotation(rotation) {
        return Err(LayoutError::Invalid(format!(
            "part '{}' has a degenerate {} rotation {}",
            part, field, rotation
        )));
    }
    Ok(())
}

fn normalized(anchor: &Anchor) -> Anchor {
    Anchor::new(anchor.offset, anchor.rotation)
}

fn default_pick_radius() -> f32 {
    DEFAULT_PICK_RADIUS
}

/// A named set of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub name: String,
    pub parts: Vec<PartSpec>,
}

impl Layout {
    /// Parse and validate a JSON layout.
    pub fn from_json_str(json: &str) -> LayoutResult<Self> {
        let layout: Self =
            serde_json::from_str(json).map_err(|e| LayoutError::Parse(e.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Load and validate a JSON layout file.
    pub fn load(path: &Path) -> LayoutResult<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| LayoutError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> LayoutResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| LayoutError::Parse(e.to_string()))
    }

    /// Check names are unique and every target refers to another known part.
    pub fn validate(&self) -> LayoutResult<()> {
        if self.parts.is_empty() {
            return Err(LayoutError::Invalid(format!("layout '{}' has no parts", self.name)));
        }

        let mut names = HashSet::new();
        for spec in &self.parts {
            if !names.insert(spec.name.as_str()) {
                return Err(LayoutError::DuplicatePart(spec.name.clone()));
            }
        }

        for spec in &self.parts {
            spec.check_geometry()?;
            if let Some(range) = spec.snap_range {
                if !range.is_finite() || range < 0.0 {
                    return Err(LayoutError::Invalid(format!(
                        "part '{}' has negative snap range {}",
                        spec.name, range
                    )));
                }
            }
            if let Some(TargetSpec::Part { part, .. }) = &spec.target {
                if *part == spec.name {
                    return Err(LayoutError::SelfTarget(spec.name.clone()));
                }
                if !names.contains(part.as_str()) {
                    return Err(LayoutError::UnknownTarget {
                        part: spec.name.clone(),
                        target: part.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Build an assembly from this layout.
    ///
    /// Returns the assembly and a name to id map.
    pub fn build(&self, config: &PuzzleConfig) -> LayoutResult<(Assembly, HashMap<String, PartId>)> {
        self.validate()?;

        let mut assembly = Assembly::new(config);
        let mut ids = HashMap::new();
        for spec in &self.parts {
            let part = Part::new(spec.name.clone(), spec.transform).with_pick_radius(spec.pick_radius);
            ids.insert(spec.name.clone(), assembly.add_part(part));
        }

        for spec in &self.parts {
            let Some(target) = &spec.target else {
                continue;
            };
            let target = match target {
                TargetSpec::Part { part, anchor } => SnapTarget::Part {
                    part: ids[part],
                    anchor: normalized(anchor),
                },
                TargetSpec::Fixed { pose } => SnapTarget::Fixed {
                    pose: AnchorPose::new(pose.position, pose.rotation),
                },
            };
            let range = spec.snap_range.unwrap_or(config.snap.range);
            assembly.bind_snap_with_range(ids[&spec.name], normalized(&spec.anchor), target, range)?;
        }

        log::info!(
            "Built layout '{}' with {} parts, {} bound",
            self.name,
            assembly.len(),
            assembly.bindings().len()
        );
        Ok((assembly, ids))
    }
}
