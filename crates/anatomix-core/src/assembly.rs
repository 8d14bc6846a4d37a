//! The set of parts being assembled and the per-frame interaction loop.

use crate::camera::Camera;
use crate::config::{KeyBindings, PuzzleConfig, ScatterConfig, SnapConfig};
use crate::drag::{DragCommands, DragController, DragEnded, DragListener};
use crate::input::{InputState, MouseButton};
use crate::math::{Ray, Transform};
use crate::part::{Anchor, AnchorPose, Part, PartId};
use crate::scatter::{scatter_part, scatter_rng};
use crate::snap::{SnapBinding, SnapOutcome, SnapTarget, SnapTrigger, evaluate};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Assembly setup errors.
#[derive(Debug, Error, PartialEq)]
pub enum AssemblyError {
    #[error("Unknown part: {0}")]
    UnknownPart(PartId),
    #[error("Part {0} cannot snap onto itself")]
    SelfTarget(PartId),
    #[error("Invalid snap range: {0}")]
    InvalidRange(f32),
}

/// Result type for assembly setup operations.
pub type AssemblyResult<T> = Result<T, AssemblyError>;

/// Receives part transforms that changed since the last flush.
pub trait TransformSink {
    fn apply(&mut self, part: PartId, transform: &Transform);
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Part picked by a press this frame.
    pub drag_started: Option<PartId>,
    /// Drag notification sent this frame.
    pub drag_ended: Option<DragEnded>,
    /// Parts that snapped into place this frame.
    pub snapped: Vec<PartId>,
    /// True on the tick the last bound part locked.
    pub completed: bool,
}

/// Parts, their snap bindings and the drag controller acting on them.
#[derive(Debug)]
pub struct Assembly {
    parts: HashMap<PartId, Part>,
    /// Insertion order, for stable iteration.
    order: Vec<PartId>,
    bindings: Vec<SnapBinding>,
    drag: DragController,
    keys: KeyBindings,
    snap: SnapConfig,
    dirty: HashSet<PartId>,
    completed: bool,
}

impl Default for Assembly {
    fn default() -> Self {
        Self::new(&PuzzleConfig::default())
    }
}

impl Assembly {
    /// Create an empty assembly.
    pub fn new(config: &PuzzleConfig) -> Self {
        Self {
            parts: HashMap::new(),
            order: Vec::new(),
            bindings: Vec::new(),
            drag: DragController::new(&config.drag),
            keys: config.bindings.clone(),
            snap: config.snap,
            dirty: HashSet::new(),
            completed: false,
        }
    }

    /// Add a part and return its id.
    pub fn add_part(&mut self, part: Part) -> PartId {
        let id = part.id();
        self.order.push(id);
        self.dirty.insert(id);
        self.parts.insert(id, part);
        id
    }

    pub fn part(&self, id: PartId) -> Option<&Part> {
        self.parts.get(&id)
    }

    /// Parts in insertion order.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.order.iter().filter_map(|id| self.parts.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn bindings(&self) -> &[SnapBinding] {
        &self.bindings
    }

    pub fn binding_for(&self, part: PartId) -> Option<&SnapBinding> {
        self.bindings.iter().find(|b| b.part == part)
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// Register a drag-ended listener on the underlying controller.
    pub fn add_drag_listener(&mut self, listener: impl DragListener + 'static) {
        self.drag.add_listener(listener);
    }

    /// Bind a part's anchor to a target, using the configured snap range.
    pub fn bind_snap(&mut self, part: PartId, source: Anchor, target: SnapTarget) -> AssemblyResult<()> {
        self.bind_snap_with_range(part, source, target, self.snap.range)
    }

    /// Bind a part's anchor to a target with an explicit snap range.
    ///
    /// The target must exist when binding; evaluation never checks again.
    /// Rebinding a part replaces its previous binding.
    pub fn bind_snap_with_range(
        &mut self,
        part: PartId,
        source: Anchor,
        target: SnapTarget,
        range: f32,
    ) -> AssemblyResult<()> {
        if !self.parts.contains_key(&part) {
            return Err(AssemblyError::UnknownPart(part));
        }
        if let SnapTarget::Part { part: target_part, .. } = target {
            if target_part == part {
                return Err(AssemblyError::SelfTarget(part));
            }
            if !self.parts.contains_key(&target_part) {
                return Err(AssemblyError::UnknownPart(target_part));
            }
        }
        if !range.is_finite() || range < 0.0 {
            return Err(AssemblyError::InvalidRange(range));
        }

        let before = self.bindings.len();
        self.bindings.retain(|b| b.part != part);
        if self.bindings.len() != before {
            log::warn!("Replacing existing snap binding for part {}", part);
        }
        self.bindings.push(SnapBinding::new(part, source, target, range));
        self.completed = false;
        Ok(())
    }

    /// Current world pose of a binding's target.
    pub fn target_pose(&self, binding: &SnapBinding) -> Option<AnchorPose> {
        match binding.target {
            SnapTarget::Part { part, anchor } => self.parts.get(&part).map(|p| p.anchor_pose(&anchor)),
            SnapTarget::Fixed { pose } => Some(pose),
        }
    }

    /// Number of bound parts that are locked, and number of bound parts.
    pub fn progress(&self) -> (usize, usize) {
        let locked = self
            .bindings
            .iter()
            .filter(|b| self.parts.get(&b.part).is_some_and(Part::is_locked))
            .count();
        (locked, self.bindings.len())
    }

    /// Check if every bound part has snapped into place.
    pub fn is_complete(&self) -> bool {
        let (locked, total) = self.progress();
        total > 0 && locked == total
    }

    /// Scatter all unlocked parts.
    pub fn scatter(&mut self, config: &ScatterConfig) -> usize {
        let mut rng = scatter_rng(config);
        let mut moved = 0;
        for id in &self.order {
            if let Some(part) = self.parts.get_mut(id) {
                if scatter_part(part, config, &mut rng) {
                    self.dirty.insert(*id);
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Nearest part whose bounding sphere the ray hits.
    pub fn pick(&self, ray: &Ray) -> Option<PartId> {
        self.parts()
            .filter_map(|p| ray.intersect_sphere(p.position(), p.pick_radius).map(|t| (t, p.id())))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id)
    }

    /// Check whether a binding's target has settled.
    ///
    /// Fixed poses always have. A part anchor has once the target part is
    /// locked, or when that part is a reference with no binding of its own.
    pub fn target_ready(&self, binding: &SnapBinding) -> bool {
        match binding.target {
            SnapTarget::Fixed { .. } => true,
            SnapTarget::Part { part, .. } => {
                self.binding_for(part).is_none() || self.parts.get(&part).is_some_and(Part::is_locked)
            }
        }
    }

    /// Run snap evaluation for one binding.
    ///
    /// Returns `None` for an unknown index or while the target is not ready,
    /// so parts never lock onto a target that will still move.
    pub fn evaluate_binding(&mut self, index: usize) -> Option<SnapOutcome> {
        let binding = *self.bindings.get(index)?;
        if !self.target_ready(&binding) {
            return None;
        }
        let target = self.target_pose(&binding)?;
        let part = self.parts.get_mut(&binding.part)?;
        let outcome = evaluate(part, &binding.source, &target, binding.range);
        if outcome.is_snapped() {
            self.dirty.insert(binding.part);
        }
        Some(outcome)
    }

    /// Advance one frame.
    ///
    /// Order: press (pick and begin drag), pointer update, keyboard commands,
    /// release (end drag and notify), snap evaluation, completion check.
    pub fn tick(&mut self, input: &InputState, camera: &Camera, dt: f32) -> FrameReport {
        let mut report = FrameReport::default();
        let ray = camera.screen_ray(input.pointer_position);

        if input.is_button_just_pressed(MouseButton::Left) {
            if let Some(id) = self.pick(&ray) {
                let part = &self.parts[&id];
                if self.drag.begin_drag(part, camera, ray) {
                    report.drag_started = Some(id);
                }
            }
        }

        if let Some(id) = self.drag.active_part() {
            if let Some(part) = self.parts.get_mut(&id) {
                if input.is_button_pressed(MouseButton::Left) {
                    self.drag.update_drag(part, ray);
                }
                let commands = DragCommands::from_input(input, &self.keys);
                self.drag.apply_commands(part, commands, dt);
                self.dirty.insert(id);
            }
        }

        if input.is_button_just_released(MouseButton::Left) {
            report.drag_ended = self.drag.end_drag();
        }

        let to_evaluate: Vec<usize> = match self.snap.trigger {
            SnapTrigger::EveryFrame => (0..self.bindings.len()).collect(),
            SnapTrigger::OnRelease => match report.drag_ended {
                Some(ended) => self
                    .bindings
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| b.part == ended.part)
                    .map(|(i, _)| i)
                    .collect(),
                None => Vec::new(),
            },
        };
        for index in to_evaluate {
            if let Some(SnapOutcome::Snapped { .. }) = self.evaluate_binding(index) {
                report.snapped.push(self.bindings[index].part);
            }
        }

        if !self.completed && self.is_complete() {
            self.completed = true;
            report.completed = true;
            log::info!("Assembly complete ({} parts)", self.bindings.len());
        }

        report
    }

    /// Push every transform changed since the last flush into `sink`.
    pub fn flush_transforms(&mut self, sink: &mut dyn TransformSink) -> usize {
        let mut flushed = 0;
        for id in &self.order {
            if self.dirty.contains(id) {
                if let Some(part) = self.parts.get(id) {
                    sink.apply(*id, part.transform());
                    flushed += 1;
                }
            }
        }
        self.dirty.clear();
        flushed
    }
}
