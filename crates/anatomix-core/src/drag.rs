//! Press-drag-release manipulation of a single part.
//!
//! While the pointer is held, the dragged part follows the pointer on a plane
//! facing the camera at the depth the part had when it was pressed. Keyboard
//! commands rotate it in world space and push it along the depth axis.

use crate::camera::Camera;
use crate::config::{DragConfig, KeyBindings};
use crate::input::InputState;
use crate::math::{Plane, Ray, Transform};
use crate::part::{Part, PartId};
use glam::Vec3;
use std::fmt;

/// Axis along which depth commands move a dragged part.
pub const DEPTH_AXIS: Vec3 = Vec3::Z;

/// Notification emitted when a drag gesture ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEnded {
    /// The part that was being dragged.
    pub part: PartId,
    /// The part's transform when the pointer was released.
    pub transform: Transform,
}

/// Receives drag-ended notifications.
pub trait DragListener {
    fn drag_ended(&mut self, event: &DragEnded);
}

impl<F> DragListener for F
where
    F: FnMut(&DragEnded),
{
    fn drag_ended(&mut self, event: &DragEnded) {
        self(event)
    }
}

/// Continuous keyboard commands for one frame. Each axis is -1, 0 or 1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragCommands {
    /// Rotation about world X.
    pub pitch: f32,
    /// Rotation about world Y.
    pub yaw: f32,
    /// Translation along [`DEPTH_AXIS`]; positive moves toward the default viewer.
    pub depth: f32,
}

impl DragCommands {
    /// Read held keys through the configured bindings.
    pub fn from_input(input: &InputState, bindings: &KeyBindings) -> Self {
        let axis = |positive: &str, negative: &str| {
            let mut value = 0.0;
            if input.is_key_pressed(positive) {
                value += 1.0;
            }
            if input.is_key_pressed(negative) {
                value -= 1.0;
            }
            value
        };
        Self {
            pitch: axis(&bindings.pitch_up, &bindings.pitch_down),
            yaw: axis(&bindings.yaw_left, &bindings.yaw_right),
            depth: axis(&bindings.depth_toward, &bindings.depth_away),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pitch == 0.0 && self.yaw == 0.0 && self.depth == 0.0
    }
}

/// State of the gesture currently in progress.
#[derive(Debug, Clone)]
pub struct DragSession {
    /// The part being dragged.
    pub part: PartId,
    /// Part position minus the pointer hit point at press time.
    pub offset: Vec3,
    /// Plane facing the camera through the part's position at press time.
    pub plane: Plane,
    /// Depth-axis translation accumulated during this gesture.
    pub depth_nudge: Vec3,
    /// Last transform written to the part.
    pub transform: Transform,
}

impl DragSession {
    /// Where the part goes for a pointer hit point on the drag plane.
    pub fn target_for(&self, hit: Vec3) -> Vec3 {
        hit + self.offset + self.depth_nudge
    }
}

/// Drives a single part through a press-drag-release gesture.
pub struct DragController {
    session: Option<DragSession>,
    /// Rotation rate in degrees per second.
    pub rotation_speed: f32,
    /// Depth translation rate in world units per second.
    pub z_move_speed: f32,
    listeners: Vec<Box<dyn DragListener>>,
}

impl fmt::Debug for DragController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragController")
            .field("session", &self.session)
            .field("rotation_speed", &self.rotation_speed)
            .field("z_move_speed", &self.z_move_speed)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(&DragConfig::default())
    }
}

impl DragController {
    /// Create a controller with the configured speeds.
    pub fn new(config: &DragConfig) -> Self {
        Self {
            session: None,
            rotation_speed: config.rotation_speed,
            z_move_speed: config.z_move_speed,
            listeners: Vec::new(),
        }
    }

    /// Register a listener for drag-ended notifications.
    ///
    /// Listeners are called synchronously in registration order.
    pub fn add_listener(&mut self, listener: impl DragListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// The part being dragged, if any.
    pub fn active_part(&self) -> Option<PartId> {
        self.session.as_ref().map(|s| s.part)
    }

    /// Start dragging `part` with the pointer along `ray`.
    ///
    /// Returns false without starting a session if the part is locked or the
    /// ray never reaches the part's drag plane. Any previous session is
    /// replaced.
    pub fn begin_drag(&mut self, part: &Part, camera: &Camera, ray: Ray) -> bool {
        if part.is_locked() {
            log::debug!("Ignoring drag on locked part '{}'", part.name);
            return false;
        }

        let plane = Plane::new(part.position(), camera.forward());
        let Some(t) = ray.intersect_plane(&plane) else {
            log::debug!("Pointer ray misses drag plane of '{}'", part.name);
            return false;
        };

        let offset = part.position() - ray.at(t);
        log::debug!("Begin drag of '{}'", part.name);
        self.session = Some(DragSession {
            part: part.id(),
            offset,
            plane,
            depth_nudge: Vec3::ZERO,
            transform: *part.transform(),
        });
        true
    }

    /// Move the dragged part under the pointer.
    ///
    /// No-op when there is no session, when `part` is not the dragged part,
    /// or when the part has been locked since the drag began.
    pub fn update_drag(&mut self, part: &mut Part, ray: Ray) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.part != part.id() || part.is_locked() {
            return;
        }
        let Some(t) = ray.intersect_plane(&session.plane) else {
            return;
        };

        part.set_position(session.target_for(ray.at(t)));
        session.transform = *part.transform();
    }

    /// Apply one frame of rotate/depth commands to the dragged part.
    pub fn apply_commands(&mut self, part: &mut Part, commands: DragCommands, dt: f32) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.part != part.id() || part.is_locked() || commands.is_idle() {
            return;
        }

        let mut transform = *part.transform();
        let step = (self.rotation_speed * dt).to_radians();
        if commands.pitch != 0.0 {
            transform.rotate_world(Vec3::X, commands.pitch * step);
        }
        if commands.yaw != 0.0 {
            transform.rotate_world(Vec3::Y, commands.yaw * step);
        }
        if commands.depth != 0.0 {
            let nudge = DEPTH_AXIS * commands.depth * self.z_move_speed * dt;
            session.depth_nudge += nudge;
            transform.translation += nudge;
        }

        part.set_rotation(transform.rotation);
        part.set_position(transform.translation);
        session.transform = *part.transform();
    }

    /// Finish the gesture and notify listeners.
    ///
    /// Returns the notification that was sent, or `None` if no drag was active.
    pub fn end_drag(&mut self) -> Option<DragEnded> {
        let session = self.session.take()?;
        let event = DragEnded {
            part: session.part,
            transform: session.transform,
        };
        log::debug!("End drag of {}", event.part);
        for listener in &mut self.listeners {
            listener.drag_ended(&event);
        }
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec2};
    use std::cell::RefCell;
    use std::f32::consts::FRAC_PI_2;
    use std::rc::Rc;

    fn part_at(position: Vec3) -> Part {
        Part::new("radius", Transform::from_translation(position))
    }

    fn controller() -> DragController {
        DragController::new(&DragConfig {
            rotation_speed: 90.0,
            z_move_speed: 2.0,
        })
    }

    #[test]
    fn test_begin_drag_captures_offset() {
        let camera = Camera::new();
        let part = part_at(Vec3::new(1.0, 1.0, 0.0));
        let mut drag = controller();

        let ray = camera.screen_ray(camera.viewport * 0.5);
        assert!(drag.begin_drag(&part, &camera, ray));

        let session = drag.session().unwrap();
        assert_eq!(session.part, part.id());
        assert!((session.offset - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_begin_drag_on_locked_part_is_noop() {
        let camera = Camera::new();
        let mut part = part_at(Vec3::ZERO);
        part.lock();
        let mut drag = controller();

        let ray = camera.screen_ray(camera.viewport * 0.5);
        assert!(!drag.begin_drag(&part, &camera, ray));
        assert!(!drag.is_dragging());

        drag.update_drag(&mut part, camera.screen_ray(Vec2::ZERO));
        assert_eq!(part.position(), Vec3::ZERO);
    }

    #[test]
    fn test_drag_keeps_press_offset_at_fixed_depth() {
        let camera = Camera::new();
        let mut part = part_at(Vec3::new(0.5, -0.25, 2.0));
        let mut drag = controller();

        let press = Vec2::new(700.0, 420.0);
        assert!(drag.begin_drag(&part, &camera, camera.screen_ray(press)));
        let depth = camera.depth_of(part.position());
        let offset = drag.session().unwrap().offset;

        for screen in [
            Vec2::new(100.0, 100.0),
            Vec2::new(900.0, 300.0),
            Vec2::new(640.0, 790.0),
        ] {
            drag.update_drag(&mut part, camera.screen_ray(screen));
            let projected = camera.screen_to_world(screen, depth);
            assert!((part.position() - (projected + offset)).length() < 1e-4);
            assert!((camera.depth_of(part.position()) - depth).abs() < 1e-4);
        }
    }

    #[test]
    fn test_update_without_session_is_noop() {
        let camera = Camera::new();
        let mut part = part_at(Vec3::ONE);
        let mut drag = controller();
        drag.update_drag(&mut part, camera.screen_ray(Vec2::ZERO));
        drag.apply_commands(
            &mut part,
            DragCommands {
                pitch: 1.0,
                yaw: 0.0,
                depth: 1.0,
            },
            1.0,
        );
        assert_eq!(part.position(), Vec3::ONE);
        assert_eq!(part.rotation(), Quat::IDENTITY);
    }

    #[test]
    fn test_update_ignores_other_parts() {
        let camera = Camera::new();
        let dragged = part_at(Vec3::ZERO);
        let mut other = part_at(Vec3::new(3.0, 0.0, 0.0));
        let mut drag = controller();

        drag.begin_drag(&dragged, &camera, camera.screen_ray(camera.viewport * 0.5));
        drag.update_drag(&mut other, camera.screen_ray(Vec2::ZERO));
        assert_eq!(other.position(), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_rotate_commands_apply_in_world_space() {
        let camera = Camera::new();
        let mut part = Part::new(
            "ulna",
            Transform::new(Vec3::ZERO, Quat::from_rotation_x(FRAC_PI_2)),
        );
        let mut drag = controller();
        drag.begin_drag(&part, &camera, camera.screen_ray(camera.viewport * 0.5));

        // 90 deg/s for one second about world Y.
        drag.apply_commands(
            &mut part,
            DragCommands {
                pitch: 0.0,
                yaw: 1.0,
                depth: 0.0,
            },
            1.0,
        );
        let expected = Quat::from_rotation_y(FRAC_PI_2) * Quat::from_rotation_x(FRAC_PI_2);
        assert!(part.rotation().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_depth_nudge_survives_pointer_updates() {
        let camera = Camera::new();
        let mut part = part_at(Vec3::ZERO);
        let mut drag = controller();
        let center = camera.viewport * 0.5;
        drag.begin_drag(&part, &camera, camera.screen_ray(center));

        drag.apply_commands(
            &mut part,
            DragCommands {
                pitch: 0.0,
                yaw: 0.0,
                depth: 1.0,
            },
            0.5,
        );
        assert!((part.position() - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);

        drag.update_drag(&mut part, camera.screen_ray(center));
        assert!((part.position() - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_locked_mid_drag_stops_moving() {
        let camera = Camera::new();
        let mut part = part_at(Vec3::ZERO);
        let mut drag = controller();
        drag.begin_drag(&part, &camera, camera.screen_ray(camera.viewport * 0.5));

        part.lock();
        drag.update_drag(&mut part, camera.screen_ray(Vec2::ZERO));
        assert_eq!(part.position(), Vec3::ZERO);
        assert!(drag.is_dragging());
    }

    #[test]
    fn test_end_drag_notifies_listeners_in_order() {
        let camera = Camera::new();
        let part = part_at(Vec3::ZERO);
        let mut drag = controller();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&log);
        drag.add_listener(move |event: &DragEnded| first.borrow_mut().push(("first", event.part)));
        let second = Rc::clone(&log);
        drag.add_listener(move |event: &DragEnded| second.borrow_mut().push(("second", event.part)));

        drag.begin_drag(&part, &camera, camera.screen_ray(camera.viewport * 0.5));
        let event = drag.end_drag().unwrap();

        assert_eq!(event.part, part.id());
        assert!(!drag.is_dragging());
        assert_eq!(*log.borrow(), vec![("first", part.id()), ("second", part.id())]);
    }

    #[test]
    fn test_end_drag_without_session_is_silent() {
        let mut drag = controller();
        let fired = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&fired);
        drag.add_listener(move |_: &DragEnded| *counter.borrow_mut() += 1);

        assert!(drag.end_drag().is_none());
        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn test_commands_from_bindings() {
        let mut input = InputState::new();
        let bindings = KeyBindings::default();
        input.handle_key_event(crate::input::KeyEvent::Pressed(bindings.pitch_down.clone()));
        input.handle_key_event(crate::input::KeyEvent::Pressed(bindings.depth_toward.clone()));

        let commands = DragCommands::from_input(&input, &bindings);
        assert_eq!(commands.pitch, -1.0);
        assert_eq!(commands.yaw, 0.0);
        assert_eq!(commands.depth, 1.0);
    }
}
