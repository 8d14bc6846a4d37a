//! Input drivers for the headless app.
//!
//! A driver produces the input events for each frame. [`Autoplay`] solves the
//! puzzle the way a player would: press on a part, nudge it to the right depth
//! with the depth keys, steer the pointer until the anchor lines up, release.

use anatomix_core::{
    Assembly, Camera, InputEvent, KeyBindings, KeyEvent, MouseButton, Part, PartId, PointerEvent,
};
use glam::{Vec2, Vec3};
use std::collections::{HashSet, VecDeque};

/// Frames spent on one part before giving up on it.
pub const MAX_FRAMES_PER_PART: u32 = 900;

/// Produces the input events for each frame.
pub trait InputDriver {
    fn frame_events(&mut self, assembly: &Assembly, camera: &Camera) -> Vec<InputEvent>;
}

/// Replays a fixed list of per-frame events, then goes quiet.
#[derive(Debug, Clone, Default)]
pub struct Script {
    frames: VecDeque<Vec<InputEvent>>,
}

impl Script {
    pub fn new(frames: impl IntoIterator<Item = Vec<InputEvent>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.frames.is_empty()
    }
}

impl InputDriver for Script {
    fn frame_events(&mut self, _assembly: &Assembly, _camera: &Camera) -> Vec<InputEvent> {
        self.frames.pop_front().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AutoState {
    Idle,
    Holding { part: PartId, frames: u32 },
}

/// Drives the pointer and depth keys to place every bound part.
#[derive(Debug, Clone)]
pub struct Autoplay {
    keys: KeyBindings,
    state: AutoState,
    pointer: Vec2,
    held: Option<String>,
    skipped: HashSet<PartId>,
}

impl Autoplay {
    pub fn new(keys: KeyBindings) -> Self {
        Self {
            keys,
            state: AutoState::Idle,
            pointer: Vec2::ZERO,
            held: None,
            skipped: HashSet::new(),
        }
    }

    /// Parts the driver could not place.
    pub fn skipped(&self) -> &HashSet<PartId> {
        &self.skipped
    }

    fn pointer_event(event: PointerEvent) -> InputEvent {
        InputEvent::Pointer(event)
    }

    /// Press, release or keep the depth key for this frame.
    fn hold_key(&mut self, key: Option<&str>, events: &mut Vec<InputEvent>) {
        if self.held.as_deref() == key {
            return;
        }
        if let Some(previous) = self.held.take() {
            events.push(InputEvent::Key(KeyEvent::Released(previous)));
        }
        if let Some(key) = key {
            events.push(InputEvent::Key(KeyEvent::Pressed(key.to_string())));
            self.held = Some(key.to_string());
        }
    }

    fn release(&mut self, events: &mut Vec<InputEvent>) {
        self.hold_key(None, events);
        events.push(Self::pointer_event(PointerEvent::Up {
            position: self.pointer,
            button: MouseButton::Left,
        }));
        self.state = AutoState::Idle;
    }

    fn give_up(&mut self, part: PartId, events: &mut Vec<InputEvent>) {
        log::warn!("Autoplay giving up on part {}", part);
        self.skipped.insert(part);
        self.release(events);
    }

    /// Screen point where a press picks `part`, trying the centre first and
    /// then points around its pick sphere in case another part is in front.
    fn grab_point(assembly: &Assembly, camera: &Camera, part: &Part) -> Option<Vec2> {
        let reach = part.pick_radius * 0.7;
        let nudges = [
            Vec3::ZERO,
            camera.right() * reach,
            -camera.right() * reach,
            camera.up() * reach,
            -camera.up() * reach,
        ];
        nudges.into_iter().find_map(|nudge| {
            let screen = camera.world_to_screen(part.position() + nudge);
            if screen.z <= 0.0 {
                return None;
            }
            let screen = screen.truncate();
            (assembly.pick(&camera.screen_ray(screen)) == Some(part.id())).then_some(screen)
        })
    }

    /// Press on the next unplaced part.
    fn grab_next(&mut self, assembly: &Assembly, camera: &Camera) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let candidates: Vec<&Part> = assembly
            .bindings()
            .iter()
            .filter(|b| !self.skipped.contains(&b.part) && assembly.target_ready(b))
            .filter_map(|b| assembly.part(b.part))
            .filter(|p| !p.is_locked())
            .collect();

        let grab = candidates
            .iter()
            .find_map(|part| Self::grab_point(assembly, camera, part).map(|screen| (*part, screen)));
        let Some((part, screen)) = grab else {
            for part in candidates {
                log::warn!("Autoplay cannot reach '{}'", part.name);
                self.skipped.insert(part.id());
            }
            return events;
        };

        self.pointer = screen;
        events.push(Self::pointer_event(PointerEvent::Move {
            position: self.pointer,
        }));
        events.push(Self::pointer_event(PointerEvent::Down {
            position: self.pointer,
            button: MouseButton::Left,
        }));
        log::debug!("Autoplay grabbing '{}'", part.name);
        self.state = AutoState::Holding {
            part: part.id(),
            frames: 0,
        };
        events
    }

    /// Steer the held part toward its target.
    fn steer(&mut self, part_id: PartId, frames: u32, assembly: &Assembly, camera: &Camera) -> Vec<InputEvent> {
        let mut events = Vec::new();

        let Some(session) = assembly.drag().session().filter(|s| s.part == part_id) else {
            self.give_up(part_id, &mut events);
            return events;
        };
        let (Some(part), Some(binding)) = (assembly.part(part_id), assembly.binding_for(part_id)) else {
            self.give_up(part_id, &mut events);
            return events;
        };
        if part.is_locked() {
            self.release(&mut events);
            return events;
        }
        if frames > MAX_FRAMES_PER_PART {
            self.give_up(part_id, &mut events);
            return events;
        }
        let Some(target) = assembly.target_pose(binding) else {
            self.give_up(part_id, &mut events);
            return events;
        };

        let anchor = part.anchor_pose(&binding.source);
        let desired = part.position() + (target.position - anchor.position);
        let plane = session.plane;
        let tolerance = binding.range * 0.5;

        // Depth keys move along world Z; the plane normal is the camera forward.
        let error = plane.normal.dot(desired - plane.point - session.depth_nudge);
        let key = if error.abs() <= tolerance * 0.5 || plane.normal.z.abs() < 0.1 {
            None
        } else if error * plane.normal.z > 0.0 {
            Some(self.keys.depth_toward.clone())
        } else {
            Some(self.keys.depth_away.clone())
        };
        self.hold_key(key.as_deref(), &mut events);

        let aim = desired - session.offset - session.depth_nudge;
        let aim = aim - plane.normal * plane.signed_distance(aim);
        let screen = camera.world_to_screen(aim);
        if screen.z <= 0.0 {
            self.give_up(part_id, &mut events);
            return events;
        }
        self.pointer = screen.truncate();
        events.push(Self::pointer_event(PointerEvent::Move {
            position: self.pointer,
        }));

        if key.is_none() && anchor.distance(&target) <= tolerance {
            self.release(&mut events);
        } else {
            self.state = AutoState::Holding {
                part: part_id,
                frames: frames + 1,
            };
        }
        events
    }
}

impl InputDriver for Autoplay {
    fn frame_events(&mut self, assembly: &Assembly, camera: &Camera) -> Vec<InputEvent> {
        match self.state {
            AutoState::Idle => self.grab_next(assembly, camera),
            AutoState::Holding { part, frames } => self.steer(part, frames, assembly, camera),
        }
    }
}
