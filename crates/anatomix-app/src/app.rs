//! Main application: a headless game session over the puzzle core.

use crate::autoplay::InputDriver;
use crate::menu::{Menu, MenuAction, MenuOutcome};
use anatomix_core::{
    Assembly, Camera, ConfigError, CountdownTimer, DragEnded, FrameReport, InputEvent, InputState,
    Layout, LayoutError, MouseButton, PartId, PuzzleConfig, TimerEvent, Transform, TransformSink,
};
use glam::Vec2;
use serde::Serialize;
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;

/// Built-in layout used when no layout file is given.
pub const SAMPLE_LAYOUT: &str = include_str!("../assets/skeleton.json");

/// Mouse axis units per pixel of pointer movement.
pub const MOUSE_AXIS_SCALE: f32 = 0.1;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("Usage error: {0}")]
    Usage(String),
    #[error("Failed to serialize summary: {0}")]
    Summary(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub title: String,
    /// Fixed frame time in seconds.
    pub frame_dt: f32,
    /// Stop after this many frames even if the session is still running.
    pub max_frames: Option<u64>,
    pub config_path: Option<PathBuf>,
    pub layout_path: Option<PathBuf>,
    /// Print the session summary as JSON.
    pub json_summary: bool,
    pub show_help: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Anatomix".to_string(),
            frame_dt: 1.0 / 60.0,
            max_frames: None,
            config_path: None,
            layout_path: None,
            json_summary: false,
            show_help: false,
        }
    }
}

impl AppConfig {
    pub const USAGE: &'static str =
        "Usage: anatomix [--config PATH] [--layout PATH] [--frames N] [--dt SECONDS] [--json]";

    /// Parse command line arguments (without the program name).
    pub fn from_args(args: impl IntoIterator<Item = String>) -> AppResult<Self> {
        let mut config = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| AppError::Usage(format!("{} needs a value", flag)))
            };
            match arg.as_str() {
                "--config" => config.config_path = Some(PathBuf::from(value("--config")?)),
                "--layout" => config.layout_path = Some(PathBuf::from(value("--layout")?)),
                "--frames" => {
                    let frames = value("--frames")?;
                    let frames = frames
                        .parse()
                        .map_err(|_| AppError::Usage(format!("invalid frame count '{}'", frames)))?;
                    config.max_frames = Some(frames);
                }
                "--dt" => {
                    let dt = value("--dt")?;
                    config.frame_dt = dt
                        .parse::<f32>()
                        .ok()
                        .filter(|dt| dt.is_finite() && *dt > 0.0)
                        .ok_or_else(|| AppError::Usage(format!("invalid frame time '{}'", dt)))?;
                }
                "--json" => config.json_summary = true,
                "-h" | "--help" => config.show_help = true,
                other => return Err(AppError::Usage(format!("unknown argument '{}'", other))),
            }
        }
        Ok(config)
    }

    /// Load the puzzle config and layout, falling back to defaults.
    pub fn load_puzzle(&self) -> AppResult<(PuzzleConfig, Layout)> {
        let puzzle = match &self.config_path {
            Some(path) => PuzzleConfig::load(path)?,
            None => PuzzleConfig::default(),
        };
        let layout = match &self.layout_path {
            Some(path) => Layout::load(path)?,
            None => Layout::from_json_str(SAMPLE_LAYOUT)?,
        };
        Ok((puzzle, layout))
    }
}

/// Where the session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Menu,
    Playing,
    Won,
    TimeUp,
    Quit,
}

/// Result of a session, printed when the app exits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub layout: String,
    pub phase: Phase,
    pub frames: u64,
    pub placed: usize,
    pub total: usize,
    pub drops: usize,
    pub time_left: String,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = match self.phase {
            Phase::Won => "Assembled",
            Phase::TimeUp => "Time's up",
            Phase::Quit => "Quit",
            Phase::Menu | Phase::Playing => "Unfinished",
        };
        write!(
            f,
            "{}: {} ({}/{} parts placed, {} drops, {} frames, {} left)",
            self.layout, verdict, self.placed, self.total, self.drops, self.frames, self.time_left
        )
    }
}

/// Stand-in for the host engine's scene: logs every transform pushed to it.
#[derive(Debug, Default)]
pub struct LoggingSink {
    pub updates: usize,
}

impl TransformSink for LoggingSink {
    fn apply(&mut self, part: PartId, transform: &Transform) {
        log::trace!(
            "Part {} -> position {:?}, rotation {:?}",
            part,
            transform.translation,
            transform.rotation
        );
        self.updates += 1;
    }
}

/// A puzzle session: title menu, then a timed assembly round.
pub struct App {
    config: AppConfig,
    puzzle: PuzzleConfig,
    layout_name: String,
    assembly: Assembly,
    ids: HashMap<String, PartId>,
    camera: Camera,
    input: InputState,
    timer: CountdownTimer,
    menu: Menu,
    phase: Phase,
    frames: u64,
    drops: Rc<Cell<usize>>,
    sink: LoggingSink,
}

impl App {
    pub fn new(config: AppConfig, puzzle: PuzzleConfig, layout: &Layout) -> AppResult<Self> {
        puzzle.validate()?;
        let (mut assembly, ids) = layout.build(&puzzle)?;

        let drops = Rc::new(Cell::new(0));
        let counter = Rc::clone(&drops);
        assembly.add_drag_listener(move |ended: &DragEnded| {
            counter.set(counter.get() + 1);
            log::debug!("Dropped part {} at {:?}", ended.part, ended.transform.translation);
        });

        let camera = Camera::looking_at_origin(
            puzzle.camera.distance,
            puzzle.camera.fov_y_degrees,
            puzzle.camera.viewport,
        );
        let timer = CountdownTimer::from_config(&puzzle.timer);

        log::info!("{} ready with layout '{}'", config.title, layout.name);
        Ok(Self {
            config,
            layout_name: layout.name.clone(),
            puzzle,
            assembly,
            ids,
            camera,
            input: InputState::new(),
            timer,
            menu: Menu::new(),
            phase: Phase::Menu,
            frames: 0,
            drops,
            sink: LoggingSink::default(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn puzzle(&self) -> &PuzzleConfig {
        &self.puzzle
    }

    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Look up a part id by its layout name.
    pub fn part_id(&self, name: &str) -> Option<PartId> {
        self.ids.get(name).copied()
    }

    /// Transform updates pushed to the scene so far.
    pub fn scene_updates(&self) -> usize {
        self.sink.updates
    }

    /// Handle a menu button. Ignored outside the menu.
    pub fn menu_action(&mut self, action: MenuAction) -> MenuOutcome {
        if self.phase != Phase::Menu {
            return MenuOutcome::Stay;
        }
        let outcome = self.menu.apply(action);
        match outcome {
            MenuOutcome::StartGame => self.start_game(),
            MenuOutcome::Quit => self.phase = Phase::Quit,
            MenuOutcome::Stay => {}
        }
        outcome
    }

    fn start_game(&mut self) {
        let moved = self.assembly.scatter(&self.puzzle.scatter);
        self.assembly.flush_transforms(&mut self.sink);
        self.timer.start();
        self.phase = Phase::Playing;
        log::info!("Game started: scattered {} parts, {} on the clock", moved, self.timer.display());
    }

    /// Advance one frame with the given input events.
    ///
    /// Returns `None` when no round is being played.
    pub fn step(&mut self, events: Vec<InputEvent>) -> Option<FrameReport> {
        if self.phase != Phase::Playing {
            return None;
        }
        let dt = self.config.frame_dt;

        self.input.begin_frame();
        for event in events {
            self.input.handle_event(event);
        }

        if self.input.is_key_pressed(&self.puzzle.bindings.orbit_modifier)
            && self.input.is_button_pressed(MouseButton::Right)
        {
            // Screen y grows downward; mouse axes grow upward.
            let delta = self.input.pointer_delta() * Vec2::new(1.0, -1.0) * MOUSE_AXIS_SCALE;
            self.camera.orbit(delta, self.puzzle.camera.orbit_speed, dt);
        }

        let report = self.assembly.tick(&self.input, &self.camera, dt);
        self.assembly.flush_transforms(&mut self.sink);
        self.frames += 1;

        for id in &report.snapped {
            if let Some(part) = self.assembly.part(*id) {
                log::info!("'{}' snapped into place", part.name);
            }
        }

        if report.completed {
            self.timer.stop();
            self.phase = Phase::Won;
            log::info!("Puzzle assembled with {} left", self.timer.display());
        } else if self.timer.tick(dt) == TimerEvent::Expired {
            self.phase = Phase::TimeUp;
            let (placed, total) = self.assembly.progress();
            log::warn!("Time's up with {}/{} parts placed", placed, total);
        }
        Some(report)
    }

    /// Play frames from `driver` until the round ends or the frame limit hits.
    pub fn run(&mut self, driver: &mut dyn InputDriver) -> SessionSummary {
        while self.phase == Phase::Playing {
            if self.config.max_frames.is_some_and(|max| self.frames >= max) {
                log::info!("Frame limit reached");
                break;
            }
            let events = driver.frame_events(&self.assembly, &self.camera);
            self.step(events);
        }
        self.summary()
    }

    pub fn summary(&self) -> SessionSummary {
        let (placed, total) = self.assembly.progress();
        SessionSummary {
            layout: self.layout_name.clone(),
            phase: self.phase,
            frames: self.frames,
            placed,
            total,
            drops: self.drops.get(),
            time_left: self.timer.display(),
        }
    }
}
