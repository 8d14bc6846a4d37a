//! Anatomix Application
//!
//! Headless host for the puzzle core: title menu, timed rounds at a fixed
//! frame rate, and input drivers that feed the frame loop.

mod app;
mod autoplay;
mod menu;
mod shortcuts;

pub use app::{
    App, AppConfig, AppError, AppResult, LoggingSink, MOUSE_AXIS_SCALE, Phase, SAMPLE_LAYOUT,
    SessionSummary,
};
pub use autoplay::{Autoplay, InputDriver, MAX_FRAMES_PER_PART, Script};
pub use menu::{Menu, MenuAction, MenuOutcome, MenuPanel};
pub use shortcuts::{Shortcut, ShortcutRegistry};
