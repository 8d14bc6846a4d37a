//! Anatomix Core Library
//!
//! Engine-independent interaction logic for the Anatomix 3D anatomy puzzle:
//! dragging and rotating parts, snapping them onto their targets, and the
//! frame loop tying both together.

pub mod assembly;
pub mod camera;
pub mod config;
pub mod drag;
pub mod input;
pub mod layout;
pub mod math;
pub mod part;
pub mod scatter;
pub mod snap;
pub mod timer;

pub use assembly::{Assembly, AssemblyError, FrameReport, TransformSink};
pub use camera::Camera;
pub use config::{ConfigError, KeyBindings, PuzzleConfig};
pub use drag::{DragCommands, DragController, DragEnded, DragListener, DragSession};
pub use input::{InputEvent, InputState, KeyEvent, MouseButton, PointerEvent};
pub use layout::{Layout, LayoutError};
pub use math::{Plane, Ray, Transform};
pub use part::{Anchor, AnchorPose, Part, PartId};
pub use snap::{SnapBinding, SnapOutcome, SnapTarget, SnapTrigger, evaluate};
pub use timer::{CountdownTimer, TimerEvent};
