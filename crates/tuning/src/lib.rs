//! Live tuning console for the circle shading demos.
//!
//! A [`ConsoleSession`] owns a typed [`ParameterRegistry`] whose entries are
//! pushed as shader uniforms every frame. Keyboard input drives a two-mode
//! state machine: in normal mode single keys act as hot-keys, and after
//! `Shift+;` the operator types `name value` commands that are parsed with a
//! closed literal grammar and applied to the registry.
//!
//! The crate is backend agnostic. Hosts implement [`UniformSink`] and
//! [`TextOverlay`] and translate their native key events into [`KeyEvent`].

pub mod command;
pub mod error;
pub mod hotkeys;
pub mod input;
pub mod keys;
pub mod literal;
pub mod overlay;
pub mod profiles;
pub mod registry;
pub mod session;
pub mod sync;
pub mod value;

pub use command::{Assignment, CommandInterpreter, CommandOutcome};
pub use error::{ConsoleError, Result};
pub use hotkeys::{Hotkey, HotkeyAction, HotkeyMap};
pub use input::{InputAction, InputMachine, InputMode};
pub use keys::{translate, KeyAction, KeyEvent, Modifiers, RawKey};
pub use literal::{parse_literal, Literal};
pub use overlay::{OverlayLayout, TextAnchor, TextOverlay, TextPlacement};
pub use profiles::{Demo, Profile, UnknownDemo};
pub use registry::{ParamSpec, ParameterRegistry, SEQUENCE_CAPACITY};
pub use session::{ConsoleSession, Signal};
pub use sync::{FrameSynchronizer, UniformDecl, UniformSink, UniformType};
pub use value::{Bounds, Value, ValueKind};
