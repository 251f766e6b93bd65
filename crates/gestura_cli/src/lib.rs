//! Gestura CLI
//!
//! Configuration loading and scripted replay behind the `gestura` binary.

pub mod config;
pub mod replay;
pub mod script;

pub use config::{GesturaConfig, ReplayConfig, CONFIG_FILE};
pub use replay::{run, RecognizerKind, ReplayReport, TimelineEntry};
pub use script::{ControlAction, ControlStep, ReplayScript, ScriptError, Step};
