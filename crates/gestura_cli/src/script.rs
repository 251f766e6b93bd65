//! Replay scripts
//!
//! A script is a JSON document with an ordered list of steps and an optional
//! `until` time:
//!
//! ```json
//! {
//!   "until": 4000,
//!   "steps": [
//!     { "timestamp": 0, "type": "pointer_down", "position": { "x": 10, "y": 10 } },
//!     { "timestamp": 650, "type": "pointer_up", "position": { "x": 10, "y": 10 } },
//!     { "timestamp": 900, "type": "settle", "ok": true }
//!   ]
//! }
//! ```
//!
//! Steps are either input events or control steps that call recognizer
//! methods with no input-event counterpart.

use anyhow::{Context, Result};
use gestura_core::{InputEvent, Timestamp};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("step {index} at {at} comes before the previous step at {previous}")]
    OutOfOrder {
        index: usize,
        at: Timestamp,
        previous: Timestamp,
    },

    #[error("`until` ({until}) is before the last step ({last})")]
    UntilBeforeLastStep {
        until: Timestamp,
        last: Timestamp,
    },
}

/// Recognizer methods a script can call directly
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlAction {
    /// Resolve a pending slide-to-confirm
    Settle {
        #[serde(default = "default_ok")]
        ok: bool,
    },
    Dismiss,
    Reset,
    ContentEnter,
    ContentLeave,
    ContentFocus,
    ContentBlur,
    /// Only move time forward
    Advance,
}

fn default_ok() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlStep {
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub action: ControlAction,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Control(ControlStep),
    Input(InputEvent),
}

impl Step {
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Step::Control(step) => step.timestamp,
            Step::Input(event) => event.timestamp,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub until: Option<Timestamp>,
    pub steps: Vec<Step>,
}

impl ReplayScript {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid script {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let script: ReplayScript =
            serde_json::from_str(content).context("Failed to parse script")?;
        script.validate()?;
        Ok(script)
    }

    /// Steps must be in time order, and `until` must not precede them
    pub fn validate(&self) -> std::result::Result<(), ScriptError> {
        let mut previous = Timestamp::ZERO;
        for (index, step) in self.steps.iter().enumerate() {
            let at = step.timestamp();
            if at < previous {
                return Err(ScriptError::OutOfOrder {
                    index,
                    at,
                    previous,
                });
            }
            previous = at;
        }
        if let Some(until) = self.until {
            if until < previous {
                return Err(ScriptError::UntilBeforeLastStep {
                    until,
                    last: previous,
                });
            }
        }
        Ok(())
    }

    pub fn last_timestamp(&self) -> Timestamp {
        self.steps
            .last()
            .map(Step::timestamp)
            .unwrap_or(Timestamp::ZERO)
    }
}
