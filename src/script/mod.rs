//! Entity-component script runtime
//!
//! Scripts are user-authored behavior units bound to exactly one entity.
//! Each entity carries at most one [`ScriptContainer`] component which owns
//! an ordered list of [`ScriptInstance`]s. The container propagates
//! container-level and entity-level enable state into every instance and
//! guarantees that during a batch enable all `initialize` callbacks run
//! before any `post_initialize` callback.
//!
//! Script types are registered up front in a [`ScriptRegistry`], which
//! records a stable type id, a display name and the set of callbacks the
//! type actually implements. Callback failures never escape the container:
//! the failing instance is disabled and an error notification is emitted.

mod behaviour;
mod container;
mod events;
mod instance;
mod registry;
mod system;

pub use behaviour::{CallbackSet, Script, ScriptContext};
pub use container::{EnablePhase, ScriptContainer};
pub use events::{EventFilter, ScriptEvent, ScriptEventKind, ScriptValue};
pub use instance::{EnableEnv, ScriptInstance};
pub use registry::{ScriptDescriptor, ScriptRegistry, ScriptTypeId, derived_name, short_type_name};
pub use system::{attach_script, update_scripts, with_container};

use std::fmt;

/// Identifies one of the optional per-type script callbacks.
///
/// Presence of a callback is declared in a [`CallbackSet`] at registration
/// time and queried before every invocation; it is never probed at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    /// One-time setup, runs the first time an instance becomes enabled
    Initialize,
    /// Runs after every instance in the same enable batch has initialized
    PostInitialize,
    /// Per-tick update
    Update,
    /// Per-tick update, after all `Update` callbacks
    PostUpdate,
    /// Hot-reload hook, receives the previous behaviour instance
    Swap,
}

impl CallbackKind {
    /// Callback name as it appears in logs and error notifications
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::PostInitialize => "post_initialize",
            Self::Update => "update",
            Self::PostUpdate => "post_update",
            Self::Swap => "swap",
        }
    }
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the script runtime
#[derive(Debug, Clone)]
pub enum ScriptError {
    /// A script callback reported a failure
    Callback(String),
    /// Lookup of a script type that was never registered
    UnknownType(String),
}

impl ScriptError {
    /// Convenience constructor for callback failures
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Callback(message.into())
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(msg) => write!(f, "script callback failed: {msg}"),
            Self::UnknownType(name) => write!(f, "unknown script type: {name}"),
        }
    }
}

impl std::error::Error for ScriptError {}

impl From<String> for ScriptError {
    fn from(message: String) -> Self {
        Self::Callback(message)
    }
}

impl From<&str> for ScriptError {
    fn from(message: &str) -> Self {
        Self::Callback(message.to_string())
    }
}
