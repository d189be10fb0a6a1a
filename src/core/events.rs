//! Engine event queue
//!
//! Double-buffered queue for decoupled communication between the script
//! runtime, the host game and engine systems. Events pushed during frame N
//! are visible to readers during frame N+1, after [`EventQueue::swap`].

use std::collections::VecDeque;

use hecs::Entity;

use crate::script::CallbackKind;

/// Engine-level events.
///
/// `#[non_exhaustive]` so new variants can be added without breaking
/// downstream wildcard matches.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum EngineEvent {
    /// A script published a diagnostic message
    ScriptMessage {
        /// Entity the script is attached to
        entity: Entity,
        /// Message text
        message: String,
    },

    /// A script callback failed; the instance has been disabled
    ScriptError {
        /// Entity the script is attached to
        entity: Entity,
        /// Script type name
        script: String,
        /// The callback that failed
        method: CallbackKind,
        /// Error description
        message: String,
    },

    /// An entity's own enabled flag was toggled
    EntityEnabled {
        /// The toggled entity
        entity: Entity,
        /// New flag value
        enabled: bool,
    },

    /// A scene finished instantiating
    SceneLoaded {
        /// Scene name
        name: String,
    },
}

/// Double-buffered event queue for frame-consistent processing.
///
/// Push during frame N, swap at the frame boundary, read during frame N+1.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this frame
    pending: VecDeque<EngineEvent>,
    /// Events from the previous frame, ready for processing
    processing: VecDeque<EngineEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with the given initial capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event to be processed next frame
    #[inline]
    pub fn push(&mut self, event: EngineEvent) {
        self.pending.push_back(event);
    }

    /// Swap the pending and processing queues; call once per frame
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous frame
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &EngineEvent> {
        self.processing.iter()
    }

    /// Drain all events from the previous frame
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = EngineEvent> + '_ {
        self.processing.drain(..)
    }

    /// Any events ready for processing?
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Number of events ready for processing
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Number of events pending for next frame
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear all events, both pending and processing
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
