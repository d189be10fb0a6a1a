//! Script instance notifications
//!
//! Every [`crate::script::ScriptInstance`] carries its own typed listener
//! list. Events are an explicit enum rather than string-keyed pub/sub;
//! listeners register with a filter and are delivered in registration order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::script::CallbackKind;

/// A dynamically-typed script attribute value.
///
/// Attributes are author-editable values stored per instance and carried in
/// scene files; changes fire [`ScriptEvent::Attr`] notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptValue {
    /// Unset / removed
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ScriptValue {
    /// Read the value as a float, converting integers
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Read the value as a bool
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Read the value as a string slice
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

impl From<bool> for ScriptValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ScriptValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ScriptValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ScriptValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Notification fired by a script instance
#[derive(Debug, Clone)]
pub enum ScriptEvent {
    /// The instance's effective state flipped to enabled
    Enabled,
    /// The instance's effective state flipped to disabled
    Disabled,
    /// Fired alongside `Enabled`/`Disabled` with the new state
    State(bool),
    /// Fired just before the `initialize` callback runs
    PreInitialize,
    /// An attribute changed value
    Attr {
        name: String,
        new_value: ScriptValue,
        old_value: ScriptValue,
    },
    /// A callback failed; the instance has been disabled
    Error {
        method: CallbackKind,
        message: String,
    },
    /// The instance was destroyed and will never run again
    Destroyed,
}

impl ScriptEvent {
    /// Discriminant of this event, for filter matching
    #[must_use]
    pub const fn kind(&self) -> ScriptEventKind {
        match self {
            Self::Enabled => ScriptEventKind::Enabled,
            Self::Disabled => ScriptEventKind::Disabled,
            Self::State(_) => ScriptEventKind::State,
            Self::PreInitialize => ScriptEventKind::PreInitialize,
            Self::Attr { .. } => ScriptEventKind::Attr,
            Self::Error { .. } => ScriptEventKind::Error,
            Self::Destroyed => ScriptEventKind::Destroyed,
        }
    }
}

/// Discriminant-only view of [`ScriptEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptEventKind {
    Enabled,
    Disabled,
    State,
    PreInitialize,
    Attr,
    Error,
    Destroyed,
}

/// Selects which events a listener receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFilter {
    /// Every event
    Any,
    /// Events of one kind (`Attr` matches every attribute)
    Kind(ScriptEventKind),
    /// Attribute changes for one named attribute
    Attr(String),
}

impl EventFilter {
    /// Does this filter accept the given event?
    #[must_use]
    pub fn matches(&self, event: &ScriptEvent) -> bool {
        match self {
            Self::Any => true,
            Self::Kind(kind) => event.kind() == *kind,
            Self::Attr(filter_name) => {
                matches!(event, ScriptEvent::Attr { name, .. } if name == filter_name)
            }
        }
    }
}

type Listener = Box<dyn FnMut(&ScriptEvent) + Send + Sync>;

/// Ordered listener list for one script instance.
///
/// Listeners are delivered in registration order. Dispatch iterates by
/// index so the list length is re-read every step; a listener cannot mutate
/// the list (it only borrows the event), so no snapshot is needed.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<(EventFilter, Listener)>,
}

impl EventDispatcher {
    /// Create an empty dispatcher
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for events accepted by `filter`
    pub fn on(
        &mut self,
        filter: EventFilter,
        listener: impl FnMut(&ScriptEvent) + Send + Sync + 'static,
    ) {
        self.listeners.push((filter, Box::new(listener)));
    }

    /// Deliver an event to every matching listener, in registration order
    pub fn emit(&mut self, event: &ScriptEvent) {
        let mut index = 0;
        while index < self.listeners.len() {
            let (filter, listener) = &mut self.listeners[index];
            if filter.matches(event) {
                listener(event);
            }
            index += 1;
        }
    }

    /// Number of registered listeners
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether any listeners are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    // The closure owns clones of both inputs, so it captures no borrows.
    fn record(
        log: &Arc<Mutex<Vec<String>>>,
        tag: &str,
    ) -> impl FnMut(&ScriptEvent) + Send + Sync + use<> {
        let log = Arc::clone(log);
        let tag = tag.to_string();
        move |event: &ScriptEvent| {
            log.lock().unwrap().push(format!("{tag}:{:?}", event.kind()));
        }
    }

    #[test]
    fn test_delivery_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.on(EventFilter::Any, record(&log, "first"));
        dispatcher.on(EventFilter::Any, record(&log, "second"));

        dispatcher.emit(&ScriptEvent::Enabled);

        let entries = log.lock().unwrap();
        assert_eq!(entries.as_slice(), ["first:Enabled", "second:Enabled"]);
    }

    #[test]
    fn test_listener_outlives_helper_inputs() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        {
            // Both borrows end here; the registered listener must not
            // be tied to them.
            let tag = String::from("scoped");
            dispatcher.on(EventFilter::Any, record(&log, &tag));
        }

        dispatcher.emit(&ScriptEvent::Destroyed);

        let entries = log.lock().unwrap();
        assert_eq!(entries.as_slice(), ["scoped:Destroyed"]);
    }

    #[test]
    fn test_kind_filter() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.on(EventFilter::Kind(ScriptEventKind::Disabled), record(&log, "dis"));

        dispatcher.emit(&ScriptEvent::Enabled);
        dispatcher.emit(&ScriptEvent::Disabled);
        dispatcher.emit(&ScriptEvent::State(false));

        let entries = log.lock().unwrap();
        assert_eq!(entries.as_slice(), ["dis:Disabled"]);
    }

    #[test]
    fn test_attr_filter_matches_single_name() {
        let hits = Arc::new(Mutex::new(0u32));
        let mut dispatcher = EventDispatcher::new();
        let hits_clone = Arc::clone(&hits);
        dispatcher.on(EventFilter::Attr("speed".to_string()), move |_| {
            *hits_clone.lock().unwrap() += 1;
        });

        let speed = ScriptEvent::Attr {
            name: "speed".to_string(),
            new_value: ScriptValue::Float(2.0),
            old_value: ScriptValue::Null,
        };
        let health = ScriptEvent::Attr {
            name: "health".to_string(),
            new_value: ScriptValue::Int(10),
            old_value: ScriptValue::Null,
        };

        dispatcher.emit(&speed);
        dispatcher.emit(&health);

        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_kind_attr_matches_every_attribute() {
        let hits = Arc::new(Mutex::new(0u32));
        let mut dispatcher = EventDispatcher::new();
        let hits_clone = Arc::clone(&hits);
        dispatcher.on(EventFilter::Kind(ScriptEventKind::Attr), move |_| {
            *hits_clone.lock().unwrap() += 1;
        });

        for name in ["speed", "health"] {
            dispatcher.emit(&ScriptEvent::Attr {
                name: name.to_string(),
                new_value: ScriptValue::Bool(true),
                old_value: ScriptValue::Null,
            });
        }

        assert_eq!(*hits.lock().unwrap(), 2);
    }

    #[test]
    fn test_script_value_conversions() {
        assert_eq!(ScriptValue::from(2i64).as_f64(), Some(2.0));
        assert_eq!(ScriptValue::from(true).as_bool(), Some(true));
        assert_eq!(ScriptValue::from("hi").as_str(), Some("hi"));
        assert_eq!(ScriptValue::Null.as_bool(), None);
    }
}
