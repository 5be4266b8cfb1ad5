//! Listener capability sets
//!
//! A [`Listener`] is a set of callbacks keyed by [`EventType`]. Nodes hold an
//! ordered, deduplicated list of `Rc<Listener>`; dispatch asks each listener
//! whether it handles a given event type instead of requiring a common base.
//! Bubbling dispatch itself lives with the input router in `canopy_app`.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::Result;
use crate::geometry::Point;
use crate::node::NodeId;
use crate::scene::Scene;

/// Pointer event kinds understood by listeners
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    PointerDown,
    PointerUp,
    PointerMove,
    PointerEnter,
    PointerLeave,
}

/// Event delivered to a listener callback
#[derive(Clone, Debug)]
pub struct PointerEvent {
    pub event_type: EventType,
    /// Pointer position in screen (canvas) coordinates
    pub screen: Point,
    /// The picked node the event bubbles from
    pub target: NodeId,
    /// The node whose listener is being invoked
    pub current: NodeId,
    /// Every node picked under the pointer for this input
    pub picked: Rc<[NodeId]>,
}

/// Callback for handling events
///
/// Callbacks receive the scene mutably so they can edit nodes or schedule
/// activities. Uses Rc since the scene is single-threaded.
pub type EventCallback = Rc<dyn Fn(&mut Scene, &PointerEvent) -> Result<()>>;

/// A set of event callbacks, at most a few per event type
#[derive(Clone, Default)]
pub struct Listener {
    handlers: FxHashMap<EventType, SmallVec<[EventCallback; 1]>>,
}

impl Listener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a callback for an event type
    pub fn on<F>(mut self, event_type: EventType, callback: F) -> Self
    where
        F: Fn(&mut Scene, &PointerEvent) -> Result<()> + 'static,
    {
        self.handlers
            .entry(event_type)
            .or_default()
            .push(Rc::new(callback));
        self
    }

    pub fn on_click<F>(self, callback: F) -> Self
    where
        F: Fn(&mut Scene, &PointerEvent) -> Result<()> + 'static,
    {
        self.on(EventType::Click, callback)
    }

    pub fn on_pointer_enter<F>(self, callback: F) -> Self
    where
        F: Fn(&mut Scene, &PointerEvent) -> Result<()> + 'static,
    {
        self.on(EventType::PointerEnter, callback)
    }

    pub fn on_pointer_leave<F>(self, callback: F) -> Self
    where
        F: Fn(&mut Scene, &PointerEvent) -> Result<()> + 'static,
    {
        self.on(EventType::PointerLeave, callback)
    }

    pub fn has_handler(&self, event_type: EventType) -> bool {
        self.handlers
            .get(&event_type)
            .is_some_and(|callbacks| !callbacks.is_empty())
    }

    pub fn handlers(&self, event_type: EventType) -> &[EventCallback] {
        self.handlers
            .get(&event_type)
            .map(|callbacks| callbacks.as_slice())
            .unwrap_or(&[])
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().collect();
        kinds.sort_by_key(|kind| format!("{kind:?}"));
        f.debug_struct("Listener").field("handles", &kinds).finish()
    }
}
