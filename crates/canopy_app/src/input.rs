//! Pointer input routing
//!
//! Bridges screen-space pointer input to node listeners.
//!
//! ```text
//! Pointer input (move, down, up, click)
//!     ↓
//! InputRouter (camera picking, enter/leave tracking)
//!     ↓
//! Listener callbacks, bubbling from each picked node to the root
//! ```

use std::rc::Rc;

use canopy_core::{EventType, NodeId, Point, PointerEvent, Scene};
use smallvec::SmallVec;
use tracing::trace;

use crate::error::Result;

/// Pointer input kinds fed to the router
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerInput {
    Move,
    Down,
    Up,
    Click,
}

impl PointerInput {
    pub fn event_type(self) -> EventType {
        match self {
            PointerInput::Move => EventType::PointerMove,
            PointerInput::Down => EventType::PointerDown,
            PointerInput::Up => EventType::PointerUp,
            PointerInput::Click => EventType::Click,
        }
    }
}

/// Routes pointer input through a camera to node listeners
///
/// Keeps the nodes picked by the previous input so it can synthesize
/// `PointerEnter`/`PointerLeave` as the pointer moves.
#[derive(Debug)]
pub struct InputRouter {
    camera: NodeId,
    position: Option<Point>,
    picked: Vec<NodeId>,
}

impl InputRouter {
    pub fn new(camera: NodeId) -> Self {
        Self {
            camera,
            position: None,
            picked: Vec::new(),
        }
    }

    pub fn camera(&self) -> NodeId {
        self.camera
    }

    /// Nodes picked by the last input
    pub fn picked(&self) -> &[NodeId] {
        &self.picked
    }

    /// Last pointer position, `None` after `pointer_exit` or before any input
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// Handle one pointer input at a screen position
    ///
    /// Emits, in order: `PointerLeave` for nodes no longer picked,
    /// `PointerEnter` for newly picked nodes, then the input's own event on
    /// every picked node. Returns `(target, event type)` for each emitted
    /// event.
    pub fn handle(
        &mut self,
        scene: &mut Scene,
        input: PointerInput,
        screen: Point,
    ) -> Result<Vec<(NodeId, EventType)>> {
        let current = scene.picked_nodes(self.camera, screen)?;
        let previous = std::mem::replace(&mut self.picked, current.clone());
        self.position = Some(screen);

        let picked: Rc<[NodeId]> = current.clone().into();
        let mut events = Vec::new();

        for &node in previous.iter().filter(|node| !current.contains(node)) {
            emit(scene, EventType::PointerLeave, node, screen, &picked, &mut events)?;
        }
        for &node in current.iter().filter(|node| !previous.contains(node)) {
            emit(scene, EventType::PointerEnter, node, screen, &picked, &mut events)?;
        }
        for &node in current.iter() {
            emit(scene, input.event_type(), node, screen, &picked, &mut events)?;
        }
        Ok(events)
    }

    pub fn pointer_move(&mut self, scene: &mut Scene, screen: Point) -> Result<Vec<(NodeId, EventType)>> {
        self.handle(scene, PointerInput::Move, screen)
    }

    pub fn pointer_down(&mut self, scene: &mut Scene, screen: Point) -> Result<Vec<(NodeId, EventType)>> {
        self.handle(scene, PointerInput::Down, screen)
    }

    pub fn pointer_up(&mut self, scene: &mut Scene, screen: Point) -> Result<Vec<(NodeId, EventType)>> {
        self.handle(scene, PointerInput::Up, screen)
    }

    pub fn click(&mut self, scene: &mut Scene, screen: Point) -> Result<Vec<(NodeId, EventType)>> {
        self.handle(scene, PointerInput::Click, screen)
    }

    /// The pointer left the canvas: every previously picked node gets
    /// `PointerLeave`
    pub fn pointer_exit(&mut self, scene: &mut Scene) -> Result<Vec<(NodeId, EventType)>> {
        let previous = std::mem::take(&mut self.picked);
        let screen = self.position.take().unwrap_or(Point::ZERO);
        let picked: Rc<[NodeId]> = Rc::from(Vec::new());

        let mut events = Vec::new();
        for node in previous {
            emit(scene, EventType::PointerLeave, node, screen, &picked, &mut events)?;
        }
        Ok(events)
    }
}

fn emit(
    scene: &mut Scene,
    event_type: EventType,
    target: NodeId,
    screen: Point,
    picked: &Rc<[NodeId]>,
    events: &mut Vec<(NodeId, EventType)>,
) -> Result<()> {
    if !scene.contains(target) {
        return Ok(());
    }
    events.push((target, event_type));
    dispatch(scene, event_type, target, screen, picked)
}

/// Bubble an event from `target` up to the root
///
/// Every listener on the chain with a handler for the event type is called,
/// nearest node first. Handlers may edit the scene; a node removed mid-dispatch
/// simply receives nothing.
fn dispatch(
    scene: &mut Scene,
    event_type: EventType,
    target: NodeId,
    screen: Point,
    picked: &Rc<[NodeId]>,
) -> Result<()> {
    let chain: SmallVec<[NodeId; 8]> = scene.ancestors(target).collect();
    for current in chain {
        let Some(node) = scene.node(current) else {
            continue;
        };
        let callbacks: SmallVec<[_; 4]> = node
            .listeners()
            .iter()
            .flat_map(|listener| listener.handlers(event_type).iter().cloned())
            .collect();
        if callbacks.is_empty() {
            continue;
        }

        trace!("{:?} -> {:?} ({} handlers)", event_type, current, callbacks.len());
        let event = PointerEvent {
            event_type,
            screen,
            target,
            current,
            picked: picked.clone(),
        };
        for callback in callbacks {
            callback(scene, &event)?;
        }
    }
    Ok(())
}
