//! Sample scene and scripted pointer input for the demo command

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use canopy_animation::SceneAnimationExt;
use canopy_app::{Canvas, PointerInput};
use canopy_core::{
    Color, ImageContent, ImageId, ImageSlot, Listener, LoadedImage, MonospaceMeasurer, NodeId,
    NodeOptions, Point, Rect, Size, TextContent,
};

const COLUMNS: usize = 3;
const ROWS: usize = 2;
const CARD_WIDTH: f32 = 120.0;
const CARD_HEIGHT: f32 = 80.0;
const GAP: f32 = 20.0;
const MARGIN: f32 = 40.0;
const LIFT: f32 = 10.0;
const ICON_SIZE: f32 = 32.0;

const PALETTE: [Color; 3] = [Color::RED, Color::GREEN, Color::BLUE];
const HIGHLIGHT: Color = Color::rgb(1.0, 0.8, 0.2);

/// Handles into the sample scene
#[derive(Debug)]
pub struct Demo {
    pub cards: Vec<NodeId>,
    pub label: NodeId,
    pub icon: NodeId,
    /// Filled in by [`Demo::load_icon`]
    pub icon_slot: ImageSlot,
    pub clicks: Rc<Cell<u32>>,
    pub hovers: Rc<Cell<u32>>,
}

impl Demo {
    /// Finish the icon's simulated load
    pub fn load_icon(&self, canvas: &mut Canvas) -> Result<bool> {
        self.icon_slot.set(LoadedImage {
            id: ImageId(1),
            size: Size::new(ICON_SIZE, ICON_SIZE),
        });
        Ok(canvas.scene_mut().image_loaded(self.icon)?)
    }
}

/// One scripted pointer action
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScriptStep {
    Pointer(PointerInput, Point),
    Exit,
}

/// Populate the canvas layer with a grid of cards and a caption
///
/// Cards highlight while hovered and lift when clicked. The icon next to the
/// caption stays blank until [`Demo::load_icon`] runs.
pub fn build(canvas: &mut Canvas) -> Result<Demo> {
    let layer = canvas.layer();
    let clicks = Rc::new(Cell::new(0));
    let hovers = Rc::new(Cell::new(0));
    let scene = canvas.scene_mut();

    let mut cards = Vec::with_capacity(COLUMNS * ROWS);
    for row in 0..ROWS {
        for column in 0..COLUMNS {
            let color = PALETTE[(row + column) % PALETTE.len()];
            let bounds = Rect::new(
                MARGIN + column as f32 * (CARD_WIDTH + GAP),
                MARGIN + row as f32 * (CARD_HEIGHT + GAP),
                CARD_WIDTH,
                CARD_HEIGHT,
            );
            let card = scene.create_node(NodeOptions::new().with_fill(color).with_bounds(bounds));
            scene.add_child(layer, card)?;
            scene.add_listener(card, card_listener(color, &clicks, &hovers))?;
            cards.push(card);
        }
    }

    let caption_y = MARGIN + ROWS as f32 * (CARD_HEIGHT + GAP);
    let label = scene.create_node(NodeOptions::new().with_bounds(Rect::new(
        MARGIN, caption_y, 0.0, 0.0,
    )));
    scene.add_child(layer, label)?;
    scene.set_content(
        label,
        TextContent::new("canopy", Rc::new(MonospaceMeasurer::default())).with_color(Color::BLACK),
    )?;

    let icon_slot = ImageSlot::new();
    let icon_x = MARGIN + COLUMNS as f32 * (CARD_WIDTH + GAP) - GAP - ICON_SIZE;
    let icon = scene.create_node(NodeOptions::new().with_bounds(Rect::new(
        icon_x, caption_y, 0.0, 0.0,
    )));
    scene.add_child(layer, icon)?;
    scene.set_content(icon, ImageContent::new(Rc::new(icon_slot.clone())))?;

    Ok(Demo {
        cards,
        label,
        icon,
        icon_slot,
        clicks,
        hovers,
    })
}

fn card_listener(color: Color, clicks: &Rc<Cell<u32>>, hovers: &Rc<Cell<u32>>) -> Rc<Listener> {
    let clicks = clicks.clone();
    let hovers = hovers.clone();
    Rc::new(
        Listener::new()
            .on_pointer_enter(move |scene, event| {
                hovers.set(hovers.get() + 1);
                scene.set_fill(event.current, Some(HIGHLIGHT))
            })
            .on_pointer_leave(move |scene, event| scene.set_fill(event.current, Some(color)))
            .on_click(move |scene, event| {
                clicks.set(clicks.get() + 1);
                let mut target = scene.transform(event.current)?;
                target.translate(0.0, -LIFT);
                scene.animate_to_transform(event.current, target, Duration::from_millis(300))?;
                Ok(())
            }),
    )
}

/// Pointer script: sweep across the first row, click the middle card, leave
///
/// Returns `(frame, step)` pairs in frame order.
pub fn pointer_script(canvas: &Canvas, demo: &Demo) -> Result<Vec<(u32, ScriptStep)>> {
    let scene = canvas.scene();
    let mut script = Vec::new();
    let mut frame = 1;
    for &card in demo.cards.iter().take(COLUMNS) {
        let center = scene.global_full_bounds(card)?.center();
        script.push((frame, ScriptStep::Pointer(PointerInput::Move, center)));
        frame += 2;
    }
    if let Some(&middle) = demo.cards.get(COLUMNS / 2) {
        let center = scene.global_full_bounds(middle)?.center();
        script.push((frame, ScriptStep::Pointer(PointerInput::Move, center)));
        script.push((frame, ScriptStep::Pointer(PointerInput::Down, center)));
        script.push((frame, ScriptStep::Pointer(PointerInput::Up, center)));
        script.push((frame, ScriptStep::Pointer(PointerInput::Click, center)));
        frame += 2;
    }
    script.push((frame, ScriptStep::Exit));
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_app::CanvasConfig;
    use canopy_core::{ActivityScheduler, Clock, ManualClock, RecordingPainter};

    #[test]
    fn test_demo_layout() {
        let mut canvas = Canvas::new(CanvasConfig::default()).unwrap();
        let demo = build(&mut canvas).unwrap();
        assert_eq!(demo.cards.len(), COLUMNS * ROWS);

        let first = canvas.scene().full_bounds(demo.cards[0]).unwrap();
        assert_eq!(first, Rect::new(40.0, 40.0, 120.0, 80.0));
        assert_eq!(
            canvas.picked_nodes(first.center().x, first.center().y).unwrap(),
            vec![demo.cards[0]]
        );
        assert_eq!(
            canvas.scene().full_bounds(demo.label).unwrap(),
            Rect::new(40.0, 240.0, 72.0, 20.0)
        );
    }

    #[test]
    fn test_hover_and_click() {
        let clock = ManualClock::new();
        let mut canvas = Canvas::with_scheduler(
            CanvasConfig::default(),
            ActivityScheduler::new().with_clock(clock.clone()),
        )
        .unwrap();
        let demo = build(&mut canvas).unwrap();
        let card = demo.cards[1];
        let center = canvas.scene().global_full_bounds(card).unwrap().center();

        canvas
            .handle_pointer(PointerInput::Move, center.x, center.y)
            .unwrap();
        assert_eq!(demo.hovers.get(), 1);
        assert_eq!(canvas.scene().node(card).unwrap().fill(), Some(HIGHLIGHT));

        canvas
            .handle_pointer(PointerInput::Click, center.x, center.y)
            .unwrap();
        assert_eq!(demo.clicks.get(), 1);

        clock.advance(Duration::from_millis(300));
        let mut painter = RecordingPainter::default();
        canvas.run_frame(clock.now(), &mut painter).unwrap();
        assert_eq!(
            canvas.scene().transform(card).unwrap().offset(),
            Point::new(0.0, -LIFT)
        );

        canvas.pointer_exit().unwrap();
        assert_eq!(canvas.scene().node(card).unwrap().fill(), Some(Color::GREEN));
    }

    #[test]
    fn test_icon_appears_after_load() {
        let mut canvas = Canvas::new(CanvasConfig::default()).unwrap();
        let demo = build(&mut canvas).unwrap();
        let mut painter = RecordingPainter::new(Size::new(800.0, 600.0));
        canvas.run_frame(std::time::Instant::now(), &mut painter).unwrap();
        assert!(painter.images().is_empty());

        assert!(demo.load_icon(&mut canvas).unwrap());
        assert_eq!(
            canvas.scene().full_bounds(demo.icon).unwrap(),
            Rect::new(408.0, 240.0, 32.0, 32.0)
        );
        painter.clear();
        let report = canvas.run_frame(std::time::Instant::now(), &mut painter).unwrap();
        assert!(report.painted);
        assert_eq!(
            painter.images(),
            vec![(ImageId(1), Rect::new(408.0, 240.0, 32.0, 32.0))]
        );
    }

    #[test]
    fn test_script_ends_with_exit() {
        let mut canvas = Canvas::new(CanvasConfig::default()).unwrap();
        let demo = build(&mut canvas).unwrap();
        let script = pointer_script(&canvas, &demo).unwrap();
        assert_eq!(script.last().map(|(_, step)| *step), Some(ScriptStep::Exit));
        assert!(script.windows(2).all(|pair| pair[0].0 <= pair[1].0));
    }
}
