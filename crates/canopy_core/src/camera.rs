//! Layers, cameras, and picking
//!
//! A camera shows an ordered list of layers through its view transform. The
//! camera→layers list and each layer's camera set are kept symmetric.
//!
//! Picking is bounds based: the screen point is mapped through the inverse view
//! transform, then into each layer, then recursively into every child whose full
//! bounds contain it. A node none of whose children match is a result, so an
//! empty spot on a layer picks the layer itself.

use tracing::trace;

use crate::error::{Result, SceneError};
use crate::geometry::{Point, Transform2D};
use crate::node::{Node, NodeId, NodeKind};
use crate::scene::Scene;

impl Scene {
    fn require_camera(&self, id: NodeId) -> Result<()> {
        if self.get(id)?.is_camera() {
            Ok(())
        } else {
            Err(SceneError::invalid(format!("{id:?} is not a camera")))
        }
    }

    fn require_layer(&self, id: NodeId) -> Result<()> {
        if self.get(id)?.is_layer() {
            Ok(())
        } else {
            Err(SceneError::invalid(format!("{id:?} is not a layer")))
        }
    }

    /// Show `layer` through `camera`, on top of its current layers
    ///
    /// Adding a layer the camera already shows is a no-op.
    pub fn add_layer(&mut self, camera: NodeId, layer: NodeId) -> Result<()> {
        self.require_camera(camera)?;
        self.require_layer(layer)?;

        if let NodeKind::Camera { layers, .. } = &mut self.get_mut(camera)?.kind {
            if !layers.contains(&layer) {
                layers.push(layer);
            }
        }
        if let NodeKind::Layer { cameras } = &mut self.get_mut(layer)?.kind {
            if !cameras.contains(&camera) {
                cameras.push(camera);
            }
        }
        self.invalidate_paint(camera);
        Ok(())
    }

    /// Stop showing `layer` through `camera`; a no-op when it is not shown
    pub fn remove_layer(&mut self, camera: NodeId, layer: NodeId) -> Result<()> {
        self.require_camera(camera)?;
        self.require_layer(layer)?;

        if let NodeKind::Camera { layers, .. } = &mut self.get_mut(camera)?.kind {
            layers.retain(|id| *id != layer);
        }
        if let NodeKind::Layer { cameras } = &mut self.get_mut(layer)?.kind {
            cameras.retain(|id| *id != camera);
        }
        self.invalidate_paint(camera);
        Ok(())
    }

    /// Same as [`Scene::remove_layer`], from the layer's side
    pub fn remove_camera(&mut self, layer: NodeId, camera: NodeId) -> Result<()> {
        self.remove_layer(camera, layer)
    }

    pub fn view_transform(&self, camera: NodeId) -> Result<Transform2D> {
        self.get(camera)?
            .view_transform()
            .copied()
            .ok_or_else(|| SceneError::invalid(format!("{camera:?} is not a camera")))
    }

    /// Replace the camera's pan/zoom; only paint is invalidated
    pub fn set_view_transform(&mut self, camera: NodeId, transform: Transform2D) -> Result<()> {
        match &mut self.get_mut(camera)?.kind {
            NodeKind::Camera { view_transform, .. } => *view_transform = transform,
            _ => return Err(SceneError::invalid(format!("{camera:?} is not a camera"))),
        }
        self.invalidate_paint(camera);
        Ok(())
    }

    /// Nodes under a screen point, across the camera's layers in paint order
    ///
    /// Fails only when the camera's view transform cannot be inverted. Hidden
    /// nodes and nodes with degenerate transforms are skipped along with their
    /// subtrees.
    pub fn picked_nodes(&self, camera: NodeId, screen: Point) -> Result<Vec<NodeId>> {
        let node = self.get(camera)?;
        let NodeKind::Camera {
            layers,
            view_transform,
        } = &node.kind
        else {
            return Err(SceneError::invalid(format!("{camera:?} is not a camera")));
        };

        let view_point = view_transform.invert()?.map_point(screen);
        let mut picked = Vec::new();
        for &layer_id in layers {
            let Some(layer) = self.node(layer_id) else {
                continue;
            };
            if !layer.visible {
                continue;
            }
            let Ok(inverse) = layer.transform.invert() else {
                trace!("layer {:?} is not invertible, skipped for picking", layer_id);
                continue;
            };
            self.pick_below(layer_id, layer, inverse.map_point(view_point), &mut picked);
        }
        Ok(picked)
    }

    fn pick_below(&self, id: NodeId, node: &Node, point: Point, picked: &mut Vec<NodeId>) {
        let before = picked.len();
        for &child_id in &node.children {
            let Some(child) = self.node(child_id) else {
                continue;
            };
            if !child.visible {
                continue;
            }
            let Ok(inverse) = child.transform.invert() else {
                continue;
            };
            let local = inverse.map_point(point);
            if self.full_bounds_of(child).contains(local) {
                self.pick_below(child_id, child, local, picked);
            }
        }
        if picked.len() == before {
            picked.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::node::NodeOptions;

    struct Fixture {
        scene: Scene,
        camera: NodeId,
        layer: NodeId,
    }

    fn fixture() -> Fixture {
        let mut scene = Scene::new();
        let root = scene.root();
        let layer = scene.create_layer(NodeOptions::new());
        let camera = scene.create_camera(Rect::new(0.0, 0.0, 400.0, 400.0));
        scene.add_child(root, layer).unwrap();
        scene.add_child(root, camera).unwrap();
        scene.add_layer(camera, layer).unwrap();
        Fixture {
            scene,
            camera,
            layer,
        }
    }

    fn add_rect(scene: &mut Scene, parent: NodeId, bounds: Rect) -> NodeId {
        let node = scene.create_node(NodeOptions::new().with_bounds(bounds));
        scene.add_child(parent, node).unwrap();
        node
    }

    #[test]
    fn test_pick_sibling_scenario() {
        let Fixture {
            mut scene,
            camera,
            layer,
        } = fixture();
        let first = add_rect(&mut scene, layer, Rect::new(0.0, 0.0, 100.0, 100.0));
        let _second = add_rect(&mut scene, layer, Rect::new(110.0, 0.0, 100.0, 100.0));

        assert_eq!(
            scene.picked_nodes(camera, Point::new(50.0, 50.0)).unwrap(),
            vec![first]
        );
        assert_eq!(
            scene.picked_nodes(camera, Point::new(200.0, 200.0)).unwrap(),
            vec![layer]
        );
    }

    #[test]
    fn test_pick_overlapping_returns_all_branches() {
        let Fixture {
            mut scene,
            camera,
            layer,
        } = fixture();
        let a = add_rect(&mut scene, layer, Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = add_rect(&mut scene, layer, Rect::new(50.0, 50.0, 100.0, 100.0));
        let leaf = add_rect(&mut scene, b, Rect::new(60.0, 60.0, 10.0, 10.0));

        assert_eq!(
            scene.picked_nodes(camera, Point::new(65.0, 65.0)).unwrap(),
            vec![a, leaf]
        );
        // Inside b but outside its leaf: b itself is the result for that branch.
        assert_eq!(
            scene.picked_nodes(camera, Point::new(120.0, 120.0)).unwrap(),
            vec![b]
        );
    }

    #[test]
    fn test_pick_through_view_and_node_transforms() {
        let Fixture {
            mut scene,
            camera,
            layer,
        } = fixture();
        let node = add_rect(&mut scene, layer, Rect::new(0.0, 0.0, 10.0, 10.0));
        scene.translate_by(node, 100.0, 0.0).unwrap();
        scene
            .set_view_transform(camera, Transform2D::new([2.0, 0.0, 0.0, 2.0, -50.0, 0.0]))
            .unwrap();

        // Screen (160, 10) -> view (105, 5) -> node-local (5, 5).
        assert_eq!(
            scene.picked_nodes(camera, Point::new(160.0, 10.0)).unwrap(),
            vec![node]
        );
        assert_eq!(
            scene.picked_nodes(camera, Point::new(100.0, 10.0)).unwrap(),
            vec![layer]
        );
    }

    #[test]
    fn test_pick_skips_degenerate_and_hidden() {
        let Fixture {
            mut scene,
            camera,
            layer,
        } = fixture();
        let flat = add_rect(&mut scene, layer, Rect::new(0.0, 0.0, 100.0, 100.0));
        scene.scale_by(flat, 0.0).unwrap();
        let hidden = add_rect(&mut scene, layer, Rect::new(0.0, 0.0, 100.0, 100.0));
        scene.set_visible(hidden, false).unwrap();

        assert_eq!(
            scene.picked_nodes(camera, Point::new(10.0, 10.0)).unwrap(),
            vec![layer]
        );

        scene
            .set_view_transform(camera, Transform2D::scaling(0.0, 1.0))
            .unwrap();
        assert!(matches!(
            scene.picked_nodes(camera, Point::new(10.0, 10.0)),
            Err(SceneError::DegenerateTransform { .. })
        ));
    }

    #[test]
    fn test_pick_multiple_layers_in_order() {
        let Fixture {
            mut scene,
            camera,
            layer,
        } = fixture();
        let root = scene.root();
        let top = scene.create_layer(NodeOptions::new());
        scene.add_child(root, top).unwrap();
        scene.add_layer(camera, top).unwrap();
        let node = add_rect(&mut scene, top, Rect::new(0.0, 0.0, 10.0, 10.0));

        assert_eq!(
            scene.picked_nodes(camera, Point::new(5.0, 5.0)).unwrap(),
            vec![layer, node]
        );
    }

    #[test]
    fn test_add_layer_symmetric_and_idempotent() {
        let Fixture {
            mut scene,
            camera,
            layer,
        } = fixture();
        scene.add_layer(camera, layer).unwrap();
        assert_eq!(scene.node(camera).unwrap().layers(), &[layer]);
        assert_eq!(scene.node(layer).unwrap().cameras(), &[camera]);

        scene.remove_camera(layer, camera).unwrap();
        assert!(scene.node(camera).unwrap().layers().is_empty());
        assert!(scene.node(layer).unwrap().cameras().is_empty());

        // Removing again is harmless.
        scene.remove_layer(camera, layer).unwrap();
    }

    #[test]
    fn test_layer_ops_check_kinds() {
        let Fixture {
            mut scene,
            camera,
            layer,
        } = fixture();
        let plain = scene.create_node(NodeOptions::new());

        assert!(matches!(
            scene.add_layer(layer, camera),
            Err(SceneError::InvalidArgument(_))
        ));
        assert!(scene.add_layer(camera, plain).is_err());
        assert!(scene.picked_nodes(plain, Point::ZERO).is_err());
        assert!(scene.view_transform(layer).is_err());
        assert!(scene
            .set_view_transform(plain, Transform2D::IDENTITY)
            .is_err());
    }

    #[test]
    fn test_view_transform_marks_paint_only() {
        let Fixture {
            mut scene,
            camera,
            layer,
        } = fixture();
        scene.full_bounds(layer).unwrap();
        scene.take_paint_stale();

        scene
            .set_view_transform(camera, Transform2D::translation(5.0, 5.0))
            .unwrap();
        assert!(scene.is_paint_stale());
        assert!(scene.node(layer).unwrap().cached_full_bounds().is_some());
        assert_eq!(
            scene.view_transform(camera).unwrap(),
            Transform2D::translation(5.0, 5.0)
        );
    }

    #[test]
    fn test_destroy_layer_detaches_from_camera() {
        let Fixture {
            mut scene,
            camera,
            layer,
        } = fixture();
        scene.destroy(layer).unwrap();
        assert!(scene.node(camera).unwrap().layers().is_empty());
        assert_eq!(
            scene.picked_nodes(camera, Point::new(1.0, 1.0)).unwrap(),
            Vec::<NodeId>::new()
        );
    }
}
