//= IMPORTS ==================================================================

use crate::model::Transform;

use glam::{Mat4, Vec3};

//= CONSTANTS ================================================================

const MOVE_SPEED: f32 = 50.0;
const ROT_SPEED: f32 = 2.0;
const MAX_STEER: f32 = 0.60; // radians, front wheel yaw limit

//= NODE DESCRIPTION =========================================================

/// One node of a multi-part model, the shape a mesh importer hands over:
/// a parent index plus the local placement decomposed from the node matrix.
/// Node 0 is the root and names itself as parent.
pub(crate) struct NodeDesc {
    pub(crate) parent: usize,
    pub(crate) position: Vec3,
    pub(crate) rotation: Vec3,
    pub(crate) scale: f32,
    pub(crate) has_geometry: bool,
}

//= HIERARCHY MODEL ==========================================================

/// A model subtree. Children own their subtrees; world matrices are rebuilt
/// top-down every frame so a parent's motion carries its children along.
pub(crate) struct HierarchyModel {
    pub(crate) transform: Transform,
    pub(crate) has_geometry: bool,
    pub(crate) children: Vec<HierarchyModel>,
}

impl HierarchyModel {
    /// Build the tree from a node table. Every non-root node must name an
    /// earlier node as its parent, which is how importers emit them.
    pub(crate) fn from_nodes(nodes: &[NodeDesc]) -> Result<Self, String> {
        let Some(root) = nodes.first() else {
            return Err("Hierarchy node table is empty".to_string());
        };
        if root.parent != 0 {
            return Err("Hierarchy root must name itself as parent".to_string());
        }
        for (index, node) in nodes.iter().enumerate().skip(1) {
            if node.parent >= index {
                return Err(format!(
                    "Hierarchy node {} names parent {} which is not built yet",
                    index, node.parent
                ));
            }
        }
        Ok(Self::build(0, nodes))
    }

    fn build(index: usize, nodes: &[NodeDesc]) -> Self {
        let desc = &nodes[index];
        let children = nodes
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(child, node)| *child != index && node.parent == index)
            .map(|(child, _)| Self::build(child, nodes))
            .collect();
        Self {
            transform: Transform::new(desc.position, desc.rotation, desc.scale),
            has_geometry: desc.has_geometry,
            children,
        }
    }

    /// Rebuild world matrices for the whole subtree:
    /// world = parent_world * local.
    pub(crate) fn update_matrices(&mut self, parent_world: Mat4) {
        self.transform.update_matrix();
        self.transform.world = parent_world * self.transform.world;
        for child in &mut self.children {
            child.update_matrices(self.transform.world);
        }
    }

    /// Drive the vehicle. `throttle` and `steer` are in [-1, 1]; the front
    /// wheel yaw is clamped to the steering limit, and the body yaws in
    /// proportion to it while moving. Reads the world matrix built on the
    /// previous frame, matching the original update order.
    pub(crate) fn drive(&mut self, frame_time: f32, throttle: f32, steer: f32) {
        let wheel_yaw = self
            .children
            .first()
            .map_or(0.0, |wheel| wheel.transform.rotation.y);

        if throttle != 0.0 {
            let forward = self.transform.world.z_axis.truncate();
            self.transform.position += forward * (MOVE_SPEED / 2.0) * throttle * frame_time;
            self.transform.rotation.y += ROT_SPEED * (wheel_yaw * 2.0) * throttle * frame_time;

            // Front wheels spin with the motion.
            for wheel in self.children.iter_mut().take(2) {
                wheel.transform.rotation.x += (ROT_SPEED * 2.0) * throttle * frame_time;
            }
        }

        if steer != 0.0 {
            if let Some(wheel) = self.children.first_mut() {
                let yaw = wheel.transform.rotation.y + ROT_SPEED * steer * frame_time;
                wheel.transform.rotation.y = yaw.clamp(-MAX_STEER, MAX_STEER);
            }
        }
    }

    /// Number of nodes in the subtree, root included.
    pub(crate) fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(HierarchyModel::node_count)
            .sum::<usize>()
    }
}

//= TESTS ====================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn leaf(parent: usize, position: Vec3) -> NodeDesc {
        NodeDesc {
            parent,
            position,
            rotation: Vec3::ZERO,
            scale: 1.0,
            has_geometry: true,
        }
    }

    #[test]
    fn builds_the_tree_from_parent_indices() {
        let nodes = [
            leaf(0, Vec3::ZERO),                    // root
            leaf(0, Vec3::new(1.0, 0.0, 0.0)),      // child a
            leaf(0, Vec3::new(-1.0, 0.0, 0.0)),     // child b
            leaf(1, Vec3::new(0.0, 1.0, 0.0)),      // grandchild of a
        ];
        let tree = HierarchyModel::from_nodes(&nodes).unwrap();

        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].children.len(), 1);
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn rejects_forward_parent_references() {
        let nodes = [leaf(0, Vec3::ZERO), leaf(2, Vec3::ZERO), leaf(0, Vec3::ZERO)];
        assert!(HierarchyModel::from_nodes(&nodes).is_err());
        assert!(HierarchyModel::from_nodes(&[]).is_err());
    }

    #[test]
    fn world_matrices_propagate_down_the_tree() {
        let nodes = [
            leaf(0, Vec3::new(10.0, 0.0, 0.0)),
            leaf(0, Vec3::new(0.0, 2.0, 0.0)),
            leaf(1, Vec3::new(0.0, 0.0, 3.0)),
        ];
        let mut tree = HierarchyModel::from_nodes(&nodes).unwrap();
        tree.update_matrices(Mat4::IDENTITY);

        let child = &tree.children[0];
        let grandchild = &child.children[0];

        let child_pos = child.transform.world.transform_point3(Vec3::ZERO);
        assert!((child_pos - Vec3::new(10.0, 2.0, 0.0)).length() < EPS);

        let grandchild_pos = grandchild.transform.world.transform_point3(Vec3::ZERO);
        assert!((grandchild_pos - Vec3::new(10.0, 2.0, 3.0)).length() < EPS);
    }

    #[test]
    fn parent_rotation_carries_children_along() {
        let nodes = [
            leaf(0, Vec3::ZERO),
            leaf(0, Vec3::new(0.0, 0.0, 2.0)),
        ];
        let mut tree = HierarchyModel::from_nodes(&nodes).unwrap();
        tree.transform.rotation.y = std::f32::consts::FRAC_PI_2;
        tree.update_matrices(Mat4::IDENTITY);

        let child_pos = tree.children[0].transform.world.transform_point3(Vec3::ZERO);
        assert!((child_pos - Vec3::new(2.0, 0.0, 0.0)).length() < EPS);
    }

    #[test]
    fn steering_is_clamped_and_body_yaws_while_moving() {
        let nodes = [
            leaf(0, Vec3::ZERO),
            leaf(0, Vec3::new(1.5, 0.5, 2.0)), // front wheel
            leaf(0, Vec3::new(-1.5, 0.5, 2.0)),
        ];
        let mut tree = HierarchyModel::from_nodes(&nodes).unwrap();
        tree.update_matrices(Mat4::IDENTITY);

        // Hold full steer for far longer than the limit allows.
        for _ in 0..100 {
            tree.drive(0.1, 0.0, 1.0);
        }
        assert!((tree.children[0].transform.rotation.y - MAX_STEER).abs() < EPS);

        // Driving forward with steered wheels turns the body and spins wheels.
        let body_yaw = tree.transform.rotation.y;
        let wheel_spin = tree.children[0].transform.rotation.x;
        tree.drive(0.1, 1.0, 0.0);
        assert!(tree.transform.rotation.y > body_yaw);
        assert!(tree.children[0].transform.rotation.x > wheel_spin);
        assert!(tree.children[1].transform.rotation.x > wheel_spin);

        // Moving along +Z from rest.
        assert!(tree.transform.position.z > 0.0);
    }
}
