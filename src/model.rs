//= IMPORTS ==================================================================

use crate::cycle::Color;

use glam::{EulerRot, Mat4, Quat, Vec3};

//= TRANSFORM ================================================================

/// Position, rotation and scaling plus the world matrix built from them.
/// Shared by composition between models, lights and hierarchy nodes.
#[derive(Clone, Debug)]
pub(crate) struct Transform {
    pub(crate) position: Vec3,
    pub(crate) rotation: Vec3, // Euler angles in radians
    pub(crate) scale: Vec3,
    pub(crate) world: Mat4,
}

impl Transform {
    pub(crate) fn new(position: Vec3, rotation: Vec3, scale: f32) -> Self {
        let mut transform = Self {
            position,
            rotation,
            scale: Vec3::splat(scale),
            world: Mat4::IDENTITY,
        };
        transform.update_matrix();
        transform
    }

    /// Rebuild the world matrix from position, rotation and scale.
    /// Rotation order is yaw, pitch, roll.
    pub(crate) fn update_matrix(&mut self) {
        let rotation = Quat::from_euler(
            EulerRot::YXZ,
            self.rotation.y,
            self.rotation.x,
            self.rotation.z,
        );
        self.world = Mat4::from_scale_rotation_translation(self.scale, rotation, self.position);
    }

    /// The direction the transform is facing: its world Z axis.
    pub(crate) fn facing(&self) -> Vec3 {
        self.world.z_axis.truncate().normalize()
    }

    /// Point the local Z axis at a target by recomputing yaw and pitch.
    /// Roll is reset to zero.
    pub(crate) fn face_point(&mut self, target: Vec3) {
        let direction = target - self.position;
        if direction.length_squared() < 1e-12 {
            return;
        }
        let direction = direction.normalize();
        let yaw = direction.x.atan2(direction.z);
        let pitch = (-direction.y).asin();
        self.rotation = Vec3::new(pitch, yaw, 0.0);
        self.update_matrix();
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO, 1.0)
    }
}

//= TECHNIQUE ================================================================

/// Which shader technique a model is drawn with. The assignment accumulated
/// these one revision at a time; here the technique is plain data that the
/// render step matches on, not a behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Technique {
    PlainColour,
    TintDiffuse,
    Wiggle,
    VertexLit,
    NormalMapping,
    AdditiveTexTint,
}

//= MODEL ====================================================================

pub(crate) struct Model {
    pub(crate) transform: Transform,
    pub(crate) colour: Color,
    pub(crate) technique: Technique,
}

impl Model {
    pub(crate) fn new(position: Vec3, colour: Color, technique: Technique) -> Self {
        Self {
            transform: Transform::new(position, Vec3::ZERO, 1.0),
            colour,
            technique,
        }
    }
}

//= TESTS ====================================================================
