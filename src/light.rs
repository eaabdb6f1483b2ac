//= IMPORTS ==================================================================

use crate::cycle::{Color, ColorCycle};
use crate::model::{Technique, Transform};

use glam::{Mat4, Vec3};

//= CONSTANTS ================================================================

const DEFAULT_ORBIT_RADIUS: f32 = 15.0;
const DEFAULT_ORBIT_SPEED: f32 = 0.7;
const DEFAULT_CONE_ANGLE: f32 = 90.0; // degrees

const SPOT_NEAR: f32 = 0.1;
const SPOT_FAR: f32 = 1000.0;

//= LIGHT ====================================================================

/// A light marker in the scene. The colour is unclamped; the render step
/// consumes it as an additive tint. The cycle owns the FSM phase and mutates
/// the colour once per frame.
pub(crate) struct Light {
    pub(crate) transform: Transform,
    pub(crate) colour: Color,
    pub(crate) cycle: ColorCycle,
    pub(crate) technique: Technique,
    orbit_radius: f32,
    orbit_speed: f32,
    cone_angle: f32,
}

impl Light {
    pub(crate) fn new(position: Vec3, colour: Color, cycle: ColorCycle) -> Self {
        Self {
            transform: Transform::new(position, Vec3::ZERO, 4.0),
            colour,
            cycle,
            technique: Technique::AdditiveTexTint,
            orbit_radius: DEFAULT_ORBIT_RADIUS,
            orbit_speed: DEFAULT_ORBIT_SPEED,
            cone_angle: DEFAULT_CONE_ANGLE,
        }
    }

    pub(crate) fn orbit_speed(&self) -> f32 {
        self.orbit_speed
    }

    pub(crate) fn cone_angle(&self) -> f32 {
        self.cone_angle
    }

    pub(crate) fn set_cone_angle(&mut self, cone_angle: f32) {
        self.cone_angle = cone_angle;
    }

    /// Advance the light's colour cycle by one frame. `step` is the
    /// elapsed-time-scaled value computed by the scene update.
    pub(crate) fn animate(&mut self, step: f32) {
        self.cycle.advance(&mut self.colour, step);
    }

    /// Place the light on its orbit circle around `center`.
    /// The caller owns the orbit angle and winds it down by
    /// `orbit_speed() * frame_time` each frame.
    pub(crate) fn orbit_around(&mut self, center: Vec3, angle: f32) {
        self.transform.position = center
            + Vec3::new(
                angle.cos() * self.orbit_radius,
                5.0,
                angle.sin() * self.orbit_radius,
            );
    }

    /// Camera-like view matrix for a spot light: the inverse of the light's
    /// world matrix.
    pub(crate) fn view_matrix(&self) -> Mat4 {
        self.transform.world.inverse()
    }

    /// Camera-like projection matrix for a spot light. The cone angle serves
    /// as the FOV, everything else is defaulted.
    pub(crate) fn proj_matrix(&self) -> Mat4 {
        Mat4::perspective_lh(self.cone_angle.to_radians(), 1.0, SPOT_NEAR, SPOT_FAR)
    }
}

//= TESTS ====================================================================
