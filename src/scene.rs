//= IMPORTS ==================================================================

use crate::cycle::{Color, ColorCycle, PulsePhase, WalkPhase};
use crate::hierarchy::{HierarchyModel, NodeDesc};
use crate::light::Light;
use crate::model::{Model, Technique};

use glam::{Mat4, Vec3};

//= CONSTANTS ================================================================

const AMBIENT_COLOUR: Color = Color::new(0.15, 0.15, 0.15);
const SPECULAR_POWER: f32 = 256.0;

// Colour cycling runs at five times the frame time.
const COLOUR_RATE: f32 = 5.0;
const WIGGLE_RATE: f32 = 6.0;

//= SCENE ====================================================================

pub(crate) struct Scene {
    pub(crate) ambient_colour: Color,
    pub(crate) specular_power: f32,

    pub(crate) cube: Model,
    pub(crate) cardboard_box: Model,
    pub(crate) floor: Model,
    pub(crate) teapot: Model,

    pub(crate) light1: Light, // orbits the cardboard box
    pub(crate) light2: Light,
    pub(crate) teapot_lights: [Light; 3],

    pub(crate) vehicle: HierarchyModel,

    pub(crate) wiggle: f32,
    orbit_angle: f32,
}

impl Scene {
    pub(crate) fn new() -> Result<Self, String> {
        let cube = Model::new(
            Vec3::new(-20.0, 5.0, 0.0),
            Color::new(0.8, 0.8, 0.8),
            Technique::Wiggle,
        );

        let mut cardboard_box = Model::new(
            Vec3::new(30.0, 10.0, 0.0),
            Color::new(0.7, 0.6, 0.4),
            Technique::NormalMapping,
        );
        cardboard_box.transform.scale = Vec3::splat(8.0);
        cardboard_box.transform.update_matrix();

        let floor = Model::new(Vec3::ZERO, Color::new(0.5, 0.4, 0.3), Technique::VertexLit);
        let teapot = Model::new(
            Vec3::new(0.0, 0.0, 80.0),
            Color::new(0.6, 0.6, 0.6),
            Technique::VertexLit,
        );

        let light1 = Light::new(
            cardboard_box.transform.position,
            Color::new(1.0, 2.0, 0.7) * 5.0,
            ColorCycle::Steady,
        );
        let mut light2 = Light::new(
            Vec3::new(-20.0, 30.0, 50.0),
            Color::new(1.0, 0.8, 0.2) * 5.0,
            ColorCycle::Steady,
        );
        light2.set_cone_angle(45.0);

        // The teapot lights carry the cycling FSMs, seeded in their second
        // state to reproduce the original start-up behaviour.
        let teapot_lights = [
            Light::new(
                Vec3::new(0.0, 15.0, 80.0),
                Color::new(1.0, 0.0, 0.7) * 5.0,
                ColorCycle::Pulse {
                    min: Color::ZERO,
                    max: Color::new(5.0, 0.0, 3.5),
                    phase: PulsePhase::Falling,
                },
            ),
            Light::new(
                Vec3::new(20.0, 5.0, 80.0),
                Color::new(1.0, 0.4, 0.2) * 5.0,
                ColorCycle::HueWalk {
                    rate: 1.0,
                    phase: WalkPhase::RedFlare,
                },
            ),
            Light::new(
                Vec3::new(-20.0, 5.0, 80.0),
                Color::new(0.4, 0.4, 0.1) * 5.0,
                ColorCycle::HueWalk {
                    rate: 2.0,
                    phase: WalkPhase::RedFlare,
                },
            ),
        ];

        let vehicle = HierarchyModel::from_nodes(&vehicle_nodes())?;

        Ok(Self {
            ambient_colour: AMBIENT_COLOUR,
            specular_power: SPECULAR_POWER,
            cube,
            cardboard_box,
            floor,
            teapot,
            light1,
            light2,
            teapot_lights,
            vehicle,
            wiggle: 0.0,
            orbit_angle: 0.0,
        })
    }

    /// The per-frame update step. Single-threaded, called once per rendered
    /// frame; matrices are rebuilt after all movement so the render step sees
    /// a consistent scene.
    pub(crate) fn update(&mut self, frame_time: f32) {
        profiling::scope!("update");

        self.wiggle += WIGGLE_RATE * frame_time;

        // The first light orbits the cardboard box.
        self.light1
            .orbit_around(self.cardboard_box.transform.position, self.orbit_angle);
        self.orbit_angle -= self.light1.orbit_speed() * frame_time;

        // Advance the teapot light colour cycles.
        let colour_step = frame_time * COLOUR_RATE;
        for light in &mut self.teapot_lights {
            light.animate(colour_step);
        }

        // No input layer here: the vehicle follows a scripted weave.
        let steer = (self.wiggle * 0.25).sin();
        self.vehicle.drive(frame_time, 1.0, steer);

        self.cube.transform.update_matrix();
        self.cardboard_box.transform.update_matrix();
        self.floor.transform.update_matrix();
        self.teapot.transform.update_matrix();
        self.light1.transform.update_matrix();
        self.light2.transform.update_matrix();
        for light in &mut self.teapot_lights {
            light.transform.update_matrix();
        }
        self.vehicle.update_matrices(Mat4::IDENTITY);
    }
}

//= VEHICLE ==================================================================

/// Node table for the multi-part vehicle, laid out the way the importer
/// emits it: body first, then wheels, then the turret parts.
fn vehicle_nodes() -> [NodeDesc; 7] {
    let node = |parent: usize, position: Vec3, has_geometry: bool| NodeDesc {
        parent,
        position,
        rotation: Vec3::ZERO,
        scale: 1.0,
        has_geometry,
    };

    [
        node(0, Vec3::new(40.0, 0.0, 20.0), true), // body
        node(0, Vec3::new(1.5, 0.5, 2.5), true),   // front-left wheel
        node(0, Vec3::new(-1.5, 0.5, 2.5), true),  // front-right wheel
        node(0, Vec3::new(1.5, 0.5, -2.5), true),  // rear-left wheel
        node(0, Vec3::new(-1.5, 0.5, -2.5), true), // rear-right wheel
        node(0, Vec3::new(0.0, 2.0, 0.0), false),  // turret pivot
        node(5, Vec3::new(0.0, 0.5, 1.5), true),   // barrel
    ]
}

//= TESTS ====================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn initial_light_colours_match_the_setup() {
        let scene = Scene::new().unwrap();
        assert_eq!(scene.light1.colour, Color::new(5.0, 10.0, 3.5));
        assert_eq!(scene.teapot_lights[0].colour, Color::new(5.0, 0.0, 3.5));
        assert_eq!(scene.teapot_lights[2].colour, Color::new(2.0, 2.0, 0.5));
        assert_eq!(scene.ambient_colour, Color::new(0.15, 0.15, 0.15));
        assert_eq!(scene.specular_power, 256.0);
    }

    #[test]
    fn floor_is_drawn_lit() {
        let scene = Scene::new().unwrap();
        assert_eq!(scene.floor.technique, Technique::VertexLit);
    }

    #[test]
    fn update_moves_the_orbit_light_around_the_box() {
        let mut scene = Scene::new().unwrap();
        scene.update(1.0 / 60.0);

        let center = scene.cardboard_box.transform.position;
        let offset = scene.light1.transform.position - center;
        assert!((offset.y - 5.0).abs() < EPS);
        assert!((Vec3::new(offset.x, 0.0, offset.z).length() - 15.0).abs() < EPS);

        // The orbit angle winds down, so the light moves each frame.
        let first = scene.light1.transform.position;
        scene.update(1.0 / 60.0);
        assert!(scene.light1.transform.position != first);
    }

    #[test]
    fn update_advances_the_colour_cycles_at_scene_rate() {
        let mut scene = Scene::new().unwrap();
        let dt = 0.1;
        scene.update(dt);

        // Pulse light starts falling: every channel drops by 0.5 * dt * 5.
        let expected = Color::new(5.0, 0.0, 3.5) - Color::splat(0.5 * dt * COLOUR_RATE);
        assert!((scene.teapot_lights[0].colour - expected).length() < EPS);

        // The second light flares red, the third at double rate.
        let slow = scene.teapot_lights[1].colour;
        let fast = scene.teapot_lights[2].colour;
        assert!((slow.x - (5.0 + 0.5 * dt * COLOUR_RATE)).abs() < EPS);
        assert!((fast.x - (2.0 + 0.5 * dt * COLOUR_RATE * 2.0)).abs() < EPS);
    }

    #[test]
    fn zero_timestep_update_leaves_colours_and_phases_alone() {
        let mut scene = Scene::new().unwrap();
        let before: Vec<Color> = scene.teapot_lights.iter().map(|l| l.colour).collect();
        let cycles: Vec<ColorCycle> = scene.teapot_lights.iter().map(|l| l.cycle).collect();

        scene.update(0.0);

        for (light, colour) in scene.teapot_lights.iter().zip(&before) {
            assert_eq!(light.colour, *colour);
        }
        for (light, cycle) in scene.teapot_lights.iter().zip(&cycles) {
            assert_eq!(light.cycle, *cycle);
        }
    }

    #[test]
    fn vehicle_moves_and_keeps_its_wheels_attached() {
        let mut scene = Scene::new().unwrap();
        let start = scene.vehicle.transform.position;
        for _ in 0..10 {
            scene.update(1.0 / 60.0);
        }
        assert!(scene.vehicle.transform.position != start);

        // Wheel world positions follow the body.
        let body = scene.vehicle.transform.position;
        let wheel = scene.vehicle.children[0]
            .transform
            .world
            .transform_point3(Vec3::ZERO);
        assert!((wheel - body).length() < 4.0);
        assert_eq!(scene.vehicle.node_count(), 7);
    }
}
