//= MODS =====================================================================

mod cycle;
mod hierarchy;
mod light;
mod model;
mod render;
mod scene;

//= IMPORTS ==================================================================

use crate::render::Camera;
use crate::scene::Scene;

use clap::Parser;

use std::path::PathBuf;

//= CLI ======================================================================

#[derive(Parser)]
#[command(about = "Headless shaders-assignment scene with colour-cycling lights")]
struct Args {
    /// Number of simulated frames.
    #[arg(long, default_value_t = 300)]
    frames: u32,

    /// Fixed timestep per frame, in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    timestep: f32,

    #[arg(long, default_value_t = 1280)]
    width: u16,

    #[arg(long, default_value_t = 720)]
    height: u16,

    /// Write the final framebuffer to this PNG file.
    #[arg(long)]
    output: Option<PathBuf>,
}

//= MAIN STUFF! ==============================================================

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut scene = Scene::new()?;
    let mut camera = Camera::new(args.width, args.height);

    for frame in 0..args.frames {
        scene.update(args.timestep);
        camera.render(&scene);

        if frame % 60 == 0 {
            log::info!(
                "frame {}: teapot lights {:.2} | {:.2} | {:.2}",
                frame,
                scene.teapot_lights[0].colour,
                scene.teapot_lights[1].colour,
                scene.teapot_lights[2].colour,
            );
            log::debug!(
                "orbit light at {:.2}, vehicle at {:.2}",
                scene.light1.transform.position,
                scene.vehicle.transform.position,
            );
        }

        profiling::finish_frame!();
    }

    if let Some(path) = &args.output {
        camera.write_png(path)?;
        log::info!("Wrote final frame to {}", path.display());
    }

    Ok(())
}
