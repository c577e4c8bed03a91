//! Fisheye panorama renderer
//!
//! Renders a square fisheye-lens view of a Mercator-projected panorama.
//!
//! Usage:
//! ```bash
//! cargo run --release -- --panorama test.ppm --output result.ppm \
//!   --aperture 180 --view-angle 0 --width 600 --height 600
//! ```

use clap::Parser;
use log::info;
use mercator_fisheye::camera::{FisheyeCamera, Resolution};
use mercator_fisheye::io;
use mercator_fisheye::render::FisheyeRenderer;
use nalgebra::Vector3;
use std::path::PathBuf;

/// Fisheye rendering of Mercator panoramas
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the Mercator panorama image
    #[arg(short, long)]
    panorama: PathBuf,

    /// Output path for the rendered binary pixmap
    #[arg(short, long, default_value = "result.ppm")]
    output: PathBuf,

    /// Full field of view of the lens in degrees
    #[arg(short, long, default_value = "180.0")]
    aperture: f64,

    /// View rotation around the z axis in degrees
    #[arg(short, long, default_value = "0.0")]
    view_angle: f64,

    /// Output image width in pixels
    #[arg(long, default_value = "600")]
    width: u32,

    /// Output image height in pixels
    #[arg(long, default_value = "600")]
    height: u32,

    /// Optional camera YAML file; overrides the camera flags
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let cli = Cli::parse();

    let panorama = io::load_panorama(&cli.panorama)?;
    info!(
        "Loaded {}x{} panorama from {:?} (scale {:.3} px/rad)",
        panorama.width(),
        panorama.height(),
        cli.panorama,
        panorama.scale()
    );

    let camera = match &cli.config {
        Some(path) => {
            let path = path
                .to_str()
                .ok_or_else(|| format!("Invalid config path: {path:?}"))?;
            info!("Loading camera from: {path}");
            FisheyeCamera::load_from_yaml(path)?
        }
        None => FisheyeCamera::new(
            cli.aperture.to_radians(),
            cli.view_angle.to_radians(),
            Vector3::zeros(),
            Resolution {
                width: cli.width,
                height: cli.height,
            },
        )?,
    };
    let resolution = camera.resolution();
    info!(
        "Rendering {}x{} fisheye view, aperture {:.1} degrees",
        resolution.width,
        resolution.height,
        camera.aperture().to_degrees()
    );

    let mut renderer = FisheyeRenderer::new(camera, &panorama);
    renderer.render()?;
    let frame = renderer.image()?;

    io::save_frame(&cli.output, resolution, &frame)?;
    info!("Wrote {:?}", cli.output);

    Ok(())
}
