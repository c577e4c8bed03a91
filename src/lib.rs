//! Mercator Fisheye Library
//!
//! A Rust library for rendering fisheye-lens views of spherical environments
//! stored as Mercator-projected panorama images. This library provides:
//! - An equidistant fisheye camera model with a z-axis view rotation
//! - A Mercator (log-tangent latitude) panorama buffer with pixel-space lookup
//! - A row-major full-frame renderer producing one sample per output pixel
//! - Panorama loading and binary pixmap saving built on the `image` crate
//!
//! Output pixels with no panorama data for their view direction (outside the
//! fisheye disk, or beyond the stored latitude band) receive the grey sentinel
//! [`panorama::Pixel::NO_DATA`].

pub mod camera;
pub mod io;
pub mod panorama;
pub mod render;

// Re-export commonly used types
pub use camera::{CameraError, FisheyeCamera, Resolution};
pub use io::PixmapError;
pub use panorama::{PanoramaError, PanoramaImage, Pixel};
pub use render::{FisheyeRenderer, RenderError};
