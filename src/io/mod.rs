//! Panorama loading and frame saving.
//!
//! Decoding goes through the `image` crate, so the panorama may arrive as an
//! ASCII (`P3`) or binary (`P6`) pixmap — header tokens and comment lines
//! included — or any other supported raster format; whatever the container,
//! the result is a fully populated [`PanoramaImage`]. Rendered frames are
//! written as binary pixmaps, row-major RGB triples after a `P6` header.

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder};
use log::debug;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::camera::Resolution;
use crate::panorama::{PanoramaError, PanoramaImage, Pixel};

#[derive(thiserror::Error, Debug)]
pub enum PixmapError {
    #[error("Image codec error: {0}")]
    Codec(String),
    #[error("IO Error: {0}")]
    IOError(String),
    #[error("Frame buffer length {actual} does not match {width}x{height}")]
    FrameSizeMismatch {
        width: u32,
        height: u32,
        actual: usize,
    },
    #[error("Invalid panorama: {0}")]
    Panorama(#[from] PanoramaError),
}

impl From<std::io::Error> for PixmapError {
    fn from(err: std::io::Error) -> Self {
        PixmapError::IOError(err.to_string())
    }
}

impl From<image::ImageError> for PixmapError {
    fn from(err: image::ImageError) -> Self {
        PixmapError::Codec(err.to_string())
    }
}

/// Loads a panorama image from disk into a [`PanoramaImage`].
pub fn load_panorama<P: AsRef<Path>>(path: P) -> Result<PanoramaImage, PixmapError> {
    let rgb = image::open(path.as_ref())?.to_rgb8();
    let (width, height) = rgb.dimensions();
    let pixels = rgb
        .pixels()
        .map(|p| Pixel::new(p[0], p[1], p[2]))
        .collect();
    let panorama = PanoramaImage::from_pixels(width, height, pixels)?;
    debug!(
        "loaded {}x{} panorama from {:?}",
        width,
        height,
        path.as_ref()
    );
    Ok(panorama)
}

/// Writes a rendered frame to disk as a binary pixmap (`P6`).
///
/// # Errors
///
/// [`PixmapError::FrameSizeMismatch`] unless `pixels.len()` equals
/// `resolution.width * resolution.height`, plus io/codec failures.
pub fn save_frame<P: AsRef<Path>>(
    path: P,
    resolution: Resolution,
    pixels: &[Pixel],
) -> Result<(), PixmapError> {
    let Resolution { width, height } = resolution;
    if pixels.len() != width as usize * height as usize {
        return Err(PixmapError::FrameSizeMismatch {
            width,
            height,
            actual: pixels.len(),
        });
    }

    let mut bytes = Vec::with_capacity(pixels.len() * 3);
    for pixel in pixels {
        bytes.extend_from_slice(&[pixel.r, pixel.g, pixel.b]);
    }

    let writer = BufWriter::new(File::create(path.as_ref())?);
    let encoder =
        PnmEncoder::new(writer).with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary));
    encoder.write_image(&bytes, width, height, ExtendedColorType::Rgb8)?;
    debug!("wrote {}x{} frame to {:?}", width, height, path.as_ref());
    Ok(())
}
