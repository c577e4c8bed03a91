//! Mercator panorama storage and pixel-space lookup.
//!
//! A [`PanoramaImage`] holds a full 360°x180° spherical environment as a
//! rectangular buffer: horizontal position is linear in longitude, vertical
//! position is the log-tangent (Mercator) function of latitude. The buffer is
//! immutable after construction; the renderer only ever reads from it.

use std::f64::consts::TAU;

/// An 8-bit RGB color sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    /// The sentinel grey emitted whenever no panorama sample exists for a
    /// view direction. This value is user-visible output, not an error.
    pub const NO_DATA: Pixel = Pixel {
        r: 128,
        g: 128,
        b: 128,
    };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Pixel { r, g, b }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PanoramaError {
    #[error("Panorama dimensions must be non-zero")]
    DimensionsMustBeNonZero,
    #[error("Pixel buffer length {actual} does not match {width}x{height}")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        actual: usize,
    },
    #[error("Sample index out of range for panorama coordinates ({px}, {py})")]
    SampleOutOfRange { px: i64, py: i64 },
}

/// A Mercator-projected panorama image.
///
/// The projection scale `width / (2π)` — pixels per radian of longitude — is
/// fixed at construction and never recomputed.
#[derive(Debug, Clone)]
pub struct PanoramaImage {
    width: u32,
    height: u32,
    scale: f64,
    pixels: Vec<Pixel>,
}

impl PanoramaImage {
    /// Creates a panorama with a zero-initialized (black) buffer.
    pub fn new(width: u32, height: u32) -> Result<Self, PanoramaError> {
        if width == 0 || height == 0 {
            return Err(PanoramaError::DimensionsMustBeNonZero);
        }
        Ok(PanoramaImage {
            width,
            height,
            scale: width as f64 / TAU,
            pixels: vec![Pixel::default(); width as usize * height as usize],
        })
    }

    /// Creates a panorama from a fully populated row-major pixel buffer.
    ///
    /// # Errors
    ///
    /// * [`PanoramaError::DimensionsMustBeNonZero`]
    /// * [`PanoramaError::BufferSizeMismatch`] unless
    ///   `pixels.len() == width * height`
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Pixel>) -> Result<Self, PanoramaError> {
        if width == 0 || height == 0 {
            return Err(PanoramaError::DimensionsMustBeNonZero);
        }
        if pixels.len() != width as usize * height as usize {
            return Err(PanoramaError::BufferSizeMismatch {
                width,
                height,
                actual: pixels.len(),
            });
        }
        Ok(PanoramaImage {
            width,
            height,
            scale: width as f64 / TAU,
            pixels,
        })
    }

    /// Looks up the color at panorama coordinates.
    ///
    /// `px` is the horizontal offset in the panorama's own convention
    /// (increasing to the right), `py` the vertical offset from the vertical
    /// center, positive upward. The lookup resolves to the flat buffer index
    /// `(height/2 - py) * width + (px + width/2)`; an index outside the
    /// buffer is a caller contract violation reported as
    /// [`PanoramaError::SampleOutOfRange`]. No clamping or wraparound is
    /// performed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mercator_fisheye::panorama::{PanoramaImage, Pixel};
    ///
    /// let panorama = PanoramaImage::new(64, 32).unwrap();
    /// // (0, 0) is the center of the panorama, one row below the midline.
    /// assert_eq!(panorama.color_at(0, 0).unwrap(), Pixel::default());
    /// assert!(panorama.color_at(10_000, 0).is_err());
    /// ```
    pub fn color_at(&self, px: i64, py: i64) -> Result<Pixel, PanoramaError> {
        let row = self.height as i64 / 2 - py;
        let col = px + self.width as i64 / 2;
        let index = row * self.width as i64 + col;
        if index < 0 || index >= self.pixels.len() as i64 {
            return Err(PanoramaError::SampleOutOfRange { px, py });
        }
        Ok(self.pixels[index as usize])
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixels per radian of longitude, `width / (2π)`.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The row-major pixel buffer.
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }
}
