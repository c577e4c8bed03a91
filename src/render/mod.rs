//! Full-frame fisheye rendering of a Mercator panorama.
//!
//! The [`FisheyeRenderer`] walks the output plane in strict row-major order
//! and computes one panorama sample per pixel: the camera unprojects the
//! pixel to a world direction, the direction is converted to longitude and
//! Mercator latitude, and the panorama answers the pixel-space lookup. View
//! directions with no stored data resolve to [`Pixel::NO_DATA`].
//!
//! The frame buffer is preallocated to its final size and written by
//! `row * width + col` index, so rendering is idempotent and every per-pixel
//! sample is independent of all others.

use log::debug;
use nalgebra::Vector3;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use crate::camera::{FisheyeCamera, Resolution};
use crate::panorama::{PanoramaError, PanoramaImage, Pixel};

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("Frame is incomplete: render() has not run to completion")]
    FrameIncomplete,
    #[error("Panorama lookup failed: {0}")]
    Panorama(#[from] PanoramaError),
}

/// Renders the view of one [`FisheyeCamera`] into a fixed-size frame.
///
/// The renderer borrows the panorama read-only and owns the output frame.
/// "Render incomplete" is an explicit state: [`FisheyeRenderer::image`]
/// refuses to hand out a frame before [`FisheyeRenderer::render`] has run to
/// completion.
pub struct FisheyeRenderer<'a> {
    camera: FisheyeCamera,
    panorama: &'a PanoramaImage,
    frame: Vec<Pixel>,
    complete: bool,
}

impl<'a> FisheyeRenderer<'a> {
    /// Creates a renderer with a preallocated frame of
    /// `width * height` pixels.
    pub fn new(camera: FisheyeCamera, panorama: &'a PanoramaImage) -> Self {
        let Resolution { width, height } = camera.resolution();
        FisheyeRenderer {
            camera,
            panorama,
            frame: vec![Pixel::default(); width as usize * height as usize],
            complete: false,
        }
    }

    /// Renders the full frame, one sample per output pixel.
    ///
    /// Pixels are visited in row-major order and written at index
    /// `row * width + col`; calling `render` again recomputes the identical
    /// frame. Every view direction resolves to either a stored panorama
    /// sample or [`Pixel::NO_DATA`], so a full pass always completes.
    pub fn render(&mut self) -> Result<(), RenderError> {
        let Resolution { width, height } = self.camera.resolution();
        for row in 0..height {
            for col in 0..width {
                let color = self.render_pixel(row, col)?;
                self.frame[(row * width + col) as usize] = color;
            }
        }
        self.complete = true;
        debug!(
            "rendered {}x{} frame from {}x{} panorama",
            width,
            height,
            self.panorama.width(),
            self.panorama.height()
        );
        Ok(())
    }

    fn render_pixel(&self, row: u32, col: u32) -> Result<Pixel, RenderError> {
        match self.camera.ray_for_pixel(row, col) {
            Some(direction) => self.sample_direction(&direction),
            // Outside the circular field of view.
            None => Ok(Pixel::NO_DATA),
        }
    }

    /// Samples the panorama in the given world direction.
    ///
    /// Longitude comes from the azimuth wrapped into `[0, 2π)` and negated
    /// (the panorama's horizontal axis runs opposite the mathematical
    /// convention); latitude goes through the Mercator log-tangent transform.
    /// Both pixel coordinates are truncated toward zero, never rounded, so
    /// neighboring output pixels may alias to one panorama sample.
    fn sample_direction(&self, direction: &Vector3<f64>) -> Result<Pixel, RenderError> {
        let mut lambda = direction.y.atan2(direction.x);
        if lambda < 0.0 {
            lambda += TAU;
        }
        lambda = -lambda;
        let fi = -direction.z.clamp(-1.0, 1.0).acos() + FRAC_PI_2;

        let scale = self.panorama.scale();
        let px = (scale * lambda) as i64;
        let py = (scale * (FRAC_PI_4 + fi / 2.0).tan().ln()) as i64;

        // The log-tangent map diverges near the poles; latitudes past the
        // stored band have no panorama data.
        let half_height = self.panorama.height() as i64 / 2;
        if py > half_height || py <= -half_height {
            return Ok(Pixel::NO_DATA);
        }

        // py == height/2 resolves to buffer row 0, where longitudes past -π
        // give a negative flat index. The panorama holds no sample there; it
        // is the same no-data condition as the band check above, not a
        // failure of the render.
        match self.panorama.color_at(px, py) {
            Ok(color) => Ok(color),
            Err(PanoramaError::SampleOutOfRange { .. }) => Ok(Pixel::NO_DATA),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns a snapshot copy of the rendered frame.
    ///
    /// # Errors
    ///
    /// [`RenderError::FrameIncomplete`] until a [`FisheyeRenderer::render`]
    /// call has completed a full pass.
    pub fn image(&self) -> Result<Vec<Pixel>, RenderError> {
        if !self.complete {
            return Err(RenderError::FrameIncomplete);
        }
        Ok(self.frame.clone())
    }

    /// Output frame size in pixels.
    pub fn resolution(&self) -> Resolution {
        self.camera.resolution()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// 30x64 panorama with a marker color at panorama coordinates (0, 0),
    /// which resolve to buffer row 32, column 15.
    fn marked_panorama() -> PanoramaImage {
        let mut pixels = vec![Pixel::new(10, 20, 30); 30 * 64];
        pixels[32 * 30 + 15] = Pixel::new(200, 100, 50);
        PanoramaImage::from_pixels(30, 64, pixels).unwrap()
    }

    fn hemispherical_camera(width: u32, height: u32) -> FisheyeCamera {
        FisheyeCamera::new(
            PI,
            0.0,
            Vector3::zeros(),
            Resolution { width, height },
        )
        .unwrap()
    }

    #[test]
    fn test_image_before_render_is_incomplete() {
        let panorama = marked_panorama();
        let renderer = FisheyeRenderer::new(hemispherical_camera(16, 16), &panorama);
        assert!(matches!(renderer.image(), Err(RenderError::FrameIncomplete)));
    }

    #[test]
    fn test_pixels_outside_disk_are_no_data() {
        let panorama = marked_panorama();
        let mut renderer = FisheyeRenderer::new(hemispherical_camera(16, 16), &panorama);
        renderer.render().unwrap();
        let frame = renderer.image().unwrap();

        for row in 0..16u32 {
            for col in 0..16u32 {
                let xn = 2.0 * col as f64 / 16.0 - 1.0;
                let yn = 1.0 - 2.0 * row as f64 / 16.0;
                if (xn * xn + yn * yn).sqrt() > 1.0 {
                    assert_eq!(
                        frame[(row * 16 + col) as usize],
                        Pixel::NO_DATA,
                        "pixel ({row}, {col}) lies outside the fisheye disk"
                    );
                }
            }
        }
        // The four corners are always among them.
        assert_eq!(frame[0], Pixel::NO_DATA);
        assert_eq!(frame[15], Pixel::NO_DATA);
        assert_eq!(frame[15 * 16], Pixel::NO_DATA);
        assert_eq!(frame[16 * 16 - 1], Pixel::NO_DATA);
    }

    #[test]
    fn test_center_pixel_samples_panorama_origin() {
        let panorama = marked_panorama();
        let mut renderer = FisheyeRenderer::new(hemispherical_camera(16, 16), &panorama);
        renderer.render().unwrap();
        let frame = renderer.image().unwrap();

        // The exact center of an even-dimensioned frame normalizes to
        // (0, 0): the pole direction (1, 0, 0), longitude 0, latitude 0.
        assert_eq!(frame[8 * 16 + 8], Pixel::new(200, 100, 50));
    }

    #[test]
    fn test_truncation_aliases_neighbor_onto_center_sample() {
        // One pixel left of center maps to px = trunc(-0.9375) = 0; flooring
        // would land one panorama column over. Accepted aliasing.
        let panorama = marked_panorama();
        let mut renderer = FisheyeRenderer::new(hemispherical_camera(16, 16), &panorama);
        renderer.render().unwrap();
        let frame = renderer.image().unwrap();

        assert_eq!(frame[8 * 16 + 7], Pixel::new(200, 100, 50));
    }

    #[test]
    fn test_latitude_beyond_mercator_band_is_no_data() {
        // The top-center pixel sits exactly on the rim with direction
        // (0, 0, 1): latitude 90 degrees, far past the stored band.
        let panorama = marked_panorama();
        let mut renderer = FisheyeRenderer::new(hemispherical_camera(16, 16), &panorama);
        renderer.render().unwrap();
        let frame = renderer.image().unwrap();

        assert_eq!(frame[8], Pixel::NO_DATA);
    }

    #[test]
    fn test_pole_direction_samples_to_no_data() {
        let panorama = marked_panorama();
        let renderer = FisheyeRenderer::new(hemispherical_camera(16, 16), &panorama);

        let zenith = renderer
            .sample_direction(&Vector3::new(0.0, 0.0, 1.0))
            .unwrap();
        assert_eq!(zenith, Pixel::NO_DATA);
        let nadir = renderer
            .sample_direction(&Vector3::new(0.0, 0.0, -1.0))
            .unwrap();
        assert_eq!(nadir, Pixel::NO_DATA);
    }

    #[test]
    fn test_band_edge_row_past_longitude_pi_is_no_data() {
        // A latitude that truncates to exactly height/2 passes the band
        // check and resolves to buffer row 0. Combined with a longitude past
        // -π the flat index goes negative; that lookup must come back as the
        // no-data sentinel, not abort the sample.
        let panorama = marked_panorama();
        let renderer = FisheyeRenderer::new(hemispherical_camera(16, 16), &panorama);

        // ln(tan(π/4 + fi/2)) = 6.8, so py = trunc(scale * 6.8) = 32, the
        // band edge of the 64-row panorama.
        let fi = 2.0 * (6.8_f64.exp().atan() - FRAC_PI_4);
        let z = fi.sin();
        // Horizontal azimuth 225 degrees: wraps to a longitude past -π.
        let c = ((1.0 - z * z) / 2.0).sqrt();
        let direction = Vector3::new(-c, -c, z);

        let color = renderer.sample_direction(&direction).unwrap();
        assert_eq!(color, Pixel::NO_DATA);
    }

    #[test]
    fn test_reference_job_renders_full_frame() {
        // The reference job: 2058x1746 panorama, hemispherical lens, 600x600
        // output. Its geometry lands samples on the band-edge row, so the
        // whole frame completing is part of what this test pins down.
        let background = Pixel::new(10, 20, 30);
        let marker = Pixel::new(200, 100, 50);
        let mut pixels = vec![background; 2058 * 1746];
        // Panorama coordinates (0, 0) resolve to buffer row 873, column 1029.
        pixels[873 * 2058 + 1029] = marker;
        let panorama = PanoramaImage::from_pixels(2058, 1746, pixels).unwrap();

        let mut renderer = FisheyeRenderer::new(hemispherical_camera(600, 600), &panorama);
        renderer.render().unwrap();
        let frame = renderer.image().unwrap();
        assert_eq!(frame.len(), 600 * 600);

        for row in 0..600u32 {
            for col in 0..600u32 {
                let xn = 2.0 * col as f64 / 600.0 - 1.0;
                let yn = 1.0 - 2.0 * row as f64 / 600.0;
                let pixel = frame[(row * 600 + col) as usize];
                if (xn * xn + yn * yn).sqrt() > 1.0 {
                    assert_eq!(
                        pixel,
                        Pixel::NO_DATA,
                        "pixel ({row}, {col}) lies outside the fisheye disk"
                    );
                } else {
                    assert!(
                        pixel == background || pixel == marker || pixel == Pixel::NO_DATA,
                        "pixel ({row}, {col}) is not a panorama sample or the sentinel"
                    );
                }
            }
        }

        assert_eq!(frame[300 * 600 + 300], marker);
    }

    #[test]
    fn test_render_is_idempotent() {
        let panorama = marked_panorama();
        let mut renderer = FisheyeRenderer::new(hemispherical_camera(16, 16), &panorama);
        renderer.render().unwrap();
        let first = renderer.image().unwrap();
        renderer.render().unwrap();
        let second = renderer.image().unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 16 * 16);
    }

    #[test]
    fn test_frame_index_matches_row_major_order() {
        let panorama = marked_panorama();
        let mut renderer = FisheyeRenderer::new(hemispherical_camera(10, 6), &panorama);
        renderer.render().unwrap();
        let frame = renderer.image().unwrap();

        assert_eq!(frame.len(), 60);
        for row in 0..6u32 {
            for col in 0..10u32 {
                let expected = renderer.render_pixel(row, col).unwrap();
                assert_eq!(frame[(row * 10 + col) as usize], expected);
            }
        }
    }
}
