//! Implements the equidistant fisheye camera model.
//!
//! This module provides the [`FisheyeCamera`] struct describing a wide-angle
//! lens: a full field of view (aperture), a z-axis view rotation, a camera
//! position and an output resolution. Its central operation is
//! [`FisheyeCamera::ray_for_pixel`], which unprojects an output pixel to the
//! world-space view direction seen through the lens, using the equidistant
//! mapping `phi = r * aperture / 2` from normalized disk radius to polar angle.

use nalgebra::{Rotation3, Vector3};
use std::fs;
use std::io::Write;
use yaml_rust::YamlLoader;

use crate::camera::{validation, CameraError, Resolution};

/// An equidistant fisheye camera.
///
/// The camera covers a circular disk inscribed in the square output plane;
/// pixels outside that disk see nothing. The aperture is the full angular
/// field of view in radians, so an aperture of `PI` is a 180° hemispherical
/// lens. The view angle builds a fixed rotation around the z axis that is
/// applied to every sampled direction; a view angle of zero leaves directions
/// unrotated.
///
/// # Examples
///
/// ```rust
/// use nalgebra::Vector3;
/// use mercator_fisheye::camera::{FisheyeCamera, Resolution};
/// use std::f64::consts::PI;
///
/// let camera = FisheyeCamera::new(
///     PI,
///     0.0,
///     Vector3::zeros(),
///     Resolution { width: 600, height: 600 },
/// )
/// .unwrap();
///
/// // The optical axis of an even-dimensioned frame maps to the fixed
/// // world pole direction (1, 0, 0).
/// let ray = camera.ray_for_pixel(300, 300).unwrap();
/// assert!((ray.x - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct FisheyeCamera {
    aperture: f64,
    view_angle: f64,
    position: Vector3<f64>,
    resolution: Resolution,
    rotation: Rotation3<f64>,
}

impl FisheyeCamera {
    /// Creates a new [`FisheyeCamera`] and precomputes its view rotation.
    ///
    /// # Arguments
    ///
    /// * `aperture` - Full angular field of view in radians; must be positive
    ///   and finite.
    /// * `view_angle` - Rotation offset around the z axis in radians.
    /// * `position` - Camera position in world space. The position is carried
    ///   as camera state but does not enter the direction math; the panorama
    ///   is sampled as seen from its own center.
    /// * `resolution` - Output plane size in pixels; both dimensions must be
    ///   non-zero.
    ///
    /// # Errors
    ///
    /// * [`CameraError::ApertureMustBePositive`]
    /// * [`CameraError::ViewAngleMustBeFinite`]
    /// * [`CameraError::ResolutionMustBeNonZero`]
    pub fn new(
        aperture: f64,
        view_angle: f64,
        position: Vector3<f64>,
        resolution: Resolution,
    ) -> Result<Self, CameraError> {
        let camera = FisheyeCamera {
            aperture,
            view_angle,
            position,
            resolution,
            rotation: Rotation3::from_axis_angle(&Vector3::z_axis(), view_angle),
        };

        camera.validate_params()?;

        Ok(camera)
    }

    /// Unprojects an output pixel to its world-space view direction.
    ///
    /// Returns `None` when the pixel lies outside the circular fisheye field
    /// of view (normalized radius greater than one). That is the disk-mask
    /// boundary, not an error; callers substitute the no-data sentinel color.
    ///
    /// The pixel center is normalized into `[-1, 1] x [-1, 1]` with row 0 at
    /// the top of the frame, mapped through the equidistant rule
    /// `phi = r * aperture / 2`, rotated by the view angle around the z axis,
    /// and finally remapped from camera-local axes to world axes by the fixed
    /// change of basis `(x, y, z) -> (z, -x, y)`.
    pub fn ray_for_pixel(&self, row: u32, col: u32) -> Option<Vector3<f64>> {
        // Normalize (row, col) to [-1, 1]; row 0 maps to the top (yn = 1).
        let xn = 2.0 * col as f64 / self.resolution.width as f64 - 1.0;
        let yn = 1.0 - 2.0 * row as f64 / self.resolution.height as f64;

        let r = (xn * xn + yn * yn).sqrt();
        if r > 1.0 {
            return None;
        }

        // theta: azimuth in the image plane, phi: polar angle off the optical
        // axis, linear in the disk radius (equidistant fisheye).
        let theta = yn.atan2(xn);
        let phi = r * self.aperture / 2.0;

        let local = Vector3::new(
            theta.cos() * phi.sin(),
            theta.sin() * phi.sin(),
            phi.cos(),
        );
        let rotated = self.rotation * local;

        // Camera-local spherical axes to world axes. This remap is a design
        // constant of the panorama convention and must not change.
        Some(Vector3::new(rotated.z, -rotated.x, rotated.y))
    }

    /// Loads camera parameters from a YAML file.
    ///
    /// The expected layout mirrors the calibration-file convention used by
    /// the samples in `samples/`:
    ///
    /// ```yaml
    /// cam0:
    ///   camera_model: fisheye_equidistant
    ///   aperture: 3.141592653589793
    ///   view_angle: 0.0
    ///   position: [0.0, 0.0, 0.0]
    ///   resolution: [600, 600]
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::IOError`] when the file cannot be read,
    /// [`CameraError::YamlError`] on malformed YAML,
    /// [`CameraError::InvalidParams`] on missing or mistyped fields, and the
    /// validation errors of [`FisheyeCamera::new`] on out-of-range values.
    pub fn load_from_yaml(path: &str) -> Result<Self, CameraError> {
        let contents = fs::read_to_string(path)?;
        let docs = YamlLoader::load_from_str(&contents)?;
        let doc = &docs[0];

        let aperture = doc["cam0"]["aperture"].as_f64().ok_or_else(|| {
            CameraError::InvalidParams("Invalid aperture: not a float".to_string())
        })?;
        let view_angle = doc["cam0"]["view_angle"].as_f64().ok_or_else(|| {
            CameraError::InvalidParams("Invalid view_angle: not a float".to_string())
        })?;

        let position_yaml = doc["cam0"]["position"].as_vec().ok_or_else(|| {
            CameraError::InvalidParams("YAML missing 'position' or not an array".to_string())
        })?;
        if position_yaml.len() != 3 {
            return Err(CameraError::InvalidParams(
                "Invalid position: expected 3 components".to_string(),
            ));
        }
        let mut position = Vector3::zeros();
        for (i, value) in position_yaml.iter().enumerate() {
            position[i] = value.as_f64().ok_or_else(|| {
                CameraError::InvalidParams("Invalid position component: not a float".to_string())
            })?;
        }

        let resolution_yaml = doc["cam0"]["resolution"].as_vec().ok_or_else(|| {
            CameraError::InvalidParams("YAML missing 'resolution' or not an array".to_string())
        })?;
        let resolution = Resolution {
            width: resolution_yaml[0].as_i64().ok_or_else(|| {
                CameraError::InvalidParams("Invalid width: not an integer".to_string())
            })? as u32,
            height: resolution_yaml[1].as_i64().ok_or_else(|| {
                CameraError::InvalidParams("Invalid height: not an integer".to_string())
            })? as u32,
        };

        FisheyeCamera::new(aperture, view_angle, position, resolution)
    }

    /// Saves the camera parameters to a YAML file in the layout read by
    /// [`FisheyeCamera::load_from_yaml`].
    pub fn save_to_yaml(&self, path: &str) -> Result<(), CameraError> {
        let yaml = serde_yaml::to_value(serde_yaml::Mapping::from_iter([(
            serde_yaml::Value::String("cam0".to_string()),
            serde_yaml::to_value(serde_yaml::Mapping::from_iter([
                (
                    serde_yaml::Value::String("camera_model".to_string()),
                    serde_yaml::Value::String("fisheye_equidistant".to_string()),
                ),
                (
                    serde_yaml::Value::String("aperture".to_string()),
                    serde_yaml::to_value(self.aperture)
                        .map_err(|e| CameraError::YamlError(e.to_string()))?,
                ),
                (
                    serde_yaml::Value::String("view_angle".to_string()),
                    serde_yaml::to_value(self.view_angle)
                        .map_err(|e| CameraError::YamlError(e.to_string()))?,
                ),
                (
                    serde_yaml::Value::String("position".to_string()),
                    serde_yaml::to_value(vec![
                        self.position.x,
                        self.position.y,
                        self.position.z,
                    ])
                    .map_err(|e| CameraError::YamlError(e.to_string()))?,
                ),
                (
                    serde_yaml::Value::String("resolution".to_string()),
                    serde_yaml::to_value(vec![self.resolution.width, self.resolution.height])
                        .map_err(|e| CameraError::YamlError(e.to_string()))?,
                ),
            ]))
            .map_err(|e| CameraError::YamlError(e.to_string()))?,
        )]))
        .map_err(|e| CameraError::YamlError(e.to_string()))?;

        let yaml_string =
            serde_yaml::to_string(&yaml).map_err(|e| CameraError::YamlError(e.to_string()))?;

        let mut file =
            fs::File::create(path).map_err(|e| CameraError::IOError(e.to_string()))?;

        file.write_all(yaml_string.as_bytes())
            .map_err(|e| CameraError::IOError(e.to_string()))?;

        Ok(())
    }

    /// Validates the camera parameters.
    pub fn validate_params(&self) -> Result<(), CameraError> {
        validation::validate_aperture(self.aperture)?;
        validation::validate_view_angle(self.view_angle)?;
        validation::validate_resolution(&self.resolution)?;
        Ok(())
    }

    /// Full angular field of view in radians.
    pub fn aperture(&self) -> f64 {
        self.aperture
    }

    /// View rotation offset around the z axis in radians.
    pub fn view_angle(&self) -> f64 {
        self.view_angle
    }

    /// Camera position in world space.
    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    /// Output plane size in pixels.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }
}
