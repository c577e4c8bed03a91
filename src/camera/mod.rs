use serde::{Deserialize, Serialize};

pub mod fisheye;

pub use fisheye::FisheyeCamera;

/// Output image resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

#[derive(thiserror::Error, Debug)]
pub enum CameraError {
    #[error("Aperture must be positive and finite")]
    ApertureMustBePositive,
    #[error("View angle must be finite")]
    ViewAngleMustBeFinite,
    #[error("Output resolution must be non-zero")]
    ResolutionMustBeNonZero,
    #[error("Invalid camera parameters: {0}")]
    InvalidParams(String),
    #[error("Failed to load YAML: {0}")]
    YamlError(String),
    #[error("IO Error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for CameraError {
    fn from(err: std::io::Error) -> Self {
        CameraError::IOError(err.to_string())
    }
}

impl From<yaml_rust::ScanError> for CameraError {
    fn from(err: yaml_rust::ScanError) -> Self {
        CameraError::YamlError(err.to_string())
    }
}

/// Common validation functions for camera parameters
pub mod validation {
    use super::*;

    pub fn validate_aperture(aperture: f64) -> Result<(), CameraError> {
        if !(aperture.is_finite() && aperture > 0.0) {
            return Err(CameraError::ApertureMustBePositive);
        }
        Ok(())
    }

    pub fn validate_view_angle(view_angle: f64) -> Result<(), CameraError> {
        if !view_angle.is_finite() {
            return Err(CameraError::ViewAngleMustBeFinite);
        }
        Ok(())
    }

    pub fn validate_resolution(resolution: &Resolution) -> Result<(), CameraError> {
        if resolution.width == 0 || resolution.height == 0 {
            return Err(CameraError::ResolutionMustBeNonZero);
        }
        Ok(())
    }
}
