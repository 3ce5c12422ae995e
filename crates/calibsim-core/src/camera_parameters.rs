//! Camera intrinsics and lens distortion.
//!
//! Raw configuration ([`RawCameraConfig`]) is normalized into a canonical
//! [`CameraParameters`] record. Distortion coefficients are only ever
//! populated for a model this crate understands; anything else is an error.

use std::fmt;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

/// Minimum pixel separation between detected target corners.
pub const MIN_DISTANCE_BETWEEN_TARGET_CORNERS: f64 = 30.0;

/// Number of elements in a row-major 3x3 intrinsic matrix.
const CAMERA_MATRIX_LEN: usize = 9;

/// Number of coefficients a plumb_bob model reads.
const PLUMB_BOB_LEN: usize = 5;

/// Lens distortion model selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistortionModel {
    /// Radial-tangential model with `[k1, k2, p1, p2, k3]` coefficients.
    PlumbBob,
    /// Any model name this crate does not implement.
    Unsupported(String),
}

impl DistortionModel {
    /// Parses a distortion model name as found in camera info files.
    #[must_use]
    pub fn parse(kind: &str) -> Self {
        match kind {
            "plumb_bob" => DistortionModel::PlumbBob,
            other => DistortionModel::Unsupported(other.to_string()),
        }
    }

    /// Returns the canonical model name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            DistortionModel::PlumbBob => "plumb_bob",
            DistortionModel::Unsupported(kind) => kind,
        }
    }
}

impl fmt::Display for DistortionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distortion coefficients in OpenCV order of meaning.
///
/// `k1..k6` are radial terms (`k4..k6` form the rational denominator),
/// `p1, p2` are tangential terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DistortionCoefficients {
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
    pub k4: f64,
    pub k5: f64,
    pub k6: f64,
    pub p1: f64,
    pub p2: f64,
}

impl DistortionCoefficients {
    /// Dispatches on the model kind and reads its coefficient layout.
    pub fn for_model(model: &DistortionModel, data: &[f64]) -> Result<Self> {
        match model {
            DistortionModel::PlumbBob => {
                if data.len() < PLUMB_BOB_LEN {
                    return Err(SceneError::too_short(
                        "distortion_coefficients/data",
                        PLUMB_BOB_LEN,
                        data.len(),
                    ));
                }
                Ok(Self {
                    k1: data[0],
                    k2: data[1],
                    k3: data[4],
                    k4: 0.0,
                    k5: 0.0,
                    k6: 0.0,
                    p1: data[2],
                    p2: data[3],
                })
            }
            DistortionModel::Unsupported(kind) => {
                log::error!("unknown camera distortion model '{kind}'");
                Err(SceneError::UnsupportedDistortionModel(kind.clone()))
            }
        }
    }

    /// Applies the distortion to normalized image coordinates.
    #[must_use]
    pub fn distort(&self, normalized: DVec2) -> DVec2 {
        let (x, y) = (normalized.x, normalized.y);
        let r2 = x * x + y * y;
        let r4 = r2 * r2;
        let r6 = r4 * r2;

        let radial = (1.0 + self.k1 * r2 + self.k2 * r4 + self.k3 * r6)
            / (1.0 + self.k4 * r2 + self.k5 * r4 + self.k6 * r6);

        let xy = x * y;
        let x_tan = 2.0 * self.p1 * xy + self.p2 * (r2 + 2.0 * x * x);
        let y_tan = self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * xy;

        DVec2::new(x * radial + x_tan, y * radial + y_tan)
    }
}

/// Camera configuration as read from the parameter source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCameraConfig {
    pub image_width: i64,
    pub image_height: i64,
    pub camera_name: String,
    /// Row-major 3x3 intrinsic matrix.
    pub camera_matrix: Vec<f64>,
    pub distortion_model: String,
    pub distortion_coefficients: Vec<f64>,
}

/// Canonical camera intrinsics and distortion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraParameters {
    pub image_width: u32,
    pub image_height: u32,
    pub camera_name: String,
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    pub distortion_model: DistortionModel,
    pub distortion: DistortionCoefficients,
    pub min_distance_between_target_corners: f64,
}

impl CameraParameters {
    /// Normalizes raw configuration into a parameter record.
    ///
    /// Fails on a malformed intrinsic matrix, too few distortion
    /// coefficients, a non-positive image size, or an unsupported
    /// distortion model.
    pub fn from_raw(raw: &RawCameraConfig) -> Result<Self> {
        let image_width = image_dimension("image_width", raw.image_width)?;
        let image_height = image_dimension("image_height", raw.image_height)?;

        if raw.camera_matrix.len() != CAMERA_MATRIX_LEN {
            return Err(SceneError::malformed(
                "camera_matrix/data",
                CAMERA_MATRIX_LEN,
                raw.camera_matrix.len(),
            ));
        }
        let m = &raw.camera_matrix;

        let distortion_model = DistortionModel::parse(&raw.distortion_model);
        let distortion =
            DistortionCoefficients::for_model(&distortion_model, &raw.distortion_coefficients)?;

        Ok(Self {
            image_width,
            image_height,
            camera_name: raw.camera_name.clone(),
            fx: m[0],
            fy: m[4],
            cx: m[2],
            cy: m[5],
            distortion_model,
            distortion,
            min_distance_between_target_corners: MIN_DISTANCE_BETWEEN_TARGET_CORNERS,
        })
    }

    /// Projects a point given in the camera optical frame (z forward,
    /// x right, y down) to pixel coordinates.
    ///
    /// Returns `None` for points on or behind the image plane.
    #[must_use]
    pub fn project(&self, point: DVec3) -> Option<DVec2> {
        if point.z <= f64::EPSILON {
            return None;
        }
        let normalized = DVec2::new(point.x / point.z, point.y / point.z);
        let d = self.distortion.distort(normalized);
        Some(DVec2::new(self.fx * d.x + self.cx, self.fy * d.y + self.cy))
    }

    /// Returns true if the pixel lies inside the image.
    #[must_use]
    pub fn contains_pixel(&self, pixel: DVec2) -> bool {
        pixel.x >= 0.0
            && pixel.y >= 0.0
            && pixel.x < f64::from(self.image_width)
            && pixel.y < f64::from(self.image_height)
    }
}

/// Builds camera parameters from raw configuration.
pub fn build_camera_parameters(raw: &RawCameraConfig) -> Result<CameraParameters> {
    CameraParameters::from_raw(raw)
}

fn image_dimension(field: &str, value: i64) -> Result<u32> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| SceneError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a positive integer, got {value}"),
        })
}
