//! Scene configuration.
//!
//! Reads every parameter the standard scene needs from a [`ParamSource`].
//! Key names follow the camera-info and launch-file conventions the scene
//! was designed around, so a parameter file can be shared with other tools.

use std::path::Path;

use calibsim_core::{
    load_color, load_orientation, load_point, Color, DQuat, DVec3, JsonParams, ParamSource,
    RawCameraConfig, Result,
};
use calibsim_entities::{Camera, Target};

/// Everything needed to build a [`Scene`](crate::Scene).
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Reference frame of every entity.
    pub world_frame_id: String,
    /// Color of the world-origin target (`blue`).
    pub origin_color: Color,
    /// Color of every other target (`grey`).
    pub regular_color: Color,
    /// Color of the camera marker (`orange`).
    pub camera_color: Color,
    pub target_scale: f64,
    pub camera_scale: f64,
    pub starting_target_position: DVec3,
    pub starting_target_orientation: DQuat,
    pub num_targets_in_line: i64,
    pub distance_between_targets: f64,
    pub starting_camera_position: DVec3,
    /// Loaded for completeness; the scene always starts the camera at
    /// [`default_camera_orientation`](calibsim_entities::default_camera_orientation).
    pub starting_camera_orientation: DQuat,
    pub camera: RawCameraConfig,
}

impl SceneConfig {
    /// Reads the configuration from a parameter source.
    pub fn from_params(params: &dyn ParamSource) -> Result<Self> {
        // historical spelling first, corrected spelling as fallback
        let camera_position_key = if params.has("starting_camera_positon") {
            "starting_camera_positon"
        } else {
            "starting_camera_position"
        };

        Ok(Self {
            world_frame_id: params.get_string("world_frame_id")?,
            origin_color: load_color(params, "blue")?,
            regular_color: load_color(params, "grey")?,
            camera_color: load_color(params, "orange")?,
            target_scale: params.get_f64_or("target_scale", Target::DEFAULT_SCALE)?,
            camera_scale: params.get_f64_or("camera_scale", Camera::DEFAULT_SCALE)?,
            starting_target_position: load_point(params, "starting_target_position")?,
            starting_target_orientation: load_orientation(params, "starting_target_orientation")?,
            num_targets_in_line: params.get_i64("num_targets_in_line")?,
            distance_between_targets: params.get_f64("distance_between_targets")?,
            starting_camera_position: load_point(params, camera_position_key)?,
            starting_camera_orientation: load_orientation(params, "starting_camera_orientation")?,
            camera: RawCameraConfig {
                image_width: params.get_i64("image_width")?,
                image_height: params.get_i64("image_height")?,
                camera_name: params.get_string("camera_name")?,
                camera_matrix: params.get_f64_list("camera_matrix/data")?,
                distortion_model: params.get_string("distortion_model")?,
                distortion_coefficients: params.get_f64_list("distortion_coefficients/data")?,
            },
        })
    }

    /// Loads the configuration from a JSON parameter file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_params(&JsonParams::from_file(path)?)
    }

    /// Parses the configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_params(&JsonParams::from_json_str(json)?)
    }
}
