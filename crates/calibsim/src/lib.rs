//! calibsim: an interactive scene of fiducial targets and a simulated camera.
//!
//! The scene is meant for exercising camera-calibration and pose-estimation
//! pipelines. Targets are laid out in a line and can be dragged and rotated;
//! the camera proxy carries real intrinsics and is clicked to capture.
//!
//! # Quick Start
//!
//! ```no_run
//! use calibsim::*;
//!
//! fn main() -> Result<()> {
//!     let config = SceneConfig::load("params.json")?;
//!     let mut scene = Scene::build_with_observers(&config, vec![Box::new(LogObserver::new())])?;
//!
//!     scene.submit_by_name("tag1", Interaction::Rotate { axis: Axis::Z, angle: 0.3 })?;
//!     scene.submit_by_name("camera", Interaction::Click)?;
//!     let report = scene.run_pending()?;
//!     println!("{} capture(s)", report.captures.len());
//!
//!     scene.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Registry`] owns every [`Entity`], publishes committed batches of
//!   [`SceneUpdate`]s to [`SceneObserver`]s and applies
//!   [`InteractionEvent`]s one at a time.
//! - [`Target`] and [`Camera`] are the two entity kinds.
//! - [`Scene`] wires them together from a [`SceneConfig`].

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

mod config;
mod scene;

pub use config::SceneConfig;
pub use scene::{RunReport, Scene};

// Re-export core types
pub use calibsim_core::{
    build_camera_parameters, Axis, CameraParameters, Color, ControlMode, DMat3, DQuat, DVec2,
    DVec3, DistortionCoefficients, DistortionModel, Entity, EntityId, Interaction,
    InteractionEvent, JsonParams, LogObserver, MarkerRecord, Outcome, ParamSource, Pose,
    RawCameraConfig, Registry, Result, SceneError, SceneObserver, SceneUpdate,
};

// Re-export entities
pub use calibsim_entities::{
    default_camera_orientation, default_orientation_matrix, make_line_of_targets, target_name,
    Camera, Capture, Detection, LineOfTargets, RejectReason, Rejection, Target,
};
