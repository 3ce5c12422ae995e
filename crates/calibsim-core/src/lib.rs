//! Core abstractions for calibsim.
//!
//! This crate provides the fundamental types used throughout calibsim:
//! - [`Pose`], [`Color`] and [`Axis`] geometry value types
//! - [`CameraParameters`], the canonical camera intrinsics/distortion record
//! - [`Entity`] trait for manipulable scene objects
//! - [`Registry`], which owns entities, routes interactions and publishes
//!   committed updates to [`SceneObserver`]s
//! - [`ParamSource`] for reading configuration

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Intrinsic names (fx, fy, cx, cy, k1..k6) are conventional
#![allow(clippy::similar_names)]

pub mod camera_parameters;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod observer;
pub mod params;
pub mod registry;

pub use camera_parameters::{
    build_camera_parameters, CameraParameters, DistortionCoefficients, DistortionModel,
    RawCameraConfig, MIN_DISTANCE_BETWEEN_TARGET_CORNERS,
};
pub use entity::{ControlMode, Entity, EntityId, EntityState, MarkerRecord};
pub use error::{Result, SceneError};
pub use geometry::{orientation_from_slice, point_from_slice, Axis, Color, Pose};
pub use interaction::{apply, Interaction, InteractionEvent, Outcome, Transition};
pub use observer::{LogObserver, SceneObserver, SceneUpdate};
pub use params::{load_color, load_orientation, load_point, JsonParams, ParamSource};
pub use registry::Registry;

// Re-export glam types for convenience
pub use glam::{DMat3, DQuat, DVec2, DVec3};
