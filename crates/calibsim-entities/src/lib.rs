//! Entity implementations for calibsim.
//!
//! This crate provides the concrete scene entities:
//! - Fiducial targets
//! - The camera proxy
//! - Target layouts

// Layout offsets and pixel counts are small; casts are intentional
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod camera;
pub mod layout;
pub mod target;

pub use camera::{
    default_camera_orientation, default_orientation_matrix, Camera, Capture, Detection,
    RejectReason, Rejection,
};
pub use layout::{make_line_of_targets, LineOfTargets};
pub use target::{parse_target_index, target_name, Target};
