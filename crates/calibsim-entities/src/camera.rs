//! Camera proxy entity.
//!
//! The camera is a clickable marker carrying a [`CameraParameters`] record.
//! Clicking it triggers a capture; it cannot be dragged. Its pose maps the
//! camera optical frame (z forward, x right, y down) into the world frame.

use std::any::Any;

use calibsim_core::camera_parameters::CameraParameters;
use calibsim_core::entity::{ControlMode, Entity, EntityState};
use calibsim_core::error::Result;
use calibsim_core::geometry::{Color, Pose};
use calibsim_core::interaction::Outcome;
use glam::{DMat3, DQuat, DVec2, DVec3};

use crate::target::Target;

/// Returns the fixed start-up rotation of the camera.
///
/// Row-major this is `[-1, 0, 0; 0, 0, -1; 0, -1, 0]`: the optical axis
/// points along world -Y and image-down along world -Z.
pub fn default_orientation_matrix() -> DMat3 {
    DMat3::from_cols(
        DVec3::new(-1.0, 0.0, 0.0),
        DVec3::new(0.0, 0.0, -1.0),
        DVec3::new(0.0, -1.0, 0.0),
    )
}

/// Returns [`default_orientation_matrix`] as a unit quaternion.
pub fn default_camera_orientation() -> DQuat {
    DQuat::from_mat3(&default_orientation_matrix()).normalize()
}

/// The simulated camera.
pub struct Camera {
    state: EntityState,
    params: CameraParameters,
    captures: u64,
}

impl Camera {
    /// Type name reported through [`Entity::type_name`].
    pub const TYPE_NAME: &'static str = "Camera";

    /// Marker name used by the standard scene.
    pub const DEFAULT_NAME: &'static str = "camera";

    /// Default visual scale of the camera marker.
    pub const DEFAULT_SCALE: f64 = 0.2;

    /// Creates a camera. Its parameters cannot change afterwards.
    pub fn new(
        frame_id: impl Into<String>,
        name: impl Into<String>,
        pose: Pose,
        color: Color,
        scale: f64,
        params: CameraParameters,
    ) -> Result<Self> {
        let state = EntityState::new(frame_id, name, pose, color, scale, ControlMode::Button)?;
        Ok(Self {
            state,
            params,
            captures: 0,
        })
    }

    /// Returns the camera parameters.
    pub fn params(&self) -> &CameraParameters {
        &self.params
    }

    /// Returns how many times the camera has been triggered.
    pub fn num_captures(&self) -> u64 {
        self.captures
    }

    /// Maps a world point into the camera optical frame.
    pub fn to_optical(&self, world: DVec3) -> DVec3 {
        self.state.pose().inverse_transform_point(world)
    }

    /// Projects a world point to pixel coordinates.
    ///
    /// Returns `None` if the point is behind the camera.
    pub fn project(&self, world: DVec3) -> Option<DVec2> {
        self.params.project(self.to_optical(world))
    }

    /// Images every target and reports which ones a detector would find.
    ///
    /// A target is detected when all four corners project inside the image
    /// and no two of its corners are closer than the minimum corner
    /// separation.
    pub fn capture<'a, I>(&self, targets: I) -> Capture
    where
        I: IntoIterator<Item = &'a Target>,
    {
        let mut capture = Capture::default();
        for target in targets {
            match self.observe(target) {
                Ok(corners) => capture.detections.push(Detection {
                    index: target.index(),
                    name: target.name().to_string(),
                    corners,
                }),
                Err(reason) => capture.rejections.push(Rejection {
                    index: target.index(),
                    name: target.name().to_string(),
                    reason,
                }),
            }
        }
        log::debug!(
            "capture: {} detected, {} rejected",
            capture.detections.len(),
            capture.rejections.len()
        );
        capture
    }

    fn observe(&self, target: &Target) -> std::result::Result<[DVec2; 4], RejectReason> {
        let world = target.corners();
        let mut corners = [DVec2::ZERO; 4];
        for (pixel, corner) in corners.iter_mut().zip(world) {
            *pixel = self.project(corner).ok_or(RejectReason::BehindCamera)?;
            if !self.params.contains_pixel(*pixel) {
                return Err(RejectReason::OutsideImage);
            }
        }

        let min_distance = self.params.min_distance_between_target_corners;
        for (i, a) in corners.iter().enumerate() {
            for b in &corners[i + 1..] {
                if a.distance(*b) < min_distance {
                    return Err(RejectReason::CornersTooClose);
                }
            }
        }
        Ok(corners)
    }
}

impl Entity for Camera {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }

    fn on_outcome(&mut self, outcome: &Outcome) {
        if *outcome == Outcome::Triggered {
            self.captures += 1;
            log::info!("camera '{}' triggered (capture {})", self.name(), self.captures);
        }
    }
}

/// Why a target was not detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// At least one corner is on or behind the image plane.
    BehindCamera,
    /// At least one corner projects outside the image.
    OutsideImage,
    /// Two corners are closer than the minimum separation.
    CornersTooClose,
}

/// A target whose four corners were imaged.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub index: u32,
    pub name: String,
    /// Pixel coordinates of the corners, in [`Target::corners`] order.
    pub corners: [DVec2; 4],
}

/// A target that was not imaged.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub index: u32,
    pub name: String,
    pub reason: RejectReason,
}

/// Result of [`Camera::capture`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Capture {
    pub detections: Vec<Detection>,
    pub rejections: Vec<Rejection>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use calibsim_core::camera_parameters::{build_camera_parameters, RawCameraConfig};
    use calibsim_core::error::SceneError;
    use calibsim_core::interaction::Interaction;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn params() -> CameraParameters {
        build_camera_parameters(&RawCameraConfig {
            image_width: 640,
            image_height: 480,
            camera_name: "sim".to_string(),
            camera_matrix: vec![600.0, 0.0, 320.0, 0.0, 600.0, 240.0, 0.0, 0.0, 1.0],
            distortion_model: "plumb_bob".to_string(),
            distortion_coefficients: vec![0.0; 5],
        })
        .unwrap()
    }

    fn camera_at(position: DVec3) -> Camera {
        Camera::new(
            "world",
            Camera::DEFAULT_NAME,
            Pose::new(position, default_camera_orientation()),
            Color::new(1.0, 0.5, 0.0, 1.0),
            Camera::DEFAULT_SCALE,
            params(),
        )
        .unwrap()
    }

    #[test]
    fn test_default_orientation_fixture() {
        let q = default_camera_orientation();
        let expected = DQuat::from_xyzw(0.0, FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0);
        assert!((q.dot(expected).abs() - 1.0).abs() < 1e-12);
        assert!((q.length() - 1.0).abs() < 1e-12);
        assert_eq!(q, default_camera_orientation());
    }

    #[test]
    fn test_default_orientation_roundtrip() {
        let m = default_orientation_matrix();
        assert!((m.determinant() - 1.0).abs() < 1e-12);
        let back = DMat3::from_quat(default_camera_orientation());
        assert!(back.abs_diff_eq(m, 1e-12));
        // optical axis looks down world -Y
        assert!((default_camera_orientation() * DVec3::Z).abs_diff_eq(-DVec3::Y, 1e-12));
    }

    #[test]
    fn test_camera_is_button_only() {
        let mut camera = camera_at(DVec3::new(0.0, 1.0, 0.0));
        assert_eq!(camera.state().control_mode(), ControlMode::Button);
        assert!(matches!(
            camera.handle(&Interaction::MoveTo(Pose::identity())),
            Err(SceneError::UnsupportedInteraction { .. })
        ));
        assert_eq!(camera.handle(&Interaction::Click).unwrap(), Outcome::Triggered);
        assert_eq!(camera.handle(&Interaction::Click).unwrap(), Outcome::Triggered);
        assert_eq!(camera.num_captures(), 2);
        assert_eq!(camera.pose().position(), DVec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_project_point_on_axis() {
        let camera = camera_at(DVec3::new(0.0, 1.0, 0.0));
        let px = camera.project(DVec3::ZERO).unwrap();
        assert!(px.abs_diff_eq(DVec2::new(320.0, 240.0), 1e-9));
        assert!(camera.project(DVec3::new(0.0, 2.0, 0.0)).is_none());
    }

    #[test]
    fn test_capture_detects_and_rejects() {
        let camera = camera_at(DVec3::new(0.0, 1.0, 0.0));
        // facing the camera: local z along world +Y
        let facing = DQuat::from_rotation_x(-std::f64::consts::FRAC_PI_2);
        let near = Target::new("world", 0, Pose::new(DVec3::ZERO, facing), Color::WHITE, 0.1)
            .unwrap();
        let behind = Target::new(
            "world",
            1,
            Pose::new(DVec3::new(0.0, 3.0, 0.0), facing),
            Color::WHITE,
            0.1,
        )
        .unwrap();
        let far = Target::new(
            "world",
            2,
            Pose::new(DVec3::new(0.0, -10.0, 0.0), facing),
            Color::WHITE,
            0.1,
        )
        .unwrap();
        let aside = Target::new(
            "world",
            3,
            Pose::new(DVec3::new(5.0, 0.0, 0.0), facing),
            Color::WHITE,
            0.1,
        )
        .unwrap();

        let capture = camera.capture([&near, &behind, &far, &aside]);
        assert_eq!(capture.detections.len(), 1);
        assert_eq!(capture.detections[0].name, "tag0");
        let reasons: Vec<_> = capture.rejections.iter().map(|r| (r.index, r.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                (1, RejectReason::BehindCamera),
                (2, RejectReason::CornersTooClose),
                (3, RejectReason::OutsideImage),
            ]
        );
    }
}
