//! Fiducial target entity.

use std::any::Any;

use calibsim_core::entity::{ControlMode, Entity, EntityState};
use calibsim_core::error::Result;
use calibsim_core::geometry::{Color, Pose};
use glam::DVec3;

/// A numbered fiducial marker that can be dragged and rotated.
///
/// Target 0 marks the world origin and is drawn in the origin color; every
/// other target uses the regular color.
pub struct Target {
    index: u32,
    state: EntityState,
}

impl Target {
    /// Type name reported through [`Entity::type_name`].
    pub const TYPE_NAME: &'static str = "Target";

    /// Default edge length of a target.
    pub const DEFAULT_SCALE: f64 = 0.1;

    /// Creates a target with an explicit color.
    pub fn new(
        frame_id: impl Into<String>,
        index: u32,
        pose: Pose,
        color: Color,
        scale: f64,
    ) -> Result<Self> {
        let state = EntityState::new(
            frame_id,
            target_name(index),
            pose,
            color,
            scale,
            ControlMode::Move3D,
        )?;
        Ok(Self { index, state })
    }

    /// Creates a target colored by its role.
    pub fn with_role_colors(
        frame_id: impl Into<String>,
        index: u32,
        pose: Pose,
        origin_color: Color,
        regular_color: Color,
        scale: f64,
    ) -> Result<Self> {
        let color = if index == 0 {
            origin_color
        } else {
            regular_color
        };
        Self::new(frame_id, index, pose, color, scale)
    }

    /// Returns the target number.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns true for the world-origin target.
    pub fn is_world_origin(&self) -> bool {
        self.index == 0
    }

    /// Returns the four corners of the marker face in the parent frame.
    ///
    /// The face lies in the target's local XY plane, corners ordered
    /// counter-clockwise starting at (-x, -y).
    pub fn corners(&self) -> [DVec3; 4] {
        let h = self.state.scale() * 0.5;
        let pose = self.state.pose();
        [
            DVec3::new(-h, -h, 0.0),
            DVec3::new(h, -h, 0.0),
            DVec3::new(h, h, 0.0),
            DVec3::new(-h, h, 0.0),
        ]
        .map(|c| pose.transform_point(c))
    }
}

impl Entity for Target {
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
}

/// Returns the marker name of target `index`.
pub fn target_name(index: u32) -> String {
    format!("tag{index}")
}

/// Parses a marker name produced by [`target_name`].
pub fn parse_target_index(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("tag")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
