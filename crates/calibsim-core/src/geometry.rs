//! Geometry value types: poses, colors and rotation axes.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

/// A rigid placement in a reference frame.
///
/// The orientation is kept as a unit quaternion. Every constructor and
/// composition renormalizes it, and a degenerate (zero or non-finite)
/// quaternion collapses to identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PoseRepr", into = "PoseRepr")]
pub struct Pose {
    position: DVec3,
    orientation: DQuat,
}

#[derive(Serialize, Deserialize)]
struct PoseRepr {
    position: DVec3,
    #[serde(default = "identity_quat")]
    orientation: DQuat,
}

fn identity_quat() -> DQuat {
    DQuat::IDENTITY
}

impl From<PoseRepr> for Pose {
    fn from(repr: PoseRepr) -> Self {
        Pose::new(repr.position, repr.orientation)
    }
}

impl From<Pose> for PoseRepr {
    fn from(pose: Pose) -> Self {
        Self {
            position: pose.position,
            orientation: pose.orientation,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
        }
    }
}

impl Pose {
    /// Creates a pose, normalizing the orientation.
    #[must_use]
    pub fn new(position: DVec3, orientation: DQuat) -> Self {
        Self {
            position,
            orientation: normalize_quat(orientation),
        }
    }

    /// Creates an identity pose.
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Creates a pose at `position` with identity orientation.
    #[must_use]
    pub fn from_position(position: DVec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Returns the position.
    #[must_use]
    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Returns the unit orientation.
    #[must_use]
    pub fn orientation(&self) -> DQuat {
        self.orientation
    }

    /// Returns a copy rotated by `angle` radians about one of its own axes.
    #[must_use]
    pub fn rotated_about(self, axis: Axis, angle: f64) -> Self {
        let delta = DQuat::from_axis_angle(axis.direction(), angle);
        Self::new(self.position, self.orientation * delta)
    }

    /// Composes `self` with a pose expressed in `self`'s frame.
    #[must_use]
    pub fn compose(&self, child: &Pose) -> Pose {
        Pose::new(
            self.position + self.orientation * child.position,
            self.orientation * child.orientation,
        )
    }

    /// Returns the inverse placement.
    #[must_use]
    pub fn inverse(&self) -> Pose {
        let inv = self.orientation.inverse();
        Pose::new(-(inv * self.position), inv)
    }

    /// Maps a point from this pose's local frame into the parent frame.
    #[must_use]
    pub fn transform_point(&self, local: DVec3) -> DVec3 {
        self.position + self.orientation * local
    }

    /// Maps a point from the parent frame into this pose's local frame.
    #[must_use]
    pub fn inverse_transform_point(&self, world: DVec3) -> DVec3 {
        self.orientation.inverse() * (world - self.position)
    }

    /// Returns true if both poses agree within `tolerance`.
    ///
    /// Orientations are compared up to quaternion sign.
    #[must_use]
    pub fn abs_diff_eq(&self, other: &Pose, tolerance: f64) -> bool {
        self.position.abs_diff_eq(other.position, tolerance)
            && self.orientation.dot(other.orientation).abs() >= 1.0 - tolerance
    }
}

fn normalize_quat(q: DQuat) -> DQuat {
    let len_sq = q.length_squared();
    if !len_sq.is_finite() || len_sq < f64::EPSILON {
        DQuat::IDENTITY
    } else {
        q.normalize()
    }
}

/// An RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color, clamping every component into `[0, 1]`.
    #[must_use]
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Builds a color from an `[r, g, b, a]` slice.
    pub fn from_slice(field: &str, values: &[f64]) -> Result<Self> {
        match values {
            [r, g, b, a] => Ok(Self::new(*r, *g, *b, *a)),
            _ => Err(SceneError::malformed(field, 4, values.len())),
        }
    }

    /// Returns the components as `[r, g, b, a]`.
    #[must_use]
    pub fn to_array(self) -> [f64; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A principal axis of an entity's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// Returns the unit direction vector for this axis.
    #[must_use]
    pub fn direction(self) -> DVec3 {
        match self {
            Axis::X => DVec3::X,
            Axis::Y => DVec3::Y,
            Axis::Z => DVec3::Z,
        }
    }
}

/// Builds a point from a 3-element slice.
pub fn point_from_slice(field: &str, values: &[f64]) -> Result<DVec3> {
    match values {
        [x, y, z] => Ok(DVec3::new(*x, *y, *z)),
        _ => Err(SceneError::malformed(field, 3, values.len())),
    }
}

/// Builds an orientation from an `[x, y, z, w]` slice.
///
/// The result is normalized; a zero quaternion becomes identity.
pub fn orientation_from_slice(field: &str, values: &[f64]) -> Result<DQuat> {
    match values {
        [x, y, z, w] => Ok(normalize_quat(DQuat::from_xyzw(*x, *y, *z, *w))),
        _ => Err(SceneError::malformed(field, 4, values.len())),
    }
}
