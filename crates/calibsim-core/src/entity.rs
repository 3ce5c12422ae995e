//! Entity trait and shared entity state.
//!
//! An [`Entity`] is a named, posed, visually represented object in the scene,
//! such as a fiducial target or the camera proxy. The registry owns every
//! entity and hands out [`EntityId`] keys.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};
use crate::geometry::{Color, Pose};
use crate::interaction::{apply, Interaction, Outcome};

/// Opaque key of an entity inside a [`Registry`](crate::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How the user may manipulate an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ControlMode {
    /// Free 3D drag plus rotation about a single local axis.
    #[default]
    Move3D,
    /// A single clickable trigger; the entity cannot be dragged.
    Button,
}

/// State common to every entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityState {
    frame_id: String,
    name: String,
    pose: Pose,
    color: Color,
    scale: f64,
    control_mode: ControlMode,
}

impl EntityState {
    /// Creates entity state, rejecting an empty frame id or name.
    pub fn new(
        frame_id: impl Into<String>,
        name: impl Into<String>,
        pose: Pose,
        color: Color,
        scale: f64,
        control_mode: ControlMode,
    ) -> Result<Self> {
        let frame_id = frame_id.into();
        let name = name.into();
        if name.is_empty() {
            return Err(SceneError::InvalidValue {
                field: "name".to_string(),
                reason: "entity names must not be empty".to_string(),
            });
        }
        if frame_id.is_empty() {
            return Err(SceneError::EmptyFrameId(name));
        }
        Ok(Self {
            frame_id,
            name,
            pose,
            color,
            scale,
            control_mode,
        })
    }

    /// Returns the reference frame id.
    #[must_use]
    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    /// Returns the entity name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current pose.
    #[must_use]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Returns a copy of this state at a new pose.
    #[must_use]
    pub fn with_pose(&self, pose: Pose) -> Self {
        Self {
            pose,
            ..self.clone()
        }
    }

    /// Returns the display color.
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Returns the visual scale.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the control mode.
    #[must_use]
    pub fn control_mode(&self) -> ControlMode {
        self.control_mode
    }
}

/// The published description of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub frame_id: String,
    pub name: String,
    pub type_name: String,
    pub pose: Pose,
    pub color: Color,
    pub scale: f64,
    pub control_mode: ControlMode,
}

/// A manipulable object in the scene.
pub trait Entity: Any {
    /// Returns a reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to self as `Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns the type name of this entity (e.g. "Target", "Camera").
    fn type_name(&self) -> &'static str;

    /// Returns the shared entity state.
    fn state(&self) -> &EntityState;

    /// Returns the shared entity state mutably.
    fn state_mut(&mut self) -> &mut EntityState;

    /// Called after an interaction has been applied to [`Entity::state`].
    fn on_outcome(&mut self, _outcome: &Outcome) {}

    /// Returns the entity name.
    fn name(&self) -> &str {
        self.state().name()
    }

    /// Returns the reference frame id.
    fn frame_id(&self) -> &str {
        self.state().frame_id()
    }

    /// Returns the current pose.
    fn pose(&self) -> Pose {
        self.state().pose()
    }

    /// Applies a user interaction to this entity.
    fn handle(&mut self, interaction: &Interaction) -> Result<Outcome> {
        let transition = apply(self.state(), interaction)?;
        *self.state_mut() = transition.state;
        self.on_outcome(&transition.outcome);
        Ok(transition.outcome)
    }

    /// Builds the record published to observers.
    fn marker(&self) -> MarkerRecord {
        let state = self.state();
        MarkerRecord {
            frame_id: state.frame_id().to_string(),
            name: state.name().to_string(),
            type_name: self.type_name().to_string(),
            pose: state.pose(),
            color: state.color(),
            scale: state.scale(),
            control_mode: state.control_mode(),
        }
    }
}
