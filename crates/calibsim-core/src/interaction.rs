//! User interactions and the pure state transition that applies them.
//!
//! Interactions arrive one at a time from an external event loop. Each is
//! applied through [`apply`], which never mutates its input, so a recorded
//! event sequence replays to the same scene.

use serde::{Deserialize, Serialize};

use crate::entity::{ControlMode, EntityId, EntityState};
use crate::error::{Result, SceneError};
use crate::geometry::{Axis, Pose};

/// A user manipulation of a single entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interaction {
    /// The entity was dragged to a new pose.
    MoveTo(Pose),
    /// The entity was rotated about one of its own axes by `angle` radians.
    Rotate { axis: Axis, angle: f64 },
    /// The entity was clicked.
    Click,
}

impl Interaction {
    /// Short label used in logs and errors.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Interaction::MoveTo(_) => "move",
            Interaction::Rotate { .. } => "rotate",
            Interaction::Click => "click",
        }
    }
}

/// An interaction addressed to a registered entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub entity: EntityId,
    pub interaction: Interaction,
}

impl InteractionEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(entity: EntityId, interaction: Interaction) -> Self {
        Self {
            entity,
            interaction,
        }
    }
}

/// What an applied interaction did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// The pose changed and must be republished.
    PoseChanged(Pose),
    /// A button entity was triggered.
    Triggered,
    /// The interaction had no effect.
    Ignored,
}

/// The result of [`apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: EntityState,
    pub outcome: Outcome,
}

/// Applies an interaction to entity state.
///
/// `Move3D` entities follow drags and rotations and ignore clicks. `Button`
/// entities only accept clicks.
pub fn apply(state: &EntityState, interaction: &Interaction) -> Result<Transition> {
    let unsupported = || SceneError::UnsupportedInteraction {
        name: state.name().to_string(),
        interaction: interaction.label(),
    };

    let (state, outcome) = match (state.control_mode(), interaction) {
        (ControlMode::Move3D, Interaction::MoveTo(pose)) => {
            (state.with_pose(*pose), Outcome::PoseChanged(*pose))
        }
        (ControlMode::Move3D, Interaction::Rotate { axis, angle }) => {
            let pose = state.pose().rotated_about(*axis, *angle);
            (state.with_pose(pose), Outcome::PoseChanged(pose))
        }
        (ControlMode::Move3D, Interaction::Click) => (state.clone(), Outcome::Ignored),
        (ControlMode::Button, Interaction::Click) => (state.clone(), Outcome::Triggered),
        (ControlMode::Button, Interaction::MoveTo(_) | Interaction::Rotate { .. }) => {
            return Err(unsupported());
        }
    };
    Ok(Transition { state, outcome })
}
