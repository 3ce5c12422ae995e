//! Scene observers.
//!
//! The registry batches [`SceneUpdate`]s and hands each committed batch to
//! every [`SceneObserver`], so an observer never sees a half-built scene.

use serde::{Deserialize, Serialize};

use crate::entity::MarkerRecord;

/// A single change published by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneUpdate {
    /// An entity was added or its marker changed.
    Upsert(MarkerRecord),
    /// A button entity was clicked.
    Triggered { frame_id: String, name: String },
    /// An entity was removed.
    Erased { frame_id: String, name: String },
}

impl SceneUpdate {
    /// Returns the name of the entity this update refers to.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            SceneUpdate::Upsert(marker) => &marker.name,
            SceneUpdate::Triggered { name, .. } | SceneUpdate::Erased { name, .. } => name,
        }
    }
}

/// Receives committed batches of scene updates.
pub trait SceneObserver {
    /// Called once per commit with every update since the previous commit.
    fn on_commit(&mut self, updates: &[SceneUpdate]);
}

impl<F> SceneObserver for F
where
    F: FnMut(&[SceneUpdate]),
{
    fn on_commit(&mut self, updates: &[SceneUpdate]) {
        self(updates);
    }
}

/// Observer that writes every update to the log.
#[derive(Debug, Default)]
pub struct LogObserver {
    commits: usize,
}

impl LogObserver {
    /// Creates a new log observer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SceneObserver for LogObserver {
    fn on_commit(&mut self, updates: &[SceneUpdate]) {
        self.commits += 1;
        log::info!("commit {} with {} update(s)", self.commits, updates.len());
        for update in updates {
            match update {
                SceneUpdate::Upsert(m) => {
                    let p = m.pose.position();
                    let q = m.pose.orientation();
                    log::info!(
                        "  {} '{}' in '{}': position ({:.3}, {:.3}, {:.3}) orientation ({:.3}, {:.3}, {:.3}, {:.3})",
                        m.type_name,
                        m.name,
                        m.frame_id,
                        p.x,
                        p.y,
                        p.z,
                        q.x,
                        q.y,
                        q.z,
                        q.w
                    );
                }
                SceneUpdate::Triggered { name, .. } => log::info!("  '{name}' triggered"),
                SceneUpdate::Erased { name, .. } => log::info!("  '{name}' erased"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ControlMode;
    use crate::geometry::{Color, Pose};

    fn upsert(name: &str) -> SceneUpdate {
        SceneUpdate::Upsert(MarkerRecord {
            frame_id: "world".to_string(),
            name: name.to_string(),
            type_name: "Target".to_string(),
            pose: Pose::identity(),
            color: Color::WHITE,
            scale: 0.1,
            control_mode: ControlMode::Move3D,
        })
    }

    #[test]
    fn test_update_names() {
        assert_eq!(upsert("tag0").name(), "tag0");
        let trigger = SceneUpdate::Triggered {
            frame_id: "world".to_string(),
            name: "camera".to_string(),
        };
        assert_eq!(trigger.name(), "camera");
    }

    #[test]
    fn test_closure_and_log_observers() {
        let mut seen = Vec::new();
        {
            let mut observer = |updates: &[SceneUpdate]| seen.push(updates.len());
            observer.on_commit(&[upsert("tag0"), upsert("tag1")]);
            observer.on_commit(&[]);
        }
        assert_eq!(seen, vec![2, 0]);

        let mut log = LogObserver::new();
        log.on_commit(&[upsert("tag0")]);
        log.on_commit(&[upsert("tag1")]);
        assert_eq!(log.commits, 2);
    }
}
