//! Deterministic target layouts.

use calibsim_core::entity::{Entity, EntityId};
use calibsim_core::error::{Result, SceneError};
use calibsim_core::geometry::{Color, Pose};
use calibsim_core::registry::Registry;
use glam::{DQuat, DVec3};

use crate::target::Target;

/// Parameters of a straight row of targets along world +X.
#[derive(Debug, Clone, PartialEq)]
pub struct LineOfTargets {
    /// Reference frame of every target.
    pub frame_id: String,
    /// One past the last target number. Values at or below `first_index`
    /// produce an empty line.
    pub count: i64,
    /// Distance between neighbouring targets; may be zero or negative.
    pub spacing: f64,
    /// Number of the first target.
    pub first_index: u32,
    /// Position of the first target.
    pub start_position: DVec3,
    /// Orientation shared by every target.
    pub orientation: DQuat,
    /// Color of the world-origin target.
    pub origin_color: Color,
    /// Color of every other target.
    pub regular_color: Color,
    /// Edge length of each target.
    pub scale: f64,
}

impl LineOfTargets {
    /// Creates a line of `count` targets numbered from zero.
    pub fn new(frame_id: impl Into<String>, count: i64, spacing: f64) -> Self {
        Self {
            frame_id: frame_id.into(),
            count,
            spacing,
            first_index: 0,
            start_position: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
            origin_color: Color::new(0.0, 0.0, 1.0, 1.0),
            regular_color: Color::new(0.5, 0.5, 0.5, 1.0),
            scale: Target::DEFAULT_SCALE,
        }
    }

    /// Sets the number of the first target.
    #[must_use]
    pub fn with_first_index(mut self, first_index: u32) -> Self {
        self.first_index = first_index;
        self
    }

    /// Sets the pose of the first target.
    #[must_use]
    pub fn with_start(mut self, position: DVec3, orientation: DQuat) -> Self {
        self.start_position = position;
        self.orientation = orientation;
        self
    }

    /// Sets the origin and regular colors.
    #[must_use]
    pub fn with_colors(mut self, origin_color: Color, regular_color: Color) -> Self {
        self.origin_color = origin_color;
        self.regular_color = regular_color;
        self
    }

    /// Sets the target scale.
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Builds a line of targets and registers each with the registry.
///
/// The origin color is chosen once, from the first index only: a line that
/// starts at a non-zero number contains no origin-colored target. Returns the
/// ids in target-number order.
///
/// Every target is built and checked against the registry before the first
/// one is registered, so a rejected line leaves the registry unchanged.
pub fn make_line_of_targets(
    registry: &mut Registry,
    line: &LineOfTargets,
) -> Result<Vec<EntityId>> {
    if !registry.is_open() {
        return Err(SceneError::RegistryClosed);
    }

    let mut color = if line.first_index == 0 {
        line.origin_color
    } else {
        line.regular_color
    };

    let mut targets = Vec::new();
    for (offset, number) in (i64::from(line.first_index)..line.count).enumerate() {
        let index = u32::try_from(number).map_err(|_| SceneError::InvalidValue {
            field: "num_targets_in_line".to_string(),
            reason: format!("target number {number} does not fit in 32 bits"),
        })?;
        let position = line.start_position + DVec3::X * (offset as f64 * line.spacing);
        let target = Target::new(
            line.frame_id.clone(),
            index,
            Pose::new(position, line.orientation),
            color,
            line.scale,
        )?;
        if registry.contains(&line.frame_id, target.name()) {
            return Err(SceneError::DuplicateEntityName {
                frame_id: line.frame_id.clone(),
                name: target.name().to_string(),
            });
        }
        targets.push(target);

        color = line.regular_color;
    }

    let ids = targets
        .into_iter()
        .map(|target| registry.register(Box::new(target)))
        .collect::<Result<Vec<_>>>()?;

    log::info!(
        "placed {} target(s) in '{}' starting at tag{}",
        ids.len(),
        line.frame_id,
        line.first_index
    );
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn targets(registry: &Registry, ids: &[EntityId]) -> Vec<(String, Color, DVec3)> {
        ids.iter()
            .map(|id| {
                let t = registry.get_as::<Target>(*id).unwrap();
                (t.name().to_string(), t.state().color(), t.pose().position())
            })
            .collect()
    }

    #[test]
    fn test_line_names_and_colors() {
        let mut registry = Registry::open();
        let line = LineOfTargets::new("world", 4, 0.5);
        let ids = make_line_of_targets(&mut registry, &line).unwrap();
        let placed = targets(&registry, &ids);

        let names: Vec<_> = placed.iter().map(|(n, _, _)| n.as_str()).collect();
        assert_eq!(names, ["tag0", "tag1", "tag2", "tag3"]);
        assert_eq!(placed[0].1, line.origin_color);
        assert!(placed[1..].iter().all(|(_, c, _)| *c == line.regular_color));
        assert_eq!(placed[3].2, DVec3::new(1.5, 0.0, 0.0));
        assert_eq!(registry.num_pending_updates(), 4);
    }

    #[test]
    fn test_empty_lines() {
        let mut registry = Registry::open();
        for (count, first) in [(0, 0), (-3, 0), (2, 2), (1, 5)] {
            let line = LineOfTargets::new("world", count, 1.0).with_first_index(first);
            assert!(make_line_of_targets(&mut registry, &line).unwrap().is_empty());
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_continued_line_has_no_origin() {
        let mut registry = Registry::open();
        let line = LineOfTargets::new("world", 6, 1.0)
            .with_first_index(3)
            .with_start(DVec3::new(3.0, 0.0, 0.0), DQuat::IDENTITY);
        let ids = make_line_of_targets(&mut registry, &line).unwrap();
        let placed = targets(&registry, &ids);
        assert_eq!(placed.len(), 3);
        assert_eq!(placed[0].0, "tag3");
        assert_eq!(placed[0].2, DVec3::new(3.0, 0.0, 0.0));
        assert!(placed.iter().all(|(_, c, _)| *c == line.regular_color));
    }

    #[test]
    fn test_overlapping_lines_are_rejected() {
        let mut registry = Registry::open();
        let line = LineOfTargets::new("world", 3, 1.0);
        make_line_of_targets(&mut registry, &line).unwrap();
        let err = make_line_of_targets(&mut registry, &line).unwrap_err();
        assert!(matches!(err, SceneError::DuplicateEntityName { name, .. } if name == "tag0"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_blocked_line_registers_nothing() {
        let mut registry = Registry::open();
        let blocker = Target::new("world", 2, Pose::identity(), Color::WHITE, 0.1).unwrap();
        registry.register(Box::new(blocker)).unwrap();
        registry.apply_changes().unwrap();

        let line = LineOfTargets::new("world", 4, 1.0);
        let err = make_line_of_targets(&mut registry, &line).unwrap_err();
        assert!(matches!(err, SceneError::DuplicateEntityName { name, .. } if name == "tag2"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.num_pending_updates(), 0);
        assert!(!registry.contains("world", "tag0"));
        assert!(!registry.contains("world", "tag1"));

        // the same line in a free frame still goes through
        let other = LineOfTargets::new("board", 4, 1.0);
        assert_eq!(make_line_of_targets(&mut registry, &other).unwrap().len(), 4);
    }

    #[test]
    fn test_closed_registry_is_rejected() {
        let mut registry = Registry::open();
        registry.close();
        let line = LineOfTargets::new("world", 2, 1.0);
        assert!(matches!(
            make_line_of_targets(&mut registry, &line),
            Err(SceneError::RegistryClosed)
        ));
    }

    #[test]
    fn test_empty_frame_is_rejected() {
        let mut registry = Registry::open();
        let line = LineOfTargets::new("", 2, 1.0);
        assert!(matches!(
            make_line_of_targets(&mut registry, &line),
            Err(SceneError::EmptyFrameId(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_line_is_contiguous_and_collinear(
            count in 1i64..40,
            spacing in -5.0f64..5.0,
            x0 in -10.0f64..10.0,
            y0 in -10.0f64..10.0,
            z0 in -10.0f64..10.0,
        ) {
            let mut registry = Registry::open();
            let start = DVec3::new(x0, y0, z0);
            let line = LineOfTargets::new("world", count, spacing)
                .with_start(start, DQuat::IDENTITY);
            let ids = make_line_of_targets(&mut registry, &line).unwrap();
            prop_assert_eq!(ids.len() as i64, count);

            for (i, (name, color, position)) in targets(&registry, &ids).into_iter().enumerate() {
                prop_assert_eq!(name, format!("tag{i}"));
                let expected_color = if i == 0 { line.origin_color } else { line.regular_color };
                prop_assert_eq!(color, expected_color);
                let expected = start + DVec3::X * (i as f64 * spacing);
                prop_assert!(position.abs_diff_eq(expected, 1e-9));
            }
        }

        #[test]
        fn prop_non_positive_count_is_empty(count in -50i64..=0) {
            let mut registry = Registry::open();
            let line = LineOfTargets::new("world", count, 1.0);
            prop_assert!(make_line_of_targets(&mut registry, &line).unwrap().is_empty());
        }
    }
}
