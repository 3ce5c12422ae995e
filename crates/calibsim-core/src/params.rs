//! Read-only key/value parameter access.
//!
//! [`ParamSource`] is the seam to whatever parameter server backs a scene.
//! [`JsonParams`] implements it over a JSON document, where a key such as
//! `camera_matrix/data` walks nested objects.

use std::path::Path;

use glam::{DQuat, DVec3};
use serde_json::Value;

use crate::error::{Result, SceneError};
use crate::geometry::{orientation_from_slice, point_from_slice, Color};

/// A read-only source of named configuration values.
pub trait ParamSource {
    /// Returns a string parameter.
    fn get_string(&self, key: &str) -> Result<String>;

    /// Returns a real-valued parameter.
    fn get_f64(&self, key: &str) -> Result<f64>;

    /// Returns an integer parameter.
    fn get_i64(&self, key: &str) -> Result<i64>;

    /// Returns a list of reals.
    fn get_f64_list(&self, key: &str) -> Result<Vec<f64>>;

    /// Returns whether the key is present.
    fn has(&self, key: &str) -> bool;

    /// Returns a real-valued parameter, or `default` when the key is absent.
    fn get_f64_or(&self, key: &str, default: f64) -> Result<f64> {
        if self.has(key) {
            self.get_f64(key)
        } else {
            Ok(default)
        }
    }
}

/// Loads an RGBA color stored as a 4-element list.
pub fn load_color(params: &dyn ParamSource, key: &str) -> Result<Color> {
    Color::from_slice(key, &params.get_f64_list(key)?)
}

/// Loads a point stored as a 3-element list.
pub fn load_point(params: &dyn ParamSource, key: &str) -> Result<DVec3> {
    point_from_slice(key, &params.get_f64_list(key)?)
}

/// Loads an orientation stored as an `[x, y, z, w]` list.
pub fn load_orientation(params: &dyn ParamSource, key: &str) -> Result<DQuat> {
    orientation_from_slice(key, &params.get_f64_list(key)?)
}

/// Parameters backed by a JSON document.
#[derive(Debug, Clone, Default)]
pub struct JsonParams {
    root: Value,
}

impl JsonParams {
    /// Wraps an already parsed document.
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parses a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Reads and parses a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("loaded parameters from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    /// Resolves a key to a value.
    ///
    /// A literal top-level key wins over a `/`-separated path.
    fn lookup(&self, key: &str) -> Option<&Value> {
        let key = key.trim_start_matches('/');
        if let Some(value) = self.root.get(key) {
            return Some(value);
        }
        key.split('/')
            .try_fold(&self.root, |node, segment| node.get(segment))
    }

    fn require(&self, key: &str) -> Result<&Value> {
        self.lookup(key)
            .ok_or_else(|| SceneError::ConfigurationMissing(key.to_string()))
    }
}

fn wrong_type(key: &str, expected: &'static str) -> SceneError {
    SceneError::WrongType {
        key: key.to_string(),
        expected,
    }
}

impl ParamSource for JsonParams {
    fn get_string(&self, key: &str) -> Result<String> {
        self.require(key)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| wrong_type(key, "a string"))
    }

    fn get_f64(&self, key: &str) -> Result<f64> {
        self.require(key)?
            .as_f64()
            .ok_or_else(|| wrong_type(key, "a number"))
    }

    fn get_i64(&self, key: &str) -> Result<i64> {
        self.require(key)?
            .as_i64()
            .ok_or_else(|| wrong_type(key, "an integer"))
    }

    fn get_f64_list(&self, key: &str) -> Result<Vec<f64>> {
        self.require(key)?
            .as_array()
            .ok_or_else(|| wrong_type(key, "a list of numbers"))?
            .iter()
            .map(|v| v.as_f64().ok_or_else(|| wrong_type(key, "a list of numbers")))
            .collect()
    }

    fn has(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params() -> JsonParams {
        JsonParams::new(json!({
            "world_frame_id": "world",
            "num_targets_in_line": 4,
            "target_scale": 0.1,
            "blue": [0.0, 0.0, 1.0, 1.0],
            "camera_matrix": { "data": [1, 0, 0, 0, 1, 0, 0, 0, 1] },
            "distortion_coefficients/data": [0.0, 0.0, 0.0, 0.0, 0.0]
        }))
    }

    #[test]
    fn test_scalar_lookup() {
        let p = params();
        assert_eq!(p.get_string("/world_frame_id").unwrap(), "world");
        assert_eq!(p.get_i64("num_targets_in_line").unwrap(), 4);
        assert_eq!(p.get_f64("target_scale").unwrap(), 0.1);
        // integers widen to reals
        assert_eq!(p.get_f64("num_targets_in_line").unwrap(), 4.0);
    }

    #[test]
    fn test_nested_and_literal_paths() {
        let p = params();
        assert_eq!(p.get_f64_list("camera_matrix/data").unwrap().len(), 9);
        assert_eq!(
            p.get_f64_list("distortion_coefficients/data").unwrap().len(),
            5
        );
    }

    #[test]
    fn test_missing_and_wrong_type() {
        let p = params();
        assert!(matches!(
            p.get_string("camera_name"),
            Err(SceneError::ConfigurationMissing(k)) if k == "camera_name"
        ));
        assert!(matches!(
            p.get_i64("world_frame_id"),
            Err(SceneError::WrongType { .. })
        ));
        assert!(matches!(
            p.get_i64("target_scale"),
            Err(SceneError::WrongType { .. })
        ));
        assert_eq!(p.get_f64_or("camera_scale", 0.2).unwrap(), 0.2);
    }

    #[test]
    fn test_load_helpers() {
        let p = params();
        assert_eq!(load_color(&p, "blue").unwrap().b, 1.0);
        assert!(matches!(
            load_point(&p, "blue"),
            Err(SceneError::MalformedVector { actual: 4, .. })
        ));
    }
}
