//! The benchmark config document.
//!
//! The binary consumes `{"settings": {...}}` JSON files and, run without
//! arguments, emits `benchmark_template.json` describing every knob it knows.
//! [`Settings`] wraps that nested object and exposes dotted-path access plus
//! the handful of structured mutations the orchestrator needs: planner /
//! smoother / steer-function selection and environment + start/goal setup.

pub mod planners;

use crate::errors::{MpbError, Result};
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::warn;

const PLANNING: &str = "benchmark.planning";
const SMOOTHING: &str = "benchmark.smoothing";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    doc: Value,
}

impl Settings {
    /// Load a `{"settings": ...}` document from a template or config file.
    pub fn from_template(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MpbError::TemplateNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(MpbError::io("reading config template", path, e)),
        };
        let root: Value = serde_json::from_str(&raw).map_err(|source| MpbError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = root
            .get("settings")
            .cloned()
            .ok_or_else(|| MpbError::MissingKey {
                path: "settings".into(),
            })?;
        Self::from_value(doc)
    }

    /// Wrap an already-parsed settings object.
    pub fn from_value(doc: Value) -> Result<Self> {
        if !doc.is_object() {
            return Err(MpbError::NotAnObject {
                path: "settings".into(),
            });
        }
        Ok(Self { doc })
    }

    pub fn as_value(&self) -> &Value {
        &self.doc
    }

    /// Write the document back out as `{"settings": ...}`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let wrapped = json!({ "settings": self.doc });
        let mut out = serde_json::to_string_pretty(&wrapped).expect("settings serialize");
        out.push('\n');
        std::fs::write(path, out).map_err(|e| MpbError::io("writing config", path, e))
    }

    /// Look up a dotted path (`"env.grid.width"`).
    pub fn get(&self, path: &str) -> Result<&Value> {
        let mut cur = &self.doc;
        for seg in path.split('.') {
            let obj = cur.as_object().ok_or_else(|| MpbError::NotAnObject {
                path: path.to_string(),
            })?;
            cur = obj.get(seg).ok_or_else(|| MpbError::MissingKey {
                path: path.to_string(),
            })?;
        }
        Ok(cur)
    }

    /// Assign a dotted path. Intermediate objects must already exist (the
    /// template defines the document shape); only the final segment is
    /// created or overwritten.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        let mut segs: Vec<&str> = path.split('.').collect();
        let last = segs.pop().ok_or_else(|| MpbError::MissingKey {
            path: path.to_string(),
        })?;
        let mut cur = &mut self.doc;
        for seg in segs {
            let obj = cur.as_object_mut().ok_or_else(|| MpbError::NotAnObject {
                path: path.to_string(),
            })?;
            cur = obj.get_mut(seg).ok_or_else(|| MpbError::MissingKey {
                path: path.to_string(),
            })?;
        }
        let obj = cur.as_object_mut().ok_or_else(|| MpbError::NotAnObject {
            path: path.to_string(),
        })?;
        obj.insert(last.to_string(), value.into());
        Ok(())
    }

    /// Apply many dotted assignments.
    pub fn update<I, S>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        for (path, value) in pairs {
            self.set(path.as_ref(), value)?;
        }
        Ok(())
    }

    pub fn get_f64(&self, path: &str) -> Result<f64> {
        self.get(path)?.as_f64().ok_or_else(|| MpbError::WrongType {
            path: path.to_string(),
            expected: "number",
        })
    }

    pub fn get_u64(&self, path: &str) -> Result<u64> {
        self.get(path)?.as_u64().ok_or_else(|| MpbError::WrongType {
            path: path.to_string(),
            expected: "unsigned integer",
        })
    }

    fn toggle_map(&self, path: &'static str) -> Result<&Map<String, Value>> {
        self.get(path)?.as_object().ok_or_else(|| MpbError::WrongType {
            path: path.to_string(),
            expected: "object",
        })
    }

    /// Every planner toggle key the template knows, in document order.
    pub fn planner_keys(&self) -> Result<Vec<String>> {
        Ok(self.toggle_map(PLANNING)?.keys().cloned().collect())
    }

    /// Planner toggles currently switched on, in document order.
    pub fn enabled_planners(&self) -> Result<Vec<String>> {
        Ok(self
            .toggle_map(PLANNING)?
            .iter()
            .filter(|(_, used)| used.as_bool() == Some(true))
            .map(|(k, _)| k.clone())
            .collect())
    }

    /// Unify `aliases` against the template's planners and enable exactly the
    /// matching set. Aliases that match nothing are warned about, matching the
    /// binary's lenient handling of unknown names.
    pub fn set_planners<S: AsRef<str>>(&mut self, aliases: &[S]) -> Result<Vec<String>> {
        let keys = self.planner_keys()?;
        let (selected, unmatched) = planners::unify_planners(&keys, aliases);
        if !unmatched.is_empty() {
            warn!(?unmatched, "some planner names could not be unified");
        }
        for key in &keys {
            let on = selected.contains(key);
            self.set(&format!("{PLANNING}.{key}"), on)?;
        }
        Ok(selected)
    }

    /// Enable exactly one planner toggle. Used by the engine to run the
    /// selected planners one binary invocation at a time.
    pub fn isolate_planner(&mut self, planner: &str) -> Result<()> {
        for key in self.planner_keys()? {
            self.set(&format!("{PLANNING}.{key}"), key == planner)?;
        }
        Ok(())
    }

    pub fn enabled_smoothers(&self) -> Result<Vec<String>> {
        Ok(self
            .toggle_map(SMOOTHING)?
            .iter()
            .filter(|(_, used)| used.as_bool() == Some(true))
            .map(|(k, _)| k.clone())
            .collect())
    }

    /// Enable exactly the named smoothers (exact toggle keys, no aliasing:
    /// the smoother names are short and unambiguous).
    pub fn set_smoothers<S: AsRef<str>>(&mut self, names: &[S]) -> Result<Vec<String>> {
        let keys: Vec<String> = self.toggle_map(SMOOTHING)?.keys().cloned().collect();
        let mut selected = Vec::new();
        for key in &keys {
            let on = names.iter().any(|n| n.as_ref() == key);
            if on {
                selected.push(key.clone());
            }
            self.set(&format!("{SMOOTHING}.{key}"), on)?;
        }
        if selected.len() != names.len() {
            warn!(?selected, "some smoother names could not be unified");
        }
        Ok(selected)
    }

    /// Select steer functions by name; switches control planners off.
    pub fn set_steer_functions<S: AsRef<str>>(&mut self, aliases: &[S]) -> Result<Vec<usize>> {
        let mut indices = Vec::new();
        let mut unmatched = Vec::new();
        for alias in aliases {
            match planners::unify_steer_function(alias.as_ref()) {
                Some(i) if !indices.contains(&i) => indices.push(i),
                Some(_) => {}
                None => unmatched.push(alias.as_ref().to_string()),
            }
        }
        if !unmatched.is_empty() {
            warn!(?unmatched, "some steer function names could not be unified");
        }
        self.set("benchmark.steer_functions", indices.clone())?;
        self.set("benchmark.control_planners_on", false)?;
        Ok(indices)
    }

    /// Select forward-propagation robot models by name; switches control
    /// planners on.
    pub fn set_robot_models<S: AsRef<str>>(&mut self, aliases: &[S]) -> Result<Vec<usize>> {
        let mut indices = Vec::new();
        let mut unmatched = Vec::new();
        for alias in aliases {
            match planners::unify_robot_model(alias.as_ref()) {
                Some(i) if !indices.contains(&i) => indices.push(i),
                Some(_) => {}
                None => unmatched.push(alias.as_ref().to_string()),
            }
        }
        if !unmatched.is_empty() {
            warn!(?unmatched, "some robot model names could not be unified");
        }
        self.set("benchmark.forward_propagations", indices.clone())?;
        self.set("benchmark.control_planners_on", true)?;
        Ok(indices)
    }

    /// Number of configured steer functions; one invocation plans each
    /// enabled planner against each of these.
    pub fn steer_function_count(&self) -> usize {
        self.get("benchmark.steer_functions")
            .ok()
            .and_then(|v| v.as_array().map(|a| a.len()))
            .filter(|len| *len > 0)
            .unwrap_or(1)
    }

    pub fn set_random_grid_env(
        &mut self,
        width: u32,
        height: u32,
        obstacle_ratio: f64,
        seed: u32,
    ) -> Result<()> {
        self.set("env.type", "grid")?;
        self.set("env.grid.generator", "random")?;
        self.set("env.grid.width", width)?;
        self.set("env.grid.height", height)?;
        self.set("env.grid.seed", seed)?;
        self.set("env.grid.random.obstacle_ratio", obstacle_ratio)
    }

    pub fn set_corridor_grid_env(
        &mut self,
        width: u32,
        height: u32,
        branches: u32,
        radius: f64,
        seed: u32,
    ) -> Result<()> {
        self.set("env.type", "grid")?;
        self.set("env.grid.generator", "corridor")?;
        self.set("env.grid.width", width)?;
        self.set("env.grid.height", height)?;
        self.set("env.grid.seed", seed)?;
        self.set("env.grid.corridor.branches", branches)?;
        self.set("env.grid.corridor.radius", radius)
    }

    pub fn set_image_grid_env(
        &mut self,
        filename: &str,
        desired_width: u32,
        desired_height: u32,
        occupancy_threshold: f64,
    ) -> Result<()> {
        self.set("env.type", "grid")?;
        self.set("env.grid.generator", "image")?;
        self.set("env.grid.image.source", filename)?;
        self.set("env.grid.image.desired_width", desired_width)?;
        self.set("env.grid.image.desired_height", desired_height)?;
        self.set("env.grid.image.occupancy_threshold", occupancy_threshold)
    }

    /// Occupancy map described by a YAML sidecar (map server format).
    pub fn set_image_yaml_env(&mut self, filename: &str) -> Result<()> {
        self.set("env.type", "yaml")?;
        self.set("env.grid.image.source", filename)
    }

    pub fn set_polygon_env(&mut self, filename: &str, scaling: f64) -> Result<()> {
        self.set("env.type", "polygon")?;
        self.set("env.polygon.source", filename)?;
        self.set("env.polygon.scaling", scaling)
    }

    pub fn set_start(&mut self, x: f64, y: f64, theta: f64) -> Result<()> {
        self.set("env.start.x", x)?;
        self.set("env.start.y", y)?;
        self.set("env.start.theta", theta)
    }

    pub fn set_goal(&mut self, x: f64, y: f64, theta: f64) -> Result<()> {
        self.set("env.goal.x", x)?;
        self.set("env.goal.y", y)?;
        self.set("env.goal.theta", theta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Settings {
        Settings::from_value(json!({
            "max_planning_time": 3.0,
            "benchmark": {
                "runs": 2,
                "log_file": "",
                "control_planners_on": false,
                "steer_functions": [0],
                "forward_propagations": [],
                "planning": {
                    "rrt": false,
                    "rrt_star": true,
                    "informed_rrt_star": false,
                    "bit_star": true
                },
                "smoothing": {
                    "grips": false,
                    "chomp": false,
                    "ompl_shortcut": true
                }
            },
            "env": {
                "type": "grid",
                "start": { "x": 0.0, "y": 0.0, "theta": 0.0 },
                "goal": { "x": 0.0, "y": 0.0, "theta": 0.0 },
                "grid": {
                    "generator": "random",
                    "width": 0, "height": 0, "seed": 0,
                    "random": { "obstacle_ratio": 0.0 },
                    "corridor": { "branches": 0, "radius": 0.0 },
                    "image": {
                        "source": "", "desired_width": 0, "desired_height": 0,
                        "occupancy_threshold": 0.5
                    }
                },
                "polygon": { "source": "", "scaling": 1.0 }
            }
        }))
        .unwrap()
    }

    #[test]
    fn dotted_get_and_set() {
        let mut s = sample();
        assert_eq!(s.get_f64("max_planning_time").unwrap(), 3.0);
        s.set("env.grid.width", 64u32).unwrap();
        assert_eq!(s.get_u64("env.grid.width").unwrap(), 64);
    }

    #[test]
    fn missing_keys_are_errors() {
        let mut s = sample();
        assert!(matches!(
            s.get("env.grid.bogus"),
            Err(MpbError::MissingKey { .. })
        ));
        assert!(matches!(
            s.set("env.bogus.deeper", 1),
            Err(MpbError::MissingKey { .. })
        ));
        // Final segment may be new.
        s.set("env.grid.margin", 2).unwrap();
        assert_eq!(s.get_u64("env.grid.margin").unwrap(), 2);
    }

    #[test]
    fn planner_selection_round_trip() {
        let mut s = sample();
        assert_eq!(
            s.enabled_planners().unwrap(),
            vec!["rrt_star".to_string(), "bit_star".to_string()]
        );
        let selected = s.set_planners(&["RRT*", "informed_rrt_star"]).unwrap();
        assert_eq!(
            selected,
            vec!["rrt_star".to_string(), "informed_rrt_star".to_string()]
        );
        assert_eq!(s.enabled_planners().unwrap(), selected);
    }

    #[test]
    fn isolate_leaves_one_toggle_on() {
        let mut s = sample();
        s.isolate_planner("bit_star").unwrap();
        assert_eq!(s.enabled_planners().unwrap(), vec!["bit_star".to_string()]);
    }

    #[test]
    fn steer_functions_set_indices_and_clear_control() {
        let mut s = sample();
        s.set("benchmark.control_planners_on", true).unwrap();
        let indices = s.set_steer_functions(&["car", "dubins", "car"]).unwrap();
        assert_eq!(indices, vec![6, 1]);
        assert_eq!(
            s.get("benchmark.steer_functions").unwrap(),
            &json!([6, 1])
        );
        assert_eq!(
            s.get("benchmark.control_planners_on").unwrap(),
            &json!(false)
        );
        assert_eq!(s.steer_function_count(), 2);
    }

    #[test]
    fn robot_models_enable_control_planners() {
        let mut s = sample();
        let indices = s.set_robot_models(&["kinematic_single_track"]).unwrap();
        assert_eq!(indices, vec![1]);
        assert_eq!(
            s.get("benchmark.control_planners_on").unwrap(),
            &json!(true)
        );
    }

    #[test]
    fn env_setters_fill_the_template_sections() {
        let mut s = sample();
        s.set_corridor_grid_env(50, 50, 40, 3.0, 7).unwrap();
        assert_eq!(s.get("env.grid.generator").unwrap(), &json!("corridor"));
        assert_eq!(s.get_u64("env.grid.corridor.branches").unwrap(), 40);

        s.set_image_yaml_env("maps/atc.yaml").unwrap();
        assert_eq!(s.get("env.type").unwrap(), &json!("yaml"));

        s.set_start(-5.0, -5.0, 0.785).unwrap();
        assert_eq!(s.get_f64("env.start.x").unwrap(), -5.0);
    }

    #[test]
    fn save_round_trips_through_from_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let s = sample();
        s.save(&path).unwrap();
        let reloaded = Settings::from_template(&path).unwrap();
        assert_eq!(reloaded, s);
    }

    #[test]
    fn missing_template_has_a_helpful_error() {
        let err = Settings::from_template(Path::new("/nonexistent/benchmark_template.json"))
            .unwrap_err();
        assert!(matches!(err, MpbError::TemplateNotFound { .. }));
        assert!(err.to_string().contains("benchmark_template.json"));
    }
}
