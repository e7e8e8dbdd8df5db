use anyhow::{Context, Result};
use serde::Deserialize;

use crate::courses::ExclusionRules;

/// Dashboard naming and filtering policy.
///
/// Stored as a JSON object on disk; every field is optional:
/// ```json
/// {
///   "course_exclusions": ["Teacher Training", "B2B"],
///   "lesson_exclusions": ["feedback"],
///   "display_suffixes": ["Self-Paced"],
///   "preferred_order": ["Prealgebra 1", "Prealgebra 2"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub course_exclusions: ExclusionRules,
    pub lesson_exclusions: ExclusionRules,
    pub display_suffixes: Vec<String>,
    pub preferred_order: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            course_exclusions: ExclusionRules::default_courses(),
            lesson_exclusions: ExclusionRules::default_lessons(),
            display_suffixes: vec!["Self-Paced".to_string()],
            preferred_order: [
                "Prealgebra 1",
                "Prealgebra 2",
                "Introduction to Algebra A",
                "Introduction to Counting & Probability",
                "Introduction to Algebra B",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl DashboardConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("invalid config '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Loads `path` when given, otherwise the defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = DashboardConfig::from_json("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config =
            DashboardConfig::from_json(r#"{"lesson_exclusions": ["survey", "intro"]}"#)
                .unwrap();

        assert!(config.lesson_exclusions.matches("Course Survey"));
        assert!(!config.lesson_exclusions.matches("Course Feedback"));
        assert!(config.course_exclusions.matches("B2B Prealgebra 1"));
        assert_eq!(config.display_suffixes, vec!["Self-Paced"]);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(DashboardConfig::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        assert!(DashboardConfig::load("/nonexistent/lesson_feedback.json").is_err());
        assert!(DashboardConfig::load_or_default(None).is_ok());
    }
}
