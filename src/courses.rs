//! Course and lesson name policies.
//!
//! Course names in the report are free text, so which courses are shown and
//! how they are titled is driven by configurable substring rules rather than
//! fixed literals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analyzers::types::AggregatedLessonStat;
use crate::config::DashboardConfig;

/// Case-insensitive substring rules; a text is excluded if any rule occurs in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ExclusionRules {
    needles: Vec<String>,
}

impl ExclusionRules {
    pub fn new<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            needles: needles.into_iter().map(|s| s.into().to_lowercase()).collect(),
        }
    }

    /// Lesson titles that describe the survey itself rather than a lesson.
    pub fn default_lessons() -> Self {
        Self::new(["feedback"])
    }

    /// Courses hidden from listings and the dashboard.
    pub fn default_courses() -> Self {
        Self::new(["Teacher Training", "B2B"])
    }

    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.needles.iter().any(|needle| text.contains(needle.as_str()))
    }
}

impl From<Vec<String>> for ExclusionRules {
    fn from(needles: Vec<String>) -> Self {
        Self::new(needles)
    }
}

impl From<ExclusionRules> for Vec<String> {
    fn from(rules: ExclusionRules) -> Self {
        rules.needles
    }
}

/// Drops rows whose course matches one of `rules`.
pub fn filter_courses(
    stats: &[AggregatedLessonStat],
    rules: &ExclusionRules,
) -> Vec<AggregatedLessonStat> {
    stats
        .iter()
        .filter(|stat| !rules.matches(&stat.course))
        .cloned()
        .collect()
}

/// Removes every suffix text (e.g. `Self-Paced`) from a course name and trims it.
pub fn clean_course_name<S: AsRef<str>>(full_name: &str, suffixes: &[S]) -> String {
    let mut name = full_name.to_string();
    for suffix in suffixes {
        name = name.replace(suffix.as_ref(), "");
    }
    name.trim().to_string()
}

/// Maps each visible course's full name to its display name.
pub fn build_course_display_map(
    stats: &[AggregatedLessonStat],
    config: &DashboardConfig,
) -> BTreeMap<String, String> {
    filter_courses(stats, &config.course_exclusions)
        .into_iter()
        .map(|stat| {
            let display = clean_course_name(&stat.course, &config.display_suffixes);
            (stat.course, display)
        })
        .collect()
}

/// Preferred names first, in preferred order, then everything else alphabetically.
pub fn sort_display_names<S: AsRef<str>>(names: &[String], preferred: &[S]) -> Vec<String> {
    let mut ordered: Vec<String> = preferred
        .iter()
        .map(|p| p.as_ref())
        .filter(|p| names.iter().any(|n| n == p))
        .map(str::to_string)
        .collect();

    let mut others: Vec<String> = names
        .iter()
        .filter(|n| !ordered.contains(n))
        .cloned()
        .collect();
    others.sort();
    others.dedup();

    ordered.extend(others);
    ordered
}

/// Reverse lookup of [`build_course_display_map`].
pub fn course_for_display<'a>(
    display_name: &str,
    map: &'a BTreeMap<String, String>,
) -> Option<&'a str> {
    map.iter()
        .find(|(_, display)| display.as_str() == display_name)
        .map(|(full, _)| full.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(course: &str) -> AggregatedLessonStat {
        AggregatedLessonStat {
            course: course.into(),
            chapter_num: 1,
            section_num: 1,
            item_num: 1,
            lesson_title: "Welcome".into(),
            total_responses: 1,
            yes_count: 1,
            no_count: 0,
        }
    }

    #[test]
    fn test_filter_courses() {
        let stats = vec![
            stat("Prealgebra 1 Self-Paced"),
            stat("Teacher Training Module"),
            stat("B2B Math Workshop"),
            stat("Algebra A Self-Paced"),
        ];
        let kept: Vec<_> = filter_courses(&stats, &ExclusionRules::default_courses())
            .into_iter()
            .map(|s| s.course)
            .collect();
        assert_eq!(kept, vec!["Prealgebra 1 Self-Paced", "Algebra A Self-Paced"]);
    }

    #[test]
    fn test_rules_are_case_insensitive() {
        let rules = ExclusionRules::default_lessons();
        assert!(rules.matches("Course Feedback"));
        assert!(rules.matches("FEEDBACK survey"));
        assert!(!rules.matches("Fractions"));
        assert!(!ExclusionRules::default().matches("anything"));
    }

    #[test]
    fn test_loaded_rules_are_lowercased() {
        let rules: ExclusionRules = serde_json::from_str(r#"["Teacher TRAINING"]"#).unwrap();
        assert_eq!(rules, ExclusionRules::new(["teacher training"]));
        assert!(rules.matches("teacher training module"));
        assert!(rules.matches("TEACHER Training Module"));
        assert!(!rules.matches("Prealgebra 1"));
    }

    #[test]
    fn test_clean_course_name() {
        let suffixes = ["Self-Paced"];
        assert_eq!(clean_course_name("Prealgebra 1 Self-Paced", &suffixes), "Prealgebra 1");
        assert_eq!(clean_course_name("Algebra A Self-Paced", &suffixes), "Algebra A");
        assert_eq!(
            clean_course_name("   Introduction to Counting & Probability Self-Paced   ", &suffixes),
            "Introduction to Counting & Probability"
        );
    }

    #[test]
    fn test_build_course_display_map() {
        let stats = vec![
            stat("Prealgebra 1 Self-Paced"),
            stat("Algebra A Self-Paced"),
            stat("Algebra A Self-Paced"),
            stat("B2B Prealgebra 1 Self-Paced"),
        ];
        let map = build_course_display_map(&stats, &DashboardConfig::default());

        assert_eq!(map.len(), 2);
        assert_eq!(map["Prealgebra 1 Self-Paced"], "Prealgebra 1");
        assert_eq!(map["Algebra A Self-Paced"], "Algebra A");
        assert_eq!(course_for_display("Algebra A", &map), Some("Algebra A Self-Paced"));
        assert_eq!(course_for_display("Geometry", &map), None);
    }

    #[test]
    fn test_sort_display_names() {
        let names: Vec<String> = [
            "Introduction to Geometry",
            "Introduction to Algebra A",
            "Introduction to Counting & Probability",
            "Prealgebra 2",
            "Introduction to Algebra B",
            "Prealgebra 1",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let sorted = sort_display_names(&names, &DashboardConfig::default().preferred_order);
        assert_eq!(
            sorted,
            vec![
                "Prealgebra 1",
                "Prealgebra 2",
                "Introduction to Algebra A",
                "Introduction to Counting & Probability",
                "Introduction to Algebra B",
                "Introduction to Geometry",
            ]
        );
    }
}
