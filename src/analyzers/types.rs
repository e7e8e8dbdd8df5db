//! Data types used by the aggregation pipeline.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response totals for one lesson group of one course.
///
/// `yes_count + no_count` is not guaranteed to equal `total_responses`:
/// the source percentages need not sum to 100 and counts are rounded per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedLessonStat {
    pub course: String,
    pub chapter_num: u32,
    pub section_num: u32,
    pub item_num: u32,
    pub lesson_title: String,
    pub total_responses: u64,
    pub yes_count: u64,
    pub no_count: u64,
}

/// One display-ready lesson of a single course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledLessonRow {
    pub lesson_title: String,
    pub chapter_num: u32,
    pub section_num: u32,
    pub yes_count: u64,
    pub no_count: u64,
    pub no_pct: f64,
    pub lesson_label: String,
    /// Zero-based position in the sorted output.
    pub position: usize,
}

/// Combined student comments for one lesson, ready for a detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonComments {
    pub lesson_title: String,
    pub heading: String,
    pub comments: Vec<String>,
}

/// Everything the dashboard shows for one course.
#[derive(Debug, Clone, Serialize)]
pub struct CourseReport {
    pub course: String,
    pub display_name: String,
    pub lessons: Vec<LabeledLessonRow>,
    pub comments: Vec<LessonComments>,
    pub aggregated: Vec<AggregatedLessonStat>,
}

/// Dashboard snapshot over all visible courses, in display order.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub mode: SortMode,
    pub courses: Vec<CourseReport>,
}

/// Grouping key used by the aggregator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Granularity {
    /// `(course, chapter, section, item, lesson_title)`
    #[default]
    Lesson,
    /// `(course, lesson_title)`
    Title,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown granularity {0:?}, expected \"lesson\" or \"title\"")]
pub struct ParseGranularityError(String);

impl FromStr for Granularity {
    type Err = ParseGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lesson" => Ok(Granularity::Lesson),
            "title" => Ok(Granularity::Title),
            other => Err(ParseGranularityError(other.to_string())),
        }
    }
}

/// Ordering and labeling applied by the labeler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Ascending `(chapter, section)`.
    #[default]
    Chronological,
    /// Descending share of "no" answers.
    WorstToBest,
    /// Ascending lesson title; used for any unrecognized mode name.
    Alphabetical,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Chronological => "chronological",
            SortMode::WorstToBest => "worst-to-best",
            SortMode::Alphabetical => "alphabetical",
        }
    }
}

impl FromStr for SortMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "chronological" => SortMode::Chronological,
            "worst-to-best" => SortMode::WorstToBest,
            _ => SortMode::Alphabetical,
        })
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when an extracted record violates the extractor's contract.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("{field} {value:?} of lesson {lesson_title:?} in course {course:?} is not a number")]
    InvalidLessonKey {
        field: &'static str,
        value: String,
        lesson_title: String,
        course: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_mode_from_str() {
        assert_eq!("chronological".parse::<SortMode>().unwrap(), SortMode::Chronological);
        assert_eq!("worst-to-best".parse::<SortMode>().unwrap(), SortMode::WorstToBest);
        assert_eq!("by-name".parse::<SortMode>().unwrap(), SortMode::Alphabetical);
        assert_eq!("".parse::<SortMode>().unwrap(), SortMode::Alphabetical);
    }

    #[test]
    fn test_granularity_from_str() {
        assert_eq!("lesson".parse::<Granularity>().unwrap(), Granularity::Lesson);
        assert_eq!("Title".parse::<Granularity>().unwrap(), Granularity::Title);
        assert!("chapter".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_aggregate_error_message_names_field() {
        let err = AggregateError::InvalidLessonKey {
            field: "chapter",
            value: "x".into(),
            lesson_title: "Videos".into(),
            course: "Prealgebra 1".into(),
        };
        assert!(err.to_string().contains("chapter \"x\""));
    }
}
