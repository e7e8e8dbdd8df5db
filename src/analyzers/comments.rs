use std::collections::BTreeMap;

use crate::analyzers::types::{LabeledLessonRow, LessonComments};
use crate::courses::ExclusionRules;
use crate::stats::FeedbackRecord;

/// Gathers every comment of `course`, keyed by lesson title.
///
/// Comments of split lessons are concatenated in record order; titles matching
/// `lesson_rules` are left out.
pub fn collect_comments(
    records: &[FeedbackRecord],
    course: &str,
    lesson_rules: &ExclusionRules,
) -> BTreeMap<String, Vec<String>> {
    let mut by_title: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for record in records {
        if record.course != course || lesson_rules.matches(&record.lesson_title) {
            continue;
        }
        by_title
            .entry(record.lesson_title.clone())
            .or_default()
            .extend(record.comments.iter().cloned());
    }

    by_title
}

/// Joins comments onto labeled lessons, keeping the labeled order.
///
/// Lessons without comments are omitted.
pub fn comment_threads(
    labeled: &[LabeledLessonRow],
    comments: &BTreeMap<String, Vec<String>>,
) -> Vec<LessonComments> {
    labeled
        .iter()
        .filter_map(|row| {
            let lesson_comments = comments.get(&row.lesson_title)?;
            if lesson_comments.is_empty() {
                return None;
            }
            Some(LessonComments {
                lesson_title: row.lesson_title.clone(),
                heading: format!("{}.{} {}", row.chapter_num, row.section_num, row.lesson_title),
                comments: lesson_comments.clone(),
            })
        })
        .collect()
}
