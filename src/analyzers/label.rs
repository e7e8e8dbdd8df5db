use tracing::debug;

use crate::analyzers::types::{AggregatedLessonStat, LabeledLessonRow, SortMode};
use crate::analyzers::utility::{LessonTotals, collapse, pct_of};
use crate::courses::ExclusionRules;

/// Builds the ordered, labeled lesson list of one course.
///
/// Uses the default lesson exclusions (titles containing "feedback").
pub fn label_and_sort(
    rows: &[AggregatedLessonStat],
    course: &str,
    mode: SortMode,
) -> Vec<LabeledLessonRow> {
    label_and_sort_with(rows, course, mode, &ExclusionRules::default_lessons())
}

/// Builds the ordered, labeled lesson list of one course.
///
/// Rows of `course` whose title is not excluded are collapsed by title
/// (minimum chapter/section, summed counts), then sorted and labeled per
/// `mode`. A lesson with no yes/no answers gets `no_pct = 0.0` and is kept.
pub fn label_and_sort_with(
    rows: &[AggregatedLessonStat],
    course: &str,
    mode: SortMode,
    lesson_rules: &ExclusionRules,
) -> Vec<LabeledLessonRow> {
    let keyed = rows
        .iter()
        .filter(|row| row.course == course)
        .filter(|row| !lesson_rules.matches(&row.lesson_title))
        .map(|row| {
            (
                row.lesson_title.clone(),
                LessonTotals {
                    chapter_num: row.chapter_num,
                    section_num: row.section_num,
                    item_num: row.item_num,
                    total_responses: row.total_responses,
                    yes_count: row.yes_count,
                    no_count: row.no_count,
                },
            )
        });

    let mut labeled: Vec<LabeledLessonRow> = collapse(keyed)
        .into_iter()
        .map(|(lesson_title, totals)| LabeledLessonRow {
            lesson_title,
            chapter_num: totals.chapter_num,
            section_num: totals.section_num,
            yes_count: totals.yes_count,
            no_count: totals.no_count,
            no_pct: pct_of(totals.no_count, totals.yes_count),
            lesson_label: String::new(),
            position: 0,
        })
        .collect();

    // all sorts are stable
    match mode {
        SortMode::Chronological => labeled.sort_by_key(|row| (row.chapter_num, row.section_num)),
        SortMode::WorstToBest => labeled.sort_by(|a, b| b.no_pct.total_cmp(&a.no_pct)),
        SortMode::Alphabetical => labeled.sort_by(|a, b| a.lesson_title.cmp(&b.lesson_title)),
    }

    for (position, row) in labeled.iter_mut().enumerate() {
        row.position = position;
        row.lesson_label = lesson_label(row, mode);
    }

    debug!(course, %mode, lessons = labeled.len(), "Labeled lessons");
    labeled
}

fn lesson_label(row: &LabeledLessonRow, mode: SortMode) -> String {
    match mode {
        SortMode::Chronological => {
            format!("{}.{} {}", row.chapter_num, row.section_num, row.lesson_title)
        }
        SortMode::WorstToBest => format!(
            "{}.{} {} ({:.1}% no)",
            row.chapter_num, row.section_num, row.lesson_title, row.no_pct
        ),
        SortMode::Alphabetical => row.lesson_title.clone(),
    }
}
