use tracing::debug;

use crate::analyzers::types::{AggregateError, AggregatedLessonStat, Granularity};
use crate::analyzers::utility::{LessonTotals, collapse};
use crate::stats::FeedbackRecord;

/// `(course, (chapter, section, item), lesson_title)`; the position is `None`
/// when grouping by title only.
type GroupKey = (String, Option<(u32, u32, u32)>, String);

/// Groups extracted records into per-lesson response totals.
///
/// Yes/no counts are derived per record (see [`FeedbackRecord::yes_count`])
/// before summing. Output is ordered by course, then position, then title.
///
/// # Errors
///
/// Returns [`AggregateError::InvalidLessonKey`] if a record's chapter, section
/// or item is not a non-negative integer.
pub fn aggregate(
    records: &[FeedbackRecord],
    granularity: Granularity,
) -> Result<Vec<AggregatedLessonStat>, AggregateError> {
    let mut keyed = Vec::with_capacity(records.len());

    for record in records {
        let chapter_num = lesson_number("chapter", &record.chapter, record)?;
        let section_num = lesson_number("section", &record.section, record)?;
        let item_num = lesson_number("item", &record.item, record)?;

        let totals = LessonTotals {
            chapter_num,
            section_num,
            item_num,
            total_responses: record.num_responses as u64,
            yes_count: record.yes_count(),
            no_count: record.no_count(),
        };

        keyed.push((
            group_key(granularity, &record.course, totals, &record.lesson_title),
            totals,
        ));
    }

    let stats = into_stats(collapse(keyed));
    debug!(records = records.len(), groups = stats.len(), ?granularity, "Aggregated records");
    Ok(stats)
}

/// Groups already aggregated rows again and re-sums them.
///
/// Applying this with the granularity that produced `stats` returns `stats`
/// unchanged.
pub fn reaggregate(
    stats: &[AggregatedLessonStat],
    granularity: Granularity,
) -> Vec<AggregatedLessonStat> {
    let keyed = stats.iter().map(|stat| {
        let totals = LessonTotals {
            chapter_num: stat.chapter_num,
            section_num: stat.section_num,
            item_num: stat.item_num,
            total_responses: stat.total_responses,
            yes_count: stat.yes_count,
            no_count: stat.no_count,
        };
        (group_key(granularity, &stat.course, totals, &stat.lesson_title), totals)
    });

    into_stats(collapse(keyed))
}

fn group_key(
    granularity: Granularity,
    course: &str,
    totals: LessonTotals,
    title: &str,
) -> GroupKey {
    let position = match granularity {
        Granularity::Lesson => Some((totals.chapter_num, totals.section_num, totals.item_num)),
        Granularity::Title => None,
    };
    (course.to_string(), position, title.to_string())
}

fn into_stats(groups: Vec<(GroupKey, LessonTotals)>) -> Vec<AggregatedLessonStat> {
    groups
        .into_iter()
        .map(|((course, _, lesson_title), totals)| AggregatedLessonStat {
            course,
            chapter_num: totals.chapter_num,
            section_num: totals.section_num,
            item_num: totals.item_num,
            lesson_title,
            total_responses: totals.total_responses,
            yes_count: totals.yes_count,
            no_count: totals.no_count,
        })
        .collect()
}

fn lesson_number(
    field: &'static str,
    value: &str,
    record: &FeedbackRecord,
) -> Result<u32, AggregateError> {
    value.parse().map_err(|_| AggregateError::InvalidLessonKey {
        field,
        value: value.to_string(),
        lesson_title: record.lesson_title.clone(),
        course: record.course.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(section: &str, item: &str, title: &str, n: u32, yes: u32, no: u32) -> FeedbackRecord {
        FeedbackRecord {
            course: "Course A".into(),
            chapter: "1".into(),
            section: section.into(),
            item: item.into(),
            lesson_title: title.into(),
            num_responses: n,
            yes_percentage: yes,
            no_percentage: no,
            ..Default::default()
        }
    }

    fn two_lessons() -> Vec<FeedbackRecord> {
        vec![
            record("2", "3", "Lesson X", 10, 50, 50),
            record("2", "3", "Lesson X", 20, 60, 40),
            record("3", "1", "Lesson Y", 15, 80, 20),
            record("3", "1", "Lesson Y", 25, 70, 30),
        ]
    }

    #[test]
    fn test_aggregate_multiple_groups() {
        let stats = aggregate(&two_lessons(), Granularity::Lesson).unwrap();
        assert_eq!(stats.len(), 2);

        let x = &stats[0];
        assert_eq!(x.lesson_title, "Lesson X");
        assert_eq!((x.chapter_num, x.section_num, x.item_num), (1, 2, 3));
        assert_eq!(x.total_responses, 30);
        assert_eq!(x.yes_count, 17);
        assert_eq!(x.no_count, 13);

        let y = &stats[1];
        assert_eq!(y.lesson_title, "Lesson Y");
        assert_eq!(y.total_responses, 40);
        assert_eq!(y.yes_count, 30);
        assert_eq!(y.no_count, 11);
    }

    #[test]
    fn test_lesson_granularity_keeps_items_apart() {
        let records = vec![
            record("1", "3", "Lesson X", 10, 50, 50),
            record("1", "4", "Lesson X", 20, 60, 40),
        ];

        let fine = aggregate(&records, Granularity::Lesson).unwrap();
        assert_eq!(fine.len(), 2);
        assert_eq!(fine[0].item_num, 3);
        assert_eq!(fine[1].item_num, 4);

        let coarse = aggregate(&records, Granularity::Title).unwrap();
        assert_eq!(coarse.len(), 1);
        assert_eq!(coarse[0].item_num, 3);
        assert_eq!(coarse[0].yes_count, 17);
    }

    #[test]
    fn test_courses_are_grouped_separately() {
        let mut other = record("2", "3", "Lesson X", 10, 100, 0);
        other.course = "Course B".into();
        let mut records = two_lessons();
        records.push(other);

        let stats = aggregate(&records, Granularity::Title).unwrap();
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[2].course, "Course B");
        assert_eq!(stats[2].yes_count, 10);
    }

    #[test]
    fn test_non_numeric_position_fails() {
        let records = vec![record("two", "3", "Lesson X", 10, 50, 50)];
        let err = aggregate(&records, Granularity::Lesson).unwrap_err();

        let AggregateError::InvalidLessonKey { field, value, .. } = err;
        assert_eq!(field, "section");
        assert_eq!(value, "two");
    }

    #[test]
    fn test_non_numeric_position_fails_at_title_granularity() {
        let records = vec![record("2", "", "Lesson X", 10, 50, 50)];
        assert!(aggregate(&records, Granularity::Title).is_err());
    }

    #[test]
    fn test_reaggregate_is_idempotent() {
        for granularity in [Granularity::Lesson, Granularity::Title] {
            let stats = aggregate(&two_lessons(), granularity).unwrap();
            assert_eq!(reaggregate(&stats, granularity), stats);
        }
    }

    #[test]
    fn test_reaggregate_coarser_matches_direct() {
        let records = vec![
            record("1", "3", "Lesson X", 10, 50, 50),
            record("1", "4", "Lesson X", 20, 60, 40),
        ];
        let fine = aggregate(&records, Granularity::Lesson).unwrap();
        assert_eq!(
            reaggregate(&fine, Granularity::Title),
            aggregate(&records, Granularity::Title).unwrap()
        );
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[], Granularity::Lesson).unwrap().is_empty());
    }
}
