//! Output formatting and persistence for pipeline tables.
//!
//! Supports pretty-printing, JSON serialization, and CSV tables.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use csv::WriterBuilder;
use std::fs::{self, File};
use std::path::Path;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes `rows` as a CSV table with a header row, replacing any existing file.
///
/// Parent directories are created as needed.
pub fn write_table<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    ensure_parent_dir(path)?;
    debug!(path, rows = rows.len(), "Writing CSV table");

    let file = File::create(path).with_context(|| format!("failed to create '{path}'"))?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Reads a CSV table written by [`write_table`].
pub fn read_table<T: DeserializeOwned>(path: &str) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("failed to open '{path}'"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: T = result.with_context(|| format!("malformed row in '{path}'"))?;
        rows.push(row);
    }

    debug!(path, rows = rows.len(), "Read CSV table");
    Ok(rows)
}

/// Writes text to `path`, creating parent directories as needed.
pub fn write_text(path: &str, contents: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, contents).with_context(|| format!("failed to write '{path}'"))?;
    Ok(())
}

fn ensure_parent_dir(path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::AggregatedLessonStat;
    use crate::stats::FeedbackRecord;
    use std::env;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn sample_record() -> FeedbackRecord {
        FeedbackRecord {
            course: "Prealgebra 1 Self-Paced".into(),
            chapter: "1".into(),
            section: "1".into(),
            item: "9".into(),
            lesson_title: "Videos, part \"one\"".into(),
            num_responses: 3,
            yes_percentage: 67,
            no_percentage: 33,
            comments: vec!["Too fast".into(), "Loved it, thanks".into()],
            collection: Some("183".into()),
            document_id: Some("9846".into()),
            self_paced_id: None,
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&sample_record());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&sample_record()).unwrap();
    }

    #[test]
    fn test_records_survive_csv() {
        let path = temp_path("lesson_feedback_test_records.csv");
        let _ = fs::remove_file(&path);

        let records = vec![sample_record(), FeedbackRecord::default()];
        write_table(&path, &records).unwrap();
        let back: Vec<FeedbackRecord> = read_table(&path).unwrap();

        assert_eq!(back, records);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_stats_survive_csv() {
        let path = temp_path("lesson_feedback_test_stats.csv");
        let _ = fs::remove_file(&path);

        let stats = vec![AggregatedLessonStat {
            course: "Algebra A".into(),
            chapter_num: 2,
            section_num: 3,
            item_num: 1,
            lesson_title: "Ratios".into(),
            total_responses: 40,
            yes_count: 30,
            no_count: 11,
        }];
        write_table(&path, &stats).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("course,chapter_num,section_num,item_num,lesson_title"));
        let back: Vec<AggregatedLessonStat> = read_table(&path).unwrap();
        assert_eq!(back, stats);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_table_overwrites() {
        let path = temp_path("lesson_feedback_test_overwrite.csv");
        let _ = fs::remove_file(&path);

        write_table(&path, &[sample_record(), sample_record()]).unwrap();
        write_table(&path, &[sample_record()]).unwrap();

        let back: Vec<FeedbackRecord> = read_table(&path).unwrap();
        assert_eq!(back.len(), 1);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_malformed_comment_cell_reads_as_empty() {
        let path = temp_path("lesson_feedback_test_bad_comments.csv");
        fs::write(
            &path,
            "course,chapter,section,item,lesson_title,num_responses,yes_percentage,no_percentage,comments,collection,document_id,self_paced_id\n\
             C,1,1,1,Intro,2,50,50,['python literal'],,,\n",
        )
        .unwrap();

        let back: Vec<FeedbackRecord> = read_table(&path).unwrap();
        assert!(back[0].comments.is_empty());
        assert_eq!(back[0].collection, None);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_missing_table_is_an_error() {
        assert!(read_table::<FeedbackRecord>("/nonexistent/lesson_feedback.csv").is_err());
    }
}
