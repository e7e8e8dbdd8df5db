use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::analyzers::aggregate::aggregate;
use crate::analyzers::comments::{collect_comments, comment_threads};
use crate::analyzers::label::label_and_sort_with;
use crate::analyzers::types::{
    AggregateError, AggregatedLessonStat, CourseReport, DashboardReport, Granularity, SortMode,
};
use crate::config::DashboardConfig;
use crate::courses::{build_course_display_map, sort_display_names};
use crate::output::{write_table, write_text};
use crate::parser::extract;
use crate::render::render_dashboard;
use crate::stats::FeedbackRecord;

/// Extracted records and their aggregate, computed from one report page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub records: Vec<FeedbackRecord>,
    pub stats: Vec<AggregatedLessonStat>,
}

/// Paths written by [`analyze`].
#[derive(Debug, Clone)]
pub struct PipelineFiles {
    pub parsed: String,
    pub aggregated: String,
    pub dashboard_html: String,
    pub dashboard_json: String,
}

/// Runs extraction and aggregation on one page.
pub fn run_pipeline(
    html: &str,
    granularity: Granularity,
) -> Result<PipelineOutput, AggregateError> {
    let records = extract(html);
    let stats = aggregate(&records, granularity)?;
    Ok(PipelineOutput { records, stats })
}

/// Builds the dashboard over every course not excluded by `config`.
///
/// Courses appear in preferred display order, then alphabetically.
pub fn build_dashboard(
    records: &[FeedbackRecord],
    stats: &[AggregatedLessonStat],
    mode: SortMode,
    config: &DashboardConfig,
) -> DashboardReport {
    let display_map = build_course_display_map(stats, config);
    let display_names: Vec<String> = display_map.values().cloned().collect();

    let mut courses = Vec::new();
    for display_name in sort_display_names(&display_names, &config.preferred_order) {
        // several full names may clean to the same display name
        for (course, _) in display_map.iter().filter(|(_, d)| **d == display_name) {
            courses.push(course_report(records, stats, course, &display_name, mode, config));
        }
    }

    DashboardReport {
        generated_at: Utc::now(),
        mode,
        courses,
    }
}

/// Everything the dashboard shows for one course.
pub fn course_report(
    records: &[FeedbackRecord],
    stats: &[AggregatedLessonStat],
    course: &str,
    display_name: &str,
    mode: SortMode,
    config: &DashboardConfig,
) -> CourseReport {
    let lessons = label_and_sort_with(stats, course, mode, &config.lesson_exclusions);
    let comments = collect_comments(records, course, &config.lesson_exclusions);

    CourseReport {
        course: course.to_string(),
        display_name: display_name.to_string(),
        comments: comment_threads(&lessons, &comments),
        lessons,
        aggregated: stats.iter().filter(|s| s.course == course).cloned().collect(),
    }
}

/// Parses and aggregates `html`, then writes the parsed table, the aggregated
/// table and the dashboard (HTML and JSON) into `out_dir`.
pub fn analyze(
    html: &str,
    out_dir: &str,
    granularity: Granularity,
    mode: SortMode,
    config: &DashboardConfig,
) -> Result<PipelineFiles> {
    let output = run_pipeline(html, granularity)?;
    if output.records.is_empty() {
        warn!("No feedback cards found in the page");
    }

    let files = PipelineFiles {
        parsed: format!("{out_dir}/parsed_feedback.csv"),
        aggregated: format!("{out_dir}/aggregated_feedback.csv"),
        dashboard_html: format!("{out_dir}/dashboard.html"),
        dashboard_json: format!("{out_dir}/dashboard.json"),
    };

    write_table(&files.parsed, &output.records)?;
    info!(path = %files.parsed, records = output.records.len(), "Parsing complete");

    write_table(&files.aggregated, &output.stats)?;
    info!(path = %files.aggregated, groups = output.stats.len(), "Aggregation complete");

    let report = build_dashboard(&output.records, &output.stats, mode, config);
    write_text(&files.dashboard_html, &render_dashboard(&report)?)?;
    write_text(&files.dashboard_json, &serde_json::to_string_pretty(&report)?)?;
    info!(path = %files.dashboard_html, courses = report.courses.len(), "Dashboard written");

    Ok(files)
}
