//! CLI entry point for the lesson feedback tool.
//!
//! Provides subcommands for retrieving the self-paced feedback report,
//! extracting and aggregating its cards, inspecting one course's labeled
//! lessons and comments, and rendering the HTML dashboard.

mod infra;
mod services;

use crate::infra::feedback_site::client::{DEFAULT_REPORT_URL, FeedbackSiteClient};
use crate::services::report_source::{ReportSource, SavedPage};
use anyhow::Result;
use clap::{Parser, Subcommand};
use lesson_feedback::analyzers::aggregate::aggregate;
use lesson_feedback::analyzers::analyzer::{analyze, build_dashboard, course_report};
use lesson_feedback::analyzers::types::{AggregatedLessonStat, Granularity, SortMode};
use lesson_feedback::{
    config::DashboardConfig,
    courses::{build_course_display_map, course_for_display, sort_display_names},
    output::{print_json, print_pretty, read_table, write_table, write_text},
    parser::extract,
    render::render_dashboard,
    stats::FeedbackRecord,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "lesson_feedback")]
#[command(about = "Extract, aggregate and chart self-paced lesson feedback", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the feedback report page using a logged-in session cookie
    Fetch {
        /// Report URL (defaults to FEEDBACK_REPORT_URL or the public report address)
        #[arg(long)]
        url: Option<String>,

        /// Where to save the page
        #[arg(short, long, default_value = "data/feedback_page.html")]
        output: String,
    },
    /// Extract feedback records from a saved page or URL
    Parse {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL", default_value = "data/feedback_page.html")]
        source: String,

        /// CSV file to write records to
        #[arg(short, long, default_value = "data/parsed_feedback.csv")]
        output: String,
    },
    /// Aggregate parsed records into per-lesson yes/no counts
    Aggregate {
        /// Parsed records CSV
        #[arg(short, long, default_value = "data/parsed_feedback.csv")]
        input: String,

        /// CSV file to write aggregated rows to
        #[arg(short, long, default_value = "data/aggregated_feedback.csv")]
        output: String,

        /// Grouping key: "lesson" (course, chapter, section, item, title) or "title" (course, title)
        #[arg(long, default_value = "lesson")]
        by: Granularity,
    },
    /// List visible courses in display order
    Courses {
        /// Aggregated CSV
        #[arg(short, long, default_value = "data/aggregated_feedback.csv")]
        data: String,

        /// Optional JSON dashboard config
        #[arg(long)]
        config: Option<String>,
    },
    /// Show the labeled, sorted lessons of one course
    Plot {
        /// Full course name or its display name
        #[arg(long)]
        course: String,

        /// Aggregated CSV
        #[arg(short, long, default_value = "data/aggregated_feedback.csv")]
        data: String,

        /// Sorting mode: chronological or worst-to-best (anything else sorts by title)
        #[arg(short, long, default_value = "chronological")]
        mode: SortMode,

        /// Print the rows as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Optional JSON dashboard config
        #[arg(long)]
        config: Option<String>,
    },
    /// Show the student comments of one course, per lesson
    Comments {
        /// Full course name or its display name
        #[arg(long)]
        course: String,

        /// Parsed records CSV
        #[arg(short, long, default_value = "data/parsed_feedback.csv")]
        parsed: String,

        /// Aggregated CSV
        #[arg(short, long, default_value = "data/aggregated_feedback.csv")]
        data: String,

        /// Sorting mode: chronological or worst-to-best (anything else sorts by title)
        #[arg(short, long, default_value = "chronological")]
        mode: SortMode,

        /// Optional JSON dashboard config
        #[arg(long)]
        config: Option<String>,
    },
    /// Render the HTML dashboard (and its JSON snapshot) from saved tables
    Dashboard {
        /// Parsed records CSV
        #[arg(short, long, default_value = "data/parsed_feedback.csv")]
        parsed: String,

        /// Aggregated CSV
        #[arg(short, long, default_value = "data/aggregated_feedback.csv")]
        data: String,

        /// Sorting mode: chronological or worst-to-best (anything else sorts by title)
        #[arg(short, long, default_value = "chronological")]
        mode: SortMode,

        /// HTML file to write; the JSON snapshot is written next to it
        #[arg(short, long, default_value = "data/dashboard.html")]
        output: String,

        /// Optional JSON dashboard config
        #[arg(long)]
        config: Option<String>,
    },
    /// Parse, aggregate and render in one go
    Pipeline {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL", default_value = "data/feedback_page.html")]
        source: String,

        /// Directory for all outputs
        #[arg(short = 'd', long, default_value = "data")]
        dir: String,

        /// Grouping key: "lesson" or "title"
        #[arg(long, default_value = "lesson")]
        by: Granularity,

        /// Sorting mode: chronological or worst-to-best (anything else sorts by title)
        #[arg(short, long, default_value = "chronological")]
        mode: SortMode,

        /// Optional JSON dashboard config
        #[arg(long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_tracing()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch { url, output } => {
            let url = url
                .or_else(|| std::env::var("FEEDBACK_REPORT_URL").ok())
                .unwrap_or_else(|| DEFAULT_REPORT_URL.to_string());
            let html = fetcher(&url).await?;
            write_text(&output, &html)?;
            info!(path = %output, bytes = html.len(), "Page source saved");
        }
        Commands::Parse { source, output } => {
            let html = fetcher(&source).await?;
            let records = extract(&html);
            if records.is_empty() {
                warn!(source = %source, "No feedback cards found");
            }
            print_pretty(&records);
            write_table(&output, &records)?;
            info!(path = %output, records = records.len(), "Parsed records written");
        }
        Commands::Aggregate { input, output, by } => {
            let records: Vec<FeedbackRecord> = read_table(&input)?;
            let stats = aggregate(&records, by)?;
            write_table(&output, &stats)?;
            info!(path = %output, groups = stats.len(), "Aggregated data written");
        }
        Commands::Courses { data, config } => {
            let config = DashboardConfig::load_or_default(config.as_deref())?;
            let stats: Vec<AggregatedLessonStat> = read_table(&data)?;
            let display_map = build_course_display_map(&stats, &config);
            let names: Vec<String> = display_map.values().cloned().collect();

            for name in sort_display_names(&names, &config.preferred_order) {
                let full = course_for_display(&name, &display_map).unwrap_or(name.as_str());
                info!(display = %name, course = %full, "Course");
            }
        }
        Commands::Plot {
            course,
            data,
            mode,
            json,
            config,
        } => {
            let config = DashboardConfig::load_or_default(config.as_deref())?;
            let stats: Vec<AggregatedLessonStat> = read_table(&data)?;
            let course = resolve_course(&stats, &course, &config);
            let report = course_report(&[], &stats, &course, &course, mode, &config);

            if report.lessons.is_empty() {
                warn!(course = %course, "No lessons to plot");
            } else if json {
                print_json(&report.lessons)?;
            } else {
                for row in &report.lessons {
                    info!(
                        label = %row.lesson_label,
                        yes = row.yes_count,
                        no = row.no_count,
                        no_pct = %format!("{:.1}", row.no_pct),
                        "Lesson"
                    );
                }
            }
        }
        Commands::Comments {
            course,
            parsed,
            data,
            mode,
            config,
        } => {
            let config = DashboardConfig::load_or_default(config.as_deref())?;
            let records: Vec<FeedbackRecord> = read_table(&parsed)?;
            let stats: Vec<AggregatedLessonStat> = read_table(&data)?;
            let course = resolve_course(&stats, &course, &config);
            let report = course_report(&records, &stats, &course, &course, mode, &config);

            if report.comments.is_empty() {
                info!(course = %course, "No comments");
            }
            for thread in &report.comments {
                info!("{}\n\n{}", thread.heading, thread.comments.join("\n\n"));
            }
        }
        Commands::Dashboard {
            parsed,
            data,
            mode,
            output,
            config,
        } => {
            let config = DashboardConfig::load_or_default(config.as_deref())?;
            let records: Vec<FeedbackRecord> = read_table(&parsed)?;
            let stats: Vec<AggregatedLessonStat> = read_table(&data)?;
            let report = build_dashboard(&records, &stats, mode, &config);

            write_text(&output, &render_dashboard(&report)?)?;
            let json_path = Path::new(&output).with_extension("json");
            write_text(&json_path.to_string_lossy(), &serde_json::to_string_pretty(&report)?)?;
            info!(path = %output, courses = report.courses.len(), "Dashboard written");
        }
        Commands::Pipeline {
            source,
            dir,
            by,
            mode,
            config,
        } => {
            let config = DashboardConfig::load_or_default(config.as_deref())?;
            let html = fetcher(&source).await?;
            let files = analyze(&html, &dir, by, mode, &config)?;
            info!(dashboard = %files.dashboard_html, "Pipeline complete");
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// The returned guard flushes the file writer when dropped.
fn init_tracing() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/lesson_feedback.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("lesson_feedback.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

/// Loads the report page from a local file path or fetches it over HTTP.
#[tracing::instrument(skip_all, fields(source = %source))]
async fn fetcher(source: &str) -> Result<String> {
    let report: Box<dyn ReportSource> = if source.starts_with("http") {
        let cookie = std::env::var("FEEDBACK_SESSION_COOKIE").ok();
        Box::new(FeedbackSiteClient::new(source.to_string(), cookie.as_deref())?)
    } else {
        Box::new(SavedPage {
            path: source.to_string(),
        })
    };
    report.fetch_report().await
}

/// Accepts either a full course name or a display name.
fn resolve_course(stats: &[AggregatedLessonStat], name: &str, config: &DashboardConfig) -> String {
    if stats.iter().any(|s| s.course == name) {
        return name.to_string();
    }

    let display_map = build_course_display_map(stats, config);
    match course_for_display(name, &display_map) {
        Some(full) => full.to_string(),
        None => {
            warn!(course = %name, "No matching course found");
            name.to_string()
        }
    }
}
