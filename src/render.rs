//! HTML dashboard rendering
//!
//! Produces one self-contained page: a stacked yes/no bar chart per course
//! (inline SVG), the students' comments per lesson, and the aggregated table.

use std::fmt::Write;

use anyhow::Result;
use plotters::prelude::*;

use crate::analyzers::types::{
    AggregatedLessonStat, CourseReport, DashboardReport, LabeledLessonRow, LessonComments,
};

const BAR_WIDTH: u32 = 32;
const PLOT_HEIGHT: u32 = 320;
const Y_LABEL_AREA: u32 = 60;
const X_LABEL_AREA: u32 = 220;
const CHART_MARGIN: u32 = 16;

const YES_COLOR: RGBColor = RGBColor(37, 99, 235);
const NO_COLOR: RGBColor = RGBColor(220, 38, 38);

/// Render the whole dashboard as an HTML document
pub fn render_dashboard(report: &DashboardReport) -> Result<String> {
    let sections: String = report
        .courses
        .iter()
        .map(render_course)
        .collect::<Result<String>>()?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Self-Paced Feedback</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <header>
            <h1>Self-Paced Feedback</h1>
            <div class="meta">{mode} mode, generated {generated}</div>
        </header>
        {nav}
        {sections}
    </div>
</body>
</html>"#,
        css = inline_css(),
        mode = html_escape(&mode_title(report.mode.as_str())),
        generated = report.generated_at.format("%Y-%m-%d %H:%M UTC"),
        nav = render_nav(&report.courses),
        sections = if sections.is_empty() {
            r#"<p class="empty">No course data available.</p>"#.to_string()
        } else {
            sections
        },
    ))
}

/// Render one course's stacked bar chart as an SVG element.
///
/// Yes responses form the bottom of each bar and no responses sit on top;
/// bars appear in the order of `lessons` and are labeled by `lesson_label`.
pub fn render_chart(course: &str, lessons: &[LabeledLessonRow]) -> Result<String> {
    if lessons.is_empty() {
        return Ok(format!(
            r#"<p class="empty">No lessons to plot for {}.</p>"#,
            html_escape(course)
        ));
    }

    let max_total = lessons
        .iter()
        .map(|l| l.yes_count + l.no_count)
        .max()
        .unwrap_or(0)
        .max(1);
    let width = Y_LABEL_AREA + 2 * CHART_MARGIN + lessons.len() as u32 * BAR_WIDTH;
    let height = PLOT_HEIGHT + X_LABEL_AREA + 2 * CHART_MARGIN;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(CHART_MARGIN)
            .x_label_area_size(X_LABEL_AREA)
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d((0..lessons.len()).into_segmented(), 0u64..max_total)?;

        let label_of = |value: &SegmentValue<usize>| match value {
            SegmentValue::CenterOf(i) => lessons
                .get(*i)
                .map(|l| l.lesson_label.clone())
                .unwrap_or_default(),
            _ => String::new(),
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(lessons.len())
            .x_label_formatter(&label_of)
            .x_label_style(("sans-serif", 11).into_font().transform(FontTransform::Rotate90))
            .y_desc("Number of Responses")
            .draw()?;

        chart
            .draw_series(
                lessons
                    .iter()
                    .enumerate()
                    .map(|(i, l)| bar(i, 0, l.yes_count, YES_COLOR)),
            )?
            .label("Yes")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], YES_COLOR.filled()));
        chart
            .draw_series(
                lessons
                    .iter()
                    .enumerate()
                    .map(|(i, l)| bar(i, l.yes_count, l.yes_count + l.no_count, NO_COLOR)),
            )?
            .label("No")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], NO_COLOR.filled()));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .border_style(&BLACK)
            .background_style(&WHITE.mix(0.8))
            .draw()?;

        root.present()?;
    }

    Ok(svg)
}

/// One segment of a stacked bar, spanning `from..to` responses.
fn bar(
    index: usize,
    from: u64,
    to: u64,
    color: RGBColor,
) -> Rectangle<(SegmentValue<usize>, u64)> {
    let mut rect = Rectangle::new(
        [(SegmentValue::Exact(index), from), (SegmentValue::Exact(index + 1), to)],
        color.filled(),
    );
    rect.set_margin(0, 0, 4, 4);
    rect
}

fn render_nav(courses: &[CourseReport]) -> String {
    if courses.is_empty() {
        return String::new();
    }

    let links: String = courses
        .iter()
        .map(|c| {
            format!(
                r##"<li><a href="#{}">{}</a></li>"##,
                course_anchor(c),
                html_escape(&c.display_name)
            )
        })
        .collect();

    format!(r#"<nav><ul>{links}</ul></nav>"#)
}

fn render_course(course: &CourseReport) -> Result<String> {
    let anchor = course_anchor(course);

    Ok(format!(
        r#"<section class="section" id="{anchor}">
    <h2>Feedback for {name}</h2>
    <div class="chart-wrap">{chart}</div>
    <h3>Student Feedback Comments</h3>
    {comments}
    <h3>Aggregated Data</h3>
    {table}
</section>
"#,
        name = html_escape(&course.display_name),
        chart = render_chart(&course.course, &course.lessons)?,
        comments = render_comments(&course.comments),
        table = render_aggregated_table(&course.aggregated),
    ))
}

fn course_anchor(course: &CourseReport) -> String {
    course
        .course
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .fold(String::from("course"), |acc, part| acc + "-" + part)
}

fn render_comments(threads: &[LessonComments]) -> String {
    if threads.is_empty() {
        return r#"<p class="empty">No comments.</p>"#.to_string();
    }

    threads
        .iter()
        .map(|thread| {
            let paragraphs: String = thread
                .comments
                .iter()
                .map(|c| format!("<p>{}</p>", html_escape(c)))
                .collect();
            format!(
                "<details><summary>{}</summary>{}</details>\n",
                html_escape(&thread.heading),
                paragraphs
            )
        })
        .collect()
}

fn render_aggregated_table(rows: &[AggregatedLessonStat]) -> String {
    let mut body = String::new();
    for row in rows {
        let _ = writeln!(
            body,
            "<tr><td>{}.{}.{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.chapter_num,
            row.section_num,
            row.item_num,
            html_escape(&row.lesson_title),
            row.total_responses,
            row.yes_count,
            row.no_count,
        );
    }

    format!(
        r#"<table>
<thead><tr><th>Lesson</th><th>Title</th><th>Responses</th><th>Yes</th><th>No</th></tr></thead>
<tbody>
{body}</tbody>
</table>"#
    )
}

fn mode_title(mode: &str) -> String {
    let spaced = mode.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn inline_css() -> &'static str {
    r#"
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: system-ui, -apple-system, 'Segoe UI', sans-serif; line-height: 1.6; color: #111827; }
.container { max-width: 1400px; margin: 0 auto; padding: 2rem; }
header { margin-bottom: 1.5rem; padding-bottom: 1rem; border-bottom: 2px solid #e5e7eb; }
header h1 { font-size: 2rem; font-weight: 700; }
header .meta { color: #6b7280; font-size: 0.875rem; }
nav ul { list-style: none; display: flex; flex-wrap: wrap; gap: 0.5rem 1.25rem; margin-bottom: 2rem; }
nav a { color: #2563eb; text-decoration: none; }
.section { margin-bottom: 3rem; }
.section h2 { font-size: 1.5rem; margin-bottom: 0.5rem; }
.section h3 { font-size: 1.125rem; margin: 1.5rem 0 0.5rem; }
.chart-wrap { overflow-x: auto; }
details { border: 1px solid #e5e7eb; border-radius: 0.375rem; padding: 0.5rem 0.75rem; margin-bottom: 0.5rem; }
details summary { cursor: pointer; font-weight: 600; }
details p { margin-top: 0.75rem; white-space: pre-wrap; }
table { width: 100%; border-collapse: collapse; }
th { padding: 0.5rem; text-align: left; font-size: 0.875rem; border-bottom: 2px solid #e5e7eb; }
td { padding: 0.5rem; font-size: 0.875rem; border-bottom: 1px solid #e5e7eb; }
.empty { color: #6b7280; font-style: italic; }
"#
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
