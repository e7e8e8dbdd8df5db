//! HTML extractor for the self-paced feedback report.
//!
//! The report is a flat list of course headings (`<h3 class="p-0 m-0">`)
//! interleaved with feedback cards (`<div class="card mb-4">`). Each card has
//! a header naming the lesson, a body with the response counts and italic
//! student comments, and a footer with catalog ids.
//!
//! Extraction never fails: cards without a recognizable lesson header or body
//! are skipped, and sub-fields that cannot be found fall back to `0`/`None`.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::stats::FeedbackRecord;

/// Course assigned to cards that have no heading before them.
pub const UNKNOWN_COURSE: &str = "Unknown Course";

static LESSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Lesson\s+([0-9]+)\.([0-9]+)\.([0-9]+)\s+(.*)").expect("valid lesson pattern")
});

static FOOTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Collection:\s*([0-9]+).*Document ID:\s*([0-9]+).*Self-paced ID:\s*([0-9]+)")
        .expect("valid footer pattern")
});

static RESPONSES_RE: LazyLock<Regex> =
    LazyLock::new(|| {
        Regex::new(r"([0-9]+)\s+students responded").expect("valid responses pattern")
    });
static YES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)%\s+'yes").expect("valid yes pattern"));
static NO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)%\s+'no").expect("valid no pattern"));

static WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

static CARD_OR_HEADING: LazyLock<Selector> =
    LazyLock::new(|| selector("h3.p-0.m-0, div.card.mb-4"));
static CARD_HEADER: LazyLock<Selector> = LazyLock::new(|| selector("div.card-header"));
static CARD_BODY: LazyLock<Selector> = LazyLock::new(|| selector("div.card-body"));
static CARD_FOOTER: LazyLock<Selector> = LazyLock::new(|| selector("div.card-footer"));
static EMPHASIS: LazyLock<Selector> = LazyLock::new(|| selector("i, em"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid CSS selector")
}

/// Catalog ids printed in a card footer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FooterInfo {
    pub collection: Option<String>,
    pub document_id: Option<String>,
    pub self_paced_id: Option<String>,
}

/// Collapses every whitespace run to one space and trims the ends.
pub fn clean_text(text: &str) -> String {
    WS_RE.replace_all(text, " ").trim().to_string()
}

/// Extracts the `Collection` / `Document ID` / `Self-paced ID` triple.
///
/// Any text may sit between the three fields. If the footer does not carry
/// all three, every field is `None`.
pub fn parse_footer(footer_text: &str) -> FooterInfo {
    match FOOTER_RE.captures(footer_text) {
        Some(caps) => FooterInfo {
            collection: Some(caps[1].to_string()),
            document_id: Some(caps[2].to_string()),
            self_paced_id: Some(caps[3].to_string()),
        },
        None => FooterInfo::default(),
    }
}

/// Parses a whole report page into feedback records, in document order.
pub fn extract(html: &str) -> Vec<FeedbackRecord> {
    let document = Html::parse_document(html);

    let mut course: Option<String> = None;
    let mut records = Vec::new();
    let mut skipped = 0usize;

    // The combined selector yields headings and cards in document order, so
    // the last heading seen is the nearest one preceding each card.
    for element in document.select(&CARD_OR_HEADING) {
        if element.value().name() == "h3" {
            course = Some(clean_text(&element.text().collect::<String>()));
            continue;
        }

        match parse_card(element) {
            Some(mut record) => {
                record.course = course.clone().unwrap_or_else(|| UNKNOWN_COURSE.to_string());
                records.push(record);
            }
            None => skipped += 1,
        }
    }

    debug!(records = records.len(), skipped, "Extracted feedback cards");
    records
}

/// Parses one card. `course` is left empty for the caller to fill in.
fn parse_card(card: ElementRef) -> Option<FeedbackRecord> {
    let header = card.select(&CARD_HEADER).next()?;
    let header_text = clean_text(&header.text().collect::<String>());
    let Some(lesson) = LESSON_RE.captures(&header_text) else {
        debug!(header = %header_text, "Skipping card without lesson header");
        return None;
    };

    let body = card.select(&CARD_BODY).next()?;
    let body_text = clean_text(&joined_text(body));

    let comments = body
        .select(&EMPHASIS)
        .filter(|el| !inside_emphasis(*el, body))
        .map(|el| clean_text(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect();

    let footer = card
        .select(&CARD_FOOTER)
        .next()
        .map(|el| parse_footer(&clean_text(&joined_text(el))))
        .unwrap_or_default();

    Some(FeedbackRecord {
        course: String::new(),
        chapter: lesson[1].to_string(),
        section: lesson[2].to_string(),
        item: lesson[3].to_string(),
        lesson_title: lesson[4].to_string(),
        num_responses: first_number(&RESPONSES_RE, &body_text),
        yes_percentage: first_number(&YES_RE, &body_text),
        no_percentage: first_number(&NO_RE, &body_text),
        comments,
        collection: footer.collection,
        document_id: footer.document_id,
        self_paced_id: footer.self_paced_id,
    })
}

/// True when an `i`/`em` between `el` and `body` already encloses it.
fn inside_emphasis(el: ElementRef, body: ElementRef) -> bool {
    el.ancestors()
        .take_while(|node| node.id() != body.id())
        .filter_map(|node| node.value().as_element())
        .any(|parent| matches!(parent.name(), "i" | "em"))
}

/// Text of every descendant text node, space separated.
fn joined_text(element: ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

/// First capture of `pattern` as a number, or 0 when absent or out of range.
fn first_number(pattern: &Regex, text: &str) -> u32 {
    pattern
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}
