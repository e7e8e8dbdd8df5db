use serde::{Deserialize, Serialize};

/// One parsed feedback card.
///
/// `chapter`, `section` and `item` keep the textual form they had in the page
/// header; the aggregator converts them to integers and rejects anything else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub course: String,
    pub chapter: String,
    pub section: String,
    pub item: String,
    pub lesson_title: String,

    pub num_responses: u32,
    pub yes_percentage: u32,
    pub no_percentage: u32,

    #[serde(with = "comments_column")]
    pub comments: Vec<String>,

    // footer metadata, absent when the footer does not match
    pub collection: Option<String>,
    pub document_id: Option<String>,
    pub self_paced_id: Option<String>,
}

impl FeedbackRecord {
    /// Respondents who answered "yes", derived from the rounded percentage.
    pub fn yes_count(&self) -> u64 {
        count_from_pct(self.num_responses, self.yes_percentage)
    }

    /// Respondents who answered "no", derived from the rounded percentage.
    pub fn no_count(&self) -> u64 {
        count_from_pct(self.num_responses, self.no_percentage)
    }
}

/// `round(total * pct / 100)` using round-half-to-even on the exact value.
///
/// Computed in integers so that `.5` cases are never skewed by float error.
pub fn count_from_pct(total: u32, pct: u32) -> u64 {
    let scaled = total as u64 * pct as u64;
    let quotient = scaled / 100;
    let remainder = scaled % 100;

    match remainder {
        r if r > 50 => quotient + 1,
        50 if quotient % 2 == 1 => quotient + 1,
        _ => quotient,
    }
}

/// Stores the comment list as a JSON array inside a single CSV cell.
///
/// Reading is lenient: an empty or malformed cell becomes an empty list.
mod comments_column {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(comments: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = serde_json::to_string(comments).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        let cell = String::deserialize(deserializer)?;
        Ok(serde_json::from_str(&cell).unwrap_or_default())
    }
}
