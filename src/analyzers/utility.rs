use std::collections::BTreeMap;

/// A value that can absorb another value of the same group.
pub trait Combine {
    fn combine(&mut self, other: Self);
}

/// Per-group totals shared by every reduction in the pipeline.
///
/// Positions take the group minimum; counts are summed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LessonTotals {
    pub chapter_num: u32,
    pub section_num: u32,
    pub item_num: u32,
    pub total_responses: u64,
    pub yes_count: u64,
    pub no_count: u64,
}

impl Combine for LessonTotals {
    fn combine(&mut self, other: Self) {
        self.chapter_num = self.chapter_num.min(other.chapter_num);
        self.section_num = self.section_num.min(other.section_num);
        self.item_num = self.item_num.min(other.item_num);
        self.total_responses += other.total_responses;
        self.yes_count += other.yes_count;
        self.no_count += other.no_count;
    }
}

/// Groups `(key, value)` pairs by key, combining values within a group.
///
/// Output is ascending by key, independent of hashing.
pub fn collapse<K, V, I>(items: I) -> Vec<(K, V)>
where
    K: Ord,
    V: Combine,
    I: IntoIterator<Item = (K, V)>,
{
    let mut groups: BTreeMap<K, V> = BTreeMap::new();

    for (key, value) in items {
        match groups.get_mut(&key) {
            Some(existing) => existing.combine(value),
            None => {
                groups.insert(key, value);
            }
        }
    }

    groups.into_iter().collect()
}

/// `100 * part / (part + rest)`, or 0.0 when both are zero.
pub fn pct_of(part: u64, rest: u64) -> f64 {
    let total = part + rest;
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}
