use tracing::debug;

use crate::patterns::CategoryTable;

/// Per-run category counts for one error log. Not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorTally {
    /// (category, count) for every category seen, ranked by count.
    /// Equal counts keep the category table's order.
    pub ranked: Vec<(String, u64)>,
    pub lines: usize,
}

impl ErrorTally {
    pub fn top(&self) -> Option<(&str, u64)> {
        self.ranked.first().map(|(c, n)| (c.as_str(), *n))
    }

    pub fn count(&self, category: &str) -> u64 {
        self.ranked
            .iter()
            .find(|(c, _)| c == category)
            .map_or(0, |(_, n)| *n)
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Count how often each known error category shows up in `lines`.
pub fn categorize<'l, I>(table: &CategoryTable, lines: I) -> ErrorTally
where
    I: IntoIterator<Item = &'l str>,
{
    let labels = table.labels();
    let mut counts = vec![0u64; labels.len()];
    let mut line_count = 0;

    for line in lines {
        line_count += 1;
        for label in table.matches(line) {
            if let Some(idx) = labels.iter().position(|l| *l == label) {
                counts[idx] += 1;
            }
        }
    }

    let mut ranked: Vec<(String, u64)> = labels
        .iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .map(|(l, n)| (l.to_string(), n))
        .collect();
    // stable sort keeps table order among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    debug!(
        "Error log: {} lines, {} categories hit",
        line_count,
        ranked.len()
    );
    ErrorTally {
        ranked,
        lines: line_count,
    }
}
