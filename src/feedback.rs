use tracing::debug;

use crate::patterns::LinePatterns;
use crate::store::{CounterData, FeedbackRecord};
use crate::util::truncate_chars;

/// What a single feedback pass added to the counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackSummary {
    pub lines: usize,
    pub module_hits: usize,
    pub api_hits: usize,
    pub failure_lines: usize,
}

/// Feeds usage/feedback log lines into the long-term counters.
pub struct FeedbackAnalyzer<'a> {
    patterns: &'a LinePatterns,
    context_chars: usize,
}

impl<'a> FeedbackAnalyzer<'a> {
    pub fn new(patterns: &'a LinePatterns, context_chars: usize) -> Self {
        Self {
            patterns,
            context_chars,
        }
    }

    /// Count module mentions, API identifiers and failure lines, and record
    /// every line as raw feedback whether or not anything matched.
    pub fn analyze<'l, I>(&self, data: &mut CounterData, lines: I) -> FeedbackSummary
    where
        I: IntoIterator<Item = &'l str>,
    {
        let mut summary = FeedbackSummary::default();

        for line in lines {
            summary.lines += 1;

            for module in self.patterns.modules(line) {
                *data.module_usage.entry(module).or_default() += 1;
                summary.module_hits += 1;
            }

            for api in self.patterns.api_calls(line) {
                *data.query_patterns.entry(api).or_default() += 1;
                summary.api_hits += 1;
            }

            let trimmed = line.trim();
            if self.patterns.is_failure(line) {
                let context = truncate_chars(trimmed, self.context_chars);
                *data.error_patterns.entry(context.to_string()).or_default() += 1;
                summary.failure_lines += 1;
            }

            data.feedback.push(FeedbackRecord::now(trimmed));
        }

        debug!(
            "Feedback pass: {} lines, {} module mentions, {} API calls, {} failures",
            summary.lines, summary.module_hits, summary.api_hits, summary.failure_lines
        );
        summary
    }
}
