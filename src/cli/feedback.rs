use anyhow::Result;
use std::path::Path;
use tracing::info;

use super::read_log;
use crate::config::LearnerConfig;
use crate::feedback::FeedbackAnalyzer;
use crate::patterns::LinePatterns;
use crate::store::CounterStore;
use crate::util::rank_by_count;

/// Analyze a usage/feedback log, print the running tallies and save the counters.
pub fn run(path: &Path, store: &mut CounterStore, config: &LearnerConfig) -> Result<()> {
    println!("\n=== Analyzing feedback from {} ===\n", path.display());

    let Some(text) = read_log(path, "Feedback")? else {
        return Ok(());
    };

    let patterns = LinePatterns::from_config(config)?;
    let analyzer = FeedbackAnalyzer::new(&patterns, config.limits.context_chars);
    let summary = analyzer.analyze(&mut store.data, text.lines());
    info!("Analyzed {} feedback lines from {}", summary.lines, path.display());

    println!("Module Usage Frequency:");
    for (module, count) in rank_by_count(&store.data.module_usage) {
        println!("  {}: {} mentions", module, count);
    }

    println!("\nMost Queried APIs:");
    for (api, count) in rank_by_count(&store.data.query_patterns)
        .into_iter()
        .take(config.limits.top_queries)
    {
        println!("  {}: {} times", api, count);
    }

    println!("\nCommon Error Patterns:");
    for (error, count) in rank_by_count(&store.data.error_patterns)
        .into_iter()
        .take(config.limits.top_errors)
    {
        println!("  [{}x] {}", count, error);
    }

    store.save()?;
    println!("Learning data saved to: {}", store.path().display());
    Ok(())
}
