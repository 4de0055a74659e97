use anyhow::Result;
use std::path::Path;
use tracing::info;

use super::read_log;
use crate::config::LearnerConfig;
use crate::error_log::{categorize, ErrorTally};
use crate::patterns::CategoryTable;
use crate::store::CounterStore;

/// Categorize an error log and point at the debug section worth expanding.
///
/// The category counts only live for this run; the counters file is still
/// saved so `last_update` reflects the run.
pub fn run(path: &Path, store: &mut CounterStore, config: &LearnerConfig) -> Result<()> {
    println!("\n=== Analyzing errors from {} ===\n", path.display());

    let Some(text) = read_log(path, "Error log")? else {
        return Ok(());
    };

    let table = CategoryTable::new(&config.error_categories);
    let tally = categorize(&table, text.lines());
    info!(
        "Categorized {} error log lines from {}",
        tally.lines,
        path.display()
    );

    print!("{}", render_tally(&tally));

    store.save()?;
    println!("Learning data saved to: {}", store.path().display());
    Ok(())
}

/// Category frequency table plus a pointer at the top category's debug section.
pub fn render_tally(tally: &ErrorTally) -> String {
    let mut out = String::from("Error Category Frequency:\n");
    for (category, count) in &tally.ranked {
        out.push_str(&format!("  {}: {} occurrences\n", category, count));
    }
    if let Some((category, _)) = tally.top() {
        out.push_str(&format!(
            "\n💡 Suggestion: Expand debug.md section on '{}'\n",
            category
        ));
    }
    out
}
