use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::config::LearnerConfig;
use crate::store::CounterStore;
use crate::suggest::{generate, write_report, SuggestOptions, Suggestion};

/// Generate improvement suggestions and write them to the suggestions file.
/// Returns whether a report was written.
pub fn run(skill_dir: &Path, store: &CounterStore, config: &LearnerConfig) -> Result<bool> {
    println!("\n=== Generating Improvement Suggestions ===\n");

    let opts = SuggestOptions {
        references_dir: skill_dir.join(&config.references_dir),
        api_prefix: config.api_prefix.clone(),
        top_api_suggestions: config.limits.top_api_suggestions,
        suggestion_context_chars: config.limits.suggestion_context_chars,
        flag_missing_references: config.flag_missing_references,
    };
    let suggestions = generate(&store.data, &opts)?;

    if suggestions.is_empty() {
        print!("{}", render_suggestions(&suggestions, None));
        return Ok(false);
    }

    let report = skill_dir.join(&config.suggestions_file);
    write_report(&report, &suggestions)?;
    info!("Wrote {} suggestions", suggestions.len());
    print!("{}", render_suggestions(&suggestions, Some(&report)));
    Ok(true)
}

/// Console summary of a suggestion run; `report` is where they were saved.
pub fn render_suggestions(suggestions: &[Suggestion], report: Option<&Path>) -> String {
    if suggestions.is_empty() {
        return "No suggestions generated. Need more usage data.\n".to_string();
    }
    let mut out = String::new();
    if let Some(report) = report {
        out.push_str(&format!("Suggestions saved to: {}\n\n", report.display()));
    }
    out.push_str("Suggestions:\n");
    for suggestion in suggestions {
        out.push_str(&format!("- {}\n", suggestion));
    }
    out
}
