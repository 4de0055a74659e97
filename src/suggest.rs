//! Documentation suggestions derived from the accumulated counters.

use anyhow::{Context, Result};
use chrono::Local;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::patterns::api_module_key;
use crate::store::CounterData;
use crate::util::{rank_by_count, top_entry, truncate_chars};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// Most-mentioned module deserves a deeper write-up
    ExpandModule { module: String, count: u64 },
    /// Frequently queried API missing from an existing reference doc
    DocumentApi { api: String, count: u64 },
    /// Frequently queried API whose reference doc doesn't exist at all
    CreateReference {
        api: String,
        count: u64,
        reference: String,
    },
    /// Most-reported error context needs a troubleshooting entry
    Troubleshoot { context: String, count: u64 },
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::ExpandModule { module, count } => write!(
                f,
                "**Expand {} documentation**: This module is most frequently queried ({} times)",
                module, count
            ),
            Suggestion::DocumentApi { api, count } => write!(
                f,
                "**Add {} documentation**: Queried {} times but not well documented",
                api, count
            ),
            Suggestion::CreateReference {
                api,
                count,
                reference,
            } => write!(
                f,
                "**Create {}**: {} queried {} times but no reference document exists",
                reference, api, count
            ),
            Suggestion::Troubleshoot { context, count } => write!(
                f,
                "**Add troubleshooting for**: '{}...' (reported {} times)",
                context, count
            ),
        }
    }
}

/// How suggestions are derived; mirrors the relevant config knobs.
#[derive(Debug, Clone)]
pub struct SuggestOptions {
    pub references_dir: PathBuf,
    pub api_prefix: String,
    pub top_api_suggestions: usize,
    pub suggestion_context_chars: usize,
    pub flag_missing_references: bool,
}

/// Build suggestions in report order: module, then APIs, then errors.
pub fn generate(data: &CounterData, opts: &SuggestOptions) -> Result<Vec<Suggestion>> {
    let mut suggestions = Vec::new();

    if let Some((module, count)) = top_entry(&data.module_usage) {
        suggestions.push(Suggestion::ExpandModule {
            module: module.to_string(),
            count,
        });
    }

    for (api, count) in rank_by_count(&data.query_patterns)
        .into_iter()
        .take(opts.top_api_suggestions)
    {
        let Some(key) = api_module_key(api, &opts.api_prefix) else {
            continue;
        };
        let file_name = format!("{}.md", key);
        let reference = opts.references_dir.join(&file_name);

        if !reference.is_file() {
            debug!("No reference doc for {} at {}", api, reference.display());
            if opts.flag_missing_references {
                suggestions.push(Suggestion::CreateReference {
                    api: api.to_string(),
                    count,
                    reference: reference_label(&opts.references_dir, &file_name),
                });
            }
            continue;
        }

        let content = fs::read_to_string(&reference)
            .with_context(|| format!("Failed to read reference: {}", reference.display()))?;
        if !content.contains(api) {
            suggestions.push(Suggestion::DocumentApi {
                api: api.to_string(),
                count,
            });
        }
    }

    if let Some((context, count)) = top_entry(&data.error_patterns) {
        suggestions.push(Suggestion::Troubleshoot {
            context: truncate_chars(context, opts.suggestion_context_chars).to_string(),
            count,
        });
    }

    Ok(suggestions)
}

/// `references/vpss.md`-style label for a reference doc.
fn reference_label(references_dir: &Path, file_name: &str) -> String {
    match references_dir.file_name() {
        Some(dir) => format!("{}/{}", dir.to_string_lossy(), file_name),
        None => file_name.to_string(),
    }
}

/// Markdown body of the suggestions file.
pub fn render_markdown(suggestions: &[Suggestion], generated_at: &str) -> String {
    let mut out = String::from("# Skill Improvement Suggestions\n\n");
    out.push_str(&format!("Generated: {}\n\n", generated_at));
    out.push_str("Based on usage analysis, consider these improvements:\n\n");
    for suggestion in suggestions {
        out.push_str(&format!("- {}\n", suggestion));
    }
    out
}

/// Overwrite `path` with the rendered suggestions.
pub fn write_report(path: &Path, suggestions: &[Suggestion]) -> Result<()> {
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    fs::write(path, render_markdown(suggestions, &generated_at))
        .with_context(|| format!("Failed to write suggestions: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(dir: &Path) -> SuggestOptions {
        SuggestOptions {
            references_dir: dir.join("references"),
            api_prefix: "CVI".to_string(),
            top_api_suggestions: 5,
            suggestion_context_chars: 80,
            flag_missing_references: false,
        }
    }

    #[test]
    fn test_empty_data_no_suggestions() {
        let dir = tempfile::TempDir::new().unwrap();
        let suggestions = generate(&CounterData::default(), &options(dir.path())).unwrap();
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_top_module_tie_breaks_by_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut data = CounterData::default();
        data.module_usage.insert("VPSS".to_string(), 4);
        data.module_usage.insert("VENC".to_string(), 4);
        data.module_usage.insert("VI".to_string(), 1);

        let suggestions = generate(&data, &options(dir.path())).unwrap();
        assert_eq!(
            suggestions,
            vec![Suggestion::ExpandModule {
                module: "VENC".to_string(),
                count: 4
            }]
        );
    }

    #[test]
    fn test_api_missing_from_existing_reference() {
        let dir = tempfile::TempDir::new().unwrap();
        let refs = dir.path().join("references");
        fs::create_dir_all(&refs).unwrap();
        fs::write(refs.join("vpss.md"), "## CVI_VPSS_CreateGrp\n").unwrap();

        let mut data = CounterData::default();
        data.query_patterns
            .insert("CVI_VPSS_SetChnAttr".to_string(), 3);
        data.query_patterns
            .insert("CVI_VPSS_CreateGrp".to_string(), 2);

        let suggestions = generate(&data, &options(dir.path())).unwrap();
        assert_eq!(
            suggestions,
            vec![Suggestion::DocumentApi {
                api: "CVI_VPSS_SetChnAttr".to_string(),
                count: 3
            }]
        );
    }

    #[test]
    fn test_missing_reference_skipped_by_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut data = CounterData::default();
        data.query_patterns.insert("CVI_GDC_Run".to_string(), 9);

        let suggestions = generate(&data, &options(dir.path())).unwrap();
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_missing_reference_flagged_when_enabled() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut data = CounterData::default();
        data.query_patterns.insert("CVI_GDC_Run".to_string(), 9);
        let mut opts = options(dir.path());
        opts.flag_missing_references = true;

        let suggestions = generate(&data, &opts).unwrap();
        assert_eq!(
            suggestions,
            vec![Suggestion::CreateReference {
                api: "CVI_GDC_Run".to_string(),
                count: 9,
                reference: "references/gdc.md".to_string(),
            }]
        );
        assert!(suggestions[0].to_string().starts_with("**Create references/gdc.md**"));
    }

    #[test]
    fn test_reference_lookup_uses_configured_prefix() {
        let dir = tempfile::TempDir::new().unwrap();
        let refs = dir.path().join("references");
        fs::create_dir_all(&refs).unwrap();
        fs::write(refs.join("vpss.md"), "## HI_MPI_VPSS_CreateGrp\n").unwrap();

        let mut data = CounterData::default();
        data.query_patterns
            .insert("HI_MPI_VPSS_SetChnAttr".to_string(), 4);
        let mut opts = options(dir.path());
        opts.api_prefix = "HI_MPI".to_string();
        opts.flag_missing_references = true;

        let suggestions = generate(&data, &opts).unwrap();
        assert_eq!(
            suggestions,
            vec![Suggestion::DocumentApi {
                api: "HI_MPI_VPSS_SetChnAttr".to_string(),
                count: 4
            }]
        );
    }

    #[test]
    fn test_only_top_apis_checked() {
        let dir = tempfile::TempDir::new().unwrap();
        let refs = dir.path().join("references");
        fs::create_dir_all(&refs).unwrap();
        fs::write(refs.join("vo.md"), "nothing documented").unwrap();

        let mut data = CounterData::default();
        for (i, name) in ["A", "B", "C", "D", "E", "F"].iter().enumerate() {
            data.query_patterns
                .insert(format!("CVI_VO_{}", name), 10 - i as u64);
        }
        let suggestions = generate(&data, &options(dir.path())).unwrap();
        assert_eq!(suggestions.len(), 5);
        assert!(!suggestions.contains(&Suggestion::DocumentApi {
            api: "CVI_VO_F".to_string(),
            count: 5
        }));
    }

    #[test]
    fn test_order_module_api_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let refs = dir.path().join("references");
        fs::create_dir_all(&refs).unwrap();
        fs::write(refs.join("vb.md"), "").unwrap();

        let mut data = CounterData::default();
        data.module_usage.insert("VB".to_string(), 2);
        data.query_patterns.insert("CVI_VB_Alloc".to_string(), 1);
        data.error_patterns
            .insert("VB alloc failed".to_string(), 1);

        let suggestions = generate(&data, &options(dir.path())).unwrap();
        assert!(matches!(suggestions[0], Suggestion::ExpandModule { .. }));
        assert!(matches!(suggestions[1], Suggestion::DocumentApi { .. }));
        assert!(matches!(suggestions[2], Suggestion::Troubleshoot { .. }));
    }

    #[test]
    fn test_troubleshoot_context_truncated() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut data = CounterData::default();
        data.error_patterns.insert("e".repeat(100), 2);

        let suggestions = generate(&data, &options(dir.path())).unwrap();
        assert_eq!(
            suggestions[0].to_string(),
            format!(
                "**Add troubleshooting for**: '{}...' (reported 2 times)",
                "e".repeat(80)
            )
        );
    }

    #[test]
    fn test_render_markdown() {
        let md = render_markdown(
            &[Suggestion::ExpandModule {
                module: "VI".to_string(),
                count: 7,
            }],
            "2025-01-02 03:04:05",
        );
        assert!(md.starts_with("# Skill Improvement Suggestions\n\n"));
        assert!(md.contains("Generated: 2025-01-02 03:04:05\n"));
        assert!(md.ends_with(
            "- **Expand VI documentation**: This module is most frequently queried (7 times)\n"
        ));
    }
}
