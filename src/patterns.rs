//! Line matchers built from the configured tables.
//!
//! All tables come from [`LearnerConfig`] so callers (and tests) can swap in
//! their own module names, API prefix, failure words and error categories.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashMap;

use crate::config::{ErrorCategory, LearnerConfig};

/// Compiled matchers for a single feedback line.
#[derive(Debug, Clone)]
pub struct LinePatterns {
    modules: Option<Regex>,
    /// Spaced, upper-cased module name -> configured name, upper-cased
    module_names: HashMap<String, String>,
    api: Regex,
    api_prefix: String,
    failure: Option<Regex>,
}

impl LinePatterns {
    pub fn from_config(config: &LearnerConfig) -> Result<Self> {
        // Lines are matched with '_' turned into spaces, so names are too
        let spaced_names: Vec<String> = config
            .module_names
            .iter()
            .map(|name| name.replace('_', " "))
            .collect();
        let modules =
            alternation(&spaced_names, true).context("Invalid module_names table")?;
        let module_names = spaced_names
            .iter()
            .zip(&config.module_names)
            .map(|(spaced, name)| (spaced.to_uppercase(), name.to_uppercase()))
            .collect();
        let failure =
            alternation(&config.failure_words, false).context("Invalid failure_words table")?;
        let api = Regex::new(&format!(r"{}_(\w+)_(\w+)", regex::escape(&config.api_prefix)))
            .context("Invalid api_prefix")?;

        Ok(Self {
            modules,
            module_names,
            api,
            api_prefix: config.api_prefix.clone(),
            failure,
        })
    }

    /// Module names mentioned in `line`, upper-cased, in order of appearance.
    ///
    /// Underscores count as separators here, so `CVI_VPSS_SetChnAttr`
    /// mentions `VPSS`.
    pub fn modules(&self, line: &str) -> Vec<String> {
        let Some(re) = &self.modules else {
            return Vec::new();
        };
        let spaced = line.replace('_', " ");
        re.find_iter(&spaced)
            .map(|m| {
                let found = m.as_str().to_uppercase();
                self.module_names.get(&found).cloned().unwrap_or(found)
            })
            .collect()
    }

    /// API identifiers (`PREFIX_<word>_<word>`) found in `line`.
    pub fn api_calls(&self, line: &str) -> Vec<String> {
        self.api
            .captures_iter(line)
            .map(|caps| format!("{}_{}_{}", self.api_prefix, &caps[1], &caps[2]))
            .collect()
    }

    /// Whether `line` reads like a problem report.
    pub fn is_failure(&self, line: &str) -> bool {
        self.failure.as_ref().is_some_and(|re| re.is_match(line))
    }
}

/// Case-insensitive alternation over literal words; `None` for an empty table.
fn alternation(words: &[String], word_bounded: bool) -> Result<Option<Regex>> {
    let escaped: Vec<String> = words
        .iter()
        .filter(|w| !w.is_empty())
        .map(|w| regex::escape(w))
        .collect();
    if escaped.is_empty() {
        return Ok(None);
    }
    let body = escaped.join("|");
    let pattern = if word_bounded {
        format!(r"(?i)\b(?:{})\b", body)
    } else {
        format!(r"(?i)(?:{})", body)
    };
    Ok(Some(Regex::new(&pattern)?))
}

/// Module segment of an API identifier, lower-cased: the first `_`-separated
/// part after `<prefix>_`. Names the reference doc to check.
///
/// `CVI_VPSS_SetChnAttr` -> `vpss`, and with prefix `HI_MPI`,
/// `HI_MPI_VPSS_SetChnAttr` -> `vpss`. Identifiers recorded under another
/// prefix fall back to their second segment.
pub fn api_module_key(api: &str, prefix: &str) -> Option<String> {
    let segment = match api
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
    {
        Some(rest) => rest.split('_').next(),
        None => api.split('_').nth(1),
    };
    segment.filter(|s| !s.is_empty()).map(|s| s.to_lowercase())
}

/// Ordered substring -> category table, matched case-insensitively.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    entries: Vec<(String, String)>,
}

impl CategoryTable {
    pub fn new(categories: &[ErrorCategory]) -> Self {
        let entries = categories
            .iter()
            .filter(|c| !c.pattern.is_empty())
            .map(|c| (c.pattern.to_lowercase(), c.label.clone()))
            .collect();
        Self { entries }
    }

    /// Labels in table order, each listed once.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for (_, label) in &self.entries {
            if !labels.contains(&label.as_str()) {
                labels.push(label);
            }
        }
        labels
    }

    /// Every category whose substring occurs in `line`.
    /// A label mapped from several substrings is reported once per matching substring.
    pub fn matches<'a>(&'a self, line: &str) -> impl Iterator<Item = &'a str> + 'a {
        let lower = line.to_lowercase();
        self.entries
            .iter()
            .filter(move |(pattern, _)| lower.contains(pattern.as_str()))
            .map(|(_, label)| label.as_str())
    }
}
