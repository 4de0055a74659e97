use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// File name looked up inside the skill directory when no `--config` is given.
pub const SKILL_DIR_CONFIG: &str = "learner.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerConfig {
    /// Module names counted in feedback logs (matched whole-word, case-insensitive)
    #[serde(default = "default_module_names")]
    pub module_names: Vec<String>,

    /// Literal prefix of API identifiers, e.g. `CVI` for `CVI_VPSS_SetChnAttr`
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Words marking a feedback line as a reported problem
    #[serde(default = "default_failure_words")]
    pub failure_words: Vec<String>,

    #[serde(default = "default_counters_file")]
    pub counters_file: String,

    #[serde(default = "default_suggestions_file")]
    pub suggestions_file: String,

    /// Directory (relative to the skill dir) holding `<module>.md` reference docs
    #[serde(default = "default_references_dir")]
    pub references_dir: String,

    /// Keep only the newest N feedback records when saving (default: unbounded)
    #[serde(default)]
    pub feedback_limit: Option<usize>,

    /// Suggest creating reference docs that don't exist yet.
    /// Off by default: only existing-but-incomplete references are flagged.
    #[serde(default)]
    pub flag_missing_references: bool,

    /// Ordered substring -> category table for error logs.
    /// Earlier entries win ties when ranking categories.
    #[serde(default = "default_error_categories")]
    pub error_categories: Vec<ErrorCategory>,

    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCategory {
    pub pattern: String,
    pub label: String,
}

impl ErrorCategory {
    pub fn new(pattern: &str, label: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Query patterns shown in the feedback summary (default: 10)
    #[serde(default = "default_top_queries")]
    pub top_queries: usize,

    /// Error patterns shown in the feedback summary (default: 5)
    #[serde(default = "default_top_errors")]
    pub top_errors: usize,

    /// Query patterns checked against reference docs (default: 5)
    #[serde(default = "default_top_api_suggestions")]
    pub top_api_suggestions: usize,

    /// Characters of a failing line kept as its error-pattern key (default: 100)
    #[serde(default = "default_context_chars")]
    pub context_chars: usize,

    /// Characters of an error pattern quoted in a suggestion (default: 80)
    #[serde(default = "default_suggestion_context_chars")]
    pub suggestion_context_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            top_queries: default_top_queries(),
            top_errors: default_top_errors(),
            top_api_suggestions: default_top_api_suggestions(),
            context_chars: default_context_chars(),
            suggestion_context_chars: default_suggestion_context_chars(),
        }
    }
}

fn default_module_names() -> Vec<String> {
    ["VI", "VPSS", "VENC", "VO", "VB", "RGN", "GDC", "SYS"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_api_prefix() -> String {
    "CVI".to_string()
}

fn default_failure_words() -> Vec<String> {
    ["error", "failed", "issue", "problem", "not working"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_error_categories() -> Vec<ErrorCategory> {
    vec![
        ErrorCategory::new("VB_GetBlock failed", "VB pool exhaustion"),
        ErrorCategory::new("Out of memory", "Memory allocation failure"),
        ErrorCategory::new("Lost frames", "Frame drops / Buffer shortage"),
        ErrorCategory::new("failed to bind", "Module binding error"),
        ErrorCategory::new("Invalid parameter", "API parameter error"),
        ErrorCategory::new("Device not enabled", "Module initialization error"),
    ]
}

fn default_counters_file() -> String {
    ".learning_data.json".to_string()
}

fn default_suggestions_file() -> String {
    ".suggestions.md".to_string()
}

fn default_references_dir() -> String {
    "references".to_string()
}

fn default_top_queries() -> usize {
    10
}

fn default_top_errors() -> usize {
    5
}

fn default_top_api_suggestions() -> usize {
    5
}

fn default_context_chars() -> usize {
    100
}

fn default_suggestion_context_chars() -> usize {
    80
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            module_names: default_module_names(),
            api_prefix: default_api_prefix(),
            failure_words: default_failure_words(),
            error_categories: default_error_categories(),
            counters_file: default_counters_file(),
            suggestions_file: default_suggestions_file(),
            references_dir: default_references_dir(),
            limits: LimitsConfig::default(),
            feedback_limit: None,
            flag_missing_references: false,
        }
    }
}

impl LearnerConfig {
    /// Load configuration from an explicit path, or search the default locations:
    /// `<skill_dir>/learner.toml`, then `~/.config/skill-learner/config.toml`.
    pub fn load_with_path(path: Option<&Path>, skill_dir: &Path) -> Result<Self> {
        if let Some(config_path) = path {
            debug!("Loading config from explicit path: {}", config_path.display());
            return Self::load_from_path(config_path)
                .with_context(|| format!("Failed to load config: {}", config_path.display()));
        }

        let local = skill_dir.join(SKILL_DIR_CONFIG);
        if local.exists() {
            match Self::load_from_path(&local) {
                Ok(config) => {
                    debug!("Loaded config from {:?}", local);
                    return Ok(config);
                }
                Err(e) => warn!("Ignoring unreadable {:?}: {:#}", local, e),
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("skill-learner").join("config.toml");
            if let Ok(config) = Self::load_from_path(&config_path) {
                debug!("Loaded config from {:?}", config_path);
                return Ok(config);
            }
        }

        debug!("Using default config");
        Ok(Self::default())
    }

    fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: LearnerConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
