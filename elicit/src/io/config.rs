//! Engine configuration stored in `elicit.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// What an elicitation session does when a provided value has no candidates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmptyOptionsPolicy {
    /// Stop the session with an error.
    #[default]
    Fail,
    /// Clear the nearest specified upstream field and ask for it again.
    Backtrack,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpecifierStrategy {
    /// Match the option id or displayed value exactly.
    #[default]
    Exact,
    /// Exact first, then the best fuzzy match above `min_score`.
    Fuzzy,
}

/// Engine configuration (TOML).
///
/// Meant to be edited by humans. Missing fields fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ElicitConfig {
    /// Upper bound on steps per elicitation session.
    pub max_steps: u32,

    pub empty_options: EmptyOptionsPolicy,

    /// How many times one session may backtrack before failing.
    pub max_backtracks: u32,

    pub specifier: SpecifierConfig,

    pub prompt: PromptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SpecifierConfig {
    pub strategy: SpecifierStrategy,

    /// Fuzzy matches scoring below this are ignored.
    pub min_score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PromptConfig {
    /// Options listed in an ask prompt before the rest is summarized.
    pub max_listed_options: usize,
}

impl Default for ElicitConfig {
    fn default() -> Self {
        Self {
            max_steps: 256,
            empty_options: EmptyOptionsPolicy::default(),
            max_backtracks: 3,
            specifier: SpecifierConfig::default(),
            prompt: PromptConfig::default(),
        }
    }
}

impl Default for SpecifierConfig {
    fn default() -> Self {
        Self {
            strategy: SpecifierStrategy::default(),
            min_score: 0,
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_listed_options: 20,
        }
    }
}

impl ElicitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(anyhow!("max_steps must be > 0"));
        }
        if self.prompt.max_listed_options == 0 {
            return Err(anyhow!("prompt.max_listed_options must be > 0"));
        }
        if self.specifier.min_score < 0 {
            return Err(anyhow!("specifier.min_score must be >= 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ElicitConfig::default()`.
pub fn load_config(path: &Path) -> Result<ElicitConfig> {
    if !path.exists() {
        let cfg = ElicitConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ElicitConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &ElicitConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
