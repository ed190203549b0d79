//! Application configuration loading and validation.
//!
//! Reads `deskmate.yaml` and resolves environment variables. Config is the
//! single source of truth for the model endpoint, SMTP credentials, and
//! search roots.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::inference::errors::InferenceError;

// ─── Public Types ────────────────────────────────────────────────────────────

/// The chat model endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible endpoint, e.g.
    /// `https://api.groq.com/openai/v1` or `http://localhost:11434/v1`.
    pub base_url: String,
    /// Bearer token. Absent for unauthenticated local endpoints.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model identifier sent in the request body.
    pub model_name: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}

/// SMTP transport configuration for the email workflow.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Display name used in the From header and the draft signature.
    pub sender_name: String,
    pub sender_email: String,
    /// App password — use `${DESKMATE_SMTP_PASSWORD}` in the config file
    /// rather than a literal value.
    pub sender_password: String,
}

fn default_smtp_port() -> u16 {
    587
}

/// Filesystem search configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Directories the search tool walks. Defaults to the home directory.
    #[serde(default = "default_search_roots")]
    pub roots: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            roots: default_search_roots(),
        }
    }
}

fn default_search_roots() -> Vec<String> {
    vec!["~".to_string()]
}

/// Top-level application configuration (mirrors `deskmate.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl SearchConfig {
    /// Resolve the configured roots to absolute paths with `~` expanded.
    pub fn resolved_roots(&self) -> Vec<PathBuf> {
        self.roots
            .iter()
            .map(|r| PathBuf::from(expand_tilde(r)))
            .collect()
    }
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// Resolve the config path.
///
/// Checks the `DESKMATE_CONFIG` env var first, then searches upward from
/// `start` for `deskmate.yaml`, then falls back to the platform config
/// directory (`<config_dir>/deskmate/deskmate.yaml`).
pub fn find_config_path(start: &Path) -> Result<PathBuf, InferenceError> {
    // 1. Check env var
    if let Ok(explicit) = std::env::var("DESKMATE_CONFIG") {
        let candidate = PathBuf::from(expand_tilde(&explicit));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    // 2. Walk upward from `start`
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join("deskmate.yaml");
        if candidate.exists() {
            return Ok(candidate);
        }
        if !dir.pop() {
            break;
        }
    }

    // 3. Platform config directory
    if let Some(config_dir) = dirs::config_dir() {
        let candidate = config_dir.join("deskmate").join("deskmate.yaml");
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(InferenceError::ConfigError {
        reason: "could not find deskmate.yaml (set DESKMATE_CONFIG or place it \
                 in the working directory)"
            .into(),
    })
}

/// Load and parse the application configuration file.
///
/// Performs environment-variable interpolation on string values matching
/// `${VAR_NAME}` or `${VAR_NAME:-default}`.
pub fn load_config(path: &Path) -> Result<AppConfig, InferenceError> {
    let raw = std::fs::read_to_string(path).map_err(|e| InferenceError::ConfigError {
        reason: format!("failed to read {}: {e}", path.display()),
    })?;

    let interpolated = interpolate_env_vars(&raw);

    let config: AppConfig =
        serde_yaml::from_str(&interpolated).map_err(|e| InferenceError::ConfigError {
            reason: format!("failed to parse config: {e}"),
        })?;

    Ok(config)
}

// ─── Env-var interpolation ───────────────────────────────────────────────────

/// Replace `${VAR}` and `${VAR:-default}` in a string.
fn interpolate_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_expr = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_expr.push(c);
            }
            let resolved = resolve_var_expr(&var_expr);
            result.push_str(&resolved);
        } else {
            result.push(ch);
        }
    }

    result
}

/// Resolve a variable expression like `VAR` or `VAR:-default`.
fn resolve_var_expr(expr: &str) -> String {
    if let Some(idx) = expr.find(":-") {
        let var_name = &expr[..idx];
        let default = &expr[idx + 2..];
        std::env::var(var_name).unwrap_or_else(|_| expand_tilde(default))
    } else {
        std::env::var(expr).unwrap_or_default()
    }
}

/// Expand a leading `~` to the user's home directory.
///
/// Uses `dirs::home_dir()` for cross-platform support (works on macOS,
/// Linux, and Windows where `$HOME` may not be set).
pub(crate) fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{rest}", home.display());
        }
    }
    path.to_string()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_env_vars_with_default() {
        // When env var is NOT set, use default
        std::env::remove_var("__TEST_NONEXISTENT_VAR__");
        let input = "${__TEST_NONEXISTENT_VAR__:-/fallback/path}";
        let result = interpolate_env_vars(input);
        assert_eq!(result, "/fallback/path");
    }

    #[test]
    fn test_interpolate_env_vars_with_value() {
        std::env::set_var("__TEST_DESKMATE_VAR__", "/custom/path");
        let input = "${__TEST_DESKMATE_VAR__:-/fallback/path}";
        let result = interpolate_env_vars(input);
        assert_eq!(result, "/custom/path");
        std::env::remove_var("__TEST_DESKMATE_VAR__");
    }

    #[test]
    fn test_interpolate_no_vars() {
        let input = "plain text with no variables";
        assert_eq!(interpolate_env_vars(input), input);
    }

    #[test]
    fn test_expand_tilde() {
        let result = expand_tilde("~/Documents");
        assert!(!result.starts_with('~'), "tilde should be expanded");
        assert!(result.ends_with("/Documents"));
    }

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
            model:
              base_url: "http://localhost:11434/v1"
              model_name: "llama-3.3-70b-versatile"
            smtp:
              server: "smtp.example.com"
              sender_name: "Dana"
              sender_email: "dana@example.com"
              sender_password: "app-password"
        "#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.model.model_name, "llama-3.3-70b-versatile");
        assert!(config.model.api_key.is_none());
        assert!((config.model.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.model.max_tokens, 1024);
        assert_eq!(config.smtp.port, 587, "SMTP port should default to 587");
        assert_eq!(config.search.roots, vec!["~".to_string()]);
    }

    #[test]
    fn test_search_roots_resolved() {
        let search = SearchConfig {
            roots: vec!["~/Documents".into(), "/tmp".into()],
        };
        let resolved = search.resolved_roots();
        assert_eq!(resolved.len(), 2);
        assert!(!resolved[0].to_string_lossy().starts_with('~'));
        assert_eq!(resolved[1], PathBuf::from("/tmp"));
    }
}
