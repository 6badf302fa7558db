use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "editorial-segmenter";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// OpenRouter defaults.
pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-haiku";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Segmentation defaults.
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 50;
pub const DEFAULT_MAX_ARTICLE_CHARS: usize = 300_000;
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Environment variable that overrides the diagnostic dump directory.
pub const DUMP_DIR_ENV: &str = "EDITORIAL_DUMP_DIR";

/// Debug builds count as development.
pub fn is_dev() -> bool {
    cfg!(debug_assertions)
}

/// Filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if is_dev() {
        "info,editorial_segmenter=debug"
    } else {
        "info"
    }
}

/// Per-user cache directory for this tool (`~/.cache/codeforces-editorial` on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("codeforces-editorial"))
}

// ═══════════════════════════════════════════════════════════
// LLM provider settings
// ═══════════════════════════════════════════════════════════

/// Connection settings for the chat-completions provider.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    /// When false, no provider is built and segmentation fails fast.
    pub enabled: bool,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            enabled: true,
        }
    }
}

impl LlmSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup (environment, test map).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            api_key: lookup("OPENROUTER_API_KEY").filter(|k| !k.trim().is_empty()),
            model: lookup("OPENROUTER_MODEL").unwrap_or(defaults.model),
            base_url: lookup("OPENROUTER_BASE_URL").unwrap_or(defaults.base_url),
            timeout_secs: lookup("OPENROUTER_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.timeout_secs),
            enabled: lookup("LLM_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.enabled),
        }
    }

    /// A provider can only be built when enabled and an API key is present.
    pub fn is_usable(&self) -> bool {
        self.enabled && self.api_key.is_some()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ═══════════════════════════════════════════════════════════
// Segmentation settings
// ═══════════════════════════════════════════════════════════

/// Tunables for one `EditorialSegmenter`. Passed at construction.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Trimmed article text shorter than this is rejected.
    pub min_content_chars: usize,
    /// Article text beyond this many characters is cut before prompting.
    pub max_article_chars: usize,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Where unrecoverable responses are written. `None` disables the dump.
    pub dump_dir: Option<PathBuf>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_content_chars: DEFAULT_MIN_CONTENT_CHARS,
            max_article_chars: DEFAULT_MAX_ARTICLE_CHARS,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.0,
            dump_dir: None,
        }
    }
}

impl SegmenterConfig {
    /// Defaults plus the dump directory resolved from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Dump directory priority:
    /// 1. `EDITORIAL_DUMP_DIR` (any build)
    /// 2. the user cache directory in dev builds
    /// 3. disabled
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let dump_dir = match lookup(DUMP_DIR_ENV) {
            Some(dir) if !dir.trim().is_empty() => Some(PathBuf::from(dir)),
            _ if is_dev() => cache_dir(),
            _ => None,
        };

        Self {
            dump_dir,
            ..Self::default()
        }
    }

    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = Some(dir.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn llm_defaults_match_openrouter() {
        let settings = LlmSettings::from_lookup(lookup_from(&[]));
        assert_eq!(settings.model, "anthropic/claude-3.5-haiku");
        assert_eq!(settings.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(settings.timeout_secs, 30);
        assert!(settings.enabled);
        assert!(settings.api_key.is_none());
        assert!(!settings.is_usable());
    }

    #[test]
    fn llm_settings_read_overrides() {
        let settings = LlmSettings::from_lookup(lookup_from(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("OPENROUTER_MODEL", "openai/gpt-4o-mini"),
            ("OPENROUTER_TIMEOUT_SECS", "90"),
        ]));
        assert_eq!(settings.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.model, "openai/gpt-4o-mini");
        assert_eq!(settings.timeout_secs, 90);
        assert!(settings.is_usable());
    }

    #[test]
    fn blank_api_key_is_treated_as_missing() {
        let settings = LlmSettings::from_lookup(lookup_from(&[("OPENROUTER_API_KEY", "  ")]));
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn disabled_flag_makes_settings_unusable() {
        let settings = LlmSettings::from_lookup(lookup_from(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("LLM_ENABLED", "false"),
        ]));
        assert!(!settings.enabled);
        assert!(!settings.is_usable());
    }

    #[test]
    fn invalid_timeout_falls_back_to_default() {
        let settings =
            LlmSettings::from_lookup(lookup_from(&[("OPENROUTER_TIMEOUT_SECS", "soon")]));
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn segmenter_defaults() {
        let config = SegmenterConfig::default();
        assert_eq!(config.min_content_chars, 50);
        assert_eq!(config.max_article_chars, 300_000);
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.temperature, 0.0);
        assert!(config.dump_dir.is_none());
    }

    #[test]
    fn dump_dir_env_overrides_default() {
        let config = SegmenterConfig::from_lookup(lookup_from(&[(DUMP_DIR_ENV, "/tmp/dumps")]));
        assert_eq!(config.dump_dir, Some(PathBuf::from("/tmp/dumps")));
    }

    #[test]
    fn dev_build_defaults_dump_dir_to_cache() {
        // Test builds are dev builds.
        let config = SegmenterConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.dump_dir, cache_dir());
    }

    #[test]
    fn app_name_is_stable() {
        assert_eq!(APP_NAME, "editorial-segmenter");
    }
}
