//! Layered configuration
//!
//! Loads the embedded default (`config/tally.toml`), applies an override
//! file on top, then environment variables. Keys missing from the override
//! keep their default.
//!
//! Override location: `~/.local/share/tally/config.toml` (or an explicit
//! path from the CLI).
//!
//! Environment overrides:
//! - `TALLY_PARSE_BACKEND`, `TALLY_PARSE_HOST`, `TALLY_PARSE_MODEL`,
//!   `TALLY_PARSE_TIMEOUT_SECS`
//! - `GEMINI_API_KEY`
//! - `TALLY_HOME_CURRENCY`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::ai::BackendKind;
use crate::error::{Error, Result};
use crate::extract::DateOrder;
use crate::models::Currency;

/// Embedded default configuration
const DEFAULT_CONFIG: &str = include_str!("../../../config/tally.toml");

/// Full application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub parser: ParserConfig,
    pub locale: LocaleConfig,
    pub budgets: BudgetConfig,
}

/// `[parser]` section
#[derive(Debug, Clone, PartialEq)]
pub struct ParserConfig {
    pub backend: BackendKind,
    pub host: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Only read from the environment, never from files we ship
    pub api_key: Option<String>,
}

impl ParserConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[locale]` section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocaleConfig {
    pub home_currency: Currency,
    pub date_order: DateOrder,
}

/// `[budgets]` section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetConfig {
    pub default_threshold_pct: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig {
                backend: BackendKind::None,
                host: String::new(),
                model: "gemini-2.0-flash".to_string(),
                timeout_secs: 10,
                api_key: None,
            },
            locale: LocaleConfig {
                home_currency: Currency::Inr,
                date_order: DateOrder::DayFirst,
            },
            budgets: BudgetConfig {
                default_threshold_pct: 80,
            },
        }
    }
}

impl AppConfig {
    /// Load from the default override location plus environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load with an explicit override file
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load_from(override_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_toml(DEFAULT_CONFIG)?;

        let path = match override_path {
            Some(path) if !path.exists() => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )))
            }
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "Loading config override");
            let content = fs::read_to_string(&path)?;
            config.apply_toml(&content)?;
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document layered over the built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config = Self::default();
        config.apply_toml(content)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_toml(&mut self, content: &str) -> Result<()> {
        let raw: RawConfig = toml::from_str(content)?;

        if let Some(parser) = raw.parser {
            if let Some(backend) = parser.backend {
                self.parser.backend = backend.parse()?;
            }
            if let Some(host) = parser.host {
                self.parser.host = host;
            }
            if let Some(model) = parser.model {
                self.parser.model = model;
            }
            if let Some(timeout) = parser.timeout_secs {
                self.parser.timeout_secs = timeout;
            }
        }

        if let Some(locale) = raw.locale {
            if let Some(currency) = locale.home_currency {
                self.locale.home_currency = parse_currency(&currency)?;
            }
            if let Some(order) = locale.date_order {
                self.locale.date_order = order;
            }
        }

        if let Some(budgets) = raw.budgets {
            if let Some(threshold) = budgets.default_threshold_pct {
                self.budgets.default_threshold_pct = threshold;
            }
        }

        Ok(())
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("TALLY_PARSE_BACKEND") {
            self.parser.backend = backend.parse()?;
        }
        if let Some(host) = lookup("TALLY_PARSE_HOST") {
            self.parser.host = host;
        }
        if let Some(model) = lookup("TALLY_PARSE_MODEL") {
            self.parser.model = model;
        }
        if let Some(timeout) = lookup("TALLY_PARSE_TIMEOUT_SECS") {
            self.parser.timeout_secs = timeout.trim().parse().map_err(|_| {
                Error::Config(format!("TALLY_PARSE_TIMEOUT_SECS is not a number: {}", timeout))
            })?;
        }
        if let Some(key) = lookup("GEMINI_API_KEY").filter(|k| !k.is_empty()) {
            self.parser.api_key = Some(key);
        }
        if let Some(currency) = lookup("TALLY_HOME_CURRENCY") {
            self.locale.home_currency = parse_currency(&currency)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.parser.timeout_secs == 0 {
            return Err(Error::Config("parser.timeout_secs must be at least 1".into()));
        }
        if !(1..=100).contains(&self.budgets.default_threshold_pct) {
            return Err(Error::Config(format!(
                "budgets.default_threshold_pct must be between 1 and 100, got {}",
                self.budgets.default_threshold_pct
            )));
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config.toml"))
}

fn parse_currency(code: &str) -> Result<Currency> {
    code.parse()
        .map_err(|_| Error::Config(format!("Unsupported home currency: {}", code)))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    parser: Option<RawParser>,
    locale: Option<RawLocale>,
    budgets: Option<RawBudgets>,
}

#[derive(Debug, Deserialize)]
struct RawParser {
    backend: Option<String>,
    host: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawLocale {
    home_currency: Option<String>,
    date_order: Option<DateOrder>,
}

#[derive(Debug, Deserialize)]
struct RawBudgets {
    default_threshold_pct: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_parse_default_config() {
        let config = AppConfig::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.parser.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [parser]
            backend = "ollama"
            host = "http://localhost:11434"

            [locale]
            date_order = "month_first"
            "#,
        )
        .unwrap();
        assert_eq!(config.parser.backend, BackendKind::Ollama);
        assert_eq!(config.parser.model, "gemini-2.0-flash");
        assert_eq!(config.parser.timeout_secs, 10);
        assert_eq!(config.locale.date_order, DateOrder::MonthFirst);
        assert_eq!(config.locale.home_currency, Currency::Inr);
        assert_eq!(config.budgets.default_threshold_pct, 80);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            AppConfig::from_toml("[parser]\nbackend = \"openai\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_toml("[locale]\nhome_currency = \"BTC\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_toml("[budgets]\ndefault_threshold_pct = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_toml("[parser\n"),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TALLY_PARSE_BACKEND", "gemini"),
            ("TALLY_PARSE_TIMEOUT_SECS", "3"),
            ("GEMINI_API_KEY", "secret"),
            ("TALLY_HOME_CURRENCY", "usd"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.parser.backend, BackendKind::Gemini);
        assert_eq!(config.parser.timeout(), Duration::from_secs(3));
        assert_eq!(config.parser.api_key.as_deref(), Some("secret"));
        assert_eq!(config.locale.home_currency, Currency::Usd);
    }

    #[test]
    fn test_bad_env_timeout() {
        let mut config = AppConfig::default();
        let result = config.apply_env(|key| {
            (key == "TALLY_PARSE_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[budgets]\ndefault_threshold_pct = 90").unwrap();

        let config = AppConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.budgets.default_threshold_pct, 90);
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = AppConfig::load_from(Some(Path::new("/nonexistent/tally.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
