//! Configuration management for finchart
//!
//! This module handles loading, validation, and management of
//! finchart configuration from YAML files, and owns the closed
//! domain enums (granularity, metric, week start) shared by every crate.

pub mod error;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Domain Enums ====================

/// Level of a period in the statistics hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// A calendar year, split into months
    Year,
    /// A calendar month, split into weeks
    Month,
    /// A week clipped to its month, split into weekdays
    Week,
    /// A single day, never split further
    Day,
}

impl Granularity {
    /// The granularity of this period's children, `None` for days
    pub fn finer(&self) -> Option<Granularity> {
        match self {
            Granularity::Year => Some(Granularity::Month),
            Granularity::Month => Some(Granularity::Week),
            Granularity::Week => Some(Granularity::Day),
            Granularity::Day => None,
        }
    }

    /// Whether a period of this granularity has nothing beneath it
    pub fn is_terminal(&self) -> bool {
        matches!(self, Granularity::Day)
    }
}

impl Default for Granularity {
    fn default() -> Self {
        Granularity::Year
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "year" => Ok(Granularity::Year),
            "month" => Ok(Granularity::Month),
            "week" => Ok(Granularity::Week),
            "day" => Ok(Granularity::Day),
            _ => Err(format!("Invalid granularity: {}", s)),
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Year => write!(f, "year"),
            Granularity::Month => write!(f, "month"),
            Granularity::Week => write!(f, "week"),
            Granularity::Day => write!(f, "day"),
        }
    }
}

/// Tracked metric plotted as one chart series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Money coming into a wallet
    Income,
    /// Money leaving a wallet
    Expenses,
}

impl std::str::FromStr for Metric {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Metric::Income),
            "expenses" | "expense" => Ok(Metric::Expenses),
            _ => Err(format!("Invalid metric: {}", s)),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Income => write!(f, "income"),
            Metric::Expenses => write!(f, "expenses"),
        }
    }
}

/// First day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Monday,
    Sunday,
}

impl std::str::FromStr for WeekStart {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monday" | "mon" => Ok(WeekStart::Monday),
            "sunday" | "sun" => Ok(WeekStart::Sunday),
            _ => Err(format!("Invalid week start: {}", s)),
        }
    }
}

impl std::fmt::Display for WeekStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeekStart::Monday => write!(f, "monday"),
            WeekStart::Sunday => write!(f, "sunday"),
        }
    }
}

// ==================== Configuration Types ====================

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root directory of the statistics documents
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

/// Locale used for month and weekday names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Locale identifier, e.g. "en-US" or "pl_PL"
    #[serde(default = "default_locale_id")]
    pub id: String,
    /// Explicit first day of the week; inferred from the locale when absent
    #[serde(default)]
    pub week_start: Option<WeekStart>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            id: default_locale_id(),
            week_start: None,
        }
    }
}

fn default_locale_id() -> String {
    "en-US".to_string()
}

/// Chart and interaction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Plotted metrics, in series order
    #[serde(default = "default_metrics")]
    pub metrics: Vec<Metric>,
    /// X-position of the left edge of the first bucket
    #[serde(default)]
    pub plot_start: f64,
    /// X-position of the right edge of the last bucket
    #[serde(default = "default_plot_end")]
    pub plot_end: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            metrics: default_metrics(),
            plot_start: 0.0,
            plot_end: default_plot_end(),
        }
    }
}

fn default_metrics() -> Vec<Metric> {
    vec![Metric::Expenses, Metric::Income]
}

fn default_plot_end() -> f64 {
    1200.0
}

/// Currency display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// ISO currency code shown next to amounts
    #[serde(default = "default_currency")]
    pub code: String,
    /// Thousands separator
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
    /// Decimal separator
    #[serde(default = "default_decimal_sep")]
    pub decimal_separator: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            code: default_currency(),
            thousands_separator: default_thousands_sep(),
            decimal_separator: default_decimal_sep(),
        }
    }
}

fn default_currency() -> String {
    "PLN".to_string()
}

fn default_thousands_sep() -> String {
    ",".to_string()
}

fn default_decimal_sep() -> String {
    ".".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Data directory settings
    #[serde(default)]
    pub data: DataConfig,
    /// Locale settings
    #[serde(default)]
    pub locale: LocaleConfig,
    /// Chart settings
    #[serde(default)]
    pub chart: ChartConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::IoError)?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.locale.id.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "locale.id".to_string(),
            });
        }

        if self.chart.plot_end.partial_cmp(&self.chart.plot_start) != Some(Ordering::Greater) {
            return Err(ConfigError::InvalidValue {
                field: "chart.plot_end".to_string(),
                reason: "Plot end must be greater than plot start".to_string(),
            });
        }

        if self.chart.metrics.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "chart.metrics".to_string(),
                reason: "At least one metric must be plotted".to_string(),
            });
        }

        for (i, metric) in self.chart.metrics.iter().enumerate() {
            if self.chart.metrics[..i].contains(metric) {
                return Err(ConfigError::InvalidValue {
                    field: "chart.metrics".to_string(),
                    reason: format!("Metric '{}' is listed more than once", metric),
                });
            }
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Directory holding the wallet statistics documents
    pub fn statistics_path(&self) -> PathBuf {
        self.data.path.join("wallets-statistics")
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_is_valid() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.chart.metrics, vec![Metric::Expenses, Metric::Income]);
        assert_eq!(config.locale.id, "en-US");
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.chart.plot_end, 1200.0);
        assert_eq!(config.logging.level, "info");
        assert!(config.locale.week_start.is_none());
        assert_eq!(config.statistics_path(), PathBuf::from("./data/wallets-statistics"));
    }

    #[test]
    fn test_week_start_and_locale() {
        let config = Config::from_yaml("locale:\n  id: pl_PL\n  week_start: sunday\n").unwrap();
        assert_eq!(config.locale.id, "pl_PL");
        assert_eq!(config.locale.week_start, Some(WeekStart::Sunday));
    }

    #[test]
    fn test_rejects_inverted_plot_range() {
        let err = Config::from_yaml("chart:\n  plot_start: 100\n  plot_end: 10\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "chart.plot_end"));

        let err = Config::from_yaml("chart:\n  plot_end: .nan\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "chart.plot_end"));
    }

    #[test]
    fn test_rejects_duplicate_metrics() {
        let err = Config::from_yaml("chart:\n  metrics: [income, income]\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_rejects_empty_metrics() {
        assert!(Config::from_yaml("chart:\n  metrics: []\n").is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("chart: [").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(PathBuf::from("/nonexistent/finchart.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_granularity_navigation() {
        assert_eq!(Granularity::Year.finer(), Some(Granularity::Month));
        assert_eq!(Granularity::Week.finer(), Some(Granularity::Day));
        assert_eq!(Granularity::Day.finer(), None);
        assert!(Granularity::Day.is_terminal());
        assert!(!Granularity::Week.is_terminal());
    }

    #[test]
    fn test_enum_from_str() {
        assert_eq!("Month".parse::<Granularity>().unwrap(), Granularity::Month);
        assert!("quarter".parse::<Granularity>().is_err());
        assert_eq!("expense".parse::<Metric>().unwrap(), Metric::Expenses);
        assert_eq!("sun".parse::<WeekStart>().unwrap(), WeekStart::Sunday);
        assert_eq!(Metric::Income.to_string(), "income");
        assert_eq!(Granularity::Week.to_string(), "week");
    }
}
