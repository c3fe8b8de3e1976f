//! Budget settings loading from config.toml
//!
//! This module loads the optional `config.toml` file. It seeds the owner's
//! initial categories on first run and tunes how much the dashboard shows.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Number of recent transactions shown on the dashboard when not configured
pub const DEFAULT_RECENT_TRANSACTIONS: usize = 10;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Categories to create for an owner that has none with the same name
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    /// Dashboard presentation settings
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Configuration for a single seeded category
#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    /// Name of the category
    pub name: String,
    /// `"fixed"`, `"variable_fixed"`, or absent for a standard category
    #[serde(default)]
    pub commitment_type: Option<String>,
    /// Monthly budget reserved for commitment categories
    #[serde(default)]
    pub budget_limit: f64,
    /// Whether the category appears in the envelope tracker
    #[serde(default)]
    pub is_pinned: bool,
}

/// Dashboard presentation settings
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct DashboardConfig {
    /// How many of the month's newest transactions the dashboard returns
    #[serde(default = "default_recent_transactions")]
    pub recent_transactions: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_transactions: DEFAULT_RECENT_TRANSACTIONS,
        }
    }
}

const fn default_recent_transactions() -> usize {
    DEFAULT_RECENT_TRANSACTIONS
}

/// Loads budget configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A category entry is missing its name
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses budget configuration from TOML text
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads budget configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_category_config() {
        let toml_str = r#"
            [dashboard]
            recent_transactions = 5

            [[categories]]
            name = "Rent"
            commitment_type = "fixed"
            budget_limit = 1500.0

            [[categories]]
            name = "Groceries"
            commitment_type = "variable_fixed"
            budget_limit = 600.0
            is_pinned = true

            [[categories]]
            name = "Eating Out"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.dashboard.recent_transactions, 5);
        assert_eq!(config.categories.len(), 3);
        assert_eq!(config.categories[0].name, "Rent");
        assert_eq!(config.categories[0].commitment_type.as_deref(), Some("fixed"));
        assert_eq!(config.categories[0].budget_limit, 1500.0);
        assert!(!config.categories[0].is_pinned);

        assert!(config.categories[1].is_pinned);

        assert_eq!(config.categories[2].commitment_type, None);
        assert_eq!(config.categories[2].budget_limit, 0.0);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.categories.is_empty());
        assert_eq!(
            config.dashboard.recent_transactions,
            DEFAULT_RECENT_TRANSACTIONS
        );
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = parse_config("[[categories]]\nbudget_limit = 10.0");
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = load_config("definitely/not/here/config.toml");
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }
}
