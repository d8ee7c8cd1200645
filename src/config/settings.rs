use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct LedgerSettings {
    pub database_path: String,
    pub table: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            database_path: "dataset_rating.db".to_string(),
            table: "package_rating".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub api_endpoint: String,
    pub api_key: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            api_endpoint: "http://localhost:5000/api/3".to_string(),
            api_key: None,
            user_agent: "DatasetRating/1.0".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub ledger: LedgerSettings,
    pub catalog: CatalogSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `DATABASE_PATH`, `RATING_TABLE`, `CATALOG_API_URL`,
    /// `CATALOG_API_KEY` and `CATALOG_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(path) = lookup("DATABASE_PATH") {
            config.ledger.database_path = path;
        }
        if let Some(table) = lookup("RATING_TABLE") {
            config.ledger.table = table;
        }
        if let Some(endpoint) = lookup("CATALOG_API_URL") {
            config.catalog.api_endpoint = endpoint;
        }
        if let Some(key) = lookup("CATALOG_API_KEY").filter(|k| !k.is_empty()) {
            config.catalog.api_key = Some(key);
        }
        if let Some(timeout) = lookup("CATALOG_TIMEOUT_SECS") {
            config.catalog.timeout_secs = timeout
                .parse()
                .with_context(|| format!("Invalid CATALOG_TIMEOUT_SECS value: {}", timeout))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.ledger.table, "package_rating");
        assert_eq!(config.catalog.timeout_secs, 30);
        assert!(config.catalog.api_key.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_PATH", "/tmp/ratings.db"),
            ("RATING_TABLE", "ratings"),
            ("CATALOG_API_URL", "https://data.example.org/api/3"),
            ("CATALOG_API_KEY", "abc"),
            ("CATALOG_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.ledger.database_path, "/tmp/ratings.db");
        assert_eq!(config.ledger.table, "ratings");
        assert_eq!(config.catalog.api_endpoint, "https://data.example.org/api/3");
        assert_eq!(config.catalog.api_key.as_deref(), Some("abc"));
        assert_eq!(config.catalog.timeout_secs, 5);
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("CATALOG_TIMEOUT_SECS", "soon")]));
        assert!(result.is_err());
    }
}
