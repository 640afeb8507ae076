use crate::error::{Error, Result};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.hh.ru";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// HeadHunter refuses page sizes above 100.
pub const MAX_PER_PAGE: u32 = 100;
/// HeadHunter only serves the first 2000 results of a search.
pub const DEFAULT_MAX_PAGES: u32 = 20;

/// Connection settings for the search API, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub per_page: u32,
    pub max_pages: u32,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            per_page: MAX_PER_PAGE,
            max_pages: DEFAULT_MAX_PAGES,
            user_agent: format!("job-scout/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    /// Build a config from `HH_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup("HH_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "HH_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(per_page) = parse_var::<u32>(&lookup, "HH_PER_PAGE")? {
            config.per_page = per_page;
        }
        if let Some(max_pages) = parse_var::<u32>(&lookup, "HH_MAX_PAGES")? {
            config.max_pages = max_pages;
        }
        if let Some(user_agent) = lookup("HH_USER_AGENT") {
            config.user_agent = user_agent;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::Config("base url must not be empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be positive".to_string()));
        }
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(Error::Config(format!(
                "per_page must be within 1..={}, got {}",
                MAX_PER_PAGE, self.per_page
            )));
        }
        if self.max_pages == 0 {
            return Err(Error::Config("max_pages must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has an invalid value: '{}'", key, raw))),
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
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ApiConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.base_url, "https://api.hh.ru");
    }

    #[test]
    fn overrides_from_environment() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("HH_BASE_URL", "http://localhost:8080/"),
            ("HH_TIMEOUT_SECS", "3"),
            ("HH_PER_PAGE", "50"),
            ("HH_MAX_PAGES", "2"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.per_page, 50);
        assert_eq!(config.max_pages, 2);
    }

    #[test]
    fn rejects_garbage_values() {
        let err = ApiConfig::from_lookup(lookup_from(&[("HH_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = ApiConfig::from_lookup(lookup_from(&[("HH_PER_PAGE", "500")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
