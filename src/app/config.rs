use dotenv::dotenv;
use std::env;

use super::AppError;

pub const DEFAULT_POOL_SIZE: u32 = 4;

/** Settings read from the environment (or a `.env` file) at startup */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the SQLite database, or `:memory:`.
    pub database_url: String,
    pub pool_size: u32,
}

impl Config {
    /// Loads `.env` if present, then reads `DATABASE_URL` and the optional
    /// `DATABASE_POOL_SIZE`.
    ///
    /// # Example
    /// ```no_run
    /// let config = blogsite_schema::app::config::Config::from_env()?;
    /// # Ok::<(), blogsite_schema::app::AppError>(())
    /// ```
    pub fn from_env() -> Result<Config, AppError> {
        dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::Config("environment variable `DATABASE_URL` not set".to_string()))?;

        let pool_size = match lookup("DATABASE_POOL_SIZE") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(AppError::Config(format!(
                        "`DATABASE_POOL_SIZE` must be a positive integer, got `{}`",
                        raw
                    )))
                }
            },
            None => DEFAULT_POOL_SIZE,
        };

        Ok(Config { database_url, pool_size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn reads_url_and_defaults_pool_size() {
        let config = Config::from_lookup(lookup_in(&[("DATABASE_URL", "blog.db")])).unwrap();
        assert_eq!(config.database_url, "blog.db");
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn reads_explicit_pool_size() {
        let config = Config::from_lookup(lookup_in(&[
            ("DATABASE_URL", ":memory:"),
            ("DATABASE_POOL_SIZE", "1"),
        ]))
        .unwrap();
        assert_eq!(config.pool_size, 1);
    }

    #[test]
    fn missing_url_is_a_config_error() {
        assert!(matches!(
            Config::from_lookup(lookup_in(&[])),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup_in(&[("DATABASE_URL", "")])),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn rejects_bad_pool_size() {
        for raw in ["0", "-2", "many"] {
            let result = Config::from_lookup(lookup_in(&[
                ("DATABASE_URL", "blog.db"),
                ("DATABASE_POOL_SIZE", raw),
            ]));
            assert!(matches!(result, Err(AppError::Config(_))), "accepted `{}`", raw);
        }
    }
}
