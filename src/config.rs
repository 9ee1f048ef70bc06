use std::fmt;

/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
/// Environment variable holding the Gemini API key.
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required environment variable is missing or empty.
    MissingVar { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar { name } => {
                write!(f, "required environment variable '{}' is missing or empty", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug)]
pub struct Config {
    pub telegram_bot_token: String,
    /// Gemini API key. `None` leaves the AI client permanently disabled.
    pub google_api_key: Option<String>,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through a variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let telegram_bot_token = lookup(TELEGRAM_BOT_TOKEN)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar { name: TELEGRAM_BOT_TOKEN })?;

        let google_api_key = lookup(GOOGLE_API_KEY).filter(|v| !v.trim().is_empty());

        Ok(Self {
            telegram_bot_token,
            google_api_key,
        })
    }

    /// Masked form of a secret for startup diagnostics.
    pub fn describe_secret(value: Option<&str>) -> String {
        match value {
            Some(v) => format!("set ({} chars)", v.len()),
            None => "not set".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_both_variables_set() {
        let config = Config::from_lookup(lookup_from(&[
            (TELEGRAM_BOT_TOKEN, "123456789:ABCdefGHIjklMNOpqrsTUVwxyz"),
            (GOOGLE_API_KEY, "AIzaSyTest"),
        ]))
        .expect("should load");
        assert_eq!(config.telegram_bot_token, "123456789:ABCdefGHIjklMNOpqrsTUVwxyz");
        assert_eq!(config.google_api_key.as_deref(), Some("AIzaSyTest"));
    }

    #[test]
    fn test_missing_token_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[(GOOGLE_API_KEY, "AIzaSyTest")]))
            .expect_err("should fail");
        assert!(matches!(err, ConfigError::MissingVar { name: TELEGRAM_BOT_TOKEN }));
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn test_empty_token_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[
            (TELEGRAM_BOT_TOKEN, "  "),
            (GOOGLE_API_KEY, "AIzaSyTest"),
        ]))
        .expect_err("should fail");
        assert!(matches!(err, ConfigError::MissingVar { .. }));
    }

    #[test]
    fn test_missing_api_key_disables_gemini() {
        let config = Config::from_lookup(lookup_from(&[(TELEGRAM_BOT_TOKEN, "123:abc")]))
            .expect("should load");
        assert!(config.google_api_key.is_none());
    }

    #[test]
    fn test_empty_api_key_disables_gemini() {
        let config = Config::from_lookup(lookup_from(&[
            (TELEGRAM_BOT_TOKEN, "123:abc"),
            (GOOGLE_API_KEY, ""),
        ]))
        .expect("should load");
        assert!(config.google_api_key.is_none());
    }

    #[test]
    fn test_describe_secret_never_reveals_the_value() {
        let described = Config::describe_secret(Some("super-secret"));
        assert!(!described.contains("super-secret"));
        assert!(described.contains("12"));
        assert_eq!(Config::describe_secret(None), "not set");
    }
}
