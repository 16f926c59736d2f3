use crate::types::{RelayError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default RSS feed polled when NEWS_FEED_URL is not set.
pub const DEFAULT_FEED_URL: &str = "https://www.coindesk.com/arc/outboundfeeds/rss/";

/// Keywords applied when NEWS_KEYWORDS is not set.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "bitcoin",
    "crypto",
    "ethereum",
    "blockchain",
    "white house",
    "biden",
    "trump",
    "sec",
    "fed",
    "interest rates",
    "inflation",
    "regulation",
    "us government",
];

/// Runtime configuration, read from the environment at startup. A missing
/// required credential or a malformed value is fatal before any command is
/// accepted.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub telegram_token: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub feed_url: String,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub keywords: Vec<String>,
    pub poll_interval: Duration,
    pub source_lang: String,
    pub target_lang: String,
    pub log_path: PathBuf,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        let telegram_token = required("TELEGRAM_TOKEN")?;
        let openai_api_key = required("OPENAI_API_KEY")?;

        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());
        let feed_url = env::var("NEWS_FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string());
        validate_url("NEWS_FEED_URL", &feed_url)?;
        let api_url = env::var("NEWS_API_URL").ok().filter(|v| !v.is_empty());
        if let Some(url) = &api_url {
            validate_url("NEWS_API_URL", url)?;
        }
        let api_key = env::var("NEWS_API_KEY").ok().filter(|v| !v.is_empty());

        let keywords = match env::var("NEWS_KEYWORDS") {
            Ok(raw) => parse_keywords(&raw)?,
            Err(_) => DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        };

        let poll_interval = match env::var("CHECK_INTERVAL_SECONDS") {
            Ok(raw) => parse_interval(&raw)?,
            Err(_) => Duration::from_secs(60),
        };

        let source_lang = env::var("NEWS_SOURCE_LANG").unwrap_or_else(|_| "en".to_string());
        let target_lang = env::var("NEWS_TARGET_LANG").unwrap_or_else(|_| "ru".to_string());
        let log_path = env::var("NEWS_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("news_log.txt"));

        Ok(Self {
            telegram_token,
            openai_api_key,
            openai_model,
            feed_url,
            api_url,
            api_key,
            keywords,
            poll_interval,
            source_lang,
            target_lang,
            log_path,
        })
    }

    /// Whether the translation stage should run at all.
    pub fn translation_enabled(&self) -> bool {
        self.source_lang != self.target_lang
    }
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(RelayError::Config(format!(
            "required environment variable {name} is not set"
        ))),
    }
}

fn validate_url(name: &str, raw: &str) -> Result<()> {
    match Url::parse(raw) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
        Ok(url) => Err(RelayError::Config(format!(
            "{name} must be an http(s) URL, got scheme {:?}",
            url.scheme()
        ))),
        Err(e) => Err(RelayError::Config(format!("{name} is not a valid URL: {e}"))),
    }
}

fn parse_interval(raw: &str) -> Result<Duration> {
    let secs: u64 = raw.trim().parse().map_err(|_| {
        RelayError::Config(format!(
            "CHECK_INTERVAL_SECONDS must be a positive integer, got {raw:?}"
        ))
    })?;
    if secs == 0 {
        return Err(RelayError::Config(
            "CHECK_INTERVAL_SECONDS must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_keywords(raw: &str) -> Result<Vec<String>> {
    let keywords: Vec<String> = raw
        .split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        return Err(RelayError::Config(
            "NEWS_KEYWORDS is set but contains no keywords".to_string(),
        ));
    }
    Ok(keywords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_rejects_garbage_and_zero() {
        assert!(parse_interval("60").is_ok());
        assert!(parse_interval("soon").is_err());
        assert!(parse_interval("0").is_err());
    }

    #[test]
    fn url_validation_requires_http_scheme() {
        assert!(validate_url("NEWS_FEED_URL", "https://example.com/rss").is_ok());
        assert!(validate_url("NEWS_FEED_URL", "ftp://example.com/rss").is_err());
        assert!(validate_url("NEWS_FEED_URL", "not a url").is_err());
    }

    #[test]
    fn keywords_are_lowercased_and_trimmed() {
        let parsed = parse_keywords("Bitcoin, SEC ,  fed").unwrap();
        assert_eq!(parsed, vec!["bitcoin", "sec", "fed"]);
        assert!(parse_keywords(" , ,").is_err());
    }
}
