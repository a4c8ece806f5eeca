use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_IMAGE_API_URL: &str = "https://api.openai.com/v1/images/generations";

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Content store
    pub locales_dir: PathBuf,

    // Admin
    pub admin_password: String,
    pub admin_session_ttl: Duration,

    // Publishing
    pub publish_repo_dir: PathBuf,
    pub publish_remote: String,
    pub publish_branch: String,

    // OpenAI
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_url: String,
    pub openai_image_api_url: String,
    pub openai_image_model: String,
    pub adventure_image_size: String,

    // Lead capture
    pub contact_delay: Duration,
    pub quick_consultation_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source. Missing or unparsable
    /// optional values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        let number = |name: &str, default: u64| {
            lookup(name)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let admin_password = lookup("ADMIN_PASSWORD").context("ADMIN_PASSWORD not set")?;
        if admin_password.is_empty() {
            bail!("ADMIN_PASSWORD must not be empty");
        }

        Ok(Self {
            // Server
            port: lookup("PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(8080),

            // Content store
            locales_dir: PathBuf::from(text("LOCALES_DIR", "locales")),

            // Admin
            admin_password,
            admin_session_ttl: Duration::from_secs(number("ADMIN_SESSION_TTL_SECS", 3600)),

            // Publishing
            publish_repo_dir: PathBuf::from(text("PUBLISH_REPO_DIR", ".")),
            publish_remote: text("PUBLISH_REMOTE", "origin"),
            publish_branch: text("PUBLISH_BRANCH", "main"),

            // OpenAI (optional: without a key the adventure uses fallback text)
            openai_api_key: lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty()),
            openai_model: text("OPENAI_MODEL", "gpt-4o-mini"),
            openai_api_url: text("OPENAI_API_URL", DEFAULT_OPENAI_API_URL),
            openai_image_api_url: text("OPENAI_IMAGE_API_URL", DEFAULT_OPENAI_IMAGE_API_URL),
            openai_image_model: text("OPENAI_IMAGE_MODEL", "gpt-image-1"),
            adventure_image_size: text("ADVENTURE_IMAGE_SIZE", "1344x768"),

            // Lead capture
            contact_delay: Duration::from_millis(number("CONTACT_DELAY_MS", 500)),
            quick_consultation_delay: Duration::from_millis(number(
                "QUICK_CONSULTATION_DELAY_MS",
                800,
            )),
        })
    }
}
