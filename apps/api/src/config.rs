use anyhow::{bail, Context, Result};

/// Application configuration resolved from environment variables once at
/// startup. Required variables missing at boot abort the process; nothing
/// reads the environment after this point.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_timeout_secs: u64,
    pub gemini_temperature: f32,
    pub port: u16,
    pub rust_log: String,
    pub admin_bootstrap: Option<AdminBootstrap>,
}

/// Optional one-time admin account created at startup when no admin exists.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TEMPERATURE: f32 = 0.7;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let gemini_temperature = optional_env("GEMINI_TEMPERATURE")
            .map(|v| v.parse::<f32>())
            .transpose()
            .context("GEMINI_TEMPERATURE must be a number")?
            .unwrap_or(DEFAULT_TEMPERATURE);

        if !(0.0..=1.0).contains(&gemini_temperature) {
            bail!("GEMINI_TEMPERATURE must be between 0.0 and 1.0");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: optional_env("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: optional_env("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            gemini_timeout_secs: optional_env("GEMINI_TIMEOUT")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("GEMINI_TIMEOUT must be a whole number of seconds")?
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            gemini_temperature,
            port: optional_env("PORT")
                .map(|v| v.parse::<u16>())
                .transpose()
                .context("PORT must be a valid port number")?
                .unwrap_or(8080),
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            admin_bootstrap: admin_bootstrap_from_env(),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn admin_bootstrap_from_env() -> Option<AdminBootstrap> {
    let enabled = optional_env("ADMIN_BOOTSTRAP_ENABLED")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if !enabled {
        return None;
    }

    match (
        optional_env("ADMIN_BOOTSTRAP_USERNAME"),
        optional_env("ADMIN_BOOTSTRAP_EMAIL"),
        optional_env("ADMIN_BOOTSTRAP_PASSWORD"),
    ) {
        (Some(username), Some(email), Some(password)) => Some(AdminBootstrap {
            username,
            email,
            password,
        }),
        _ => {
            tracing::warn!("admin bootstrap enabled but credentials are incomplete, skipping");
            None
        }
    }
}
