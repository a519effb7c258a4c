use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rankbind_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

const MIN_SHARED_SECRET_LENGTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingStoreBackend {
    Redis,
    Postgres,
}

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub api_base_url: String,
    pub bot_token: String,
    pub review_channel_id: String,
    pub premium_role_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RobloxConfig {
    pub groups_api_base_url: String,
    pub users_api_base_url: String,
    pub cookie: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub api_host: String,
    pub api_port: u16,
    pub shared_secret: String,
    pub redis_url: String,
    pub redis_key_prefix: String,
    pub binding_store: BindingStoreBackend,
    pub database_url: Option<String>,
    pub discord: DiscordConfig,
    pub roblox: RobloxConfig,
    pub premium_users_file: String,
    pub activate_immediately: bool,
    pub setup_lock_seconds: u32,
    pub http_timeout_seconds: u64,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = parse_env_u16("API_PORT", 3001)?;

        let shared_secret = required_non_empty_env("API_SHARED_SECRET")?;
        if shared_secret.len() < MIN_SHARED_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "API_SHARED_SECRET must be at least {MIN_SHARED_SECRET_LENGTH} characters"
            )));
        }

        let redis_url = required_non_empty_env("REDIS_URL")?;
        let redis_key_prefix =
            optional_env("REDIS_KEY_PREFIX").unwrap_or_else(|| "rankbind".to_owned());

        let binding_store = match env::var("BINDING_STORE")
            .unwrap_or_else(|_| "redis".to_owned())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "redis" => BindingStoreBackend::Redis,
            "postgres" => BindingStoreBackend::Postgres,
            other => {
                return Err(AppError::Validation(format!(
                    "BINDING_STORE must be either 'redis' or 'postgres', got '{other}'"
                )));
            }
        };

        let database_url = match binding_store {
            BindingStoreBackend::Postgres => Some(required_non_empty_env("DATABASE_URL")?),
            BindingStoreBackend::Redis => optional_env("DATABASE_URL").filter(|_| migrate_only),
        };
        if migrate_only && database_url.is_none() {
            return Err(AppError::Validation(
                "DATABASE_URL is required to run migrations".to_owned(),
            ));
        }

        let discord = DiscordConfig {
            api_base_url: base_url_env("DISCORD_API_BASE_URL", "https://discord.com/api/v10")?,
            bot_token: required_non_empty_env("DISCORD_BOT_TOKEN")?,
            review_channel_id: required_non_empty_env("OPERATOR_REVIEW_CHANNEL_ID")?,
            premium_role_id: optional_env("DISCORD_PREMIUM_ROLE_ID"),
        };

        let roblox = RobloxConfig {
            groups_api_base_url: base_url_env(
                "ROBLOX_GROUPS_API_BASE_URL",
                "https://groups.roblox.com",
            )?,
            users_api_base_url: base_url_env(
                "ROBLOX_USERS_API_BASE_URL",
                "https://users.roblox.com",
            )?,
            cookie: optional_env("ROBLOX_COOKIE"),
        };

        let premium_users_file =
            optional_env("PREMIUM_USERS_FILE").unwrap_or_else(|| "premiumUsers.json".to_owned());
        let activate_immediately = parse_env_bool("SETUP_ACTIVATE_IMMEDIATELY", true)?;
        let setup_lock_seconds = parse_env_u32("SETUP_LOCK_SECONDS", 30)?;
        let http_timeout_seconds = parse_env_u64("HTTP_TIMEOUT_SECONDS", 15)?;

        if setup_lock_seconds == 0 {
            return Err(AppError::Validation(
                "SETUP_LOCK_SECONDS must be greater than zero".to_owned(),
            ));
        }

        if http_timeout_seconds == 0 {
            return Err(AppError::Validation(
                "HTTP_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            migrate_only,
            api_host,
            api_port,
            shared_secret,
            redis_url,
            redis_key_prefix,
            binding_store,
            database_url,
            discord,
            roblox,
            premium_users_file,
            activate_immediately,
            setup_lock_seconds,
            http_timeout_seconds,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn base_url_env(name: &str, default: &str) -> Result<String, AppError> {
    let value = optional_env(name).unwrap_or_else(|| default.to_owned());
    Url::parse(&value)
        .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}")))?;

    Ok(value.trim_end_matches('/').to_owned())
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, AppError> {
    match optional_env(name) {
        Some(value) => parse_bool(&value)
            .ok_or_else(|| AppError::Validation(format!("invalid {name} value '{value}'"))),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, AppError> {
    match env::var(name) {
        Ok(value) => value.parse::<u16>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, AppError> {
    match env::var(name) {
        Ok(value) => value.parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, AppError> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
