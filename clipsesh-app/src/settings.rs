use crate::infrastructure::security::DEFAULT_SEARCH_LIMIT_PER_MINUTE;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub secret_key: String,
    pub vote_secret: String,
    pub bind_addr: String,
    pub public_base_url: String,
    pub upload_dir: PathBuf,
    pub download_dir: PathBuf,
    pub profile_picture_dir: PathBuf,
    pub admin_username: String,
    pub admin_password: String,
    /// True when no `ADMIN_PASSWORD` was given and one was made up.
    pub admin_password_generated: bool,
    pub search_rate_limit: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(SettingsError::Missing(key));
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let secret_key = require("SECRET_KEY")?;
        let (admin_password, admin_password_generated) = match get("ADMIN_PASSWORD") {
            Some(password) => (password, false),
            None => (uuid::Uuid::new_v4().simple().to_string(), true),
        };

        Ok(Self {
            database_url: require("DATABASE_URL")?,
            vote_secret: get("VOTE_SECRET").unwrap_or_else(|| secret_key.clone()),
            secret_key,
            bind_addr: or("BIND_ADDR", "0.0.0.0:5000"),
            public_base_url: or("PUBLIC_BASE_URL", "http://localhost:5000")
                .trim_end_matches('/')
                .to_string(),
            upload_dir: PathBuf::from(or("UPLOAD_DIR", "uploads")),
            download_dir: PathBuf::from(or("DOWNLOAD_DIR", "download")),
            profile_picture_dir: PathBuf::from(or("PROFILE_PICTURE_DIR", "profilePictures")),
            admin_username: or("ADMIN_USERNAME", "admin"),
            admin_password,
            admin_password_generated,
            search_rate_limit: parse(
                "SEARCH_RATE_LIMIT",
                get("SEARCH_RATE_LIMIT"),
                DEFAULT_SEARCH_LIMIT_PER_MINUTE,
            )?,
        })
    }
}

fn parse<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, SettingsError>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        Some(value) => value.trim().parse().map_err(|e: T::Err| SettingsError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
