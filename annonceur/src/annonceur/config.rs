use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::num::NonZeroU64;
use thiserror::Error;

/// Optional settings file, looked up relative to the working directory.
const CONFIG_FILE: &str = "annonceur/config";

pub const TOKEN_KEY: &str = "DISCORD_TOKEN";
pub const AUTHORIZED_ROLE_KEY: &str = "AUTHORIZED_ROLE";
pub const GUILD_ID_KEY: &str = "GUILD_ID";
pub const CLIENT_ID_KEY: &str = "DISCORD_CLIENT_ID";

#[derive(Error, Debug)]
pub enum Error {
    /// A required value is absent or blank
    #[error("{0} is not set")]
    ConfigurationMissing(&'static str),
    /// A snowflake value could not be parsed
    #[error("{key} is not a valid Discord id: '{value}'")]
    InvalidId { key: &'static str, value: String },
    #[error("Cannot load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Raw values as read from the configuration sources, before validation.
#[derive(Default, Deserialize, Serialize)]
pub struct Settings {
    pub(crate) discord_token: Option<String>,
    pub(crate) authorized_role: Option<String>,
    pub(crate) guild_id: Option<String>,
    pub(crate) thumbnail_url: Option<String>,
    pub(crate) discord_client_id: Option<String>,
}

/// Process-wide bot configuration. Built once at startup and only read afterwards.
#[derive(Clone)]
pub struct Config {
    token: String,
    authorized_role: String,
    guild_id: u64,
    thumbnail_url: Option<String>,
    application_id: Option<u64>,
}

impl Config {
    /// Loads the configuration from the optional settings file, then the environment.
    ///
    /// Environment variables take precedence over the file.
    pub fn load() -> Result<Self, Error> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::default())
            .build()?;

        Self::try_from(settings.try_deserialize::<Settings>()?)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn authorized_role(&self) -> &str {
        &self.authorized_role
    }

    pub fn guild_id(&self) -> u64 {
        self.guild_id
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    pub fn application_id(&self) -> Option<u64> {
        self.application_id
    }
}

impl TryFrom<Settings> for Config {
    type Error = Error;

    fn try_from(settings: Settings) -> Result<Self, Self::Error> {
        let token = required(settings.discord_token, TOKEN_KEY)?;
        let authorized_role = required(settings.authorized_role, AUTHORIZED_ROLE_KEY)?;
        let guild_id = parse_id(&required(settings.guild_id, GUILD_ID_KEY)?, GUILD_ID_KEY)?;
        let application_id = match non_blank(settings.discord_client_id) {
            Some(value) => Some(parse_id(&value, CLIENT_ID_KEY)?),
            None => None,
        };

        Ok(Self {
            token,
            authorized_role,
            guild_id,
            thumbnail_url: non_blank(settings.thumbnail_url),
            application_id,
        })
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("authorized_role", &self.authorized_role)
            .field("guild_id", &self.guild_id)
            .field("thumbnail_url", &self.thumbnail_url)
            .field("application_id", &self.application_id)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn required(value: Option<String>, key: &'static str) -> Result<String, Error> {
    non_blank(value).ok_or(Error::ConfigurationMissing(key))
}

// Discord snowflakes are never zero, and serenity's id types panic on zero.
fn parse_id(value: &str, key: &'static str) -> Result<u64, Error> {
    value
        .trim()
        .parse::<NonZeroU64>()
        .map(NonZeroU64::get)
        .map_err(|_| Error::InvalidId {
            key,
            value: value.to_string(),
        })
}

#[cfg(test)]
pub(crate) fn test_config(authorized_role: &str, thumbnail_url: Option<&str>) -> Config {
    Config {
        token: "test-token".to_string(),
        authorized_role: authorized_role.to_string(),
        guild_id: 1234,
        thumbnail_url: thumbnail_url.map(str::to_string),
        application_id: None,
    }
}
