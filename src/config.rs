//! Configuration file structures for the Patchnotes bot.
//!
//! The configuration is a YAML file split into three sections: the Matrix
//! account, the changelog to publish and the command settings.
//!
//! ```yaml
//! matrix:
//!   # Fully qualified Matrix user ID for the bot account
//!   user_id: "@patchnotes:matrix.org"
//!   # Matrix account password
//!   password: "secret-password"
//!   # E2EE recovery passphrase, omit it to run without encryption recovery
//!   passphrase: "recovery-passphrase"
//!   # Display name of the bot, defaults to "Patchnotes"
//!   display_name: "Patchnotes"
//!   # PNG avatar uploaded when the account has none
//!   avatar: "./avatar.png"
//!
//! changelog:
//!   # JSON changelog, newest entry first
//!   path: "./changelog.json"
//!
//! bot:
//!   # Character starting every command, defaults to '!'
//!   prefix: "!"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Every value can be overridden with a `PATCHNOTES_` environment variable,
//! nested keys being separated by `__`:
//!
//! ```bash
//! export PATCHNOTES_MATRIX__PASSWORD="secret-from-env"
//! export PATCHNOTES_CHANGELOG__PATH="/srv/bot/changelog.json"
//! ```

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

/// Prefix of the environment variables overriding the configuration file.
const ENV_PREFIX: &str = "PATCHNOTES_";

/// Root configuration structure for the Patchnotes bot.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Matrix account configuration
    pub matrix: Matrix,
    /// Changelog configuration
    pub changelog: Changelog,
    /// Command settings
    #[serde(default)]
    pub bot: BotSettings,
}

/// Matrix account configuration.
#[derive(Debug, Deserialize)]
pub struct Matrix {
    /// Fully qualified Matrix user ID, e.g. `@patchnotes:matrix.org`.
    pub user_id: String,

    /// Matrix account password.
    ///
    /// Used for the first login only, the session is persisted afterwards.
    pub password: String,

    /// E2EE recovery passphrase.
    ///
    /// When set, the bot bootstraps cross-signing and key backup so it can
    /// talk in encrypted rooms. It also encrypts the local SQLite store.
    pub passphrase: Option<String>,

    /// Display name of the bot account.
    #[serde(default = "default_display_name")]
    pub display_name: String,

    /// Path to a PNG file used as avatar when the account has none.
    pub avatar: Option<String>,
}

/// Changelog configuration.
#[derive(Debug, Deserialize)]
pub struct Changelog {
    /// Path to the JSON changelog file.
    pub path: String,
}

/// Command settings.
#[derive(Debug, Deserialize)]
pub struct BotSettings {
    /// Character starting every command.
    #[serde(default = "default_prefix")]
    pub prefix: char,
}

impl Default for BotSettings {
    fn default() -> Self {
        BotSettings {
            prefix: default_prefix(),
        }
    }
}

fn default_display_name() -> String {
    "Patchnotes".to_owned()
}

fn default_prefix() -> char {
    '!'
}

impl Config {
    /// Loads the configuration from the YAML file at `path`, with
    /// `PATCHNOTES_` environment variables taking precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, or if a
    /// required value is missing from both the file and the environment.
    pub fn load(path: &str) -> Result<Self, anyhow::Error> {
        let config = Figment::new()
            .merge(Yaml::file_exact(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }
}
