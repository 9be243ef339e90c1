//! Patchnotes - A Matrix bot publishing the latest entry of a changelog.
//!
//! # Overview
//!
//! Users type `!updates` in any room the bot has joined and get back the
//! newest release of the changelog file, formatted as an embed: a colored
//! title, the publication date, the new features, the bug fixes and the
//! backend changes.
//!
//! # Changelog File
//!
//! A JSON document with the releases ordered newest first:
//!
//! ```json
//! {
//!   "updates": [
//!     {
//!       "version": "1.2",
//!       "title": "Fast Mode",
//!       "date": "2024-01-01",
//!       "features": ["Speed boost"],
//!       "fixes": [],
//!       "backend": []
//!     }
//!   ]
//! }
//! ```
//!
//! The file is read again on every command, so publishing a release is only
//! a matter of editing it.
//!
//! # Usage
//!
//! ```bash
//! patchnotes --config config.yaml --data ./patchnotes-data
//! # Check how the latest entry renders, without connecting to Matrix
//! patchnotes --config config.yaml --data ./patchnotes-data --preview
//! ```
//!
//! # Bot Commands
//!
//! - `!updates` - Show the latest changelog entry
//! - `!help` - List the commands
//!
//! # Architecture
//!
//! - [`bot`] - Wiring of the Matrix sync loop to the commands
//! - [`changelog`] - Changelog model, loading and rendering
//! - [`commands`] - Command parsing and execution
//! - [`config`] - YAML configuration with environment variable overrides
//! - [`matrix`] - Matrix client, session, encryption and replies
//! - [`utils`] - Path helpers
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)
//! - `PATCHNOTES_*` - Override configuration values, see [`config`]

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use crate::{
    bot::Bot,
    changelog::{ChangelogLoader, RenderedUpdate, render},
    config::Config,
};

mod bot;
mod changelog;
mod commands;
mod config;
mod matrix;
mod utils;

/// Command-line arguments for the Patchnotes bot.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file.
    #[arg(short, long)]
    config: String,

    /// Path to the directory for storing persistent data.
    ///
    /// Holds the Matrix session (`session/`): access tokens and, when a
    /// passphrase is configured, encryption keys. Keep it private.
    #[arg(short, long)]
    data: String,

    /// Print the rendered latest changelog entry and exit.
    #[arg(short, long)]
    preview: bool,
}

#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting patchnotes {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load config file: {}", e);
            std::process::exit(1);
        }
    };

    if args.preview {
        let changelog = ChangelogLoader::new(&config.changelog.path);
        match changelog.load().await.and_then(|document| render(&document)) {
            Ok(update) => println!("{}", format_preview(&update)),
            Err(e) => {
                error!("Failed to render changelog: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let bot = match Bot::new(config, &args).await {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to initialize bot: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = bot.start().await {
        error!("Bot stopped: {:?}", e);
        std::process::exit(1);
    }
}

/// Terminal rendering of an update.
fn format_preview(update: &RenderedUpdate) -> String {
    format!(
        "{}\n\n{}\n\n[color #{:06X}] {}",
        update.title,
        update.body.trim_end(),
        update.color,
        update.timestamp.to_rfc3339()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_args_preview_flag() {
        let args =
            Args::try_parse_from(["patchnotes", "-c", "config.yaml", "-d", "data", "--preview"])
                .unwrap();

        assert_eq!(args.config, "config.yaml");
        assert_eq!(args.data, "data");
        assert!(args.preview);
    }

    #[test]
    fn test_args_data_is_required() {
        assert!(Args::try_parse_from(["patchnotes", "--config", "config.yaml"]).is_err());
    }

    #[test]
    fn test_format_preview() {
        let update = RenderedUpdate {
            title: "🎉 Atualização v1.2: Fast Mode".to_string(),
            body: "*Publicado em: 2024-01-01*\n".to_string(),
            color: 0x57F287,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        };

        assert_eq!(
            format_preview(&update),
            "🎉 Atualização v1.2: Fast Mode\n\n*Publicado em: 2024-01-01*\n\n[color #57F287] 2024-01-02T00:00:00+00:00"
        );
    }
}
