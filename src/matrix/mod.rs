//! Matrix protocol integration for the bot.
//!
//! The module is structured around the [`MatrixClient`] which coordinates:
//! - **Session**: login, session persistence and restoration
//! - **Encryption**: optional cross-signing and key backup recovery
//! - **Sync**: invitations and incoming text messages
//! - **Replies**: Markdown replies and changelog embeds, see [`Replier`]
//!
//! ```ignore
//! let credentials = UserCredentials {
//!     user_id: "@patchnotes:example.com".to_string(),
//!     password: "password".to_string(),
//!     passphrase: Some("recovery phrase".to_string()),
//! };
//! let profile = Profile { display_name: "Patchnotes".to_string(), avatar: None };
//! let client = MatrixClient::new(&credentials, "./data/session", &profile).await?;
//! ```

mod client;
mod embed;
mod encryption;
mod reply;
mod session;
mod sync;

pub use crate::matrix::client::MatrixClient;
pub use crate::matrix::reply::{DeliveryError, Replier, ReplyTarget};
pub use crate::matrix::sync::IncomingMessage;

#[cfg(test)]
pub use crate::matrix::reply::MockReplier;

/// User credentials for a Matrix account
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// User ID of the matrix account
    pub user_id: String,
    /// Password of the matrix account
    pub password: String,
    /// Passphrase to recover the matrix account secrets, if encryption is used
    pub passphrase: Option<String>,
}

/// Public profile of the bot account
#[derive(Debug, Clone)]
pub struct Profile {
    /// Display name shown in rooms
    pub display_name: String,
    /// PNG avatar, uploaded only when the account has none
    pub avatar: Option<Vec<u8>>,
}
