//! Reply delivery.
//!
//! [`Replier`] is the seam between command handling and the Matrix client:
//! the bot only needs something able to answer a message, which lets the
//! respond path be tested without a homeserver.

use std::{error::Error, fmt};

use mockall::automock;

use crate::commands::Response;

/// Message being answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
    /// Room where the message was sent
    pub room_id: String,
    /// User who sent the message
    pub sender_id: String,
    /// Event ID of the message
    pub event_id: String,
}

/// Failure to deliver a reply. Never retried.
#[derive(Debug)]
pub enum DeliveryError {
    /// A room, user or event ID of the target is not a valid Matrix ID
    InvalidId(String),
    /// The bot is not in the target room
    RoomNotFound(String),
    /// The homeserver rejected or did not receive the message
    Send(matrix_sdk::Error),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::InvalidId(id) => write!(f, "invalid matrix id {}", id),
            DeliveryError::RoomNotFound(room_id) => write!(f, "room {} not found", room_id),
            DeliveryError::Send(e) => write!(f, "failed to send message: {}", e),
        }
    }
}

impl Error for DeliveryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DeliveryError::Send(e) => Some(e),
            _ => None,
        }
    }
}

/// Something able to answer a chat message.
#[automock]
pub trait Replier {
    /// Sends `response` as a reply to `target`.
    async fn reply(&self, target: &ReplyTarget, response: &Response) -> Result<(), DeliveryError>;
}
