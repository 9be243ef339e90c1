//! Matrix client wrapper for bot messaging and synchronization.
//!
//! This module provides a high-level [`MatrixClient`] interface that wraps the
//! Matrix SDK client and handles replies, synchronization, and session management.

use log::{error, info, warn};
use matrix_sdk::{
    Client,
    ruma::{
        EventId, RoomId, UserId,
        events::room::message::{
            AddMentions, ForwardThread, ReplyMetadata, RoomMessageEventContent,
        },
    },
};

use crate::{
    commands::Response,
    matrix::{
        Profile, UserCredentials,
        embed::update_content,
        encryption::setup_client,
        reply::{DeliveryError, Replier, ReplyTarget},
        session::MatrixSession,
        sync::{IncomingMessage, MatrixSync},
    },
};

/// High-level Matrix client for bot messaging operations.
pub struct MatrixClient {
    /// Synchronization service for handling real-time events
    matrix_sync: MatrixSync,
    /// Underlying Matrix SDK client
    client: Client,
}

impl MatrixClient {
    /// Creates and initializes a new Matrix client.
    ///
    /// This method performs the complete initialization workflow:
    /// 1. Reads the session stored in `session_path`, if any
    /// 2. Restores it or logs in (see [`setup_client`])
    /// 3. Applies the display name and, when the account has none, the avatar of `profile`
    ///
    /// # Errors
    ///
    /// Returns an error if the login or the encryption setup fails, or if the
    /// display name cannot be set. A failed avatar upload is only logged.
    pub async fn new(
        user_credentials: &UserCredentials,
        session_path: &str,
        profile: &Profile,
    ) -> Result<Self, anyhow::Error> {
        let matrix_session = MatrixSession::new(session_path).await;

        let client = setup_client(user_credentials, &matrix_session)
            .await
            .inspect_err(|e| error!("failed to setup matrix client: {:?}", e))?;

        client
            .account()
            .set_display_name(Some(&profile.display_name))
            .await?;

        if let Some(avatar) = &profile.avatar
            && client.account().get_avatar_url().await?.is_none()
            && let Err(e) = client
                .account()
                .upload_avatar(&mime::IMAGE_PNG, avatar.clone())
                .await
        {
            warn!("failed to upload avatar: {:?}", e);
        }

        let matrix_sync = MatrixSync::new(&client, &matrix_session);

        Ok(MatrixClient {
            matrix_sync,
            client,
        })
    }

    /// Starts the Matrix synchronization loop.
    ///
    /// Invokes `on_message` for each new text message of a joined room. Never
    /// returns under normal operation.
    ///
    /// # Errors
    ///
    /// Returns the error which stopped the sync loop.
    pub async fn sync<F>(&self, on_message: F) -> Result<(), anyhow::Error>
    where
        F: Fn(IncomingMessage) + Send + Sync + 'static,
    {
        self.matrix_sync
            .sync(on_message)
            .await
            .inspect_err(|e| error!("matrix sync ended with error: {:?}", e))?;

        info!("matrix sync ended successfully");
        Ok(())
    }

    /// Builds the content of `response` as a reply to `target`.
    fn reply_content(
        target: &ReplyTarget,
        response: &Response,
    ) -> Result<RoomMessageEventContent, DeliveryError> {
        let sender = UserId::parse(&target.sender_id)
            .map_err(|_| DeliveryError::InvalidId(target.sender_id.clone()))?;
        let event = EventId::parse(&target.event_id)
            .map_err(|_| DeliveryError::InvalidId(target.event_id.clone()))?;

        let content = match response {
            Response::Markdown(body) => RoomMessageEventContent::text_markdown(body),
            Response::Update(update) => update_content(update),
        };

        Ok(content.make_reply_to(
            ReplyMetadata::new(&event, &sender, None),
            ForwardThread::No,
            AddMentions::No,
        ))
    }
}

impl Replier for MatrixClient {
    /// Sends `response` as a reply to the `target` message.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::InvalidId`] if an ID of the target is malformed
    /// - [`DeliveryError::RoomNotFound`] if the bot is not in the room
    /// - [`DeliveryError::Send`] if the homeserver did not accept the message
    async fn reply(&self, target: &ReplyTarget, response: &Response) -> Result<(), DeliveryError> {
        let content = Self::reply_content(target, response)?;

        let room_id = RoomId::parse(&target.room_id)
            .map_err(|_| DeliveryError::InvalidId(target.room_id.clone()))?;
        let room = self
            .client
            .get_room(&room_id)
            .ok_or_else(|| DeliveryError::RoomNotFound(target.room_id.clone()))?;

        room.send(content).await.map_err(DeliveryError::Send)?;

        Ok(())
    }
}
