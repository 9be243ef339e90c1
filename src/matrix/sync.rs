//! Matrix client synchronization and event handling.
//!
//! The [`MatrixSync::sync`] method:
//! 1. Registers the auto-join handler for invitations
//! 2. Performs an initial sync, so messages sent while the bot was offline are skipped
//! 3. Registers the message handler and enters the sync loop, persisting the
//!    sync token after each response

use std::sync::Arc;

use anyhow::Result;
use log::{error, info, warn};
use matrix_sdk::{
    Client, LoopCtrl, Room, RoomState,
    config::SyncSettings,
    ruma::{
        api::client::filter::FilterDefinition,
        events::room::{
            member::StrippedRoomMemberEvent,
            message::{MessageType, OriginalSyncRoomMessageEvent},
        },
    },
};
use tokio::time::{Duration, sleep};

use crate::matrix::{reply::ReplyTarget, session::MatrixSession};

/// Longest wait between two attempts to join a room, in seconds.
const MAX_JOIN_DELAY: u64 = 3600;

/// A text message received in a joined room.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Text of the message
    pub body: String,
    /// Where to answer the message
    pub target: ReplyTarget,
}

/// Manages Matrix client synchronization and event processing.
///
/// Wraps a Matrix [`Client`] and handles the whole synchronization lifecycle:
/// - Initial sync, joining the rooms the bot was invited to while offline
/// - Continuous sync loop delivering new text messages
/// - Sync token persistence, so a restart resumes where the bot stopped
pub struct MatrixSync {
    /// The matrix client
    client: Client,
    /// The matrix session, for sync token persistence
    session: MatrixSession,
}

impl MatrixSync {
    /// Creates a new MatrixSync instance. Call [`MatrixSync::sync`] to start syncing.
    ///
    /// # Arguments
    ///
    /// * `client` - A logged in Matrix client
    /// * `session` - The session holding the sync token of the previous run
    pub fn new(client: &Client, session: &MatrixSession) -> Self {
        MatrixSync {
            client: client.to_owned(),
            session: session.to_owned(),
        }
    }

    /// Syncs forever, calling `on_message` for each new text message.
    ///
    /// Messages sent by the bot itself are not passed to `on_message`, nor are
    /// the messages received before the initial sync completed.
    ///
    /// # Arguments
    ///
    /// * `on_message` - Called from the SDK event handler for every new text
    ///   message of a joined room. It must not block: long work belongs in a
    ///   spawned task.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let matrix_sync = MatrixSync::new(&client, &session);
    /// matrix_sync
    ///     .sync(|message| println!("{}: {}", message.target.sender_id, message.body))
    ///     .await?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the sync loop fails. Sync token persistence errors
    /// are only logged.
    pub async fn sync<F>(&self, on_message: F) -> Result<()>
    where
        F: Fn(IncomingMessage) + Send + Sync + 'static,
    {
        info!("start syncing");

        self.client.add_event_handler(auto_join_rooms);

        // Lazy-load room members
        // See <https://spec.matrix.org/v1.6/client-server-api/#lazy-loading-room-members>.
        let filter = FilterDefinition::with_lazy_loading();
        let mut sync_settings = SyncSettings::default().filter(filter.into());

        if let Some(sync_token) = self.session.sync_token() {
            sync_settings = sync_settings.token(sync_token);
        }

        // Initial sync: joins pending invitations without answering old messages
        loop {
            match self.client.sync_once(sync_settings.clone()).await {
                Ok(response) => {
                    sync_settings = sync_settings.token(response.next_batch.clone());
                    self.persist_sync_token(response.next_batch).await;
                    break;
                }
                Err(e) => {
                    error!("an error occurred during initial sync: {e}, trying again");
                    sleep(Duration::from_secs(1)).await;
                }
            }
        }

        let on_message = Arc::new(on_message);
        self.client.add_event_handler({
            let on_message = Arc::clone(&on_message);
            move |event: OriginalSyncRoomMessageEvent, room: Room, client: Client| {
                let on_message = Arc::clone(&on_message);
                async move { on_room_message(event, room, client, on_message.as_ref()) }
            }
        });

        self.client
            .sync_with_result_callback(sync_settings, |sync_result| async move {
                let response = sync_result?;
                self.persist_sync_token(response.next_batch).await;
                Ok(LoopCtrl::Continue)
            })
            .await?;

        Ok(())
    }

    async fn persist_sync_token(&self, sync_token: String) {
        if let Err(e) = self.session.persist_sync_token(sync_token).await {
            error!("failed to persist sync token: {:?}", e);
        }
    }
}

/// Joins rooms the bot is invited to.
///
/// Joining is retried with a doubling delay because synapse can send the
/// invite before the room accepts the join.
/// See <https://github.com/matrix-org/synapse/issues/4345>.
async fn auto_join_rooms(room_member: StrippedRoomMemberEvent, client: Client, room: Room) {
    let Some(user_id) = client.user_id() else {
        warn!("could not get user id from client");
        return;
    };

    if room_member.state_key != user_id {
        return;
    }

    tokio::spawn(async move {
        info!("auto joining room {}", room.room_id());
        let mut delay = 2;

        while let Err(err) = room.join().await {
            error!(
                "failed to join room {} ({err:?}), retrying in {delay}s",
                room.room_id()
            );

            sleep(Duration::from_secs(delay)).await;
            delay *= 2;

            if delay > MAX_JOIN_DELAY {
                error!("can't join room {} ({err:?})", room.room_id());
                return;
            }
        }
        info!("successfully joined room {}", room.room_id());
    });
}

/// Passes text messages of joined rooms, not sent by the bot, to `on_message`.
fn on_room_message<F>(event: OriginalSyncRoomMessageEvent, room: Room, client: Client, on_message: &F)
where
    F: Fn(IncomingMessage),
{
    if room.state() != RoomState::Joined {
        return;
    }

    if client.user_id() == Some(&*event.sender) {
        return;
    }

    let MessageType::Text(text_content) = event.content.msgtype else {
        return;
    };

    on_message(IncomingMessage {
        body: text_content.body,
        target: ReplyTarget {
            room_id: room.room_id().to_string(),
            sender_id: event.sender.to_string(),
            event_id: event.event_id.to_string(),
        },
    });
}
