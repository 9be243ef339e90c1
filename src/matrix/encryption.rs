//! Matrix client login and encryption setup.
//!
//! [`setup_client`] returns a logged in client, either by restoring the session
//! found on disk or by logging in with the password. When the credentials hold
//! a recovery passphrase the client also takes part in end-to-end encryption:
//! - **Cross-signing**: the bot device is trusted without manual verification
//! - **Key backup and secret storage**: secrets are protected by the passphrase
//!
//! Without passphrase the bot only answers in unencrypted rooms.

use anyhow::{anyhow, bail};
use log::{debug, error, info};
use matrix_sdk::{
    Client,
    encryption::{
        BackupDownloadStrategy, EncryptionSettings,
        recovery::{RecoveryError, RecoveryState},
    },
    ruma::{OwnedUserId, api::client::uiaa},
};

use crate::matrix::{UserCredentials, session::MatrixSession};

/// Bootstraps cross-signing, authenticating with the password if the server asks for it.
async fn bootstrap_cross_signing(
    client: &Client,
    user_credentials: &UserCredentials,
) -> Result<(), anyhow::Error> {
    debug!("setting up cross signing");

    let Err(e) = client
        .encryption()
        .bootstrap_cross_signing_if_needed(None)
        .await
    else {
        debug!("cross signing already set up");
        return Ok(());
    };

    let Some(response) = e.as_uiaa_response() else {
        bail!("cross signing bootstrap failed: {:?}", e);
    };

    let mut password = uiaa::Password::new(
        uiaa::UserIdentifier::UserIdOrLocalpart(user_credentials.user_id.clone()),
        user_credentials.password.clone(),
    );
    password.session = response.session.clone();

    client
        .encryption()
        .bootstrap_cross_signing(Some(uiaa::AuthData::Password(password)))
        .await?;

    debug!("cross signing set up");
    Ok(())
}

/// Enables key backup and secret storage, accepting an existing backup.
async fn enable_recovery(client: &Client, passphrase: &str) -> Result<(), anyhow::Error> {
    debug!("enabling recovery");

    match client
        .encryption()
        .recovery()
        .enable()
        .with_passphrase(passphrase)
        .await
    {
        Ok(_) => debug!("recovery enabled"),
        Err(RecoveryError::BackupExistsOnServer) => debug!("recovery already enabled"),
        Err(e) => bail!("error enabling recovery: {:?}", e),
    }

    Ok(())
}

/// Checks that recovery is enabled and that the bot device is verified.
async fn encryption_check(client: &Client) -> Result<(), anyhow::Error> {
    if client.encryption().recovery().state() != RecoveryState::Enabled {
        error!("recovery is not enabled");
        bail!("recovery is not enabled");
    }

    let device = client
        .encryption()
        .get_own_device()
        .await?
        .ok_or_else(|| anyhow!("own device not found"))?;
    if !device.is_verified() {
        error!("device is not verified after setting up encryption");
        bail!("device is not verified after setting up encryption");
    }

    Ok(())
}

/// Creates a client for the bot account, with the SQLite store encrypted by the passphrase.
async fn build_client(
    user_id: &OwnedUserId,
    user_credentials: &UserCredentials,
    matrix_session: &MatrixSession,
) -> Result<Client, anyhow::Error> {
    let mut builder = Client::builder()
        .server_name(user_id.server_name())
        .sqlite_store(
            matrix_session.sqlite_path(),
            user_credentials.passphrase.as_deref(),
        );

    if user_credentials.passphrase.is_some() {
        builder = builder.with_encryption_settings(EncryptionSettings {
            auto_enable_cross_signing: true,
            backup_download_strategy: BackupDownloadStrategy::default(),
            auto_enable_backups: true,
        });
    }

    Ok(builder.build().await?)
}

/// Logs in with the password, sets up encryption if possible and persists the session.
///
/// # Errors
///
/// Returns an error if the login or any encryption step fails, or if the
/// session cannot be written. Nothing is persisted on failure, so the next
/// start logs in again.
async fn create_session(
    user_credentials: &UserCredentials,
    matrix_session: &MatrixSession,
) -> Result<Client, anyhow::Error> {
    let user_id: OwnedUserId = user_credentials.user_id.clone().try_into()?;
    let client = build_client(&user_id, user_credentials, matrix_session).await?;

    client
        .matrix_auth()
        .login_username(&user_id, &user_credentials.password)
        .initial_device_display_name("patchnotes bot")
        .send()
        .await?;
    debug!("logged in as {}", user_id);

    if let Some(passphrase) = &user_credentials.passphrase {
        bootstrap_cross_signing(&client, user_credentials).await?;
        enable_recovery(&client, passphrase).await?;

        debug!("trying to recover secrets");
        client.encryption().recovery().recover(passphrase).await?;
        debug!("secrets recovered");

        encryption_check(&client).await?;
    }

    let user_session = client
        .matrix_auth()
        .session()
        .ok_or_else(|| anyhow!("no session after login"))?;
    matrix_session
        .persist_user_session(&user_session)
        .await
        .map_err(|e| anyhow!("error persisting user session: {:?}", e))?;

    info!("matrix client setup complete");
    Ok(client)
}

/// Restores the session found on disk and imports the encryption secrets if possible.
///
/// The SQLite store must be the one the session was created with: it holds the
/// device keys of the bot.
///
/// # Errors
///
/// Returns an error if:
/// - There is no session on disk
/// - The homeserver rejects the stored access token
/// - Secret storage cannot be opened with the passphrase
async fn restore_session(
    user_credentials: &UserCredentials,
    matrix_session: &MatrixSession,
) -> Result<Client, anyhow::Error> {
    info!("restoring matrix session from disk");

    let user_id: OwnedUserId = user_credentials.user_id.clone().try_into()?;
    let client = build_client(&user_id, user_credentials, matrix_session).await?;

    let user_session = matrix_session
        .user_session()
        .ok_or_else(|| anyhow!("no session to restore"))?;
    client.restore_session(user_session.clone()).await?;

    if let Some(passphrase) = &user_credentials.passphrase {
        let secret_store = client
            .encryption()
            .secret_storage()
            .open_secret_store(passphrase)
            .await?;
        secret_store.import_secrets().await?;

        encryption_check(&client).await?;
    }

    info!("matrix session restored successfully");
    Ok(client)
}

/// Returns a logged in client for `user_credentials`.
///
/// This is the entry point for obtaining a Matrix client. It picks the path
/// from what is found on disk:
///
/// **New session (no session file):**
/// - Logs in with the password
/// - With a passphrase: bootstraps cross-signing, enables key backup and
///   recovers the secrets
/// - Persists the session for the next start
///
/// **Existing session:**
/// - Restores the session from disk
/// - With a passphrase: imports the secrets from secret storage
///
/// # Arguments
///
/// * `user_credentials` - User ID, password and optional recovery passphrase
/// * `matrix_session` - Session manager for persisting and restoring the login
///
/// # Returns
///
/// An authenticated [`Client`]. When a passphrase is set, its device is
/// cross-signed and recovery is enabled.
///
/// # Errors
///
/// Returns an error if:
/// - The user ID is invalid or the client cannot be built
/// - The login or the session restoration fails
/// - The encryption setup or its final check fails
///
/// # Examples
///
/// ```ignore
/// let credentials = UserCredentials {
///     user_id: "@patchnotes:example.com".to_string(),
///     password: "password".to_string(),
///     passphrase: None,
/// };
/// let session = MatrixSession::new("./data/session").await;
/// let client = setup_client(&credentials, &session).await?;
/// ```
pub async fn setup_client(
    user_credentials: &UserCredentials,
    matrix_session: &MatrixSession,
) -> Result<Client, anyhow::Error> {
    info!(
        "setting up matrix client for user {}",
        user_credentials.user_id
    );

    if matrix_session.has_session() {
        restore_session(user_credentials, matrix_session).await
    } else {
        create_session(user_credentials, matrix_session).await
    }
}
