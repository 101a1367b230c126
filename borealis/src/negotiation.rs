//! Connection-phase authentication: the handshake exchange for fresh
//! connections and the COM_CHANGE_USER exchange for established ones.
//!
//! Every failure is a typed [`AuthenticationError`]; [`error_packet`] is the
//! single place mapping one to its wire answer (or to none, when the peer is
//! already gone).

use std::io;

use borealis_mysql::{
    capability::{is_compatible, server_capability, Capability},
    packet::{
        auth::{AuthPacket, AuthSwitchResponse},
        change_user::ChangeUserPacket,
        handshake::{AuthSwitchRequest, Handshake, NATIVE_PASSWORD_PLUGIN, SEED_LENGTH},
        response::{ErrPacket, OkPacket},
        ServerPacketExt,
    },
    protocol::{read_packet, write_packet},
};
use enumflags2::BitFlags;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, warn};

use crate::{
    auth::{provider_for, AuthPlugin, KerberosProvider},
    authority::IdentityAuthority,
    config::AuthConfig,
    error::AuthenticationError,
    session::SessionAuthState,
};

/// How a negotiation exchange ended. `Rejected` means the client was answered
/// with an ERR packet; `Disconnected` means it went away first.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NegotiationOutcome {
    Authenticated,
    Rejected,
    Disconnected,
}

/// Runs the full handshake exchange on a fresh connection: send the
/// handshake, read the client response, optionally switch plugins, verify the
/// credential, switch to the requested database and answer OK or ERR.
///
/// On success the session carries the committed identity and negotiated
/// capability. A failed database switch still leaves the verified identity in
/// place; the client keeps the connection and can retry with `USE`.
pub async fn negotiate(
    mut connection: impl AsyncRead + AsyncWrite + Unpin,
    session: &mut SessionAuthState,
    authority: &dyn IdentityAuthority,
    config: &AuthConfig,
) -> io::Result<NegotiationOutcome> {
    let mut sequence = 0;
    session.seed = generate_seed();
    let handshake = Handshake {
        connection_id: session.connection_id,
        seed: session.seed,
    };
    write_packet(
        &mut connection,
        &mut sequence,
        &handshake.to_bytes(server_capability()),
    )
    .await?;

    let Some(body) = read_packet(&mut connection, &mut sequence).await? else {
        let error = AuthenticationError::ConnectionClosed;
        warn!(connection_id = session.connection_id, %error, "handshake aborted");
        return answer_failure(
            &mut connection,
            &mut sequence,
            server_capability(),
            &error,
            "",
            &session.remote_ip,
            false,
        )
        .await;
    };
    let packet = match AuthPacket::deserialize(&body) {
        Ok(packet) => packet,
        Err(parse_error) => {
            let error = AuthenticationError::MalformedPacket(parse_error);
            warn!(connection_id = session.connection_id, %error, "handshake rejected");
            return answer_failure(
                &mut connection,
                &mut sequence,
                server_capability(),
                &error,
                "",
                &session.remote_ip,
                false,
            )
            .await;
        }
    };
    if !is_compatible(server_capability(), packet.capability) {
        let error = AuthenticationError::CapabilityMismatch;
        warn!(
            connection_id = session.connection_id,
            client_capability = packet.capability.bits(),
            %error,
            "handshake rejected"
        );
        return answer_failure(
            &mut connection,
            &mut sequence,
            server_capability(),
            &error,
            &packet.username,
            &session.remote_ip,
            false,
        )
        .await;
    }

    let mut auth_response = packet.auth_response;
    let plugin_name = packet.plugin_name.as_deref().unwrap_or(NATIVE_PASSWORD_PLUGIN);
    if plugin_name != NATIVE_PASSWORD_PLUGIN {
        // The client opened with a plugin the server does not default to:
        // either hand it the kerberos challenge or switch it back to the
        // password scheme with the same seed.
        let switch = if plugin_name.parse() == Ok(AuthPlugin::KerberosClient) {
            if !config.enable_kerberos {
                let error = AuthenticationError::PluginNotLoaded(plugin_name.into());
                warn!(
                    connection_id = session.connection_id,
                    user = packet.username,
                    %error,
                    "kerberos requested but not enabled"
                );
                return answer_failure(
                    &mut connection,
                    &mut sequence,
                    server_capability(),
                    &error,
                    &packet.username,
                    &session.remote_ip,
                    false,
                )
                .await;
            }
            let challenge = match KerberosProvider::new(config)
                .build_challenge(&packet.username, &session.remote_ip)
            {
                Ok(challenge) => challenge,
                Err(error) => {
                    warn!(connection_id = session.connection_id, %error, "challenge build failed");
                    return answer_failure(
                        &mut connection,
                        &mut sequence,
                        server_capability(),
                        &error,
                        &packet.username,
                        &session.remote_ip,
                        false,
                    )
                    .await;
                }
            };
            AuthSwitchRequest {
                plugin_name,
                data: &challenge,
            }
            .to_bytes(server_capability())
        } else {
            AuthSwitchRequest {
                plugin_name: NATIVE_PASSWORD_PLUGIN,
                data: &session.seed,
            }
            .to_bytes(server_capability())
        };
        write_packet(&mut connection, &mut sequence, &switch).await?;
        let Some(body) = read_packet(&mut connection, &mut sequence).await? else {
            let error = AuthenticationError::ConnectionClosed;
            warn!(
                connection_id = session.connection_id,
                user = packet.username,
                %error,
                "plugin switch aborted"
            );
            return answer_failure(
                &mut connection,
                &mut sequence,
                server_capability(),
                &error,
                &packet.username,
                &session.remote_ip,
                false,
            )
            .await;
        };
        auth_response = AuthSwitchResponse::deserialize(&body).auth_response;
    }

    session.capability = server_capability();
    if let Err(error) =
        verify_identity(session, authority, config, &packet.username, &auth_response).await
    {
        warn!(
            connection_id = session.connection_id,
            user = packet.username,
            %error,
            "authentication failed"
        );
        return answer_failure(
            &mut connection,
            &mut sequence,
            session.capability,
            &error,
            &packet.username,
            &session.remote_ip,
            !auth_response.is_empty(),
        )
        .await;
    }

    if let Some(database) = packet.database.as_deref().filter(|db| !db.is_empty()) {
        if let Err(err) = authority.switch_database(session, database).await {
            warn!(
                connection_id = session.connection_id,
                user = packet.username,
                database,
                %err,
                "database switch failed"
            );
            let err = ErrPacket::bad_database(err.to_string()).to_bytes(session.capability);
            write_packet(&mut connection, &mut sequence, &err).await?;
            return Ok(NegotiationOutcome::Rejected);
        }
    }

    let ok = OkPacket::default().to_bytes(session.capability);
    write_packet(&mut connection, &mut sequence, &ok).await?;
    info!(
        connection_id = session.connection_id,
        user = session.qualified_user,
        "authenticated"
    );
    Ok(NegotiationOutcome::Authenticated)
}

/// Handles a COM_CHANGE_USER body (after the command byte): re-authenticates
/// the connection as another identity using the handshake's seed.
///
/// The attempt is transactional. Any failure, including a failed database
/// switch, restores the identity, qualified user, resource group and
/// capability the connection had before the command.
pub async fn change_user(
    mut connection: impl AsyncWrite + Unpin,
    body: &[u8],
    session: &mut SessionAuthState,
    authority: &dyn IdentityAuthority,
    config: &AuthConfig,
) -> io::Result<NegotiationOutcome> {
    // The command packet consumed sequence id 0.
    let mut sequence = 1;
    let snapshot = session.snapshot();
    let previous_user = session.qualified_user.clone();
    session.capability = server_capability();

    let packet = match ChangeUserPacket::deserialize(session.capability, body) {
        Ok(packet) => packet,
        Err(parse_error) => {
            let error = AuthenticationError::MalformedPacket(parse_error);
            warn!(connection_id = session.connection_id, %error, "change user rejected");
            session.restore(snapshot);
            return answer_failure(
                &mut connection,
                &mut sequence,
                session.capability,
                &error,
                "",
                &session.remote_ip,
                false,
            )
            .await;
        }
    };

    if let Err(error) =
        verify_identity(session, authority, config, &packet.username, &packet.auth_response).await
    {
        warn!(
            connection_id = session.connection_id,
            from = previous_user,
            to = packet.username,
            %error,
            "change user failed"
        );
        session.restore(snapshot);
        return answer_failure(
            &mut connection,
            &mut sequence,
            session.capability,
            &error,
            &packet.username,
            &session.remote_ip,
            !packet.auth_response.is_empty(),
        )
        .await;
    }

    if !packet.database.is_empty() {
        if let Err(err) = authority.switch_database(session, &packet.database).await {
            warn!(
                connection_id = session.connection_id,
                from = previous_user,
                to = packet.username,
                database = packet.database,
                %err,
                "change user database switch failed"
            );
            session.restore(snapshot);
            let err = ErrPacket::bad_database(err.to_string()).to_bytes(session.capability);
            write_packet(&mut connection, &mut sequence, &err).await?;
            return Ok(NegotiationOutcome::Rejected);
        }
    }

    info!(
        connection_id = session.connection_id,
        from = previous_user,
        to = session.qualified_user,
        "changed user"
    );
    let ok = OkPacket::default().to_bytes(session.capability);
    write_packet(&mut connection, &mut sequence, &ok).await?;
    Ok(NegotiationOutcome::Authenticated)
}

/// Resolves the claimed user, runs its provider and commits the identity to
/// the session on success. Under the legacy flag the identity is committed
/// even on failure, while the failure is still reported.
async fn verify_identity(
    session: &mut SessionAuthState,
    authority: &dyn IdentityAuthority,
    config: &AuthConfig,
    username: &str,
    auth_response: &[u8],
) -> Result<(), AuthenticationError> {
    if username.is_empty() {
        return Err(AuthenticationError::UnknownUser {
            user: username.into(),
            host: session.remote_ip.clone(),
        });
    }
    let info = authority
        .resolve_authentication_info(username, &session.remote_ip)
        .await
        .ok_or_else(|| AuthenticationError::UnknownUser {
            user: username.into(),
            host: session.remote_ip.clone(),
        })?;
    let provider = provider_for(info.plugin, config)
        .ok_or_else(|| AuthenticationError::PluginNotLoaded(info.plugin.to_string()))?;
    let verified = provider
        .authenticate(
            username,
            &session.remote_ip,
            auth_response,
            &session.seed,
            &info,
        )
        .await;
    if verified.is_ok() || config.legacy_identity_update {
        session.qualified_user = info.identity.user.clone();
        session.current_identity = Some(info.identity);
    }
    verified
}

/// Writes the wire answer for a failure and reports the outcome. A failure
/// with no answer (the peer disconnected) ends the exchange silently.
async fn answer_failure(
    connection: &mut (impl AsyncWrite + Unpin),
    sequence: &mut u8,
    capability: BitFlags<Capability>,
    error: &AuthenticationError,
    username: &str,
    remote_ip: &str,
    using_password: bool,
) -> io::Result<NegotiationOutcome> {
    match error_packet(error, username, remote_ip, using_password) {
        Some(packet) => {
            write_packet(connection, sequence, &packet.to_bytes(capability)).await?;
            Ok(NegotiationOutcome::Rejected)
        }
        None => Ok(NegotiationOutcome::Disconnected),
    }
}

/// Maps a failure to its wire answer. Malformed responses and capability
/// mismatches read as an unsupported auth mode; a missing plugin is named;
/// unknown users and bad credentials share one generic denial; a vanished
/// peer gets nothing.
fn error_packet(
    error: &AuthenticationError,
    username: &str,
    remote_ip: &str,
    using_password: bool,
) -> Option<ErrPacket> {
    match error {
        AuthenticationError::ConnectionClosed => None,
        AuthenticationError::MalformedPacket(_) | AuthenticationError::CapabilityMismatch => {
            Some(ErrPacket::not_supported_auth_mode())
        }
        AuthenticationError::PluginNotLoaded(plugin) => Some(ErrPacket::plugin_not_loaded(plugin)),
        AuthenticationError::ChallengeBuild { .. } => {
            Some(ErrPacket::unknown_error(error.to_string()))
        }
        _ => Some(ErrPacket::access_denied(username, remote_ip, using_password)),
    }
}

/// Random printable seed bytes. Clients parse the second seed part as a
/// NUL-terminated string, so a zero byte inside it would truncate it.
fn generate_seed() -> [u8; SEED_LENGTH] {
    rand::random::<[u8; SEED_LENGTH]>().map(|b| b % 94 + 33)
}
