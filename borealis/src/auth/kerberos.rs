use async_trait::async_trait;
use bytes::{BufMut, BytesMut};
use subtle::ConstantTimeEq;

use crate::{
    auth::{AuthPlugin, AuthenticationInfo, AuthenticationProvider},
    config::AuthConfig,
    error::AuthenticationError,
};

/// Verifier for `authentication_kerberos_client` accounts. The server never
/// sees a password here; the client answers the challenge with a ticket that
/// must match the principal registered for the account.
#[derive(Debug)]
pub struct KerberosProvider {
    service_principal: Option<String>,
}

impl KerberosProvider {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            service_principal: config.kerberos_service_principal.clone(),
        }
    }

    /// Builds the challenge data sent in the plugin-switch request: the
    /// service principal, the claimed user and the peer address, each
    /// NUL-separated.
    pub fn build_challenge(
        &self,
        user: &str,
        remote_ip: &str,
    ) -> Result<Vec<u8>, AuthenticationError> {
        let principal =
            self.service_principal
                .as_deref()
                .ok_or_else(|| AuthenticationError::ChallengeBuild {
                    plugin: AuthPlugin::KerberosClient.to_string(),
                    reason: "no service principal configured".into(),
                })?;
        let mut data = BytesMut::new();
        data.put_slice(principal.as_bytes());
        data.put_u8(0);
        data.put_slice(user.as_bytes());
        data.put_u8(0);
        data.put_slice(remote_ip.as_bytes());
        Ok(data.to_vec())
    }
}

#[async_trait]
impl AuthenticationProvider for KerberosProvider {
    fn validate_password(&self, _password: &str) -> Result<(), AuthenticationError> {
        // Ticket-based accounts carry no plaintext password to police.
        Ok(())
    }

    async fn authenticate(
        &self,
        _user: &str,
        _remote_ip: &str,
        auth_response: &[u8],
        _seed: &[u8],
        info: &AuthenticationInfo,
    ) -> Result<(), AuthenticationError> {
        if auth_response.is_empty() {
            return Err(AuthenticationError::TicketRejected);
        }
        let expected = info
            .text
            .as_deref()
            .ok_or(AuthenticationError::TicketRejected)?;
        if auth_response.ct_eq(expected.as_bytes()).into() {
            Ok(())
        } else {
            Err(AuthenticationError::TicketRejected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::UserIdentity;

    const PRINCIPAL: &str = "borealis/fe@EXAMPLE.COM";

    fn provider() -> KerberosProvider {
        KerberosProvider::new(&AuthConfig::default().enable_kerberos(PRINCIPAL))
    }

    #[test]
    fn challenge_names_principal_user_and_peer() {
        let data = provider().build_challenge("alice", "10.1.1.1").unwrap();
        assert_eq!(
            data,
            b"borealis/fe@EXAMPLE.COM\0alice\010.1.1.1".to_vec()
        );
    }

    #[test]
    fn challenge_requires_a_configured_principal() {
        let provider = KerberosProvider::new(&AuthConfig::default());
        assert!(matches!(
            provider.build_challenge("alice", "10.1.1.1"),
            Err(AuthenticationError::ChallengeBuild { .. })
        ));
    }

    #[tokio::test]
    async fn ticket_must_match_the_account_principal() {
        let info = AuthenticationInfo::kerberos(
            UserIdentity::new("alice", "%"),
            "alice@EXAMPLE.COM",
        );
        provider()
            .authenticate("alice", "10.1.1.1", b"alice@EXAMPLE.COM", &[], &info)
            .await
            .unwrap();
        assert!(matches!(
            provider()
                .authenticate("alice", "10.1.1.1", b"mallory@EXAMPLE.COM", &[], &info)
                .await,
            Err(AuthenticationError::TicketRejected)
        ));
        assert!(matches!(
            provider()
                .authenticate("alice", "10.1.1.1", b"", &[], &info)
                .await,
            Err(AuthenticationError::TicketRejected)
        ));
    }
}
