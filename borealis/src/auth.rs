use std::fmt;

use async_trait::async_trait;
use borealis_mysql::scramble::two_stage_hash;

use crate::{config::AuthConfig, error::AuthenticationError, session::UserIdentity};

pub mod kerberos;
pub mod plain;

pub use kerberos::KerberosProvider;
pub use plain::PlainPasswordProvider;

/// Authentication schemes the server knows how to drive. The wire carries
/// these as plugin-name strings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display, strum::EnumString)]
pub enum AuthPlugin {
    #[strum(serialize = "mysql_native_password")]
    MysqlNativePassword,
    #[strum(serialize = "authentication_kerberos_client")]
    KerberosClient,
}

/// Authority-held material needed to verify one identity's claim. Owned by
/// the external identity authority; read-only here.
#[derive(Debug, Clone)]
pub struct AuthenticationInfo {
    /// Resolved canonical identity applied to the session on success.
    pub identity: UserIdentity,
    pub plugin: AuthPlugin,
    /// Two-stage hash of the account password; empty for password-less
    /// accounts.
    pub stored_hash: Vec<u8>,
    /// Scheme-specific material, e.g. the expected kerberos principal.
    pub text: Option<String>,
}

impl AuthenticationInfo {
    pub fn plain_password(identity: UserIdentity, password: &str) -> Self {
        Self {
            identity,
            plugin: AuthPlugin::MysqlNativePassword,
            stored_hash: two_stage_hash(password),
            text: None,
        }
    }

    pub fn kerberos(identity: UserIdentity, principal: impl Into<String>) -> Self {
        Self {
            identity,
            plugin: AuthPlugin::KerberosClient,
            stored_hash: Vec::new(),
            text: Some(principal.into()),
        }
    }
}

/// A pluggable credential verifier. New schemes implement this trait without
/// touching the negotiator.
#[async_trait]
pub trait AuthenticationProvider: fmt::Debug + Send + Sync {
    /// Enforces the password policy on a plaintext password at credential
    /// creation time.
    fn validate_password(&self, password: &str) -> Result<(), AuthenticationError>;

    /// Verifies a client challenge response against the authority-held
    /// material, using the connection's seed. Strict accept/reject; reasons
    /// are for server-side logs only.
    async fn authenticate(
        &self,
        user: &str,
        remote_ip: &str,
        auth_response: &[u8],
        seed: &[u8],
        info: &AuthenticationInfo,
    ) -> Result<(), AuthenticationError>;
}

/// Provider registry. Returns `None` when the scheme is not enabled by
/// configuration.
pub fn provider_for(
    plugin: AuthPlugin,
    config: &AuthConfig,
) -> Option<Box<dyn AuthenticationProvider>> {
    match plugin {
        AuthPlugin::MysqlNativePassword => Some(Box::new(PlainPasswordProvider::new(config))),
        AuthPlugin::KerberosClient if config.enable_kerberos => {
            Some(Box::new(KerberosProvider::new(config)))
        }
        AuthPlugin::KerberosClient => None,
    }
}
