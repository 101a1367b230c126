use async_trait::async_trait;

use crate::{auth::AuthenticationInfo, error::BoxedError, session::SessionAuthState};

/// The identity backend the negotiator asks about users and databases. The
/// catalog behind it (metadata service, tests' in-memory map) is out of the
/// negotiator's sight.
#[async_trait]
pub trait IdentityAuthority: Send + Sync {
    /// Resolves the claimed user against the peer address, returning the
    /// material needed to verify the claim. `None` means no matching account;
    /// the caller answers with the same generic denial as a bad credential.
    async fn resolve_authentication_info(
        &self,
        user: &str,
        remote_ip: &str,
    ) -> Option<AuthenticationInfo>;

    /// Switches the session's current database, enforcing existence and
    /// access checks. Runs after the identity was committed.
    async fn switch_database(
        &self,
        session: &mut SessionAuthState,
        database: &str,
    ) -> Result<(), BoxedError>;
}
