use std::fmt;

use borealis_mysql::{capability::Capability, packet::handshake::SEED_LENGTH};
use enumflags2::BitFlags;

/// A resolved canonical identity, e.g. `'alice'@'%'`. Distinct from the raw
/// claim a client presents: it only exists after verification accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user: String,
    pub host: String,
}

impl UserIdentity {
    pub fn new(user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
        }
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'@'{}'", self.user, self.host)
    }
}

/// Per-connection authentication state, owned exclusively by the connection's
/// negotiation task. The negotiator mutates it transactionally: a rejected
/// change-user restores the pre-attempt snapshot.
#[derive(Debug)]
pub struct SessionAuthState {
    pub connection_id: u32,
    pub remote_ip: String,
    /// Negotiated capability flags; immutable for the connection's lifetime
    /// except across a successful re-authentication.
    pub capability: BitFlags<Capability>,
    /// Challenge seed sent in the handshake, reused (not regenerated) by
    /// change-user on the same connection.
    pub seed: [u8; SEED_LENGTH],
    pub current_identity: Option<UserIdentity>,
    pub qualified_user: String,
    pub resource_group: Option<String>,
    pub database: String,
}

impl SessionAuthState {
    pub fn new(connection_id: u32, remote_ip: impl Into<String>) -> Self {
        Self {
            connection_id,
            remote_ip: remote_ip.into(),
            capability: BitFlags::empty(),
            seed: [0; SEED_LENGTH],
            current_identity: None,
            qualified_user: String::new(),
            resource_group: None,
            database: String::new(),
        }
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            capability: self.capability,
            current_identity: self.current_identity.clone(),
            qualified_user: self.qualified_user.clone(),
            resource_group: self.resource_group.clone(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: SessionSnapshot) {
        self.capability = snapshot.capability;
        self.current_identity = snapshot.current_identity;
        self.qualified_user = snapshot.qualified_user;
        self.resource_group = snapshot.resource_group;
    }
}

/// Value copy of the fields a failed change-user must put back.
#[derive(Debug)]
pub(crate) struct SessionSnapshot {
    capability: BitFlags<Capability>,
    current_identity: Option<UserIdentity>,
    qualified_user: String,
    resource_group: Option<String>,
}
