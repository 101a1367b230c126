pub use borealis_mysql::error::*;

/// Negotiation and verification failures. Unknown-user and credential
/// mismatches are collapsed into one generic wire message when answered;
/// the finer-grained variants exist for server-side logs only.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Malformed authentication packet: {0}")]
    MalformedPacket(#[from] ParseError),
    #[error("Client capability flags are incompatible with the server")]
    CapabilityMismatch,
    #[error("Authentication plugin '{0}' is not loaded")]
    PluginNotLoaded(String),
    #[error("Unknown user {user}@{host}")]
    UnknownUser { user: String, host: String },
    #[error("Password length mismatch")]
    PasswordLengthMismatch,
    #[error("Password mismatch")]
    PasswordMismatch,
    #[error("Kerberos ticket rejected")]
    TicketRejected,
    #[error("Password is too short, minimum length is {min}")]
    PasswordTooShort { min: usize },
    #[error(
        "Password should contains at least one digit, one lowercase letter and one uppercase letter"
    )]
    PasswordComposition,
    #[error("Failed to build '{plugin}' challenge: {reason}")]
    ChallengeBuild { plugin: String, reason: String },
    #[error("Client closed the connection during negotiation")]
    ConnectionClosed,
}
