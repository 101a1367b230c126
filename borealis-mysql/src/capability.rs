use enumflags2::{bitflags, BitFlags};

/// Client/server capability flags negotiated during the handshake. The server
/// advertises [`server_capability`]; the client echoes a subset, and the
/// negotiated value gates which optional packet fields are present.
#[bitflags]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
#[non_exhaustive]
pub enum Capability {
    LongPassword = 0x0000_0001,
    FoundRows = 0x0000_0002,
    LongFlag = 0x0000_0004,
    ConnectWithDb = 0x0000_0008,
    NoSchema = 0x0000_0010,
    Compress = 0x0000_0020,
    Odbc = 0x0000_0040,
    LocalFiles = 0x0000_0080,
    IgnoreSpace = 0x0000_0100,
    Protocol41 = 0x0000_0200,
    Interactive = 0x0000_0400,
    Ssl = 0x0000_0800,
    IgnoreSigpipe = 0x0000_1000,
    Transactions = 0x0000_2000,
    Reserved = 0x0000_4000,
    SecureConnection = 0x0000_8000,
    MultiStatements = 0x0001_0000,
    MultiResults = 0x0002_0000,
    PsMultiResults = 0x0004_0000,
    PluginAuth = 0x0008_0000,
    ConnectAttrs = 0x0010_0000,
    PluginAuthLenencClientData = 0x0020_0000,
    CanHandleExpiredPasswords = 0x0040_0000,
    SessionTrack = 0x0080_0000,
    DeprecateEof = 0x0100_0000,
}

/// Capabilities advertised by the server. Static per server build; the
/// negotiated flags for a connection are fixed once the handshake completes.
pub fn server_capability() -> BitFlags<Capability> {
    Capability::LongPassword
        | Capability::FoundRows
        | Capability::LongFlag
        | Capability::ConnectWithDb
        | Capability::NoSchema
        | Capability::Odbc
        | Capability::LocalFiles
        | Capability::IgnoreSpace
        | Capability::Protocol41
        | Capability::Interactive
        | Capability::IgnoreSigpipe
        | Capability::Transactions
        | Capability::SecureConnection
        | Capability::MultiStatements
        | Capability::MultiResults
        | Capability::PsMultiResults
        | Capability::PluginAuth
        | Capability::ConnectAttrs
        | Capability::PluginAuthLenencClientData
}

/// A client is compatible when it speaks the 4.1 protocol and every flag it
/// declares is inside the server's advertised set.
pub fn is_compatible(server: BitFlags<Capability>, client: BitFlags<Capability>) -> bool {
    client.contains(Capability::Protocol41) && server.contains(client)
}
