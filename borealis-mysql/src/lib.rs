#![warn(missing_debug_implementations)]

pub mod capability;
pub mod error;
pub mod mysql;
pub mod packet;
#[cfg(feature = "protocol")]
pub mod protocol;
pub mod scramble;
mod utils;

/// Protocol::HandshakeV10 version byte.
pub const PROTOCOL_VERSION: u8 = 0x0A;
/// Version string advertised in the handshake packet. Clients and drivers
/// parse it to pick feature branches, so it must look like a MySQL version.
pub const SERVER_VERSION: &str = "8.0.33-borealis";
/// utf8_general_ci, the charset id announced in the handshake.
pub const UTF8_CHARSET_ID: u8 = 33;
/// SERVER_STATUS_AUTOCOMMIT.
pub const STATUS_AUTOCOMMIT: u16 = 0x0002;
