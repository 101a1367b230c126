use bytes::BytesMut;
use enumflags2::BitFlags;

use crate::{
    capability::Capability,
    mysql::{write_int1, write_int2, write_int4, write_null_terminated},
    packet::ServerPacket,
    scramble::SCRAMBLE_LENGTH,
    PROTOCOL_VERSION, SERVER_VERSION, STATUS_AUTOCOMMIT, UTF8_CHARSET_ID,
};

/// Default authentication plugin; also the only password scheme the server
/// verifies itself.
pub const NATIVE_PASSWORD_PLUGIN: &str = "mysql_native_password";

/// Seed length equals the scramble transform output, split 8 + 12 across the
/// two auth-plugin-data parts of the handshake.
pub const SEED_LENGTH: usize = SCRAMBLE_LENGTH;

/// Protocol::HandshakeV10, the first packet of every connection.
#[derive(Debug)]
pub struct Handshake {
    pub connection_id: u32,
    pub seed: [u8; SEED_LENGTH],
}

impl ServerPacket for Handshake {
    fn serialize(&self, capability: BitFlags<Capability>, buf: &mut BytesMut) {
        write_int1(buf, PROTOCOL_VERSION);
        write_null_terminated(buf, SERVER_VERSION.as_bytes());
        write_int4(buf, self.connection_id);
        buf.extend_from_slice(&self.seed[..8]);
        write_int1(buf, 0);
        write_int2(buf, capability.bits() as u16);
        write_int1(buf, UTF8_CHARSET_ID);
        write_int2(buf, STATUS_AUTOCOMMIT);
        write_int2(buf, (capability.bits() >> 16) as u16);
        if capability.contains(Capability::PluginAuth) {
            // total auth plugin data length, both parts plus terminator
            write_int1(buf, SEED_LENGTH as u8 + 1);
        } else {
            write_int1(buf, 0);
        }
        buf.extend_from_slice(&[0; 10]);
        if capability.contains(Capability::SecureConnection) {
            buf.extend_from_slice(&self.seed[8..]);
            write_int1(buf, 0);
        }
        if capability.contains(Capability::PluginAuth) {
            write_null_terminated(buf, NATIVE_PASSWORD_PLUGIN.as_bytes());
        }
    }
}

/// Protocol::AuthSwitchRequest, asking the client to redo authentication with
/// the named plugin. The challenge data is the connection's existing seed for
/// the password scheme, or scheme-specific bytes for others.
#[derive(Debug)]
pub struct AuthSwitchRequest<'a> {
    pub plugin_name: &'a str,
    pub data: &'a [u8],
}

impl ServerPacket for AuthSwitchRequest<'_> {
    fn serialize(&self, _capability: BitFlags<Capability>, buf: &mut BytesMut) {
        write_int1(buf, 0xFE);
        write_null_terminated(buf, self.plugin_name.as_bytes());
        buf.extend_from_slice(self.data);
        write_int1(buf, 0);
    }
}
