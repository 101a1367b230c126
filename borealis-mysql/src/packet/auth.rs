use enumflags2::BitFlags;

use crate::{
    capability::Capability,
    error::ParseError,
    mysql::{
        read_fixed_bytes, read_int1, read_int4, read_length_encoded_bytes, read_null_terminated,
        read_remaining, read_string,
    },
    utils::invalid_data,
};

/// Protocol::HandshakeResponse41, the client's answer to the handshake.
///
/// The auth response supports three encodings selected by the client's own
/// capability flags: length-prefixed (`PLUGIN_AUTH_LENENC_CLIENT_DATA`),
/// one-byte length (`SECURE_CONNECTION`) or null-terminated (pre-4.1.1
/// clients). Database and plugin name presence are gated by two independent
/// capability bits.
#[derive(Debug)]
pub struct AuthPacket {
    pub capability: BitFlags<Capability>,
    pub max_packet_size: u32,
    pub charset: u8,
    pub username: String,
    pub auth_response: Vec<u8>,
    pub database: Option<String>,
    pub plugin_name: Option<String>,
}

impl AuthPacket {
    pub fn deserialize(mut buf: &[u8]) -> Result<Self, ParseError> {
        let buf = &mut buf;
        let capability = BitFlags::from_bits_truncate(read_int4(buf)?);
        if !capability.contains(Capability::Protocol41) {
            return Err(invalid_data("Pre-4.1 handshake response").into());
        }
        let max_packet_size = read_int4(buf)?;
        let charset = read_int1(buf)?;
        read_fixed_bytes(buf, 23)?;
        let username = read_string(buf)?;
        let auth_response = if capability.contains(Capability::PluginAuthLenencClientData) {
            read_length_encoded_bytes(buf)?.to_vec()
        } else if capability.contains(Capability::SecureConnection) {
            let len = read_int1(buf)? as usize;
            read_fixed_bytes(buf, len)?.to_vec()
        } else {
            read_null_terminated(buf)?.to_vec()
        };
        let database = capability
            .contains(Capability::ConnectWithDb)
            .then(|| read_string(buf))
            .transpose()?;
        let plugin_name = capability
            .contains(Capability::PluginAuth)
            .then(|| read_string(buf))
            .transpose()?;
        // connect attributes and zstd level may follow; not consumed here
        read_remaining(buf);
        Ok(Self {
            capability,
            max_packet_size,
            charset,
            username,
            auth_response,
            database,
            plugin_name,
        })
    }
}

/// Protocol::AuthSwitchResponse; the whole body is the new auth response.
#[derive(Debug)]
pub struct AuthSwitchResponse {
    pub auth_response: Vec<u8>,
}

impl AuthSwitchResponse {
    pub fn deserialize(mut buf: &[u8]) -> Self {
        Self {
            auth_response: read_remaining(&mut buf).to_vec(),
        }
    }
}
