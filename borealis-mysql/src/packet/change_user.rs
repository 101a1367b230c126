use enumflags2::BitFlags;

use crate::{
    capability::Capability,
    error::ParseError,
    mysql::{
        read_fixed_bytes, read_int1, read_int2, read_length_encoded_bytes, read_null_terminated,
        read_string,
    },
};

/// COM_CHANGE_USER command byte.
pub const COM_CHANGE_USER: u8 = 0x11;

/// COM_CHANGE_USER body (after the command byte): a mid-session
/// re-authentication as a different identity.
///
/// Unlike the handshake response, this packet is parsed under the
/// capability flags already negotiated for the connection.
#[derive(Debug)]
pub struct ChangeUserPacket {
    pub username: String,
    pub auth_response: Vec<u8>,
    pub database: String,
    pub charset: Option<u16>,
    pub plugin_name: Option<String>,
}

impl ChangeUserPacket {
    pub fn deserialize(
        capability: BitFlags<Capability>,
        mut buf: &[u8],
    ) -> Result<Self, ParseError> {
        let buf = &mut buf;
        let username = read_string(buf)?;
        let auth_response = if capability.contains(Capability::PluginAuthLenencClientData) {
            read_length_encoded_bytes(buf)?.to_vec()
        } else if capability.contains(Capability::SecureConnection) {
            let len = read_int1(buf)? as usize;
            read_fixed_bytes(buf, len)?.to_vec()
        } else {
            read_null_terminated(buf)?.to_vec()
        };
        let database = read_string(buf)?;
        let charset = (buf.len() >= 2).then(|| read_int2(buf)).transpose()?;
        let plugin_name = (capability.contains(Capability::PluginAuth) && !buf.is_empty())
            .then(|| read_string(buf))
            .transpose()?;
        Ok(Self {
            username,
            auth_response,
            database,
            charset,
            plugin_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mysql::{write_int1, write_int2, write_null_terminated};

    fn body(auth_response: &[u8], database: &str, tail: impl FnOnce(&mut Vec<u8>)) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_null_terminated(&mut bytes, b"replica");
        write_int1(&mut bytes, auth_response.len() as u8);
        bytes.extend_from_slice(auth_response);
        write_null_terminated(&mut bytes, database.as_bytes());
        tail(&mut bytes);
        bytes
    }

    #[test]
    fn minimal_body() {
        let capability = Capability::Protocol41 | Capability::SecureConnection;
        let bytes = body(b"twenty-bytes-of-data", "", |_| {});
        let packet = ChangeUserPacket::deserialize(capability, &bytes).unwrap();
        assert_eq!(packet.username, "replica");
        assert_eq!(packet.auth_response, b"twenty-bytes-of-data");
        assert_eq!(packet.database, "");
        assert_eq!(packet.charset, None);
        assert_eq!(packet.plugin_name, None);
    }

    #[test]
    fn charset_and_plugin_tail() {
        let capability =
            Capability::Protocol41 | Capability::SecureConnection | Capability::PluginAuth;
        let bytes = body(b"", "metrics", |bytes| {
            write_int2(bytes, 33);
            write_null_terminated(bytes, b"mysql_native_password");
        });
        let packet = ChangeUserPacket::deserialize(capability, &bytes).unwrap();
        assert_eq!(packet.database, "metrics");
        assert_eq!(packet.charset, Some(33));
        assert_eq!(packet.plugin_name.as_deref(), Some("mysql_native_password"));
    }

    #[test]
    fn null_terminated_response_without_secure_connection() {
        let capability = BitFlags::from_flag(Capability::Protocol41);
        let mut bytes = Vec::new();
        write_null_terminated(&mut bytes, b"replica");
        write_null_terminated(&mut bytes, b"response");
        write_null_terminated(&mut bytes, b"");
        let packet = ChangeUserPacket::deserialize(capability, &bytes).unwrap();
        assert_eq!(packet.auth_response, b"response");
    }

    #[test]
    fn truncated_body_is_rejected() {
        let capability = Capability::Protocol41 | Capability::SecureConnection;
        let mut bytes = Vec::new();
        write_null_terminated(&mut bytes, b"replica");
        write_int1(&mut bytes, 20);
        bytes.extend_from_slice(b"only-ten-b");
        assert!(ChangeUserPacket::deserialize(capability, &bytes).is_err());
    }
}
