use bytes::BytesMut;
use enumflags2::BitFlags;

use crate::{
    capability::Capability,
    mysql::{write_int1, write_int2, write_length_encoded_int},
    packet::ServerPacket,
    STATUS_AUTOCOMMIT,
};

/// OK_Packet, reporting success of the preceding exchange.
#[derive(Debug, Default)]
pub struct OkPacket {
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub warnings: u16,
}

impl ServerPacket for OkPacket {
    fn serialize(&self, capability: BitFlags<Capability>, buf: &mut BytesMut) {
        write_int1(buf, 0x00);
        write_length_encoded_int(buf, self.affected_rows);
        write_length_encoded_int(buf, self.last_insert_id);
        if capability.contains(Capability::Protocol41) {
            write_int2(buf, STATUS_AUTOCOMMIT);
            write_int2(buf, self.warnings);
        }
    }
}

/// EOF_Packet, kept for clients not declaring `DEPRECATE_EOF`.
#[derive(Debug, Default)]
pub struct EofPacket {
    pub warnings: u16,
}

impl ServerPacket for EofPacket {
    fn serialize(&self, capability: BitFlags<Capability>, buf: &mut BytesMut) {
        write_int1(buf, 0xFE);
        if capability.contains(Capability::Protocol41) {
            write_int2(buf, self.warnings);
            write_int2(buf, STATUS_AUTOCOMMIT);
        }
    }
}

/// ERR_Packet with its MySQL error code and SQL state.
#[derive(Debug)]
pub struct ErrPacket {
    pub code: u16,
    pub sqlstate: &'static str,
    pub message: String,
}

impl ErrPacket {
    /// ER_ACCESS_DENIED_ERROR. One generic message for unknown user and wrong
    /// password alike, so failed attempts cannot enumerate accounts.
    pub fn access_denied(user: &str, host: &str, using_password: bool) -> Self {
        Self {
            code: 1045,
            sqlstate: "28000",
            message: format!(
                "Access denied for user '{user}'@'{host}' (using password: {})",
                if using_password { "YES" } else { "NO" }
            ),
        }
    }

    /// ER_NOT_SUPPORTED_AUTH_MODE, for malformed handshake responses and
    /// capability mismatches.
    pub fn not_supported_auth_mode() -> Self {
        Self {
            code: 1251,
            sqlstate: "08004",
            message: "Client does not support authentication protocol requested by server; \
                      consider upgrading MySQL client"
                .into(),
        }
    }

    /// ER_PLUGIN_IS_NOT_LOADED, naming the missing plugin.
    pub fn plugin_not_loaded(plugin: &str) -> Self {
        Self {
            code: 1524,
            sqlstate: "HY000",
            message: format!("Plugin '{plugin}' is not loaded"),
        }
    }

    /// ER_BAD_DB_ERROR, carrying the catalog's own error text.
    pub fn bad_database(message: impl Into<String>) -> Self {
        Self {
            code: 1049,
            sqlstate: "42000",
            message: message.into(),
        }
    }

    /// ER_UNKNOWN_ERROR.
    pub fn unknown_error(message: impl Into<String>) -> Self {
        Self {
            code: 1105,
            sqlstate: "HY000",
            message: message.into(),
        }
    }
}

impl ServerPacket for ErrPacket {
    fn serialize(&self, capability: BitFlags<Capability>, buf: &mut BytesMut) {
        write_int1(buf, 0xFF);
        write_int2(buf, self.code);
        if capability.contains(Capability::Protocol41) {
            write_int1(buf, b'#');
            buf.extend_from_slice(self.sqlstate.as_bytes());
        }
        buf.extend_from_slice(self.message.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{capability::server_capability, packet::ServerPacketExt};

    #[test]
    fn ok_packet_bytes() {
        let bytes = OkPacket::default().to_bytes(server_capability());
        assert_eq!(&bytes[..], &[0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn eof_packet_carries_warnings_and_status() {
        let bytes = EofPacket { warnings: 3 }.to_bytes(server_capability());
        assert_eq!(&bytes[..], &[0xFE, 0x03, 0x00, 0x02, 0x00]);
    }

    #[test]
    fn eof_packet_without_protocol41_is_bare() {
        let bytes = EofPacket::default().to_bytes(BitFlags::from_flag(Capability::LongPassword));
        assert_eq!(&bytes[..], &[0xFE]);
    }

    #[test]
    fn err_packet_carries_code_and_sqlstate() {
        let bytes =
            ErrPacket::access_denied("root", "10.1.1.1", true).to_bytes(server_capability());
        assert_eq!(bytes[0], 0xFF);
        assert_eq!(u16::from_le_bytes([bytes[1], bytes[2]]), 1045);
        assert_eq!(bytes[3], b'#');
        assert_eq!(&bytes[4..9], b"28000");
        assert_eq!(
            &bytes[9..],
            b"Access denied for user 'root'@'10.1.1.1' (using password: YES)"
        );
    }

    #[test]
    fn err_packet_without_protocol41_omits_sqlstate() {
        let bytes = ErrPacket::not_supported_auth_mode()
            .to_bytes(BitFlags::from_flag(Capability::LongPassword));
        assert_eq!(bytes[0], 0xFF);
        assert_ne!(bytes[3], b'#');
    }
}
