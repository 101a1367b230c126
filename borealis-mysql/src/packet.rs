use bytes::{Bytes, BytesMut};
use enumflags2::BitFlags;

use crate::capability::Capability;

pub mod auth;
pub mod change_user;
pub mod handshake;
pub mod response;

/// Server-to-client packet body. Field presence is gated by the capability
/// flags already decided for the connection, so serialization takes them as a
/// parameter instead of storing them per packet.
pub trait ServerPacket {
    fn serialize(&self, capability: BitFlags<Capability>, buf: &mut BytesMut);
}

pub trait ServerPacketExt: ServerPacket {
    fn to_bytes(&self, capability: BitFlags<Capability>) -> Bytes {
        let mut buf = BytesMut::new();
        self.serialize(capability, &mut buf);
        buf.freeze()
    }
}

impl<T> ServerPacketExt for T where T: ServerPacket {}
