use std::io;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
#[error("Packet too big to be sent ({0} bytes) - maximum is 16MiB")]
pub struct PacketTooBig(pub usize);

/// Length-encoded integer with the reserved 0xFB tag. Distinct from a zero
/// value; callers must not treat it as 0.
#[derive(Debug, thiserror::Error)]
#[error("Unexpected null length-encoded value")]
pub struct NullError;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Null(#[from] NullError),
}
