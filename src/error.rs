use crate::hashing::Hash;

/// Enum intended to represent all the different error types that there could be.
///
/// Every stage of a clone surfaces one of these variants; nothing is swallowed
/// on the way up to the entry point.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("packfile error: {0}")]
    Pack(String),
    #[error("pack checksum mismatch: computed {computed}, trailer says {stored}")]
    Checksum { computed: Hash, stored: Hash },
    #[error("ref-delta base {0} is not present in this pack")]
    UnresolvedDelta(Hash),
    #[error("ofs-delta objects are not supported")]
    UnsupportedDelta,
    #[error("delta error: {0}")]
    Delta(String),
    #[error("corrupted object: {0}")]
    CorruptedObject(String),
    #[error("object {0} already stored with different content")]
    CorruptedStore(Hash),
    #[error("invalid tree entry mode {0:o}")]
    InvalidMode(u32),
    #[error("i/o operation error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn protocol(msg: impl Into<String>) -> Self {
        Error::Protocol(msg.into())
    }

    pub fn pack(msg: impl Into<String>) -> Self {
        Error::Pack(msg.into())
    }

    pub fn delta(msg: impl Into<String>) -> Self {
        Error::Delta(msg.into())
    }

    pub fn corrupted(msg: impl Into<String>) -> Self {
        Error::CorruptedObject(msg.into())
    }
}

/// Abstraction of the result type where the error is always an Error from this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
