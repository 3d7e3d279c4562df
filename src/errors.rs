//! Error type shared by the parser and the store.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthorizedKeysError>;

#[derive(Debug, Error)]
pub enum AuthorizedKeysError {
    /// A key being added has no comment to address it by.
    #[error("cannot add ssh key without comment")]
    MissingComment,

    /// A key being added reuses a comment already present in the file,
    /// or one used earlier in the same call.
    #[error("cannot add duplicate ssh key: {0}")]
    DuplicateKey(String),

    #[error("cannot delete non existent key: {0}")]
    KeyNotFound(String),

    /// The delete would leave the file without a single key entry.
    #[error("cannot delete all keys")]
    WouldDeleteAllKeys,

    #[error("invalid key format")]
    InvalidFormat,

    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
