use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage data is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}

#[derive(Error, Debug)]
pub enum SessionError {
    /// Persisted entries exist but the user record cannot be parsed.
    /// Recovered by starting signed out; never shown to the user.
    #[error("Persisted session is malformed: {0}")]
    MalformedPersistedSession(#[source] serde_json::Error),

    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),
}
