//! Authentication state for the client.
//!
//! This module provides:
//! - `SessionStore`: the single source of truth for who is signed in
//! - `SessionStorage`: the persistence boundary, with file, keychain and
//!   in-memory backends
//!
//! The session is a bearer token plus the user record it was issued for.
//! Both are persisted together and cleared together.

pub mod error;
pub mod keychain;
pub mod session;
pub mod storage;

pub use error::{SessionError, StorageError};
pub use keychain::KeyringStorage;
pub use session::{Session, SessionState, SessionStore, TOKEN_KEY, USER_KEY};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
