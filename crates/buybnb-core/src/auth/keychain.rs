use keyring::Entry;

use super::{SessionStorage, StorageError};

const SERVICE_NAME: &str = "buybnb";

/// Session entries kept in the OS keychain, one credential per key.
#[derive(Debug, Clone)]
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, StorageError> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStorage for KeyringStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::session::tests::{ana, RecordingNavigator};
    use crate::auth::SessionStore;

    #[test]
    fn test_keyring_round_trip() {
        let storage = KeyringStorage::with_service(format!("buybnb-test-{}", std::process::id()));

        // Hosts without a usable keychain (e.g. sandboxed CI) reject the write
        if let Err(e) = storage.set("token", "tok123") {
            eprintln!("skipping, no platform keychain: {}", e);
            return;
        }

        // A fresh storage value must see what the first one wrote
        let reopened = KeyringStorage::with_service(storage.service.clone());
        assert_eq!(reopened.get("token").unwrap().as_deref(), Some("tok123"));

        storage.remove("token").unwrap();
        assert_eq!(reopened.get("token").unwrap(), None);

        // Removing an absent entry is not an error
        storage.remove("token").unwrap();
    }

    #[test]
    fn test_keyring_backed_session_stays_signed_in() {
        let service = format!("buybnb-session-test-{}", std::process::id());
        if let Err(e) = KeyringStorage::with_service(service.clone()).set("marker", "1") {
            eprintln!("skipping, no platform keychain: {}", e);
            return;
        }

        let store = SessionStore::new(
            Box::new(KeyringStorage::with_service(service.clone())),
            Arc::new(RecordingNavigator::default()),
        );
        store.initialize();
        store.login("tok123", ana()).unwrap();

        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("tok123"));

        store.logout();
        assert!(!store.is_authenticated());
        KeyringStorage::with_service(service).remove("marker").unwrap();
    }
}
