//! Credential store
//!
//! Holds the live credential snapshot and mirrors it into settings storage.
//! Updates swap the whole snapshot, so readers never see a mix of old and new fields.

use crate::models::Credentials;
use crate::services::store::{
    KeyValueStore, KEY_ACCOUNT_SID, KEY_AUTH_TOKEN, KEY_FROM_NUMBER, KEY_TO_NUMBER,
};
use crate::utils::logging::mask;
use anyhow::Result;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

pub struct CredentialStore {
    storage: Arc<dyn KeyValueStore>,
    current: RwLock<Arc<Credentials>>,
}

impl CredentialStore {
    /// Load credentials from storage. Absent keys become empty strings.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let credentials = Credentials {
            account_id: storage.get_or(KEY_ACCOUNT_SID, ""),
            auth_secret: storage.get_or(KEY_AUTH_TOKEN, ""),
            sender: storage.get_or(KEY_FROM_NUMBER, ""),
            recipient: storage.get_or(KEY_TO_NUMBER, ""),
        };

        let missing = credentials.missing_fields();
        if !missing.is_empty() {
            warn!("Twilio settings are not fully configured (missing: {})", missing.join(", "));
        }

        Self {
            storage,
            current: RwLock::new(Arc::new(credentials)),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<Credentials> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace all four fields and persist them
    pub fn update(&self, credentials: Credentials) -> Arc<Credentials> {
        self.storage.put(KEY_ACCOUNT_SID, &credentials.account_id);
        self.storage.put(KEY_AUTH_TOKEN, &credentials.auth_secret);
        self.storage.put(KEY_FROM_NUMBER, &credentials.sender);
        self.storage.put(KEY_TO_NUMBER, &credentials.recipient);

        let snapshot = Arc::new(credentials);
        match self.current.write() {
            Ok(mut guard) => *guard = snapshot.clone(),
            Err(poisoned) => *poisoned.into_inner() = snapshot.clone(),
        }

        info!("Twilio settings updated (account {})", mask(&snapshot.account_id));
        snapshot
    }

    /// Reset all four fields to empty
    pub fn clear(&self) -> Arc<Credentials> {
        let snapshot = self.update(Credentials::default());
        info!("Twilio credentials cleared");
        snapshot
    }

    /// Read an import document and apply it
    pub fn import_from(&self, path: &Path) -> Result<Arc<Credentials>> {
        let credentials = Credentials::import_file(path)?;
        info!("Imported settings from {:?}", path);
        Ok(self.update(credentials))
    }

    /// Write the current snapshot as a pretty-printed export document
    pub fn export_to(&self, path: &Path) -> Result<()> {
        self.snapshot().export_file(path)?;
        info!("Settings exported to {:?}", path);
        Ok(())
    }
}
