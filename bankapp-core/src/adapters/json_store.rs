//! JSON file credential store
//!
//! Credentials live in `credentials.json` in the data directory:
//! ```json
//! { "version": 1, "credentials": [ { "user_id": "...", "pin": { "scheme": "argon2", ... } } ] }
//! ```
//! Every write goes through a temp file in the same directory followed by a
//! rename, so a crash never leaves a half-written file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::apply_effect_to;
use crate::domain::result::{Error, Result};
use crate::domain::{AuthEffect, UserCredential};
use crate::ports::CredentialStore;

const FILE_NAME: &str = "credentials.json";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialsFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    credentials: Vec<UserCredential>,
}

fn default_version() -> u32 {
    FORMAT_VERSION
}

/// Credential store backed by a JSON file
#[derive(Debug)]
pub struct JsonCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonCredentialStore {
    /// Open the store in `data_dir`; the file is created on first write
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(FILE_NAME),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<CredentialsFile> {
        if !self.path.exists() {
            return Ok(CredentialsFile {
                version: FORMAT_VERSION,
                credentials: Vec::new(),
            });
        }
        let content = fs::read_to_string(&self.path)?;
        let file: CredentialsFile = serde_json::from_str(&content)?;
        if file.version > FORMAT_VERSION {
            return Err(Error::storage(format!(
                "{} has unsupported version {}",
                self.path.display(),
                file.version
            )));
        }
        Ok(file)
    }

    fn store(&self, file: &CredentialsFile) -> Result<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| Error::storage("credentials path has no parent directory"))?;
        fs::create_dir_all(dir)?;

        let content = serde_json::to_string_pretty(file)?;
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn modify<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<UserCredential>) -> Result<()>,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        let mut file = self.load()?;
        change(&mut file.credentials)?;
        file.version = FORMAT_VERSION;
        self.store(&file)
    }
}

impl CredentialStore for JsonCredentialStore {
    fn fetch_credential(&self, user_id: Uuid) -> Result<Option<UserCredential>> {
        Ok(self
            .load()?
            .credentials
            .into_iter()
            .find(|c| c.user_id == user_id))
    }

    fn list_credentials(&self) -> Result<Vec<UserCredential>> {
        let mut credentials = self.load()?.credentials;
        credentials.sort_by_key(|c| c.created_at);
        Ok(credentials)
    }

    fn save_credential(&self, credential: &UserCredential) -> Result<()> {
        self.modify(|credentials| {
            match credentials.iter_mut().find(|c| c.user_id == credential.user_id) {
                Some(existing) => *existing = credential.clone(),
                None => credentials.push(credential.clone()),
            }
            Ok(())
        })
    }

    fn apply_effect(&self, effect: &AuthEffect) -> Result<()> {
        self.modify(|credentials| apply_effect_to(credentials, effect))
    }
}
