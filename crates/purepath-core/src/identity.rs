//! Private key handling and the durable slot it is cached in.
//!
//! The private key is the only thing that ties a user to their remote
//! record. It is kept in one local slot under a fixed name; an empty slot
//! means "logged out".

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{IdentityError, ValidationError};

/// Fixed name of the identity slot (file name and keyring entry).
pub const IDENTITY_SLOT_NAME: &str = "purepath_master_key";

/// Minimum key length after trimming whitespace.
pub const MIN_KEY_LEN: usize = 4;

const KEYRING_SERVICE: &str = "purepath";

/// A validated private key.
///
/// The key is kept exactly as entered; only the length check ignores
/// surrounding whitespace. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    /// Validate a user-entered key.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let actual = raw.trim().chars().count();
        if actual < MIN_KEY_LEN {
            return Err(ValidationError::IdentityTooShort {
                min: MIN_KEY_LEN,
                actual,
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 hex chars of SHA-256(key). Safe to log.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..4])
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Identity").field(&self.fingerprint()).finish()
    }
}

/// One durable key-value slot holding the private key.
pub trait IdentitySlot: Send + Sync {
    /// Read the cached key, `None` when logged out.
    fn load(&self) -> Result<Option<String>, IdentityError>;

    /// Overwrite the cached key.
    fn store(&self, key: &str) -> Result<(), IdentityError>;

    /// Remove the cached key. Clearing an empty slot is not an error.
    fn clear(&self) -> Result<(), IdentityError>;
}

/// Slot backed by a file in the data directory.
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Slot file inside `dir`. The directory is created on first store.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(IDENTITY_SLOT_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentitySlot for FileSlot {
    fn load(&self) -> Result<Option<String>, IdentityError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        // Only the trailing newline written by `store` is stripped; the key
        // itself may carry whitespace.
        let key = content.strip_suffix('\n').unwrap_or(&content);
        if key.is_empty() {
            Ok(None)
        } else {
            Ok(Some(key.to_string()))
        }
    }

    fn store(&self, key: &str) -> Result<(), IdentityError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = fs::File::create(&self.path)?;
        writeln!(file, "{}", key)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), IdentityError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Slot backed by the OS keyring.
pub struct KeyringSlot {
    service: String,
}

impl KeyringSlot {
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, IdentityError> {
        Ok(keyring::Entry::new(&self.service, IDENTITY_SLOT_NAME)?)
    }
}

impl Default for KeyringSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentitySlot for KeyringSlot {
    fn load(&self) -> Result<Option<String>, IdentityError> {
        match self.entry()?.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, key: &str) -> Result<(), IdentityError> {
        self.entry()?.set_password(key)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), IdentityError> {
        match self.entry()?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory slot. Clones share the same cell.
#[derive(Clone, Default)]
pub struct MemorySlot {
    cell: Arc<Mutex<Option<String>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: &str) -> Self {
        Self {
            cell: Arc::new(Mutex::new(Some(key.to_string()))),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl IdentitySlot for MemorySlot {
    fn load(&self) -> Result<Option<String>, IdentityError> {
        Ok(self.lock().clone())
    }

    fn store(&self, key: &str) -> Result<(), IdentityError> {
        *self.lock() = Some(key.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), IdentityError> {
        *self.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_rejects_short_keys() {
        let err = Identity::parse("abc").unwrap_err();
        assert_eq!(err, ValidationError::IdentityTooShort { min: 4, actual: 3 });
    }

    #[test]
    fn parse_measures_trimmed_length() {
        assert!(Identity::parse("  ab  ").is_err());
        assert!(Identity::parse("    ").is_err());
        assert!(Identity::parse("abcd").is_ok());
    }

    #[test]
    fn parse_keeps_key_as_entered() {
        let id = Identity::parse(" abcd ").unwrap();
        assert_eq!(id.as_str(), " abcd ");
    }

    #[test]
    fn parse_counts_characters_not_bytes() {
        assert!(Identity::parse("日本語").is_err());
        assert!(Identity::parse("日本語字").is_ok());
    }

    #[test]
    fn debug_output_hides_key() {
        let id = Identity::parse("super-secret-key").unwrap();
        let debug = format!("{:?}", id);
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains(&id.fingerprint()));
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = Identity::parse("my-key").unwrap();
        let b = Identity::parse("my-key").unwrap();
        let c = Identity::parse("other-key").unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 8);
    }

    #[test]
    fn file_slot_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let slot = FileSlot::in_dir(temp_dir.path());

        assert_eq!(slot.load().unwrap(), None);
        slot.store("my private key").unwrap();
        assert_eq!(slot.load().unwrap().as_deref(), Some("my private key"));

        slot.clear().unwrap();
        assert_eq!(slot.load().unwrap(), None);
    }

    #[test]
    fn file_slot_preserves_surrounding_whitespace() {
        let temp_dir = TempDir::new().unwrap();
        let slot = FileSlot::in_dir(temp_dir.path());
        slot.store(" spaced ").unwrap();
        assert_eq!(slot.load().unwrap().as_deref(), Some(" spaced "));
    }

    #[test]
    fn file_slot_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested/path");
        let slot = FileSlot::in_dir(&nested);

        assert!(!nested.exists());
        slot.store("abcd").unwrap();
        assert!(nested.exists());
    }

    #[test]
    fn file_slot_clear_when_empty_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let slot = FileSlot::in_dir(temp_dir.path());
        assert!(slot.clear().is_ok());
    }

    #[test]
    fn memory_slot_clones_share_state() {
        let slot = MemorySlot::new();
        let observer = slot.clone();
        slot.store("abcd").unwrap();
        assert_eq!(observer.load().unwrap().as_deref(), Some("abcd"));
        slot.clear().unwrap();
        assert_eq!(observer.load().unwrap(), None);
    }
}
