// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault lifecycle: create, open, mutate, save and close.
//!
//! The credential set is only ever held in memory sealed:
//! - Every operation decrypts it into a short-lived buffer, applies one change
//!   and reseals it under a fresh nonce.
//! - Opening a vault from disk draws a new salt, re-derives the key and
//!   reseals, so no salt or nonce outlives a session.
//! - A vault read from a legacy layout is marked dirty and written back in the
//!   current layout by the next [`Vault::save`].

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use lockbox_config::{GeneratorConfig, VaultConfig};
use lockbox_core::{Credential, LockboxError};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::{self, NONCE_LEN};
use crate::filelock::FileLock;
use crate::format::{self, Layout};
use crate::kdf::{self, KEY_LEN, KdfParams};
use crate::persist;
use crate::pwgen;
use crate::store::{self, CredentialSet};

/// An open vault.
///
/// All state sits behind one mutex, so a `Vault` can be shared across threads
/// and operations on it are serialized. Debug output omits key material.
pub struct Vault {
    state: Mutex<State>,
    /// Held from open until close. `None` for vaults created in memory.
    lock: Option<FileLock>,
    path: Option<PathBuf>,
    layout: Layout,
}

struct State {
    sealed: Vec<u8>,
    nonce: [u8; NONCE_LEN],
    salt: Vec<u8>,
    key: Zeroizing<[u8; KEY_LEN]>,
    kdf: KdfParams,
    dirty: bool,
}

impl State {
    /// Seal `set` under a new salt, key and nonce.
    fn seal_fresh(
        passphrase: &SecretString,
        kdf: KdfParams,
        set: &CredentialSet,
    ) -> Result<Self, LockboxError> {
        kdf.check_sealable()?;
        let salt = kdf::generate_salt()?;
        let key = kdf::derive_key(passphrase.expose_secret().as_bytes(), &salt, &kdf)?;
        let plaintext = store::serialize(set)?;
        let nonce = crypto::generate_nonce()?;
        let sealed = crypto::seal(&key, &nonce, &plaintext)?;

        Ok(Self {
            sealed,
            nonce,
            salt: salt.to_vec(),
            key,
            kdf,
            dirty: true,
        })
    }

    fn unseal(&self) -> Result<CredentialSet, LockboxError> {
        let plaintext = crypto::open(&self.key, &self.nonce, &self.sealed)?;
        store::deserialize(&plaintext)
    }

    fn reseal(&mut self, set: &CredentialSet) -> Result<(), LockboxError> {
        let plaintext = store::serialize(set)?;
        let nonce = crypto::generate_nonce()?;
        self.sealed = crypto::seal(&self.key, &nonce, &plaintext)?;
        self.nonce = nonce;
        self.dirty = true;
        Ok(())
    }
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("path", &self.path)
            .field("layout", &self.layout)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl Vault {
    /// Create an empty in-memory vault sealed with `passphrase`.
    ///
    /// Nothing touches disk until [`Vault::save`].
    pub fn create(passphrase: &SecretString, config: &VaultConfig) -> Result<Self, LockboxError> {
        let state = State::seal_fresh(passphrase, KdfParams::from(config), &CredentialSet::new())?;
        info!("vault created");
        Ok(Self {
            state: Mutex::new(state),
            lock: None,
            path: None,
            layout: Layout::Current,
        })
    }

    /// Lock and open the vault file at `path`.
    ///
    /// Every known layout is tried, newest first. Legacy vaults are resealed
    /// with the Argon2id parameters from `config`; current ones keep their
    /// own. The lock is released again if opening fails.
    pub fn open(
        path: impl AsRef<Path>,
        passphrase: &SecretString,
        config: &VaultConfig,
    ) -> Result<Self, LockboxError> {
        let path = std::path::absolute(path.as_ref())?;
        let lock = FileLock::acquire(&path)?;

        match Self::load(&path, passphrase, config) {
            Ok((state, layout)) => {
                info!(path = %path.display(), layout = %layout, "vault opened");
                Ok(Self {
                    state: Mutex::new(state),
                    lock: Some(lock),
                    path: Some(path),
                    layout,
                })
            }
            Err(e) => {
                if let Err(release_err) = lock.release() {
                    warn!(error = %release_err, "failed to release vault lock after open error");
                }
                Err(e)
            }
        }
    }

    fn load(
        path: &Path,
        passphrase: &SecretString,
        config: &VaultConfig,
    ) -> Result<(State, Layout), LockboxError> {
        let bytes = std::fs::read(path)?;
        let loaded = format::load(&bytes, passphrase.expose_secret().as_bytes())?;

        let kdf = match loaded.kdf {
            Some(kdf) => kdf,
            None => {
                warn!(
                    layout = %loaded.layout,
                    "vault uses a legacy layout; it will be upgraded on next save"
                );
                KdfParams::from(config)
            }
        };

        let mut state = State::seal_fresh(passphrase, kdf, &loaded.set)?;
        state.dirty = loaded.layout.is_legacy();
        Ok((state, loaded.layout))
    }

    /// Write the vault to `path` atomically and clear the dirty flag.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LockboxError> {
        let path = path.as_ref();
        let mut state = self.state()?;
        let bytes = format::encode(&state.kdf, &state.salt, &state.nonce, &state.sealed)?;
        persist::write_atomic(path, &bytes)?;
        state.dirty = false;
        info!(path = %path.display(), "vault saved");
        Ok(())
    }

    /// Wipe the key and release the file lock.
    ///
    /// Unsaved changes are discarded.
    pub fn close(self) -> Result<(), LockboxError> {
        let Vault { state, lock, .. } = self;
        let mut state = state.into_inner().unwrap_or_else(PoisonError::into_inner);
        if state.dirty {
            debug!("closing vault with unsaved changes");
        }
        state.key.zeroize();
        drop(state);

        if let Some(lock) = lock {
            lock.release()?;
        }
        debug!("vault closed");
        Ok(())
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, LockboxError> {
        self.state
            .lock()
            .map_err(|_| LockboxError::Internal("vault state lock poisoned".to_string()))
    }

    fn read<T>(&self, f: impl FnOnce(&CredentialSet) -> Result<T, LockboxError>) -> Result<T, LockboxError> {
        let state = self.state()?;
        let set = state.unseal()?;
        f(&set)
    }

    /// Decrypt, apply `f`, reseal under a fresh nonce. A failing `f` leaves
    /// the sealed state untouched.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut CredentialSet) -> Result<T, LockboxError>,
    ) -> Result<T, LockboxError> {
        let mut state = self.state()?;
        let mut set = state.unseal()?;
        let out = f(&mut set)?;
        state.reseal(&set)?;
        Ok(out)
    }

    /// Store a new credential. Fails if `location` is taken.
    pub fn add(&self, location: &str, credential: Credential) -> Result<(), LockboxError> {
        self.mutate(|set| store::add(set, location, credential))?;
        debug!(location = %location, "credential added");
        Ok(())
    }

    pub fn get(&self, location: &str) -> Result<Credential, LockboxError> {
        self.read(|set| store::get(set, location).cloned())
    }

    /// Replace the credential at `location`, keeping its metadata.
    pub fn edit(&self, location: &str, credential: Credential) -> Result<(), LockboxError> {
        self.mutate(|set| store::edit(set, location, credential))?;
        debug!(location = %location, "credential edited");
        Ok(())
    }

    pub fn delete(&self, location: &str) -> Result<(), LockboxError> {
        self.mutate(|set| store::delete(set, location))?;
        debug!(location = %location, "credential deleted");
        Ok(())
    }

    pub fn add_meta(&self, location: &str, key: &str, value: &str) -> Result<(), LockboxError> {
        self.mutate(|set| store::add_meta(set, location, key, value))?;
        debug!(location = %location, key = %key, "meta tag added");
        Ok(())
    }

    pub fn edit_meta(&self, location: &str, key: &str, value: &str) -> Result<(), LockboxError> {
        self.mutate(|set| store::edit_meta(set, location, key, value))?;
        debug!(location = %location, key = %key, "meta tag edited");
        Ok(())
    }

    pub fn delete_meta(&self, location: &str, key: &str) -> Result<(), LockboxError> {
        self.mutate(|set| store::delete_meta(set, location, key))?;
        debug!(location = %location, key = %key, "meta tag deleted");
        Ok(())
    }

    /// All locations in lexicographic order.
    pub fn locations(&self) -> Result<Vec<String>, LockboxError> {
        self.read(|set| Ok(set.keys().cloned().collect()))
    }

    /// Look up a credential by exact location, falling back to the first
    /// location (in sorted order) that contains `search`.
    pub fn find(&self, search: &str) -> Result<(String, Credential), LockboxError> {
        self.read(|set| {
            store::find(set, search).map(|(location, credential)| (location.clone(), credential.clone()))
        })
    }

    /// Same lookup policy as [`Vault::find`], over the metadata keys of one
    /// credential.
    pub fn find_meta(&self, location: &str, search: &str) -> Result<(String, String), LockboxError> {
        self.read(|set| {
            store::find_meta(set, location, search).map(|(key, value)| (key.clone(), value.clone()))
        })
    }

    /// Store a freshly generated password at `location` and return it.
    pub fn generate(
        &self,
        location: &str,
        username: &str,
        generator: &GeneratorConfig,
    ) -> Result<SecretString, LockboxError> {
        let password = pwgen::generate_passphrase(pwgen::charset(generator.charset), generator.length)?;
        self.add(location, Credential::new(username, password.expose_secret()))?;
        Ok(password)
    }

    /// Reseal under `new_passphrase` with a new salt, key and nonce.
    ///
    /// The file on disk keeps the old passphrase until the next save.
    pub fn change_passphrase(&self, new_passphrase: &SecretString) -> Result<(), LockboxError> {
        let mut state = self.state()?;
        let set = state.unseal()?;
        let kdf = state.kdf;
        *state = State::seal_fresh(new_passphrase, kdf, &set)?;
        info!("vault passphrase changed");
        Ok(())
    }

    /// Copy every credential of `other` into this vault, in location order.
    ///
    /// Stops with [`LockboxError::MergeConflict`] at the first location that
    /// already exists here. Credentials copied before the conflict stay.
    pub fn merge(&self, other: &Vault) -> Result<usize, LockboxError> {
        // Snapshot first so the two handle locks are never held together.
        let incoming = other.read(|set| Ok(set.clone()))?;

        let mut merged = 0;
        for (location, credential) in incoming {
            match self.add(&location, credential) {
                Ok(()) => merged += 1,
                Err(LockboxError::AlreadyExists(location)) => {
                    return Err(LockboxError::MergeConflict(location));
                }
                Err(e) => return Err(e),
            }
        }

        info!(merged, "vaults merged");
        Ok(merged)
    }

    /// The layout this vault was read from.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Whether there are changes not yet written by [`Vault::save`].
    pub fn is_dirty(&self) -> Result<bool, LockboxError> {
        Ok(self.state()?.dirty)
    }

    /// Absolute path the vault was opened from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn kdf_params(&self) -> Result<KdfParams, LockboxError> {
        Ok(self.state()?.kdf)
    }

    pub fn len(&self) -> Result<usize, LockboxError> {
        self.read(|set| Ok(set.len()))
    }

    pub fn is_empty(&self) -> Result<bool, LockboxError> {
        self.len().map(|n| n == 0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::format::fixtures;

    fn test_config() -> VaultConfig {
        // Low cost for fast tests.
        VaultConfig {
            kdf_memory_cost: 1024,
            kdf_iterations: 1,
            kdf_parallelism: 1,
            ..VaultConfig::default()
        }
    }

    fn pass(s: &str) -> SecretString {
        SecretString::from(s)
    }

    fn file_salt(path: &Path) -> serde_json::Value {
        let doc: serde_json::Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        doc["salt"].clone()
    }

    #[test]
    fn vault_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Vault>();
    }

    #[test]
    fn create_starts_empty_and_dirty() {
        let vault = Vault::create(&pass("p"), &test_config()).unwrap();
        assert!(vault.is_empty().unwrap());
        assert!(vault.is_dirty().unwrap());
        assert_eq!(vault.layout(), Layout::Current);
        assert!(vault.path().is_none());
        assert_eq!(vault.kdf_params().unwrap(), fixtures::CHEAP);
    }

    #[test]
    fn every_mutation_draws_a_new_nonce() {
        let vault = Vault::create(&pass("p"), &test_config()).unwrap();
        let mut nonces = HashSet::new();
        nonces.insert(vault.state().unwrap().nonce);

        for i in 0..10 {
            let location = format!("site{i}");
            vault.add(&location, Credential::new("u", "p")).unwrap();
            nonces.insert(vault.state().unwrap().nonce);
            vault.add_meta(&location, "k", "v").unwrap();
            nonces.insert(vault.state().unwrap().nonce);
        }
        assert_eq!(nonces.len(), 21);
    }

    #[test]
    fn failed_mutation_leaves_sealed_state_untouched() {
        let vault = Vault::create(&pass("p"), &test_config()).unwrap();
        vault.add("a", Credential::new("u1", "p1")).unwrap();
        let (sealed, nonce) = {
            let state = vault.state().unwrap();
            (state.sealed.clone(), state.nonce)
        };

        assert!(matches!(
            vault.add("a", Credential::new("u2", "p2")),
            Err(LockboxError::AlreadyExists(_))
        ));

        let state = vault.state().unwrap();
        assert_eq!(state.sealed, sealed);
        assert_eq!(state.nonce, nonce);
    }

    #[test]
    fn open_rotates_salt_and_nonce() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");
        let config = test_config();

        let vault = Vault::create(&pass("p"), &config).unwrap();
        vault.add("a", Credential::new("u", "p")).unwrap();
        vault.save(&path).unwrap();
        let saved_nonce = vault.state().unwrap().nonce;
        vault.close().unwrap();
        let salt_before = file_salt(&path);

        let vault = Vault::open(&path, &pass("p"), &config).unwrap();
        assert!(!vault.is_dirty().unwrap());
        assert_ne!(vault.state().unwrap().nonce, saved_nonce);
        vault.save(&path).unwrap();
        vault.close().unwrap();

        assert_ne!(file_salt(&path), salt_before);
    }

    #[test]
    fn save_clears_dirty_flag() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::create(&pass("p"), &test_config()).unwrap();
        vault.add("a", Credential::new("u", "p")).unwrap();
        assert!(vault.is_dirty().unwrap());
        vault.save(dir.path().join("vault.json")).unwrap();
        assert!(!vault.is_dirty().unwrap());
    }

    #[test]
    fn create_rejects_params_the_file_could_not_be_reopened_with() {
        let config = VaultConfig {
            kdf_iterations: kdf::MAX_TIME_COST + 1,
            ..test_config()
        };
        assert!(matches!(
            Vault::create(&pass("p"), &config),
            Err(LockboxError::Config(_))
        ));
    }

    #[test]
    fn vault_sealed_at_the_highest_accepted_cost_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");
        let config = VaultConfig {
            kdf_iterations: kdf::MAX_TIME_COST,
            ..test_config()
        };

        let vault = Vault::create(&pass("p"), &config).unwrap();
        vault.add("a", Credential::new("u", "pw")).unwrap();
        vault.save(&path).unwrap();
        vault.close().unwrap();

        let vault = Vault::open(&path, &pass("p"), &config).unwrap();
        assert_eq!(vault.kdf_params().unwrap().time_cost, kdf::MAX_TIME_COST);
        assert_eq!(vault.get("a").unwrap().password, "pw");
        vault.close().unwrap();
    }

    #[test]
    fn legacy_open_with_unsealable_config_leaves_file_and_lock_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.vault");
        let bytes = fixtures::salted_secretbox(&legacy_set(), "legacy");
        std::fs::write(&path, &bytes).unwrap();

        let config = VaultConfig {
            kdf_iterations: kdf::MAX_TIME_COST + 1,
            ..test_config()
        };
        assert!(matches!(
            Vault::open(&path, &pass("legacy"), &config),
            Err(LockboxError::Config(_))
        ));
        assert_eq!(std::fs::read(&path).unwrap(), bytes);

        let vault = Vault::open(&path, &pass("legacy"), &test_config()).unwrap();
        vault.close().unwrap();
    }

    #[test]
    fn poisoned_state_is_reported_as_internal_error() {
        let vault = Vault::create(&pass("p"), &test_config()).unwrap();
        let _ = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = vault.state.lock().unwrap();
                panic!("poison the vault state");
            })
            .join()
        });

        assert!(matches!(vault.is_dirty(), Err(LockboxError::Internal(_))));
        assert!(matches!(vault.kdf_params(), Err(LockboxError::Internal(_))));
        assert!(matches!(vault.len(), Err(LockboxError::Internal(_))));
        vault.close().unwrap();
    }

    fn legacy_roundtrip(bytes: Vec<u8>, expected: Layout) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.vault");
        std::fs::write(&path, bytes).unwrap();

        let config = VaultConfig {
            kdf_iterations: 2,
            ..test_config()
        };
        let vault = Vault::open(&path, &pass("legacy"), &config).unwrap();
        assert_eq!(vault.layout(), expected);
        assert!(vault.is_dirty().unwrap());
        assert_eq!(vault.kdf_params().unwrap(), KdfParams::from(&config));
        assert_eq!(vault.get("old.example.com").unwrap().password, "s3cret");

        vault.save(&path).unwrap();
        vault.close().unwrap();

        let vault = Vault::open(&path, &pass("legacy"), &config).unwrap();
        assert_eq!(vault.layout(), Layout::Current);
        assert!(!vault.is_dirty().unwrap());
        assert_eq!(vault.get("old.example.com").unwrap().username, "old");
        vault.close().unwrap();
    }

    fn legacy_set() -> CredentialSet {
        let mut set = CredentialSet::new();
        set.insert("old.example.com".to_string(), Credential::new("old", "s3cret"));
        set
    }

    #[test]
    fn salted_legacy_vault_is_migrated() {
        legacy_roundtrip(
            fixtures::salted_secretbox(&legacy_set(), "legacy"),
            Layout::SaltedSecretbox,
        );
    }

    #[test]
    fn nonce_legacy_vault_is_migrated() {
        legacy_roundtrip(
            fixtures::nonce_secretbox(&legacy_set(), "legacy"),
            Layout::NonceSecretbox,
        );
    }

    #[test]
    fn failed_open_releases_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");
        let config = test_config();

        let vault = Vault::create(&pass("right"), &config).unwrap();
        vault.save(&path).unwrap();
        vault.close().unwrap();

        assert!(matches!(
            Vault::open(&path, &pass("wrong"), &config),
            Err(LockboxError::AuthenticationFailure)
        ));
        Vault::open(&path, &pass("right"), &config)
            .unwrap()
            .close()
            .unwrap();
    }

    #[test]
    fn missing_file_is_io_error_without_stale_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(
            Vault::open(&path, &pass("p"), &test_config()),
            Err(LockboxError::Io(_))
        ));
        assert!(!dir.path().join("absent.json.lck").exists());
    }

    #[test]
    fn garbage_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");
        std::fs::write(&path, b"{}").unwrap();
        assert!(matches!(
            Vault::open(&path, &pass("p"), &test_config()),
            Err(LockboxError::MalformedFile(_))
        ));
    }

    #[test]
    fn change_passphrase_rotates_key_material() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");
        let config = test_config();

        let vault = Vault::create(&pass("old"), &config).unwrap();
        vault.add("a", Credential::new("u", "p").with_meta("k", "v")).unwrap();
        vault.save(&path).unwrap();
        let (salt, key) = {
            let state = vault.state().unwrap();
            (state.salt.clone(), *state.key)
        };

        vault.change_passphrase(&pass("new")).unwrap();
        {
            let state = vault.state().unwrap();
            assert_ne!(state.salt, salt);
            assert_ne!(*state.key, key);
        }
        assert!(vault.is_dirty().unwrap());
        assert_eq!(vault.get("a").unwrap().meta["k"], "v");

        // Disk still holds the old passphrase until saved.
        vault.close().unwrap();
        Vault::open(&path, &pass("old"), &config).unwrap().close().unwrap();

        let vault = Vault::open(&path, &pass("old"), &config).unwrap();
        vault.change_passphrase(&pass("new")).unwrap();
        vault.save(&path).unwrap();
        vault.close().unwrap();

        assert!(matches!(
            Vault::open(&path, &pass("old"), &config),
            Err(LockboxError::AuthenticationFailure)
        ));
        let vault = Vault::open(&path, &pass("new"), &config).unwrap();
        assert_eq!(vault.get("a").unwrap().username, "u");
        vault.close().unwrap();
    }

    #[test]
    fn merge_copies_disjoint_vaults() {
        let config = test_config();
        let ours = Vault::create(&pass("a"), &config).unwrap();
        let theirs = Vault::create(&pass("b"), &config).unwrap();
        ours.add("one", Credential::new("u1", "p1")).unwrap();
        theirs.add("two", Credential::new("u2", "p2").with_meta("k", "v")).unwrap();
        theirs.add("three", Credential::new("u3", "p3")).unwrap();

        assert_eq!(ours.merge(&theirs).unwrap(), 2);
        assert_eq!(ours.locations().unwrap(), vec!["one", "three", "two"]);
        assert_eq!(ours.get("two").unwrap().meta["k"], "v");
        assert_eq!(theirs.len().unwrap(), 2);
    }

    #[test]
    fn merge_conflict_keeps_entries_copied_before_it() {
        let config = test_config();
        let ours = Vault::create(&pass("a"), &config).unwrap();
        let theirs = Vault::create(&pass("b"), &config).unwrap();
        ours.add("m", Credential::new("mine", "x")).unwrap();
        for location in ["a", "m", "z"] {
            theirs.add(location, Credential::new("theirs", "y")).unwrap();
        }

        match ours.merge(&theirs) {
            Err(LockboxError::MergeConflict(location)) => assert_eq!(location, "m"),
            other => panic!("expected MergeConflict, got {other:?}"),
        }
        assert_eq!(ours.locations().unwrap(), vec!["a", "m"]);
        assert_eq!(ours.get("m").unwrap().username, "mine");
    }

    #[test]
    fn merge_with_itself_conflicts_instead_of_deadlocking() {
        let vault = Vault::create(&pass("a"), &test_config()).unwrap();
        vault.add("a", Credential::new("u", "p")).unwrap();
        assert!(matches!(
            vault.merge(&vault),
            Err(LockboxError::MergeConflict(_))
        ));
    }

    #[test]
    fn generate_stores_the_returned_password() {
        let vault = Vault::create(&pass("a"), &test_config()).unwrap();
        let generator = GeneratorConfig {
            length: 20,
            ..GeneratorConfig::default()
        };
        let password = vault.generate("site", "me", &generator).unwrap();
        let stored = vault.get("site").unwrap();
        assert_eq!(stored.password, password.expose_secret());
        assert_eq!(stored.password.len(), 20);
        assert_eq!(stored.username, "me");

        assert!(matches!(
            vault.generate("site", "me", &generator),
            Err(LockboxError::AlreadyExists(_))
        ));
    }

    #[test]
    fn debug_output_redacts_key() {
        let vault = Vault::create(&pass("hunter2"), &test_config()).unwrap();
        let debug = format!("{vault:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn shared_across_threads() {
        let vault = std::sync::Arc::new(Vault::create(&pass("a"), &test_config()).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let vault = std::sync::Arc::clone(&vault);
                std::thread::spawn(move || {
                    for i in 0..5 {
                        vault
                            .add(&format!("t{t}-{i}"), Credential::new("u", "p"))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(vault.len().unwrap(), 20);
    }
}
