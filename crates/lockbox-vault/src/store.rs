// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The plaintext credential set and the edits applied to it.
//!
//! Everything here operates on a decrypted [`CredentialSet`] that only lives
//! for the duration of one vault operation. [`crate::Vault`] handles the
//! decrypt/reseal around each call.

use std::collections::BTreeMap;

use lockbox_core::{Credential, LockboxError};
use zeroize::Zeroizing;

/// Location -> credential, ordered so listings and search tie-breaks are
/// deterministic.
pub type CredentialSet = BTreeMap<String, Credential>;

/// Serialize a set into a buffer that is wiped on drop.
pub(crate) fn serialize(set: &CredentialSet) -> Result<Zeroizing<Vec<u8>>, LockboxError> {
    serde_json::to_vec(set)
        .map(Zeroizing::new)
        .map_err(|e| LockboxError::Internal(format!("failed to serialize credentials: {e}")))
}

pub(crate) fn deserialize(bytes: &[u8]) -> Result<CredentialSet, LockboxError> {
    serde_json::from_slice(bytes)
        .map_err(|e| LockboxError::MalformedFile(format!("decrypted payload is not a credential set: {e}")))
}

pub(crate) fn add(
    set: &mut CredentialSet,
    location: &str,
    credential: Credential,
) -> Result<(), LockboxError> {
    if set.contains_key(location) {
        return Err(LockboxError::AlreadyExists(location.to_string()));
    }
    set.insert(location.to_string(), credential);
    Ok(())
}

pub(crate) fn get<'a>(set: &'a CredentialSet, location: &str) -> Result<&'a Credential, LockboxError> {
    set.get(location)
        .ok_or_else(|| LockboxError::NotFound(location.to_string()))
}

fn get_mut<'a>(
    set: &'a mut CredentialSet,
    location: &str,
) -> Result<&'a mut Credential, LockboxError> {
    set.get_mut(location)
        .ok_or_else(|| LockboxError::NotFound(location.to_string()))
}

/// Replace the credential at `location`, carrying its metadata over.
pub(crate) fn edit(
    set: &mut CredentialSet,
    location: &str,
    mut credential: Credential,
) -> Result<(), LockboxError> {
    let existing = get_mut(set, location)?;
    credential.meta = std::mem::take(&mut existing.meta);
    *existing = credential;
    Ok(())
}

pub(crate) fn delete(set: &mut CredentialSet, location: &str) -> Result<(), LockboxError> {
    set.remove(location)
        .map(drop)
        .ok_or_else(|| LockboxError::NotFound(location.to_string()))
}

pub(crate) fn add_meta(
    set: &mut CredentialSet,
    location: &str,
    key: &str,
    value: &str,
) -> Result<(), LockboxError> {
    let credential = get_mut(set, location)?;
    if credential.meta.contains_key(key) {
        return Err(LockboxError::MetaAlreadyExists {
            location: location.to_string(),
            key: key.to_string(),
        });
    }
    credential.meta.insert(key.to_string(), value.to_string());
    Ok(())
}

pub(crate) fn edit_meta(
    set: &mut CredentialSet,
    location: &str,
    key: &str,
    value: &str,
) -> Result<(), LockboxError> {
    let credential = get_mut(set, location)?;
    let slot = credential
        .meta
        .get_mut(key)
        .ok_or_else(|| meta_not_found(location, key))?;
    *slot = value.to_string();
    Ok(())
}

pub(crate) fn delete_meta(
    set: &mut CredentialSet,
    location: &str,
    key: &str,
) -> Result<(), LockboxError> {
    let credential = get_mut(set, location)?;
    credential
        .meta
        .remove(key)
        .map(drop)
        .ok_or_else(|| meta_not_found(location, key))
}

/// Exact key first, then the smallest key containing `search`.
fn best_match<'a, V>(map: &'a BTreeMap<String, V>, search: &str) -> Option<(&'a String, &'a V)> {
    map.get_key_value(search)
        .or_else(|| map.iter().find(|(key, _)| key.contains(search)))
}

pub(crate) fn find<'a>(
    set: &'a CredentialSet,
    search: &str,
) -> Result<(&'a String, &'a Credential), LockboxError> {
    best_match(set, search).ok_or_else(|| LockboxError::NotFound(search.to_string()))
}

pub(crate) fn find_meta<'a>(
    set: &'a CredentialSet,
    location: &str,
    search: &str,
) -> Result<(&'a String, &'a String), LockboxError> {
    let credential = get(set, location)?;
    best_match(&credential.meta, search).ok_or_else(|| meta_not_found(location, search))
}

fn meta_not_found(location: &str, key: &str) -> LockboxError {
    LockboxError::MetaNotFound {
        location: location.to_string(),
        key: key.to_string(),
    }
}
