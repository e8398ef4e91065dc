// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authenticated encryption of the sealed credential blob.
//!
//! New seals use XChaCha20-Poly1305 with a caller-supplied 192-bit nonce; the
//! caller draws a fresh one with [`generate_nonce`] for every seal. Legacy
//! layouts are opened with XSalsa20-Poly1305 (NaCl secretbox).

use chacha20poly1305::aead::generic_array::GenericArray;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::XChaCha20Poly1305;
use crypto_secretbox::XSalsa20Poly1305;
use lockbox_core::LockboxError;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::kdf::KEY_LEN;

/// Nonce length shared by XChaCha20-Poly1305 and secretbox.
pub const NONCE_LEN: usize = 24;

/// Poly1305 tag length.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` with XChaCha20-Poly1305.
///
/// Returns the ciphertext with the 16-byte tag appended.
pub fn seal(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, LockboxError> {
    let cipher = XChaCha20Poly1305::new_from_slice(key)
        .map_err(|_| LockboxError::Crypto("failed to create XChaCha20-Poly1305 key".to_string()))?;
    cipher
        .encrypt(GenericArray::from_slice(nonce.as_slice()), plaintext)
        .map_err(|_| LockboxError::Crypto("XChaCha20-Poly1305 encryption failed".to_string()))
}

/// Decrypt and verify a blob produced by [`seal`].
///
/// A wrong key, nonce or any modified byte yields
/// [`LockboxError::AuthenticationFailure`].
pub fn open(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, LockboxError> {
    let cipher = XChaCha20Poly1305::new_from_slice(key)
        .map_err(|_| LockboxError::Crypto("failed to create XChaCha20-Poly1305 key".to_string()))?;
    cipher
        .decrypt(GenericArray::from_slice(nonce.as_slice()), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| LockboxError::AuthenticationFailure)
}

/// Decrypt a NaCl secretbox written by a legacy layout.
pub fn open_legacy(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, LockboxError> {
    let cipher = XSalsa20Poly1305::new_from_slice(key)
        .map_err(|_| LockboxError::Crypto("failed to create secretbox key".to_string()))?;
    cipher
        .decrypt(GenericArray::from_slice(nonce.as_slice()), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| LockboxError::AuthenticationFailure)
}

/// Secretbox sealing, used only to build legacy fixtures in tests.
#[cfg(test)]
pub(crate) fn seal_legacy(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Vec<u8> {
    XSalsa20Poly1305::new_from_slice(key)
        .unwrap()
        .encrypt(GenericArray::from_slice(nonce.as_slice()), plaintext)
        .unwrap()
}

/// Draw a fresh random nonce.
pub fn generate_nonce() -> Result<[u8; NONCE_LEN], LockboxError> {
    let mut nonce = [0u8; NONCE_LEN];
    fill_random(&mut nonce)?;
    Ok(nonce)
}

/// Fill `buf` from the system CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> Result<(), LockboxError> {
    SystemRandom::new()
        .fill(buf)
        .map_err(|_| LockboxError::Crypto("failed to generate random bytes".to_string()))
}
