// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Random password generation.

use lockbox_config::CharsetKind;
use lockbox_core::LockboxError;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use secrecy::SecretString;

pub const ALPHA: &str = "abcdefghijklmnopqrstuvwxyz";
pub const ALPHANUMERIC: &str = "abcdefghijklmnopqrstuvwxyz0123456789";
pub const SPECIAL: &str =
    "abcdefghijklmnopqrstuvwxyz0123456789{}_*()&^%$@!\\<>;'|[]=+-`~,.?";

/// The character pool for a configured charset.
pub fn charset(kind: CharsetKind) -> &'static str {
    match kind {
        CharsetKind::Alpha => ALPHA,
        CharsetKind::Alphanumeric => ALPHANUMERIC,
        CharsetKind::Special => SPECIAL,
    }
}

/// Draw `length` characters uniformly from `charset` using the OS CSPRNG.
pub fn generate_passphrase(charset: &str, length: usize) -> Result<SecretString, LockboxError> {
    if length == 0 {
        return Err(LockboxError::Generator("length must be greater than zero".to_string()));
    }
    let pool: Vec<char> = charset.chars().collect();
    if pool.is_empty() {
        return Err(LockboxError::Generator("charset is empty".to_string()));
    }

    let mut rng = OsRng;
    let password: String = (0..length)
        .filter_map(|_| pool.choose(&mut rng))
        .collect();
    Ok(SecretString::from(password))
}
