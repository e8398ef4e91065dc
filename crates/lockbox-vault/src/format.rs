// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk vault layouts and the ordered loader chain that reads them.
//!
//! The current layout is a JSON document carrying the Argon2id parameters,
//! salt, nonce and XChaCha20-Poly1305 ciphertext. Older layouts are raw byte
//! concatenations sealed with scrypt + secretbox; they are read-only and a
//! vault opened from one is rewritten in the current layout on its next save.
//!
//! The legacy loaders are compatibility strategies for the envelope only. The
//! payload inside must be the JSON credential set; an envelope carrying any
//! other encoding authenticates and then fails with
//! [`LockboxError::MalformedFile`].
//!
//! A new layout is added by prepending a [`Loader`] to [`LOADERS`]. Existing
//! loaders are never removed.

use lockbox_core::LockboxError;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::{self, NONCE_LEN, TAG_LEN};
use crate::kdf::{self, KdfParams};
use crate::store::{self, CredentialSet};

/// Format tag written into every current-layout file.
pub const FORMAT_TAG: &str = "lockbox.v1";

const KDF_ALGORITHM: &str = "argon2id";

/// Salt width used by the salted legacy layout.
const LEGACY_SALT_LEN: usize = 24;

/// The layout a vault was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Layout {
    /// JSON document, Argon2id + XChaCha20-Poly1305.
    #[strum(serialize = "lockbox.v1")]
    Current,
    /// `salt(24) || nonce(24) || ciphertext`, scrypt + secretbox, JSON payload.
    #[strum(serialize = "legacy salted secretbox")]
    SaltedSecretbox,
    /// `nonce(24) || ciphertext`, the nonce doubling as the scrypt salt. JSON
    /// payload.
    #[strum(serialize = "legacy nonce secretbox")]
    NonceSecretbox,
}

impl Layout {
    pub fn is_legacy(self) -> bool {
        self != Layout::Current
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct VaultFile {
    format: String,
    kdf: KdfRecord,
    #[serde(with = "b64")]
    salt: Vec<u8>,
    #[serde(with = "b64")]
    nonce: Vec<u8>,
    #[serde(with = "b64")]
    ciphertext: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct KdfRecord {
    algorithm: String,
    #[serde(flatten)]
    params: KdfParams,
}

mod b64 {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}

/// Encode a sealed vault in the current layout.
pub(crate) fn encode(
    params: &KdfParams,
    salt: &[u8],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, LockboxError> {
    let file = VaultFile {
        format: FORMAT_TAG.to_string(),
        kdf: KdfRecord {
            algorithm: KDF_ALGORITHM.to_string(),
            params: *params,
        },
        salt: salt.to_vec(),
        nonce: nonce.to_vec(),
        ciphertext: ciphertext.to_vec(),
    };
    serde_json::to_vec_pretty(&file)
        .map_err(|e| LockboxError::Internal(format!("failed to encode vault file: {e}")))
}

/// Result of handing file bytes to one [`Loader`].
pub(crate) enum Attempt {
    /// The bytes do not have this layout's shape.
    Unparseable(String),
    /// The shape matched but authentication failed.
    Rejected,
    /// Authenticated plaintext. `kdf` is set when the layout records its own
    /// Argon2id parameters.
    Opened {
        plaintext: Zeroizing<Vec<u8>>,
        kdf: Option<KdfParams>,
    },
}

/// One strategy for reading a vault layout.
pub(crate) trait Loader: Sync {
    fn layout(&self) -> Layout;

    fn load(&self, bytes: &[u8], passphrase: &[u8]) -> Attempt;
}

/// Loaders in the order they are tried: most recent layout first.
pub(crate) static LOADERS: [&dyn Loader; 3] =
    [&CurrentLoader, &SaltedSecretboxLoader, &NonceSecretboxLoader];

/// A decrypted vault file.
#[derive(Debug)]
pub(crate) struct Loaded {
    pub set: CredentialSet,
    pub layout: Layout,
    pub kdf: Option<KdfParams>,
}

/// Run the loader chain over `bytes`.
///
/// The first layout that parses and authenticates wins. When none does, the
/// error is [`LockboxError::AuthenticationFailure`] if any layout parsed and
/// [`LockboxError::MalformedFile`] otherwise.
pub(crate) fn load(bytes: &[u8], passphrase: &[u8]) -> Result<Loaded, LockboxError> {
    let mut parsed_any = false;
    let mut reasons = Vec::new();

    for loader in LOADERS {
        match loader.load(bytes, passphrase) {
            Attempt::Opened { plaintext, kdf } => {
                let set = store::deserialize(&plaintext)?;
                return Ok(Loaded {
                    set,
                    layout: loader.layout(),
                    kdf,
                });
            }
            Attempt::Rejected => {
                debug!(layout = %loader.layout(), "layout parsed but did not authenticate");
                parsed_any = true;
            }
            Attempt::Unparseable(reason) => {
                debug!(layout = %loader.layout(), reason = %reason, "layout did not parse");
                reasons.push(format!("{}: {reason}", loader.layout()));
            }
        }
    }

    if parsed_any {
        Err(LockboxError::AuthenticationFailure)
    } else {
        Err(LockboxError::MalformedFile(reasons.join("; ")))
    }
}

fn nonce_array(bytes: &[u8]) -> Option<[u8; NONCE_LEN]> {
    bytes.try_into().ok()
}

fn attempt_from(result: Result<Zeroizing<Vec<u8>>, LockboxError>, kdf: Option<KdfParams>) -> Attempt {
    match result {
        Ok(plaintext) => Attempt::Opened { plaintext, kdf },
        Err(LockboxError::AuthenticationFailure) => Attempt::Rejected,
        Err(e) => Attempt::Unparseable(e.to_string()),
    }
}

struct CurrentLoader;

impl Loader for CurrentLoader {
    fn layout(&self) -> Layout {
        Layout::Current
    }

    fn load(&self, bytes: &[u8], passphrase: &[u8]) -> Attempt {
        let file: VaultFile = match serde_json::from_slice(bytes) {
            Ok(file) => file,
            Err(e) => return Attempt::Unparseable(format!("not a vault document: {e}")),
        };
        if file.format != FORMAT_TAG {
            return Attempt::Unparseable(format!("unknown format tag `{}`", file.format));
        }
        if file.kdf.algorithm != KDF_ALGORITHM {
            return Attempt::Unparseable(format!("unsupported KDF `{}`", file.kdf.algorithm));
        }
        if let Err(e) = file.kdf.params.check_bounds() {
            return Attempt::Unparseable(e.to_string());
        }
        if !(16..=24).contains(&file.salt.len()) {
            return Attempt::Unparseable(format!("salt has {} bytes", file.salt.len()));
        }
        let Some(nonce) = nonce_array(&file.nonce) else {
            return Attempt::Unparseable(format!("nonce has {} bytes", file.nonce.len()));
        };
        if file.ciphertext.len() < TAG_LEN {
            return Attempt::Unparseable("ciphertext shorter than its tag".to_string());
        }

        let key = match kdf::derive_key(passphrase, &file.salt, &file.kdf.params) {
            Ok(key) => key,
            Err(e) => return Attempt::Unparseable(e.to_string()),
        };
        attempt_from(
            crypto::open(&key, &nonce, &file.ciphertext),
            Some(file.kdf.params),
        )
    }
}

struct SaltedSecretboxLoader;

impl Loader for SaltedSecretboxLoader {
    fn layout(&self) -> Layout {
        Layout::SaltedSecretbox
    }

    fn load(&self, bytes: &[u8], passphrase: &[u8]) -> Attempt {
        if bytes.len() < LEGACY_SALT_LEN + NONCE_LEN + TAG_LEN {
            return Attempt::Unparseable(format!("{} bytes is too short", bytes.len()));
        }
        let (salt, rest) = bytes.split_at(LEGACY_SALT_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
        let Some(nonce) = nonce_array(nonce) else {
            return Attempt::Unparseable("truncated nonce".to_string());
        };

        let key = match kdf::derive_legacy_key(passphrase, salt) {
            Ok(key) => key,
            Err(e) => return Attempt::Unparseable(e.to_string()),
        };
        attempt_from(crypto::open_legacy(&key, &nonce, ciphertext), None)
    }
}

struct NonceSecretboxLoader;

impl Loader for NonceSecretboxLoader {
    fn layout(&self) -> Layout {
        Layout::NonceSecretbox
    }

    fn load(&self, bytes: &[u8], passphrase: &[u8]) -> Attempt {
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Attempt::Unparseable(format!("{} bytes is too short", bytes.len()));
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let Some(nonce) = nonce_array(nonce) else {
            return Attempt::Unparseable("truncated nonce".to_string());
        };

        let key = match kdf::derive_legacy_key(passphrase, &nonce) {
            Ok(key) => key,
            Err(e) => return Attempt::Unparseable(e.to_string()),
        };
        attempt_from(crypto::open_legacy(&key, &nonce, ciphertext), None)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builders for vault files in every layout.

    use super::*;

    pub const CHEAP: KdfParams = KdfParams {
        time_cost: 1,
        memory_cost: 1024,
        parallelism: 1,
    };

    pub fn current(set: &CredentialSet, passphrase: &str) -> Vec<u8> {
        let salt = kdf::generate_salt().unwrap();
        let nonce = crypto::generate_nonce().unwrap();
        let key = kdf::derive_key(passphrase.as_bytes(), &salt, &CHEAP).unwrap();
        let plaintext = store::serialize(set).unwrap();
        let ciphertext = crypto::seal(&key, &nonce, &plaintext).unwrap();
        encode(&CHEAP, &salt, &nonce, &ciphertext).unwrap()
    }

    pub fn salted_secretbox(set: &CredentialSet, passphrase: &str) -> Vec<u8> {
        salted_secretbox_payload(&store::serialize(set).unwrap(), passphrase)
    }

    pub fn salted_secretbox_payload(plaintext: &[u8], passphrase: &str) -> Vec<u8> {
        let mut salt = [0u8; LEGACY_SALT_LEN];
        crypto::fill_random(&mut salt).unwrap();
        let nonce = crypto::generate_nonce().unwrap();
        let key = kdf::derive_legacy_key(passphrase.as_bytes(), &salt).unwrap();

        let mut bytes = salt.to_vec();
        bytes.extend_from_slice(&nonce);
        bytes.extend(crypto::seal_legacy(&key, &nonce, plaintext));
        bytes
    }

    pub fn nonce_secretbox(set: &CredentialSet, passphrase: &str) -> Vec<u8> {
        let nonce = crypto::generate_nonce().unwrap();
        let key = kdf::derive_legacy_key(passphrase.as_bytes(), &nonce).unwrap();
        let plaintext = store::serialize(set).unwrap();

        let mut bytes = nonce.to_vec();
        bytes.extend(crypto::seal_legacy(&key, &nonce, &plaintext));
        bytes
    }
}

#[cfg(test)]
mod tests {
    use lockbox_core::Credential;

    use super::fixtures::*;
    use super::*;

    fn sample() -> CredentialSet {
        let mut set = CredentialSet::new();
        set.insert("example.com".to_string(), Credential::new("alice", "hunter2"));
        set
    }

    #[test]
    fn current_layout_document_shape() {
        let bytes = current(&sample(), "pass");
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc["format"], FORMAT_TAG);
        assert_eq!(doc["kdf"]["algorithm"], "argon2id");
        assert_eq!(doc["kdf"]["memory_cost"], 1024);
        assert!(doc["salt"].is_string());
        assert!(doc["nonce"].is_string());

        // Locations never appear in the clear.
        assert!(!String::from_utf8_lossy(&bytes).contains("example.com"));
    }

    #[test]
    fn current_layout_loads() {
        let loaded = load(&current(&sample(), "pass"), b"pass").unwrap();
        assert_eq!(loaded.layout, Layout::Current);
        assert_eq!(loaded.kdf, Some(CHEAP));
        assert_eq!(loaded.set, sample());
    }

    #[test]
    fn salted_legacy_layout_loads() {
        let loaded = load(&salted_secretbox(&sample(), "pass"), b"pass").unwrap();
        assert_eq!(loaded.layout, Layout::SaltedSecretbox);
        assert_eq!(loaded.kdf, None);
        assert_eq!(loaded.set, sample());
    }

    #[test]
    fn nonce_legacy_layout_loads() {
        let loaded = load(&nonce_secretbox(&sample(), "pass"), b"pass").unwrap();
        assert_eq!(loaded.layout, Layout::NonceSecretbox);
        assert_eq!(loaded.set, sample());
    }

    #[test]
    fn wrong_passphrase_is_authentication_failure() {
        for bytes in [
            current(&sample(), "right"),
            salted_secretbox(&sample(), "right"),
        ] {
            assert!(matches!(
                load(&bytes, b"wrong"),
                Err(LockboxError::AuthenticationFailure)
            ));
        }
    }

    #[test]
    fn legacy_envelope_with_non_json_payload_is_malformed() {
        // Authenticates under the right passphrase, but the payload is not a
        // credential set.
        let bytes = salted_secretbox_payload(b"\x0e\xff\x81gob-encoded", "pass");
        assert!(matches!(
            load(&bytes, b"pass"),
            Err(LockboxError::MalformedFile(_))
        ));
    }

    #[test]
    fn short_garbage_is_malformed() {
        assert!(matches!(
            load(b"tiny", b"pass"),
            Err(LockboxError::MalformedFile(_))
        ));
    }

    #[test]
    fn unknown_format_tag_falls_through_to_legacy() {
        let bytes = current(&sample(), "pass");
        let mut doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        doc["format"] = serde_json::Value::from("lockbox.v99");
        let bytes = serde_json::to_vec(&doc).unwrap();

        // Long enough to be tried as legacy, so the failure is authentication.
        assert!(matches!(
            load(&bytes, b"pass"),
            Err(LockboxError::AuthenticationFailure)
        ));
    }

    #[test]
    fn layout_display_names() {
        assert_eq!(Layout::Current.to_string(), "lockbox.v1");
        assert!(Layout::SaltedSecretbox.is_legacy());
        assert!(!Layout::Current.is_legacy());
    }
}
