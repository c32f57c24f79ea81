//! The key_store module converts a [`JksTrustStore`] to and from the Java KeyStore (JKS) format using
//! the `jks` crate.
//!
//! Only trusted certificate entries are supported. Aliases are case-insensitive in JKS and are
//! stored lower-cased. The integrity trailer is SHA-1 over the password as UTF-16BE, the string
//! "Mighty Aphrodite" and the preceding bytes.

use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};

use jks::{Certificate, KeyStore, KeyStoreError, KeyStoreOptions};

use crate::util::{error::*, file_utils::get_file_as_byte_vec};

const X509_CERT_TYPE: &str = "X.509";
// certificate type implied by version 1 stores
const LEGACY_CERT_TYPE: &str = "X509";

/// `TrustedCertificateEntry` is a single alias to certificate mapping within a [`JksTrustStore`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrustedCertificateEntry {
    /// Lower-cased alias
    pub alias: String,
    /// Creation time in milliseconds since Unix epoch
    pub creation_millis: u64,
    /// DER-encoded certificate
    pub certificate: Vec<u8>,
}

/// `JksTrustStore` is an in-memory JKS key store containing trusted certificate entries only, kept
/// in insertion order. Serialized stores list their entries sorted by alias.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct JksTrustStore {
    entries: Vec<TrustedCertificateEntry>,
}

/// `normalize_alias` returns the form of an alias used as a JKS key.
pub fn normalize_alias(alias: &str) -> String {
    alias.to_lowercase()
}

// aliases are lower-cased by JksTrustStore, and looked up exactly as read
fn key_store() -> KeyStore {
    KeyStore::with_options(KeyStoreOptions {
        ordered_aliases: true,
        case_exact_aliases: true,
        min_password_len: 1,
        ..Default::default()
    })
}

/// JKS digests each password character as one UTF-16BE unit. The `jks` crate prefixes each password
/// byte with a zero byte, so characters up to U+00FF are passed as single Latin-1 bytes.
fn password_bytes(password: &str) -> core::result::Result<Vec<u8>, String> {
    password
        .chars()
        .map(|c| {
            u8::try_from(c)
                .map_err(|_| "password characters beyond U+00FF are not supported".to_string())
        })
        .collect()
}

impl JksTrustStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[TrustedCertificateEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the store has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Aliases in insertion order
    pub fn aliases(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.alias.as_str()).collect()
    }

    /// `certificate` returns the DER-encoded certificate stored under `alias`, compared
    /// case-insensitively.
    pub fn certificate(&self, alias: &str) -> Option<&[u8]> {
        let alias = normalize_alias(alias);
        self.entries
            .iter()
            .find(|e| e.alias == alias)
            .map(|e| e.certificate.as_slice())
    }

    /// `add_trusted_certificate` appends an entry. An alias that is already present (ignoring case) is
    /// rejected.
    pub fn add_trusted_certificate(
        &mut self,
        alias: &str,
        certificate: Vec<u8>,
        creation_millis: u64,
    ) -> core::result::Result<(), String> {
        let alias = normalize_alias(alias);
        if self.entries.iter().any(|e| e.alias == alias) {
            return Err(format!("alias {} is already present", alias));
        }
        self.entries.push(TrustedCertificateEntry {
            alias,
            creation_millis,
            certificate,
        });
        Ok(())
    }

    /// `to_bytes` serializes the store, protecting it with `password`.
    pub fn to_bytes(&self, password: &str) -> core::result::Result<Vec<u8>, String> {
        let password = password_bytes(password)?;
        let mut ks = key_store();
        for e in &self.entries {
            let entry = jks::TrustedCertificateEntry {
                creation_time: UNIX_EPOCH + Duration::from_millis(e.creation_millis),
                certificate: Certificate {
                    cert_type: X509_CERT_TYPE.to_string(),
                    content: e.certificate.clone(),
                },
            };
            ks.set_trusted_certificate_entry(&e.alias, entry)
                .map_err(|err| format!("cannot add {}: {}", e.alias, err))?;
        }
        let mut out = vec![];
        ks.store(&mut out, &password).map_err(|e| e.to_string())?;
        Ok(out)
    }

    /// `from_bytes` parses a serialized store after verifying its integrity digest with `password`.
    pub fn from_bytes(buffer: &[u8], password: &str) -> core::result::Result<Self, String> {
        let password = password_bytes(password)?;
        let mut ks = key_store();
        ks.load(buffer, &password).map_err(|e| match e {
            KeyStoreError::InvalidDigest => {
                "Keystore was tampered with, or password was incorrect".to_string()
            }
            KeyStoreError::InvalidMagic => "not a JKS key store".to_string(),
            e => e.to_string(),
        })?;

        let mut store = JksTrustStore::new();
        for alias in ks.aliases() {
            if ks.is_private_key_entry(&alias) {
                return Err("private key entries are not supported".to_string());
            }
            let entry = ks
                .get_trusted_certificate_entry(&alias)
                .map_err(|e| format!("{}: {}", alias, e))?;
            let cert_type = entry.certificate.cert_type.as_str();
            if cert_type != X509_CERT_TYPE && cert_type != LEGACY_CERT_TYPE {
                return Err(format!("unsupported certificate type {}", cert_type));
            }
            let creation_millis = entry
                .creation_time
                .duration_since(UNIX_EPOCH)
                .ok()
                .and_then(|d| u64::try_from(d.as_millis()).ok())
                .ok_or_else(|| format!("{}: creation time out of range", alias))?;
            store.add_trusted_certificate(&alias, entry.certificate.content, creation_millis)?;
        }
        Ok(store)
    }

    /// `load` reads and parses the store at `path`.
    pub fn load(path: &Path, password: &str) -> Result<Self> {
        let buffer = get_file_as_byte_vec(path)?;
        JksTrustStore::from_bytes(&buffer, password).map_err(|reason| Error::StoreRead {
            path: path.to_path_buf(),
            reason,
        })
    }
}

#[test]
fn entry_round_trip_and_password() {
    let mut ks = JksTrustStore::new();
    ks.add_trusted_certificate("Second", vec![4, 5], 2000)
        .unwrap();
    ks.add_trusted_certificate("first", vec![1, 2, 3], 1000)
        .unwrap();
    assert!(ks.add_trusted_certificate("SECOND", vec![9], 3000).is_err());
    assert_eq!(vec!["second", "first"], ks.aliases());

    let bytes = ks.to_bytes("changeit").unwrap();
    assert_eq!(&[0xfe, 0xed, 0xfe, 0xed, 0, 0, 0, 2, 0, 0, 0, 2], &bytes[..12]);

    // read back sorted by alias
    let read = JksTrustStore::from_bytes(&bytes, "changeit").unwrap();
    assert_eq!(vec!["first", "second"], read.aliases());
    assert_eq!(&ks.entries()[1], &read.entries()[0]);
    assert_eq!(&ks.entries()[0], &read.entries()[1]);
    assert_eq!(Some([4u8, 5].as_slice()), read.certificate("SeCoNd"));
    assert_eq!(None, read.certificate("third"));

    let r = JksTrustStore::from_bytes(&bytes, "wrong");
    assert_eq!(
        Err("Keystore was tampered with, or password was incorrect".to_string()),
        r
    );

    // first certificate content begins at offset 42
    let mut tampered = bytes.clone();
    tampered[42] ^= 0xff;
    assert!(JksTrustStore::from_bytes(&tampered, "changeit").is_err());
    assert!(JksTrustStore::from_bytes(&bytes[..bytes.len() - 1], "changeit").is_err());
    assert_eq!(
        Err("not a JKS key store".to_string()),
        JksTrustStore::from_bytes(&bytes[4..], "changeit")
    );
}

#[test]
fn latin1_password_digest() {
    use sha1::{Digest, Sha1};

    let mut ks = JksTrustStore::new();
    ks.add_trusted_certificate("a", vec![1], 0).unwrap();
    let bytes = ks.to_bytes("pässwörd").unwrap();
    let (body, trailer) = bytes.split_at(bytes.len() - 20);

    let mut hasher = Sha1::new();
    for unit in "pässwörd".encode_utf16() {
        hasher.update(unit.to_be_bytes());
    }
    hasher.update(b"Mighty Aphrodite");
    hasher.update(body);
    assert_eq!(hasher.finalize().as_slice(), trailer);
    assert!(JksTrustStore::from_bytes(&bytes, "pässwörd").is_ok());

    assert!(ks.to_bytes("\u{5bc6}\u{7801}").is_err());
}
