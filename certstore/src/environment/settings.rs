//! The settings module defines the configuration consumed by [`configure`](crate::configure).
//!
//! Settings are typically read from a JSON file. Every field is optional and falls back to the
//! default shown below.
//!
//! ```json
//! {
//!   "source": "src/main/certs",
//!   "accepted_file_endings": ["crt", "cer", "pem"],
//!   "trust_store": { "path": "build/cacerts.jks", "password": "changeit" },
//!   "at_least_valid_days": 90,
//!   "require_explicit_alias": false,
//!   "build_enabled": true,
//!   "check_enabled": true
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::util::{error::*, file_utils::get_file_as_byte_vec};

/// Default folder scanned for certificates
pub const DEFAULT_SOURCE: &str = "src/main/certs";
/// Default trust store location
pub const DEFAULT_TRUST_STORE_PATH: &str = "build/cacerts.jks";
/// Default trust store password
pub const DEFAULT_TRUST_STORE_PASSWORD: &str = "changeit";
/// Default minimum number of days certificates must remain valid
pub const DEFAULT_AT_LEAST_VALID_DAYS: u32 = 90;

/// Default accepted file endings
pub fn default_accepted_file_endings() -> Vec<String> {
    vec!["crt".to_string(), "cer".to_string(), "pem".to_string()]
}

/// Location and password of the trust store to build
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustStoreLocation {
    /// Trust store file; the store type is derived from the extension
    pub path: PathBuf,
    /// Trust store password
    pub password: String,
}

impl Default for TrustStoreLocation {
    fn default() -> Self {
        TrustStoreLocation {
            path: PathBuf::from(DEFAULT_TRUST_STORE_PATH),
            password: DEFAULT_TRUST_STORE_PASSWORD.to_string(),
        }
    }
}

/// `TrustStoreSettings` gathers everything needed to build a trust store and check its certificates.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustStoreSettings {
    /// Folder scanned for certificates
    pub source: PathBuf,
    /// A file is processed as a certificate when its name ends with `.` plus one of these
    pub accepted_file_endings: Vec<String>,
    /// Trust store to build
    pub trust_store: TrustStoreLocation,
    /// Number of days certificates have to be at least valid
    pub at_least_valid_days: u32,
    /// Require every certificate to have an alias set in its sidecar file
    pub require_explicit_alias: bool,
    /// Build the trust store when no action is requested explicitly
    pub build_enabled: bool,
    /// Check certificates when no action is requested explicitly
    pub check_enabled: bool,
}

impl Default for TrustStoreSettings {
    fn default() -> Self {
        TrustStoreSettings {
            source: PathBuf::from(DEFAULT_SOURCE),
            accepted_file_endings: default_accepted_file_endings(),
            trust_store: TrustStoreLocation::default(),
            at_least_valid_days: DEFAULT_AT_LEAST_VALID_DAYS,
            require_explicit_alias: false,
            build_enabled: true,
            check_enabled: true,
        }
    }
}

impl TrustStoreSettings {
    /// `from_json` parses settings from a JSON buffer.
    pub fn from_json(json: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(json)
    }

    /// `read` loads settings from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let json = get_file_as_byte_vec(path)?;
        TrustStoreSettings::from_json(&json).map_err(|e| Error::Settings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[test]
fn settings_defaults() {
    let s = TrustStoreSettings::from_json(b"{}").unwrap();
    assert_eq!(TrustStoreSettings::default(), s);
    assert_eq!(90, s.at_least_valid_days);
    assert_eq!(vec!["crt", "cer", "pem"], s.accepted_file_endings);
    assert_eq!(PathBuf::from("build/cacerts.jks"), s.trust_store.path);
    assert_eq!("changeit", s.trust_store.password);
}

#[test]
fn settings_partial() {
    let s = TrustStoreSettings::from_json(
        br#"{"source": "certs", "trust_store": {"path": "out/ts.jks"}, "check_enabled": false}"#,
    )
    .unwrap();
    assert_eq!(PathBuf::from("certs"), s.source);
    assert_eq!(PathBuf::from("out/ts.jks"), s.trust_store.path);
    assert_eq!("changeit", s.trust_store.password);
    assert!(s.build_enabled);
    assert!(!s.check_enabled);

    let ser = serde_json::to_string(&s).unwrap();
    let deser = TrustStoreSettings::from_json(ser.as_bytes()).unwrap();
    assert_eq!(s, deser);
}

#[test]
fn settings_errors() {
    assert!(TrustStoreSettings::from_json(b"{\"at_least_valid_days\": -1}").is_err());
    let r = TrustStoreSettings::read(Path::new("tests/examples/nonexistent.json"));
    assert!(matches!(r, Err(Error::UnreadableFile { .. })));
}
