//! Error types

use core::fmt;
use std::path::PathBuf;

use crate::validator::ValidationReport;

/// Result type
pub type Result<T> = core::result::Result<T, Error>;

/// Error type
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Scan occurs when the scan root does not exist, is not a directory or cannot be traversed.
    Scan {
        /// Directory that was to be scanned
        root: PathBuf,
        /// Description of the failure
        reason: String,
    },
    /// UnreadableFile occurs when a discovered file cannot be read.
    UnreadableFile {
        /// File that could not be read
        path: PathBuf,
        /// Kind of the underlying I/O error
        kind: std::io::ErrorKind,
    },
    /// MalformedCertificate occurs when a file does not contain exactly one decodable X.509
    /// certificate.
    MalformedCertificate {
        /// File that could not be decoded
        path: PathBuf,
        /// Description of the failure
        reason: String,
    },
    /// AliasConfig occurs when a sidecar configuration file exists but cannot be read or parsed,
    /// or when an explicit alias is required and none is available.
    AliasConfig {
        /// Sidecar configuration file
        path: PathBuf,
        /// Description of the failure
        reason: String,
    },
    /// DuplicateAlias occurs when two certificate files resolve to the same alias.
    DuplicateAlias {
        /// The alias both files resolved to
        alias: String,
        /// File that claimed the alias first
        first: PathBuf,
        /// File that collided with it
        second: PathBuf,
    },
    /// StoreWrite occurs when the trust store cannot be serialized or persisted.
    StoreWrite {
        /// Target trust store
        path: PathBuf,
        /// Description of the failure
        reason: String,
    },
    /// StoreRead occurs when an existing trust store cannot be read back.
    StoreRead {
        /// Trust store that was read
        path: PathBuf,
        /// Description of the failure
        reason: String,
    },
    /// Settings occurs when a settings file cannot be read or parsed.
    Settings {
        /// Settings file
        path: PathBuf,
        /// Description of the failure
        reason: String,
    },
    /// Validation carries the certificates that did not satisfy the remaining-validity policy.
    Validation(ValidationReport),
    /// Misconfiguration lists the names of properties that were not configured appropriately.
    Misconfiguration(Vec<String>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Scan { root, reason } => {
                write!(f, "ScanError: {}: {}", root.display(), reason)
            }
            Error::UnreadableFile { path, kind } => {
                write!(f, "UnreadableFileError: {}: {:?}", path.display(), kind)
            }
            Error::MalformedCertificate { path, reason } => {
                write!(f, "MalformedCertificateError: {}: {}", path.display(), reason)
            }
            Error::AliasConfig { path, reason } => {
                write!(f, "AliasConfigError: {}: {}", path.display(), reason)
            }
            Error::DuplicateAlias {
                alias,
                first,
                second,
            } => write!(
                f,
                "DuplicateAliasError: alias '{}' is used by both {} and {}",
                alias,
                first.display(),
                second.display()
            ),
            Error::StoreWrite { path, reason } => {
                write!(f, "StoreWriteError: {}: {}", path.display(), reason)
            }
            Error::StoreRead { path, reason } => {
                write!(f, "StoreReadError: {}: {}", path.display(), reason)
            }
            Error::Settings { path, reason } => {
                write!(f, "SettingsError: {}: {}", path.display(), reason)
            }
            Error::Validation(report) => write!(f, "ValidationFailure: {}", report),
            Error::Misconfiguration(props) => write!(
                f,
                "The following properties have to be configured appropriately: {}",
                props.join(", ")
            ),
        }
    }
}

impl std::error::Error for Error {}

#[test]
fn error_test() {
    let e = Error::DuplicateAlias {
        alias: "x".to_string(),
        first: PathBuf::from("a/one.pem"),
        second: PathBuf::from("b/two.pem"),
    };
    let s = format!("{}", e);
    assert!(s.contains("'x'"));
    assert!(s.contains("one.pem"));
    assert!(s.contains("two.pem"));

    let e = Error::Misconfiguration(vec!["password".to_string(), "path".to_string()]);
    assert_eq!(
        "The following properties have to be configured appropriately: password, path",
        format!("{}", e)
    );

    let _s = format!(
        "{}",
        Error::UnreadableFile {
            path: PathBuf::from("x.crt"),
            kind: std::io::ErrorKind::PermissionDenied
        }
    );
    let _s = format!("{}", Error::Validation(ValidationReport::default()));
}
