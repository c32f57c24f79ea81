//! The alias_resolver module determines the alias under which a certificate is stored, using an
//! optional sidecar configuration file named `<certificate-filename>.config` next to the certificate.
//!
//! A sidecar containing `alias=my-root` stores the certificate as `my-root`. Without a sidecar, or
//! when the sidecar does not define a non-empty `alias`, the certificate's file name (including the
//! extension) is used unless [`AliasResolver::require_explicit_alias`] is set, in which case the
//! absence is an [`Error::AliasConfig`].

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;

use crate::source::properties::parse_properties;
use crate::util::error::*;

/// Suffix appended to a certificate file name to locate its sidecar configuration file.
pub const SIDECAR_SUFFIX: &str = ".config";

/// The only key recognized in a sidecar configuration file.
pub const ALIAS_KEY: &str = "alias";

/// `AliasOverride` is the typed content of a sidecar configuration file. Unrecognized keys are
/// discarded when parsing.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AliasOverride {
    /// Value of the `alias` key, if present and non-empty
    pub alias: Option<String>,
}

impl AliasOverride {
    /// Parses sidecar text. Returns a description of the syntax error on failure. The alias is
    /// trimmed at both ends.
    pub fn parse(text: &str) -> core::result::Result<Self, String> {
        let props = parse_properties(text)?;
        let alias = props
            .get(ALIAS_KEY)
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        Ok(AliasOverride { alias })
    }

    /// Reads and parses the sidecar file at `path`. Returns `Ok(None)` when no file exists there.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match std::fs::metadata(path) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::AliasConfig {
                    path: path.to_path_buf(),
                    reason: format!("cannot be accessed: {}", e),
                })
            }
        }
        let bytes = std::fs::read(path).map_err(|e| Error::AliasConfig {
            path: path.to_path_buf(),
            reason: format!("unreadable: {}", e),
        })?;
        let text = String::from_utf8(bytes).map_err(|_| Error::AliasConfig {
            path: path.to_path_buf(),
            reason: "not valid UTF-8 text".to_string(),
        })?;
        let ao = AliasOverride::parse(&text).map_err(|reason| Error::AliasConfig {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(Some(ao))
    }
}

/// `sidecar_path` returns the path of the sidecar configuration file for a certificate file.
pub fn sidecar_path(certificate: &Path) -> PathBuf {
    let mut name: OsString = certificate
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(SIDECAR_SUFFIX);
    certificate.with_file_name(name)
}

/// `AliasResolver` computes the alias for each certificate file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AliasResolver {
    /// When set, a certificate without a sidecar file defining a non-empty `alias` is an error
    /// instead of falling back to the file name.
    pub require_explicit_alias: bool,
}

impl AliasResolver {
    /// Creates an [`AliasResolver`] using the given policy for missing aliases.
    pub fn new(require_explicit_alias: bool) -> Self {
        AliasResolver {
            require_explicit_alias,
        }
    }

    /// `resolve` returns the alias for the certificate at `certificate`.
    pub fn resolve(&self, certificate: &Path) -> Result<String> {
        let config = sidecar_path(certificate);
        let explicit = AliasOverride::load(&config)?.and_then(|ao| ao.alias);
        if let Some(alias) = explicit {
            debug!("Using alias {} from {}", alias, config.display());
            return Ok(alias);
        }

        if self.require_explicit_alias {
            return Err(Error::AliasConfig {
                path: config,
                reason: format!("no non-empty {} key is defined", ALIAS_KEY),
            });
        }

        match certificate.file_name().and_then(|n| n.to_str()) {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(Error::AliasConfig {
                path: config,
                reason: "file name cannot be used as an alias".to_string(),
            }),
        }
    }
}

/// `resolve_alias` resolves an alias using the default, permissive policy.
pub fn resolve_alias(certificate: &Path) -> Result<String> {
    AliasResolver::default().resolve(certificate)
}

#[test]
fn sidecar_naming() {
    assert_eq!(
        PathBuf::from("a/b/root.pem.config"),
        sidecar_path(Path::new("a/b/root.pem"))
    );
}

#[test]
fn override_parsing() {
    assert_eq!(
        Some("foo".to_string()),
        AliasOverride::parse("alias=foo\nother=bar").unwrap().alias
    );
    assert_eq!(None, AliasOverride::parse("other=bar").unwrap().alias);
    assert_eq!(None, AliasOverride::parse("alias=   ").unwrap().alias);
    assert_eq!(None, AliasOverride::parse("").unwrap().alias);
    // trailing blanks are not part of the alias
    assert_eq!(
        Some("foo".to_string()),
        AliasOverride::parse("alias=foo \t").unwrap().alias
    );
    // lone carriage returns end lines
    assert_eq!(
        Some("foo".to_string()),
        AliasOverride::parse("# comment\ralias=foo\r").unwrap().alias
    );
}

#[test]
fn sidecar_access_errors() {
    assert_eq!(
        None,
        AliasOverride::load(Path::new("tests/examples/certs/missing.pem.config")).unwrap()
    );
    // a path through a regular file fails with something other than NotFound
    match AliasOverride::load(Path::new("tests/examples/certs/alpha.pem/x.config")) {
        Err(Error::AliasConfig { path, reason }) => {
            assert!(path.ends_with("alpha.pem/x.config"));
            assert!(reason.starts_with("cannot be accessed"));
        }
        r => panic!("unexpected result: {:?}", r),
    }
    // a directory in place of the sidecar
    assert!(matches!(
        AliasOverride::load(Path::new("tests/examples/certs/intermediate")),
        Err(Error::AliasConfig { .. })
    ));
}
