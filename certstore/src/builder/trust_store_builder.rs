//! The trust_store_builder module assembles [`CertificateArtifact`] instances into a JKS trust store
//! and writes it to disk atomically.
//!
//! The store is always rebuilt from scratch: whatever existed at the target path beforehand has no
//! influence on the result. The new store is written to a temporary file in the target directory
//! and renamed into place, so observers see either the previous file or the complete new one. A
//! replaced file keeps its permissions.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use tempfile::{Builder, NamedTempFile};

use crate::builder::key_store::*;
use crate::source::artifact::CertificateArtifact;
use crate::util::{error::*, time_of_interest::Clock};

/// `TrustStoreSpec` describes the trust store to produce.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrustStoreSpec {
    /// Target trust store file
    pub path: PathBuf,
    /// Password protecting the trust store
    pub password: String,
}

impl TrustStoreSpec {
    /// Creates a [`TrustStoreSpec`]
    pub fn new(path: impl Into<PathBuf>, password: impl Into<String>) -> Self {
        TrustStoreSpec {
            path: path.into(),
            password: password.into(),
        }
    }
}

/// `TrustStoreBuilder` writes the trust store described by a [`TrustStoreSpec`].
pub struct TrustStoreBuilder<'a> {
    spec: &'a TrustStoreSpec,
    clock: &'a dyn Clock,
}

impl<'a> TrustStoreBuilder<'a> {
    /// Creates a builder. `clock` supplies the creation timestamp recorded for each entry.
    pub fn new(spec: &'a TrustStoreSpec, clock: &'a dyn Clock) -> Self {
        TrustStoreBuilder { spec, clock }
    }

    fn write_error(&self, reason: String) -> Error {
        error!(
            "Failed to write trust store {}: {}",
            self.spec.path.display(),
            reason
        );
        Error::StoreWrite {
            path: self.spec.path.clone(),
            reason,
        }
    }

    /// `assemble` inserts every artifact, in order, into a new in-memory store. Two artifacts whose
    /// aliases are equal ignoring case produce [`Error::DuplicateAlias`] naming both files.
    pub fn assemble(&self, artifacts: &[CertificateArtifact]) -> Result<JksTrustStore> {
        let millis = self.clock.now().as_unix_millis();
        let mut claimed: BTreeMap<String, &Path> = BTreeMap::new();
        let mut ks = JksTrustStore::new();
        for a in artifacts {
            let key = normalize_alias(&a.alias);
            if let Some(first) = claimed.get(&key) {
                error!(
                    "Alias {} of {} is already used by {}",
                    a.alias,
                    a.path.display(),
                    first.display()
                );
                return Err(Error::DuplicateAlias {
                    alias: a.alias.clone(),
                    first: first.to_path_buf(),
                    second: a.path.clone(),
                });
            }
            ks.add_trusted_certificate(&a.alias, a.record.encoded.clone(), millis)
                .map_err(|e| self.write_error(e))?;
            claimed.insert(key, &a.path);
            debug!("#{}: added {} as {}", a.index, a.path.display(), a.alias);
        }
        Ok(ks)
    }

    /// `build` assembles the store and replaces the file at the target path with it. On failure the
    /// file at the target path, if any, is left untouched. Returns the path that was written.
    pub fn build(&self, artifacts: &[CertificateArtifact]) -> Result<PathBuf> {
        if self.spec.password.trim().is_empty() {
            return Err(self.write_error("password must not be blank".to_string()));
        }

        let ks = self.assemble(artifacts)?;
        let bytes = ks
            .to_bytes(&self.spec.password)
            .map_err(|e| self.write_error(e))?;
        self.persist(&bytes)?;

        info!(
            "Wrote {} certificate(s) to {}",
            ks.len(),
            self.spec.path.display()
        );
        Ok(self.spec.path.clone())
    }

    fn persist(&self, bytes: &[u8]) -> Result<()> {
        let target = &self.spec.path;
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| {
                self.write_error(format!("cannot create {}: {}", dir.display(), e))
            })?;
        }

        let mut tmp = temp_file_in(&dir).map_err(|e| {
            self.write_error(format!(
                "cannot create temporary file in {}: {}",
                dir.display(),
                e
            ))
        })?;
        // a replaced store keeps its permissions
        if let Ok(existing) = fs::metadata(target) {
            if existing.is_file() {
                tmp.as_file()
                    .set_permissions(existing.permissions())
                    .map_err(|e| self.write_error(e.to_string()))?;
            }
        }
        tmp.write_all(bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| self.write_error(e.to_string()))?;
        tmp.persist(target)
            .map_err(|e| self.write_error(e.error.to_string()))?;
        Ok(())
    }
}

/// `temp_file_in` creates the temporary file in `dir`. On Unix it requests mode 0666 so that a new
/// store gets the process umask applied, as any other newly created file would.
#[allow(unused_mut)]
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}
