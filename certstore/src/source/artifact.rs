//! Certificate artifacts produced by one scan pass

use std::path::PathBuf;

use log::{error, info};

use crate::source::{alias_resolver::AliasResolver, cert_loader::*, path_scanner::ScanRoot};
use crate::util::error::*;

/// `CertificateArtifact` associates a discovered certificate file with its resolved alias and its
/// parsed contents. Artifacts are created by [`collect_artifacts`] and not modified afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CertificateArtifact {
    /// Zero-based position in scan order; used only for naming in logs and reports
    pub index: usize,
    /// File the certificate was read from
    pub path: PathBuf,
    /// Alias under which the certificate is stored
    pub alias: String,
    /// Parsed certificate
    pub record: CertificateRecord,
}

/// `collect_artifacts` scans `scan_root`, then resolves the alias and parses the certificate for each
/// discovered file in scan order. The first failure is returned and no further files are processed.
pub fn collect_artifacts(
    scan_root: &ScanRoot,
    resolver: &AliasResolver,
) -> Result<Vec<CertificateArtifact>> {
    let paths = scan_root.scan()?;
    info!(
        "Found {} certificate file(s) beneath {}",
        paths.len(),
        scan_root.root().display()
    );

    let mut artifacts = Vec::with_capacity(paths.len());
    for (index, path) in paths.into_iter().enumerate() {
        let alias = resolver.resolve(&path).map_err(|e| {
            error!("#{}: {}", index, e);
            e
        })?;
        let record = load(&path).map_err(|e| {
            error!("#{}: {}", index, e);
            e
        })?;
        artifacts.push(CertificateArtifact {
            index,
            path,
            alias,
            record,
        });
    }
    Ok(artifacts)
}
