//! Helpers shared by the integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use certstore::*;
use tempfile::TempDir;
use walkdir::WalkDir;

/// notBefore shared by all fixture certificates (2026-10-19T20:26:47Z)
pub const NOT_BEFORE: u64 = 1_792_441_607;
/// notAfter of certs/alpha.pem
pub const ALPHA_NOT_AFTER: u64 = 2_107_801_607;
/// notAfter of certs/intermediate/bravo.crt
pub const BRAVO_NOT_AFTER: u64 = 1_827_001_607;
/// notAfter of certs/intermediate/charlie.cer
pub const CHARLIE_NOT_AFTER: u64 = 1_795_033_607;

pub const DAY: u64 = 86_400;

/// Copies the fixture folder `tests/examples/<name>` into a fresh temporary folder.
pub fn copy_fixture(name: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    copy_tree(&Path::new("tests/examples").join(name), tmp.path());
    tmp
}

pub fn copy_tree(from: &Path, to: &Path) {
    for e in WalkDir::new(from) {
        let e = e.unwrap();
        let rel = e.path().strip_prefix(from).unwrap();
        let dest = to.join(rel);
        if e.file_type().is_dir() {
            fs::create_dir_all(&dest).unwrap();
        } else {
            fs::copy(e.path(), &dest).unwrap();
        }
    }
}

pub fn default_scan_root(root: &Path) -> ScanRoot {
    ScanRoot::new(root, default_accepted_file_endings()).unwrap()
}

pub fn artifacts_in(root: &Path) -> Vec<CertificateArtifact> {
    collect_artifacts(&default_scan_root(root), &AliasResolver::default()).unwrap()
}

pub fn clock_at(secs: u64) -> FixedClock {
    FixedClock::from_unix_secs(secs).unwrap()
}

pub fn relative_names(root: &Path, paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap()
                .to_str()
                .unwrap()
                .replace('\\', "/")
        })
        .collect()
}
