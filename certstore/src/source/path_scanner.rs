//! The path_scanner module discovers certificate files beneath a scan root using a file extension
//! policy.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error};
use walkdir::WalkDir;

use crate::util::error::*;

/// `ScanRoot` pairs a directory with the file extensions (without leading dot, compared
/// case-sensitively) that identify certificate files beneath it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanRoot {
    root: PathBuf,
    extensions: Vec<String>,
}

impl ScanRoot {
    /// Creates a [`ScanRoot`]. The extension list must contain at least one non-empty entry that does
    /// not begin with a dot, else [`Error::Misconfiguration`] naming `accepted_file_endings` is
    /// returned.
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>) -> Result<Self> {
        if extensions.is_empty()
            || extensions
                .iter()
                .any(|e| e.trim().is_empty() || e.starts_with('.'))
        {
            return Err(Error::Misconfiguration(vec![
                "accepted_file_endings".to_string()
            ]));
        }
        Ok(ScanRoot {
            root: root.into(),
            extensions,
        })
    }

    /// Directory that is scanned
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Accepted file extensions, in configured order
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// `matches` returns true when the file name ends with `"." + ext` for some accepted `ext`. The
    /// comparison is on raw bytes, without case folding.
    pub fn matches(&self, file_name: &std::ffi::OsStr) -> bool {
        let name = file_name.as_encoded_bytes();
        self.extensions.iter().any(|ext| {
            name.len() > ext.len()
                && name.ends_with(ext.as_bytes())
                && name[name.len() - ext.len() - 1] == b'.'
        })
    }

    /// `scan` recursively visits every regular file beneath the root and returns those accepted by
    /// [`ScanRoot::matches`], sorted by path. Symbolic links to directories are not followed. A
    /// symbolic link that resolves to a regular file is treated as that file.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            error!("{} does not exist or is not a directory", self.root.display());
            return Err(Error::Scan {
                root: self.root.clone(),
                reason: "does not exist or is not a directory".to_string(),
            });
        }

        let mut paths = vec![];
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let e = match entry {
                Ok(e) => e,
                Err(err) => {
                    error!("Failed to traverse {}: {}", self.root.display(), err);
                    return Err(Error::Scan {
                        root: self.root.clone(),
                        reason: err.to_string(),
                    });
                }
            };

            let is_file = if e.file_type().is_symlink() {
                fs::metadata(e.path()).map(|md| md.is_file()).unwrap_or(false)
            } else {
                e.file_type().is_file()
            };
            if is_file && self.matches(e.file_name()) {
                debug!("Found {}", e.path().display());
                paths.push(e.into_path());
            }
        }
        paths.sort();
        Ok(paths)
    }
}

/// `scan` is shorthand for building a [`ScanRoot`] and calling [`ScanRoot::scan`].
pub fn scan(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    ScanRoot::new(root, extensions.to_vec())?.scan()
}

#[test]
fn extension_matching() {
    use std::ffi::OsStr;
    let sr = ScanRoot::new("tests/examples", vec!["pem".to_string(), "crt".to_string()]).unwrap();
    assert!(sr.matches(OsStr::new("a.pem")));
    assert!(sr.matches(OsStr::new("a.b.crt")));
    assert!(!sr.matches(OsStr::new("a.PEM")));
    assert!(!sr.matches(OsStr::new("apem")));
    assert!(!sr.matches(OsStr::new("pem")));
    assert!(!sr.matches(OsStr::new("a.pem.config")));
    assert!(!sr.matches(OsStr::new("a.cert")));
}

#[test]
fn bad_extension_policy() {
    assert!(ScanRoot::new("tests/examples", vec![]).is_err());
    assert!(ScanRoot::new("tests/examples", vec![".pem".to_string()]).is_err());
    assert!(ScanRoot::new("tests/examples", vec![" ".to_string()]).is_err());
}

#[test]
fn non_existent_dir() {
    let r = scan(Path::new("tests/examples/nonexistent"), &["pem".to_string()]);
    assert!(matches!(r, Err(Error::Scan { .. })));
}
