//! The file_utils module contains utility functions related to interactions with the filesystem and
//! to presentation of certificate buffers.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::util::error::*;

/// `get_file_as_byte_vec` takes a Path containing a file name and returns a vector of bytes containing
/// the contents of that file or an [Error::UnreadableFile].
pub fn get_file_as_byte_vec(filename: &Path) -> Result<Vec<u8>> {
    let unreadable = |e: std::io::Error| Error::UnreadableFile {
        path: filename.to_path_buf(),
        kind: e.kind(),
    };
    let mut f = File::open(filename).map_err(unreadable)?;
    let mut buffer = vec![];
    f.read_to_end(&mut buffer).map_err(unreadable)?;
    Ok(buffer)
}

/// `buffer_to_colon_hex` renders a buffer as upper case hex octets separated by colons, the notation
/// used by keytool and openssl for fingerprints.
pub fn buffer_to_colon_hex(buffer: &[u8]) -> String {
    buffer
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<String>>()
        .join(":")
}

/// `fingerprint_sha1` returns the SHA-1 fingerprint of a DER-encoded certificate.
pub fn fingerprint_sha1(der: &[u8]) -> String {
    buffer_to_colon_hex(Sha1::digest(der).as_slice())
}

/// `fingerprint_sha256` returns the SHA-256 fingerprint of a DER-encoded certificate.
pub fn fingerprint_sha256(der: &[u8]) -> String {
    buffer_to_colon_hex(Sha256::digest(der).as_slice())
}

#[test]
fn colon_hex() {
    assert_eq!("", buffer_to_colon_hex(&[]));
    assert_eq!("0A", buffer_to_colon_hex(&[0x0a]));
    assert_eq!("DE:AD:BE:EF", buffer_to_colon_hex(&[0xde, 0xad, 0xbe, 0xef]));
}

#[test]
fn missing_file() {
    let r = get_file_as_byte_vec(Path::new("tests/examples/nonexistent.crt"));
    assert_eq!(
        Err(Error::UnreadableFile {
            path: Path::new("tests/examples/nonexistent.crt").to_path_buf(),
            kind: std::io::ErrorKind::NotFound
        }),
        r
    );
}
