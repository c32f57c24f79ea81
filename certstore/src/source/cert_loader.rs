//! The cert_loader module parses certificate files into [`CertificateRecord`] instances.
//!
//! Files may be binary DER or PEM. Each file must hold exactly one certificate.

use std::path::Path;

use der::Decode;
use x509_cert::Certificate;

use crate::util::{error::*, file_utils::*, time_of_interest::TimeOfInterest};

/// `CertificateRecord` holds the fields of a certificate needed for reporting and validity checks
/// alongside its DER encoding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CertificateRecord {
    /// Subject name rendered as an RFC 4514 string
    pub subject: String,
    /// Start of the validity window
    pub not_before: TimeOfInterest,
    /// End of the validity window
    pub not_after: TimeOfInterest,
    /// DER encoding of the certificate
    pub encoded: Vec<u8>,
}

impl CertificateRecord {
    /// `from_der` decodes a single DER-encoded certificate. `path` is only used in error values.
    pub fn from_der(path: &Path, der: &[u8]) -> Result<Self> {
        let cert = Certificate::from_der(der).map_err(|e| Error::MalformedCertificate {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_certificate(path, &cert, der.to_vec())
    }

    fn from_certificate(path: &Path, cert: &Certificate, encoded: Vec<u8>) -> Result<Self> {
        let validity = &cert.tbs_certificate.validity;
        let not_before = TimeOfInterest::from(validity.not_before);
        let not_after = TimeOfInterest::from(validity.not_after);
        if not_before > not_after {
            return Err(Error::MalformedCertificate {
                path: path.to_path_buf(),
                reason: format!("notBefore {} is after notAfter {}", not_before, not_after),
            });
        }
        Ok(CertificateRecord {
            subject: cert.tbs_certificate.subject.to_string(),
            not_before,
            not_after,
            encoded,
        })
    }

    /// SHA-1 fingerprint of the certificate
    pub fn sha1_fingerprint(&self) -> String {
        fingerprint_sha1(&self.encoded)
    }

    /// SHA-256 fingerprint of the certificate
    pub fn sha256_fingerprint(&self) -> String {
        fingerprint_sha256(&self.encoded)
    }
}

const PEM_BEGIN: &[u8] = b"-----BEGIN";
const PEM_END: &[u8] = b"-----END";
const PEM_DASHES: &[u8] = b"-----";
const CERTIFICATE_LABEL: &str = "CERTIFICATE";

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

/// `pem_blocks` returns each span from a `-----BEGIN` marker through the closing dashes of the
/// following `-----END` marker. Text outside the spans is ignored.
fn pem_blocks(buffer: &[u8]) -> core::result::Result<Vec<&[u8]>, String> {
    let mut blocks = vec![];
    let mut pos = 0;
    while let Some(begin) = find(buffer, PEM_BEGIN, pos) {
        let end = find(buffer, PEM_END, begin + PEM_BEGIN.len())
            .and_then(|end| find(buffer, PEM_DASHES, end + PEM_END.len()))
            .map(|dashes| dashes + PEM_DASHES.len())
            .ok_or_else(|| "PEM block has no matching -----END line".to_string())?;
        blocks.push(&buffer[begin..end]);
        pos = end;
    }
    Ok(blocks)
}

/// `parse_certificate` decodes a buffer read from `path` into a [`CertificateRecord`].
///
/// A buffer that starts with a DER SEQUENCE tag is decoded as DER. Otherwise every PEM block in the
/// buffer is decoded and exactly one of them must be a certificate. Text before, between and after
/// the blocks, such as `subject=` lines or `Bag Attributes` written by openssl, is ignored.
pub fn parse_certificate(path: &Path, buffer: &[u8]) -> Result<CertificateRecord> {
    let malformed = |reason: String| Error::MalformedCertificate {
        path: path.to_path_buf(),
        reason,
    };
    if buffer.first() == Some(&0x30) || find(buffer, PEM_BEGIN, 0).is_none() {
        return CertificateRecord::from_der(path, buffer);
    }

    let mut certs = vec![];
    for block in pem_blocks(buffer).map_err(malformed)? {
        let (label, der) = pem_rfc7468::decode_vec(block).map_err(|e| malformed(e.to_string()))?;
        if label == CERTIFICATE_LABEL {
            certs.push(der);
        }
    }
    if certs.len() != 1 {
        return Err(malformed(format!(
            "expected exactly one certificate, found {}",
            certs.len()
        )));
    }
    CertificateRecord::from_der(path, &certs.remove(0))
}

/// `load` reads the file at `path` and parses it as a single certificate. I/O failures produce
/// [`Error::UnreadableFile`], decoding failures produce [`Error::MalformedCertificate`].
pub fn load(path: &Path) -> Result<CertificateRecord> {
    let buffer = get_file_as_byte_vec(path)?;
    parse_certificate(path, &buffer)
}

#[test]
fn pem_block_spans() {
    let text = b"subject=CN=a\n-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\ntrailer\n";
    let blocks = pem_blocks(text).unwrap();
    assert_eq!(1, blocks.len());
    assert!(blocks[0].starts_with(b"-----BEGIN CERTIFICATE-----"));
    assert!(blocks[0].ends_with(b"-----END CERTIFICATE-----"));

    assert!(pem_blocks(b"-----BEGIN CERTIFICATE-----\nAAAA\n").is_err());
    assert!(pem_blocks(b"no markers").unwrap().is_empty());
}

#[test]
fn empty_buffer_is_malformed() {
    let r = parse_certificate(Path::new("empty.crt"), &[]);
    assert!(matches!(r, Err(Error::MalformedCertificate { .. })));
    let r = parse_certificate(Path::new("unterminated.pem"), b"-----BEGIN CERTIFICATE-----\n");
    assert!(matches!(r, Err(Error::MalformedCertificate { .. })));
}
