mod common;

use std::fs;
use std::path::Path;

use certstore::*;
use common::*;
use hex_literal::hex;
use sha1::{Digest, Sha1};

#[test]
fn scan_matches_only_accepted_endings() {
    let root = Path::new("tests/examples/certs");
    let found = default_scan_root(root).scan().unwrap();
    assert_eq!(
        vec![
            "alpha.pem",
            "intermediate/bravo.crt",
            "intermediate/charlie.cer"
        ],
        relative_names(root, &found)
    );

    let found = scan(root, &["der".to_string()]).unwrap();
    assert_eq!(
        vec!["intermediate/archive/delta.der"],
        relative_names(root, &found)
    );

    // sidecar files are only picked up when explicitly asked for
    let found = scan(root, &["config".to_string(), "txt".to_string()]).unwrap();
    assert_eq!(
        vec![
            "alpha.pem.config",
            "intermediate/charlie.cer.config",
            "notes.txt"
        ],
        relative_names(root, &found)
    );
}

#[test]
fn scan_is_case_sensitive_and_handles_empty_trees() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("empty/nested")).unwrap();
    fs::write(tmp.path().join("UPPER.PEM"), b"x").unwrap();
    fs::write(tmp.path().join("lower.pem"), b"x").unwrap();

    let found = scan(tmp.path(), &["pem".to_string()]).unwrap();
    assert_eq!(vec!["lower.pem"], relative_names(tmp.path(), &found));

    let found = scan(&tmp.path().join("empty"), &["pem".to_string()]).unwrap();
    assert!(found.is_empty());
}

#[test]
fn scan_rejects_missing_root_and_files() {
    let r = scan(Path::new("tests/examples/nonexistent"), &["pem".to_string()]);
    assert!(matches!(r, Err(Error::Scan { .. })));
    let r = scan(Path::new("tests/examples/certs/alpha.pem"), &["pem".to_string()]);
    assert!(matches!(r, Err(Error::Scan { .. })));
}

#[cfg(unix)]
#[test]
fn scan_does_not_follow_directory_links() {
    let tmp = copy_fixture("certs");
    std::os::unix::fs::symlink(tmp.path(), tmp.path().join("intermediate/loop")).unwrap();
    std::os::unix::fs::symlink(
        tmp.path().join("alpha.pem"),
        tmp.path().join("linked.pem"),
    )
    .unwrap();
    let found = default_scan_root(tmp.path()).scan().unwrap();
    assert_eq!(
        vec![
            "alpha.pem",
            "intermediate/bravo.crt",
            "intermediate/charlie.cer",
            "linked.pem"
        ],
        relative_names(tmp.path(), &found)
    );
}

#[test]
fn alias_resolution() {
    let root = Path::new("tests/examples/certs");
    assert_eq!(
        "alpha-root",
        resolve_alias(&root.join("alpha.pem")).unwrap()
    );
    // no sidecar
    assert_eq!(
        "bravo.crt",
        resolve_alias(&root.join("intermediate/bravo.crt")).unwrap()
    );
    // sidecar with unrelated keys only
    assert_eq!(
        "charlie.cer",
        resolve_alias(&root.join("intermediate/charlie.cer")).unwrap()
    );
}

#[test]
fn explicit_alias_required() {
    let root = Path::new("tests/examples/certs");
    let strict = AliasResolver::new(true);
    assert_eq!("alpha-root", strict.resolve(&root.join("alpha.pem")).unwrap());

    match strict.resolve(&root.join("intermediate/bravo.crt")) {
        Err(Error::AliasConfig { path, .. }) => {
            assert!(path.ends_with("intermediate/bravo.crt.config"))
        }
        r => panic!("unexpected result: {:?}", r),
    }
    assert!(matches!(
        strict.resolve(&root.join("intermediate/charlie.cer")),
        Err(Error::AliasConfig { .. })
    ));
}

#[test]
fn unparsable_sidecar() {
    let tmp = copy_fixture("certs");
    let cert = tmp.path().join("intermediate/bravo.crt");

    fs::write(tmp.path().join("intermediate/bravo.crt.config"), b"alias=\\uZZZZ\n").unwrap();
    assert!(matches!(
        resolve_alias(&cert),
        Err(Error::AliasConfig { .. })
    ));

    fs::write(
        tmp.path().join("intermediate/bravo.crt.config"),
        [b'a', b'l', b'i', b'a', b's', b'=', 0xff, 0xfe],
    )
    .unwrap();
    assert!(matches!(
        resolve_alias(&cert),
        Err(Error::AliasConfig { .. })
    ));

    fs::write(tmp.path().join("intermediate/bravo.crt.config"), b"alias : Bravo CA\n").unwrap();
    assert_eq!("Bravo CA", resolve_alias(&cert).unwrap());
}

#[test]
fn load_pem_and_der() {
    let alpha = load(Path::new("tests/examples/certs/alpha.pem")).unwrap();
    assert!(alpha.subject.contains("CN=alpha"));
    assert_eq!(NOT_BEFORE, alpha.not_before.as_unix_secs());
    assert_eq!(ALPHA_NOT_AFTER, alpha.not_after.as_unix_secs());
    assert_eq!(
        hex!("A21D909A87CA3AB302CD13BA33F527D3C3FD4103"),
        Sha1::digest(&alpha.encoded).as_slice()
    );
    assert_eq!(
        "A2:1D:90:9A:87:CA:3A:B3:02:CD:13:BA:33:F5:27:D3:C3:FD:41:03",
        alpha.sha1_fingerprint()
    );
    assert_eq!(
        "1E:FB:2F:1C:88:46:15:DA:96:56:2A:45:82:A8:B2:46:92:E2:3C:0B:08:70:4C:DD:EB:C2:9B:7A:32:AE:D6:2A",
        alpha.sha256_fingerprint()
    );

    let der_path = Path::new("tests/examples/certs/intermediate/bravo.crt");
    let bravo = load(der_path).unwrap();
    assert!(bravo.subject.contains("CN=bravo"));
    assert_eq!(BRAVO_NOT_AFTER, bravo.not_after.as_unix_secs());
    assert_eq!(fs::read(der_path).unwrap(), bravo.encoded);

    let charlie = load(Path::new("tests/examples/certs/intermediate/charlie.cer")).unwrap();
    assert_eq!(CHARLIE_NOT_AFTER, charlie.not_after.as_unix_secs());
}

#[test]
fn load_pem_with_surrounding_text() {
    // openssl x509 -subject -issuer output followed by a comment
    let alpha = load(Path::new("tests/examples/annotated/subject-issuer.pem")).unwrap();
    let expected = load(Path::new("tests/examples/certs/alpha.pem")).unwrap();
    assert_eq!(expected, alpha);

    // Bag Attributes before and after a CRLF-terminated block
    let bravo = load(Path::new("tests/examples/annotated/bag-attributes.pem")).unwrap();
    assert_eq!(
        fs::read("tests/examples/certs/intermediate/bravo.crt").unwrap(),
        bravo.encoded
    );

    // surrounding text does not hide a second certificate
    let mut two = fs::read("tests/examples/annotated/subject-issuer.pem").unwrap();
    two.extend(fs::read("tests/examples/annotated/bag-attributes.pem").unwrap());
    match parse_certificate(Path::new("two.pem"), &two) {
        Err(Error::MalformedCertificate { reason, .. }) => assert!(reason.contains("found 2")),
        r => panic!("unexpected result: {:?}", r),
    }
}

#[test]
fn load_failures() {
    match load(Path::new("tests/examples/bundle/bundle.pem")) {
        Err(Error::MalformedCertificate { reason, .. }) => {
            assert!(reason.contains("found 2"))
        }
        r => panic!("unexpected result: {:?}", r),
    }
    assert!(matches!(
        load(Path::new("tests/examples/malformed/garbage.crt")),
        Err(Error::MalformedCertificate { .. })
    ));
    assert!(matches!(
        load(Path::new("tests/examples/certs/notes.txt")),
        Err(Error::MalformedCertificate { .. })
    ));

    // two DER certificates back to back
    let mut two = fs::read("tests/examples/certs/intermediate/bravo.crt").unwrap();
    two.extend(fs::read("tests/examples/certs/intermediate/archive/delta.der").unwrap());
    assert!(matches!(
        parse_certificate(Path::new("two.der"), &two),
        Err(Error::MalformedCertificate { .. })
    ));

    assert!(matches!(
        load(Path::new("tests/examples/certs/missing.pem")),
        Err(Error::UnreadableFile { kind: std::io::ErrorKind::NotFound, .. })
    ));
}

#[test]
fn collect_artifacts_in_scan_order() {
    let artifacts = artifacts_in(Path::new("tests/examples/certs"));
    let summary: Vec<(usize, &str)> = artifacts
        .iter()
        .map(|a| (a.index, a.alias.as_str()))
        .collect();
    assert_eq!(
        vec![(0, "alpha-root"), (1, "bravo.crt"), (2, "charlie.cer")],
        summary
    );

    let tmp = copy_fixture("certs");
    fs::copy(
        "tests/examples/malformed/garbage.crt",
        tmp.path().join("intermediate/bad.crt"),
    )
    .unwrap();
    let r = collect_artifacts(&default_scan_root(tmp.path()), &AliasResolver::default());
    match r {
        Err(Error::MalformedCertificate { path, .. }) => assert!(path.ends_with("bad.crt")),
        r => panic!("unexpected result: {:?}", r),
    }
}
