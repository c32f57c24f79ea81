//! Tests that run the tsbuild binary against the fixtures in tests/examples.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;

/// notBefore shared by all fixture certificates
const NOT_BEFORE: &str = "1792441607";

fn copy_tree(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for e in fs::read_dir(from).unwrap() {
        let e = e.unwrap();
        let dest = to.join(e.file_name());
        if e.file_type().unwrap().is_dir() {
            copy_tree(&e.path(), &dest);
        } else {
            fs::copy(e.path(), dest).unwrap();
        }
    }
}

#[test]
fn no_arguments_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("tsbuild")?;
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--list-trust-store"));
    Ok(())
}

#[test]
fn build_and_check() -> Result<(), Box<dyn std::error::Error>> {
    let out = tempfile::tempdir()?;
    let store = out.path().join("build/cacerts.jks");

    let mut cmd = Command::cargo_bin("tsbuild")?;
    cmd.arg("-c").arg("tests/examples/certs");
    cmd.arg("-t").arg(&store);
    cmd.arg("-i").arg(NOT_BEFORE);
    cmd.arg("-d").arg("30");
    cmd.arg("--build").arg("--check");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Trust store with 3 certificate(s) written to",
        ))
        .stdout(predicate::str::contains(
            "All 3 certificate(s) remain valid for at least 30 days",
        ));
    assert!(store.is_file());

    let mut cmd = Command::cargo_bin("tsbuild")?;
    cmd.arg("-t").arg(&store);
    cmd.arg("--list-trust-store");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Alias: alpha-root"))
        .stdout(predicate::str::contains("Alias: bravo.crt"))
        .stdout(predicate::str::contains("Alias: charlie.cer"));
    Ok(())
}

#[test]
fn check_failure() -> Result<(), Box<dyn std::error::Error>> {
    let out = tempfile::tempdir()?;
    let store = out.path().join("cacerts.jks");

    let mut cmd = Command::cargo_bin("tsbuild")?;
    cmd.arg("-c").arg("tests/examples/certs");
    cmd.arg("-t").arg(&store);
    cmd.arg("-i").arg(NOT_BEFORE);
    cmd.arg("-d").arg("31");
    cmd.arg("-k");
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains(
            "Certificate is already or becomes invalid within the next 31 days",
        ))
        .stdout(predicate::str::contains("charlie.cer"))
        .stdout(predicate::str::contains("bravo.crt").not());
    // check only
    assert!(!store.exists());

    // with no explicit action both passes run and the store is still written
    let mut cmd = Command::cargo_bin("tsbuild")?;
    cmd.arg("-c").arg("tests/examples/certs");
    cmd.arg("-t").arg(&store);
    cmd.arg("-i").arg(NOT_BEFORE);
    cmd.arg("-d").arg("31");
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("tsbuild failed"));
    assert!(store.is_file());
    Ok(())
}

#[test]
fn misconfiguration() -> Result<(), Box<dyn std::error::Error>> {
    let out = tempfile::tempdir()?;
    let store = out.path().join("cacerts.p12");

    let mut cmd = Command::cargo_bin("tsbuild")?;
    cmd.arg("-c").arg("tests/examples/certs");
    cmd.arg("-t").arg(&store);
    cmd.arg("-p").arg(" ");
    cmd.arg("-e").arg(" ,.");
    cmd.arg("-b");
    cmd.assert().failure().stdout(predicate::str::contains(
        "The following properties have to be configured appropriately: accepted_file_endings, path, password",
    ));
    assert!(!store.exists());

    let mut cmd = Command::cargo_bin("tsbuild")?;
    cmd.arg("-c").arg("tests/examples/nonexistent");
    cmd.arg("-k");
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("ScanError"));

    let mut cmd = Command::cargo_bin("tsbuild")?;
    cmd.arg("-s").arg("tests/examples/settings/broken.json");
    cmd.arg("-k");
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("SettingsError"));
    Ok(())
}

#[test]
fn bad_inputs_leave_store_untouched() -> Result<(), Box<dyn std::error::Error>> {
    let src = tempfile::tempdir()?;
    copy_tree(Path::new("tests/examples/certs"), src.path());
    fs::copy(
        "tests/examples/malformed/garbage.crt",
        src.path().join("intermediate/garbage.crt"),
    )?;
    let out = tempfile::tempdir()?;
    let store = out.path().join("cacerts.jks");
    fs::write(&store, b"previous store")?;

    let mut cmd = Command::cargo_bin("tsbuild")?;
    cmd.arg("-c").arg(src.path());
    cmd.arg("-t").arg(&store);
    cmd.arg("-b");
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("MalformedCertificateError"))
        .stdout(predicate::str::contains("garbage.crt"));
    assert_eq!(b"previous store".to_vec(), fs::read(&store)?);

    // the same alias used twice
    fs::remove_file(src.path().join("intermediate/garbage.crt"))?;
    fs::write(
        src.path().join("intermediate/bravo.crt.config"),
        b"alias=Alpha-Root\n",
    )?;
    let mut cmd = Command::cargo_bin("tsbuild")?;
    cmd.arg("-c").arg(src.path());
    cmd.arg("-t").arg(&store);
    cmd.arg("-b");
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("DuplicateAliasError"));
    assert_eq!(b"previous store".to_vec(), fs::read(&store)?);

    let mut cmd = Command::cargo_bin("tsbuild")?;
    cmd.arg("-c").arg("tests/examples/certs");
    cmd.arg("-t").arg(&store);
    cmd.arg("-b").arg("--require-explicit-alias");
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("AliasConfigError"));
    assert_eq!(b"previous store".to_vec(), fs::read(&store)?);
    Ok(())
}

#[test]
fn list_keytool_store() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("tsbuild")?;
    cmd.arg("-t").arg("tests/examples/stores/golden.jks");
    cmd.arg("-p").arg("changeit");
    cmd.arg("--list-trust-store");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("contains 2 trusted certificate(s)"))
        .stdout(predicate::str::contains("Index:   0; Alias: alpha-root"))
        .stdout(predicate::str::contains(
            "SHA-1: A2:1D:90:9A:87:CA:3A:B3:02:CD:13:BA:33:F5:27:D3:C3:FD:41:03",
        ))
        .stdout(predicate::str::contains(
            "SHA-1: D7:62:A1:4E:6A:10:4C:24:7F:52:FB:02:29:33:D1:CD:8D:D2:18:15",
        ));

    let mut cmd = Command::cargo_bin("tsbuild")?;
    cmd.arg("-t").arg("tests/examples/stores/golden.jks");
    cmd.arg("-p").arg("wrong");
    cmd.arg("--list-trust-store");
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("password was incorrect"));
    Ok(())
}

#[test]
fn logging_config() -> Result<(), Box<dyn std::error::Error>> {
    let out = tempfile::tempdir()?;
    let mut cmd = Command::cargo_bin("tsbuild")?;
    cmd.arg("-l").arg("tests/examples/logging.yaml");
    cmd.arg("-c").arg("tests/examples/certs");
    cmd.arg("-t").arg(out.path().join("cacerts.jks"));
    cmd.arg("-b");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("TSBUILD INFO Trust store with 3"));
    Ok(())
}
