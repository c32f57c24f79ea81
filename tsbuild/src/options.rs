//! Provides the actions supported by tsbuild.
//!
//! ```text
//! $ ./target/release/tsbuild --help
//! Trust store builder (tsbuild)
//!
//! Usage: tsbuild [OPTIONS]
//!
//! Options:
//!   -h, --help     Print help
//!   -V, --version  Print version
//!
//! COMMON OPTIONS:
//!   -s, --settings <SETTINGS>
//!   -c, --source <SOURCE>
//!   -e, --accepted-file-endings <ACCEPTED_FILE_ENDINGS>
//!   -t, --trust-store <TRUST_STORE>
//!   -p, --password <PASSWORD>
//!   -i, --time-of-interest <TIME_OF_INTEREST>
//!   -l, --logging-config <LOGGING_CONFIG>
//!
//! ACTIONS:
//!   -b, --build
//!   -k, --check
//!   -d, --at-least-valid-days <AT_LEAST_VALID_DAYS>
//!       --require-explicit-alias
//!
//! DIAGNOSTICS:
//!       --list-trust-store
//! ```

use log::{error, info};

use certstore::*;

use crate::args::TsBuildArgs;

/// `merge_settings` starts from built-in defaults, applies the settings file, if any, then applies
/// values given on the command line.
pub fn merge_settings(args: &TsBuildArgs) -> Result<TrustStoreSettings> {
    let mut settings = match &args.settings {
        Some(f) => TrustStoreSettings::read(f)?,
        None => TrustStoreSettings::default(),
    };

    if let Some(source) = &args.source {
        settings.source = source.clone();
    }
    if let Some(endings) = &args.accepted_file_endings {
        settings.accepted_file_endings = endings.clone();
    }
    if let Some(trust_store) = &args.trust_store {
        settings.trust_store.path = trust_store.clone();
    }
    if let Some(password) = &args.password {
        settings.trust_store.password = password.clone();
    }
    if let Some(days) = args.at_least_valid_days {
        settings.at_least_valid_days = days;
    }
    if args.require_explicit_alias {
        settings.require_explicit_alias = true;
    }
    Ok(settings)
}

/// `requested_actions` returns the explicitly requested passes or `None` to defer to the settings.
pub fn requested_actions(args: &TsBuildArgs) -> Option<Actions> {
    if args.build || args.check {
        Some(Actions {
            build: args.build,
            check: args.check,
        })
    } else {
        None
    }
}

/// `list_trust_store` logs each entry of the trust store at `location`.
pub fn list_trust_store(location: &TrustStoreLocation) -> Result<()> {
    let ks = JksTrustStore::load(&location.path, &location.password)?;
    info!(
        "{} contains {} trusted certificate(s)",
        location.path.display(),
        ks.len()
    );
    for (i, entry) in ks.entries().iter().enumerate() {
        match CertificateRecord::from_der(&location.path, &entry.certificate) {
            Ok(record) => {
                info!(
                    "Index: {:3}; Alias: {}; Subject: {}; Not After: {}",
                    i, entry.alias, record.subject, record.not_after
                );
                info!("\t * SHA-1: {}", record.sha1_fingerprint());
                info!("\t * SHA-256: {}", record.sha256_fingerprint());
            }
            Err(e) => {
                error!("Index: {:3}; Alias: {}; {}", i, entry.alias, e);
            }
        }
    }
    Ok(())
}

fn log_outcome(outcome: &ExecutionOutcome, settings: &TrustStoreSettings) {
    if let Some(Ok(path)) = &outcome.build {
        info!(
            "Trust store with {} certificate(s) written to {}",
            outcome.certificates,
            path.display()
        );
    }
    if let Some(report) = &outcome.validation {
        if report.is_empty() {
            info!(
                "All {} certificate(s) remain valid for at least {} days",
                report.checked, settings.at_least_valid_days
            );
        }
    }
}

/// The `options` function performs the actions selected by `args`.
pub fn options(args: &TsBuildArgs) -> Result<()> {
    let settings = merge_settings(args)?;

    if args.list_trust_store {
        return list_trust_store(&settings.trust_store);
    }

    let clock = FixedClock::from_unix_secs(args.time_of_interest)
        .map_err(|_e| Error::Misconfiguration(vec!["time_of_interest".to_string()]))?;
    info!("Using {} as time of interest", clock.now());

    let plan = configure(&settings, requested_actions(args))?;
    let outcome = execute(&plan, &clock)?;
    log_outcome(&outcome, &settings);
    outcome.into_result()
}

#[test]
fn settings_precedence() {
    use clap::Parser;
    use std::path::PathBuf;

    let args = TsBuildArgs::parse_from([
        "tsbuild",
        "-s",
        "tests/examples/settings/strict.json",
        "-c",
        "tests/examples/certs",
        "-e",
        "pem,crt",
        "-d",
        "10",
    ]);
    let s = merge_settings(&args).unwrap();
    assert_eq!(PathBuf::from("tests/examples/certs"), s.source);
    assert_eq!(vec!["pem", "crt"], s.accepted_file_endings);
    assert_eq!(10, s.at_least_valid_days);
    // from the settings file
    assert!(s.require_explicit_alias);
    assert_eq!("s3cret", s.trust_store.password);
    assert!(!s.check_enabled);
    assert_eq!(None, requested_actions(&args));

    let args = TsBuildArgs::parse_from(["tsbuild", "--check"]);
    let s = merge_settings(&args).unwrap();
    assert_eq!(TrustStoreSettings::default(), s);
    assert_eq!(
        Some(Actions {
            build: false,
            check: true
        }),
        requested_actions(&args)
    );
}
