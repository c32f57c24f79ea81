mod common;

use std::path::Path;

use certstore::*;
use common::*;

#[test]
fn minimum_is_inclusive() {
    let artifacts = artifacts_in(Path::new("tests/examples/certs"));
    let clock = clock_at(NOT_BEFORE);

    // charlie.cer has exactly 30 days left
    let v = ExpiryValidator::new(ValidationPolicy::new(30), &clock);
    assert_eq!(
        vec![
            ValidationVerdict::Ok,
            ValidationVerdict::Ok,
            ValidationVerdict::Ok
        ],
        v.verdicts(&artifacts)
    );
    assert!(v.validate(&artifacts).is_empty());

    let report = validate(&artifacts, ValidationPolicy::new(31), &clock);
    assert_eq!(3, report.checked);
    assert_eq!(1, report.failures.len());
    let f = &report.failures[0];
    assert_eq!("charlie.cer", f.alias);
    assert_eq!(30, f.days_remaining);
    assert_eq!(31, f.minimum_remaining_days);
    assert_eq!(CHARLIE_NOT_AFTER, f.not_after.as_unix_secs());
    assert!(f.subject.contains("CN=charlie"));
    assert!(f.path.ends_with("intermediate/charlie.cer"));
    assert!(f
        .to_string()
        .starts_with("Certificate is already or becomes invalid within the next 31 days"));
}

#[test]
fn one_second_short_of_a_day() {
    let artifacts = artifacts_in(Path::new("tests/examples/certs"));
    let clock = clock_at(NOT_BEFORE + 1);
    let v = ExpiryValidator::new(ValidationPolicy::new(30), &clock);
    assert_eq!(
        vec![
            ValidationVerdict::Ok,
            ValidationVerdict::Ok,
            ValidationVerdict::Failing(29)
        ],
        v.verdicts(&artifacts)
    );
}

#[test]
fn expired_fails_even_without_minimum() {
    let artifacts = artifacts_in(Path::new("tests/examples/certs"));

    let at_expiry = clock_at(CHARLIE_NOT_AFTER);
    assert!(validate(&artifacts, ValidationPolicy::new(0), &at_expiry).is_empty());

    let after = clock_at(CHARLIE_NOT_AFTER + 1);
    let report = validate(&artifacts, ValidationPolicy::new(0), &after);
    assert_eq!(1, report.failures.len());
    assert_eq!(-1, report.failures[0].days_remaining);

    let long_after = clock_at(BRAVO_NOT_AFTER + 10 * DAY);
    let report = validate(&artifacts, ValidationPolicy::new(0), &long_after);
    let days: Vec<(&str, i64)> = report
        .failures
        .iter()
        .map(|f| (f.alias.as_str(), f.days_remaining))
        .collect();
    assert_eq!(
        vec![
            ("bravo.crt", -10),
            ("charlie.cer", -(((BRAVO_NOT_AFTER - CHARLIE_NOT_AFTER) / DAY) as i64) - 10)
        ],
        days
    );
}

#[test]
fn every_failure_is_reported() {
    let artifacts = artifacts_in(Path::new("tests/examples/certs"));
    let clock = clock_at(NOT_BEFORE);
    let report = validate(&artifacts, ValidationPolicy::new(500), &clock);
    assert_eq!(3, report.checked);
    let aliases: Vec<&str> = report.failures.iter().map(|f| f.alias.as_str()).collect();
    assert_eq!(vec!["bravo.crt", "charlie.cer"], aliases);
    assert_eq!(400, report.failures[0].days_remaining);

    let text = report.to_string();
    assert!(text.starts_with("2 of 3 certificate(s) failed"));
    assert!(text.contains("bravo.crt"));
    assert!(text.contains("charlie.cer"));

    match report.into_result() {
        Err(Error::Validation(r)) => assert_eq!(2, r.failures.len()),
        r => panic!("unexpected result: {:?}", r),
    }
}

#[test]
fn empty_input_passes() {
    let clock = clock_at(NOT_BEFORE);
    let report = validate(&[], ValidationPolicy::new(90), &clock);
    assert_eq!(0, report.checked);
    assert!(report.into_result().is_ok());
}
