//! The expiry_validator module checks that certificates remain valid for a minimum number of days.
//!
//! Days remaining are computed as `floor((notAfter - now) / 1 day)`. A certificate fails when that
//! figure is below the configured minimum, so an already expired certificate always fails, even
//! with a minimum of zero. Every certificate is evaluated before anything is reported.

use core::fmt;
use std::path::PathBuf;

use log::{debug, error, info};

use crate::source::artifact::CertificateArtifact;
use crate::util::{error::*, time_of_interest::*};

/// `ValidationPolicy` holds the minimum number of days a certificate must remain valid.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ValidationPolicy {
    /// Minimum number of whole days remaining before notAfter
    pub minimum_remaining_days: u32,
}

impl ValidationPolicy {
    /// Creates a [`ValidationPolicy`]
    pub fn new(minimum_remaining_days: u32) -> Self {
        ValidationPolicy {
            minimum_remaining_days,
        }
    }
}

/// Outcome of checking one certificate
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationVerdict {
    /// The certificate satisfies the policy
    Ok,
    /// The certificate does not satisfy the policy; carries the days remaining (negative once expired)
    Failing(i64),
}

/// Details of a certificate that did not satisfy the policy
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExpiryFailure {
    /// File the certificate was read from
    pub path: PathBuf,
    /// Alias of the certificate
    pub alias: String,
    /// Subject of the certificate
    pub subject: String,
    /// End of the certificate's validity window
    pub not_after: TimeOfInterest,
    /// Whole days remaining, negative once expired
    pub days_remaining: i64,
    /// Minimum days remaining the certificate was checked against
    pub minimum_remaining_days: u32,
}

impl fmt::Display for ExpiryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Certificate is already or becomes invalid within the next {} days: {} (alias: {}, subject: {}, notAfter: {}, days remaining: {})",
            self.minimum_remaining_days,
            self.path.display(),
            self.alias,
            self.subject,
            self.not_after,
            self.days_remaining
        )
    }
}

/// `ValidationReport` lists every certificate that failed the policy. It is empty on success.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationReport {
    /// Number of certificates evaluated
    pub checked: usize,
    /// Certificates that failed, in scan order
    pub failures: Vec<ExpiryFailure>,
}

impl ValidationReport {
    /// True when no certificate failed
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// `into_result` returns the report when empty and [`Error::Validation`] otherwise.
    pub fn into_result(self) -> Result<Self> {
        if self.is_empty() {
            Ok(self)
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} certificate(s) failed the remaining validity check",
            self.failures.len(),
            self.checked
        )?;
        for failure in &self.failures {
            write!(f, "\n\t* {}", failure)?;
        }
        Ok(())
    }
}

/// `ExpiryValidator` evaluates certificates against a [`ValidationPolicy`] relative to a [`Clock`].
pub struct ExpiryValidator<'a> {
    policy: ValidationPolicy,
    clock: &'a dyn Clock,
}

impl<'a> ExpiryValidator<'a> {
    /// Creates a validator
    pub fn new(policy: ValidationPolicy, clock: &'a dyn Clock) -> Self {
        ExpiryValidator { policy, clock }
    }

    /// `days_remaining` returns whole days from `now` until `not_after`.
    pub fn days_remaining(not_after: &TimeOfInterest, now: &TimeOfInterest) -> i64 {
        now.days_until(not_after)
    }

    /// `verdict` evaluates a single notAfter value relative to `now`.
    pub fn verdict(&self, not_after: &TimeOfInterest, now: &TimeOfInterest) -> ValidationVerdict {
        let days = Self::days_remaining(not_after, now);
        if days < 0 || days < i64::from(self.policy.minimum_remaining_days) {
            ValidationVerdict::Failing(days)
        } else {
            ValidationVerdict::Ok
        }
    }

    /// `verdicts` evaluates each artifact, reading the clock once for the whole set.
    pub fn verdicts(&self, artifacts: &[CertificateArtifact]) -> Vec<ValidationVerdict> {
        let now = self.clock.now();
        artifacts
            .iter()
            .map(|a| self.verdict(&a.record.not_after, &now))
            .collect()
    }

    /// `validate` evaluates every artifact and returns the aggregated report.
    pub fn validate(&self, artifacts: &[CertificateArtifact]) -> ValidationReport {
        let now = self.clock.now();
        let mut report = ValidationReport {
            checked: artifacts.len(),
            failures: vec![],
        };
        for a in artifacts {
            match self.verdict(&a.record.not_after, &now) {
                ValidationVerdict::Ok => {
                    debug!("#{}: {} is valid until {}", a.index, a.path.display(), a.record.not_after);
                }
                ValidationVerdict::Failing(days_remaining) => {
                    let failure = ExpiryFailure {
                        path: a.path.clone(),
                        alias: a.alias.clone(),
                        subject: a.record.subject.clone(),
                        not_after: a.record.not_after,
                        days_remaining,
                        minimum_remaining_days: self.policy.minimum_remaining_days,
                    };
                    error!("#{}: {}", a.index, failure);
                    report.failures.push(failure);
                }
            }
        }
        info!(
            "Checked {} certificate(s) as of {}: {} failed",
            report.checked,
            now,
            report.failures.len()
        );
        report
    }
}

/// `validate` is shorthand for [`ExpiryValidator::validate`].
pub fn validate(
    artifacts: &[CertificateArtifact],
    policy: ValidationPolicy,
    clock: &dyn Clock,
) -> ValidationReport {
    ExpiryValidator::new(policy, clock).validate(artifacts)
}

#[test]
fn verdict_boundaries() {
    let now = TimeOfInterest::from_unix_secs(1_792_441_607).unwrap();
    let clock = FixedClock(now);
    let v = ExpiryValidator::new(ValidationPolicy::new(30), &clock);

    let day = SECONDS_PER_DAY as u64;
    let exactly_30 = TimeOfInterest::from_unix_secs(1_792_441_607 + 30 * day).unwrap();
    let just_under_30 = TimeOfInterest::from_unix_secs(1_792_441_607 + 30 * day - 1).unwrap();
    assert_eq!(ValidationVerdict::Ok, v.verdict(&exactly_30, &now));
    assert_eq!(ValidationVerdict::Failing(29), v.verdict(&just_under_30, &now));

    let v0 = ExpiryValidator::new(ValidationPolicy::new(0), &clock);
    let expired = TimeOfInterest::from_unix_secs(1_792_441_606).unwrap();
    assert_eq!(ValidationVerdict::Failing(-1), v0.verdict(&expired, &now));
    assert_eq!(ValidationVerdict::Ok, v0.verdict(&now, &now));
}
