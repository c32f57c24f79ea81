//! Time of interest and the clock used when checking remaining validity of certificates

use core::{fmt, time::Duration};
use std::time::{SystemTime, UNIX_EPOCH};

/// Number of seconds in one day, as used when computing days remaining.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Time of interest for remaining-validity checks and for trust store entry timestamps.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct TimeOfInterest(pub der::DateTime);

impl fmt::Display for TimeOfInterest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TimeOfInterest {
    /// Create a [`TimeOfInterest`] from Unix epoch
    pub fn from_unix_secs(v: u64) -> der::Result<Self> {
        Ok(Self(der::DateTime::from_unix_duration(
            Duration::from_secs(v),
        )?))
    }

    /// Return Unix epoch (in seconds) for this value
    pub fn as_unix_secs(&self) -> u64 {
        self.0.unix_duration().as_secs()
    }

    /// Return Unix epoch (in milliseconds) for this value
    pub fn as_unix_millis(&self) -> u64 {
        self.as_unix_secs().saturating_mul(1000)
    }

    /// Signed number of seconds from `self` until `later`; negative when `later` precedes `self`.
    pub fn seconds_until(&self, later: &TimeOfInterest) -> i64 {
        let from = i64::try_from(self.as_unix_secs()).unwrap_or(i64::MAX);
        let to = i64::try_from(later.as_unix_secs()).unwrap_or(i64::MAX);
        to.saturating_sub(from)
    }

    /// Whole days from `self` until `later`, rounded towards negative infinity, i.e., one second
    /// past a deadline counts as minus one day.
    pub fn days_until(&self, later: &TimeOfInterest) -> i64 {
        self.seconds_until(later).div_euclid(SECONDS_PER_DAY)
    }
}

impl From<x509_cert::time::Time> for TimeOfInterest {
    fn from(t: x509_cert::time::Time) -> Self {
        TimeOfInterest(t.to_date_time())
    }
}

/// `get_now_as_unix_epoch` returns current time as seconds since Unix epoch or 0 if the system clock
/// reads earlier than the epoch.
pub fn get_now_as_unix_epoch() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(n) => n.as_secs(),
        Err(_) => 0,
    }
}

/// Source of the current time. Operations that depend on "now" take a `Clock` so they can be driven
/// deterministically.
pub trait Clock: Send + Sync {
    /// Returns the current time of interest
    fn now(&self) -> TimeOfInterest;
}

/// [`Clock`] that reads the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimeOfInterest {
        let now = der::DateTime::from_system_time(SystemTime::now())
            .or_else(|_| der::DateTime::from_unix_duration(Duration::ZERO));
        match now {
            Ok(dt) => TimeOfInterest(dt),
            Err(_) => TimeOfInterest(der::DateTime::INFINITY),
        }
    }
}

/// [`Clock`] that always returns the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub TimeOfInterest);

impl FixedClock {
    /// Create a [`FixedClock`] from seconds since Unix epoch
    pub fn from_unix_secs(v: u64) -> der::Result<Self> {
        Ok(FixedClock(TimeOfInterest::from_unix_secs(v)?))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> TimeOfInterest {
        self.0
    }
}

#[test]
fn days_until_rounds_down() {
    let now = TimeOfInterest::from_unix_secs(1_000_000).unwrap();
    let exactly_two = TimeOfInterest::from_unix_secs(1_000_000 + 2 * 86_400).unwrap();
    let almost_two = TimeOfInterest::from_unix_secs(1_000_000 + 2 * 86_400 - 1).unwrap();
    let one_second_ago = TimeOfInterest::from_unix_secs(999_999).unwrap();
    assert_eq!(2, now.days_until(&exactly_two));
    assert_eq!(1, now.days_until(&almost_two));
    assert_eq!(0, now.days_until(&now));
    assert_eq!(-1, now.days_until(&one_second_ago));
}

#[test]
fn fixed_clock() {
    let c = FixedClock::from_unix_secs(1_792_441_607).unwrap();
    assert_eq!(1_792_441_607, c.now().as_unix_secs());
    assert_eq!(1_792_441_607_000, c.now().as_unix_millis());
    assert!(SystemClock.now().as_unix_secs() > 0);
}
