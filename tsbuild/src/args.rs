//! Arguments for the tsbuild utility

use std::path::PathBuf;

use clap::Parser;

use certstore::get_now_as_unix_epoch;

/// Trust store builder (tsbuild)
#[derive(Parser, Debug, Default)]
#[clap(author, version, about, long_about = None)]
pub struct TsBuildArgs {
    /// Full path and filename of JSON-formatted settings. Values given on the command line take
    /// precedence over values read from this file.
    #[clap(short, long, help_heading = "COMMON OPTIONS")]
    pub settings: Option<PathBuf>,

    /// Full path of folder to recursively traverse for certificate files (defaults to
    /// src/main/certs).
    #[clap(short = 'c', long, help_heading = "COMMON OPTIONS")]
    pub source: Option<PathBuf>,

    /// Comma-separated list of file endings identifying certificate files (defaults to
    /// crt,cer,pem). Matching is case-sensitive.
    #[clap(
        short = 'e',
        long,
        value_delimiter = ',',
        help_heading = "COMMON OPTIONS"
    )]
    pub accepted_file_endings: Option<Vec<String>>,

    /// Full path and filename of the trust store to write or list (defaults to build/cacerts.jks).
    /// The store type is derived from the file extension; only jks is supported.
    #[clap(short, long, help_heading = "COMMON OPTIONS")]
    pub trust_store: Option<PathBuf>,

    /// Password protecting the trust store (defaults to changeit).
    #[clap(short, long, help_heading = "COMMON OPTIONS")]
    pub password: Option<String>,

    /// Time to use when checking remaining validity and when stamping trust store entries,
    /// expressed as the number of seconds since Unix epoch (defaults to current system time).
    #[clap(short = 'i', long, default_value_t = get_now_as_unix_epoch(), help_heading = "COMMON OPTIONS")]
    pub time_of_interest: u64,

    /// Full path and filename of YAML-formatted configuration file for log4rs logging mechanism.
    /// See <https://docs.rs/log4rs/latest/log4rs/> for details.
    #[clap(short, long, help_heading = "COMMON OPTIONS")]
    pub logging_config: Option<String>,

    /// Flag that indicates the trust store should be built. When neither build nor check is
    /// given, the actions enabled in the settings file run (both by default).
    #[clap(short, long, help_heading = "ACTIONS")]
    pub build: bool,

    /// Flag that indicates certificates should be checked for remaining validity.
    #[clap(short = 'k', long, help_heading = "ACTIONS")]
    pub check: bool,

    /// Minimum number of days each certificate must remain valid (defaults to 90).
    #[clap(short = 'd', long, help_heading = "ACTIONS")]
    pub at_least_valid_days: Option<u32>,

    /// Flag that indicates every certificate must be given an alias in its sidecar file.
    #[clap(long, help_heading = "ACTIONS")]
    pub require_explicit_alias: bool,

    /// Outputs alias, subject, notAfter and fingerprints of each certificate in an existing trust
    /// store, then exits without building or checking.
    #[clap(long, help_heading = "DIAGNOSTICS")]
    pub list_trust_store: bool,
}
