//! The plan module separates checking of inputs ([`configure`]) from filesystem work ([`execute`]).
//!
//! ```no_run
//! use certstore::{configure, execute, SystemClock, TrustStoreSettings};
//!
//! let settings = TrustStoreSettings::default();
//! let plan = configure(&settings, None)?;
//! let outcome = execute(&plan, &SystemClock)?;
//! outcome.into_result()?;
//! # Ok::<(), certstore::Error>(())
//! ```

use std::path::PathBuf;

use log::{error, info};

use crate::builder::trust_store_builder::*;
use crate::environment::settings::TrustStoreSettings;
use crate::source::{alias_resolver::AliasResolver, artifact::*, path_scanner::ScanRoot};
use crate::util::{error::*, time_of_interest::Clock};
use crate::validator::expiry_validator::*;

/// Trust store types that can be produced, keyed by file extension
pub const SUPPORTED_STORE_EXTENSIONS: &[&str] = &["jks"];

/// `Actions` selects which passes run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Actions {
    /// Build the trust store
    pub build: bool,
    /// Check remaining validity of certificates
    pub check: bool,
}

/// `ResolvedPlan` is the checked form of [`TrustStoreSettings`] ready for [`execute`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedPlan {
    /// Absolute scan root with its extension policy
    pub scan_root: ScanRoot,
    /// Alias resolution policy
    pub resolver: AliasResolver,
    /// Trust store to build, if the build pass runs
    pub trust_store: Option<TrustStoreSpec>,
    /// Policy to check, if the validation pass runs
    pub policy: Option<ValidationPolicy>,
}

/// `normalize_extensions` drops blank entries, strips one leading dot and removes duplicates while
/// keeping the first occurrence.
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    let mut retval: Vec<String> = vec![];
    for e in extensions {
        let e = e.trim();
        let e = e.strip_prefix('.').unwrap_or(e);
        if e.is_empty() || e.starts_with('.') {
            continue;
        }
        if !retval.iter().any(|r| r == e) {
            retval.push(e.to_string());
        }
    }
    retval
}

fn is_supported_store(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            SUPPORTED_STORE_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

/// `configure` checks `settings` and resolves them into a [`ResolvedPlan`] without writing anything.
///
/// When `actions` is `None`, the passes enabled by `build_enabled` and `check_enabled` are selected.
/// All improperly configured properties are reported together via [`Error::Misconfiguration`]. A
/// scan root that does not exist or is not a directory yields [`Error::Scan`].
pub fn configure(settings: &TrustStoreSettings, actions: Option<Actions>) -> Result<ResolvedPlan> {
    let actions = actions.unwrap_or(Actions {
        build: settings.build_enabled,
        check: settings.check_enabled,
    });

    let mut improper = vec![];
    let extensions = normalize_extensions(&settings.accepted_file_endings);
    if extensions.is_empty() {
        improper.push("accepted_file_endings".to_string());
    }
    if actions.build {
        if !is_supported_store(&settings.trust_store.path) {
            improper.push("path".to_string());
        }
        if settings.trust_store.password.trim().is_empty() {
            improper.push("password".to_string());
        }
    }
    if !improper.is_empty() {
        error!(
            "The following properties have to be configured appropriately: {}",
            improper.join(", ")
        );
        return Err(Error::Misconfiguration(improper));
    }

    let root = if settings.source.is_absolute() {
        settings.source.clone()
    } else {
        let cwd = std::env::current_dir().map_err(|e| Error::Scan {
            root: settings.source.clone(),
            reason: format!("cannot determine current directory: {}", e),
        })?;
        cwd.join(&settings.source)
    };
    if !root.is_dir() {
        return Err(Error::Scan {
            root,
            reason: "does not exist or is not a directory".to_string(),
        });
    }

    Ok(ResolvedPlan {
        scan_root: ScanRoot::new(root, extensions)?,
        resolver: AliasResolver::new(settings.require_explicit_alias),
        trust_store: actions.build.then(|| {
            TrustStoreSpec::new(
                settings.trust_store.path.clone(),
                settings.trust_store.password.clone(),
            )
        }),
        policy: actions
            .check
            .then(|| ValidationPolicy::new(settings.at_least_valid_days)),
    })
}

/// `ExecutionOutcome` carries the outcome of each pass that ran.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExecutionOutcome {
    /// Number of certificates processed
    pub certificates: usize,
    /// Result of the build pass, if it ran
    pub build: Option<Result<PathBuf>>,
    /// Report of the validation pass, if it ran
    pub validation: Option<ValidationReport>,
}

impl ExecutionOutcome {
    /// `into_result` returns the build error, if any, else a non-empty validation report as
    /// [`Error::Validation`], else `Ok`.
    pub fn into_result(self) -> Result<()> {
        if let Some(Err(e)) = self.build {
            return Err(e);
        }
        if let Some(report) = self.validation {
            report.into_result()?;
        }
        Ok(())
    }
}

/// `execute` scans once, then runs the build and validation passes selected by the plan on separate
/// threads. Both passes share the scanned artifacts read-only and run to completion independently.
///
/// Failure to scan, resolve an alias or parse a certificate is returned before either pass starts.
pub fn execute(plan: &ResolvedPlan, clock: &dyn Clock) -> Result<ExecutionOutcome> {
    if plan.trust_store.is_none() && plan.policy.is_none() {
        info!("Neither building nor checking was requested");
        return Ok(ExecutionOutcome::default());
    }

    let artifacts = collect_artifacts(&plan.scan_root, &plan.resolver)?;
    let artifacts = artifacts.as_slice();

    let (build, validation) = std::thread::scope(|s| {
        let builder = plan
            .trust_store
            .as_ref()
            .map(|spec| s.spawn(move || TrustStoreBuilder::new(spec, clock).build(artifacts)));
        let validator = plan
            .policy
            .map(|policy| s.spawn(move || ExpiryValidator::new(policy, clock).validate(artifacts)));

        let build = builder.map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)));
        let validation =
            validator.map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)));
        (build, validation)
    });

    Ok(ExecutionOutcome {
        certificates: artifacts.len(),
        build,
        validation,
    })
}

#[test]
fn extension_normalization() {
    let exts = vec![
        "pem".to_string(),
        " ".to_string(),
        ".crt".to_string(),
        "pem".to_string(),
        "..x".to_string(),
        "".to_string(),
    ];
    assert_eq!(vec!["pem", "crt"], normalize_extensions(&exts));
}

#[test]
fn store_extensions() {
    assert!(is_supported_store(std::path::Path::new("build/cacerts.jks")));
    assert!(is_supported_store(std::path::Path::new("build/cacerts.JKS")));
    assert!(!is_supported_store(std::path::Path::new("build/cacerts.p12")));
    assert!(!is_supported_store(std::path::Path::new("build/cacerts")));
}
