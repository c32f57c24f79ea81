//! Discovery of certificate files, alias resolution and certificate parsing

pub mod alias_resolver;
pub mod artifact;
pub mod cert_loader;
pub mod path_scanner;
pub mod properties;

pub use crate::source::{alias_resolver::*, artifact::*, cert_loader::*, path_scanner::*};
