//! Remaining-validity checks over parsed certificates

pub mod expiry_validator;

pub use crate::validator::expiry_validator::*;
