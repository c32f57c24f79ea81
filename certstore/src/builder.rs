//! Trust store serialization and atomic assembly

pub mod key_store;
pub mod trust_store_builder;

pub use crate::builder::{key_store::*, trust_store_builder::*};
