//! Basic utility functionality supporting trust store assembly and certificate checks

pub mod error;
pub mod file_utils;
pub mod time_of_interest;

pub use crate::{util::error::*, util::file_utils::*, util::time_of_interest::*};
