//! Settings, input resolution and execution of the build and validation passes

pub mod plan;
pub mod settings;

pub use crate::environment::{plan::*, settings::*};
