//! Display helpers shared by front ends.

pub mod format;

pub use format::{format_optional, human_date, truncate_string};
