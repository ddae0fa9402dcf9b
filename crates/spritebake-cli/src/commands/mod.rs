//! CLI command implementations

pub mod doctor;
pub mod inspect;
pub mod render;

mod reporting;
