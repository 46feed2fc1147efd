//! Adaptation adapters
//!
//! Stateless lookups turning request parameters into instruction fragments
//! and adaptation metadata.

pub mod bilingual;
pub mod iep;
pub mod subject;
pub mod wida;

pub use wida::{ProficiencyLevel, WidaAdaptations};
