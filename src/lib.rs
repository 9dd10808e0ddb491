// src/lib.rs

pub mod core;
pub mod error;
pub mod loader;
pub use crate::core::engine::{Typeahead, TypeaheadConfig};
pub use crate::core::types::{Skill, SkillVocabulary};
pub use crate::error::{LoadError, TypeaheadError};
