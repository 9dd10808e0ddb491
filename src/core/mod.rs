// src/core/mod.rs

pub mod engine;
pub mod index;
pub mod trie;
pub mod types;
