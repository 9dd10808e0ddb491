// File: src/loader.rs
use crate::core::types::{Skill, SkillVocabulary};
use crate::error::LoadError;
use log::{debug, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Frequency given to words read from a plain word list.
pub const DEFAULT_FREQUENCY: u64 = 1;

/// Reads a vocabulary from `path`.
/// `.json` files hold an array of skills; anything else is a word list.
pub fn load_path(path: &Path) -> Result<SkillVocabulary, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let vocab = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json(reader)?,
        _ => load_word_list(reader)?,
    };
    debug!("Loaded {} skills from {}", vocab.len(), path.display());
    Ok(vocab)
}

/// One skill per line; the trimmed line is the id, spaces included.
/// A tab separates an optional frequency. Blank lines are skipped.
pub fn load_word_list<R: BufRead>(reader: R) -> Result<SkillVocabulary, LoadError> {
    let mut skills = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let (id, raw_frequency) = match line.split_once('\t') {
            Some((id, raw)) => (id.trim(), Some(raw.trim())),
            None => (line.trim(), None),
        };
        if id.is_empty() {
            if raw_frequency.is_some() {
                return Err(LoadError::InvalidLine {
                    line: number + 1,
                    reason: "missing skill before frequency".to_string(),
                });
            }
            warn!("Skipping blank line {}", number + 1);
            continue;
        }
        let frequency = match raw_frequency {
            Some(raw) => raw.parse::<u64>().map_err(|e| LoadError::InvalidLine {
                line: number + 1,
                reason: format!("bad frequency '{}': {}", raw, e),
            })?,
            None => DEFAULT_FREQUENCY,
        };
        skills.push(Skill::new(id, frequency));
    }
    Ok(SkillVocabulary::build(skills)?)
}

/// A JSON array of `{"id": ..., "frequency": ...}` objects.
pub fn load_json<R: Read>(reader: R) -> Result<SkillVocabulary, LoadError> {
    let skills: Vec<Skill> = serde_json::from_reader(reader)?;
    Ok(SkillVocabulary::build(skills)?)
}

/// The small built-in vocabulary used when no file is given.
pub fn sample_skills() -> Vec<Skill> {
    vec![
        Skill::new("ruby", 1),
        Skill::new("rugby", 2),
        Skill::new("rails", 30),
        Skill::new("racheal", 4),
        Skill::new("rutherford", 2),
        Skill::new("ross", 3),
        Skill::new("rust", 6),
    ]
}
