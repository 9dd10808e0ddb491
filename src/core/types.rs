// src/core/types.rs
use crate::error::TypeaheadError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A single suggestible identifier and its popularity weight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub frequency: u64,
}

impl Skill {
    pub fn new(id: impl Into<String>, frequency: u64) -> Self {
        Self { id: id.into(), frequency }
    }
}

/// The immutable set of skills an engine is built from.
/// Skills keep the order in which their id was first seen.
#[derive(Debug, Clone, Default)]
pub struct SkillVocabulary {
    skills: Vec<Skill>,
    positions: HashMap<String, usize>,
    max_length: usize,
    characters: HashSet<char>,
}

impl SkillVocabulary {
    /// Builds a vocabulary, rejecting empty identifiers.
    /// A repeated id keeps its first position and takes the later frequency.
    pub fn build<I>(skills: I) -> Result<Self, TypeaheadError>
    where
        I: IntoIterator<Item = Skill>,
    {
        let mut vocab = Self::default();
        for skill in skills {
            if skill.id.is_empty() {
                return Err(TypeaheadError::EmptyIdentifier);
            }
            vocab.max_length = vocab.max_length.max(skill.id.chars().count());
            vocab.characters.extend(skill.id.chars());
            match vocab.positions.get(&skill.id) {
                Some(&pos) => vocab.skills[pos] = skill,
                None => {
                    vocab.positions.insert(skill.id.clone(), vocab.skills.len());
                    vocab.skills.push(skill);
                }
            }
        }
        Ok(vocab)
    }

    pub fn get(&self, id: &str) -> Option<&Skill> {
        self.positions.get(id).map(|&pos| &self.skills[pos])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Skill> {
        self.skills.iter()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Length in characters of the longest identifier.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Every character that appears in some identifier.
    pub fn characters(&self) -> &HashSet<char> {
        &self.characters
    }

    pub fn total_frequency(&self) -> u64 {
        self.skills.iter().map(|skill| skill.frequency).sum()
    }
}

impl<'a> IntoIterator for &'a SkillVocabulary {
    type Item = &'a Skill;
    type IntoIter = std::slice::Iter<'a, Skill>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
