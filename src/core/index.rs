// File: src/core/index.rs
use crate::core::trie::{NodeId, Trie};
use crate::error::TypeaheadError;
use std::collections::HashMap;

/// Trie nodes bucketed by the character they represent.
/// Only the non-contiguous fallback reads it.
#[derive(Debug, Clone, Default)]
pub struct PositionIndex {
    buckets: HashMap<char, Vec<NodeId>>,
}

impl PositionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `node` to the bucket for `character`, returning its slot.
    pub fn add_node(&mut self, character: char, node: NodeId) -> usize {
        let bucket = self.buckets.entry(character).or_default();
        bucket.push(node);
        bucket.len() - 1
    }

    /// The nodes indexed under `key`, which must be exactly one character.
    pub fn get_nodes(&self, key: &str) -> Result<&[NodeId], TypeaheadError> {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(self.bucket(c)),
            _ => Err(TypeaheadError::InvalidCharacter(key.to_string())),
        }
    }

    pub fn bucket(&self, character: char) -> &[NodeId] {
        self.buckets.get(&character).map(Vec::as_slice).unwrap_or(&[])
    }

    fn replace(&mut self, character: char, slot: usize, node: NodeId) {
        if let Some(entry) = self.buckets.get_mut(&character).and_then(|b| b.get_mut(slot)) {
            *entry = node;
        }
    }

    /// Total number of indexed slots across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps the [`PositionIndex`] in step with a single word's insertion.
///
/// Only the last occurrence of each letter in the word is indexed. Say
/// "airflow" is already present and "airtime" is inserted: the shared 'i' at
/// position 1 gives up its slot, and the 'i' at position 4 of "airtime"
/// takes that same slot over.
///
/// Words that share structure but repeat letters at different depths can
/// still leave more than one slot reaching the same word, so the fallback
/// may return duplicates.
pub struct IndexMaintainer<'a> {
    index: &'a mut PositionIndex,
    latest_letter_positions: HashMap<char, usize>,
    index_positions: HashMap<char, usize>,
}

impl<'a> IndexMaintainer<'a> {
    pub fn new(index: &'a mut PositionIndex, word: &str) -> Self {
        Self {
            index,
            latest_letter_positions: Self::compute_replacements(word),
            index_positions: HashMap::new(),
        }
    }

    /// Highest position of each character in `word`.
    fn compute_replacements(word: &str) -> HashMap<char, usize> {
        word.chars().enumerate().map(|(position, c)| (c, position)).collect()
    }

    pub fn latest_position(&self, character: char) -> Option<usize> {
        self.latest_letter_positions.get(&character).copied()
    }

    /// Called for the node at each `position` of the word, in order.
    pub fn index_node(&mut self, trie: &mut Trie, node: NodeId, position: usize) {
        let Some(character) = trie.node(node).character() else {
            return;
        };
        let Some(latest) = self.latest_position(character) else {
            return;
        };

        if position == latest {
            if trie.node(node).index_slot().is_some() {
                return;
            }
            let slot = match self.index_positions.get(&character) {
                Some(&slot) => {
                    self.index.replace(character, slot, node);
                    slot
                }
                None => self.index.add_node(character, node),
            };
            trie.set_index_slot(node, Some(slot));
        } else if position < latest {
            // A later occurrence in this word will claim the slot.
            if let Some(slot) = trie.node(node).index_slot() {
                self.index_positions.insert(character, slot);
                trie.set_index_slot(node, None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::trie::ROOT;

    fn insert(trie: &mut Trie, index: &mut PositionIndex, word: &str) -> Vec<NodeId> {
        let mut maintainer = IndexMaintainer::new(index, word);
        let mut node = ROOT;
        let mut path = Vec::new();
        for (position, c) in word.chars().enumerate() {
            node = trie.get_or_add_child(node, c);
            maintainer.index_node(trie, node, position);
            path.push(node);
        }
        path
    }

    #[test]
    fn compute_replacements_keeps_latest_position() {
        let mut index = PositionIndex::new();
        let manager = IndexMaintainer::new(&mut index, "roseanne");
        assert_eq!(manager.latest_position('e'), Some(7));
        assert_eq!(manager.latest_position('r'), Some(0));
        assert_eq!(manager.latest_position('n'), Some(6));
        assert_eq!(manager.latest_position('z'), None);
    }

    #[test]
    fn get_nodes_rejects_anything_but_one_character() {
        let index = PositionIndex::new();
        assert!(matches!(index.get_nodes(""), Err(TypeaheadError::InvalidCharacter(_))));
        assert!(matches!(index.get_nodes("ab"), Err(TypeaheadError::InvalidCharacter(_))));
        assert_eq!(index.get_nodes("é").unwrap(), &[] as &[NodeId]);
    }

    #[test]
    fn repeated_letter_indexes_only_last_occurrence() {
        let mut trie = Trie::new();
        let mut index = PositionIndex::new();
        let path = insert(&mut trie, &mut index, "anna");
        assert_eq!(index.bucket('a'), &[path[3]]);
        assert_eq!(index.bucket('n'), &[path[2]]);
        assert_eq!(trie.node(path[0]).index_slot(), None);
        assert_eq!(trie.node(path[3]).index_slot(), Some(0));
    }

    #[test]
    fn later_word_takes_over_the_shared_slot() {
        let mut trie = Trie::new();
        let mut index = PositionIndex::new();
        let airflow = insert(&mut trie, &mut index, "airflow");
        assert_eq!(index.bucket('i'), &[airflow[1]]);

        let airtime = insert(&mut trie, &mut index, "airtime");
        assert_eq!(index.bucket('i'), &[airtime[4]]);
        assert_eq!(trie.node(airtime[4]).index_slot(), Some(0));
        assert_eq!(trie.node(airflow[1]).index_slot(), None);
    }

    #[test]
    fn shared_prefix_is_not_indexed_twice() {
        let mut trie = Trie::new();
        let mut index = PositionIndex::new();
        insert(&mut trie, &mut index, "rust");
        insert(&mut trie, &mut index, "ruby");
        assert_eq!(index.bucket('r').len(), 1);
        assert_eq!(index.bucket('u').len(), 1);
        assert_eq!(index.len(), 6);
    }
}
