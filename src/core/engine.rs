use crate::core::index::{IndexMaintainer, PositionIndex};
use crate::core::trie::{NodeId, Trie, TrieNode, ROOT};
use crate::core::types::{Skill, SkillVocabulary};
use crate::error::TypeaheadError;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_MISTAKES: usize = 2;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;
pub const DEFAULT_FALLBACK_LIMIT: usize = 2;

/// Limits applied while answering a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeaheadConfig {
    /// Letters the primary walk may correct before giving up.
    pub max_mistakes: usize,
    /// Skills returned when the primary walk succeeds.
    pub suggestion_limit: usize,
    /// Skills taken from each node matched by the fallback.
    pub fallback_limit: usize,
}

impl Default for TypeaheadConfig {
    fn default() -> Self {
        Self {
            max_mistakes: DEFAULT_MAX_MISTAKES,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            fallback_limit: DEFAULT_FALLBACK_LIMIT,
        }
    }
}

/// Why the primary walk handed the query over to the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkFailure {
    /// Reached a node without children before the query ran out.
    Exhausted { position: usize },
    TooManyMistakes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkOutcome {
    Matched(NodeId),
    NeedsFallback(WalkFailure),
}

/// Suggests skills for partial or slightly misspelled input.
///
/// Built once from a vocabulary; afterwards every query only reads, so a
/// built engine can be shared between threads.
#[derive(Debug, Clone)]
pub struct Typeahead {
    trie: Trie,
    index: PositionIndex,
    config: TypeaheadConfig,
    skill_count: usize,
}

impl Default for Typeahead {
    fn default() -> Self {
        Self::new(TypeaheadConfig::default())
    }
}

impl Typeahead {
    pub fn new(config: TypeaheadConfig) -> Self {
        Self {
            trie: Trie::new(),
            index: PositionIndex::new(),
            config,
            skill_count: 0,
        }
    }

    /// Validates `skills` into a vocabulary and builds an engine from it.
    pub fn build<I>(skills: I) -> Result<Self, TypeaheadError>
    where
        I: IntoIterator<Item = Skill>,
    {
        Ok(Self::from_vocabulary(&SkillVocabulary::build(skills)?))
    }

    pub fn from_vocabulary(vocab: &SkillVocabulary) -> Self {
        Self::with_config(vocab, TypeaheadConfig::default())
    }

    pub fn with_config(vocab: &SkillVocabulary, config: TypeaheadConfig) -> Self {
        let mut typeahead = Self::new(config);
        for skill in vocab {
            typeahead.insert(skill.clone());
        }
        typeahead.finalize();
        typeahead
    }

    /// Inserts one skill. Call [`finalize`](Self::finalize) once done adding.
    pub fn add_skill(&mut self, skill: Skill) -> Result<(), TypeaheadError> {
        if skill.id.is_empty() {
            return Err(TypeaheadError::EmptyIdentifier);
        }
        self.insert(skill);
        Ok(())
    }

    fn insert(&mut self, skill: Skill) {
        let mut maintainer = IndexMaintainer::new(&mut self.index, &skill.id);
        let mut node = ROOT;
        for (position, letter) in skill.id.chars().enumerate() {
            node = self.trie.get_or_add_child(node, letter);
            maintainer.index_node(&mut self.trie, node, position);
        }
        if self.trie.attach_skill(node, skill).is_none() {
            self.skill_count += 1;
        }
    }

    /// Memoizes every subtree weight. Returns the total weight of the vocabulary.
    pub fn finalize(&mut self) -> u64 {
        let total = self.trie.finalize();
        debug!(
            "Total frequency of vocabulary is {} ({} skills, {} nodes, {} index slots)",
            total,
            self.skill_count,
            self.trie.len(),
            self.index.len()
        );
        total
    }

    /// Up to `suggestion_limit` skills completing `query`, most popular first.
    /// Falls back to a non-contiguous search when the query can't be walked.
    pub fn suggest(&self, query: &str) -> Vec<String> {
        if query.is_empty() {
            return vec![];
        }
        match self.walk(query) {
            WalkOutcome::Matched(node) => self.popular_ids(node, self.config.suggestion_limit),
            WalkOutcome::NeedsFallback(reason) => {
                debug!("Primary walk for {:?} failed ({:?}), using fallback", query, reason);
                self.non_contiguous_suggestion(query)
            }
        }
    }

    /// Follows `query` down the trie, correcting up to `max_mistakes` letters
    /// to the most popular child.
    fn walk(&self, query: &str) -> WalkOutcome {
        let mut current = ROOT;
        let mut mistakes = 0;
        for (position, letter) in query.chars().enumerate() {
            if !self.trie.node(current).has_children() {
                return WalkOutcome::NeedsFallback(WalkFailure::Exhausted { position });
            }
            current = match self.trie.child(current, letter) {
                Some(child) => child,
                None => {
                    mistakes += 1;
                    if mistakes > self.config.max_mistakes {
                        return WalkOutcome::NeedsFallback(WalkFailure::TooManyMistakes);
                    }
                    match self.trie.suggest_on_missing_letter(current) {
                        Ok(corrected) => {
                            trace!(
                                "Corrected {:?} at position {} to {:?}",
                                letter,
                                position,
                                self.trie.node(corrected).character()
                            );
                            corrected
                        }
                        Err(_) => {
                            return WalkOutcome::NeedsFallback(WalkFailure::Exhausted { position })
                        }
                    }
                }
            };
        }
        WalkOutcome::Matched(current)
    }

    /// Treats `query` as `*q*u*e*r*y`: every indexed node for the last letter
    /// whose ancestors contain the rest of the query in order contributes its
    /// top `fallback_limit` skills, in bucket order. Results are not deduplicated.
    fn non_contiguous_suggestion(&self, query: &str) -> Vec<String> {
        let chars: Vec<char> = query.chars().collect();
        let Some((&last, prefix)) = chars.split_last() else {
            return vec![];
        };
        self.index
            .bucket(last)
            .iter()
            .filter(|&&node| self.trie.is_non_contiguous_match(node, prefix))
            .flat_map(|&node| self.popular_ids(node, self.config.fallback_limit))
            .collect()
    }

    fn popular_ids(&self, node: NodeId, limit: usize) -> Vec<String> {
        self.trie
            .return_popular_skills(node, limit)
            .into_iter()
            .map(|skill| skill.id.clone())
            .collect()
    }

    pub fn config(&self) -> &TypeaheadConfig {
        &self.config
    }

    pub fn index(&self) -> &PositionIndex {
        &self.index
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn node(&self, id: NodeId) -> &TrieNode {
        self.trie.node(id)
    }

    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    /// Follows `path` exactly, without corrections.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        path.chars().try_fold(ROOT, |node, c| self.trie.child(node, c))
    }

    pub fn total_weight(&self) -> u64 {
        self.trie.total_weight(ROOT)
    }

    /// Number of distinct skills inserted.
    pub fn len(&self) -> usize {
        self.skill_count
    }

    pub fn is_empty(&self) -> bool {
        self.skill_count == 0
    }

    pub fn node_count(&self) -> usize {
        self.trie.len()
    }
}
