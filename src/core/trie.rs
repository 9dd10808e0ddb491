// --- File: src/core/trie.rs
use crate::core::types::Skill;
use crate::error::TypeaheadError;

/// Handle of a node inside a [`Trie`] arena.
pub type NodeId = usize;

/// The root is always the first node of the arena.
pub const ROOT: NodeId = 0;

/// One character position in the shared prefix tree.
#[derive(Debug, Clone)]
pub struct TrieNode {
    /// `None` only for the root.
    character: Option<char>,
    /// Children in insertion order, which fixes every tie-break below.
    children: Vec<(char, NodeId)>,
    parent: Option<NodeId>,
    skill: Option<Skill>,
    total_weight: Option<u64>,
    index_slot: Option<usize>,
}

impl TrieNode {
    fn new(character: Option<char>, parent: Option<NodeId>) -> Self {
        Self {
            character,
            children: Vec::new(),
            parent,
            skill: None,
            total_weight: None,
            index_slot: None,
        }
    }

    pub fn character(&self) -> Option<char> {
        self.character
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn skill(&self) -> Option<&Skill> {
        self.skill.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.skill.is_some()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn children(&self) -> impl Iterator<Item = (char, NodeId)> + '_ {
        self.children.iter().copied()
    }

    /// Slot of this node inside its character's position index bucket.
    pub fn index_slot(&self) -> Option<usize> {
        self.index_slot
    }

    /// The memoized subtree weight, present once the trie has been finalized.
    pub fn cached_weight(&self) -> Option<u64> {
        self.total_weight
    }

    fn own_weight(&self) -> u64 {
        self.skill.as_ref().map_or(0, |skill| skill.frequency)
    }
}

/// An arena-backed prefix tree of skills.
///
/// Nodes are only ever appended, so a child always has a larger id than its
/// parent. The trie is built by a sequence of insertions and then
/// [`finalize`](Trie::finalize)d, which memoizes every subtree weight once;
/// from then on every query is a pure read.
#[derive(Debug, Clone)]
pub struct Trie {
    nodes: Vec<TrieNode>,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    pub fn new() -> Self {
        Self { nodes: vec![TrieNode::new(None, None)] }
    }

    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id]
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        !self.nodes[ROOT].has_children() && !self.nodes[ROOT].is_terminal()
    }

    pub fn child(&self, id: NodeId, character: char) -> Option<NodeId> {
        self.nodes[id]
            .children
            .iter()
            .find(|&&(c, _)| c == character)
            .map(|&(_, child)| child)
    }

    /// Creates a node for `character` under `parent`.
    /// An existing child for the same character is silently replaced; its
    /// subtree stays in the arena unreachable but still counted by `len` and
    /// possibly still referenced by the position index. Insertion goes
    /// through [`get_or_add_child`](Self::get_or_add_child), which never replaces.
    pub(crate) fn add_child(&mut self, parent: NodeId, character: char) -> NodeId {
        let new_id = self.nodes.len();
        self.nodes.push(TrieNode::new(Some(character), Some(parent)));
        let node = &mut self.nodes[parent];
        node.total_weight = None;
        match node.children.iter_mut().find(|(c, _)| *c == character) {
            Some(slot) => slot.1 = new_id,
            None => node.children.push((character, new_id)),
        }
        new_id
    }

    /// Returns the child for `character`, creating it when absent.
    /// Either way the parent's cached weight is dropped, since a word is
    /// about to be inserted beneath it.
    pub fn get_or_add_child(&mut self, parent: NodeId, character: char) -> NodeId {
        match self.child(parent, character) {
            Some(child) => {
                self.nodes[parent].total_weight = None;
                child
            }
            None => self.add_child(parent, character),
        }
    }

    /// Attaches `skill` to `id`, returning the skill it replaced.
    pub fn attach_skill(&mut self, id: NodeId, skill: Skill) -> Option<Skill> {
        let node = &mut self.nodes[id];
        node.total_weight = None;
        node.skill.replace(skill)
    }

    pub(crate) fn set_index_slot(&mut self, id: NodeId, slot: Option<usize>) {
        self.nodes[id].index_slot = slot;
    }

    /// Memoizes the weight of every node and returns the root's.
    /// Children are visited before their parents by walking the arena backwards.
    pub fn finalize(&mut self) -> u64 {
        for id in (0..self.nodes.len()).rev() {
            let children: u64 = self.nodes[id]
                .children
                .iter()
                .map(|&(_, child)| self.nodes[child].total_weight.unwrap_or(0))
                .sum();
            let node = &mut self.nodes[id];
            node.total_weight = Some(node.own_weight() + children);
        }
        self.nodes[ROOT].total_weight.unwrap_or(0)
    }

    pub fn is_finalized(&self) -> bool {
        self.nodes[ROOT].total_weight.is_some()
    }

    /// Aggregate popularity of the subtree rooted at `id`.
    /// Served from the cache after finalization, computed on the fly before.
    pub fn total_weight(&self, id: NodeId) -> u64 {
        let node = &self.nodes[id];
        if let Some(weight) = node.total_weight {
            return weight;
        }
        node.own_weight()
            + node
                .children
                .iter()
                .map(|&(_, child)| self.total_weight(child))
                .sum::<u64>()
    }

    /// The child with the highest weight; later children win ties.
    pub fn most_popular_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best: Option<(u64, NodeId)> = None;
        for &(_, child) in &self.nodes[id].children {
            let weight = self.total_weight(child);
            if best.map_or(true, |(max, _)| weight >= max) {
                best = Some((weight, child));
            }
        }
        best.map(|(_, child)| child)
    }

    /// The child a mistyped letter is corrected to: the highest weight child,
    /// earlier children winning ties.
    pub fn suggest_on_missing_letter(&self, id: NodeId) -> Result<NodeId, TypeaheadError> {
        let mut best: Option<(u64, NodeId)> = None;
        for &(_, child) in &self.nodes[id].children {
            let weight = self.total_weight(child);
            if best.map_or(true, |(max, _)| weight > max) {
                best = Some((weight, child));
            }
        }
        best.map(|(_, child)| child).ok_or(TypeaheadError::NoChildren)
    }

    /// Up to `limit` skills from the subtree of `id`, most frequent first.
    ///
    /// The node's own skill comes first, then the subtree is drained from a
    /// stack of children pushed in insertion order, so the most recently
    /// inserted branch is visited first. The sort is stable: equally frequent
    /// skills keep that visiting order.
    pub fn return_popular_skills(&self, id: NodeId, limit: usize) -> Vec<&Skill> {
        let root = &self.nodes[id];
        let mut skills: Vec<&Skill> = root.skill.iter().collect();
        let mut stack: Vec<NodeId> = root.children.iter().map(|&(_, child)| child).collect();
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current];
            stack.extend(node.children.iter().map(|&(_, child)| child));
            if let Some(skill) = &node.skill {
                skills.push(skill);
            }
        }
        skills.sort_by_key(|skill| std::cmp::Reverse(skill.frequency));
        skills.truncate(limit);
        skills
    }

    /// Whether `pattern` appears, in order but not necessarily adjacent, on
    /// the path from the parent of `id` up to the root.
    pub fn is_non_contiguous_match(&self, id: NodeId, pattern: &[char]) -> bool {
        let mut remaining = pattern;
        let mut current = id;
        loop {
            let Some((&last, rest)) = remaining.split_last() else {
                return true;
            };
            let Some(parent) = self.nodes[current].parent else {
                return false;
            };
            if self.nodes[parent].character == Some(last) {
                remaining = rest;
            }
            current = parent;
        }
    }

    /// The characters on the path from the root to `id`.
    pub fn path(&self, id: NodeId) -> String {
        let mut chars = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            chars.extend(self.nodes[node].character);
            current = self.nodes[node].parent;
        }
        chars.iter().rev().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(trie: &mut Trie, id: &str, frequency: u64) -> NodeId {
        let mut node = ROOT;
        for c in id.chars() {
            node = trie.get_or_add_child(node, c);
        }
        trie.attach_skill(node, Skill::new(id, frequency));
        node
    }

    fn walk(trie: &Trie, path: &str) -> NodeId {
        path.chars().fold(ROOT, |node, c| trie.child(node, c).unwrap())
    }

    fn sample() -> Trie {
        let mut trie = Trie::new();
        for (id, freq) in [
            ("ruby", 1),
            ("rugby", 2),
            ("rails", 30),
            ("racheal", 4),
            ("rutherford", 2),
            ("ross", 3),
            ("rust", 6),
        ] {
            insert(&mut trie, id, freq);
        }
        trie.finalize();
        trie
    }

    #[test]
    fn add_child_sets_parent_and_replaces_silently() {
        let mut trie = Trie::new();
        let first = trie.add_child(ROOT, 'a');
        assert_eq!(trie.node(first).parent(), Some(ROOT));
        assert_eq!(trie.node(first).character(), Some('a'));

        let second = trie.add_child(ROOT, 'a');
        assert_ne!(first, second);
        assert_eq!(trie.child(ROOT, 'a'), Some(second));
        assert_eq!(trie.node(ROOT).children().count(), 1);
        // the replaced node is orphaned, not freed
        assert_eq!(trie.len(), 3);
        assert_eq!(trie.get_or_add_child(ROOT, 'a'), second);
        assert_eq!(trie.len(), 3);
    }

    #[test]
    fn finalize_sums_whole_subtrees() {
        let trie = sample();
        assert_eq!(trie.total_weight(ROOT), 48);
        assert_eq!(trie.total_weight(walk(&trie, "ru")), 11);
        assert_eq!(trie.total_weight(walk(&trie, "ra")), 34);
        assert!(trie.is_finalized());
    }

    #[test]
    fn terminal_with_descendants_counts_both() {
        let mut trie = Trie::new();
        let rose = insert(&mut trie, "rose", 3);
        insert(&mut trie, "roseanne", 7);
        assert_eq!(trie.total_weight(rose), 10);
        trie.finalize();
        assert_eq!(trie.node(rose).cached_weight(), Some(10));
    }

    #[test]
    fn insertion_after_finalize_drops_stale_weights() {
        let mut trie = sample();
        insert(&mut trie, "rune", 10);
        assert!(!trie.is_finalized());
        assert_eq!(trie.total_weight(ROOT), 58);
        assert_eq!(trie.finalize(), 58);
    }

    #[test]
    fn popular_child_selection() {
        let trie = sample();
        let r = walk(&trie, "r");
        assert_eq!(trie.most_popular_child(r), Some(walk(&trie, "ra")));
        assert_eq!(trie.suggest_on_missing_letter(r).unwrap(), walk(&trie, "ra"));

        let leaf = walk(&trie, "rust");
        assert_eq!(trie.most_popular_child(leaf), None);
        assert!(matches!(
            trie.suggest_on_missing_letter(leaf),
            Err(TypeaheadError::NoChildren)
        ));
    }

    #[test]
    fn ties_break_on_insertion_order() {
        let mut trie = Trie::new();
        insert(&mut trie, "ab", 2);
        insert(&mut trie, "ac", 2);
        trie.finalize();
        let a = walk(&trie, "a");
        assert_eq!(trie.most_popular_child(a), Some(walk(&trie, "ac")));
        assert_eq!(trie.suggest_on_missing_letter(a).unwrap(), walk(&trie, "ab"));
    }

    #[test]
    fn popular_skills_are_sorted_and_truncated() {
        let trie = sample();
        let ids: Vec<&str> = trie
            .return_popular_skills(walk(&trie, "ru"), 5)
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["rust", "rutherford", "rugby", "ruby"]);

        let top: Vec<&str> = trie
            .return_popular_skills(ROOT, 2)
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(top, vec!["rails", "rust"]);
    }

    #[test]
    fn equal_frequencies_come_out_latest_branch_first() {
        let mut trie = Trie::new();
        insert(&mut trie, "ab", 1);
        insert(&mut trie, "ac", 1);
        insert(&mut trie, "ad", 1);
        trie.finalize();
        let ids: Vec<&str> = trie
            .return_popular_skills(walk(&trie, "a"), 5)
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["ad", "ac", "ab"]);
    }

    #[test]
    fn own_skill_precedes_equal_descendants() {
        let mut trie = Trie::new();
        let rose = insert(&mut trie, "rose", 1);
        insert(&mut trie, "roses", 1);
        insert(&mut trie, "rosebud", 1);
        trie.finalize();
        let ids: Vec<&str> = trie
            .return_popular_skills(rose, 5)
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["rose", "rosebud", "roses"]);
    }

    #[test]
    fn non_contiguous_match_walks_ancestors() {
        let trie = sample();
        let d = walk(&trie, "rutherford");
        // pattern is checked against the path above the node
        assert!(trie.is_non_contiguous_match(d, &['r', 't', 'f']));
        assert!(trie.is_non_contiguous_match(d, &[]));
        assert!(!trie.is_non_contiguous_match(d, &['f', 't']));
        // the node's own character is not part of the checked path
        assert!(!trie.is_non_contiguous_match(d, &['d']));
        assert!(!trie.is_non_contiguous_match(ROOT, &['r']));
    }

    #[test]
    fn path_spells_the_prefix() {
        let trie = sample();
        assert_eq!(trie.path(walk(&trie, "racheal")), "racheal");
        assert_eq!(trie.path(ROOT), "");
    }
}
