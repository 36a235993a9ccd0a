//! Greedy best-first spanning tree over the tag graph.
//!
//! Starting at the root, the most trustworthy arc leaving the reached set is taken next:
//! lowest goodness first, then shortest distance, then lowest key. Every reachable tag ends
//! up with exactly one tree arc towards the root.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use rustc_hash::FxHashSet;

use crate::TagId;
use crate::arc::{Arc, ArcKey};
use crate::tag::Tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TreeEdge {
    pub(crate) key: ArcKey,
    /// Endpoint closer to the root.
    pub(crate) parent: TagId,
    pub(crate) child: TagId,
    /// Depth of `child`.
    pub(crate) hop_count: u32,
}

/// Tree edges in parent-before-child order, plus every reached tag (root included).
#[derive(Debug, Default)]
pub(crate) struct SpanningTree {
    pub(crate) edges: Vec<TreeEdge>,
    pub(crate) reached: FxHashSet<TagId>,
}

struct Candidate {
    goodness: f64,
    distance: f64,
    edge: TreeEdge,
}

impl Candidate {
    fn priority(&self, other: &Self) -> Ordering {
        self.goodness
            .total_cmp(&other.goodness)
            .then_with(|| self.distance.total_cmp(&other.distance))
            .then_with(|| self.edge.key.cmp(&other.edge.key))
            .then_with(|| self.edge.child.cmp(&other.edge.child))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.priority(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // `BinaryHeap` is a max-heap; the best candidate must compare greatest.
    fn cmp(&self, other: &Self) -> Ordering {
        other.priority(self)
    }
}

pub(crate) fn build(
    tags: &BTreeMap<TagId, Tag>,
    arcs: &BTreeMap<ArcKey, Arc>,
    root: TagId,
) -> SpanningTree {
    let mut tree = SpanningTree::default();
    if !tags.contains_key(&root) {
        return tree;
    }

    let mut frontier: BinaryHeap<Candidate> = BinaryHeap::new();
    tree.reached.insert(root);
    push_frontier(tags, arcs, &tree.reached, root, 0, &mut frontier);

    while let Some(candidate) = frontier.pop() {
        let edge = candidate.edge;
        if !tree.reached.insert(edge.child) {
            continue;
        }
        tree.edges.push(edge);
        push_frontier(
            tags,
            arcs,
            &tree.reached,
            edge.child,
            edge.hop_count,
            &mut frontier,
        );
    }

    tree
}

fn push_frontier(
    tags: &BTreeMap<TagId, Tag>,
    arcs: &BTreeMap<ArcKey, Arc>,
    reached: &FxHashSet<TagId>,
    id: TagId,
    hop_count: u32,
    frontier: &mut BinaryHeap<Candidate>,
) {
    let Some(tag) = tags.get(&id) else {
        return;
    };
    for &key in tag.arcs() {
        let Some(other) = key.other(id) else {
            debug_assert!(false, "tag {id} lists foreign arc {key}");
            continue;
        };
        if reached.contains(&other) {
            continue;
        }
        let Some(arc) = arcs.get(&key) else {
            continue;
        };
        frontier.push(Candidate {
            goodness: arc.goodness(),
            distance: arc.distance(),
            edge: TreeEdge {
                key,
                parent: id,
                child: other,
                hop_count: hop_count + 1,
            },
        });
    }
}
