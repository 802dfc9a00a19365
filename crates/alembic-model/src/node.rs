//! The [`Node`] type and the [`Concentration`] bound.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use alembic_core::{spread_hash, IdGenerator, Molecule, NodeId, ReactionId};
use indexmap::IndexMap;

/// Bound satisfied by every concentration value type.
///
/// Concentrations are opaque to the kernel; incarnations pick the type
/// (`f64` for chemistry, richer values for other domains).
pub trait Concentration: Clone + fmt::Debug + Send + Sync + 'static {}

impl<T: Clone + fmt::Debug + Send + Sync + 'static> Concentration for T {}

/// A located entity holding molecule concentrations and hosting reactions.
///
/// Identity is the id alone: nodes compare, order and hash by it. The
/// reaction list holds ids only; reactions themselves are stored by the
/// scheduler.
#[derive(Clone, Debug)]
pub struct Node<T> {
    id: NodeId,
    hash: i32,
    contents: IndexMap<Molecule, T>,
    reactions: Vec<ReactionId>,
}

impl<T: Concentration> Node<T> {
    /// Create an empty node with a given id.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            hash: spread_hash(id.0),
            contents: IndexMap::new(),
            reactions: Vec::new(),
        }
    }

    /// Create an empty node with the next id from `ids`.
    pub fn with_ids(ids: &IdGenerator) -> Self {
        Self::new(ids.next_node_id())
    }

    /// The node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The spread hash of the node's id.
    pub fn hash_code(&self) -> i32 {
        self.hash
    }

    /// Concentration of `molecule`, if present.
    pub fn concentration(&self, molecule: &Molecule) -> Option<&T> {
        self.contents.get(molecule)
    }

    /// Whether the node holds `molecule`.
    pub fn contains(&self, molecule: &Molecule) -> bool {
        self.contents.contains_key(molecule)
    }

    /// Set the concentration of `molecule`, returning the previous value.
    pub fn set_concentration(&mut self, molecule: Molecule, value: T) -> Option<T> {
        self.contents.insert(molecule, value)
    }

    /// Remove `molecule`, returning its concentration.
    ///
    /// The remaining molecules keep their insertion order.
    pub fn remove_concentration(&mut self, molecule: &Molecule) -> Option<T> {
        self.contents.shift_remove(molecule)
    }

    /// All molecules and concentrations, in insertion order.
    pub fn contents(&self) -> &IndexMap<Molecule, T> {
        &self.contents
    }

    /// Number of distinct molecules held.
    pub fn molecule_count(&self) -> usize {
        self.contents.len()
    }

    /// Ids of the reactions hosted by this node, in insertion order.
    pub fn reactions(&self) -> &[ReactionId] {
        &self.reactions
    }

    /// Register a hosted reaction. Ignored if already present.
    pub fn add_reaction(&mut self, reaction: ReactionId) {
        if !self.reactions.contains(&reaction) {
            self.reactions.push(reaction);
        }
    }

    /// Unregister a hosted reaction. Returns whether it was present.
    pub fn remove_reaction(&mut self, reaction: ReactionId) -> bool {
        match self.reactions.iter().position(|r| *r == reaction) {
            Some(i) => {
                self.reactions.remove(i);
                true
            }
            None => false,
        }
    }
}

impl<T> PartialEq for Node<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Node<T> {}

impl<T> PartialOrd for Node<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Node<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl<T> Hash for Node<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
