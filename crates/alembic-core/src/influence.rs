//! Molecule influence sets.
//!
//! Conditions declare the molecules they read and actions the molecules
//! they write. Either may instead declare that it touches everything,
//! which is what [`MoleculeSet::Unbounded`] records.

use indexmap::IndexSet;

use crate::molecule::Molecule;

/// The set of molecules a condition, action or reaction touches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoleculeSet {
    /// An explicit, finite set of molecules (possibly empty).
    Bounded(IndexSet<Molecule>),
    /// Every molecule, including ones never declared anywhere.
    Unbounded,
}

impl MoleculeSet {
    /// The empty bounded set.
    pub fn empty() -> Self {
        Self::Bounded(IndexSet::new())
    }

    /// Whether this is [`MoleculeSet::Unbounded`].
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// Whether the set is bounded and holds no molecule.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Bounded(set) => set.is_empty(),
            Self::Unbounded => false,
        }
    }

    /// Whether the set contains `molecule`. Always true when unbounded.
    pub fn contains(&self, molecule: &Molecule) -> bool {
        match self {
            Self::Bounded(set) => set.contains(molecule),
            Self::Unbounded => true,
        }
    }

    /// Add the molecules declared by one contributor.
    ///
    /// `None` means the contributor touches everything, which turns the
    /// whole set unbounded.
    pub fn extend_with(&mut self, declared: Option<&[Molecule]>) {
        match declared {
            None => *self = Self::Unbounded,
            Some(molecules) => {
                if let Self::Bounded(set) = self {
                    set.extend(molecules.iter().cloned());
                }
            }
        }
    }

    /// Return the union of two sets. Unbounded absorbs.
    pub fn union(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Bounded(a), Self::Bounded(b)) => {
                Self::Bounded(a.iter().chain(b.iter()).cloned().collect())
            }
            _ => Self::Unbounded,
        }
    }

    /// Whether two sets share at least one molecule.
    ///
    /// An unbounded set intersects every set, including an empty one:
    /// a reaction that may touch anything must be considered dependent.
    pub fn intersects(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bounded(a), Self::Bounded(b)) => {
                let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
                small.iter().any(|m| large.contains(m))
            }
            _ => true,
        }
    }
}

impl Default for MoleculeSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<Molecule> for MoleculeSet {
    fn from_iter<I: IntoIterator<Item = Molecule>>(iter: I) -> Self {
        Self::Bounded(iter.into_iter().collect())
    }
}
