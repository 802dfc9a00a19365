//! The [`Molecule`] token.

use std::fmt;
use std::sync::Arc;

/// An immutable named token whose concentration nodes track.
///
/// Identity is the name alone: equality, ordering and hashing all derive
/// from it. Cloning shares the underlying string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Molecule(Arc<str>);

impl Molecule {
    /// Create a molecule with the given name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The molecule's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Molecule({:?})", &*self.0)
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Molecule {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Molecule {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}
