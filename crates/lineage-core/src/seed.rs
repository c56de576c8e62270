//! The minimal capability a record needs to be placed in a commit graph.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Identifier plus ordered parent identifiers.
///
/// Both [`crate::entry::Entry`] (string ids) and [`crate::entry::Summary`]
/// (integer tags) implement this, and the graph engine is generic over it.
pub trait Seed {
    /// Comparable identifier token.
    type Id: Clone + Eq + Hash + Ord + Debug + Display;

    fn id(&self) -> &Self::Id;

    /// Parent identifiers in declared order. Empty for a root.
    fn parents(&self) -> &[Self::Id];
}

impl<S: Seed> Seed for &S {
    type Id = S::Id;

    fn id(&self) -> &Self::Id {
        (**self).id()
    }

    fn parents(&self) -> &[Self::Id] {
        (**self).parents()
    }
}
