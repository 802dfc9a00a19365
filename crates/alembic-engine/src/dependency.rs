//! Which reactions must be rescheduled after another one fires.

use alembic_core::Context;
use alembic_model::{Neighborhood, Reaction};

/// Whether `candidate` must be updated after `executed` fired.
///
/// Requires overlapping molecules (`executed` writes something
/// `candidate` reads) and agreeing locality, judged on the least strict
/// of the two contexts:
///
/// - `Local`: same node.
/// - `Neighborhood`: same node, or the candidate's node is a current
///   neighbor of the executed reaction's node.
/// - `Global`: always.
///
/// A reaction never depends on itself; the engine updates the executed
/// reaction on its own.
pub fn depends_on<T, P>(
    executed: &Reaction<T, P>,
    candidate: &Reaction<T, P>,
    executed_neighborhood: Option<&Neighborhood>,
) -> bool {
    if executed.id() == candidate.id() {
        return false;
    }
    if !executed
        .influenced_molecules()
        .intersects(candidate.influencing_molecules())
    {
        return false;
    }
    let same_node = executed.node() == candidate.node();
    match executed
        .output_context()
        .least_strict(candidate.input_context())
    {
        Context::Local => same_node,
        Context::Neighborhood => {
            same_node || executed_neighborhood.is_some_and(|n| n.contains(candidate.node()))
        }
        Context::Global => true,
    }
}
