//! Ownership discovery.

use std::collections::HashSet;

use graft_foundation::{Error, ObjectId, Result};
use graft_storage::OwnershipGraph;
use tracing::debug;

/// Lists `root` and everything it owns, directly or transitively.
///
/// The order is a depth-first preorder: an object's behaviors (and their
/// sub-objects) come before its child entities, and every owner comes before
/// what it owns. Objects reachable only through references are not listed.
///
/// # Errors
///
/// Returns `StructuralCycle` if an object is reached twice.
pub fn discover<G: OwnershipGraph + ?Sized>(graph: &G, root: ObjectId) -> Result<Vec<ObjectId>> {
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![root];

    while let Some(object) = stack.pop() {
        if !seen.insert(object) {
            return Err(Error::structural_cycle(object));
        }
        order.push(object);
        let owned = graph.owned(object);
        stack.extend(owned.into_iter().rev());
    }

    debug!(root = %root, count = order.len(), "discovered owned objects");
    Ok(order)
}
