//! Resolution of `derivedFrom` references.
//!
//! A reference is a dotted path of names. The ancestors of the referencing node form a stack of
//! frames, one per level above it, each frame being the node whose child collections are
//! searched. A path of `n` segments starts at the `n`-th frame from the end, so a full-depth path
//! is absolute and a shorter one is relative to the nearest ancestors.

use crate::{
  error::{SvdResolverError, SvdResolverErrorKind, SvdResolverResult},
  node::NodeId,
  tree::DeviceTree,
};

/// Resolves `path` against the ancestor `frames` of the referencing node, outermost first.
pub(crate) fn resolve(
  tree: &DeviceTree,
  frames: &[NodeId],
  path: &str,
) -> SvdResolverResult<NodeId> {
  let depth = path.split('.').count();
  if depth > frames.len() {
    return Err(SvdResolverError::new(
      SvdResolverErrorKind::PathTooDeep,
      &format!(
        "Path '{}' has {} levels but only {} are above the referencing node",
        path,
        depth,
        frames.len()
      ),
    ));
  }

  descend(tree, frames[frames.len() - depth], path)
}

/// Follows the segments of `path` downwards from `start`. Each segment matches the first child of
/// that name across all child collections of the current node, clusters before registers.
pub(crate) fn descend(tree: &DeviceTree, start: NodeId, path: &str) -> SvdResolverResult<NodeId> {
  let mut current = start;
  for segment in path.split('.') {
    current = tree.lookup(current, segment).ok_or_else(|| {
      SvdResolverError::new(
        SvdResolverErrorKind::PathUnreachable,
        &format!("Path '{}' is unreachable: no element named '{}'", path, segment),
      )
    })?;
  }
  Ok(current)
}
