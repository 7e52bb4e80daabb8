use log::trace;

use crate::{
  error::{SvdResolverError, SvdResolverErrorKind, SvdResolverResult},
  level::HierarchyLevel,
  node::{Collection, Node, NodeId},
  path,
};

/// A device description held as an arena of nodes. Containers refer to their members by id, so
/// re-keying a node or replacing it with its dim expansion only touches its parent's collection.
#[derive(Debug, Clone)]
pub struct DeviceTree {
  nodes: Vec<Node>,
  root: NodeId,
}

impl DeviceTree {
  /// Creates a tree holding only `root`.
  pub fn new(mut root: Node) -> Self {
    root.parent = None;
    root.children.clear();
    Self {
      nodes: vec![root],
      root: NodeId(0),
    }
  }

  pub fn root(&self) -> NodeId {
    self.root
  }

  pub fn node(&self, id: NodeId) -> &Node {
    &self.nodes[id.0]
  }

  pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
    &mut self.nodes[id.0]
  }

  fn push(&mut self, node: Node) -> NodeId {
    self.nodes.push(node);
    NodeId(self.nodes.len() - 1)
  }

  /// The key a node is stored under: its name, or a generated placeholder for anonymous nodes.
  fn key_for(&self, id: NodeId) -> String {
    match self.node(id).name {
      Some(ref name) => name.clone(),
      None => format!("${:08X}", id.0),
    }
  }

  /// Appends `node` to the collection of its level below `parent`.
  pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> SvdResolverResult<NodeId> {
    let level = node.level();
    let parent_level = self.node(parent).level();
    if !parent_level.can_contain(level) {
      return Err(SvdResolverError::new(
        SvdResolverErrorKind::InvalidValue,
        &format!("A node of level {} cannot hold {}", parent_level, level),
      ));
    }

    node.parent = Some(parent);
    node.children.clear();
    let id = self.push(node);
    let key = self.key_for(id);

    let collection = self.nodes[parent.0].children.entry(level).or_default();
    if collection.contains_key(&key) {
      return Err(SvdResolverError::new(
        SvdResolverErrorKind::DuplicateName,
        &format!("{} already holds '{}'", level, key),
      ));
    }
    collection.insert(key, id);

    Ok(id)
  }

  /// The levels of child collections present below `id`, in hierarchy order.
  pub fn child_levels(&self, id: NodeId) -> Vec<HierarchyLevel> {
    self.node(id).children.keys().copied().collect()
  }

  pub fn children(&self, id: NodeId, level: HierarchyLevel) -> Option<&Collection> {
    self.node(id).children.get(&level)
  }

  pub fn child(&self, id: NodeId, level: HierarchyLevel, key: &str) -> Option<NodeId> {
    self.children(id, level)?.get(key).copied()
  }

  /// Searches every child collection of `id` in hierarchy order and returns the first member
  /// stored under `key`.
  pub fn lookup(&self, id: NodeId, key: &str) -> Option<NodeId> {
    self
      .node(id)
      .children
      .values()
      .find_map(|collection| collection.get(key).copied())
  }

  /// Snapshot of all child ids of `id`, in hierarchy order and then insertion order.
  pub(crate) fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
    self
      .node(id)
      .children
      .values()
      .flat_map(|collection| collection.values().copied())
      .collect()
  }

  /// The key `id` is stored under in its parent's collection.
  pub fn key_of(&self, id: NodeId) -> Option<&str> {
    let node = self.node(id);
    self
      .children(node.parent?, node.level())?
      .iter()
      .find(|(_, member)| **member == id)
      .map(|(key, _)| key.as_str())
  }

  /// Absolute dotted lookup starting at the device, e.g. `TIMER0.CTRL.EN`.
  pub fn find(&self, path: &str) -> Option<NodeId> {
    path::descend(self, self.root, path).ok()
  }

  /// Deep copies the subtree at `id`. The copy points at `parent` but is not yet a member of any
  /// of its collections.
  pub fn copy_subtree(&mut self, id: NodeId, parent: NodeId) -> NodeId {
    let mut node = self.node(id).clone();
    let children = std::mem::take(&mut node.children);
    node.parent = Some(parent);
    let copy = self.push(node);

    for (level, collection) in children {
      let mut copied = Collection::new();
      for (key, child) in collection {
        let child_copy = self.copy_subtree(child, copy);
        copied.insert(key, child_copy);
      }
      self.nodes[copy.0].children.insert(level, copied);
    }

    copy
  }

  /// Moves `id` to a new key in its parent's collection, keeping its position.
  pub fn rekey(&mut self, id: NodeId, key: &str) -> SvdResolverResult<()> {
    let level = self.node(id).level();
    let parent = match self.node(id).parent {
      Some(parent) => parent,
      None => return Ok(()),
    };
    let collection = match self.nodes[parent.0].children.get_mut(&level) {
      Some(collection) => collection,
      None => return Ok(()),
    };

    let (index, old_key) = match collection.iter().position(|(_, member)| *member == id) {
      Some(index) => match collection.get_index(index) {
        Some((old_key, _)) => (index, old_key.clone()),
        None => return Ok(()),
      },
      None => return Ok(()),
    };

    if old_key == key {
      return Ok(());
    }
    if collection.contains_key(key) {
      return Err(SvdResolverError::new(
        SvdResolverErrorKind::DuplicateName,
        &format!("Cannot rename '{}' to '{}' in {}: name taken", old_key, key, level),
      ));
    }

    collection.shift_remove_index(index);
    let (last, _) = collection.insert_full(key.to_owned(), id);
    collection.move_index(last, index);

    trace!("Re-keyed {} '{}' as '{}'", level, old_key, key);
    Ok(())
  }

  /// Replaces `id` in its parent's collection with `products`, in order, at the position `id`
  /// held. Products are keyed by their names.
  pub fn replace(&mut self, id: NodeId, products: &[NodeId]) -> SvdResolverResult<()> {
    let level = self.node(id).level();
    let parent = match self.node(id).parent {
      Some(parent) => parent,
      None => {
        return Err(SvdResolverError::new(
          SvdResolverErrorKind::InvalidTemplate,
          "The device cannot be replaced",
        ))
      }
    };

    let keys: Vec<String> = products.iter().map(|p| self.key_for(*p)).collect();
    let old = match self.nodes[parent.0].children.get(&level) {
      Some(collection) => collection.clone(),
      None => Collection::new(),
    };

    let mut replaced = Collection::new();
    for (key, member) in old {
      if member != id {
        if replaced.insert(key.clone(), member).is_some() {
          return Err(duplicate(&key, level));
        }
        continue;
      }
      for (key, product) in keys.iter().zip(products.iter()) {
        if replaced.insert(key.clone(), *product).is_some() {
          return Err(duplicate(key, level));
        }
      }
    }

    for product in products.iter() {
      self.nodes[product.0].parent = Some(parent);
    }
    self.nodes[parent.0].children.insert(level, replaced);

    Ok(())
  }

  fn subtree_eq(&self, id: NodeId, other: &DeviceTree, other_id: NodeId) -> bool {
    let (a, b) = (self.node(id), other.node(other_id));
    a.same_content(b)
      && a.children.len() == b.children.len()
      && a
        .children
        .iter()
        .zip(b.children.iter())
        .all(|((la, ca), (lb, cb))| {
          la == lb
            && ca.len() == cb.len()
            && ca
              .iter()
              .zip(cb.iter())
              .all(|((ka, ia), (kb, ib))| {
                same_key(ka, kb) && self.subtree_eq(*ia, other, *ib)
              })
        })
  }
}

/// Generated keys of anonymous nodes depend on arena positions, so any two of them match.
fn same_key(a: &str, b: &str) -> bool {
  a == b || (a.starts_with('$') && b.starts_with('$'))
}

fn duplicate(key: &str, level: HierarchyLevel) -> SvdResolverError {
  SvdResolverError::new(
    SvdResolverErrorKind::DuplicateName,
    &format!("{} already holds '{}'", level, key),
  )
}

impl PartialEq for DeviceTree {
  fn eq(&self, other: &Self) -> bool {
    self.subtree_eq(self.root, other, other.root)
  }
}
