use log::{debug, trace};

use crate::{
  convert::MAX_DIM_INSTANCES,
  error::{SvdResolverError, SvdResolverErrorKind, SvdResolverResult},
  level::HierarchyLevel,
  node::NodeId,
  tree::DeviceTree,
  value::DimSpec,
};

const PLACEHOLDER: &str = "%s";
const ARRAY_PLACEHOLDER: &str = "[%s]";

fn invalid(name: &str, msg: &str) -> SvdResolverError {
  SvdResolverError::new(
    SvdResolverErrorKind::InvalidTemplate,
    &format!("Cannot expand '{}': {}", name, msg),
  )
}

/// Replaces every templated node with the nodes it stands for, depth first from the device.
pub(crate) fn expand_templates(tree: &mut DeviceTree) -> SvdResolverResult<()> {
  debug!("Expanding dim templates");
  let root = tree.root();
  visit(tree, root)?;
  debug!("Dim templates expanded");
  Ok(())
}

fn visit(tree: &mut DeviceTree, id: NodeId) -> SvdResolverResult<()> {
  let occupants = match tree.node(id).level().is_dimable() {
    true => expand(tree, id)?,
    false => vec![id],
  };

  for occupant in occupants {
    let children: Vec<NodeId> = tree
      .child_levels(occupant)
      .into_iter()
      .filter(|level| *level != HierarchyLevel::EnumeratedValueSets)
      .filter_map(|level| tree.children(occupant, level))
      .flat_map(|collection| collection.values().copied().collect::<Vec<NodeId>>())
      .collect();

    for child in children {
      visit(tree, child)?;
    }
  }

  Ok(())
}

/// The substitution token and the offset step of every instance a template produces.
fn instances(name: &str, dim: &DimSpec) -> SvdResolverResult<Vec<(String, u64)>> {
  if dim.dim.map_or(false, |count| u64::from(count) > MAX_DIM_INSTANCES) {
    return Err(invalid(name, "too many elements"));
  }

  if name.contains(ARRAY_PLACEHOLDER) {
    return match dim.dim {
      Some(count) => Ok(vec![(count.to_string(), 0)]),
      None => Err(invalid(name, "an array needs an element count")),
    };
  }

  let indices: Vec<String> = match (dim.index.as_ref(), dim.dim) {
    (Some(index), Some(count)) if index.len() != count as usize => {
      return Err(invalid(
        name,
        &format!("{} indices given for {} elements", index.len(), count),
      ))
    }
    (Some(index), _) => index.clone(),
    (None, Some(count)) => (0..count).map(|i| i.to_string()).collect(),
    (None, None) => Vec::new(),
  };

  if indices.is_empty() {
    return Err(invalid(name, "a list needs a count or an index list"));
  }

  let increment = match dim.increment {
    Some(increment) if increment > 0 => increment,
    _ => return Err(invalid(name, "a list needs a non-zero increment")),
  };

  indices
    .into_iter()
    .enumerate()
    .map(|(i, token)| match (i as u64).checked_mul(increment) {
      Some(step) => Ok((token, step)),
      None => Err(invalid(name, "the offsets overflow")),
    })
    .collect()
}

/// Expands `id` in place if its name holds a placeholder and returns the nodes now occupying its
/// slot. A dim group without a placeholder leaves the node as it is.
fn expand(tree: &mut DeviceTree, id: NodeId) -> SvdResolverResult<Vec<NodeId>> {
  let (name, dim, base, parent) = {
    let node = tree.node(id);
    let name = match node.name {
      Some(ref name) if name.contains(PLACEHOLDER) => name.clone(),
      _ => return Ok(vec![id]),
    };
    let dim = match node.dim {
      Some(ref dim) => dim.clone(),
      None => return Err(invalid(&name, "the name holds a placeholder but there is no dim")),
    };
    let parent = match node.parent() {
      Some(parent) => parent,
      None => return Err(invalid(&name, "the node has no parent")),
    };
    (name, dim, node.attributes.offset(), parent)
  };

  let mut products = Vec::new();

  for (token, step) in instances(&name, &dim)? {
    let copy = tree.copy_subtree(id, parent);
    let product = tree.node_mut(copy);

    product.name = Some(name.replace(PLACEHOLDER, &token));
    product.description = product
      .description
      .take()
      .map(|description| description.replace(PLACEHOLDER, &token));
    product.dim = None;

    let offset = base
      .unwrap_or(0)
      .checked_add(step)
      .ok_or_else(|| invalid(&name, "the offsets overflow"))?;
    product.attributes.set_offset(offset)?;

    products.push(copy);
  }

  tree.replace(id, &products)?;
  trace!("Expanded '{}' into {} node(s)", name, products.len());

  Ok(products)
}
