use log::trace;

use crate::{
  error::{SvdResolverError, SvdResolverErrorKind, SvdResolverResult},
  level::AttributeGroup,
  node::NodeId,
  path,
  tree::DeviceTree,
};

/// Collects `id` followed by every node it transitively derives from, ending on the first
/// complete node. All references resolve against `frames`, the ancestors of `id`.
pub(crate) fn build_chain(
  tree: &DeviceTree,
  id: NodeId,
  frames: &[NodeId],
) -> SvdResolverResult<Vec<NodeId>> {
  let mut chain = vec![id];
  let mut current = id;

  while !tree.node(current).fully_defined {
    let reference = match tree.node(current).derived_from {
      Some(ref reference) => reference.clone(),
      None => {
        return Err(SvdResolverError::new(
          SvdResolverErrorKind::BrokenDerivation,
          &format!(
            "{} '{}' is incomplete but derives from nothing",
            tree.node(current).level(),
            tree.key_of(current).unwrap_or_default()
          ),
        ))
      }
    };

    let source = path::resolve(tree, frames, &reference)?;
    if chain.contains(&source) {
      return Err(SvdResolverError::new(
        SvdResolverErrorKind::CyclicDerivation,
        &format!("Derivation through '{}' leads back into its own chain", reference),
      ));
    }

    chain.push(source);
    current = source;
  }

  Ok(chain)
}

/// Completes every element of `chain` from its successor, starting at the far end, so that each
/// element ends up holding everything it inherits. All elements are marked complete and moved to
/// the key matching their possibly inherited name.
pub(crate) fn apply_chain(tree: &mut DeviceTree, chain: &[NodeId]) -> SvdResolverResult<()> {
  let exempt = match chain.first() {
    Some(first) => tree.node(*first).level().derivation_exemptions(),
    None => return Ok(()),
  };

  for pair in chain.windows(2).rev() {
    inherit_node(tree, pair[0], pair[1], exempt);
  }

  for id in chain.iter() {
    tree.node_mut(*id).fully_defined = true;

    let renamed = match (tree.node(*id).name.as_deref(), tree.key_of(*id)) {
      (Some(name), Some(key)) if name != key => Some(name.to_owned()),
      _ => None,
    };
    if let Some(name) = renamed {
      tree.rekey(*id, &name)?;
    }
  }

  trace!(
    "Merged derivation chain {}",
    chain
      .iter()
      .map(|id| tree.key_of(*id).unwrap_or_default().to_owned())
      .collect::<Vec<String>>()
      .join(" <- ")
  );

  Ok(())
}

/// Completes `dst` from `src`: own attributes first, then children by key. A child missing from
/// `dst` receives a deep copy of the source child, a shared one is completed recursively.
fn inherit_node(tree: &mut DeviceTree, dst: NodeId, src: NodeId, exempt: &[AttributeGroup]) -> bool {
  if dst == src {
    return false;
  }

  let source = tree.node(src).clone();
  let mut changed = tree.node_mut(dst).inherit_attributes(&source, exempt);
  let level = tree.node(dst).level();

  for (child_level, collection) in source.children.iter() {
    if !level.can_contain(*child_level) {
      continue;
    }

    for (key, child) in collection.iter() {
      match tree.child(dst, *child_level, key) {
        Some(own) => changed |= inherit_node(tree, own, *child, &[]),
        None => {
          let copy = tree.copy_subtree(*child, dst);
          tree
            .node_mut(dst)
            .children
            .entry(*child_level)
            .or_default()
            .insert(key.clone(), copy);
          changed = true;
        }
      }
    }
  }

  changed
}

#[cfg(test)]
mod tests {
  use super::{apply_chain, build_chain};
  use crate::{error::SvdResolverErrorKind, node::NodeAttributes, tree::DeviceTree};

  const CHAIN: &str = r##"
    <device>
      <name>DEV</name>
      <peripherals>
        <peripheral>
          <name>A</name>
          <groupName>TIMER</groupName>
          <description>Timer</description>
          <baseAddress>0x40000000</baseAddress>
          <interrupt>
            <name>A_IRQ</name>
            <value>1</value>
          </interrupt>
          <registers>
            <register>
              <name>CTRL</name>
              <addressOffset>0</addressOffset>
              <size>16</size>
            </register>
          </registers>
        </peripheral>
        <peripheral derivedFrom="A">
          <name>B</name>
          <baseAddress>0x40001000</baseAddress>
        </peripheral>
        <peripheral derivedFrom="B">
          <name>C</name>
          <baseAddress>0x40002000</baseAddress>
        </peripheral>
      </peripherals>
    </device>
  "##;

  #[test]
  fn chains_follow_derivations_to_a_complete_node() {
    let tree = DeviceTree::from_xml(CHAIN).unwrap();
    let (a, b, c) = (
      tree.find("A").unwrap(),
      tree.find("B").unwrap(),
      tree.find("C").unwrap(),
    );

    assert_eq!(vec![c, b, a], build_chain(&tree, c, &[tree.root()]).unwrap());
    assert_eq!(vec![a], build_chain(&tree, a, &[tree.root()]).unwrap());
  }

  #[test]
  fn every_chain_element_is_completed() {
    let mut tree = DeviceTree::from_xml(CHAIN).unwrap();
    let (b, c) = (tree.find("B").unwrap(), tree.find("C").unwrap());
    let chain = build_chain(&tree, c, &[tree.root()]).unwrap();

    apply_chain(&mut tree, &chain).unwrap();

    for id in [b, c].iter() {
      let node = tree.node(*id);
      assert!(node.fully_defined);
      assert_eq!("Timer", node.description.clone().unwrap());
      match node.attributes {
        NodeAttributes::Peripheral(ref p) => {
          assert_eq!("TIMER", p.group_name.clone().unwrap());
          assert!(p.interrupts.is_empty());
        }
        _ => panic!("Level changed"),
      }
    }
    assert_eq!(Some(0x4000_2000), tree.node(c).attributes.offset());

    let ctrl = tree.find("C.CTRL").unwrap();
    assert_eq!(16, tree.node(ctrl).reg_properties.size.unwrap());
    assert_ne!(tree.find("A.CTRL").unwrap(), ctrl);
  }

  #[test]
  fn cycles_are_detected() {
    let tree = DeviceTree::from_xml(
      r##"
      <device>
        <name>DEV</name>
        <peripherals>
          <peripheral derivedFrom="B">
            <name>A</name>
          </peripheral>
          <peripheral derivedFrom="A">
            <name>B</name>
          </peripheral>
        </peripherals>
      </device>
      "##,
    )
    .unwrap();

    let a = tree.find("A").unwrap();
    let err = build_chain(&tree, a, &[tree.root()]).unwrap_err();
    assert_eq!(SvdResolverErrorKind::CyclicDerivation, err.kind);
  }

  #[test]
  fn incomplete_nodes_without_source_are_broken() {
    let mut tree = DeviceTree::from_xml(
      "<device><name>DEV</name><peripherals><peripheral><name>A</name></peripheral></peripherals></device>",
    )
    .unwrap();
    let a = tree.find("A").unwrap();
    tree.node_mut(a).fully_defined = false;

    let err = build_chain(&tree, a, &[tree.root()]).unwrap_err();
    assert_eq!(SvdResolverErrorKind::BrokenDerivation, err.kind);
  }
}
