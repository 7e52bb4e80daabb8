use log::debug;

use crate::{
  error::SvdResolverResult,
  merge::{apply_chain, build_chain},
  node::NodeId,
  tree::DeviceTree,
};

/// Completes every node that derives from another, walking the tree top-down from the device.
pub(crate) fn resolve_derivations(tree: &mut DeviceTree) -> SvdResolverResult<()> {
  debug!("Resolving derivations");
  let root = tree.root();
  visit(tree, root, &[])?;
  debug!("Derivations resolved");
  Ok(())
}

/// `frames` holds the ancestors of `id`, outermost first. Every child gets its own copy, so
/// siblings never observe each other's frames.
fn visit(tree: &mut DeviceTree, id: NodeId, frames: &[NodeId]) -> SvdResolverResult<()> {
  if !tree.node(id).fully_defined {
    let chain = build_chain(tree, id, frames)?;
    apply_chain(tree, &chain)?;
  }

  let mut child_frames = frames.to_vec();
  child_frames.push(id);

  for child in tree.child_ids(id) {
    visit(tree, child, &child_frames)?;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::resolve_derivations;
  use crate::{error::SvdResolverErrorKind, level::HierarchyLevel, tree::DeviceTree};

  #[test]
  fn resolves_nested_relative_derivations() {
    let mut tree = DeviceTree::from_xml(
      r##"
      <device>
        <name>DEV</name>
        <peripherals>
          <peripheral>
            <name>P</name>
            <registers>
              <register>
                <name>R1</name>
                <description>First</description>
                <addressOffset>0</addressOffset>
                <fields>
                  <field>
                    <name>EN</name>
                    <bitOffset>0</bitOffset>
                    <bitWidth>1</bitWidth>
                  </field>
                </fields>
              </register>
              <register derivedFrom="R1">
                <name>R2</name>
                <addressOffset>4</addressOffset>
              </register>
              <register derivedFrom="P.R1">
                <name>R3</name>
                <addressOffset>8</addressOffset>
              </register>
            </registers>
          </peripheral>
        </peripherals>
      </device>
      "##,
    )
    .unwrap();

    resolve_derivations(&mut tree).unwrap();

    for path in ["P.R2", "P.R3"].iter() {
      let id = tree.find(path).unwrap();
      assert!(tree.node(id).fully_defined);
      assert_eq!("First", tree.node(id).description.clone().unwrap());
      assert!(tree.child(id, HierarchyLevel::Fields, "EN").is_some());
    }
  }

  #[test]
  fn children_copied_from_sources_are_complete() {
    let mut tree = DeviceTree::from_xml(
      r##"
      <device>
        <name>DEV</name>
        <peripherals>
          <peripheral>
            <name>A</name>
            <registers>
              <register>
                <name>R1</name>
                <addressOffset>0</addressOffset>
                <size>8</size>
              </register>
              <register derivedFrom="R1">
                <name>R2</name>
                <addressOffset>1</addressOffset>
              </register>
            </registers>
          </peripheral>
          <peripheral derivedFrom="A">
            <name>B</name>
            <registers>
              <register>
                <name>R1</name>
                <addressOffset>0</addressOffset>
                <size>16</size>
              </register>
            </registers>
          </peripheral>
        </peripherals>
      </device>
      "##,
    )
    .unwrap();

    resolve_derivations(&mut tree).unwrap();

    let r1 = tree.find("B.R1").unwrap();
    assert_eq!(16, tree.node(r1).reg_properties.size.unwrap());

    let r2 = tree.find("B.R2").unwrap();
    assert_ne!(tree.find("A.R2").unwrap(), r2);
    assert!(tree.node(r2).fully_defined);
    assert_eq!(8, tree.node(r2).reg_properties.size.unwrap());
  }

  #[test]
  fn unreachable_sources_fail() {
    let mut tree = DeviceTree::from_xml(
      r##"
      <device>
        <name>DEV</name>
        <peripherals>
          <peripheral derivedFrom="MISSING">
            <name>A</name>
          </peripheral>
        </peripherals>
      </device>
      "##,
    )
    .unwrap();

    let err = resolve_derivations(&mut tree).unwrap_err();
    assert_eq!(SvdResolverErrorKind::PathUnreachable, err.kind);
  }
}
