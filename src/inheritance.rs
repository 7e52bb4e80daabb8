use log::debug;

use crate::{
  node::NodeId,
  tree::DeviceTree,
  value::{Inherit, RegisterPropertiesSpec},
};

/// The attribute groups a node passes down to the nodes nested in it.
#[derive(Debug, Clone, Default)]
pub(crate) struct InheritedProperties {
  pub reg_properties: RegisterPropertiesSpec,
}

/// Pushes register properties from the device down to every register. Values set on a node win
/// over the ones it inherits, and whatever a node ends up with is what its children inherit.
pub(crate) fn propagate_inheritance(tree: &mut DeviceTree) {
  debug!("Propagating inherited register properties");
  let root = tree.root();
  visit(tree, root, InheritedProperties::default());
}

fn visit(tree: &mut DeviceTree, id: NodeId, inherited: InheritedProperties) {
  let node = tree.node_mut(id);
  node.reg_properties.inherit_from(&inherited.reg_properties);

  let snapshot = InheritedProperties {
    reg_properties: node.reg_properties.clone(),
  };

  for child in tree.child_ids(id) {
    if tree.node(child).level().inherits_register_properties() {
      visit(tree, child, snapshot.clone());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::propagate_inheritance;
  use crate::{tree::DeviceTree, value::AccessSpec};

  const NESTED: &str = r##"
    <device>
      <name>DEV</name>
      <size>32</size>
      <access>read-write</access>
      <resetValue>0</resetValue>
      <peripherals>
        <peripheral>
          <name>P</name>
          <size>16</size>
          <registers>
            <cluster>
              <name>C</name>
              <addressOffset>0</addressOffset>
              <resetValue>0xFF</resetValue>
              <register>
                <name>IN_CLUSTER</name>
                <addressOffset>0</addressOffset>
              </register>
            </cluster>
            <register>
              <name>LOCAL</name>
              <addressOffset>0x10</addressOffset>
              <size>8</size>
              <fields>
                <field>
                  <name>F</name>
                  <bitOffset>0</bitOffset>
                  <bitWidth>1</bitWidth>
                </field>
              </fields>
            </register>
            <register>
              <name>PLAIN</name>
              <addressOffset>0x14</addressOffset>
            </register>
          </registers>
        </peripheral>
      </peripherals>
    </device>
  "##;

  #[test]
  fn local_register_properties_win() {
    let mut tree = DeviceTree::from_xml(NESTED).unwrap();
    propagate_inheritance(&mut tree);

    let local = tree.node(tree.find("P.LOCAL").unwrap());
    assert_eq!(8, local.reg_properties.size.unwrap());
    assert_eq!(AccessSpec::ReadWrite, local.reg_properties.access.unwrap());

    let plain = tree.node(tree.find("P.PLAIN").unwrap());
    assert_eq!(16, plain.reg_properties.size.unwrap());
    assert_eq!(0, plain.reg_properties.reset_value.unwrap());
  }

  #[test]
  fn clusters_pass_their_own_values_down() {
    let mut tree = DeviceTree::from_xml(NESTED).unwrap();
    propagate_inheritance(&mut tree);

    let nested = tree.node(tree.find("P.C.IN_CLUSTER").unwrap());
    assert_eq!(16, nested.reg_properties.size.unwrap());
    assert_eq!(0xFF, nested.reg_properties.reset_value.unwrap());

    // Siblings of the cluster are unaffected by it
    let plain = tree.node(tree.find("P.PLAIN").unwrap());
    assert_eq!(0, plain.reg_properties.reset_value.unwrap());
  }

  #[test]
  fn fields_receive_nothing() {
    let mut tree = DeviceTree::from_xml(NESTED).unwrap();
    propagate_inheritance(&mut tree);

    let field = tree.node(tree.find("P.LOCAL.F").unwrap());
    assert!(field.reg_properties.is_empty());
  }
}
