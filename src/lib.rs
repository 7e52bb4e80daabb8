//! Turns a compact CMSIS-SVD device description into a self-contained one.
//!
//! A description read with [`DeviceTree::from_xml`] may still hold nodes that derive from other
//! nodes, register properties that are only set on enclosing elements and `%s` templates standing
//! for whole arrays of elements. [`DeviceTree::resolve`] merges the derivations, pushes the
//! register properties down to every register and expands the templates.

mod cluster;
mod convert;
mod derivation;
mod device;
mod dim;
mod enumeration;
mod error;
mod field;
mod inheritance;
mod level;
mod merge;
mod node;
mod path;
mod peripheral;
mod reader;
mod register;
mod tree;
mod value;
mod writer;

pub use cluster::ClusterAttributes;
pub use device::{CpuSpec, DeviceAttributes, EndianSpec};
pub use enumeration::{
  EnumeratedValueAttributes, EnumeratedValueSetAttributes, EnumeratedValueUsageSpec,
};
pub use error::{SvdResolverError, SvdResolverErrorKind, SvdResolverResult};
pub use field::{FieldAttributes, ModifiedWriteValuesSpec};
pub use level::{AttributeGroup, HierarchyLevel};
pub use node::{Collection, Node, NodeAttributes, NodeId};
pub use peripheral::{AddressBlockSpec, InterruptSpec, PeripheralAttributes};
pub use register::RegisterAttributes;
pub use tree::DeviceTree;
pub use value::{AccessSpec, DimSpec, Inherit, RegisterPropertiesSpec};

impl DeviceTree {
  /// Resolves derivations, then inherited register properties, then dim templates. The tree is
  /// consumed, so a failure never leaves a half-resolved tree behind.
  pub fn resolve(mut self) -> SvdResolverResult<Self> {
    derivation::resolve_derivations(&mut self)?;
    inheritance::propagate_inheritance(&mut self);
    dim::expand_templates(&mut self)?;
    Ok(self)
  }
}

#[cfg(test)]
mod tests {
  use crate::{DeviceTree, HierarchyLevel, NodeAttributes, SvdResolverErrorKind};

  const DEVICE: &str = r##"
    <device schemaVersion="1.3">
      <name>MCU</name>
      <addressUnitBits>8</addressUnitBits>
      <width>32</width>
      <size>32</size>
      <resetValue>0</resetValue>
      <peripherals>
        <peripheral>
          <name>GPIOA</name>
          <groupName>GPIO</groupName>
          <description>General purpose I/O</description>
          <baseAddress>0x48000000</baseAddress>
          <addressBlock>
            <offset>0</offset>
            <size>0x400</size>
            <usage>registers</usage>
          </addressBlock>
          <interrupt>
            <name>GPIOA_IRQ</name>
            <value>6</value>
          </interrupt>
          <registers>
            <register>
              <dim>3</dim>
              <dimIncrement>4</dimIncrement>
              <name>AFR%s</name>
              <addressOffset>0x10</addressOffset>
            </register>
            <register>
              <name>MODER</name>
              <addressOffset>0</addressOffset>
              <size>16</size>
              <fields>
                <field>
                  <name>MODE0</name>
                  <bitRange>[1:0]</bitRange>
                  <enumeratedValues>
                    <name>MODE</name>
                    <enumeratedValue>
                      <name>INPUT</name>
                      <value>0</value>
                    </enumeratedValue>
                    <enumeratedValue>
                      <name>OUTPUT</name>
                      <value>1</value>
                    </enumeratedValue>
                  </enumeratedValues>
                </field>
                <field>
                  <name>MODE1</name>
                  <bitRange>[3:2]</bitRange>
                  <enumeratedValues derivedFrom="MODE0.MODE">
                  </enumeratedValues>
                </field>
              </fields>
            </register>
            <register derivedFrom="MODER">
              <name>OTYPER</name>
              <addressOffset>0x4</addressOffset>
            </register>
            <register>
              <name>BUF[%s]</name>
              <dim>8</dim>
              <dimIncrement>1</dimIncrement>
              <addressOffset>0x40</addressOffset>
            </register>
          </registers>
        </peripheral>
        <peripheral derivedFrom="GPIOA">
          <name>GPIOB</name>
          <baseAddress>0x48000400</baseAddress>
        </peripheral>
        <peripheral derivedFrom="GPIOB">
          <name>GPIOC</name>
          <baseAddress>0x48000800</baseAddress>
        </peripheral>
      </peripherals>
    </device>
  "##;

  fn resolved() -> DeviceTree {
    DeviceTree::from_xml(DEVICE).unwrap().resolve().unwrap()
  }

  #[test]
  fn resolving_twice_changes_nothing() {
    let once = resolved();
    let twice = once.clone().resolve().unwrap();
    assert_eq!(once, twice);
  }

  #[test]
  fn chained_derivations_complete_every_link() {
    let tree = resolved();

    for name in ["GPIOB", "GPIOC"].iter() {
      let id = tree.find(name).unwrap();
      let node = tree.node(id);
      assert!(node.fully_defined);
      assert_eq!("General purpose I/O", node.description.clone().unwrap());
      assert!(tree.find(&format!("{}.MODER.MODE1", name)).is_some());
      assert!(tree.find(&format!("{}.AFR2", name)).is_some());
    }

    let gpioc = tree.node(tree.find("GPIOC").unwrap());
    assert_eq!(Some(0x4800_0800), gpioc.attributes.offset());
  }

  #[test]
  fn interrupts_are_not_derived() {
    let tree = resolved();

    let interrupts = |name: &str| match tree.node(tree.find(name).unwrap()).attributes {
      NodeAttributes::Peripheral(ref p) => (p.interrupts.len(), p.address_blocks.len()),
      _ => panic!("Not a peripheral"),
    };

    assert_eq!((1, 1), interrupts("GPIOA"));
    assert_eq!((0, 1), interrupts("GPIOB"));
    assert_eq!((0, 1), interrupts("GPIOC"));
  }

  #[test]
  fn relative_and_absolute_references_agree() {
    let relative = DeviceTree::from_xml(DEVICE).unwrap().resolve().unwrap();
    let absolute = DEVICE.replace("derivedFrom=\"MODER\"", "derivedFrom=\"GPIOA.MODER\"");
    let absolute = DeviceTree::from_xml(&absolute).unwrap().resolve().unwrap();

    assert_eq!(relative, absolute);

    let otyper = relative.node(relative.find("GPIOA.OTYPER").unwrap());
    assert_eq!(16, otyper.reg_properties.size.unwrap());
    assert_eq!(Some(0x4), otyper.attributes.offset());
  }

  #[test]
  fn lists_and_arrays_expand() {
    let tree = resolved();

    for (i, offset) in [0x10, 0x14, 0x18].iter().enumerate() {
      let afr = tree.node(tree.find(&format!("GPIOA.AFR{}", i)).unwrap());
      assert_eq!(Some(*offset), afr.attributes.offset());
    }
    assert!(tree.find("GPIOA.AFR3").is_none());

    let buf = tree.node(tree.find("GPIOA.BUF[8]").unwrap());
    assert_eq!(Some(0x40), buf.attributes.offset());
  }

  #[test]
  fn local_register_properties_survive_inheritance() {
    let tree = resolved();

    let moder = tree.node(tree.find("GPIOA.MODER").unwrap());
    assert_eq!(16, moder.reg_properties.size.unwrap());
    assert_eq!(0, moder.reg_properties.reset_value.unwrap());

    let afr0 = tree.node(tree.find("GPIOA.AFR0").unwrap());
    assert_eq!(32, afr0.reg_properties.size.unwrap());
  }

  #[test]
  fn anonymous_derived_sets_take_the_source_name() {
    let tree = resolved();

    let mode1 = tree.find("GPIOA.MODER.MODE1").unwrap();
    let sets = tree.children(mode1, HierarchyLevel::EnumeratedValueSets).unwrap();
    assert_eq!(vec!["MODE"], sets.keys().collect::<Vec<&String>>());

    let set = tree.find("GPIOA.MODER.MODE1.MODE").unwrap();
    assert_eq!(Some("MODE"), tree.key_of(set));
    assert!(tree.find("GPIOA.MODER.MODE1.MODE.OUTPUT").is_some());
  }

  #[test]
  fn unreachable_references_fail_the_whole_resolution() {
    let broken = DEVICE.replace("derivedFrom=\"GPIOB\"", "derivedFrom=\"GPIOX\"");
    let err = DeviceTree::from_xml(&broken).unwrap().resolve().unwrap_err();
    assert_eq!(SvdResolverErrorKind::PathUnreachable, err.kind);
  }
}
