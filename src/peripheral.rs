use indexmap::IndexMap;
use xmltree::Element;

use crate::{
  convert::{parse_scaled_non_negative_integer, parse_u32},
  error::SvdResolverResult,
  level::AttributeGroup,
  reader::{child_elements, child_text, convert_child, required_text},
  value::{inherit_map, inherit_option, Inherit},
  writer::{append_child, append_text, hex},
};

/// Describes an address range uniquely mapped to a peripheral.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressBlockSpec {
  /// The start address of the address block relative to the peripheral's base address.
  pub offset: u64,

  /// The number of address unit bits covered by this address block.
  pub size: u64,

  /// What the address block is used for: `registers`, `buffer` or `reserved`.
  pub usage: Option<String>,
}
impl AddressBlockSpec {
  pub(crate) fn read(el: &Element) -> SvdResolverResult<Self> {
    Ok(Self {
      offset: parse_scaled_non_negative_integer(&required_text(el, "offset")?)?,
      size: parse_scaled_non_negative_integer(&required_text(el, "size")?)?,
      usage: child_text(el, "usage")?,
    })
  }

  pub(crate) fn write(&self) -> Element {
    let mut el = Element::new("addressBlock");
    append_text(&mut el, "offset", &hex(self.offset));
    append_text(&mut el, "size", &hex(self.size));
    if let Some(ref usage) = self.usage {
      append_text(&mut el, "usage", usage);
    }
    el
  }
}

/// Describes an interrupt that exists on a peripheral.
#[derive(Debug, Clone, PartialEq)]
pub struct InterruptSpec {
  /// The unique name of the interrupt.
  pub name: String,

  /// Overview of the interrupt's purpose and function.
  pub description: Option<String>,

  /// The index value of the interrupt.
  pub value: u32,
}
impl InterruptSpec {
  pub(crate) fn read(el: &Element) -> SvdResolverResult<Self> {
    Ok(Self {
      name: required_text(el, "name")?,
      description: child_text(el, "description")?,
      value: parse_u32(&required_text(el, "value")?)?,
    })
  }

  pub(crate) fn write(&self) -> Element {
    let mut el = Element::new("interrupt");
    append_text(&mut el, "name", &self.name);
    if let Some(ref description) = self.description {
      append_text(&mut el, "description", description);
    }
    append_text(&mut el, "value", &self.value.to_string());
    el
  }
}
impl Inherit for InterruptSpec {
  fn inherit_from(&mut self, is: &InterruptSpec) -> bool {
    let mut changed = false;

    if self.description.is_none() && is.description.is_some() {
      self.description = is.description.clone();
      changed = true;
    }

    changed
  }
}

/// Attributes that only a peripheral carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeripheralAttributes {
  /// The version of the peripheral description.
  pub version: Option<String>,

  /// Name of the group to which this peripheral belongs.
  pub group_name: Option<String>,

  /// Lowest address reserved or used by the peripheral.
  pub base_address: Option<u64>,

  /// Address ranges uniquely mapped to this peripheral.
  pub address_blocks: Vec<AddressBlockSpec>,

  /// Interrupts that exist on this peripheral, keyed by name.
  pub interrupts: IndexMap<String, InterruptSpec>,
}
impl PeripheralAttributes {
  pub(crate) fn read(el: &Element) -> SvdResolverResult<Self> {
    let mut interrupts = IndexMap::new();
    for interrupt in child_elements(el, "interrupt") {
      let interrupt = InterruptSpec::read(interrupt)?;
      interrupts.insert(interrupt.name.clone(), interrupt);
    }

    Ok(Self {
      version: child_text(el, "version")?,
      group_name: child_text(el, "groupName")?,
      base_address: convert_child(el, "baseAddress", parse_scaled_non_negative_integer)?,
      address_blocks: child_elements(el, "addressBlock")
        .map(AddressBlockSpec::read)
        .collect::<SvdResolverResult<Vec<AddressBlockSpec>>>()?,
      interrupts,
    })
  }

  pub(crate) fn write(&self, el: &mut Element) {
    if let Some(ref version) = self.version {
      append_text(el, "version", version);
    }
    if let Some(ref group_name) = self.group_name {
      append_text(el, "groupName", group_name);
    }
    if let Some(base_address) = self.base_address {
      append_text(el, "baseAddress", &hex(base_address));
    }
    for address_block in self.address_blocks.iter() {
      append_child(el, address_block.write());
    }
    for interrupt in self.interrupts.values() {
      append_child(el, interrupt.write());
    }
  }

  pub(crate) fn inherit_from(&mut self, ps: &PeripheralAttributes, exempt: &[AttributeGroup]) -> bool {
    let mut changed = false;

    changed |= inherit_option(&mut self.version, &ps.version);
    changed |= inherit_option(&mut self.group_name, &ps.group_name);
    changed |= inherit_option(&mut self.base_address, &ps.base_address);

    if !exempt.contains(&AttributeGroup::AddressBlocks)
      && self.address_blocks.is_empty()
      && !ps.address_blocks.is_empty()
    {
      self.address_blocks = ps.address_blocks.clone();
      changed = true;
    }

    if !exempt.contains(&AttributeGroup::Interrupts) {
      changed |= inherit_map(&mut self.interrupts, &ps.interrupts);
    }

    changed
  }
}

#[cfg(test)]
mod tests {
  use super::PeripheralAttributes;
  use crate::level::AttributeGroup;
  use xmltree::Element;

  fn parse(xml: &str) -> PeripheralAttributes {
    PeripheralAttributes::read(&Element::parse(xml.as_bytes()).unwrap()).unwrap()
  }

  #[test]
  fn can_create_from_xml() {
    let pa = parse(
      r##"
      <peripheral>
        <name>TIMER0</name>
        <version>1.0</version>
        <groupName>TIMER</groupName>
        <baseAddress>0x40010000</baseAddress>
        <addressBlock>
          <offset>0</offset>
          <size>0x400</size>
          <usage>registers</usage>
        </addressBlock>
        <interrupt>
          <name>TIMER0_IRQ</name>
          <description>Timer 0 overflow</description>
          <value>4</value>
        </interrupt>
      </peripheral>
      "##,
    );

    assert_eq!("1.0", pa.version.unwrap());
    assert_eq!("TIMER", pa.group_name.unwrap());
    assert_eq!(0x4001_0000, pa.base_address.unwrap());
    assert_eq!(1, pa.address_blocks.len());
    assert_eq!(0x400, pa.address_blocks[0].size);
    assert_eq!("registers", pa.address_blocks[0].usage.clone().unwrap());
    assert_eq!(1, pa.interrupts.len());
    assert_eq!(4, pa.interrupts["TIMER0_IRQ"].value);
  }

  #[test]
  fn inherits_interrupts_unless_exempt() {
    let ancestor = parse(
      r##"
      <peripheral>
        <name>TIMER0</name>
        <groupName>TIMER</groupName>
        <interrupt>
          <name>TIMER0_IRQ</name>
          <value>4</value>
        </interrupt>
      </peripheral>
      "##,
    );

    let mut exempted = PeripheralAttributes::default();
    assert!(exempted.inherit_from(&ancestor, &[AttributeGroup::Interrupts]));
    assert_eq!("TIMER", exempted.group_name.clone().unwrap());
    assert!(exempted.interrupts.is_empty());

    let mut plain = PeripheralAttributes::default();
    assert!(plain.inherit_from(&ancestor, &[]));
    assert_eq!(1, plain.interrupts.len());

    assert!(!plain.inherit_from(&ancestor, &[]));
  }
}
