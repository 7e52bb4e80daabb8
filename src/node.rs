use indexmap::IndexMap;
use std::collections::BTreeMap;

use crate::{
  cluster::ClusterAttributes,
  device::DeviceAttributes,
  enumeration::{EnumeratedValueAttributes, EnumeratedValueSetAttributes},
  error::{SvdResolverError, SvdResolverErrorKind, SvdResolverResult},
  field::FieldAttributes,
  level::{AttributeGroup, HierarchyLevel},
  peripheral::PeripheralAttributes,
  register::RegisterAttributes,
  value::{inherit_group, inherit_option, DimSpec, Inherit, RegisterPropertiesSpec},
};

/// Stable handle of a node inside a `DeviceTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

/// A container of same-level siblings, keyed by name in insertion order.
pub type Collection = IndexMap<String, NodeId>;

/// The attributes only one hierarchy level carries.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeAttributes {
  Device(DeviceAttributes),
  Peripheral(PeripheralAttributes),
  Cluster(ClusterAttributes),
  Register(RegisterAttributes),
  Field(FieldAttributes),
  EnumeratedValueSet(EnumeratedValueSetAttributes),
  EnumeratedValue(EnumeratedValueAttributes),
}
impl NodeAttributes {
  pub fn level(&self) -> HierarchyLevel {
    match self {
      NodeAttributes::Device(_) => HierarchyLevel::Device,
      NodeAttributes::Peripheral(_) => HierarchyLevel::Peripherals,
      NodeAttributes::Cluster(_) => HierarchyLevel::Clusters,
      NodeAttributes::Register(_) => HierarchyLevel::Registers,
      NodeAttributes::Field(_) => HierarchyLevel::Fields,
      NodeAttributes::EnumeratedValueSet(_) => HierarchyLevel::EnumeratedValueSets,
      NodeAttributes::EnumeratedValue(_) => HierarchyLevel::EnumeratedValue,
    }
  }

  /// The value of the attribute that dim expansion advances: the base address of a peripheral,
  /// the address offset of a cluster or register, the bit offset of a field.
  pub fn offset(&self) -> Option<u64> {
    match self {
      NodeAttributes::Peripheral(p) => p.base_address,
      NodeAttributes::Cluster(c) => c.address_offset,
      NodeAttributes::Register(r) => r.address_offset,
      NodeAttributes::Field(f) => f.bit_offset.map(u64::from),
      _ => None,
    }
  }

  pub(crate) fn set_offset(&mut self, offset: u64) -> SvdResolverResult<()> {
    match self {
      NodeAttributes::Peripheral(p) => p.base_address = Some(offset),
      NodeAttributes::Cluster(c) => c.address_offset = Some(offset),
      NodeAttributes::Register(r) => r.address_offset = Some(offset),
      NodeAttributes::Field(f) => {
        f.bit_offset = Some(u32::try_from(offset).map_err(|_| {
          SvdResolverError::new(
            SvdResolverErrorKind::InvalidTemplate,
            &format!("Bit offset {} is out of range", offset),
          )
        })?)
      }
      _ => (),
    }
    Ok(())
  }

  /// Completes these attributes from another node's attributes of the same level. Attributes of
  /// a different level are left alone.
  pub(crate) fn inherit_from(&mut self, other: &NodeAttributes, exempt: &[AttributeGroup]) -> bool {
    match (self, other) {
      (NodeAttributes::Device(own), NodeAttributes::Device(o)) => own.inherit_from(o),
      (NodeAttributes::Peripheral(own), NodeAttributes::Peripheral(o)) => own.inherit_from(o, exempt),
      (NodeAttributes::Cluster(own), NodeAttributes::Cluster(o)) => own.inherit_from(o),
      (NodeAttributes::Register(own), NodeAttributes::Register(o)) => own.inherit_from(o),
      (NodeAttributes::Field(own), NodeAttributes::Field(o)) => own.inherit_from(o),
      (NodeAttributes::EnumeratedValueSet(own), NodeAttributes::EnumeratedValueSet(o)) => {
        own.inherit_from(o)
      }
      (NodeAttributes::EnumeratedValue(own), NodeAttributes::EnumeratedValue(o)) => {
        own.inherit_from(o)
      }
      _ => false,
    }
  }
}

/// One element of the device description at any hierarchy level.
#[derive(Debug, Clone)]
pub struct Node {
  /// The name, which may carry a `%s` placeholder. Enumerated value sets and values may be
  /// anonymous.
  pub name: Option<String>,

  /// Dotted path of the node this one is a modified copy of.
  pub derived_from: Option<String>,

  /// Whether this node needs no further merge with a derivation source.
  pub fully_defined: bool,

  pub description: Option<String>,

  pub dim: Option<DimSpec>,

  /// Register properties set on this node. Empty members are filled by derivation and by
  /// inheritance from the enclosing nodes.
  pub reg_properties: RegisterPropertiesSpec,

  pub attributes: NodeAttributes,

  pub(crate) parent: Option<NodeId>,
  pub(crate) children: BTreeMap<HierarchyLevel, Collection>,
}
impl Node {
  pub fn new(attributes: NodeAttributes) -> Self {
    Self {
      name: None,
      derived_from: None,
      fully_defined: true,
      description: None,
      dim: None,
      reg_properties: RegisterPropertiesSpec::default(),
      attributes,
      parent: None,
      children: BTreeMap::new(),
    }
  }

  pub fn with_name(mut self, name: &str) -> Self {
    self.name = Some(name.to_owned());
    self
  }

  /// Marks the node as a copy of the node at `path`, which leaves it incomplete until resolved.
  pub fn with_derived_from(mut self, path: &str) -> Self {
    self.derived_from = Some(path.to_owned());
    self.fully_defined = false;
    self
  }

  pub fn with_description(mut self, description: &str) -> Self {
    self.description = Some(description.to_owned());
    self
  }

  pub fn with_dim(mut self, dim: DimSpec) -> Self {
    self.dim = Some(dim);
    self
  }

  pub fn with_reg_properties(mut self, reg_properties: RegisterPropertiesSpec) -> Self {
    self.reg_properties = reg_properties;
    self
  }

  pub fn level(&self) -> HierarchyLevel {
    self.attributes.level()
  }

  pub fn parent(&self) -> Option<NodeId> {
    self.parent
  }

  /// Completes this node's own attributes from `other`, skipping the exempt groups. Children and
  /// the derivation markers are not touched.
  pub(crate) fn inherit_attributes(&mut self, other: &Node, exempt: &[AttributeGroup]) -> bool {
    let mut changed = false;

    changed |= inherit_option(&mut self.name, &other.name);

    if !exempt.contains(&AttributeGroup::Description) {
      changed |= inherit_option(&mut self.description, &other.description);
    }

    if !exempt.contains(&AttributeGroup::Dim) {
      changed |= inherit_group(&mut self.dim, &other.dim);
    }

    if !exempt.contains(&AttributeGroup::RegisterProperties) {
      changed |= self.reg_properties.inherit_from(&other.reg_properties);
    }

    changed |= self.attributes.inherit_from(&other.attributes, exempt);

    changed
  }

  /// Compares everything but the structure around the node. Where a complete node was derived
  /// from does not matter.
  pub(crate) fn same_content(&self, other: &Node) -> bool {
    self.name == other.name
      && self.fully_defined == other.fully_defined
      && (self.fully_defined || self.derived_from == other.derived_from)
      && self.description == other.description
      && self.dim == other.dim
      && self.reg_properties == other.reg_properties
      && self.attributes == other.attributes
  }
}
