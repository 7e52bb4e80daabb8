use std::fmt;

/// One rank in the fixed nesting order of a device description.
///
/// The declaration order is the hierarchy order, so sorting by `HierarchyLevel` puts clusters
/// ahead of registers wherever both share a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HierarchyLevel {
  Device,
  Peripherals,
  Clusters,
  Registers,
  Fields,
  EnumeratedValueSets,
  EnumeratedValue,
}

/// An attribute group that a derivation may be told to skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeGroup {
  Description,
  Dim,
  RegisterProperties,
  Interrupts,
  AddressBlocks,
}

impl HierarchyLevel {
  pub const ALL: [HierarchyLevel; 7] = [
    HierarchyLevel::Device,
    HierarchyLevel::Peripherals,
    HierarchyLevel::Clusters,
    HierarchyLevel::Registers,
    HierarchyLevel::Fields,
    HierarchyLevel::EnumeratedValueSets,
    HierarchyLevel::EnumeratedValue,
  ];

  /// The collection name used for this level.
  pub fn name(&self) -> &'static str {
    match self {
      HierarchyLevel::Device => "device",
      HierarchyLevel::Peripherals => "peripherals",
      HierarchyLevel::Clusters => "clusters",
      HierarchyLevel::Registers => "registers",
      HierarchyLevel::Fields => "fields",
      HierarchyLevel::EnumeratedValueSets => "enumeratedValueSets",
      HierarchyLevel::EnumeratedValue => "enumeratedValue",
    }
  }

  /// The levels a node of this level may hold as children, in hierarchy order.
  pub fn child_levels(&self) -> &'static [HierarchyLevel] {
    match self {
      HierarchyLevel::Device => &[HierarchyLevel::Peripherals],
      HierarchyLevel::Peripherals | HierarchyLevel::Clusters => {
        &[HierarchyLevel::Clusters, HierarchyLevel::Registers]
      }
      HierarchyLevel::Registers => &[HierarchyLevel::Fields],
      HierarchyLevel::Fields => &[HierarchyLevel::EnumeratedValueSets],
      HierarchyLevel::EnumeratedValueSets => &[HierarchyLevel::EnumeratedValue],
      HierarchyLevel::EnumeratedValue => &[],
    }
  }

  pub fn can_contain(&self, level: HierarchyLevel) -> bool {
    self.child_levels().contains(&level)
  }

  /// Attribute groups never taken from a derivation source at this level.
  pub fn derivation_exemptions(&self) -> &'static [AttributeGroup] {
    match self {
      HierarchyLevel::Peripherals => &[AttributeGroup::Interrupts],
      _ => &[],
    }
  }

  /// Whether nodes of this level are expanded from dim templates.
  pub fn is_dimable(&self) -> bool {
    matches!(
      self,
      HierarchyLevel::Peripherals
        | HierarchyLevel::Clusters
        | HierarchyLevel::Registers
        | HierarchyLevel::Fields
    )
  }

  /// Whether nodes of this level receive inherited register properties from their parent.
  pub fn inherits_register_properties(&self) -> bool {
    matches!(
      self,
      HierarchyLevel::Device
        | HierarchyLevel::Peripherals
        | HierarchyLevel::Clusters
        | HierarchyLevel::Registers
    )
  }
}

impl fmt::Display for HierarchyLevel {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}
