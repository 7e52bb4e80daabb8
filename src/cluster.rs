use xmltree::Element;

use crate::{
  convert::parse_scaled_non_negative_integer,
  error::SvdResolverResult,
  reader::convert_child,
  value::{inherit_option, Inherit},
  writer::{append_text, hex},
};

/// Attributes that only a register cluster carries. Clusters may contain registers or other
/// clusters; those live in the tree as children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterAttributes {
  /// Cluster's starting address relative to its parent.
  pub address_offset: Option<u64>,
}
impl ClusterAttributes {
  pub(crate) fn read(el: &Element) -> SvdResolverResult<Self> {
    Ok(Self {
      address_offset: convert_child(el, "addressOffset", parse_scaled_non_negative_integer)?,
    })
  }

  pub(crate) fn write(&self, el: &mut Element) {
    if let Some(address_offset) = self.address_offset {
      append_text(el, "addressOffset", &hex(address_offset));
    }
  }
}
impl Inherit for ClusterAttributes {
  fn inherit_from(&mut self, cs: &ClusterAttributes) -> bool {
    inherit_option(&mut self.address_offset, &cs.address_offset)
  }
}
