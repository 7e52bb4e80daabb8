use xmltree::Element;

use crate::{
  convert::parse_scaled_non_negative_integer,
  error::SvdResolverResult,
  reader::convert_child,
  value::{inherit_option, Inherit},
  writer::{append_text, hex},
};

/// Attributes that only a register carries. Registers may be top-level constructs of a
/// peripheral or may be nested within register clusters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterAttributes {
  /// Register's starting address relative to its parent.
  pub address_offset: Option<u64>,
}
impl RegisterAttributes {
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
impl Inherit for RegisterAttributes {
  fn inherit_from(&mut self, rs: &RegisterAttributes) -> bool {
    inherit_option(&mut self.address_offset, &rs.address_offset)
  }
}
