use xmltree::Element;

use crate::{
  convert::{parse_bit_range, parse_u32},
  error::{SvdResolverError, SvdResolverErrorKind, SvdResolverResult},
  reader::{child_text, convert_child},
  value::{inherit_option, AccessSpec, Inherit},
  writer::append_text,
};

/// Describes the manipulation of data written to a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModifiedWriteValuesSpec {
  OneToClear,
  OneToSet,
  OneToToggle,
  ZeroToClear,
  ZeroToSet,
  ZeroToToggle,
  Clear,
  Set,
  Modify,
}
impl ModifiedWriteValuesSpec {
  pub fn parse(text: &str) -> SvdResolverResult<Self> {
    match text {
      "oneToClear" => Ok(ModifiedWriteValuesSpec::OneToClear),
      "oneToSet" => Ok(ModifiedWriteValuesSpec::OneToSet),
      "oneToToggle" => Ok(ModifiedWriteValuesSpec::OneToToggle),
      "zeroToClear" => Ok(ModifiedWriteValuesSpec::ZeroToClear),
      "zeroToSet" => Ok(ModifiedWriteValuesSpec::ZeroToSet),
      "zeroToToggle" => Ok(ModifiedWriteValuesSpec::ZeroToToggle),
      "clear" => Ok(ModifiedWriteValuesSpec::Clear),
      "set" => Ok(ModifiedWriteValuesSpec::Set),
      "modify" => Ok(ModifiedWriteValuesSpec::Modify),
      _ => Err(SvdResolverError::new(
        SvdResolverErrorKind::InvalidValue,
        &format!("Unable to convert modifiedWriteValues '{}'", text),
      )),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      ModifiedWriteValuesSpec::OneToClear => "oneToClear",
      ModifiedWriteValuesSpec::OneToSet => "oneToSet",
      ModifiedWriteValuesSpec::OneToToggle => "oneToToggle",
      ModifiedWriteValuesSpec::ZeroToClear => "zeroToClear",
      ModifiedWriteValuesSpec::ZeroToSet => "zeroToSet",
      ModifiedWriteValuesSpec::ZeroToToggle => "zeroToToggle",
      ModifiedWriteValuesSpec::Clear => "clear",
      ModifiedWriteValuesSpec::Set => "set",
      ModifiedWriteValuesSpec::Modify => "modify",
    }
  }
}

/// Attributes that only a field carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldAttributes {
  /// The position of the least-significant bit of this field within its register.
  pub bit_offset: Option<u32>,

  /// The bit width of the field.
  pub bit_width: Option<u32>,

  /// The access rights to the field.
  pub access: Option<AccessSpec>,

  /// Describes the manipulation of data written to this field. If `None`, the value written to
  /// the field is the value stored in the field.
  pub modified_write_values: Option<ModifiedWriteValuesSpec>,
}
impl FieldAttributes {
  /// Reads the field attributes, accepting any of the three bit range notations. A field that
  /// derives from another may leave its bit range out entirely.
  pub(crate) fn read(el: &Element) -> SvdResolverResult<Self> {
    let offset = convert_child(el, "bitOffset", parse_u32)?;
    let width = convert_child(el, "bitWidth", parse_u32)?;
    let lsb = convert_child(el, "lsb", parse_u32)?;
    let msb = convert_child(el, "msb", parse_u32)?;
    let range = convert_child(el, "bitRange", parse_bit_range)?;

    let (bit_offset, bit_width) = match (offset, lsb, msb, range) {
      (Some(offset), _, _, _) => (Some(offset), width),
      (None, Some(lsb), Some(msb), _) if msb >= lsb => (Some(lsb), Some(msb - lsb + 1)),
      (None, Some(lsb), Some(msb), _) => {
        return Err(SvdResolverError::new(
          SvdResolverErrorKind::InvalidValue,
          &format!("Field msb {} is below lsb {}", msb, lsb),
        ))
      }
      (None, _, _, Some((offset, width))) => (Some(offset), Some(width)),
      _ => (None, width),
    };

    Ok(Self {
      bit_offset,
      bit_width,
      access: convert_child(el, "access", AccessSpec::parse)?,
      modified_write_values: match child_text(el, "modifiedWriteValues")? {
        Some(ref mwv) => Some(ModifiedWriteValuesSpec::parse(mwv)?),
        None => None,
      },
    })
  }

  pub(crate) fn write(&self, el: &mut Element) {
    if let Some(bit_offset) = self.bit_offset {
      append_text(el, "bitOffset", &bit_offset.to_string());
    }
    if let Some(bit_width) = self.bit_width {
      append_text(el, "bitWidth", &bit_width.to_string());
    }
    if let Some(access) = self.access {
      append_text(el, "access", access.as_str());
    }
    if let Some(mwv) = self.modified_write_values {
      append_text(el, "modifiedWriteValues", mwv.as_str());
    }
  }

  /// The bit mask for reading/writing this field on the parent register
  pub fn mask(&self) -> Option<u64> {
    match (self.bit_offset, self.bit_width) {
      (Some(offset), Some(width))
        if width > 0 && offset.checked_add(width).map_or(false, |end| end <= 64) =>
      {
        Some((u64::MAX >> (64 - width)) << offset)
      }
      _ => None,
    }
  }
}
impl Inherit for FieldAttributes {
  fn inherit_from(&mut self, fs: &FieldAttributes) -> bool {
    let mut changed = false;

    changed |= inherit_option(&mut self.bit_offset, &fs.bit_offset);
    changed |= inherit_option(&mut self.bit_width, &fs.bit_width);
    changed |= inherit_option(&mut self.access, &fs.access);
    changed |= inherit_option(&mut self.modified_write_values, &fs.modified_write_values);

    changed
  }
}

#[cfg(test)]
mod tests {
  use super::{FieldAttributes, ModifiedWriteValuesSpec};
  use crate::value::{AccessSpec, Inherit};
  use xmltree::Element;

  fn parse(xml: &str) -> FieldAttributes {
    FieldAttributes::read(&Element::parse(xml.as_bytes()).unwrap()).unwrap()
  }

  #[test]
  fn reads_offset_width_notation() {
    let fa = parse(
      r##"
      <field>
        <name>FOO</name>
        <bitOffset>2</bitOffset>
        <bitWidth>3</bitWidth>
        <access>write-only</access>
        <modifiedWriteValues>zeroToToggle</modifiedWriteValues>
      </field>
      "##,
    );

    assert_eq!(2, fa.bit_offset.unwrap());
    assert_eq!(3, fa.bit_width.unwrap());
    assert_eq!(AccessSpec::WriteOnly, fa.access.unwrap());
    assert_eq!(
      ModifiedWriteValuesSpec::ZeroToToggle,
      fa.modified_write_values.unwrap()
    );
    assert_eq!(0b11100, fa.mask().unwrap());
  }

  #[test]
  fn reads_lsb_msb_notation() {
    let fa = parse("<field><name>FOO</name><lsb>4</lsb><msb>7</msb></field>");
    assert_eq!(4, fa.bit_offset.unwrap());
    assert_eq!(4, fa.bit_width.unwrap());
  }

  #[test]
  fn reads_bit_range_notation() {
    let fa = parse("<field><name>FOO</name><bitRange>[15:8]</bitRange></field>");
    assert_eq!(8, fa.bit_offset.unwrap());
    assert_eq!(8, fa.bit_width.unwrap());
  }

  #[test]
  fn derived_field_may_omit_bit_range() {
    let fa = parse("<field><name>FOO</name></field>");
    assert!(fa.bit_offset.is_none());
    assert!(fa.bit_width.is_none());
    assert!(fa.mask().is_none());
  }

  #[test]
  fn mask_needs_the_field_inside_the_register() {
    let fa = parse(
      "<field><name>FOO</name><bitOffset>4294967295</bitOffset><bitWidth>2</bitWidth></field>",
    );
    assert!(fa.mask().is_none());

    let fa = parse("<field><name>FOO</name><bitOffset>62</bitOffset><bitWidth>2</bitWidth></field>");
    assert_eq!(0b11 << 62, fa.mask().unwrap());
  }

  #[test]
  fn inherits_from_other_field() {
    let mut descendant = parse("<field><name>FOO</name><bitOffset>1</bitOffset></field>");
    let ancestor = parse(
      r##"
      <field>
        <name>FOO2</name>
        <bitOffset>3</bitOffset>
        <bitWidth>4</bitWidth>
        <access>read-only</access>
      </field>
      "##,
    );

    assert!(descendant.inherit_from(&ancestor));

    // Not inherited
    assert_eq!(1, descendant.bit_offset.unwrap());

    // Inherited
    assert_eq!(4, descendant.bit_width.unwrap());
    assert_eq!(AccessSpec::ReadOnly, descendant.access.unwrap());
  }
}
