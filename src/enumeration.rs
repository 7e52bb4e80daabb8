use xmltree::Element;

use crate::{
  convert::{parse_boolean, parse_enumerated_value, validate_identifier},
  error::{SvdResolverError, SvdResolverErrorKind, SvdResolverResult},
  reader::{child_text, convert_child},
  value::{inherit_option, Inherit},
  writer::append_text,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnumeratedValueUsageSpec {
  Read,
  Write,
  ReadWrite,
}
impl EnumeratedValueUsageSpec {
  pub fn parse(text: &str) -> SvdResolverResult<Self> {
    match text {
      "read" => Ok(EnumeratedValueUsageSpec::Read),
      "write" => Ok(EnumeratedValueUsageSpec::Write),
      "read-write" => Ok(EnumeratedValueUsageSpec::ReadWrite),
      _ => Err(SvdResolverError::new(
        SvdResolverErrorKind::InvalidValue,
        &format!("Unable to convert usage '{}'", text),
      )),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      EnumeratedValueUsageSpec::Read => "read",
      EnumeratedValueUsageSpec::Write => "write",
      EnumeratedValueUsageSpec::ReadWrite => "read-write",
    }
  }
}

fn header_name(el: &Element) -> SvdResolverResult<Option<String>> {
  match child_text(el, "headerEnumName")? {
    Some(ref n) => Ok(Some(validate_identifier(n)?)),
    None => Ok(None),
  }
}

/// Attributes that only an `enumeratedValues` set carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumeratedValueSetAttributes {
  /// Identifier used for the generated enumeration type.
  pub header_name: Option<String>,

  /// Whether the set applies to reads, writes or both.
  pub usage: Option<EnumeratedValueUsageSpec>,
}
impl EnumeratedValueSetAttributes {
  pub(crate) fn read(el: &Element) -> SvdResolverResult<Self> {
    Ok(Self {
      header_name: header_name(el)?,
      usage: convert_child(el, "usage", EnumeratedValueUsageSpec::parse)?,
    })
  }

  pub(crate) fn write(&self, el: &mut Element) {
    if let Some(ref header_name) = self.header_name {
      append_text(el, "headerEnumName", header_name);
    }
    if let Some(usage) = self.usage {
      append_text(el, "usage", usage.as_str());
    }
  }
}
impl Inherit for EnumeratedValueSetAttributes {
  fn inherit_from(&mut self, other: &Self) -> bool {
    let mut changed = false;

    changed |= inherit_option(&mut self.header_name, &other.header_name);
    changed |= inherit_option(&mut self.usage, &other.usage);

    changed
  }
}

/// Attributes that only a single `enumeratedValue` carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumeratedValueAttributes {
  pub header_name: Option<String>,

  /// The value the name stands for.
  pub value: Option<u64>,

  /// Whether this entry names every value not listed elsewhere in the set.
  pub is_default: Option<bool>,
}
impl EnumeratedValueAttributes {
  pub(crate) fn read(el: &Element) -> SvdResolverResult<Self> {
    Ok(Self {
      header_name: header_name(el)?,
      value: convert_child(el, "value", parse_enumerated_value)?,
      is_default: convert_child(el, "isDefault", parse_boolean)?,
    })
  }

  pub(crate) fn write(&self, el: &mut Element) {
    if let Some(ref header_name) = self.header_name {
      append_text(el, "headerEnumName", header_name);
    }
    if let Some(value) = self.value {
      append_text(el, "value", &value.to_string());
    }
    if let Some(is_default) = self.is_default {
      append_text(el, "isDefault", &is_default.to_string());
    }
  }
}
impl Inherit for EnumeratedValueAttributes {
  fn inherit_from(&mut self, other: &Self) -> bool {
    let mut changed = false;

    changed |= inherit_option(&mut self.header_name, &other.header_name);
    changed |= inherit_option(&mut self.value, &other.value);
    changed |= inherit_option(&mut self.is_default, &other.is_default);

    changed
  }
}
