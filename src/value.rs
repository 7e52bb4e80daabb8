use indexmap::IndexMap;
use xmltree::Element;

use crate::{
  convert::{parse_dim_index, parse_scaled_non_negative_integer, parse_u32, validate_identifier},
  error::{SvdResolverError, SvdResolverErrorKind, SvdResolverResult},
  reader::{child_text, convert_child},
  writer::{append_text, hex},
};

/// Something that can complete itself from another instance of the same type. Members that are
/// already set win; unset members are taken from `other`; nested groups recurse. Returns whether
/// anything changed.
pub trait Inherit {
  fn inherit_from(&mut self, other: &Self) -> bool;
}

/// Fills an unset scalar from `other`.
pub(crate) fn inherit_option<T: Clone>(own: &mut Option<T>, other: &Option<T>) -> bool {
  if own.is_none() && other.is_some() {
    *own = other.clone();
    return true;
  }
  false
}

/// Completes an optional group: copied wholesale if unset, merged member-wise if both are set.
pub(crate) fn inherit_group<T: Inherit + Clone>(own: &mut Option<T>, other: &Option<T>) -> bool {
  match other {
    Some(i) => match own {
      Some(o) => o.inherit_from(i),
      None => {
        *own = Some(i.clone());
        true
      }
    },
    None => false,
  }
}

/// Completes a keyed collection of groups: missing keys are copied, shared keys are merged.
pub(crate) fn inherit_map<T: Inherit + Clone>(
  own: &mut IndexMap<String, T>,
  other: &IndexMap<String, T>,
) -> bool {
  let mut changed = false;

  for (key, ancestor) in other.iter() {
    if let Some(descendant) = own.get_mut(key) {
      if descendant.inherit_from(ancestor) {
        changed = true;
      }
    } else {
      own.insert(key.clone(), ancestor.clone());
      changed = true;
    }
  }

  changed
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AccessSpec {
  ReadOnly,
  ReadWrite,
  ReadWriteOnce,
  WriteOnce,
  WriteOnly,
}
impl AccessSpec {
  pub fn parse(text: &str) -> SvdResolverResult<AccessSpec> {
    match text {
      "read-only" => Ok(AccessSpec::ReadOnly),
      "read-write" => Ok(AccessSpec::ReadWrite),
      "read-writeOnce" => Ok(AccessSpec::ReadWriteOnce),
      "writeOnce" => Ok(AccessSpec::WriteOnce),
      "write-only" => Ok(AccessSpec::WriteOnly),
      _ => Err(SvdResolverError::new(
        SvdResolverErrorKind::InvalidValue,
        &format!("Unable to convert access '{}'", text),
      )),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      AccessSpec::ReadOnly => "read-only",
      AccessSpec::ReadWrite => "read-write",
      AccessSpec::ReadWriteOnce => "read-writeOnce",
      AccessSpec::WriteOnce => "writeOnce",
      AccessSpec::WriteOnly => "write-only",
    }
  }

  pub fn can_read(&self) -> bool {
    matches!(
      self,
      AccessSpec::ReadOnly | AccessSpec::ReadWrite | AccessSpec::ReadWriteOnce
    )
  }

  pub fn can_write(&self) -> bool {
    !matches!(self, AccessSpec::ReadOnly)
  }
}

/// The inheritable register properties group. Any member may be absent; an all-empty group is
/// the same as no group at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterPropertiesSpec {
  /// Default bit-width of registers.
  pub size: Option<u32>,

  /// Default access rights of registers.
  pub access: Option<AccessSpec>,

  /// Default value of registers after reset.
  pub reset_value: Option<u64>,

  /// Default register bits that have a defined reset value.
  pub reset_mask: Option<u64>,
}
impl RegisterPropertiesSpec {
  pub(crate) fn read(el: &Element) -> SvdResolverResult<Self> {
    Ok(Self {
      size: convert_child(el, "size", parse_u32)?,
      access: convert_child(el, "access", AccessSpec::parse)?,
      reset_value: convert_child(el, "resetValue", parse_scaled_non_negative_integer)?,
      reset_mask: convert_child(el, "resetMask", parse_scaled_non_negative_integer)?,
    })
  }

  pub(crate) fn write(&self, el: &mut Element) {
    if let Some(size) = self.size {
      append_text(el, "size", &size.to_string());
    }
    if let Some(access) = self.access {
      append_text(el, "access", access.as_str());
    }
    if let Some(reset_value) = self.reset_value {
      append_text(el, "resetValue", &hex(reset_value));
    }
    if let Some(reset_mask) = self.reset_mask {
      append_text(el, "resetMask", &hex(reset_mask));
    }
  }

  pub fn is_empty(&self) -> bool {
    self.size.is_none()
      && self.access.is_none()
      && self.reset_value.is_none()
      && self.reset_mask.is_none()
  }
}
impl Inherit for RegisterPropertiesSpec {
  fn inherit_from(&mut self, other: &Self) -> bool {
    let mut changed = false;

    if self.size.is_none() && other.size.is_some() {
      self.size = other.size;
      changed = true;
    }

    if self.access.is_none() && other.access.is_some() {
      self.access = other.access;
      changed = true;
    }

    if self.reset_value.is_none() && other.reset_value.is_some() {
      self.reset_value = other.reset_value;
      changed = true;
    }

    if self.reset_mask.is_none() && other.reset_mask.is_some() {
      self.reset_mask = other.reset_mask;
      changed = true;
    }

    changed
  }
}

/// The repetition descriptor of a templated node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimSpec {
  /// Number of elements produced.
  pub dim: Option<u32>,

  /// Address distance between consecutive elements.
  pub increment: Option<u64>,

  /// Explicit strings substituted for the placeholder, one per element.
  pub index: Option<Vec<String>>,

  /// Name of the C type generated for the array.
  pub name: Option<String>,
}
impl DimSpec {
  /// Reads the dim element group, returning `None` when none of its members are present.
  pub(crate) fn read(el: &Element) -> SvdResolverResult<Option<Self>> {
    let dim = Self {
      dim: convert_child(el, "dim", parse_u32)?,
      increment: convert_child(el, "dimIncrement", parse_scaled_non_negative_integer)?,
      index: convert_child(el, "dimIndex", parse_dim_index)?,
      name: match child_text(el, "dimName")? {
        Some(ref n) => Some(validate_identifier(n)?),
        None => None,
      },
    };

    match dim == Self::default() {
      true => Ok(None),
      false => Ok(Some(dim)),
    }
  }

  pub(crate) fn write(&self, el: &mut Element) {
    if let Some(dim) = self.dim {
      append_text(el, "dim", &dim.to_string());
    }
    if let Some(increment) = self.increment {
      append_text(el, "dimIncrement", &hex(increment));
    }
    if let Some(ref index) = self.index {
      append_text(el, "dimIndex", &index.join(","));
    }
    if let Some(ref name) = self.name {
      append_text(el, "dimName", name);
    }
  }
}
impl Inherit for DimSpec {
  fn inherit_from(&mut self, other: &Self) -> bool {
    let mut changed = false;

    changed |= inherit_option(&mut self.dim, &other.dim);
    changed |= inherit_option(&mut self.increment, &other.increment);
    changed |= inherit_option(&mut self.index, &other.index);
    changed |= inherit_option(&mut self.name, &other.name);

    changed
  }
}
