use xmltree::Element;

use crate::{
  convert::{parse_boolean, parse_u32, validate_revision},
  error::{SvdResolverError, SvdResolverErrorKind, SvdResolverResult},
  reader::{child_text, convert_child, required_text},
  value::{inherit_option, Inherit},
  writer::{append_child, append_text},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EndianSpec {
  Little,
  Big,
  Selectable,
  Other,
}
impl EndianSpec {
  pub fn parse(text: &str) -> SvdResolverResult<Self> {
    match text {
      "little" => Ok(EndianSpec::Little),
      "big" => Ok(EndianSpec::Big),
      "selectable" => Ok(EndianSpec::Selectable),
      "other" => Ok(EndianSpec::Other),
      _ => Err(SvdResolverError::new(
        SvdResolverErrorKind::InvalidValue,
        &format!("Unable to convert endian '{}'", text),
      )),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      EndianSpec::Little => "little",
      EndianSpec::Big => "big",
      EndianSpec::Selectable => "selectable",
      EndianSpec::Other => "other",
    }
  }
}

/// Describes the processor core of a device.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuSpec {
  pub name: String,
  pub revision: String,
  pub endian: EndianSpec,
  pub mpu_present: bool,
  pub fpu_present: bool,
  pub nvic_priority_bits: u32,
  pub has_vendor_systick: bool,
}
impl CpuSpec {
  pub(crate) fn read(el: &Element) -> SvdResolverResult<Self> {
    Ok(Self {
      name: required_text(el, "name")?,
      revision: validate_revision(&required_text(el, "revision")?)?,
      endian: EndianSpec::parse(&required_text(el, "endian")?)?,
      mpu_present: parse_boolean(&required_text(el, "mpuPresent")?)?,
      fpu_present: parse_boolean(&required_text(el, "fpuPresent")?)?,
      nvic_priority_bits: parse_u32(&required_text(el, "nvicPrioBits")?)?,
      has_vendor_systick: parse_boolean(&required_text(el, "vendorSystickConfig")?)?,
    })
  }

  pub(crate) fn write(&self) -> Element {
    let mut el = Element::new("cpu");
    append_text(&mut el, "name", &self.name);
    append_text(&mut el, "revision", &self.revision);
    append_text(&mut el, "endian", self.endian.as_str());
    append_text(&mut el, "mpuPresent", &self.mpu_present.to_string());
    append_text(&mut el, "fpuPresent", &self.fpu_present.to_string());
    append_text(&mut el, "nvicPrioBits", &self.nvic_priority_bits.to_string());
    append_text(
      &mut el,
      "vendorSystickConfig",
      &self.has_vendor_systick.to_string(),
    );
    el
  }
}

/// Attributes that only a device carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceAttributes {
  /// The version of the device description.
  pub version: Option<String>,

  pub cpu: Option<CpuSpec>,

  /// Number of data bits uniquely selected by each address.
  pub address_unit_bits: Option<u32>,

  /// Bit-width of the maximum single data transfer supported by the bus.
  pub width: Option<u32>,
}
impl DeviceAttributes {
  pub(crate) fn read(el: &Element) -> SvdResolverResult<Self> {
    Ok(Self {
      version: child_text(el, "version")?,
      cpu: match el.get_child("cpu") {
        Some(cpu) => Some(CpuSpec::read(cpu)?),
        None => None,
      },
      address_unit_bits: convert_child(el, "addressUnitBits", parse_u32)?,
      width: convert_child(el, "width", parse_u32)?,
    })
  }

  pub(crate) fn write(&self, el: &mut Element) {
    if let Some(ref version) = self.version {
      append_text(el, "version", version);
    }
    if let Some(ref cpu) = self.cpu {
      append_child(el, cpu.write());
    }
    if let Some(address_unit_bits) = self.address_unit_bits {
      append_text(el, "addressUnitBits", &address_unit_bits.to_string());
    }
    if let Some(width) = self.width {
      append_text(el, "width", &width.to_string());
    }
  }
}
impl Inherit for DeviceAttributes {
  fn inherit_from(&mut self, other: &Self) -> bool {
    let mut changed = false;

    changed |= inherit_option(&mut self.version, &other.version);
    changed |= inherit_option(&mut self.cpu, &other.cpu);
    changed |= inherit_option(&mut self.address_unit_bits, &other.address_unit_bits);
    changed |= inherit_option(&mut self.width, &other.width);

    changed
  }
}
