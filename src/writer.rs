//! Serializes a `DeviceTree` back to CMSIS-SVD XML.

use std::io::Write;
use xmltree::{Element, EmitterConfig, XMLNode};

use crate::{
  error::{SvdResolverError, SvdResolverErrorKind, SvdResolverResult},
  level::HierarchyLevel,
  node::{NodeAttributes, NodeId},
  tree::DeviceTree,
};

pub(crate) fn append_child(el: &mut Element, child: Element) {
  el.children.push(XMLNode::Element(child));
}

/// Appends `<name>text</name>` to `el`.
pub(crate) fn append_text(el: &mut Element, name: &str, text: &str) {
  let mut child = Element::new(name);
  child.children.push(XMLNode::Text(text.to_owned()));
  append_child(el, child);
}

pub(crate) fn hex(value: u64) -> String {
  format!("{:#010x}", value)
}

fn tag(level: HierarchyLevel) -> &'static str {
  match level {
    HierarchyLevel::Device => "device",
    HierarchyLevel::Peripherals => "peripheral",
    HierarchyLevel::Clusters => "cluster",
    HierarchyLevel::Registers => "register",
    HierarchyLevel::Fields => "field",
    HierarchyLevel::EnumeratedValueSets => "enumeratedValues",
    HierarchyLevel::EnumeratedValue => "enumeratedValue",
  }
}

impl DeviceTree {
  fn element(&self, id: NodeId) -> Element {
    let node = self.node(id);
    let mut el = Element::new(tag(node.level()));

    if let (false, Some(derived_from)) = (node.fully_defined, node.derived_from.as_ref()) {
      el.attributes
        .insert("derivedFrom".to_owned(), derived_from.clone());
    }

    if let Some(ref dim) = node.dim {
      dim.write(&mut el);
    }
    if let Some(ref name) = node.name {
      append_text(&mut el, "name", name);
    }
    if let Some(ref description) = node.description {
      append_text(&mut el, "description", description);
    }

    match node.attributes {
      NodeAttributes::Device(ref a) => a.write(&mut el),
      NodeAttributes::Peripheral(ref a) => a.write(&mut el),
      NodeAttributes::Cluster(ref a) => a.write(&mut el),
      NodeAttributes::Register(ref a) => a.write(&mut el),
      NodeAttributes::Field(ref a) => a.write(&mut el),
      NodeAttributes::EnumeratedValueSet(ref a) => a.write(&mut el),
      NodeAttributes::EnumeratedValue(ref a) => a.write(&mut el),
    }

    node.reg_properties.write(&mut el);

    let children = self.child_ids(id).into_iter().map(|child| self.element(child));
    match node.level() {
      HierarchyLevel::Device => {
        let mut peripherals = Element::new("peripherals");
        children.for_each(|child| append_child(&mut peripherals, child));
        append_child(&mut el, peripherals);
      }
      HierarchyLevel::Peripherals if !self.child_ids(id).is_empty() => {
        let mut registers = Element::new("registers");
        children.for_each(|child| append_child(&mut registers, child));
        append_child(&mut el, registers);
      }
      HierarchyLevel::Registers if !self.child_ids(id).is_empty() => {
        let mut fields = Element::new("fields");
        children.for_each(|child| append_child(&mut fields, child));
        append_child(&mut el, fields);
      }
      _ => children.for_each(|child| append_child(&mut el, child)),
    }

    el
  }

  /// Writes the tree as an indented CMSIS-SVD document.
  pub fn write<W: Write>(&self, w: W) -> SvdResolverResult<()> {
    let mut root = self.element(self.root());
    root
      .attributes
      .insert("schemaVersion".to_owned(), "1.3".to_owned());

    root
      .write_with_config(w, EmitterConfig::new().perform_indent(true))
      .map_err(|err| SvdResolverError::new(SvdResolverErrorKind::Xml, &err.to_string()))
  }

  pub fn to_xml(&self) -> SvdResolverResult<String> {
    let mut buffer = Vec::new();
    self.write(&mut buffer)?;
    String::from_utf8(buffer)
      .map_err(|err| SvdResolverError::new(SvdResolverErrorKind::Xml, &err.to_string()))
  }
}
