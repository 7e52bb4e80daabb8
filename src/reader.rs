//! Builds a `DeviceTree` from CMSIS-SVD XML.

use xmltree::Element;

use crate::{
  cluster::ClusterAttributes,
  convert::{clean_whitespace, validate_dimable_identifier, validate_identifier},
  device::DeviceAttributes,
  enumeration::{EnumeratedValueAttributes, EnumeratedValueSetAttributes},
  error::{SvdResolverError, SvdResolverErrorKind, SvdResolverResult},
  field::FieldAttributes,
  level::HierarchyLevel,
  node::{Node, NodeAttributes, NodeId},
  peripheral::PeripheralAttributes,
  register::RegisterAttributes,
  tree::DeviceTree,
  value::{DimSpec, RegisterPropertiesSpec},
};

/// The cleaned text of the child element `name`, if present. A present but empty element is an
/// error.
pub(crate) fn child_text(el: &Element, name: &str) -> SvdResolverResult<Option<String>> {
  let child = match el.get_child(name) {
    Some(child) => child,
    None => return Ok(None),
  };

  let text = match child.get_text() {
    Some(text) => clean_whitespace(&text)?,
    None => String::new(),
  };

  match text.is_empty() {
    true => Err(SvdResolverError::new(
      SvdResolverErrorKind::InvalidValue,
      &format!("Element <{}> of <{}> is empty", name, el.name),
    )),
    false => Ok(Some(text)),
  }
}

/// Like `child_text`, but a missing element is an error.
pub(crate) fn required_text(el: &Element, name: &str) -> SvdResolverResult<String> {
  child_text(el, name)?.ok_or_else(|| {
    SvdResolverError::new(
      SvdResolverErrorKind::MissingElement,
      &format!("Element <{}> requires a <{}>", el.name, name),
    )
  })
}

/// The text of the child element `name` run through `convert`, if present.
pub(crate) fn convert_child<T, F>(el: &Element, name: &str, convert: F) -> SvdResolverResult<Option<T>>
where
  F: Fn(&str) -> SvdResolverResult<T>,
{
  match child_text(el, name)? {
    Some(ref text) => Ok(Some(convert(text)?)),
    None => Ok(None),
  }
}

/// All direct child elements called `name`, in document order.
pub(crate) fn child_elements<'a>(
  el: &'a Element,
  name: &'a str,
) -> impl Iterator<Item = &'a Element> + 'a {
  el.children
    .iter()
    .filter_map(|node| node.as_element())
    .filter(move |child| child.name == name)
}

/// Reads the members every level shares. Which ones apply depends on the level of `attributes`.
fn read_node(el: &Element, attributes: NodeAttributes) -> SvdResolverResult<Node> {
  let level = attributes.level();
  let mut node = Node::new(attributes);

  node.name = match child_text(el, "name")? {
    Some(ref name) if level.is_dimable() => Some(validate_dimable_identifier(name)?),
    Some(ref name) => Some(validate_identifier(name)?),
    None => None,
  };
  if node.name.is_none()
    && level != HierarchyLevel::EnumeratedValueSets
    && level != HierarchyLevel::EnumeratedValue
  {
    return Err(SvdResolverError::new(
      SvdResolverErrorKind::MissingElement,
      &format!("Element <{}> requires a <name>", el.name),
    ));
  }

  node.description = child_text(el, "description")?;

  if level.is_dimable() {
    node.dim = DimSpec::read(el)?;
  }

  if level.inherits_register_properties() {
    node.reg_properties = RegisterPropertiesSpec::read(el)?;
  }

  if level != HierarchyLevel::EnumeratedValue {
    if let Some(derived_from) = el.attributes.get("derivedFrom") {
      node.derived_from = Some(clean_whitespace(derived_from)?);
      node.fully_defined = false;
    }
  }

  Ok(node)
}

fn read_peripheral(tree: &mut DeviceTree, parent: NodeId, el: &Element) -> SvdResolverResult<()> {
  let node = read_node(el, NodeAttributes::Peripheral(PeripheralAttributes::read(el)?))?;
  let id = tree.add_child(parent, node)?;

  if let Some(registers) = el.get_child("registers") {
    read_registers(tree, id, registers)?;
  }

  Ok(())
}

/// Reads the clusters and registers held directly by `el`.
fn read_registers(tree: &mut DeviceTree, parent: NodeId, el: &Element) -> SvdResolverResult<()> {
  for child in el.children.iter().filter_map(|node| node.as_element()) {
    match child.name.as_str() {
      "cluster" => read_cluster(tree, parent, child)?,
      "register" => read_register(tree, parent, child)?,
      _ => (),
    }
  }

  Ok(())
}

fn read_cluster(tree: &mut DeviceTree, parent: NodeId, el: &Element) -> SvdResolverResult<()> {
  let node = read_node(el, NodeAttributes::Cluster(ClusterAttributes::read(el)?))?;
  let id = tree.add_child(parent, node)?;
  read_registers(tree, id, el)
}

fn read_register(tree: &mut DeviceTree, parent: NodeId, el: &Element) -> SvdResolverResult<()> {
  let node = read_node(el, NodeAttributes::Register(RegisterAttributes::read(el)?))?;
  let id = tree.add_child(parent, node)?;

  if let Some(fields) = el.get_child("fields") {
    for field in child_elements(fields, "field") {
      read_field(tree, id, field)?;
    }
  }

  Ok(())
}

fn read_field(tree: &mut DeviceTree, parent: NodeId, el: &Element) -> SvdResolverResult<()> {
  let node = read_node(el, NodeAttributes::Field(FieldAttributes::read(el)?))?;
  let id = tree.add_child(parent, node)?;

  for set in child_elements(el, "enumeratedValues") {
    let node = read_node(
      set,
      NodeAttributes::EnumeratedValueSet(EnumeratedValueSetAttributes::read(set)?),
    )?;
    let set_id = tree.add_child(id, node)?;

    for value in child_elements(set, "enumeratedValue") {
      let node = read_node(
        value,
        NodeAttributes::EnumeratedValue(EnumeratedValueAttributes::read(value)?),
      )?;
      tree.add_child(set_id, node)?;
    }
  }

  Ok(())
}

fn read_device(el: &Element) -> SvdResolverResult<DeviceTree> {
  let node = read_node(el, NodeAttributes::Device(DeviceAttributes::read(el)?))?;
  let mut tree = DeviceTree::new(node);
  let root = tree.root();

  if let Some(peripherals) = el.get_child("peripherals") {
    for peripheral in child_elements(peripherals, "peripheral") {
      read_peripheral(&mut tree, root, peripheral)?;
    }
  }

  Ok(tree)
}

impl DeviceTree {
  /// Parses a CMSIS-SVD document. Nothing is resolved yet: derived nodes stay incomplete and
  /// templates stay unexpanded.
  pub fn from_xml(xml: &str) -> SvdResolverResult<Self> {
    let root = Element::parse(xml.as_bytes())?;
    read_device(&root)
  }
}
