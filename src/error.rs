use std::{error::Error, fmt};

/// Convenience type for a result that may contain an `SvdResolverError`.
pub type SvdResolverResult<T> = std::result::Result<T, SvdResolverError>;

/// The category of an `SvdResolverError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvdResolverErrorKind {
  /// A derivation path has more segments than there are ancestor levels above the node.
  PathTooDeep,

  /// A derivation path segment does not name any sibling at its level.
  PathUnreachable,

  /// A derivation chain ends on an incomplete node that derives from nothing.
  BrokenDerivation,

  /// A derivation chain refers back to a node already in the chain.
  CyclicDerivation,

  /// A dim template cannot be expanded.
  InvalidTemplate,

  /// A rename or expansion would collide with an existing sibling.
  DuplicateName,

  /// A scalar value in the input could not be converted.
  InvalidValue,

  /// A required element is missing from the input.
  MissingElement,

  /// The input is not well-formed XML, or the output could not be written as XML.
  Xml,

  /// Reading or writing a file or stream failed.
  Io,
}

/// Error struct for all errors thrown by this crate or the crates on which it depends.
#[derive(Debug)]
pub struct SvdResolverError {
  /// What went wrong.
  pub kind: SvdResolverErrorKind,

  /// Description of the error that occurred.
  pub details: String,
}
impl SvdResolverError {
  pub(crate) fn new(kind: SvdResolverErrorKind, msg: &str) -> SvdResolverError {
    Self {
      kind,
      details: msg.to_string(),
    }
  }
}
impl fmt::Display for SvdResolverError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:?}: {}", self.kind, self.details)
  }
}
impl Error for SvdResolverError {}
impl From<std::io::Error> for SvdResolverError {
  fn from(err: std::io::Error) -> Self {
    SvdResolverError::new(
      SvdResolverErrorKind::Io,
      &format!("std::io::Error {}", &err.to_string()),
    )
  }
}
impl From<regex::Error> for SvdResolverError {
  fn from(err: regex::Error) -> Self {
    SvdResolverError::new(
      SvdResolverErrorKind::InvalidValue,
      &format!("regex::Error {:?}", err),
    )
  }
}
impl From<xmltree::ParseError> for SvdResolverError {
  fn from(err: xmltree::ParseError) -> Self {
    SvdResolverError::new(
      SvdResolverErrorKind::Xml,
      &format!("xmltree::ParseError {:?}", err),
    )
  }
}
