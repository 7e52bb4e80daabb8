//! Conversions from the textual scalar syntaxes of an SVD file to values.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{SvdResolverError, SvdResolverErrorKind, SvdResolverResult};

/// Upper bound on the number of elements a single dim template may stand for.
pub(crate) const MAX_DIM_INSTANCES: u64 = 1 << 16;

type Pattern = LazyLock<Result<Regex, regex::Error>>;

static WHITESPACE: Pattern = LazyLock::new(|| Regex::new(r"\s+"));
static SCALED_INTEGER: Pattern = LazyLock::new(|| {
  Regex::new(
    r"^\+?(?:0[xX](?P<hex>[0-9a-fA-F]+)|(?:#|0[bB])(?P<bin>[01]+)|(?P<dec>[0-9]+))(?P<scale>[kKmMgGtT])?$",
  )
});
static ENUMERATED_VALUE: Pattern = LazyLock::new(|| {
  Regex::new(r"^\+?(?:0[xX](?P<hex>[0-9a-fA-F]+)|(?:#|0[bB])(?P<bin>[01xX]+)|(?P<dec>[0-9]+))$")
});
static NUMERIC_RANGE: Pattern = LazyLock::new(|| Regex::new(r"^(?P<start>[0-9]+)-(?P<end>[0-9]+)$"));
static LETTER_RANGE: Pattern = LazyLock::new(|| Regex::new(r"^(?P<start>[A-Z])-(?P<end>[A-Z])$"));
static INDEX_LIST: Pattern =
  LazyLock::new(|| Regex::new(r"^[_0-9a-zA-Z]+(?:\s*,\s*[_0-9a-zA-Z]+)*$"));
static BIT_RANGE: Pattern =
  LazyLock::new(|| Regex::new(r"^\[(?P<msb>[0-9]{1,2}):(?P<lsb>[0-9]{1,2})\]$"));
static IDENTIFIER: Pattern = LazyLock::new(|| Regex::new(r"^[_A-Za-z][_A-Za-z0-9]*$"));
// An expanded array keeps its element count in brackets, e.g. `BUF[8]`.
static DIMABLE_IDENTIFIER: Pattern = LazyLock::new(|| {
  Regex::new(r"^(?:[_A-Za-z]|%s)(?:[_A-Za-z0-9]|%s|\[(?:%s|[0-9]+)\])*$")
});
static REVISION: Pattern = LazyLock::new(|| Regex::new(r"^r[0-9]*p[0-9]*$"));

fn compiled(pattern: &'static Pattern) -> SvdResolverResult<&'static Regex> {
  match &**pattern {
    Ok(re) => Ok(re),
    Err(err) => Err(err.clone().into()),
  }
}

fn invalid(kind: &str, text: &str) -> SvdResolverError {
  SvdResolverError::new(
    SvdResolverErrorKind::InvalidValue,
    &format!("Unable to convert {} '{}'", kind, text),
  )
}

/// Collapses every run of whitespace into a single space and trims the ends.
pub fn clean_whitespace(text: &str) -> SvdResolverResult<String> {
  let re = compiled(&WHITESPACE)?;
  Ok(re.replace_all(text, " ").trim().to_owned())
}

/// Converts a `scaledNonNegativeInteger`: decimal, `0x`/`0X` hex or `#`/`0b` binary, with an
/// optional `+` sign and an optional `k`, `M`, `G` or `T` multiplier.
pub fn parse_scaled_non_negative_integer(text: &str) -> SvdResolverResult<u64> {
  let re = compiled(&SCALED_INTEGER)?;

  let caps = re
    .captures(text.trim())
    .ok_or_else(|| invalid("scaledNonNegativeInteger", text))?;

  let value = if let Some(hex) = caps.name("hex") {
    u64::from_str_radix(hex.as_str(), 16)
  } else if let Some(bin) = caps.name("bin") {
    u64::from_str_radix(bin.as_str(), 2)
  } else {
    caps.name("dec").map_or("", |m| m.as_str()).parse::<u64>()
  }
  .map_err(|_| invalid("scaledNonNegativeInteger", text))?;

  let scale: u64 = match caps.name("scale").map(|m| m.as_str()) {
    Some("k") | Some("K") => 1 << 10,
    Some("m") | Some("M") => 1 << 20,
    Some("g") | Some("G") => 1 << 30,
    Some("t") | Some("T") => 1 << 40,
    _ => 1,
  };

  value
    .checked_mul(scale)
    .ok_or_else(|| invalid("scaledNonNegativeInteger", text))
}

/// Same as `parse_scaled_non_negative_integer`, narrowed to 32 bits.
pub fn parse_u32(text: &str) -> SvdResolverResult<u32> {
  let value = parse_scaled_non_negative_integer(text)?;
  if value > u32::MAX as u64 {
    return Err(invalid("32-bit integer", text));
  }
  Ok(value as u32)
}

/// Converts `true`/`false` in any case, or a number where non-zero means true.
pub fn parse_boolean(text: &str) -> SvdResolverResult<bool> {
  match text.trim().to_lowercase().as_str() {
    "true" => Ok(true),
    "false" => Ok(false),
    other => parse_scaled_non_negative_integer(other)
      .map(|v| v != 0)
      .map_err(|_| invalid("boolean", text)),
  }
}

/// Converts an `enumeratedValueDataType`. Binary values may mark don't-care bits with `x`, which
/// are read as zero.
pub fn parse_enumerated_value(text: &str) -> SvdResolverResult<u64> {
  let re = compiled(&ENUMERATED_VALUE)?;

  let caps = re
    .captures(text.trim())
    .ok_or_else(|| invalid("enumeratedValueDataType", text))?;

  let value = if let Some(hex) = caps.name("hex") {
    u64::from_str_radix(hex.as_str(), 16)
  } else if let Some(bin) = caps.name("bin") {
    u64::from_str_radix(&bin.as_str().replace(&['x', 'X'][..], "0"), 2)
  } else {
    caps.name("dec").map_or("", |m| m.as_str()).parse::<u64>()
  };

  value.map_err(|_| invalid("enumeratedValueDataType", text))
}

/// Converts a `dimIndexType` into the strings substituted for `%s`. Accepts an inclusive numeric
/// range (`0-3`), an inclusive letter range (`A-D`) or a comma separated list.
pub fn parse_dim_index(text: &str) -> SvdResolverResult<Vec<String>> {
  let text = text.trim();

  let numeric = compiled(&NUMERIC_RANGE)?;
  if let Some(caps) = numeric.captures(text) {
    let start: u64 = caps["start"].parse().map_err(|_| invalid("dimIndex", text))?;
    let end: u64 = caps["end"].parse().map_err(|_| invalid("dimIndex", text))?;
    if start >= end || end - start >= MAX_DIM_INSTANCES {
      return Err(invalid("dimIndex range", text));
    }
    return Ok((start..=end).map(|n| n.to_string()).collect());
  }

  let letters = compiled(&LETTER_RANGE)?;
  if let Some(caps) = letters.captures(text) {
    let start = caps["start"].chars().next().unwrap_or('A');
    let end = caps["end"].chars().next().unwrap_or('A');
    if start >= end {
      return Err(invalid("dimIndex range", text));
    }
    return Ok((start..=end).map(|c| c.to_string()).collect());
  }

  let list = compiled(&INDEX_LIST)?;
  if list.is_match(text) {
    return Ok(text.split(',').map(|s| s.trim().to_owned()).collect());
  }

  Err(invalid("dimIndex", text))
}

/// Converts a `bitRangeType` of the form `[msb:lsb]` into `(offset, width)`.
pub fn parse_bit_range(text: &str) -> SvdResolverResult<(u32, u32)> {
  let re = compiled(&BIT_RANGE)?;
  let caps = re
    .captures(text.trim())
    .ok_or_else(|| invalid("bitRange", text))?;

  let msb: u32 = caps["msb"].parse().map_err(|_| invalid("bitRange", text))?;
  let lsb: u32 = caps["lsb"].parse().map_err(|_| invalid("bitRange", text))?;
  if msb < lsb {
    return Err(invalid("bitRange", text));
  }

  Ok((lsb, msb - lsb + 1))
}

/// Checks an ANSI C compatible identifier.
pub fn validate_identifier(text: &str) -> SvdResolverResult<String> {
  let re = compiled(&IDENTIFIER)?;
  match re.is_match(text) {
    true => Ok(text.to_owned()),
    false => Err(invalid("identifierType", text)),
  }
}

/// Checks an identifier that may carry a `%s` or `[%s]` dim placeholder, or the `[N]` suffix of
/// an expanded array.
pub fn validate_dimable_identifier(text: &str) -> SvdResolverResult<String> {
  let re = compiled(&DIMABLE_IDENTIFIER)?;
  match re.is_match(text) {
    true => Ok(text.to_owned()),
    false => Err(invalid("dimableIdentifierType", text)),
  }
}

/// Checks a CPU revision of the form `rNpM`.
pub fn validate_revision(text: &str) -> SvdResolverResult<String> {
  let re = compiled(&REVISION)?;
  match re.is_match(text) {
    true => Ok(text.to_owned()),
    false => Err(invalid("CPU revision", text)),
  }
}
